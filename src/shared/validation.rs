use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for org ids as issued by the identity provider.
    /// Personal workspaces use the user id, so both forms are accepted.
    /// - Valid: "org_2abcXYZ", "user_2abcXYZ", "team-42"
    /// - Invalid: "", "org 1", "org/1", "org|1"
    pub static ref ORG_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}
