mod user;

pub use user::{MembershipChange, NewUser, OrgMembership, OrgRole, User, UserRow};
