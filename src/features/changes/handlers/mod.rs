mod changes_handler;

pub use changes_handler::*;
