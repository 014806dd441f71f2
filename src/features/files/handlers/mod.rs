mod file_handler;
mod storage_handler;

pub use file_handler::*;
pub use storage_handler::*;
