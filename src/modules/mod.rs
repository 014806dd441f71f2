//! Modules layer - adapters for external infrastructure
//!
//! Currently only object storage; identity lives in `features::auth`.

pub mod storage;
