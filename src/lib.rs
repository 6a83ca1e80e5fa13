pub mod config;
pub mod error;
pub mod generation;
pub mod inference;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
