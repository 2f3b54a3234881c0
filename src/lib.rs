pub mod client;
pub mod common;

pub use common::config::ConsoleConfig;
pub use common::errors::{ConsoleError, Result};
