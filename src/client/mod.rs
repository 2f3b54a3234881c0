pub mod cli_client;
pub mod models;
pub mod services;
pub mod utils;
