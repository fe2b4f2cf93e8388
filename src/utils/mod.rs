pub mod constants;
pub mod env;
pub mod server_config;
