pub mod config;
pub mod server;
pub mod test_utils;

pub use config::Args;
pub use server::{build_service, SasLanguageServer};
