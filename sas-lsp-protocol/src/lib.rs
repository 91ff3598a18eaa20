pub mod capabilities;
pub mod handlers;
pub mod semantic_tokens;

pub use capabilities::{server_capabilities, supports_hierarchical_symbols};
pub use handlers::Handlers;
