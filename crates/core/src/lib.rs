pub mod config;
pub mod error;
pub mod rack;

pub use config::Config;
pub use error::*;
pub use rack::*;
