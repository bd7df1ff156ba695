pub mod config;
pub mod error;
pub mod similarity;
pub mod types;

pub use config::Config;
pub use error::HopewireError;
pub use similarity::*;
pub use types::*;
