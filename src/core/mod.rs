pub mod config;
pub mod data;
pub mod error;

pub use config::AppConfig;
pub use data::LeaseData;
pub use error::{AssemblyError, AssemblyResult};
