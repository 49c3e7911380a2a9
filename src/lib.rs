pub mod api;
pub mod assembly;
pub mod core;
pub mod models;
pub mod pdf;
pub mod storage;
pub mod word;

// Re-export commonly used types
pub use core::{AppConfig, AssemblyError, AssemblyResult, LeaseData};

pub use assembly::{assemble, AssemblyOutcome};
pub use models::{GeneratePackageRequest, PackageResponse};
pub use storage::S3Client;
pub use word::OfficeConverter;
