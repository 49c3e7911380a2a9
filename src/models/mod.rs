pub mod manifest;
pub mod request;

pub use manifest::{
    DocumentKind, DocumentOutcome, DocumentResult, FormFieldInfo, PackageMetadata,
    PackageResponse, TemplateInfo,
};
pub use request::{GeneratePackageRequest, TestFillRequest};
