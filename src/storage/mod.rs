pub mod s3;

pub use s3::{PublishedPackage, S3Client};
