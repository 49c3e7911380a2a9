use std::time::Duration;

use anyhow::Result;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;

use crate::core::config::AppConfig;
use crate::core::{AssemblyError, AssemblyResult};

/// Object-storage client for assembled packages. Supports plain AWS S3 and
/// S3-compatible providers through a custom endpoint with path-style
/// addressing.
pub struct S3Client {
    client: Client,
    bucket: String,
    signed_url_ttl: Duration,
}

impl S3Client {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
        let shared = aws_config::from_env().region(region_provider).load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(config.s3_force_path_style);
        }

        Ok(S3Client {
            client: Client::from_conf(builder.build()),
            bucket: config.s3_bucket.clone(),
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_secs),
        })
    }

    /// Upload the assembled package and return `(key, file name, object URL,
    /// signed preview URL)`. The key is deterministic: scoped under the
    /// `leases/` namespace by the lease identifier, falling back to a
    /// timestamp when the request carried none.
    pub async fn publish_package(
        &self,
        pdf: Vec<u8>,
        lease_id: Option<String>,
    ) -> AssemblyResult<PublishedPackage> {
        let scope = lease_id.unwrap_or_else(|| Utc::now().format("%Y%m%d%H%M%S").to_string());
        let file_name = format!("lease-package-{scope}.pdf");
        let key = format!("leases/{scope}/{file_name}");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(pdf))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| AssemblyError::Storage(format!("upload failed: {e}")))?;

        let preview_url = self.create_presigned_url(&key).await?;
        let pdf_url = format!("https://{}.s3.amazonaws.com/{}", self.bucket, key);

        Ok(PublishedPackage {
            key,
            file_name,
            pdf_url,
            preview_url,
        })
    }

    /// Time-bounded signed read URL for an uploaded object.
    pub async fn create_presigned_url(&self, key: &str) -> AssemblyResult<String> {
        let presigning = PresigningConfig::builder()
            .expires_in(self.signed_url_ttl)
            .build()
            .map_err(|e| AssemblyError::Storage(format!("invalid presigning config: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AssemblyError::Storage(format!("failed to sign URL: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PublishedPackage {
    pub key: String,
    pub file_name: String,
    pub pdf_url: String,
    pub preview_url: String,
}
