use std::sync::Arc;

use crate::core::AppConfig;
use crate::storage::S3Client;
use crate::word::OfficeConverter;

/// Shared application state, constructed once at startup and injected into
/// every handler through `web::Data`.
#[derive(Clone)]
pub struct ApiState {
    pub s3_client: Arc<S3Client>,
    pub converter: Arc<OfficeConverter>,
    pub config: Arc<AppConfig>,
}

impl ApiState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let s3_client = Arc::new(S3Client::from_config(&config).await?);
        let converter = Arc::new(OfficeConverter::new(
            config.converter_binary.clone(),
            config.conversion_timeout_secs,
        ));

        Ok(ApiState {
            s3_client,
            converter,
            config: Arc::new(config),
        })
    }
}
