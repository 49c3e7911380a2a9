use std::env;
use std::path::PathBuf;

/// Process-wide configuration, built once at startup from the environment
/// and injected into the API state. Never read from ambient globals after
/// construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Flat directory holding the Word and PDF templates.
    pub templates_dir: PathBuf,
    /// Bucket the assembled packages are uploaded to.
    pub s3_bucket: String,
    /// Custom endpoint for non-AWS S3-compatible providers.
    pub s3_endpoint: Option<String>,
    /// Path-style addressing, required by most non-AWS providers.
    pub s3_force_path_style: bool,
    /// Headless office converter command (LibreOffice).
    pub converter_binary: String,
    /// Hard bound on a single Word-to-PDF conversion.
    pub conversion_timeout_secs: u64,
    /// Lifetime of the signed preview URL.
    pub signed_url_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            templates_dir: PathBuf::from("templates"),
            s3_bucket: "lease-documents".to_string(),
            s3_endpoint: None,
            s3_force_path_style: false,
            converter_binary: "soffice".to_string(),
            conversion_timeout_secs: 30,
            signed_url_ttl_secs: 3600,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = AppConfig::default();

        Ok(AppConfig {
            templates_dir: env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
            s3_bucket: env::var("S3_BUCKET").unwrap_or(defaults.s3_bucket),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_force_path_style: env::var("S3_FORCE_PATH_STYLE")
                .map(|v| v.parse::<bool>().unwrap_or(false))
                .unwrap_or(defaults.s3_force_path_style),
            converter_binary: env::var("CONVERTER_BINARY").unwrap_or(defaults.converter_binary),
            conversion_timeout_secs: env::var("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.conversion_timeout_secs.to_string())
                .parse()?,
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .unwrap_or_else(|_| defaults.signed_url_ttl_secs.to_string())
                .parse()?,
        })
    }
}
