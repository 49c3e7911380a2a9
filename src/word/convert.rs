//! Word-to-PDF conversion through a headless LibreOffice subprocess.
//!
//! Each conversion gets its own scratch directory, so concurrent requests
//! never collide on file names. The `TempDir` guard removes the directory
//! when it goes out of scope, on every exit path including timeout.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use crate::core::{AssemblyError, AssemblyResult};

pub struct OfficeConverter {
    binary: String,
    timeout: Duration,
}

impl OfficeConverter {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        OfficeConverter {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Convert a binary Word document to PDF bytes.
    ///
    /// The buffer is written to a scratch file, `soffice --headless
    /// --convert-to pdf` runs against it bounded by the configured timeout,
    /// and the produced PDF is read back.
    pub async fn docx_to_pdf(&self, docx: &[u8]) -> AssemblyResult<Vec<u8>> {
        let scratch = TempDir::new()
            .map_err(|e| AssemblyError::Converter(format!("failed to create scratch dir: {e}")))?;

        let input = scratch
            .path()
            .join(format!("lease-{}.docx", Uuid::new_v4()));
        tokio::fs::write(&input, docx)
            .await
            .map_err(|e| AssemblyError::Converter(format!("failed to stage document: {e}")))?;

        let pdf = self.run_conversion(scratch.path(), &input).await?;

        // scratch (input and converter output) is removed on drop
        Ok(pdf)
    }

    async fn run_conversion(&self, outdir: &Path, input: &Path) -> AssemblyResult<Vec<u8>> {
        let invocation = tokio::process::Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(outdir)
            .arg(input)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, invocation).await {
            Err(_) => {
                return Err(AssemblyError::Converter(format!(
                    "conversion timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(e)) => {
                return Err(AssemblyError::Converter(format!(
                    "conversion failed, verify LibreOffice (soffice) is installed: {e}"
                )))
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AssemblyError::Converter(format!(
                "conversion failed, verify LibreOffice (soffice) is installed: {}",
                stderr.trim()
            )));
        }

        let produced = input.with_extension("pdf");
        if !produced.exists() {
            return Err(AssemblyError::Converter(
                "PDF not generated by the office converter".to_string(),
            ));
        }

        tokio::fs::read(&produced)
            .await
            .map_err(|e| AssemblyError::Converter(format!("failed to read converted PDF: {e}")))
    }
}
