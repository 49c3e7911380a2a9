use thiserror::Error;

/// Error taxonomy for the assembly pipeline.
///
/// Per-document failures (`Document`, `Converter`) are caught by the
/// orchestrator, recorded as warnings and skipped. `Merge` and `Storage`
/// failures abort the request.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("document processing failed: {0}")]
    Document(String),

    #[error("{0}")]
    Converter(String),

    #[error("merge failed: {0}")]
    Merge(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
