pub mod form;
pub mod merge;

pub use form::{classify_and_fill, inspect_fields, FieldKind, FormField, PdfClass};
pub use merge::merge_pdfs;
