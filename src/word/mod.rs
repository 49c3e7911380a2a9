pub mod convert;
pub mod filler;

pub use convert::OfficeConverter;
pub use filler::fill_docx;
