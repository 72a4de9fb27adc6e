// pdf2html Infrastructure - System Adapters
// Implements: JobFilesystem, PdfConverter

pub mod local_filesystem;
pub mod pdf2htmlex_converter;

pub use local_filesystem::LocalFilesystem;
pub use pdf2htmlex_converter::{ConverterSettings, Pdf2HtmlExConverter};
