pub mod convert;
pub mod filename;
pub mod image;

// Re-export commonly used types
pub use convert::{Converter, DecodeFn, DEFAULT_JPEG_QUALITY};
pub use filename::{allowed_file, secure_filename, FilenameError, UploadName};
