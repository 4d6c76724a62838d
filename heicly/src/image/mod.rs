//! HEIC decoding and JPEG encoding

mod decode;
mod encode;

pub use decode::decode_heic;
pub use encode::{compress_to_jpeg, encode_jpeg};

/// Extension written for converted images
pub const JPEG_EXTENSION: &str = "jpg";
