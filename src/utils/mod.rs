//! Utility modules shared by the fetch, parse and browse layers

pub mod decompression;
pub mod url;

pub use decompression::{BodyCompression, decompress_body};
