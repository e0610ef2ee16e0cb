//! Upload handling stages ahead of the model call.
//!
//! - **validate**: cheap checks on the raw upload (size, extension, magic bytes)
//! - **decode**: decode bytes into pixels with limits and a timeout
//! - **normalize**: flatten alpha, convert modes, re-encode as base64 JPEG

pub mod decode;
pub mod normalize;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use normalize::Normalizer;
pub use validate::Validator;
