//! `rollmark-recognition` — identifier extraction adapter.
//!
//! Turns a batch of data-URI encoded sheet photos into a deduplicated set of
//! candidate student identifiers by delegating to the external recognition
//! service over one multipart request.

pub mod client;
pub mod image;

pub use client::RecognitionClient;
pub use image::{decode_batch, decode_data_uri, DecodedImage};
