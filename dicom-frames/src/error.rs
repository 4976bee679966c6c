//! Decode errors and their mapping onto the public status codes.

use crate::output::Status;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no compressed fragments were supplied")]
    EmptyFragments,

    #[error("fragment {index} is empty")]
    EmptyFragment { index: usize },

    #[error("{fragments} fragment(s) require {expected} dimensions, got {actual}")]
    DimensionMismatch {
        fragments: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image dimensions {width}x{height}x{frames} are out of range")]
    DimensionOutOfRange { width: u32, height: u32, frames: u32 },

    #[error("unknown photometric interpretation code {0}")]
    UnknownPhotometric(u32),

    #[error("unknown transfer syntax code {0}")]
    UnknownTransferSyntax(u32),

    #[error("could not attach file meta group: {0}")]
    InvalidMeta(String),

    #[error("stream is not a readable DICOM image: {0}")]
    Unreadable(String),

    #[error("pixel data decoding failed: {0}")]
    Decode(String),

    #[error("decoder produced {actual} bytes, expected {expected}")]
    ShortBuffer { expected: usize, actual: usize },

    #[error("unsupported pixel format: {samples_per_pixel} sample(s) of {bits_allocated} bits")]
    UnsupportedPixelFormat {
        samples_per_pixel: u16,
        bits_allocated: u16,
    },

    #[error("invalid image descriptor: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Status code reported across the C boundary for this failure.
    pub fn status(&self) -> Status {
        match self {
            Error::Unreadable(_) => Status::Unreadable,
            _ => Status::DecodeFailed,
        }
    }
}
