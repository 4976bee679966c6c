//! Decode DICOM pixel data from compressed fragments.
//!
//! The crate assembles one or more compressed fragments into an encapsulated
//! pixel data element, attaches the caller's geometry and pixel format, and
//! hands the result to the dicom-rs pixel data decoder. The same operations
//! are exposed to C through [`ffi`].

pub mod codes;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod ffi;
pub mod fragments;
pub mod image;
pub mod output;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use codes::{PhotometricInterpretation, PixelRepresentation, TransferSyntax};
pub use decode::{decode, decode_stream};
pub use descriptor::{Dims, ImageDescriptor, PixelFormat};
pub use error::{Error, Result};
pub use fragments::{assemble, AssembledRequest, CompressedFragment, FragmentSequence};
pub use image::to_dynamic_image;
pub use output::{DecodedBuffer, Status};

/// Decode a single compressed frame described by a 2-D descriptor.
pub fn decode_single_frame(fragment: &[u8], descriptor: ImageDescriptor) -> Result<Vec<u8>> {
    decode::try_decode(assemble([fragment], descriptor))
}

/// Decode a multi-frame volume from its fragments and a 3-D descriptor.
pub fn decode_multi_frame(fragments: &[&[u8]], descriptor: ImageDescriptor) -> Result<Vec<u8>> {
    decode::try_decode(assemble(fragments.iter().copied(), descriptor))
}

/// Extract decoded pixel data from a complete DICOM stream.
pub fn extract_pixel_data(stream: &[u8]) -> Result<Vec<u8>> {
    decode::try_decode_stream(stream)
}
