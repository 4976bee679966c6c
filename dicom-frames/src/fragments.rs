//! Assembly of compressed fragments into an encapsulated pixel data payload.

use dicom_core::value::PixelFragmentSequence;

use crate::descriptor::ImageDescriptor;
use crate::error::{Error, Result};

/// One chunk of compressed pixel bytes, copied out of the caller's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFragment(Vec<u8>);

impl CompressedFragment {
    pub fn new(bytes: &[u8]) -> Self {
        CompressedFragment(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered fragments making up the encapsulated pixel data of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentSequence {
    fragments: Vec<CompressedFragment>,
}

impl FragmentSequence {
    pub fn push(&mut self, fragment: CompressedFragment) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompressedFragment> {
        self.fragments.iter()
    }

    /// Number of dimensions the descriptor must carry for this many fragments.
    pub fn expected_dims(&self) -> usize {
        if self.fragments.len() == 1 {
            2
        } else {
            3
        }
    }

    /// Consume the sequence into a pixel data value with an empty basic
    /// offset table.
    pub fn into_pixel_sequence(self) -> PixelFragmentSequence<Vec<u8>> {
        let fragments: Vec<Vec<u8>> = self.fragments.into_iter().map(|f| f.0).collect();
        PixelFragmentSequence::new(Vec::<u32>::new(), fragments)
    }
}

/// Fragments plus descriptor, ready to be handed to the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRequest {
    sequence: FragmentSequence,
    descriptor: ImageDescriptor,
}

impl AssembledRequest {
    pub fn sequence(&self) -> &FragmentSequence {
        &self.sequence
    }

    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn is_multi_frame(&self) -> bool {
        self.sequence.len() > 1
    }

    /// Check the invariants assembly leaves for the decode step.
    pub fn validate(&self) -> Result<()> {
        if self.sequence.is_empty() {
            return Err(Error::EmptyFragments);
        }

        if let Some(index) = self.sequence.iter().position(CompressedFragment::is_empty) {
            return Err(Error::EmptyFragment { index });
        }

        let expected = self.sequence.expected_dims();
        if self.descriptor.dims.len() != expected {
            return Err(Error::DimensionMismatch {
                fragments: self.sequence.len(),
                expected,
                actual: self.descriptor.dims.len(),
            });
        }

        Ok(())
    }

    pub fn into_parts(self) -> (FragmentSequence, ImageDescriptor) {
        (self.sequence, self.descriptor)
    }
}

/// Copy each input buffer, in order, into a fragment sequence and pair it
/// with the descriptor.
///
/// Never fails; malformed input is reported by [`AssembledRequest::validate`]
/// when the request is decoded.
pub fn assemble<'a, I>(fragments: I, descriptor: ImageDescriptor) -> AssembledRequest
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut sequence = FragmentSequence::default();
    for (i, bytes) in fragments.into_iter().enumerate() {
        log::trace!("Fragment {}: {} bytes", i, bytes.len());
        sequence.push(CompressedFragment::new(bytes));
    }

    log::debug!(
        "Assembled {} fragment(s) for {:?} image",
        sequence.len(),
        descriptor.dims.as_slice()
    );

    AssembledRequest {
        sequence,
        descriptor,
    }
}
