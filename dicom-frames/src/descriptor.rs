//! Image geometry and pixel format supplied alongside the compressed bytes.

use anyhow::Context;
use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize};

use std::fs;
use std::path::Path;

use crate::codes::{PhotometricInterpretation, PixelRepresentation, TransferSyntax};
use crate::error::{Error, Result};

/// Image dimensions: `[width, height]` or `[width, height, frames]`.
///
/// Stored on the stack; a fourth axis is rejected on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims(ArrayVec<u32, 3>);

impl Dims {
    pub fn two(width: u32, height: u32) -> Self {
        Dims(ArrayVec::from_iter([width, height]))
    }

    pub fn three(width: u32, height: u32, frames: u32) -> Self {
        Dims(ArrayVec::from([width, height, frames]))
    }

    /// Build from an arbitrary slice. Returns `None` for more than 3 axes.
    pub fn from_slice(dims: &[u32]) -> Option<Self> {
        ArrayVec::try_from(dims).ok().map(Dims)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.first().copied().unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.0.get(1).copied().unwrap_or(0)
    }

    /// Number of frames; a 2-D image is a single frame.
    pub fn frames(&self) -> u32 {
        self.0.get(2).copied().unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,
    pub pixel_representation: u16,
}

impl PixelFormat {
    pub fn new(
        samples_per_pixel: u16,
        bits_allocated: u16,
        bits_stored: u16,
        high_bit: u16,
        pixel_representation: PixelRepresentation,
    ) -> Self {
        Self {
            samples_per_pixel,
            bits_allocated,
            bits_stored,
            high_bit,
            pixel_representation: pixel_representation as u16,
        }
    }

    /// Single-sample format with every allocated bit stored.
    pub fn monochrome(bits: u16, pixel_representation: PixelRepresentation) -> Self {
        Self::new(1, bits, bits, bits.saturating_sub(1), pixel_representation)
    }

    /// 8-bit interleaved RGB.
    pub fn rgb8() -> Self {
        Self::new(3, 8, 8, 7, PixelRepresentation::Unsigned)
    }

    pub fn is_signed(&self) -> bool {
        self.pixel_representation == PixelRepresentation::Signed as u16
    }

    /// Decoded size in bytes of `pixels` pixels, 1-bit data packed 8 per byte.
    pub fn buffer_length(&self, pixels: usize) -> Option<usize> {
        let samples = pixels.checked_mul(usize::from(self.samples_per_pixel))?;
        match self.bits_allocated {
            1 => Some(samples.div_ceil(8)),
            bits => samples.checked_mul(usize::from(bits).div_ceil(8)),
        }
    }
}

/// Everything the decoder needs to know about an image that is not carried
/// by the compressed bytes themselves.
///
/// Photometric and transfer-syntax values are raw integer codes passed
/// through unvalidated; see [`crate::codes`] for their meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub dims: Dims,
    #[serde(deserialize_with = "photometric_code")]
    pub photometric: u32,
    #[serde(deserialize_with = "transfer_syntax_code")]
    pub transfer_syntax: u32,
    #[serde(flatten)]
    pub pixel_format: PixelFormat,
}

impl ImageDescriptor {
    pub fn single_frame(
        width: u32,
        height: u32,
        photometric: PhotometricInterpretation,
        transfer_syntax: TransferSyntax,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            dims: Dims::two(width, height),
            photometric: photometric.code(),
            transfer_syntax: transfer_syntax.code(),
            pixel_format,
        }
    }

    pub fn multi_frame(
        width: u32,
        height: u32,
        frames: u32,
        photometric: PhotometricInterpretation,
        transfer_syntax: TransferSyntax,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            dims: Dims::three(width, height, frames),
            photometric: photometric.code(),
            transfer_syntax: transfer_syntax.code(),
            pixel_format,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    /// Load a descriptor from a JSON sidecar file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse descriptor {}", path.display()))
    }

    pub fn photometric_interpretation(&self) -> Result<PhotometricInterpretation> {
        PhotometricInterpretation::try_from(self.photometric)
            .map_err(|_| Error::UnknownPhotometric(self.photometric))
    }

    pub fn transfer_syntax_kind(&self) -> Result<TransferSyntax> {
        TransferSyntax::try_from(self.transfer_syntax)
            .map_err(|_| Error::UnknownTransferSyntax(self.transfer_syntax))
    }

    pub fn pixel_count(&self) -> Option<usize> {
        let width = usize::try_from(self.dims.width()).ok()?;
        let height = usize::try_from(self.dims.height()).ok()?;
        let frames = usize::try_from(self.dims.frames()).ok()?;
        width.checked_mul(height)?.checked_mul(frames)
    }

    /// Expected size of the decoded buffer for the whole image.
    pub fn buffer_length(&self) -> Result<usize> {
        self.pixel_count()
            .and_then(|pixels| self.pixel_format.buffer_length(pixels))
            .ok_or(Error::DimensionOutOfRange {
                width: self.dims.width(),
                height: self.dims.height(),
                frames: self.dims.frames(),
            })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u32),
    Name(String),
}

fn photometric_code<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawCode::deserialize(deserializer)? {
        RawCode::Number(code) => Ok(code),
        RawCode::Name(name) => name
            .parse::<PhotometricInterpretation>()
            .map(PhotometricInterpretation::code)
            .map_err(serde::de::Error::custom),
    }
}

fn transfer_syntax_code<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawCode::deserialize(deserializer)? {
        RawCode::Number(code) => Ok(code),
        RawCode::Name(uid) => uid
            .parse::<TransferSyntax>()
            .map(TransferSyntax::code)
            .map_err(serde::de::Error::custom),
    }
}
