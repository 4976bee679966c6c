//! Integer codes for photometric interpretation, transfer syntax and pixel
//! representation.
//!
//! The numbering follows the imaging library enumerations callers already
//! speak over the C boundary. Each code also converts to and from its DICOM
//! string form.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use std::str::FromStr;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, TryFromPrimitive, EnumCount, EnumIter,
)]
#[repr(u32)]
pub enum PhotometricInterpretation {
    Unknown = 0,
    Monochrome1 = 1,
    Monochrome2 = 2,
    PaletteColor = 3,
    Rgb = 4,
    Hsv = 5,
    Argb = 6,
    Cmyk = 7,
    YbrFull = 8,
    YbrFull422 = 9,
    YbrPartial422 = 10,
    YbrPartial420 = 11,
    YbrIct = 12,
    YbrRct = 13,
}

impl PhotometricInterpretation {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    /// Value of the Photometric Interpretation (0028,0004) attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotometricInterpretation::Unknown => "",
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::Hsv => "HSV",
            PhotometricInterpretation::Argb => "ARGB",
            PhotometricInterpretation::Cmyk => "CMYK",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::YbrPartial422 => "YBR_PARTIAL_422",
            PhotometricInterpretation::YbrPartial420 => "YBR_PARTIAL_420",
            PhotometricInterpretation::YbrIct => "YBR_ICT",
            PhotometricInterpretation::YbrRct => "YBR_RCT",
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, TryFromPrimitive, EnumCount, EnumIter,
)]
#[repr(u32)]
pub enum TransferSyntax {
    ImplicitVrLittleEndian = 0,
    ImplicitVrBigEndianPrivateGe = 1,
    ExplicitVrLittleEndian = 2,
    DeflatedExplicitVrLittleEndian = 3,
    ExplicitVrBigEndian = 4,
    JpegBaselineProcess1 = 5,
    JpegExtendedProcess2_4 = 6,
    JpegExtendedProcess3_5 = 7,
    JpegSpectralSelectionProcess6_8 = 8,
    JpegFullProgressionProcess10_12 = 9,
    JpegLosslessProcess14 = 10,
    JpegLosslessProcess14_1 = 11,
    JpegLsLossless = 12,
    JpegLsNearLossless = 13,
    Jpeg2000Lossless = 14,
    Jpeg2000 = 15,
    Jpeg2000Part2Lossless = 16,
    Jpeg2000Part2 = 17,
    RleLossless = 18,
    Mpeg2MainProfile = 19,
}

impl TransferSyntax {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn uid(&self) -> &'static str {
        match self {
            TransferSyntax::ImplicitVrLittleEndian => "1.2.840.10008.1.2",
            TransferSyntax::ImplicitVrBigEndianPrivateGe => "1.2.840.113619.5.2",
            TransferSyntax::ExplicitVrLittleEndian => "1.2.840.10008.1.2.1",
            TransferSyntax::DeflatedExplicitVrLittleEndian => "1.2.840.10008.1.2.1.99",
            TransferSyntax::ExplicitVrBigEndian => "1.2.840.10008.1.2.2",
            TransferSyntax::JpegBaselineProcess1 => "1.2.840.10008.1.2.4.50",
            TransferSyntax::JpegExtendedProcess2_4 => "1.2.840.10008.1.2.4.51",
            TransferSyntax::JpegExtendedProcess3_5 => "1.2.840.10008.1.2.4.52",
            TransferSyntax::JpegSpectralSelectionProcess6_8 => "1.2.840.10008.1.2.4.53",
            TransferSyntax::JpegFullProgressionProcess10_12 => "1.2.840.10008.1.2.4.55",
            TransferSyntax::JpegLosslessProcess14 => "1.2.840.10008.1.2.4.57",
            TransferSyntax::JpegLosslessProcess14_1 => "1.2.840.10008.1.2.4.70",
            TransferSyntax::JpegLsLossless => "1.2.840.10008.1.2.4.80",
            TransferSyntax::JpegLsNearLossless => "1.2.840.10008.1.2.4.81",
            TransferSyntax::Jpeg2000Lossless => "1.2.840.10008.1.2.4.90",
            TransferSyntax::Jpeg2000 => "1.2.840.10008.1.2.4.91",
            TransferSyntax::Jpeg2000Part2Lossless => "1.2.840.10008.1.2.4.92",
            TransferSyntax::Jpeg2000Part2 => "1.2.840.10008.1.2.4.93",
            TransferSyntax::RleLossless => "1.2.840.10008.1.2.5",
            TransferSyntax::Mpeg2MainProfile => "1.2.840.10008.1.2.4.100",
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TryFromPrimitive,
)]
#[repr(u16)]
pub enum PixelRepresentation {
    #[default]
    Unsigned = 0,
    Signed = 1,
}

#[derive(Debug)]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseError {}

impl TryFrom<&str> for PhotometricInterpretation {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        // DICOM pads odd-length strings with a trailing space
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Self::iter()
            .filter(|pi| *pi != PhotometricInterpretation::Unknown)
            .find(|pi| pi.as_str() == normalized)
            .ok_or_else(|| ParseError {
                kind: "photometric interpretation",
                value: s.to_string(),
            })
    }
}

impl FromStr for PhotometricInterpretation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for TransferSyntax {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let uid = s.trim_end_matches(['\0', ' ']);
        Self::iter()
            .find(|ts| ts.uid() == uid)
            .ok_or_else(|| ParseError {
                kind: "transfer syntax UID",
                value: s.to_string(),
            })
    }
}

impl FromStr for TransferSyntax {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}
