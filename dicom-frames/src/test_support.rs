//! Encoders used to build test payloads.

use byteorder::{LittleEndian, WriteBytesExt};
use dicom_core::value::{PixelFragmentSequence, Value};
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::mem::InMemElement;
use dicom_object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject};
use imageproc::image::codecs::jpeg::JpegEncoder;
use imageproc::image::GrayImage;

/// Deterministic 8-bit test pattern, row-major.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x * 7 + y * 3) % 256) as u8))
        .collect()
}

/// Deterministic 16-bit test pattern that exercises both bytes.
pub fn gradient16(width: u32, height: u32, offset: u16) -> Vec<u16> {
    (0..width * height)
        .map(|i| (i as u16).wrapping_mul(257).wrapping_add(offset))
        .collect()
}

/// Little-endian byte image of 16-bit samples.
pub fn le_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// RLE Lossless fragment for 8-bit single-sample data.
pub fn rle_encode_gray8(samples: &[u8]) -> Vec<u8> {
    rle_fragment(&[samples.to_vec()])
}

/// RLE Lossless fragment for 16-bit single-sample data: one segment of high
/// bytes followed by one segment of low bytes.
pub fn rle_encode_gray16(samples: &[u16]) -> Vec<u8> {
    let high = samples.iter().map(|s| (s >> 8) as u8).collect();
    let low = samples.iter().map(|s| (s & 0xFF) as u8).collect();
    rle_fragment(&[high, low])
}

/// RLE Lossless fragment for interleaved 8-bit RGB data, one segment per
/// channel.
pub fn rle_encode_rgb8(interleaved: &[u8]) -> Vec<u8> {
    let channel = |c: usize| interleaved.iter().skip(c).step_by(3).copied().collect();
    rle_fragment(&[channel(0), channel(1), channel(2)])
}

/// 64-byte RLE header followed by PackBits segments made only of one-byte
/// literal runs, which keeps every segment even-length.
fn rle_fragment(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut fragment = Vec::new();
    fragment
        .write_u32::<LittleEndian>(segments.len() as u32)
        .unwrap();

    let mut offset = 64u32;
    for segment in segments {
        fragment.write_u32::<LittleEndian>(offset).unwrap();
        offset += (segment.len() * 2) as u32;
    }
    fragment.resize(64, 0);

    for segment in segments {
        for &byte in segment {
            fragment.push(0);
            fragment.push(byte);
        }
    }
    fragment
}

pub fn jpeg_gray8(samples: &[u8], width: u32, height: u32) -> Vec<u8> {
    let img = GrayImage::from_raw(width, height, samples.to_vec()).unwrap();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 100)
        .encode_image(&img)
        .unwrap();
    buffer
}

fn us(tag: dicom_core::Tag, value: u16) -> InMemElement {
    DataElement::new(tag, VR::US, PrimitiveValue::from(value))
}

/// 8-bit MONOCHROME2 secondary capture object around `pixel_data`.
fn gray8_object(
    width: u16,
    height: u16,
    pixel_data: Value<InMemDicomObject, Vec<u8>>,
    transfer_syntax: &str,
) -> DefaultDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("2.25.1234"),
    ));
    obj.put(us(tags::ROWS, height));
    obj.put(us(tags::COLUMNS, width));
    obj.put(us(tags::SAMPLES_PER_PIXEL, 1));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(us(tags::BITS_ALLOCATED, 8));
    obj.put(us(tags::BITS_STORED, 8));
    obj.put(us(tags::HIGH_BIT, 7));
    obj.put(us(tags::PIXEL_REPRESENTATION, 0));
    obj.put(DataElement::new(tags::PIXEL_DATA, VR::OB, pixel_data));

    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(transfer_syntax)
            .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
            .media_storage_sop_instance_uid("2.25.1234"),
    )
    .unwrap()
}

/// Encapsulated 8-bit grayscale object holding one compressed fragment,
/// for decoding with dicom-pixeldata directly.
pub fn encapsulated_gray8(
    width: u16,
    height: u16,
    fragment: &[u8],
    transfer_syntax: &str,
) -> DefaultDicomObject {
    let sequence = PixelFragmentSequence::new(Vec::<u32>::new(), vec![fragment.to_vec()]);
    gray8_object(width, height, Value::PixelSequence(sequence), transfer_syntax)
}

/// Complete Part 10 file (preamble included) with native 8-bit pixel data.
pub fn dicom_file(width: u16, height: u16, samples: &[u8]) -> Vec<u8> {
    let file = gray8_object(
        width,
        height,
        PrimitiveValue::from(samples.to_vec()).into(),
        uids::EXPLICIT_VR_LITTLE_ENDIAN,
    );

    let mut bytes = Vec::new();
    file.write_all(&mut bytes).unwrap();
    bytes
}
