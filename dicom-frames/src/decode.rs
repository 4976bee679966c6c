//! Decode invocation on top of dicom-rs.
//!
//! Two paths share the same output handling: an assembled request is turned
//! into an in-memory DICOM object before decoding, while a complete stream is
//! parsed by dicom-rs itself.

use dicom_core::value::Value;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::mem::InMemElement;
use dicom_object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject, OpenFileOptions};
use dicom_pixeldata::PixelDecoder;
use uuid::Uuid;

use std::panic::{self, AssertUnwindSafe};

use crate::codes::PixelRepresentation;
use crate::descriptor::{Dims, PixelFormat};
use crate::error::{Error, Result};
use crate::fragments::{AssembledRequest, CompressedFragment};
use crate::output::DecodedBuffer;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Decode an assembled request, reporting the outcome as a status code.
pub fn decode(request: AssembledRequest) -> DecodedBuffer {
    DecodedBuffer::from(try_decode(request))
}

/// Decode an assembled request into exactly `buffer_length()` bytes.
pub fn try_decode(request: AssembledRequest) -> Result<Vec<u8>> {
    request.validate()?;

    let multi_frame = request.is_multi_frame();
    let (sequence, descriptor) = request.into_parts();
    let compressed: usize = sequence.iter().map(CompressedFragment::len).sum();
    let photometric = descriptor.photometric_interpretation()?;
    let transfer_syntax = descriptor.transfer_syntax_kind()?;
    let length = descriptor.buffer_length()?;

    let rows = u16::try_from(descriptor.dims.height());
    let columns = u16::try_from(descriptor.dims.width());
    let (Ok(rows), Ok(columns)) = (rows, columns) else {
        return Err(Error::DimensionOutOfRange {
            width: descriptor.dims.width(),
            height: descriptor.dims.height(),
            frames: descriptor.dims.frames(),
        });
    };

    let format = descriptor.pixel_format;
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    let instance_uid = new_instance_uid();
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(instance_uid.as_str()),
    ));
    obj.put(us(tags::ROWS, rows));
    obj.put(us(tags::COLUMNS, columns));
    if multi_frame {
        obj.put(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(descriptor.dims.frames().to_string()),
        ));
    }
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from(photometric.as_str()),
    ));
    obj.put(us(tags::SAMPLES_PER_PIXEL, format.samples_per_pixel));
    obj.put(us(tags::BITS_ALLOCATED, format.bits_allocated));
    obj.put(us(tags::BITS_STORED, format.bits_stored));
    obj.put(us(tags::HIGH_BIT, format.high_bit));
    obj.put(us(tags::PIXEL_REPRESENTATION, format.pixel_representation));
    // TODO: set PlanarConfiguration once multi-sample planar input is supported
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        Value::PixelSequence(sequence.into_pixel_sequence()),
    ));

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(transfer_syntax.uid())
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(instance_uid),
        )
        .map_err(|e| Error::InvalidMeta(e.to_string()))?;

    log::debug!(
        "Decoding {}x{}x{} {:?} image ({:?}), {} compressed bytes, {} bytes expected",
        columns,
        rows,
        descriptor.dims.frames(),
        photometric,
        transfer_syntax,
        compressed,
        length
    );

    copy_decoded(&file, &descriptor.dims, length)
}

/// Parse a complete DICOM stream and extract its decoded pixel data.
pub fn decode_stream(bytes: &[u8]) -> DecodedBuffer {
    DecodedBuffer::from(try_decode_stream(bytes))
}

pub fn try_decode_stream(bytes: &[u8]) -> Result<Vec<u8>> {
    let body = strip_preamble(bytes);
    let file = OpenFileOptions::new()
        .from_reader(body)
        .map_err(|e| Error::Unreadable(e.to_string()))?;

    let (dims, length) = stream_buffer_length(&file)?;
    log::debug!("Extracting pixel data from stream, {} bytes expected", length);

    copy_decoded(&file, &dims, length)
}

/// Decode the object's pixel data into a freshly allocated buffer of
/// exactly `length` bytes.
///
/// A buffer that cannot be reserved is a `DimensionOutOfRange` error. A codec
/// panic on malformed fragments is a decode failure.
fn copy_decoded(file: &DefaultDicomObject, dims: &Dims, length: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(length)
        .map_err(|_| Error::DimensionOutOfRange {
            width: dims.width(),
            height: dims.height(),
            frames: dims.frames(),
        })?;

    let decoded = panic::catch_unwind(AssertUnwindSafe(move || file.decode_pixel_data()))
        .map_err(|_| Error::Decode("codec panicked on malformed pixel data".to_string()))?
        .map_err(|e| Error::Decode(e.to_string()))?;
    let data = decoded.data();
    if data.len() < length {
        return Err(Error::ShortBuffer {
            expected: length,
            actual: data.len(),
        });
    }

    buffer.extend_from_slice(&data[..length]);
    Ok(buffer)
}

/// Geometry and expected decoded length of a parsed stream. A stream without
/// image attributes is not a readable image.
fn stream_buffer_length(file: &DefaultDicomObject) -> Result<(Dims, usize)> {
    if file.element(tags::PIXEL_DATA).is_err() {
        return Err(Error::Unreadable("no pixel data element".to_string()));
    }

    let rows = required(file, tags::ROWS, "Rows")?;
    let columns = required(file, tags::COLUMNS, "Columns")?;
    let frames = optional(file, tags::NUMBER_OF_FRAMES).unwrap_or(1).max(1);
    let samples_per_pixel = optional(file, tags::SAMPLES_PER_PIXEL).unwrap_or(1);
    let bits_allocated = required(file, tags::BITS_ALLOCATED, "BitsAllocated")?;

    let format = PixelFormat {
        samples_per_pixel: u16::try_from(samples_per_pixel).unwrap_or(u16::MAX),
        bits_allocated: u16::try_from(bits_allocated).unwrap_or(u16::MAX),
        ..PixelFormat::monochrome(8, PixelRepresentation::Unsigned)
    };
    let length = usize::try_from(u64::from(rows) * u64::from(columns))
        .ok()
        .and_then(|plane| plane.checked_mul(usize::try_from(frames).ok()?))
        .and_then(|pixels| format.buffer_length(pixels))
        .ok_or(Error::DimensionOutOfRange {
            width: columns,
            height: rows,
            frames,
        })?;

    Ok((Dims::three(columns, rows, frames), length))
}

fn required(file: &DefaultDicomObject, tag: Tag, name: &str) -> Result<u32> {
    optional(file, tag).ok_or_else(|| Error::Unreadable(format!("missing or invalid {}", name)))
}

fn optional(file: &DefaultDicomObject, tag: Tag) -> Option<u32> {
    file.element(tag).ok()?.to_int::<u32>().ok()
}

fn strip_preamble(bytes: &[u8]) -> &[u8] {
    match bytes.get(PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()) {
        Some(magic) if magic == MAGIC => &bytes[PREAMBLE_LEN..],
        _ => bytes,
    }
}

fn us(tag: Tag, value: u16) -> InMemElement {
    DataElement::new(tag, VR::US, PrimitiveValue::from(value))
}

/// UUID-derived UID under the `2.25` root.
fn new_instance_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}
