//! Conversion of decoded buffers into `image` crate types.

use byteorder::{ByteOrder, LittleEndian};
use imageproc::image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

use crate::descriptor::ImageDescriptor;
use crate::error::{Error, Result};

/// Build an image from one frame of a decoded buffer.
///
/// Supports 8-bit and 16-bit grayscale and 8-bit interleaved RGB. Signed
/// 16-bit samples are shifted into the unsigned range so that the lowest
/// value maps to black.
pub fn to_dynamic_image(
    data: &[u8],
    descriptor: &ImageDescriptor,
    frame: u32,
) -> Result<DynamicImage> {
    let width = descriptor.dims.width();
    let height = descriptor.dims.height();
    let format = descriptor.pixel_format;
    let frames = descriptor.dims.frames();

    let total = descriptor.buffer_length()?;
    if data.len() < total {
        return Err(Error::ShortBuffer {
            expected: total,
            actual: data.len(),
        });
    }
    if frame >= frames {
        return Err(Error::DimensionOutOfRange {
            width,
            height,
            frames,
        });
    }

    let frame_len = total / frames as usize;
    let start = frame as usize * frame_len;
    let bytes = &data[start..start + frame_len];

    let unsupported = || Error::UnsupportedPixelFormat {
        samples_per_pixel: format.samples_per_pixel,
        bits_allocated: format.bits_allocated,
    };
    let short = || Error::ShortBuffer {
        expected: frame_len,
        actual: bytes.len(),
    };

    match (format.samples_per_pixel, format.bits_allocated) {
        (1, 8) => GrayImage::from_raw(width, height, bytes.to_vec())
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(short),
        (1, 16) => {
            let mut samples = vec![0u16; bytes.len() / 2];
            LittleEndian::read_u16_into(bytes, &mut samples);
            if format.is_signed() {
                for sample in samples.iter_mut() {
                    *sample = (*sample as i16 as i32 + 0x8000) as u16;
                }
            }
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, samples)
                .map(DynamicImage::ImageLuma16)
                .ok_or_else(short)
        }
        (3, 8) => RgbImage::from_raw(width, height, bytes.to_vec())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(short),
        _ => Err(unsupported()),
    }
}
