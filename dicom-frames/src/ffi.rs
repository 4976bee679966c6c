//! C ABI. See `include/dicom_frames.h`.
//!
//! Every entry point returns a [`PixelData`] by value. On status 0 the
//! caller owns `buffer` and must hand the struct back to
//! [`c_free_pixel_data`]. On any other status `buffer` is null and `size`
//! is 0.

use std::ffi::{c_char, c_int, c_uint, c_ushort};
use std::panic::{self, AssertUnwindSafe};
use std::{ptr, slice};

use crate::descriptor::{Dims, ImageDescriptor, PixelFormat};
use crate::fragments::assemble;
use crate::output::{DecodedBuffer, Status};

#[repr(C)]
#[derive(Debug)]
pub struct PixelData {
    pub buffer: *mut c_char,
    pub status: c_uint,
    pub size: usize,
}

impl PixelData {
    fn failure(status: Status) -> Self {
        Self {
            buffer: ptr::null_mut(),
            status: status.code(),
            size: 0,
        }
    }
}

impl From<DecodedBuffer> for PixelData {
    fn from(decoded: DecodedBuffer) -> Self {
        let status = decoded.status();
        if status != Status::Success {
            return PixelData::failure(status);
        }

        let bytes = decoded.into_bytes().into_boxed_slice();
        if bytes.is_empty() {
            return Self {
                buffer: ptr::null_mut(),
                status: status.code(),
                size: 0,
            };
        }

        let size = bytes.len();
        let buffer = Box::into_raw(bytes) as *mut u8 as *mut c_char;
        Self {
            buffer,
            status: status.code(),
            size,
        }
    }
}

/// Run a decode closure, turning a panic into a failed decode.
fn guarded(f: impl FnOnce() -> DecodedBuffer) -> PixelData {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(decoded) => decoded.into(),
        Err(_) => {
            log::error!("Panic while decoding pixel data");
            PixelData::failure(Status::DecodeFailed)
        }
    }
}

/// View a caller buffer; null or zero-length becomes an empty slice.
unsafe fn borrowed<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len)
    }
}

fn pixel_format(
    samples_per_pixel: c_ushort,
    bits_allocated: c_ushort,
    bits_stored: c_ushort,
    high_bit: c_ushort,
    pixel_representation: c_ushort,
) -> PixelFormat {
    PixelFormat {
        samples_per_pixel,
        bits_allocated,
        bits_stored,
        high_bit,
        pixel_representation,
    }
}

/// Decode one compressed frame.
///
/// # Safety
///
/// `i_buffer_ptr` must be null or point to `i_buffer_len` readable bytes.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn c_decode_single_frame(
    i_buffer_ptr: *const c_char,
    i_buffer_len: usize,
    width: c_uint,
    height: c_uint,
    pi_type: c_uint,
    ts_type: c_uint,
    samples_per_pixel: c_ushort,
    bits_allocated: c_ushort,
    bits_stored: c_ushort,
    high_bit: c_ushort,
    pixel_representation: c_ushort,
) -> PixelData {
    let fragment = borrowed(i_buffer_ptr as *const u8, i_buffer_len);
    guarded(|| {
        let descriptor = ImageDescriptor {
            dims: Dims::two(width, height),
            photometric: pi_type,
            transfer_syntax: ts_type,
            pixel_format: pixel_format(
                samples_per_pixel,
                bits_allocated,
                bits_stored,
                high_bit,
                pixel_representation,
            ),
        };
        crate::decode::decode(assemble([fragment], descriptor))
    })
}

/// Decode a multi-frame volume from `i_buffer_len` fragments.
///
/// # Safety
///
/// `i_buffer_ptrs` and `i_buffer_lens` must be null or point to
/// `i_buffer_len` entries, each pointer null or valid for its length.
/// `dims` must be null or point to 3 values.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn c_decode_frames(
    i_buffer_ptrs: *const *const c_char,
    i_buffer_lens: *const usize,
    i_buffer_len: usize,
    dims: *const c_uint,
    pi_type: c_uint,
    ts_type: c_uint,
    samples_per_pixel: c_ushort,
    bits_allocated: c_ushort,
    bits_stored: c_ushort,
    high_bit: c_ushort,
    pixel_representation: c_ushort,
) -> PixelData {
    let ptrs = borrowed(i_buffer_ptrs, i_buffer_len);
    let lens = borrowed(i_buffer_lens, i_buffer_len);
    let fragments: Vec<&[u8]> = ptrs
        .iter()
        .zip(lens)
        .map(|(&ptr, &len)| borrowed(ptr as *const u8, len))
        .collect();
    let dims = Dims::from_slice(borrowed(dims, 3)).unwrap_or_default();

    guarded(|| {
        let descriptor = ImageDescriptor {
            dims,
            photometric: pi_type,
            transfer_syntax: ts_type,
            pixel_format: pixel_format(
                samples_per_pixel,
                bits_allocated,
                bits_stored,
                high_bit,
                pixel_representation,
            ),
        };
        crate::decode::decode(assemble(fragments, descriptor))
    })
}

/// Extract decoded pixel data from a complete DICOM stream.
///
/// # Safety
///
/// `i_buffer_ptr` must be null or point to `i_buffer_len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn c_get_pixel_data(
    i_buffer_ptr: *const c_char,
    i_buffer_len: usize,
) -> PixelData {
    let stream = borrowed(i_buffer_ptr as *const u8, i_buffer_len);
    guarded(|| crate::decode::decode_stream(stream))
}

/// Release a buffer returned by any decode entry point and reset the struct.
///
/// Null pointers, empty results and already released results are ignored.
///
/// # Safety
///
/// `data` must be null or point to a `PixelData` produced by this library
/// and not modified by the caller.
#[no_mangle]
pub unsafe extern "C" fn c_free_pixel_data(data: *mut PixelData) {
    let Some(data) = data.as_mut() else {
        return;
    };

    if !data.buffer.is_null() && data.size > 0 {
        let slice = ptr::slice_from_raw_parts_mut(data.buffer as *mut u8, data.size);
        drop(Box::from_raw(slice));
    }
    data.buffer = ptr::null_mut();
    data.size = 0;
}

/// Initialise `env_logger` for the library's log output. Calling more than
/// once has no effect.
#[no_mangle]
pub extern "C" fn c_init_logging(verbose: c_int) {
    let level = if verbose != 0 {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
