//! Result of a decode call: the decoded bytes and a public status code.

use num_enum::TryFromPrimitive;

use crate::error::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum Status {
    Success = 0,
    /// The decoder could not populate the output buffer.
    DecodeFailed = 1,
    /// The input could not be parsed as a DICOM stream.
    Unreadable = 2,
}

impl Status {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Decoded pixel data owned by the caller.
///
/// A failed decode never carries bytes: whatever was allocated before the
/// failure has already been dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBuffer {
    data: Vec<u8>,
    status: Status,
}

impl DecodedBuffer {
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            data,
            status: Status::Success,
        }
    }

    pub fn failure(status: Status) -> Self {
        Self {
            data: Vec::new(),
            status,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<Result<Vec<u8>>> for DecodedBuffer {
    fn from(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(data) => DecodedBuffer::success(data),
            Err(e) => {
                log::warn!("Pixel data decode failed: {}", e);
                DecodedBuffer::failure(e.status())
            }
        }
    }
}
