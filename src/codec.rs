//! Length-prefixed bincode framing for [`Request`] and [`Response`].
//!
//! Every frame is a big-endian [`Header`] holding the payload length,
//! followed by the bincode encoding of the message. Both directions refuse
//! payloads over a per-codec limit with [`CodecError::FrameTooLarge`], which
//! leaves the buffer untouched so the stream stays usable.
//!
//! [`Request`]: crate::protocol::Request
//! [`Response`]: crate::protocol::Response

use std::fmt;
use std::io;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

pub type Header = u32;

pub const HEADER_SIZE: usize = std::mem::size_of::<Header>();

/// Default payload limit in bytes. A full listing of 50k maximum length keys
/// fits.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 << 20;

/// Errors raised while framing messages
#[derive(Debug)]
pub enum CodecError {
    /// The underlying stream failed
    Io(io::Error),
    /// The payload could not be serialized or deserialized
    Bincode(bincode::Error),
    /// The payload is larger than the codec accepts
    FrameTooLarge {
        /// Payload length, in bytes
        len: usize,
        /// Limit of the codec that refused it
        max: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Io(e) => write!(f, "i/o error: {}", e),
            CodecError::Bincode(e) => write!(f, "malformed payload: {}", e),
            CodecError::FrameTooLarge { len, max } => {
                write!(f, "frame too large ({} bytes, limit is {})", len, max)
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            CodecError::Bincode(e) => Some(e),
            CodecError::FrameTooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}

impl From<bincode::Error> for CodecError {
    fn from(e: bincode::Error) -> Self {
        CodecError::Bincode(e)
    }
}

/// Returns the payload length of `item` once encoded, without the header
pub fn payload_len<T: Serialize>(item: &T) -> Result<usize, CodecError> {
    Ok(bincode::serialized_size(item)? as usize)
}

pub struct TypeToBytes<T>
where
    T: Serialize,
{
    max_frame_len: usize,
    _phantom: PhantomData<T>,
}

pub struct BytesToType<T>
where
    T: for<'de> Deserialize<'de>,
{
    max_frame_len: usize,
    _phantom: PhantomData<T>,
}

impl<T> TypeToBytes<T>
where
    T: Serialize,
{
    /// Creates an encoder refusing payloads over `max_frame_len` bytes
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            _phantom: PhantomData,
        }
    }
}

impl<T> BytesToType<T>
where
    T: for<'de> Deserialize<'de>,
{
    /// Creates a decoder refusing payloads over `max_frame_len` bytes
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for TypeToBytes<T>
where
    T: Serialize,
{
    fn default() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }
}

impl<T> Default for BytesToType<T>
where
    T: for<'de> Deserialize<'de>,
{
    fn default() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }
}

impl<T> Encoder<T> for TypeToBytes<T>
where
    T: Serialize,
{
    type Error = CodecError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // refuse before serializing so an oversized item costs no allocation
        let len = payload_len(&item)?;
        if len > self.max_frame_len {
            return Err(CodecError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        let buf = bincode::serialize(&item)?;
        let len_slice = Header::to_be_bytes(buf.len() as Header);

        // one reservation for header and payload
        dst.reserve(len_slice.len() + buf.len());
        dst.extend_from_slice(&len_slice);
        dst.extend_from_slice(&buf);

        Ok(())
    }
}

impl<T> Decoder for BytesToType<T>
where
    T: for<'de> Deserialize<'de>,
{
    type Item = T;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // peek at the header without consuming it
        let mut len_bytes = [0u8; HEADER_SIZE];
        len_bytes.copy_from_slice(&src[..HEADER_SIZE]);
        let len = Header::from_be_bytes(len_bytes) as usize;

        if len > self.max_frame_len {
            return Err(CodecError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        if src.len() < HEADER_SIZE + len {
            // payload not complete yet
            src.reserve(HEADER_SIZE + len - src.len());
            return Ok(None);
        }

        let item: T = bincode::deserialize(&src[HEADER_SIZE..HEADER_SIZE + len])?;
        src.advance(HEADER_SIZE + len);

        Ok(Some(item))
    }
}
