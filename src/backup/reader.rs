//! Sequential, seekable little-endian reader over an NBU container.
//!
//! [`NbuReader`] wraps any `Read + Seek` source (a `File`, or a
//! `Cursor<Vec<u8>>` for in-memory images) and decodes the primitives the
//! format is built from: little-endian integers, length-prefixed UTF-16
//! strings, and split Windows file times. It tracks the cursor position
//! itself so that errors can name the offset they happened at.
//!
//! Folder and section traversal jump around the file constantly; the
//! [`at_offset`](NbuReader::at_offset) helper performs a nested read at an
//! absolute offset and always puts the cursor back where it was.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::backup::filetime::FileTime;
use crate::backup::record::ByteRange;
use crate::NbuError;

/// Supertrait combining `Read + Seek` for type-erased readers.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Little-endian reader with a tracked cursor position.
pub struct NbuReader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> NbuReader<R> {
    /// Wrap a source, starting from its current position.
    pub fn new(mut inner: R) -> Result<Self, NbuError> {
        let pos = inner
            .stream_position()
            .map_err(|e| NbuError::SeekFailed(format!("cannot query position: {}", e)))?;
        Ok(NbuReader { inner, pos })
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Unwrap the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_error(&self, e: io::Error, wanted: usize) -> NbuError {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            NbuError::Truncated {
                offset: self.pos,
                wanted,
            }
        } else {
            NbuError::Io(format!(
                "Cannot read {} bytes at offset {}: {}",
                wanted, self.pos, e
            ))
        }
    }

    /// Read exactly `len` bytes.
    ///
    /// Bytes are pulled through `Read::take` so that a corrupt length does
    /// not allocate more than the file can supply.
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, NbuError> {
        let mut buf = Vec::new();
        let result = (&mut self.inner).take(len as u64).read_to_end(&mut buf);
        let got = result.map_err(|e| self.read_error(e, len))?;
        if got < len {
            return Err(NbuError::Truncated {
                offset: self.pos,
                wanted: len,
            });
        }
        self.pos += got as u64;
        Ok(buf)
    }

    /// Read a fixed-size byte array (GUIDs and the like).
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], NbuError> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.read_error(e, N))?;
        self.pos += N as u64;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, NbuError> {
        let v = self.inner.read_u8().map_err(|e| self.read_error(e, 1))?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, NbuError> {
        let v = self
            .inner
            .read_u16::<LittleEndian>()
            .map_err(|e| self.read_error(e, 2))?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32, NbuError> {
        let v = self
            .inner
            .read_u32::<LittleEndian>()
            .map_err(|e| self.read_error(e, 4))?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> Result<u64, NbuError> {
        let v = self
            .inner
            .read_u64::<LittleEndian>()
            .map_err(|e| self.read_error(e, 8))?;
        self.pos += 8;
        Ok(v)
    }

    /// Read `count` UTF-16 code units and append a terminating zero unit.
    ///
    /// The units are not validated; that is the codec's job. Nothing is
    /// allocated for the units until their bytes have been read.
    pub fn read_utf16_units(&mut self, count: usize) -> Result<Vec<u16>, NbuError> {
        let offset = self.pos;
        let too_long = || NbuError::StringTooLong { offset };

        let capacity = count.checked_add(1).ok_or_else(too_long)?;
        let byte_len = count.checked_mul(2).ok_or_else(too_long)?;

        let bytes = self.read_exact(byte_len)?;

        let mut units: Vec<u16> = Vec::new();
        units.try_reserve_exact(capacity).map_err(|_| too_long())?;
        units.resize(count, 0);
        LittleEndian::read_u16_into(&bytes, &mut units);
        units.push(0);
        Ok(units)
    }

    /// Read a UTF-16 string prefixed by its length in code units (`u16`).
    pub fn read_utf16_string(&mut self) -> Result<Vec<u16>, NbuError> {
        let len = self.read_u16()?;
        self.read_utf16_units(usize::from(len))
    }

    /// Read a Windows file time stored as two `u32` values, high part first.
    pub fn read_file_time(&mut self) -> Result<FileTime, NbuError> {
        let high = self.read_u32()?;
        let low = self.read_u32()?;
        Ok(FileTime::from_parts(high, low))
    }

    /// Reposition the cursor.
    pub fn seek(&mut self, target: SeekFrom) -> Result<u64, NbuError> {
        let pos = self
            .inner
            .seek(target)
            .map_err(|e| NbuError::SeekFailed(format!("{:?}: {}", target, e)))?;
        self.pos = pos;
        Ok(pos)
    }

    /// Seek to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<(), NbuError> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    /// Skip `len` bytes forward without reading them.
    pub fn skip(&mut self, len: u64) -> Result<(), NbuError> {
        let delta = i64::try_from(len).map_err(|_| {
            NbuError::SeekFailed(format!("skip of {} bytes at offset {}", len, self.pos))
        })?;
        self.seek(SeekFrom::Current(delta)).map(|_| ())
    }

    /// Record the payload at the cursor as a [`ByteRange`] and skip past it.
    pub fn skip_payload(&mut self, length: u32) -> Result<ByteRange, NbuError> {
        let range = ByteRange::new(self.pos, length);
        self.skip(u64::from(length))?;
        Ok(range)
    }

    /// Run `f` with the cursor at `offset`, then restore the cursor.
    ///
    /// The previous position is restored whether `f` succeeds or fails. If
    /// both `f` and the restore fail, the error from `f` is returned.
    pub fn at_offset<T, F>(&mut self, offset: u64, f: F) -> Result<T, NbuError>
    where
        F: FnOnce(&mut Self) -> Result<T, NbuError>,
    {
        let saved = self.pos;
        let result = self.seek_to(offset).and_then(|_| f(self));
        let restored = self.seek_to(saved);
        match result {
            Ok(value) => restored.map(|_| value),
            Err(e) => Err(e),
        }
    }
}

/// Add a relative offset to a base, failing instead of wrapping.
pub(crate) fn offset_from(base: u64, delta: u64) -> Result<u64, NbuError> {
    base.checked_add(delta).ok_or_else(|| {
        NbuError::SeekFailed(format!("offset {} + {} overflows", base, delta))
    })
}
