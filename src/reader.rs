//! Line boundary reader.

use std::io::{self, prelude::*, SeekFrom};

use crate::sort::SortError;

/// Line terminator byte the reader aligns reads to.
pub const LINE_FEED: u8 = b'\n';

/// Reads byte ranges from a seekable source, trimmed to end at a line boundary.
///
/// The reader is the cursor shared by all fragments of a source: every read starts exactly where the
/// previous one ended, bytes of an unfinished trailing line are handed back to the source for the next read.
pub struct LineBoundaryReader<R> {
    inner: R,
    position: u64,
    len: u64,
    buf: Vec<u8>,
}

impl<R> LineBoundaryReader<R>
where
    R: Read + Seek,
{
    /// Creates a reader positioned at the beginning of the source.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        return Ok(LineBoundaryReader {
            inner,
            position: 0,
            len,
            buf: Vec::new(),
        });
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total source length.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Checks if the source has no data at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks if the whole source has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.len
    }

    /// Reads up to `limit` bytes and trims them to the last complete line.
    ///
    /// Returns an empty slice when the source is exhausted and [`None`] if the window contains no line
    /// terminator, in which case the cursor is left unchanged. A window reaching the end of the source
    /// is returned whole since the last line is not required to be terminated.
    pub fn try_read_lines(&mut self, limit: usize) -> io::Result<Option<&[u8]>> {
        self.buf.clear();
        let read = self.inner.by_ref().take(limit as u64).read_to_end(&mut self.buf)?;
        if read == 0 {
            return Ok(Some(&self.buf[..0]));
        }

        let consumed = if self.position + read as u64 >= self.len {
            read
        } else {
            match self.buf.iter().rposition(|&byte| byte == LINE_FEED) {
                Some(idx) => idx + 1,
                None => {
                    self.inner.seek(SeekFrom::Current(-(read as i64)))?;
                    return Ok(None);
                }
            }
        };

        if consumed < read {
            self.inner.seek(SeekFrom::Current(-((read - consumed) as i64)))?;
        }
        self.position += consumed as u64;

        return Ok(Some(&self.buf[..consumed]));
    }

    /// Reads up to `limit` bytes trimmed to the last complete line.
    /// A window without a line terminator means the window is smaller than a line and is reported as
    /// [`SortError::LineBoundary`].
    pub fn read_lines(&mut self, limit: usize) -> Result<&[u8], SortError> {
        let offset = self.position;
        match self.try_read_lines(limit).map_err(SortError::IO)? {
            Some(lines) => Ok(lines),
            None => Err(SortError::LineBoundary { offset, window: limit }),
        }
    }
}
