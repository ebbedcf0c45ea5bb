use std::io::{ErrorKind, Read};

use super::SourceError;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Reads any `Read` in chunks of at most `chunk_size` bytes.
///
/// Chunk boundaries carry no meaning; they only bound memory per read.
///
/// # Examples
/// ```
/// use klvwatch_core::ChunkSource;
///
/// let mut source = ChunkSource::with_chunk_size(&b"abcde"[..], 2);
/// let mut chunks = Vec::new();
/// while let Some(chunk) = source.next_chunk().unwrap() {
///     chunks.push(chunk.to_vec());
/// }
/// assert_eq!(chunks, vec![b"ab".to_vec(), b"cd".to_vec(), b"e".to_vec()]);
/// ```
pub struct ChunkSource<R: Read> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: Read> ChunkSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// A zero `chunk_size` is raised to one byte.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; chunk_size.max(1)],
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }

    /// Next chunk, or `None` at end of input.
    ///
    /// # Errors
    /// `SourceError::Io` for read failures other than interruption.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, SourceError> {
        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => return Ok(None),
                Ok(read) => return Ok(Some(&self.buffer[..read])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}
