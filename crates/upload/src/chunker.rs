use sha2::{Digest, Sha256};

use crate::DEFAULT_CHUNK_SIZE;

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// One byte range of the source, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Byte offset within the source.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

/// Slices the in-memory source bytes into fixed-size chunks with offset
/// tracking, so a transfer can re-enter at any confirmed offset.
pub struct ChunkSlicer<'a> {
    data: &'a [u8],
    chunk_size: usize,
    offset: u64,
}

impl<'a> ChunkSlicer<'a> {
    /// Creates a slicer over `data`.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            data,
            chunk_size,
            offset: 0,
        }
    }

    /// Moves the cursor to `offset` (for resume), clipped to the source end.
    pub fn seek_to(&mut self, offset: u64) {
        self.offset = offset.min(self.data.len() as u64);
    }

    /// Returns the next chunk, or `None` once the source is exhausted.
    pub fn next_chunk(&mut self) -> Option<Chunk> {
        let start = self.offset as usize;
        if start >= self.data.len() {
            return None;
        }

        let end = (start + self.chunk_size).min(self.data.len());
        let chunk = Chunk {
            offset: self.offset,
            data: self.data[start..end].to_vec(),
        };
        self.offset = end as u64;
        Some(chunk)
    }

    /// Current byte offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total source size in bytes.
    pub fn total(&self) -> u64 {
        self.data.len() as u64
    }

    /// Bytes remaining to slice.
    pub fn remaining(&self) -> u64 {
        self.total() - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_deterministic() {
        let a = checksum_bytes(b"hello world");
        let b = checksum_bytes(b"hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 = 64 hex chars.
    }

    #[test]
    fn checksum_differs_for_different_data() {
        assert_ne!(checksum_bytes(b"hello"), checksum_bytes(b"world"));
    }

    #[test]
    fn slices_whole_source() {
        let data = b"AABBCCDDEE"; // 10 bytes.
        let mut slicer = ChunkSlicer::new(data, 4);
        assert_eq!(slicer.total(), 10);
        assert_eq!(slicer.remaining(), 10);

        let c1 = slicer.next_chunk().unwrap();
        assert_eq!(c1.offset, 0);
        assert_eq!(&c1.data, b"AABB");
        assert_eq!(slicer.remaining(), 6);

        let c2 = slicer.next_chunk().unwrap();
        assert_eq!(c2.offset, 4);
        assert_eq!(&c2.data, b"CCDD");

        let c3 = slicer.next_chunk().unwrap();
        assert_eq!(c3.offset, 8);
        assert_eq!(&c3.data, b"EE");

        assert!(slicer.next_chunk().is_none());
    }

    #[test]
    fn seek_and_resume() {
        let data = b"0123456789";
        let mut slicer = ChunkSlicer::new(data, 4);
        slicer.seek_to(6);
        assert_eq!(slicer.offset(), 6);
        assert_eq!(slicer.remaining(), 4);

        let c = slicer.next_chunk().unwrap();
        assert_eq!(c.offset, 6);
        assert_eq!(&c.data, b"6789");
        assert!(slicer.next_chunk().is_none());
    }

    #[test]
    fn seek_past_end_is_clipped() {
        let mut slicer = ChunkSlicer::new(b"abc", 4);
        slicer.seek_to(100);
        assert_eq!(slicer.offset(), 3);
        assert!(slicer.next_chunk().is_none());
    }

    #[test]
    fn zero_chunk_size_uses_default() {
        let slicer = ChunkSlicer::new(b"x", 0);
        assert_eq!(slicer.total(), 1);
        assert_eq!(slicer.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn empty_source_has_no_chunks() {
        let mut slicer = ChunkSlicer::new(b"", 4);
        assert!(slicer.next_chunk().is_none());
        assert_eq!(slicer.remaining(), 0);
    }
}
