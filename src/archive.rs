//! Named-entry archives the word tables are shipped in.
//!
//! [`Jagfile`] reads the classic container layout. Entry bodies may be
//! block-compressed; decompression is delegated to a [`BlockCodec`] supplied by
//! the caller.

use crate::packet::{Packet, PacketError};
use bytes::Bytes;
use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive truncated: {0}")]
    Truncated(#[from] PacketError),

    #[error("entry `{0}` not found")]
    EntryNotFound(String),

    #[error("entry `{0}` is compressed and no block codec was supplied")]
    CodecRequired(String),

    #[error("block codec failed: {0}")]
    Codec(String),

    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of named byte entries.
pub trait Archive {
    fn read_named_entry(&self, name: &str) -> Result<Bytes, ArchiveError>;
}

/// Decompressor for block-compressed archive bodies.
pub trait BlockCodec: Send + Sync {
    fn decompress(&self, packed: &[u8], unpacked_len: usize) -> Result<Vec<u8>, ArchiveError>;
}

/// Codec for bodies written without compression. A body whose packed and
/// unpacked sizes differ is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredCodec;

impl BlockCodec for StoredCodec {
    fn decompress(&self, packed: &[u8], unpacked_len: usize) -> Result<Vec<u8>, ArchiveError> {
        if packed.len() != unpacked_len {
            return Err(ArchiveError::Codec(format!(
                "{} byte body packed into {} bytes needs a decompressor",
                unpacked_len,
                packed.len()
            )));
        }
        Ok(packed.to_vec())
    }
}

/// Entry-name hash used by the container index.
pub fn name_hash(name: &str) -> u32 {
    name.chars().fold(0u32, |hash, c| {
        hash.wrapping_mul(61)
            .wrapping_add(c.to_ascii_uppercase() as u32)
            .wrapping_sub(32)
    })
}

#[derive(Debug, Clone, Copy)]
struct EntryHeader {
    hash: u32,
    unpacked_len: usize,
    packed_len: usize,
    offset: usize,
}

/// The classic archive container.
///
/// Layout: 3-byte unpacked size, 3-byte packed size, then an index of
/// `u16` entry count and per entry (`u32` name hash, 3-byte unpacked size,
/// 3-byte packed size), followed by the bodies in index order. When the two
/// outer sizes differ the whole index and body block is compressed and the
/// entries are stored; otherwise every entry body is compressed on its own.
pub struct Jagfile {
    data: Bytes,
    entries: Vec<EntryHeader>,
    entries_compressed: bool,
    codec: Option<Arc<dyn BlockCodec>>,
}

impl fmt::Debug for Jagfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jagfile")
            .field("entries", &self.entries.len())
            .field("entries_compressed", &self.entries_compressed)
            .field("codec", &self.codec.is_some())
            .finish()
    }
}

impl Jagfile {
    /// Parse a container whose compressed parts can be decoded by `codec`.
    pub fn open_with_codec(
        data: Bytes,
        codec: Arc<dyn BlockCodec>,
    ) -> Result<Self, ArchiveError> {
        Self::parse(data, Some(codec))
    }

    /// Parse a container without a codec; compressed bodies fail on read.
    pub fn open(data: Bytes) -> Result<Self, ArchiveError> {
        Self::parse(data, None)
    }

    pub fn load(
        path: impl AsRef<Path>,
        codec: Option<Arc<dyn BlockCodec>>,
    ) -> Result<Self, ArchiveError> {
        let data = std::fs::read(path)?;
        Self::parse(Bytes::from(data), codec)
    }

    fn parse(data: Bytes, codec: Option<Arc<dyn BlockCodec>>) -> Result<Self, ArchiveError> {
        let mut header = Packet::new(data.clone());
        let unpacked_len = header.g3()? as usize;
        let packed_len = header.g3()? as usize;

        let (body, entries_compressed) = if unpacked_len == packed_len {
            (data.slice(6..), true)
        } else {
            let codec = codec
                .as_deref()
                .ok_or_else(|| ArchiveError::CodecRequired("<archive>".to_string()))?;
            let packed = header.gdata(packed_len)?;
            (Bytes::from(codec.decompress(&packed, unpacked_len)?), false)
        };

        let mut index = Packet::new(body.clone());
        let count = usize::from(index.g2()?);
        let mut offset = 2 + count * 10;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let hash = index.g4()?;
            let unpacked_len = index.g3()? as usize;
            let packed_len = index.g3()? as usize;
            entries.push(EntryHeader {
                hash,
                unpacked_len,
                packed_len,
                offset,
            });
            offset += packed_len;
        }
        if offset > body.len() {
            return Err(PacketError::Underflow {
                wanted: offset,
                remaining: body.len(),
            }
            .into());
        }

        debug!(entries = count, entries_compressed, "opened archive");
        Ok(Self {
            data: body,
            entries,
            entries_compressed,
            codec,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let hash = name_hash(name);
        self.entries.iter().any(|e| e.hash == hash)
    }
}

impl Archive for Jagfile {
    fn read_named_entry(&self, name: &str) -> Result<Bytes, ArchiveError> {
        let hash = name_hash(name);
        let entry = self
            .entries
            .iter()
            .find(|e| e.hash == hash)
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))?;

        let body = self.data.slice(entry.offset..entry.offset + entry.packed_len);
        if !self.entries_compressed {
            return Ok(body);
        }
        let codec = self
            .codec
            .as_deref()
            .ok_or_else(|| ArchiveError::CodecRequired(name.to_string()))?;
        Ok(Bytes::from(codec.decompress(&body, entry.unpacked_len)?))
    }
}

/// Already-decoded entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Bytes>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Bytes>) -> &mut Self {
        self.entries.insert(name.into(), data.into());
        self
    }

    /// Read each of `names` from files of the same name under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, names: &[&str]) -> Result<Self, ArchiveError> {
        let dir = dir.as_ref();
        let mut archive = Self::new();
        for &name in names {
            let data = std::fs::read(dir.join(name))?;
            archive.insert(name, data);
        }
        Ok(archive)
    }
}

impl Archive for MemoryArchive {
    fn read_named_entry(&self, name: &str) -> Result<Bytes, ArchiveError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in codec: "compressed" bodies are the plain bytes reversed.
    struct Reversed;

    impl BlockCodec for Reversed {
        fn decompress(&self, packed: &[u8], unpacked_len: usize) -> Result<Vec<u8>, ArchiveError> {
            if packed.len() != unpacked_len {
                return Err(ArchiveError::Codec("length mismatch".into()));
            }
            Ok(packed.iter().rev().copied().collect())
        }
    }

    fn p3(out: &mut Vec<u8>, v: usize) {
        out.extend_from_slice(&(v as u32).to_be_bytes()[1..]);
    }

    fn index_block(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut out = (entries.len() as u16).to_be_bytes().to_vec();
        for (name, body) in entries {
            out.extend_from_slice(&name_hash(name).to_be_bytes());
            p3(&mut out, body.len());
            p3(&mut out, body.len());
        }
        for (_, body) in entries {
            out.extend_from_slice(body);
        }
        out
    }

    fn per_entry_archive(entries: &[(&str, &[u8])]) -> Bytes {
        let reversed: Vec<(&str, Vec<u8>)> = entries
            .iter()
            .map(|(n, b)| (*n, b.iter().rev().copied().collect()))
            .collect();
        let block = index_block(&reversed);
        let mut out = Vec::new();
        p3(&mut out, block.len());
        p3(&mut out, block.len());
        out.extend(block);
        Bytes::from(out)
    }

    #[test]
    fn hash_is_case_insensitive() {
        assert_eq!(name_hash("badenc.txt"), name_hash("BADENC.TXT"));
        assert_ne!(name_hash("badenc.txt"), name_hash("tldlist.txt"));
        assert_eq!(name_hash(""), 0);
        assert_eq!(name_hash("a"), u32::from(b'A') - 32);
    }

    #[test]
    fn per_entry_bodies_go_through_the_codec() {
        let data = per_entry_archive(&[("tldlist.txt", b"abc"), ("badenc.txt", b"hello")]);
        let jag = Jagfile::open_with_codec(data, Arc::new(Reversed)).unwrap();
        assert_eq!(jag.len(), 2);
        assert_eq!(&jag.read_named_entry("badenc.txt").unwrap()[..], b"hello");
        assert_eq!(&jag.read_named_entry("tldlist.txt").unwrap()[..], b"abc");
        assert!(matches!(
            jag.read_named_entry("domainenc.txt"),
            Err(ArchiveError::EntryNotFound(_))
        ));
    }

    #[test]
    fn compressed_entry_without_codec_fails_on_read() {
        let data = per_entry_archive(&[("badenc.txt", b"hello")]);
        let jag = Jagfile::open(data).unwrap();
        assert!(jag.contains("badenc.txt"));
        assert!(matches!(
            jag.read_named_entry("badenc.txt"),
            Err(ArchiveError::CodecRequired(_))
        ));
    }

    #[test]
    fn whole_archive_compression_stores_entries() {
        let block = index_block(&[("fragmentsenc.txt", b"xyz".to_vec())]);
        let mut data = Vec::new();
        p3(&mut data, block.len());
        p3(&mut data, block.len() - 1);
        // Outer sizes differ, so the Reversed codec sees a length mismatch.
        data.extend(block.iter().rev().copied().take(block.len() - 1));
        assert!(Jagfile::open_with_codec(Bytes::from(data), Arc::new(Reversed)).is_err());

        struct Passthrough;
        impl BlockCodec for Passthrough {
            fn decompress(&self, packed: &[u8], _: usize) -> Result<Vec<u8>, ArchiveError> {
                let mut out = packed.to_vec();
                out.push(b'z');
                Ok(out)
            }
        }
        let mut data = Vec::new();
        p3(&mut data, block.len());
        p3(&mut data, block.len() - 1);
        data.extend_from_slice(&block[..block.len() - 1]);
        let jag = Jagfile::open_with_codec(Bytes::from(data), Arc::new(Passthrough)).unwrap();
        assert_eq!(&jag.read_named_entry("fragmentsenc.txt").unwrap()[..], b"xyz");
    }

    #[test]
    fn truncated_index_is_rejected() {
        let mut data = Vec::new();
        p3(&mut data, 12);
        p3(&mut data, 12);
        data.extend_from_slice(&[0x00, 0x01, 0xde, 0xad]);
        assert!(matches!(Jagfile::open(Bytes::from(data)), Err(ArchiveError::Truncated(_))));
    }

    #[test]
    fn stored_codec_passes_plain_bodies_only() {
        assert_eq!(StoredCodec.decompress(b"abc", 3).unwrap(), b"abc");
        assert!(matches!(StoredCodec.decompress(b"ab", 3), Err(ArchiveError::Codec(_))));

        let block = index_block(&[("badenc.txt", b"hello".to_vec())]);
        let mut data = Vec::new();
        p3(&mut data, block.len());
        p3(&mut data, block.len());
        data.extend(block);
        let jag = Jagfile::open_with_codec(Bytes::from(data), Arc::new(StoredCodec)).unwrap();
        assert_eq!(&jag.read_named_entry("badenc.txt").unwrap()[..], b"hello");
    }

    #[test]
    fn load_reads_a_container_file() {
        let block = index_block(&[("tldlist.txt", b"abc".to_vec())]);
        let mut data = Vec::new();
        p3(&mut data, block.len());
        p3(&mut data, block.len());
        data.extend(block);
        let path = std::env::temp_dir().join(format!("wordenc-load-{}", std::process::id()));
        std::fs::write(&path, &data).unwrap();

        let jag = Jagfile::load(&path, Some(Arc::new(StoredCodec)));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(&jag.unwrap().read_named_entry("tldlist.txt").unwrap()[..], b"abc");
        assert!(matches!(Jagfile::load(&path, None), Err(ArchiveError::Io(_))));
    }

    #[test]
    fn memory_archive_lookup() {
        let mut archive = MemoryArchive::new();
        archive.insert("tldlist.txt", vec![1u8, 2, 3]);
        assert_eq!(&archive.read_named_entry("tldlist.txt").unwrap()[..], &[1, 2, 3]);
        assert!(archive.read_named_entry("badenc.txt").is_err());
    }
}
