//! Word tables the stages consult.
//!
//! A [`FilterConfig`] is decoded once from an [`Archive`] at startup and then
//! shared read-only (usually behind an `Arc`) by every filter call.

use crate::{
    archive::{Archive, ArchiveError},
    packet::{Packet, PacketError},
    unicode::{is_digit, is_lowercase},
};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info};

pub const BAD_WORDS_ENTRY: &str = "badenc.txt";
pub const DOMAINS_ENTRY: &str = "domainenc.txt";
pub const TLDS_ENTRY: &str = "tldlist.txt";
pub const FRAGMENTS_ENTRY: &str = "fragmentsenc.txt";

/// Every entry [`FilterConfig::load`] reads.
pub const TABLE_ENTRIES: [&str; 4] = [FRAGMENTS_ENTRY, BAD_WORDS_ENTRY, DOMAINS_ENTRY, TLDS_ENTRY];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("table `{table}` is malformed: {source}")]
    Packet {
        table: &'static str,
        #[source]
        source: PacketError,
    },

    #[error("tld `{tld}` has unknown strictness tier {tier}")]
    InvalidTldTier { tld: String, tier: u8 },

    #[error("table `{table}` is not sorted ascending")]
    Unsorted { table: String },

    #[error("table `{table}` holds invalid word `{word}`")]
    InvalidWord { table: &'static str, word: String },
}

/// How much boundary evidence a TLD match needs before it is masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TldTier {
    /// Any boundary on both sides.
    Relaxed = 1,
    /// An explicit separator on one side and any boundary on the other.
    Balanced = 2,
    /// Explicit separators on both sides.
    Strict = 3,
}

impl TryFrom<u8> for TldTier {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TldTier::Relaxed),
            2 => Ok(TldTier::Balanced),
            3 => Ok(TldTier::Strict),
            other => Err(other),
        }
    }
}

/// A profanity stem and the neighbour-class pairs in which it is innocent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadWord {
    word: Vec<char>,
    /// `(preceding class, following class)`, sorted ascending.
    exceptions: SmallVec<[(u8, u8); 8]>,
}

impl BadWord {
    pub fn new(word: &str, exceptions: &[(u8, u8)]) -> Self {
        Self {
            word: word.chars().collect(),
            exceptions: SmallVec::from_slice(exceptions),
        }
    }

    pub fn word(&self) -> &[char] {
        &self.word
    }

    pub fn exceptions(&self) -> &[(u8, u8)] {
        &self.exceptions
    }

    /// Whether the match context `(preceding, following)` is whitelisted.
    #[inline]
    pub fn is_excepted(&self, preceding: u8, following: u8) -> bool {
        self.exceptions.binary_search(&(preceding, following)).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tld {
    name: Vec<char>,
    tier: TldTier,
}

impl Tld {
    pub fn new(name: &str, tier: TldTier) -> Self {
        Self {
            name: name.chars().collect(),
            tier,
        }
    }

    pub fn name(&self) -> &[char] {
        &self.name
    }

    pub fn tier(&self) -> TldTier {
        self.tier
    }
}

/// Base-38 code of a short token, least significant digit first: letters are
/// 1..=26, apostrophe 27, digits 28..=37. `None` for tokens longer than six
/// or holding any other character.
pub fn encode_fragment(chars: &[char]) -> Option<u32> {
    if chars.len() > 6 {
        return None;
    }
    chars.iter().rev().try_fold(0u32, |value, &c| {
        let code = if is_lowercase(c) {
            c as u32 - 'a' as u32 + 1
        } else if c == '\'' {
            27
        } else if is_digit(c) {
            c as u32 - '0' as u32 + 28
        } else {
            return None;
        };
        Some(value * 38 + code)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    bad_words: Vec<BadWord>,
    domains: Vec<Vec<char>>,
    tlds: Vec<Tld>,
    fragments: Vec<u32>,
}

impl FilterConfig {
    /// Build a config, checking every table invariant the stages rely on.
    pub fn new(
        bad_words: Vec<BadWord>,
        domains: Vec<Vec<char>>,
        tlds: Vec<Tld>,
        fragments: Vec<u32>,
    ) -> Result<Self, ConfigError> {
        for bad in &bad_words {
            check_word(BAD_WORDS_ENTRY, &bad.word)?;
            if !bad.exceptions.is_sorted() {
                return Err(ConfigError::Unsorted {
                    table: format!("{BAD_WORDS_ENTRY}:{}", bad.word.iter().collect::<String>()),
                });
            }
        }
        for domain in &domains {
            check_word(DOMAINS_ENTRY, domain)?;
        }
        for tld in &tlds {
            check_word(TLDS_ENTRY, &tld.name)?;
        }
        if !fragments.is_sorted() {
            return Err(ConfigError::Unsorted {
                table: FRAGMENTS_ENTRY.to_string(),
            });
        }
        Ok(Self {
            bad_words,
            domains,
            tlds,
            fragments,
        })
    }

    /// Decode all four tables from `archive`. The first failure aborts.
    pub fn load(archive: &impl Archive) -> Result<Self, ConfigError> {
        let fragments = decode_fragments(&mut entry(archive, FRAGMENTS_ENTRY)?)
            .map_err(|source| packet_error(FRAGMENTS_ENTRY, source))?;
        let bad_words = decode_bad_words(&mut entry(archive, BAD_WORDS_ENTRY)?)
            .map_err(|source| packet_error(BAD_WORDS_ENTRY, source))?;
        let domains = decode_domains(&mut entry(archive, DOMAINS_ENTRY)?)
            .map_err(|source| packet_error(DOMAINS_ENTRY, source))?;
        let tlds = decode_tlds(&mut entry(archive, TLDS_ENTRY)?)?;

        let config = Self::new(bad_words, domains, tlds, fragments)?;
        info!(
            bad_words = config.bad_words.len(),
            domains = config.domains.len(),
            tlds = config.tlds.len(),
            fragments = config.fragments.len(),
            "word filter tables loaded"
        );
        Ok(config)
    }

    pub fn bad_words(&self) -> &[BadWord] {
        &self.bad_words
    }

    pub fn domains(&self) -> &[Vec<char>] {
        &self.domains
    }

    pub fn tlds(&self) -> &[Tld] {
        &self.tlds
    }

    pub fn fragments(&self) -> &[u32] {
        &self.fragments
    }

    /// Whether `chars` is an all-digit token or encodes to a banned fragment.
    pub fn is_bad_fragment(&self, chars: &[char]) -> bool {
        if chars.iter().copied().all(is_digit) {
            return true;
        }
        encode_fragment(chars).is_some_and(|code| self.fragments.binary_search(&code).is_ok())
    }
}

fn check_word(table: &'static str, word: &[char]) -> Result<(), ConfigError> {
    if word.is_empty() || !word.iter().all(|&c| is_lowercase(c) || c == '\'') {
        return Err(ConfigError::InvalidWord {
            table,
            word: word.iter().collect(),
        });
    }
    Ok(())
}

fn entry(archive: &impl Archive, name: &str) -> Result<Packet, ConfigError> {
    Ok(Packet::new(archive.read_named_entry(name)?))
}

fn packet_error(table: &'static str, source: PacketError) -> ConfigError {
    ConfigError::Packet { table, source }
}

fn decode_bad_words(buf: &mut Packet) -> Result<Vec<BadWord>, PacketError> {
    let count = buf.g4()? as usize;
    let mut words = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        let word = buf.gstr1()?;
        let combos = usize::from(buf.g1()?);
        let mut exceptions = SmallVec::with_capacity(combos);
        for _ in 0..combos {
            exceptions.push((buf.g1()?, buf.g1()?));
        }
        words.push(BadWord { word, exceptions });
    }
    debug!(count, "decoded bad words");
    Ok(words)
}

fn decode_domains(buf: &mut Packet) -> Result<Vec<Vec<char>>, PacketError> {
    let count = buf.g4()? as usize;
    let mut domains = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        domains.push(buf.gstr1()?);
    }
    debug!(count, "decoded domains");
    Ok(domains)
}

fn decode_fragments(buf: &mut Packet) -> Result<Vec<u32>, PacketError> {
    let count = buf.g4()? as usize;
    let mut fragments = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        fragments.push(u32::from(buf.g2()?));
    }
    debug!(count, "decoded fragments");
    Ok(fragments)
}

fn decode_tlds(buf: &mut Packet) -> Result<Vec<Tld>, ConfigError> {
    let count = buf.g4().map_err(|e| packet_error(TLDS_ENTRY, e))? as usize;
    let mut tlds = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        let tier = buf.g1().map_err(|e| packet_error(TLDS_ENTRY, e))?;
        let name = buf.gstr1().map_err(|e| packet_error(TLDS_ENTRY, e))?;
        let tier = TldTier::try_from(tier).map_err(|tier| ConfigError::InvalidTldTier {
            tld: name.iter().collect(),
            tier,
        })?;
        tlds.push(Tld { name, tier });
    }
    debug!(count, "decoded tlds");
    Ok(tlds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{Jagfile, MemoryArchive, StoredCodec, name_hash};
    use bytes::Bytes;
    use std::sync::Arc;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn str1(out: &mut Vec<u8>, s: &str) {
        out.push(s.len() as u8);
        out.extend_from_slice(s.as_bytes());
    }

    fn table_entries() -> Vec<(&'static str, Vec<u8>)> {
        let mut bad = 2u32.to_be_bytes().to_vec();
        str1(&mut bad, "ass");
        bad.extend_from_slice(&[2, 12, 27, 16, 27]);
        str1(&mut bad, "fuck");
        bad.push(0);

        let mut domains = 1u32.to_be_bytes().to_vec();
        str1(&mut domains, "runescape");

        let mut tlds = 2u32.to_be_bytes().to_vec();
        tlds.push(1);
        str1(&mut tlds, "com");
        tlds.push(3);
        str1(&mut tlds, "uk");

        let mut fragments = 3u32.to_be_bytes().to_vec();
        for v in [5u16, 700, 40000] {
            fragments.extend_from_slice(&v.to_be_bytes());
        }

        vec![
            (BAD_WORDS_ENTRY, bad),
            (DOMAINS_ENTRY, domains),
            (TLDS_ENTRY, tlds),
            (FRAGMENTS_ENTRY, fragments),
        ]
    }

    fn tables() -> MemoryArchive {
        let mut archive = MemoryArchive::new();
        for (name, body) in table_entries() {
            archive.insert(name, body);
        }
        archive
    }

    /// The same tables in a container whose entry bodies are stored as is.
    fn container() -> Bytes {
        let entries = table_entries();
        let mut block = (entries.len() as u16).to_be_bytes().to_vec();
        for (name, body) in &entries {
            block.extend_from_slice(&name_hash(name).to_be_bytes());
            block.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
            block.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        }
        for (_, body) in &entries {
            block.extend_from_slice(body);
        }
        let mut out = (block.len() as u32).to_be_bytes()[1..].to_vec();
        out.extend_from_slice(&(block.len() as u32).to_be_bytes()[1..]);
        out.extend(block);
        Bytes::from(out)
    }

    #[test]
    fn loads_all_tables() {
        let config = FilterConfig::load(&tables()).unwrap();
        assert_eq!(config.bad_words().len(), 2);
        assert_eq!(config.bad_words()[0].word(), &chars("ass")[..]);
        assert_eq!(config.bad_words()[0].exceptions(), &[(12, 27), (16, 27)]);
        assert!(config.bad_words()[1].exceptions().is_empty());
        assert_eq!(config.domains(), &[chars("runescape")]);
        assert_eq!(config.tlds()[0], Tld::new("com", TldTier::Relaxed));
        assert_eq!(config.tlds()[1].tier(), TldTier::Strict);
        assert_eq!(config.fragments(), &[5, 700, 40000]);
    }

    #[test]
    fn loads_from_a_container() {
        let jag = Jagfile::open_with_codec(container(), Arc::new(StoredCodec)).unwrap();
        let config = FilterConfig::load(&jag).unwrap();
        assert_eq!(config, FilterConfig::load(&tables()).unwrap());

        let err = FilterConfig::load(&Jagfile::open(container()).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Archive(ArchiveError::CodecRequired(_))));
    }

    #[test]
    fn missing_entry_aborts() {
        let mut archive = MemoryArchive::new();
        archive.insert(FRAGMENTS_ENTRY, 0u32.to_be_bytes().to_vec());
        let err = FilterConfig::load(&archive).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Archive(ArchiveError::EntryNotFound(name)) if name == BAD_WORDS_ENTRY
        ));
    }

    #[test]
    fn truncated_table_names_the_table() {
        let mut archive = tables();
        archive.insert(DOMAINS_ENTRY, vec![0, 0, 0, 2, 3, b'a', b'b']);
        let err = FilterConfig::load(&archive).unwrap_err();
        assert!(matches!(err, ConfigError::Packet { table, .. } if table == DOMAINS_ENTRY));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let mut archive = tables();
        archive.insert(TLDS_ENTRY, vec![0, 0, 0, 1, 9, 3, b'n', b'e', b't']);
        let err = FilterConfig::load(&archive).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTldTier { tier: 9, .. }));
    }

    #[test]
    fn unsorted_tables_are_rejected() {
        let err = FilterConfig::new(vec![], vec![], vec![], vec![3, 1]).unwrap_err();
        assert!(matches!(err, ConfigError::Unsorted { .. }));

        let words = vec![BadWord::new("ass", &[(16, 27), (12, 27)])];
        let err = FilterConfig::new(words, vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::Unsorted { .. }));
    }

    #[test]
    fn words_must_be_lowercase_ascii() {
        let words = vec![BadWord::new("Bad", &[])];
        let err = FilterConfig::new(words, vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWord { .. }));
        assert!(FilterConfig::new(vec![], vec![chars("o'neil")], vec![], vec![]).is_ok());
    }

    #[test]
    fn exception_lookup() {
        let word = BadWord::new("ass", &[(1, 2), (12, 27), (16, 27), (16, 30)]);
        for &(p, n) in word.exceptions() {
            assert!(word.is_excepted(p, n));
        }
        assert!(!word.is_excepted(12, 26));
        assert!(!word.is_excepted(12, 28));
        assert!(!word.is_excepted(16, 28));
        assert!(!word.is_excepted(0, 0));
    }

    #[test]
    fn fragment_codes() {
        assert_eq!(encode_fragment(&chars("a")), Some(1));
        assert_eq!(encode_fragment(&chars("ab")), Some(2 * 38 + 1));
        assert_eq!(encode_fragment(&chars("'")), Some(27));
        assert_eq!(encode_fragment(&chars("0")), Some(28));
        assert_eq!(encode_fragment(&chars("9")), Some(37));
        assert_eq!(encode_fragment(&chars("abcdefg")), None);
        assert_eq!(encode_fragment(&chars("a-b")), None);
    }

    #[test]
    fn bad_fragment_lookup() {
        let pus = encode_fragment(&chars("pus")).unwrap();
        let config = FilterConfig::new(vec![], vec![], vec![], vec![1, pus, 50_000]).unwrap();
        assert!(config.is_bad_fragment(&chars("pus")));
        assert!(config.is_bad_fragment(&chars("a")));
        assert!(config.is_bad_fragment(&chars("123")));
        assert!(!config.is_bad_fragment(&chars("b")));
        assert!(!config.is_bad_fragment(&chars("qus")));
    }
}
