pub mod archive;
pub mod buffer;
pub mod config;
pub mod filter;
pub mod matcher;
pub mod normalize;
pub mod packet;
pub mod pipeline;
pub mod postprocess;
pub mod sentence;
pub mod stage;
pub mod unicode;

pub use archive::{Archive, ArchiveError, BlockCodec, Jagfile, MemoryArchive, StoredCodec};
pub use config::{BadWord, ConfigError, FilterConfig, Tld, TldTier};
pub use filter::{WordFilter, WordFilterBuilder, filter};
pub use sentence::to_sentence_case;
pub use stage::Stage;
pub use stage::bad_words::BadWordStage;
pub use stage::domains::DomainStage;
pub use stage::numeric::NumericStage;
pub use stage::tlds::TldStage;
