//! Legislative vote analytics: links enacted laws to roll-call votes, resolves
//! each voter's canonical party, aggregates pairwise co-voting and compares a
//! person against same-party peers.

pub mod config;
pub mod context;
pub mod covote;
pub mod dates;
mod error;
pub mod ingest;
pub mod linker;
pub mod model;
pub mod normalize;
pub mod party;
pub mod peers;
pub mod similarity;
pub mod timeline;
pub mod vote;

pub use config::PipelineConfig;
pub use context::{CompareCache, SnapshotId};
pub use covote::{Ally, ImageIndex, PairwiseRow, PairwiseTable};
pub use error::CoreError;
pub use linker::{LinkedMap, RecordLinker};
pub use model::{CompareEvent, LawRecord, Person, SideVote, VoteClass, VoteEvent, VoteRow};
pub use normalize::normalize_title;
pub use party::CanonicalPartyMap;
pub use peers::{PeerBand, PeerReport};
pub use similarity::title_similarity;
pub use timeline::{MembershipInterval, ProfileIndex};
