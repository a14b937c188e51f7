// Core algorithm exports
pub mod aggregator;
pub mod distance;
pub mod error;
pub mod indexer;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod scoring;

pub use aggregator::Aggregator;
pub use distance::{distance_between, haversine_distance};
pub use error::{EngineError, RecordKind};
pub use indexer::CandidateIndex;
pub use matcher::{validate_thresholds, Matcher};
pub use normalizer::{Normalizer, DEFAULT_STOP_TERMS};
pub use pipeline::{EngineConfig, LinkEngine};
pub use scoring::{name_similarity, score, score_cached, ScoreCache, Similarity};
