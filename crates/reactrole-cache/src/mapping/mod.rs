//! Reaction mapping cache module.

mod reaction_mapping;

pub use reaction_mapping::{CacheError, CacheResult, ReactionMappingCache, SharedMappingCache};
