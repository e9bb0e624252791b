//! # reactrole-cache
//!
//! In-memory projection of the role binding store.
//!
//! ## Features
//!
//! - **Mapping cache**: tracked messages keyed by store id and by
//!   `(guild, message)`, so reaction events never touch the database
//! - **Snapshots**: readers get owned copies, never a half-applied binding set
//!
//! ## Example
//!
//! ```
//! use reactrole_cache::ReactionMappingCache;
//! use reactrole_core::{Binding, Snowflake, TrackedMessage, TrackedMessageHeader, TrackedMessageId};
//!
//! let cache = ReactionMappingCache::new();
//! let header = TrackedMessageHeader {
//!     id: TrackedMessageId::new(1),
//!     message_id: Snowflake::new(1000),
//!     channel_id: Snowflake::new(50),
//!     guild_id: Snowflake::new(10),
//! };
//! let binding = Binding::new(Snowflake::new(111), Snowflake::new(222));
//! cache.upsert(TrackedMessage::new(header, binding)).unwrap();
//!
//! let found = cache.find_by_message(Snowflake::new(10), Snowflake::new(1000)).unwrap();
//! assert_eq!(found.bindings(), &[binding]);
//! ```

pub mod mapping;

pub use mapping::{CacheError, CacheResult, ReactionMappingCache, SharedMappingCache};
