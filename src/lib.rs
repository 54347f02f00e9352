pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::memory::{InMemoryRecords, PlainTextVerifier, RecordSet};
pub use crate::config::TomlConfig;
pub use crate::core::{
    aggregator::RecordAggregator,
    auth::AuthService,
    cache::{CacheKey, CacheStore, CachedValue, InquiryCache, MemoryCacheStore, NoopCacheStore},
    identity::{CallerContext, IdentityResolver, IdentitySource, InboundRequest},
    inquiry::GradeInquiryService,
    release::ReleaseGate,
};
pub use utils::error::{Disposition, InquiryError, Result, StoreError};
