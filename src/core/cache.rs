//! Read-through memoization of the grade reads.
//!
//! The backing store is injected as an [`CacheStore`] so a service can run
//! with the in-process [`MemoryCacheStore`], a shared external store, or
//! [`NoopCacheStore`] when caching is disabled.

use crate::domain::model::{GradeDetailRow, GradeSummary, StudentId, Term};
use crate::domain::ports::GradeReads;
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Terms { student_id: StudentId },
    Summary { student_id: StudentId, term: Term },
    Details { student_id: StudentId, term: Term },
}

impl CacheKey {
    pub fn student_id(&self) -> StudentId {
        match self {
            CacheKey::Terms { student_id }
            | CacheKey::Summary { student_id, .. }
            | CacheKey::Details { student_id, .. } => *student_id,
        }
    }
}

/// Composite string form, usable as the key of an external store.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Terms { student_id } => write!(f, "terms:{}", student_id),
            CacheKey::Summary { student_id, term } => write!(f, "summary:{}:{}", student_id, term),
            CacheKey::Details { student_id, term } => write!(f, "details:{}:{}", student_id, term),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Terms(Vec<Term>),
    Summary(GradeSummary),
    Details(Vec<GradeDetailRow>),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<CachedValue>;
    async fn put(&self, key: CacheKey, value: CachedValue);
    async fn invalidate(&self, key: &CacheKey);
    /// Drops every entry belonging to one student.
    async fn invalidate_student(&self, student_id: StudentId);
    async fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    stored_at: Instant,
}

/// Concurrent in-process store with optional TTL and entry cap.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .map(|ttl| entry.stored_at.elapsed() >= ttl)
            .unwrap_or(false)
    }

    fn make_room(&self) {
        let Some(max_entries) = self.max_entries else {
            return;
        };
        if self.entries.len() < max_entries {
            return;
        }

        self.entries.retain(|_, entry| !self.is_expired(entry));
        while self.entries.len() >= max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().stored_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    tracing::debug!("Cache full, evicting {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        {
            let entry = self.entries.get(key)?;
            if !self.is_expired(&entry) {
                return Some(entry.value.clone());
            }
        }
        // a fresh put may have landed since the guard was released
        self.entries.remove_if(key, |_, entry| self.is_expired(entry));
        None
    }

    async fn put(&self, key: CacheKey, value: CachedValue) {
        if !self.entries.contains_key(&key) {
            self.make_room();
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    async fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    async fn invalidate_student(&self, student_id: StudentId) {
        self.entries.retain(|key, _| key.student_id() != student_id);
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}

/// Store that never retains anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    async fn get(&self, _key: &CacheKey) -> Option<CachedValue> {
        None
    }

    async fn put(&self, _key: CacheKey, _value: CachedValue) {}

    async fn invalidate(&self, _key: &CacheKey) {}

    async fn invalidate_student(&self, _student_id: StudentId) {}

    async fn clear(&self) {}
}

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Memoizing decorator over any [`GradeReads`].
///
/// Only non-empty successes are stored. Empty term lists, empty grade lists
/// and every error pass through uncached so the next call asks the source
/// again. Concurrent misses on one key each compute independently.
pub struct InquiryCache<R: GradeReads> {
    inner: R,
    store: Arc<dyn CacheStore>,
    stats: CacheStats,
}

impl<R: GradeReads> InquiryCache<R> {
    pub fn new(inner: R, store: Arc<dyn CacheStore>) -> Self {
        Self {
            inner,
            store,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub async fn invalidate_student(&self, student_id: StudentId) {
        tracing::info!("Invalidating cached grades for studentId {}", student_id);
        self.store.invalidate_student(student_id).await;
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let value = self.store.get(key).await;
        if value.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit: {}", key);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache miss: {}", key);
        }
        value
    }
}

#[async_trait]
impl<R: GradeReads> GradeReads for InquiryCache<R> {
    async fn list_available_terms(&self, student_id: StudentId) -> Vec<Term> {
        let key = CacheKey::Terms { student_id };
        if let Some(CachedValue::Terms(terms)) = self.lookup(&key).await {
            return terms;
        }

        let terms = self.inner.list_available_terms(student_id).await;
        if !terms.is_empty() {
            self.store.put(key, CachedValue::Terms(terms.clone())).await;
        }
        terms
    }

    async fn get_summary(&self, student_id: StudentId, term: &Term) -> Result<GradeSummary> {
        let key = CacheKey::Summary {
            student_id,
            term: term.clone(),
        };
        if let Some(CachedValue::Summary(summary)) = self.lookup(&key).await {
            return Ok(summary);
        }

        let summary = self.inner.get_summary(student_id, term).await?;
        self.store.put(key, CachedValue::Summary(summary.clone())).await;
        Ok(summary)
    }

    async fn get_detail_list(&self, student_id: StudentId, term: &Term) -> Result<Vec<GradeDetailRow>> {
        let key = CacheKey::Details {
            student_id,
            term: term.clone(),
        };
        if let Some(CachedValue::Details(rows)) = self.lookup(&key).await {
            return Ok(rows);
        }

        let rows = self.inner.get_detail_list(student_id, term).await?;
        if !rows.is_empty() {
            self.store.put(key, CachedValue::Details(rows.clone())).await;
        }
        Ok(rows)
    }
}
