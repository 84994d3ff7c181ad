use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use standoff::Span;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memoized token spans of sentence texts, keyed by a digest of the text.
///
/// Owned by the caller and passed to whatever needs tokens, so separate
/// runs never share state by accident.
pub struct TokenCache {
    spans: Arc<DashMap<String, Arc<[Span]>>>,
    max_entries: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TokenCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            spans: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Character spans of the space-separated tokens of `text`.
    pub fn token_spans(&self, text: &str) -> Arc<[Span]> {
        let key = self.hash_text(text);
        if let Some(spans) = self.spans.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(spans.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        if self.spans.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .spans
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.spans.remove(&key);
            }
        }

        let spans: Arc<[Span]> = space_tokenize(text).into();
        self.spans.insert(key, Arc::clone(&spans));
        spans
    }

    fn hash_text(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.spans.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.spans.clear();
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

/// Split on single spaces; empty tokens between adjacent spaces are skipped.
pub fn space_tokenize(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    for c in text.chars() {
        if c == ' ' {
            if pos > start {
                spans.push(Span { start, end: pos });
            }
            start = pos + 1;
        }
        pos += 1;
    }
    if pos > start {
        spans.push(Span { start, end: pos });
    }
    spans
}
