use crate::hashing::{digest_to_u64, hash_query};

/// Lookup key: the model identifier plus the exact prompt text.
///
/// Equality and hashing are structural; the digest helpers exist for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model: String,
    prompt: String,
}

impl CacheKey {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the 32-byte BLAKE3 digest of `(model, prompt)`.
    #[inline]
    pub fn digest(&self) -> [u8; 32] {
        hash_query(&self.model, &self.prompt)
    }

    /// Returns a 64-bit id derived from [`CacheKey::digest`], suitable for log fields.
    #[inline]
    pub fn short_id(&self) -> u64 {
        digest_to_u64(&self.digest())
    }
}

/// Whether a query was answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time counters for a [`QueryCache`](super::QueryCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (`0.0` before any lookup).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
