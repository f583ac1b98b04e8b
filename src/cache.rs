//! Parsed template cache
//!
//! Templates are keyed by their raw source text and shared as
//! `Arc<Template>`, so readers never observe a partially built tree. Two
//! threads racing on the same new text may both parse it; the last insert
//! wins and both trees are equal.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::warn;

use crate::ast::Template;

/// Counters describing cache effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to parse
    pub misses: u64,
    /// Templates currently cached
    pub entries: usize,
    /// Templates dropped because the cache was full
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Concurrent cache of parsed templates
#[derive(Debug)]
pub struct ExpressionCache {
    entries: DashMap<String, Arc<Template>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ExpressionCache {
    /// Cache holding at most `capacity` templates
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Cached template for `source`, or the result of `parse` which is then
    /// cached
    pub fn get_or_try_insert<E>(
        &self,
        source: &str,
        parse: impl FnOnce() -> Result<Template, E>,
    ) -> Result<Arc<Template>, E> {
        if let Some(template) = self.entries.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(template.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let template = Arc::new(parse()?);
        if self.capacity == 0 {
            return Ok(template);
        }
        if self.entries.len() >= self.capacity {
            let dropped = self.entries.len();
            warn!("expression cache reached {} entries, clearing", self.capacity);
            self.entries.clear();
            self.evictions.fetch_add(dropped as u64, Ordering::Relaxed);
        }
        self.entries.insert(source.to_string(), Arc::clone(&template));
        Ok(template)
    }

    /// Cached template for `source`, without counting the lookup
    pub fn peek(&self, source: &str) -> Option<Arc<Template>> {
        self.entries.get(source).map(|t| Arc::clone(t.value()))
    }

    /// Drop every template
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached templates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached templates
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseError, parse_template};
    use pretty_assertions::assert_eq;

    fn lookup(cache: &ExpressionCache, source: &str) -> Result<Arc<Template>, ParseError> {
        cache.get_or_try_insert(source, || parse_template(source))
    }

    #[test]
    fn test_hits_and_misses() {
        let cache = ExpressionCache::new(10);
        let first = lookup(&cache, "${a}").unwrap();
        let second = lookup(&cache, "${a}").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lookup(&cache, "${a +}").is_err());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 2,
                entries: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn test_clears_when_full() {
        let cache = ExpressionCache::new(2);
        for source in ["${a}", "${b}", "${c}"] {
            lookup(&cache, source).unwrap();
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.peek("${c}").is_some());
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let cache = ExpressionCache::new(0);
        lookup(&cache, "${a}").unwrap();
        assert!(cache.is_empty());
    }
}
