// ==================== IN-MEMORY CACHE ====================
// Single-process TTL + LRU cache for JSON values keyed by strings.
// Keys follow a "<resource>:<detail>" convention so writes can drop a whole
// family with a glob such as "students:*".

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
    /// Logical clock of the last access, used for LRU ordering.
    last_access: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct MemoryCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    default_ttl: Duration,
    clock: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl MemoryCache {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            default_ttl,
            clock: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let stamp = self.tick();

        let expired = match self.entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.last_access = stamp;
                self.hits += 1;
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.misses += 1;
        None
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        let stamp = self.tick();
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
                last_access: stamp,
            },
        );
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            log::debug!("🧹 Cache full, evicting {}", key);
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every key matching a `*` glob. Returns how many were removed.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !glob_matches(pattern, key));
        before - self.entries.len()
    }

    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

fn glob_matches(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !key.starts_with(first) || key.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &key[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

lazy_static::lazy_static! {
    static ref CACHE: Mutex<MemoryCache> = Mutex::new(MemoryCache::default());
}

/// Replaces the global cache with one sized from configuration.
pub fn configure_cache(capacity: usize, ttl: Duration) {
    if let Ok(mut cache) = CACHE.lock() {
        *cache = MemoryCache::new(capacity, ttl);
    }
}

pub fn get_cached(key: &str) -> Option<Value> {
    let hit = CACHE.lock().ok()?.get(key);
    if hit.is_some() {
        log::debug!("📦 Cache hit: {}", key);
    }
    hit
}

pub fn set_cache(key: impl Into<String>, value: Value) {
    if let Ok(mut cache) = CACHE.lock() {
        cache.set(key, value, None);
    }
}

pub fn remove_cached(key: &str) -> bool {
    CACHE.lock().map(|mut cache| cache.delete(key)).unwrap_or(false)
}

pub fn invalidate(pattern: &str) -> usize {
    CACHE
        .lock()
        .map(|mut cache| cache.invalidate_pattern(pattern))
        .unwrap_or(0)
}

pub fn clear_cache() {
    if let Ok(mut cache) = CACHE.lock() {
        cache.clear();
    }
}

pub fn cleanup_expired_cache() -> usize {
    CACHE
        .lock()
        .map(|mut cache| cache.cleanup_expired())
        .unwrap_or(0)
}

pub fn cache_stats() -> CacheStats {
    CACHE
        .lock()
        .map(|cache| cache.stats())
        .unwrap_or(CacheStats {
            size: 0,
            capacity: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_values_until_they_expire() {
        let mut cache = MemoryCache::new(10, Duration::from_secs(60));
        cache.set("students:all", json!([1, 2, 3]), None);
        cache.set("short", json!("gone"), Some(Duration::from_millis(1)));

        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.get("students:all"), Some(json!([1, 2, 3])));
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn evicts_least_recently_used_entry() {
        let mut cache = MemoryCache::new(2, Duration::from_secs(60));
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);

        // touch "a" so "b" becomes the oldest
        assert!(cache.get("a").is_some());
        cache.set("c", json!(3), None);

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn overwriting_a_key_does_not_evict() {
        let mut cache = MemoryCache::new(2, Duration::from_secs(60));
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);
        cache.set("a", json!(10), None);

        assert_eq!(cache.get("a"), Some(json!(10)));
        assert_eq!(cache.get("b"), Some(json!(2)));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn invalidates_by_glob_pattern() {
        let mut cache = MemoryCache::new(10, Duration::from_secs(60));
        cache.set("students:list:batch=2021", json!(1), None);
        cache.set("students:list:all", json!(2), None);
        cache.set("events:list:all", json!(3), None);
        cache.set("analytics:overview", json!(4), None);

        assert_eq!(cache.invalidate_pattern("students:*"), 2);
        assert_eq!(cache.invalidate_pattern("*:overview"), 1);
        assert_eq!(cache.invalidate_pattern("nothing"), 0);
        assert!(cache.get("events:list:all").is_some());
    }

    #[test]
    fn glob_matching() {
        assert!(glob_matches("students:*", "students:"));
        assert!(glob_matches("*", "anything"));
        assert!(glob_matches("a*c*e", "abcde"));
        assert!(!glob_matches("a*c*e", "abde"));
        assert!(!glob_matches("ab*ba", "aba"));
        assert!(glob_matches("exact", "exact"));
        assert!(!glob_matches("exact", "exactly"));
    }

    #[test]
    fn counts_hits_and_misses() {
        let mut cache = MemoryCache::default();
        cache.set("k", json!(true), None);
        cache.get("k");
        cache.get("k");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn delete_and_clear() {
        let mut cache = MemoryCache::new(10, Duration::from_secs(60));
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.stats().size, 1);

        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn cleanup_drops_only_expired() {
        let mut cache = MemoryCache::new(10, Duration::from_secs(60));
        cache.set("keep", json!(1), None);
        cache.set("drop", json!(2), Some(Duration::from_millis(1)));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.stats().size, 1);
    }
}
