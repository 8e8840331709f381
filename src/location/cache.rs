//! File-based record cache at ~/.iptrack/cache.json.
//!
//! Holds the latest validated record per IP. Keys are trimmed and
//! lowercased. A newer lookup for the same IP supersedes the old entry.
//! Entries are re-validated on load; a bad entry is dropped on its own.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::LocationRecord;

pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    record: LocationRecord,
    timestamp: i64,
}

/// The record cache.
pub struct RecordCache {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

fn cache_key(ip: &str) -> String {
    ip.trim().to_lowercase()
}

impl RecordCache {
    /// Load cache from the default location (~/.iptrack/cache.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load cache from a specific path.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path);
        Self {
            path,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            entries,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".iptrack")
            .join("cache.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> HashMap<String, CacheEntry> {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                log::warn!("cannot read cache {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        let raw: HashMap<String, serde_json::Value> = match serde_json::from_str(&data) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("ignoring unreadable cache {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        let mut entries: HashMap<String, CacheEntry> = HashMap::new();
        for (key, value) in raw {
            let entry = match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("dropping cached record for '{}': {}", key, e);
                    continue;
                }
            };
            // Keys come from the record, not from the file.
            let ip_key = cache_key(entry.record.ip());
            if ip_key != key {
                log::warn!("cached record under '{}' belongs to '{}', re-keying", key, ip_key);
            }
            match entries.get(&ip_key) {
                Some(existing) if existing.timestamp >= entry.timestamp => {}
                _ => {
                    entries.insert(ip_key, entry);
                }
            }
        }
        entries
    }

    /// Future-dated or unrepresentable ages count as stale.
    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        match now.checked_sub(entry.timestamp) {
            Some(age) if age >= 0 => age <= self.ttl.num_milliseconds(),
            _ => false,
        }
    }

    /// Look up an IP. Returns None if missing or expired.
    pub fn get(&self, ip: &str) -> Option<LocationRecord> {
        let entry = self.entries.get(&cache_key(ip))?;
        let now = chrono::Utc::now().timestamp_millis();
        if !self.is_fresh(entry, now) {
            return None;
        }
        Some(entry.record.clone())
    }

    /// The most recently stored record that has not expired.
    pub fn most_recent(&self) -> Option<LocationRecord> {
        let now = chrono::Utc::now().timestamp_millis();
        self.entries
            .values()
            .filter(|e| self.is_fresh(e, now))
            .max_by_key(|e| e.timestamp)
            .map(|e| e.record.clone())
    }

    /// Store a record, replacing any earlier one for the same IP, and persist.
    pub fn put(&mut self, record: &LocationRecord) {
        let entry = CacheEntry {
            record: record.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.insert(cache_key(record.ip()), entry);
        self.persist();
    }

    pub fn remove(&mut self, ip: &str) -> Option<LocationRecord> {
        let removed = self.entries.remove(&cache_key(ip)).map(|e| e.record);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("cannot create cache directory {}: {}", parent.display(), e);
                return;
            }
        }
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(j) => j,
            Err(e) => {
                log::warn!("cannot serialize cache: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            log::warn!("cannot write cache {}: {}", self.path.display(), e);
        }
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_cache() -> (RecordCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        (RecordCache::load_from(path), dir)
    }

    fn record(ip: &str, city: &str) -> LocationRecord {
        LocationRecord::from_value(json!({
            "ip": ip,
            "isp": "Example ISP",
            "name": city,
            "location": {
                "city": city,
                "country": "SE",
                "lat": 59.3293,
                "lng": 18.0686,
                "postalCode": "111 20",
                "region": "Stockholm",
                "timezone": "Europe/Stockholm"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_cache_put_get() {
        let (mut cache, _dir) = test_cache();
        let rec = record("81.2.69.160", "Stockholm");
        cache.put(&rec);

        assert_eq!(cache.get("81.2.69.160"), Some(rec));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_case_insensitive() {
        let (mut cache, _dir) = test_cache();
        cache.put(&record("2001:DB8::1", "Stockholm"));

        assert!(cache.get("2001:db8::1").is_some());
        assert!(cache.get(" 2001:DB8::1 ").is_some());
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get("10.0.0.1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_supersedes() {
        let (mut cache, _dir) = test_cache();
        cache.put(&record("81.2.69.160", "Stockholm"));
        cache.put(&record("81.2.69.160", "Uppsala"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("81.2.69.160").unwrap().location().city(), "Uppsala");
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        {
            let mut cache = RecordCache::load_from(path.clone());
            cache.put(&record("81.2.69.160", "Stockholm"));
        }

        let cache2 = RecordCache::load_from(path);
        let result = cache2.get("81.2.69.160").unwrap();
        assert_eq!(result.name(), "Stockholm");
        assert_eq!(result.location().postal_code(), "111 20");
    }

    #[test]
    fn test_most_recent() {
        let (mut cache, _dir) = test_cache();
        cache.put(&record("1.1.1.1", "First"));
        std::thread::sleep(std::time::Duration::from_millis(10));
        cache.put(&record("2.2.2.2", "Second"));

        assert_eq!(cache.most_recent().unwrap().name(), "Second");
    }

    #[test]
    fn test_expired_entries_hidden() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let rec = record("81.2.69.160", "Stockholm");
        let stale = json!({
            "81.2.69.160": { "record": rec, "timestamp": 0 }
        });
        fs::write(&path, stale.to_string()).unwrap();

        let cache = RecordCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("81.2.69.160").is_none());
        assert!(cache.most_recent().is_none());

        let generous = cache.with_ttl(Duration::days(365 * 200));
        assert!(generous.get("81.2.69.160").is_some());
    }

    #[test]
    fn test_out_of_range_timestamps_are_stale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let future = chrono::Utc::now().timestamp_millis() + 3_600_000;
        let file = json!({
            "1.1.1.1": { "record": record("1.1.1.1", "Oldest"), "timestamp": i64::MIN },
            "2.2.2.2": { "record": record("2.2.2.2", "Future"), "timestamp": future }
        });
        fs::write(&path, file.to_string()).unwrap();

        let cache = RecordCache::load_from(path).with_ttl(Duration::days(365 * 200));
        assert!(cache.get("1.1.1.1").is_none());
        assert!(cache.get("2.2.2.2").is_none());
        assert!(cache.most_recent().is_none());
    }

    #[test]
    fn test_load_rekeys_from_record_ip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let now = chrono::Utc::now().timestamp_millis();
        let file = json!({
            "2001:DB8::1": { "record": record("2001:DB8::1", "Stockholm"), "timestamp": now },
            "8.8.8.8": { "record": record("9.9.9.9", "Zurich"), "timestamp": now }
        });
        fs::write(&path, file.to_string()).unwrap();

        let cache = RecordCache::load_from(path);
        assert_eq!(cache.get("2001:db8::1").unwrap().name(), "Stockholm");
        assert!(cache.get("8.8.8.8").is_none());
        assert_eq!(cache.get("9.9.9.9").unwrap().ip(), "9.9.9.9");
    }

    #[test]
    fn test_load_keeps_newest_on_key_collision() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let now = chrono::Utc::now().timestamp_millis();
        let file = json!({
            "81.2.69.160": { "record": record("81.2.69.160", "Newer"), "timestamp": now },
            "stale-key": { "record": record("81.2.69.160", "Older"), "timestamp": now - 1000 }
        });
        fs::write(&path, file.to_string()).unwrap();

        let cache = RecordCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("81.2.69.160").unwrap().name(), "Newer");
    }

    #[test]
    fn test_invalid_entry_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let good = record("81.2.69.160", "Stockholm");
        let mut bad = serde_json::to_value(record("9.9.9.9", "Zurich")).unwrap();
        bad["location"]["lat"] = json!(137.4);
        let now = chrono::Utc::now().timestamp_millis();
        let file = json!({
            "81.2.69.160": { "record": good, "timestamp": now },
            "9.9.9.9": { "record": bad, "timestamp": now }
        });
        fs::write(&path, file.to_string()).unwrap();

        let cache = RecordCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("81.2.69.160").is_some());
        assert!(cache.get("9.9.9.9").is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();

        let cache = RecordCache::load_from(path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let (mut cache, _dir) = test_cache();
        cache.put(&record("1.1.1.1", "First"));
        cache.put(&record("2.2.2.2", "Second"));

        assert_eq!(cache.remove("1.1.1.1").unwrap().name(), "First");
        assert!(cache.remove("1.1.1.1").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(RecordCache::load_from(cache.path().to_path_buf()).is_empty());
    }
}
