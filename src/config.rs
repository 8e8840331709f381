//! Runtime settings shared by the CLI and the HTTP API.

use chrono::Duration;
use log::LevelFilter;
use std::path::PathBuf;

use crate::location::cache::{RecordCache, DEFAULT_TTL_HOURS};
use crate::location::{OptionalFields, ParseOptions};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_path: PathBuf,
    pub cache_ttl: Duration,
    pub optional_fields: OptionalFields,
    pub host: String,
    pub port: u16,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_path: RecordCache::default_path(),
            cache_ttl: Duration::hours(DEFAULT_TTL_HOURS),
            optional_fields: OptionalFields::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl Settings {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            optional_fields: self.optional_fields,
        }
    }

    pub fn open_cache(&self) -> RecordCache {
        RecordCache::load_from(self.cache_path.clone()).with_ttl(self.cache_ttl)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
