// src/config.rs

use crate::decode::DecodeOptions;
use anyhow::{Context, Result};
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

/// Google Play's public list of supported devices, published as UTF-16LE CSV.
pub const DEFAULT_FEED_URL: &str =
    "https://storage.googleapis.com/play_public/supported_devices.csv";

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime settings, read from `DEVICEFEED_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed_url: Url,
    /// Directory holding `devices.json` and `brands.json`.
    pub output_dir: PathBuf,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub timeout: Duration,
    pub allow_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: Url::parse(DEFAULT_FEED_URL).expect("default feed URL should parse"),
            output_dir: PathBuf::from("."),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_BACKOFF_MS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            allow_empty: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(raw) = lookup("DEVICEFEED_URL") {
            cfg.feed_url =
                Url::parse(raw.trim()).with_context(|| format!("DEVICEFEED_URL={}", raw))?;
        }
        if let Some(raw) = lookup("DEVICEFEED_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(raw);
        }
        if let Some(v) = parse_var(&lookup, "DEVICEFEED_MAX_RETRIES")? {
            cfg.max_retries = v;
        }
        if let Some(v) = parse_var(&lookup, "DEVICEFEED_BACKOFF_MS")? {
            cfg.initial_backoff_ms = v;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "DEVICEFEED_TIMEOUT_SECS")? {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = parse_var(&lookup, "DEVICEFEED_ALLOW_EMPTY")? {
            cfg.allow_empty = v;
        }

        Ok(cfg)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            allow_empty: self.allow_empty,
            ..DecodeOptions::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
    }
}
