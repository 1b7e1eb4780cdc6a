use log::warn;
use serde::{Deserialize, Serialize};
use std::env;

/// What to do with the optimistic vote bump when the remote increment fails.
///
/// The source prototypes disagreed on this, so it is an explicit choice
/// rather than a baked-in behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VoteRevertPolicy {
    /// Leave the bumped count on screen; the entry stays marked unsynced.
    #[default]
    KeepOptimistic,
    /// Undo the bump so the display matches the last known server value.
    RevertOnFailure,
}

/// Engine configuration. Loaded from the environment by the binary;
/// embedding applications construct it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the hosted backend, without a trailing slash.
    pub base_url: String,
    /// Backend API key, sent as `apikey` and bearer token.
    pub api_key: String,
    /// Problems fetched per page.
    pub page_size: u32,
    /// When set, a failed initial fetch renders the built-in sample dataset
    /// instead of surfacing the error. Off by default so real outages stay
    /// visible.
    pub demo_mode: bool,
    pub vote_policy: VoteRevertPolicy,
    /// Interval for the simulated live-activity ticker, in seconds.
    pub live_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            page_size: 9,
            demo_mode: false,
            vote_policy: VoteRevertPolicy::default(),
            live_interval_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from `MINDHIVE_*` environment variables, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: var_or("MINDHIVE_BASE_URL", defaults.base_url),
            api_key: var_or("MINDHIVE_API_KEY", defaults.api_key),
            page_size: parse_or("MINDHIVE_PAGE_SIZE", defaults.page_size),
            demo_mode: parse_or("MINDHIVE_DEMO_MODE", defaults.demo_mode),
            vote_policy: match env::var("MINDHIVE_VOTE_POLICY").ok().as_deref() {
                Some("revert") => VoteRevertPolicy::RevertOnFailure,
                Some("keep") | None => VoteRevertPolicy::KeepOptimistic,
                Some(other) => {
                    warn!("unknown MINDHIVE_VOTE_POLICY {:?}, using keep", other);
                    VoteRevertPolicy::KeepOptimistic
                }
            },
            live_interval_secs: parse_or("MINDHIVE_LIVE_INTERVAL_SECS", defaults.live_interval_secs),
        }
    }
}

fn var_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid {} value {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.page_size, 9);
        assert!(!cfg.demo_mode);
        assert_eq!(cfg.vote_policy, VoteRevertPolicy::KeepOptimistic);
        assert_eq!(cfg.live_interval_secs, 30);
    }
}
