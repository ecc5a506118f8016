use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;

use crate::season::SeasonRange;
use crate::{
    BACKOFF_FACTOR_SECS, ERROR_COOLDOWN, FIRST_SEASON, FIXED_HEADERS, HOST, INITIAL_PAUSE,
    LAST_SEASON, LOG_PATH, MAX_RETRIES, MAX_RETRY_AFTER_SECS, OUTPUT_DIR, REQUEST_TIMEOUT_SECS,
    RETRY_STATUSES, SEASON_PAUSE, TABLE_PAUSE, USER_AGENTS,
};

/// Randomised pause, bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pause {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Pause {
    pub const NONE: Pause = Pause {
        min_secs: 0.0,
        max_secs: 0.0,
    };

    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn pick(&self) -> Duration {
        let (lo, hi) = (self.min_secs.max(0.0), self.max_secs.max(0.0));
        if hi <= lo {
            return Duration::from_secs_f64(lo);
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(lo..=hi))
    }

    pub async fn sleep(&self) {
        let wait = self.pick();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

impl From<(f64, f64)> for Pause {
    fn from((min_secs, max_secs): (f64, f64)) -> Self {
        Self::new(min_secs, max_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    /// Before the first request of a run.
    Initial,
    /// After each table of a season.
    Table,
    /// Between seasons.
    Season,
    /// After an unexpected failure while processing a season.
    ErrorCooldown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    pub initial: Pause,
    pub table: Pause,
    pub season: Pause,
    pub error_cooldown: Pause,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            initial: Pause::NONE,
            table: Pause::NONE,
            season: Pause::NONE,
            error_cooldown: Pause::NONE,
        }
    }

    pub fn get(&self, kind: PauseKind) -> Pause {
        match kind {
            PauseKind::Initial => self.initial,
            PauseKind::Table => self.table,
            PauseKind::Season => self.season,
            PauseKind::ErrorCooldown => self.error_cooldown,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            initial: INITIAL_PAUSE.into(),
            table: TABLE_PAUSE.into(),
            season: SEASON_PAUSE.into(),
            error_cooldown: ERROR_COOLDOWN.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<u16>,
    pub timeout: Duration,
    /// Cap on how long a server-sent `Retry-After` can hold a retry back.
    pub max_retry_after: Duration,
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Wait before retry number `retry` (1-based): factor * 2^(retry - 1).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1 << exp)
    }

    /// The longer of the backoff and the (capped) `Retry-After`.
    pub fn wait_before(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff(retry);
        match retry_after {
            Some(asked) => backoff.max(asked.min(self.max_retry_after)),
            None => backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            backoff_factor: Duration::from_secs_f64(BACKOFF_FACTOR_SECS),
            retry_statuses: RETRY_STATUSES.to_vec(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_retry_after: Duration::from_secs(MAX_RETRY_AFTER_SECS),
        }
    }
}

/// Everything a run needs, fixed before the first season is touched.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub host: String,
    pub seasons: SeasonRange,
    pub output_dir: PathBuf,
    pub log_path: PathBuf,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    pub user_agents: Vec<String>,
    pub headers: Vec<(String, String)>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            seasons: SeasonRange::new(FIRST_SEASON, LAST_SEASON),
            output_dir: PathBuf::from(OUTPUT_DIR),
            log_path: PathBuf::from(LOG_PATH),
            retry: RetryPolicy::default(),
            pacing: Pacing::default(),
            user_agents: USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            headers: FIXED_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl HarvestConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_seasons(mut self, first: u16, last: u16) -> Self {
        self.seasons = SeasonRange::new(first, last);
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_log_path(mut self, path: impl AsRef<Path>) -> Self {
        self.log_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Picks the session's user agent. `None` when the pool is empty.
    pub fn pick_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..self.user_agents.len());
        Some(self.user_agents[idx].as_str())
    }
}
