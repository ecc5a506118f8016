//! FBREF SEASON HARVESTER
//! Pulls the Premier League squad tables for every configured season,
//! one page per season, and keeps the CSVs on disk so re-runs resume.

mod error;
mod macros;

pub mod config;
pub mod logging;
pub mod parse;
pub mod process;
pub mod request;
pub mod season;
pub mod store;
pub mod tables;

pub use error::{Error, Result};

pub const HOST: &str = "https://fbref.com";
pub const FIRST_SEASON: u16 = 2000;
/// Inclusive.
pub const LAST_SEASON: u16 = 2025;
pub const OUTPUT_DIR: &str = "data/raw";
pub const LOG_PATH: &str = "data/fbref_scrape_log.csv";

pub const MAX_RETRIES: u32 = 3;
pub const BACKOFF_FACTOR_SECS: f64 = 10.0;
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Pause bounds in seconds.
pub const INITIAL_PAUSE: (f64, f64) = (10.0, 20.0);
pub const TABLE_PAUSE: (f64, f64) = (4.0, 7.0);
pub const SEASON_PAUSE: (f64, f64) = (5.0, 10.0);
pub const ERROR_COOLDOWN: (f64, f64) = (60.0, 90.0);

pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
];

pub const FIXED_HEADERS: [(&str, &str); 3] = [
    ("Referer", "https://fbref.com/en/comps/9/Premier-League-Stats"),
    ("Accept-Language", "en-US,en;q=0.9"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
];
