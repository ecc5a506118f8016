use std::fmt;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::config::{HarvestConfig, PauseKind};
use crate::parse::{extract_page, Lookup};
use crate::request::PageSource;
use crate::season::Season;
use crate::store;
use crate::tables::TableSpec;
use crate::{info_time, Result};

/// Per (season, table) result recorded in the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    Yes,
    #[default]
    Missing,
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Yes => "yes",
            Outcome::Missing => "missing",
            Outcome::Error => "error",
        })
    }
}

/// Outcomes for every table key of one season, in spec order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRecord {
    pub season: Season,
    pub outcomes: Vec<(&'static str, Outcome)>,
}

impl SeasonRecord {
    pub fn new(season: Season) -> Self {
        Self {
            season,
            outcomes: Vec::new(),
        }
    }

    /// Same outcome for every key, used when a season never got as far as
    /// extraction.
    pub fn filled(season: Season, specs: &[TableSpec], outcome: Outcome) -> Self {
        Self {
            season,
            outcomes: specs.iter().map(|spec| (spec.key, outcome)).collect(),
        }
    }

    pub fn push(&mut self, key: &'static str, outcome: Outcome) {
        self.outcomes.push((key, outcome));
    }

    pub fn outcome(&self, key: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, outcome)| *outcome)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    /// Seasons that were processed, in run order.
    pub records: Vec<SeasonRecord>,
    /// Seasons skipped because every table file was already on disk.
    pub skipped: Vec<Season>,
}

impl RunLog {
    #[cfg(test)]
    fn record(&self, season: Season) -> Option<&SeasonRecord> {
        self.records.iter().find(|r| r.season == season)
    }

    /// (yes, missing, error) across all processed seasons.
    pub fn tally(&self) -> (usize, usize, usize) {
        self.records
            .iter()
            .flat_map(|r| r.outcomes.iter())
            .fold((0, 0, 0), |(y, m, e), (_, outcome)| match outcome {
                Outcome::Yes => (y + 1, m, e),
                Outcome::Missing => (y, m + 1, e),
                Outcome::Error => (y, m, e + 1),
            })
    }
}

/// Walks the configured seasons one at a time, pulling every table from
/// each season page and writing it to disk.
pub struct Harvester<S> {
    config: HarvestConfig,
    specs: Vec<TableSpec>,
    source: S,
}

impl<S: PageSource> Harvester<S> {
    pub fn new(config: HarvestConfig, specs: &[TableSpec], source: S) -> Self {
        Self {
            config,
            specs: specs.to_vec(),
            source,
        }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    /// Attempts every season, then writes the run log. Only a failure to
    /// write the log itself is returned as an error.
    pub async fn run(&self) -> Result<RunLog> {
        let start_time = Local::now();
        let range = &self.config.seasons;
        info_time!(
            "Started harvesting {} seasons into {}",
            range.len(),
            self.config.output_dir.display()
        );

        let mut log = RunLog::default();
        let mut requested = false;

        for season in range.iter() {
            if store::season_complete(&self.config.output_dir, &self.specs, season) {
                info!("Skipping {season} (already scraped)");
                log.skipped.push(season);
                continue;
            }

            if !requested {
                info!("Waiting before the first request");
                self.pause(PauseKind::Initial).await;
                requested = true;
            }

            let record = match self.harvest_season(season).await {
                Ok(record) => record,
                Err(e) => {
                    error!("Failure while processing {season}: {e}, cooling down");
                    self.pause(PauseKind::ErrorCooldown).await;
                    SeasonRecord::filled(season, &self.specs, Outcome::Error)
                }
            };
            log.records.push(record);
        }

        store::write_log(&self.config.log_path, &self.specs, &log.records)?;
        let (yes, missing, errors) = log.tally();
        info_time!(
            start_time,
            "Log saved to {}: {} seasons processed, {} skipped, {yes} yes / {missing} missing / {errors} error",
            self.config.log_path.display(),
            log.records.len(),
            log.skipped.len()
        );

        Ok(log)
    }

    /// Fetches one season page and settles every table on it. A failed
    /// fetch marks the whole season `missing`; anything else unexpected is
    /// returned to the caller.
    async fn harvest_season(&self, season: Season) -> Result<SeasonRecord> {
        let url = season.url(&self.config.host);
        info_time!("Scraping {season}: {url}");

        let html = match self.source.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) if e.is_fetch_failure() => {
                warn!("Fetch failed for {season}: {e}");
                self.pause(PauseKind::Season).await;
                return Ok(SeasonRecord::filled(season, &self.specs, Outcome::Missing));
            }
            Err(e) => return Err(e),
        };

        let mut record = SeasonRecord::new(season);
        for (spec, lookup) in extract_page(html, self.specs.clone()).await? {
            let outcome = self.settle_table(season, &spec, lookup);
            record.push(spec.key, outcome);
            self.pause(PauseKind::Table).await;
        }

        info!("Done {season}");
        self.pause(PauseKind::Season).await;
        Ok(record)
    }

    /// Writes a found table; every other lookup result becomes `missing`.
    fn settle_table(&self, season: Season, spec: &TableSpec, lookup: Result<Lookup>) -> Outcome {
        let label = season.compact_label();
        let (key, name) = (spec.key, spec.label);
        match lookup {
            Ok(Lookup::Found(table)) => {
                let table = table.with_season(&label);
                match store::write_table(&self.config.output_dir, key, season, &table) {
                    Ok(path) => {
                        debug!(rows = table.rows.len(), "Wrote {}", path.display());
                        Outcome::Yes
                    }
                    Err(e) => {
                        warn!("Error processing {key} ({name}) for {label}: {e}");
                        Outcome::Missing
                    }
                }
            }
            Ok(Lookup::NoContainerId) => {
                warn!("No container id configured for {key}");
                Outcome::Missing
            }
            Ok(Lookup::NoContainer) => {
                warn!("Container not found: {} for {key}", spec.container_id);
                Outcome::Missing
            }
            Ok(Lookup::NoTable) => {
                warn!("Table not found: {key} ({name}) in {label}");
                Outcome::Missing
            }
            Err(e) => {
                warn!("Error processing {key} ({name}) for {label}: {e}");
                Outcome::Missing
            }
        }
    }

    async fn pause(&self, kind: PauseKind) {
        self.config.pacing.get(kind).sleep().await;
    }
}
