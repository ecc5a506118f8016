use std::fs;
use std::path::{Path, PathBuf};

use crate::parse::ExtractedTable;
use crate::process::SeasonRecord;
use crate::season::Season;
use crate::tables::TableSpec;
use crate::Result;

/// `{dir}/fbref_{key}_{compact_label}.csv`
pub fn table_path(dir: &Path, key: &str, season: Season) -> PathBuf {
    dir.join(format!("fbref_{key}_{}.csv", season.compact_label()))
}

/// A season counts as done only when every table file exists. Contents
/// are not inspected.
pub fn season_complete(dir: &Path, specs: &[TableSpec], season: Season) -> bool {
    specs
        .iter()
        .all(|spec| table_path(dir, spec.key, season).exists())
}

/// Writes (or overwrites) one table's CSV, returning the path written.
pub fn write_table(
    dir: &Path,
    key: &str,
    season: Season,
    table: &ExtractedTable,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = table_path(dir, key, season);

    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(path)
}

/// One row per logged season: `season` then one column per table key.
pub fn write_log(path: &Path, specs: &[TableSpec], records: &[SeasonRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["season"];
    header.extend(specs.iter().map(|spec| spec.key));
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![record.season.compact_label()];
        row.extend(
            specs
                .iter()
                .map(|spec| record.outcome(spec.key).unwrap_or_default().to_string()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Outcome;
    use crate::tables::TABLE_SPECS;

    fn table() -> ExtractedTable {
        ExtractedTable {
            columns: vec!["Squad".into(), "Pts, total".into()],
            rows: vec![vec!["Arsenal".into(), "90".into()]],
        }
        .with_season("2003-04")
    }

    #[test]
    fn table_file_name_follows_key_and_season() {
        let path = table_path(Path::new("data/raw"), "squad_misc", Season(2003));
        assert_eq!(path, PathBuf::from("data/raw/fbref_squad_misc_2003-04.csv"));
    }

    #[test]
    fn writes_quoted_csv_with_season_column() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("raw");
        let path = write_table(&out, "league_table", Season(2003), &table()).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "Squad,\"Pts, total\",season\nArsenal,90,2003-04\n");
    }

    #[test]
    fn completeness_needs_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let specs = &TABLE_SPECS[..3];
        let season = Season(2010);

        write_table(dir.path(), specs[0].key, season, &table()).unwrap();
        write_table(dir.path(), specs[1].key, season, &table()).unwrap();
        assert!(!season_complete(dir.path(), specs, season));

        write_table(dir.path(), specs[2].key, season, &table()).unwrap();
        assert!(season_complete(dir.path(), specs, season));
        assert!(!season_complete(dir.path(), specs, Season(2011)));
    }

    #[test]
    fn log_has_one_column_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.csv");
        let specs = &TABLE_SPECS[..2];

        let records = vec![
            SeasonRecord::filled(Season(2000), specs, Outcome::Yes),
            SeasonRecord::filled(Season(2001), specs, Outcome::Error),
        ];
        write_log(&path, specs, &records).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "season,squad_standard,squad_shooting\n2000-01,yes,yes\n2001-02,error,error\n"
        );
    }
}
