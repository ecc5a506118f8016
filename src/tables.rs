/// One statistics table scraped from every season page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Short key used in file names and log columns.
    pub key: &'static str,
    pub label: &'static str,
    /// `id` of the element holding the table, possibly inside a comment.
    pub container_id: &'static str,
}

impl TableSpec {
    pub const fn new(key: &'static str, label: &'static str, container_id: &'static str) -> Self {
        Self {
            key,
            label,
            container_id,
        }
    }
}

/// Iteration order here is the order tables are extracted and logged in.
pub const TABLE_SPECS: &[TableSpec] = &[
    TableSpec::new("squad_standard", "Squad Standard Stats", "all_stats_squads_standard"),
    TableSpec::new("squad_shooting", "Squad Shooting", "all_stats_squads_shooting"),
    TableSpec::new("squad_passing", "Squad Pass Types", "all_stats_squads_passing"),
    TableSpec::new(
        "squad_goal_shot_creation",
        "Squad Goal and Shot Creation",
        "all_stats_squads_gca",
    ),
    TableSpec::new("squad_defensive", "Squad Defensive Actions", "all_stats_squads_defense"),
    TableSpec::new("squad_possession", "Squad Possession", "all_stats_squads_possession"),
    TableSpec::new("squad_playing_time", "Squad Playing Time", "all_stats_squads_playing_time"),
    TableSpec::new("squad_misc", "Squad Miscellaneous Stats", "all_stats_squads_misc"),
    TableSpec::new("squad_goalkeeping", "Squad Goalkeeping", "all_stats_keeper_squads"),
    TableSpec::new(
        "squad_adv_goalkeeping",
        "Squad Advanced Goalkeeping",
        "all_stats_keeper_adv_squads",
    ),
    TableSpec::new("league_table", "Premier League Table", "all_stats_league_table"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_and_containers_are_unique() {
        let keys: HashSet<_> = TABLE_SPECS.iter().map(|t| t.key).collect();
        let ids: HashSet<_> = TABLE_SPECS.iter().map(|t| t.container_id).collect();
        assert_eq!(keys.len(), TABLE_SPECS.len());
        assert_eq!(ids.len(), TABLE_SPECS.len());
    }

    #[test]
    fn league_table_comes_last() {
        assert_eq!(TABLE_SPECS.len(), 11);
        assert_eq!(TABLE_SPECS.last().map(|t| t.key), Some("league_table"));
    }
}
