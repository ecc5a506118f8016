use std::fmt;
use std::ops::RangeInclusive;

/// A season, identified by the year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Season(pub u16);

impl Season {
    /// `2005-06`, used in file names and the `season` column.
    pub fn compact_label(&self) -> String {
        format!("{}-{:02}", self.0, (u32::from(self.0) + 1) % 100)
    }

    /// `2005-2006`, used in request paths.
    pub fn full_label(&self) -> String {
        format!("{}-{}", self.0, u32::from(self.0) + 1)
    }

    pub fn url(&self, host: &str) -> String {
        format!(
            "{}/en/comps/9/{}/{}-Premier-League-Stats",
            host.trim_end_matches('/'),
            self.full_label(),
            self.compact_label()
        )
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact_label())
    }
}

/// Contiguous, inclusive run of seasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRange {
    first: u16,
    last: u16,
}

impl SeasonRange {
    pub fn new(first: u16, last: u16) -> Self {
        Self { first, last }
    }

    pub fn years(&self) -> RangeInclusive<u16> {
        self.first..=self.last
    }

    pub fn iter(&self) -> impl Iterator<Item = Season> {
        self.years().map(Season)
    }

    pub fn len(&self) -> usize {
        self.years().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }
}
