//! Result types for resampling.

use std::fmt;

use reservoir_index::Location;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Location counts for one resampling call.
///
/// # Example
///
/// ```
/// use reservoir_resample::ResampleReport;
///
/// let report = ResampleReport::default();
/// assert_eq!(report.located_percent(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampleReport {
    /// Number of sample points looked up.
    pub samples: usize,
    /// Samples that fell inside a searchable cell.
    pub located: usize,
    /// Samples outside every cell.
    pub outside: usize,
    /// Samples covered only by degenerate cells.
    pub degenerate: usize,
}

impl ResampleReport {
    /// Tally a batch of locations.
    #[must_use]
    pub fn from_locations(locations: &[Location]) -> Self {
        let mut report = Self::default();
        for location in locations {
            report.record(*location);
        }
        report
    }

    /// Count one location.
    pub fn record(&mut self, location: Location) {
        self.samples += 1;
        match location {
            Location::Found(_) => self.located += 1,
            Location::Outside => self.outside += 1,
            Location::Degenerate => self.degenerate += 1,
        }
    }

    /// Add the counts of another report.
    pub fn merge(&mut self, other: &Self) {
        self.samples += other.samples;
        self.located += other.located;
        self.outside += other.outside;
        self.degenerate += other.degenerate;
    }

    /// Whether nothing was located while some samples hit only degenerate cells.
    #[must_use]
    pub const fn only_degenerate(&self) -> bool {
        self.located == 0 && self.degenerate > 0
    }

    /// Percentage of samples that were located.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn located_percent(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            100.0 * self.located as f64 / self.samples as f64
        }
    }
}

impl fmt::Display for ResampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resampling:")?;
        writeln!(f, "  Samples: {}", self.samples)?;
        writeln!(f, "  Located: {} ({:.1}%)", self.located, self.located_percent())?;
        writeln!(f, "  Outside: {}", self.outside)?;
        writeln!(f, "  Degenerate only: {}", self.degenerate)?;
        Ok(())
    }
}

/// Agreement between a well zone log and the grid zone property.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneMatchReport {
    /// Well samples compared (located, with defined zone in both).
    pub total: usize,
    /// Samples where the zones agree.
    pub matched: usize,
    /// Samples skipped (outside the grid, undefined zone, or filtered out of the log).
    pub skipped: usize,
}

impl ZoneMatchReport {
    /// Percentage of compared samples that agree, 0 when nothing was compared.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn match_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.matched as f64 / self.total as f64
        }
    }
}

impl fmt::Display for ZoneMatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Zone Match:")?;
        writeln!(f, "  Compared: {}", self.total)?;
        writeln!(f, "  Matched: {} ({:.1}%)", self.matched, self.match_percent())?;
        writeln!(f, "  Skipped: {}", self.skipped)?;
        Ok(())
    }
}
