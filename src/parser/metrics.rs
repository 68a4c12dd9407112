use std::ops::AddAssign;

use super::error::ExtractError;

/// Per-page tally of field outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub inserted: usize,
    pub absent: usize,
    pub not_applicable: usize,
    pub malformed: usize,
    pub empty: usize,
}

impl ExtractionReport {
    pub fn record_inserted(&mut self) {
        self.inserted += 1;
    }

    pub fn record_skipped(&mut self, reason: &ExtractError) {
        match reason {
            ExtractError::Absent => self.absent += 1,
            ExtractError::NotApplicable => self.not_applicable += 1,
            ExtractError::Malformed { .. } => self.malformed += 1,
            ExtractError::Empty => self.empty += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.absent + self.not_applicable + self.malformed + self.empty
    }

    pub fn print(&self) {
        println!("  inserted:       {}", self.inserted);
        println!("  absent:         {}", self.absent);
        println!("  not applicable: {}", self.not_applicable);
        println!("  malformed:      {}", self.malformed);
        println!("  empty:          {}", self.empty);
    }
}

impl AddAssign for ExtractionReport {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.absent += other.absent;
        self.not_applicable += other.not_applicable;
        self.malformed += other.malformed;
        self.empty += other.empty;
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_skip_reason() {
        let mut report = ExtractionReport::default();
        report.record_inserted();
        report.record_skipped(&ExtractError::Absent);
        report.record_skipped(&ExtractError::Absent);
        report.record_skipped(&ExtractError::NotApplicable);
        report.record_skipped(&ExtractError::malformed("map", "x"));
        assert_eq!(report.inserted, 1);
        assert_eq!(report.absent, 2);
        assert_eq!(report.skipped(), 4);

        let mut total = ExtractionReport::default();
        total += report;
        total += report;
        assert_eq!(total.malformed, 2);
    }
}
