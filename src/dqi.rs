//! Data quality indicators attached to inventory records.
//!
//! Scores run from 1 (best) to 5 (worst).
use crate::inventory::{Column, InventoryTable};

/// A fixed set of data quality scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataQualityScores {
    pub data_collection: f64,
    pub geographical_correlation: f64,
    pub technological_correlation: f64,
    pub reliability: f64,
}

/// Scores given to records derived from modelled rather than reported data
pub const MODELLED_DATA_SCORES: DataQualityScores = DataQualityScores {
    data_collection: 5.0,
    geographical_correlation: 1.0,
    technological_correlation: 1.0,
    reliability: 1.0,
};

impl DataQualityScores {
    /// Set these scores on every record of a table
    pub fn apply(&self, table: &mut InventoryTable) {
        for column in [
            Column::DataCollection,
            Column::GeographicalCorrelation,
            Column::TechnologicalCorrelation,
            Column::ReliabilityScore,
        ] {
            table.add_column(column);
        }

        for record in table.records_mut() {
            record.data_collection = Some(self.data_collection);
            record.geographical_correlation = Some(self.geographical_correlation);
            record.technological_correlation = Some(self.technological_correlation);
            record.reliability_score = Some(self.reliability);
        }
    }
}

/// Scores how well the age of data matches the year an inventory represents
pub trait TemporalCorrelationScorer {
    /// The temporal correlation score for data from `data_year`
    fn score(&self, data_year: u32) -> f64;
}

/// Scores temporal correlation in bands of data age relative to a target year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBandScorer {
    target_year: u32,
}

impl AgeBandScorer {
    /// Create a scorer for an inventory representing `target_year`
    pub fn new(target_year: u32) -> Self {
        Self { target_year }
    }
}

impl TemporalCorrelationScorer for AgeBandScorer {
    fn score(&self, data_year: u32) -> f64 {
        match self.target_year.saturating_sub(data_year) {
            0..=3 => 1.0,
            4..=6 => 2.0,
            7..=10 => 3.0,
            11..=15 => 4.0,
            _ => 5.0,
        }
    }
}
