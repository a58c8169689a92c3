//! Fill missing attribute values using other records that share a key.
use crate::inventory::{Column, InventoryTable, Value};
use anyhow::{Result, ensure};
use log::warn;
use std::collections::HashMap;

/// A map of state codes, keyed by plant ID
pub type FacilityStateMap = HashMap<u32, String>;

/// Columns filled when the caller doesn't specify any
pub const DEFAULT_FILL_COLUMNS: [Column; 11] = [
    Column::BalancingAuthorityCode,
    Column::BalancingAuthorityName,
    Column::FuelCategory,
    Column::Nerc,
    Column::PercentGeneration,
    Column::EgridID,
    Column::Subregion,
    Column::FercRegion,
    Column::EiaRegion,
    Column::State,
    Column::Electricity,
];

/// Fills missing values in inventory tables from records sharing a key
pub struct KeyFiller<'a> {
    facility_states: &'a FacilityStateMap,
}

impl<'a> KeyFiller<'a> {
    /// Create a filler that falls back on the given facility states
    pub fn new(facility_states: &'a FacilityStateMap) -> Self {
        Self { facility_states }
    }

    /// Fill missing values in `table`.
    ///
    /// For each target column, every record with no value takes the first value found in a
    /// record with the same key. Remaining missing states are then looked up by eGRID ID.
    ///
    /// # Arguments
    ///
    /// * `table` - The table to fill
    /// * `key_column` - Column identifying records that describe the same entity
    /// * `target_columns` - Columns to fill. If empty, [`DEFAULT_FILL_COLUMNS`] are used.
    /// * `drop_incomplete` - Whether to drop records still missing a value in a target column
    pub fn fill_nans(
        &self,
        table: &mut InventoryTable,
        key_column: Column,
        target_columns: &[Column],
        drop_incomplete: bool,
    ) -> Result<()> {
        ensure!(
            table.has_column(key_column),
            "Key column '{}' is not in the table",
            key_column.header()
        );

        let target_columns = if target_columns.is_empty() {
            &DEFAULT_FILL_COLUMNS[..]
        } else {
            target_columns
        };
        let mut confirmed = Vec::new();
        for &column in target_columns {
            if table.has_column(column) {
                confirmed.push(column);
            } else {
                warn!("Column {} is not in the table", column.header());
            }
        }

        for &column in &confirmed {
            fill_column(table, key_column, column);
        }

        if !table.has_column(Column::State) {
            table.add_column(Column::State);
            confirmed.push(Column::State);
        }
        for record in table.records_mut() {
            if record.state.is_none() {
                record.state = record
                    .egrid_id
                    .and_then(|id| self.facility_states.get(&id))
                    .cloned();
            }
        }

        if drop_incomplete {
            let len_before = table.len();
            table.retain(|record| record.is_complete(&confirmed));
            let dropped = len_before - table.len();
            if dropped > 0 {
                warn!("Dropped {dropped} of {len_before} records left incomplete after filling");
            }
        }

        Ok(())
    }
}

/// Fill one column from the first value seen for each key
fn fill_column(table: &mut InventoryTable, key_column: Column, column: Column) {
    let mut lookup: HashMap<Value, Value> = HashMap::new();
    for record in table.iter() {
        if let (Some(key), Some(value)) = (record.get(key_column), record.get(column)) {
            lookup.entry(key).or_insert(value);
        }
    }

    for record in table.records_mut() {
        if record.get(column).is_some() {
            continue;
        }
        if let Some(value) = record.get(key_column).and_then(|key| lookup.get(&key)) {
            record.set(column, Some(value.clone()));
        }
    }
}
