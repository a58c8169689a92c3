//! Canonical flow mapping: translates source flow names and compartments onto the federal
//! elementary flow list.
use std::collections::HashMap;

/// The canonical flow a source flow maps onto
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMappingEntry {
    /// Canonical flow name
    pub target_name: String,
    /// Canonical flow identifier
    pub target_uuid: String,
    /// Canonical compartment (e.g. "emission/air")
    pub target_context: String,
    /// Unit of the canonical flow
    pub target_unit: String,
    /// Multiplier converting source amounts into the target unit
    pub conversion_factor: f64,
}

/// Lookup from (source flow name, source compartment path) onto canonical flows.
///
/// Keys are compared after [`normalise_flow_key`]. Each source pair maps to at most one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowMapping {
    entries: HashMap<(String, String), FlowMappingEntry>,
}

/// Normalise a flow name or compartment for matching: lower-cased, trailing whitespace removed.
///
/// Leading whitespace is significant.
pub fn normalise_flow_key(s: &str) -> String {
    s.to_lowercase().trim_end().to_string()
}

impl FlowMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping for a source pair.
    ///
    /// Returns false, leaving the existing entry in place, if the pair is already mapped.
    pub fn insert(&mut self, source_name: &str, source_context: &str, entry: FlowMappingEntry) -> bool {
        let key = (normalise_flow_key(source_name), normalise_flow_key(source_context));
        if self.entries.contains_key(&key) {
            return false;
        }

        self.entries.insert(key, entry);
        true
    }

    /// Look up the canonical flow for a source flow name and compartment path
    pub fn get(&self, source_name: &str, source_context: &str) -> Option<&FlowMappingEntry> {
        self.entries
            .get(&(normalise_flow_key(source_name), normalise_flow_key(source_context)))
    }

    /// The number of mapped source pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
