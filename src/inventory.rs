//! Inventory tables hold emission, resource and fuel-input records for generating facilities.
//!
//! Each [`InventoryRecord`] is one substance flow for one stage of one facility in one year. All
//! attributes are optional because different sources populate different subsets of them; an
//! [`InventoryTable`] additionally records which [`Column`]s its source actually provided, so that
//! operations can tell a missing value apart from a missing column.
use crate::input::deserialise_flag;
use indexmap::IndexSet;
use serde::Deserialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell value from an inventory table
#[derive(Debug, Clone)]
pub enum Value {
    /// An identifier or year
    Integer(u32),
    /// A quantity
    Number(f64),
    /// Free text
    Text(String),
    /// A yes/no flag
    Flag(bool),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Flag(a), Self::Flag(b)) => a == b,
            _ => false,
        }
    }
}

// Numbers compare bitwise, so equality is reflexive
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Integer(value) => value.hash(state),
            Self::Number(value) => value.to_bits().hash(state),
            Self::Text(value) => value.hash(state),
            Self::Flag(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Flag(value) => write!(f, "{value}"),
        }
    }
}

/// Conversion between typed record fields and [`Value`]s
pub trait CellType: Sized {
    /// Wrap this value
    fn into_value(self) -> Value;

    /// Unwrap a value, returning `None` if it holds a different type
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_cell_type {
    ($type:ty, $variant:ident) => {
        impl CellType for $type {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_cell_type!(u32, Integer);
impl_cell_type!(f64, Number);
impl_cell_type!(String, Text);
impl_cell_type!(bool, Flag);

/// Define the [`Column`] enum together with the matching fields of [`InventoryRecord`].
///
/// Each entry gives the column variant, the record field, its type and the header used in input
/// and output files.
macro_rules! define_inventory_columns {
    ($(
        $(#[$field_meta:meta])*
        $column:ident => $field:ident: $type:ty = $header:literal
    ),* $(,)?) => {
        /// A column of an inventory table
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Column {
            $(
                #[doc = concat!("The `", $header, "` column")]
                $column,
            )*
        }

        impl Column {
            /// The header for this column in input and output files
            pub fn header(self) -> &'static str {
                match self {
                    $(Column::$column => $header,)*
                }
            }

            /// Look up a column by its header
            pub fn from_header(header: &str) -> Option<Column> {
                match header {
                    $($header => Some(Column::$column),)*
                    _ => None,
                }
            }
        }

        /// One substance flow (emission, resource draw or fuel input) for one stage of one
        /// facility in one period
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(default)]
        pub struct InventoryRecord {
            $(
                $(#[$field_meta])*
                #[serde(rename = $header)]
                pub $field: Option<$type>,
            )*
        }

        impl InventoryRecord {
            /// Get the value in the given column, if any
            pub fn get(&self, column: Column) -> Option<Value> {
                match column {
                    $(Column::$column => self.$field.clone().map(CellType::into_value),)*
                }
            }

            /// Set the value in the given column.
            ///
            /// A value of the wrong type for the column clears it.
            pub fn set(&mut self, column: Column, value: Option<Value>) {
                match column {
                    $(Column::$column => self.$field = value.and_then(<$type>::from_value),)*
                }
            }
        }
    };
}

define_inventory_columns! {
    /// Facility identifier used as the key for reconciling attributes
    FacilityID => facility_id: u32 = "FacilityID",
    /// eGRID/EIA plant identifier
    EgridID => egrid_id: u32 = "eGRID_ID",
    /// Plant identifier as reported by upstream tables
    PlantID => plant_id: u32 = "plant_id",
    FuelCategory => fuel_category: String = "FuelCategory",
    PrimaryFuel => primary_fuel: String = "PrimaryFuel",
    /// Pipeline stage producing the record (e.g. "Power plant", "Extraction")
    StageCode => stage_code: String = "stage_code",
    FlowName => flow_name: String = "FlowName",
    Compartment => compartment: String = "Compartment",
    CompartmentPath => compartment_path: String = "Compartment_path",
    FlowUuid => flow_uuid: String = "FlowUUID",
    Unit => unit: String = "Unit",
    /// Either "emission", "resource" or "input"
    PrimeContext => prime_context: String = "ElementaryFlowPrimeContext",
    FlowAmount => flow_amount: f64 = "FlowAmount",
    /// Amount of fuel or product the upstream stage delivered to the plant
    Quantity => quantity: f64 = "quantity",
    /// Annual net generation (MWh)
    Electricity => electricity: f64 = "Electricity",
    #[serde(deserialize_with = "deserialise_flag")]
    Input => input: bool = "input",
    Source => source: String = "Source",
    Year => year: u32 = "Year",
    BalancingAuthorityCode => ba_code: String = "Balancing Authority Code",
    BalancingAuthorityName => ba_name: String = "Balancing Authority Name",
    Nerc => nerc: String = "NERC",
    Subregion => subregion: String = "Subregion",
    FercRegion => ferc_region: String = "FERC_Region",
    EiaRegion => eia_region: String = "EIA_Region",
    State => state: String = "State",
    /// Fraction of the plant's generation from its primary fuel category
    PercentGeneration => percent_generation: f64 = "PercentGenerationfromDesignatedFuelCategory",
    Age => age: f64 = "Age",
    TechnologicalCorrelation => technological_correlation: f64 = "TechnologicalCorrelation",
    TemporalCorrelation => temporal_correlation: f64 = "TemporalCorrelation",
    GeographicalCorrelation => geographical_correlation: f64 = "GeographicalCorrelation",
    ReliabilityScore => reliability_score: f64 = "ReliabilityScore",
    DataCollection => data_collection: f64 = "DataCollection",
}

impl InventoryRecord {
    /// Whether every one of `columns` has a value
    pub fn is_complete(&self, columns: &[Column]) -> bool {
        columns.iter().all(|column| self.get(*column).is_some())
    }
}

/// A table of [`InventoryRecord`]s along with the set of columns it provides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryTable {
    columns: IndexSet<Column>,
    records: Vec<InventoryRecord>,
}

impl InventoryTable {
    /// Create an empty table with the given columns
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        Self {
            columns: columns.into_iter().collect(),
            records: Vec::new(),
        }
    }

    /// Create a table from existing records
    pub fn from_records<I>(columns: I, records: Vec<InventoryRecord>) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        Self {
            columns: columns.into_iter().collect(),
            records,
        }
    }

    /// Concatenate tables, taking the union of their columns
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = InventoryTable>,
    {
        let mut out = Self::default();
        for table in tables {
            out.append(table);
        }

        out
    }

    /// The columns provided by this table
    pub fn columns(&self) -> &IndexSet<Column> {
        &self.columns
    }

    /// Whether the table provides the given column
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Mark a column as provided by this table
    pub fn add_column(&mut self, column: Column) {
        self.columns.insert(column);
    }

    /// Remove a column, clearing its values in every record
    pub fn drop_column(&mut self, column: Column) {
        if self.columns.shift_remove(&column) {
            for record in &mut self.records {
                record.set(column, None);
            }
        }
    }

    /// The table's records
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Mutable access to the table's records
    pub fn records_mut(&mut self) -> &mut [InventoryRecord] {
        &mut self.records
    }

    /// Iterate over the table's records
    pub fn iter(&self) -> std::slice::Iter<'_, InventoryRecord> {
        self.records.iter()
    }

    /// Add a record to the end of the table
    pub fn push(&mut self, record: InventoryRecord) {
        self.records.push(record);
    }

    /// Append another table's records, adding any columns it provides
    pub fn append(&mut self, other: InventoryTable) {
        self.columns.extend(other.columns);
        self.records.extend(other.records);
    }

    /// Keep only records for which `f` returns true
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&InventoryRecord) -> bool,
    {
        self.records.retain(f);
    }

    /// The number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a InventoryTable {
    type Item = &'a InventoryRecord;
    type IntoIter = std::slice::Iter<'a, InventoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
