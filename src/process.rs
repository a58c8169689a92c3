//! Unit processes are the records exported to LCA software. Each has a name, a category path and
//! an ordered list of exchanges (flows into or out of the process).
use indexmap::IndexMap;

pub mod generation;
pub use generation::build_generation_processes;
pub mod upstream;
pub use upstream::build_upstream_processes;

/// A map of [`Process`]es, keyed by process name
pub type ProcessMap = IndexMap<String, Process>;

/// A map of upstream reference products, keyed by stage code
pub type UpstreamReferenceMap = IndexMap<String, UpstreamReference>;

/// A unit process
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    /// Process name
    pub name: String,
    /// Category path, with levels separated by `/`
    pub category: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Exchanges in output order. `None` entries are not exported.
    pub exchanges: Vec<Option<Exchange>>,
}

impl Process {
    /// The product this process delivers, if it has a quantitative reference
    pub fn reference_descriptor(&self) -> Option<UpstreamReference> {
        self.exchanges
            .iter()
            .flatten()
            .filter(|exchange| exchange.quantitative_reference == Some(true))
            .find_map(|exchange| {
                let flow = exchange.flow.as_ref()?;
                Some(UpstreamReference {
                    name: flow.name.clone(),
                    flow_id: flow.id.clone(),
                    unit: exchange.unit.name().to_string(),
                })
            })
    }
}

/// The reference product of an upstream unit process
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReference {
    /// Name of the product flow
    pub name: String,
    /// Identifier of the product flow
    pub flow_id: String,
    /// Unit of the product flow
    pub unit: String,
}

/// One flow into or out of a [`Process`]
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// The flow exchanged
    pub flow: Option<FlowRef>,
    /// Unit of `amount`
    pub unit: Unit,
    /// Amount per unit of the reference product. Defaults to zero.
    pub amount: Option<f64>,
    /// Whether the flow is an input. Defaults to false.
    pub input: Option<bool>,
    /// Whether this is the process's reference product. Defaults to false.
    pub quantitative_reference: Option<bool>,
    /// Whether the flow is an avoided product. Defaults to false.
    pub avoided_product: Option<bool>,
}

/// Whether a flow is a product of the technosphere or an exchange with the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// An intermediate product (fuel, electricity)
    Product,
    /// An emission or resource
    Elementary,
}

/// A reference to a flow
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRef {
    pub id: String,
    pub name: String,
    pub flow_type: FlowType,
}

/// A reference to an entity in the LCA software's reference data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEntity {
    pub id: &'static str,
    pub name: &'static str,
}

const ENERGY: ReferenceEntity = ReferenceEntity {
    id: "f6811440-ee37-11de-8a39-0800200c9a66",
    name: "Energy",
};

const MASS: ReferenceEntity = ReferenceEntity {
    id: "93a60a56-a3c8-11da-a746-0800200b9a66",
    name: "Mass",
};

/// Unit of an exchange amount
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    MegawattHour,
    Megajoule,
    Kilogram,
    /// A unit with no known reference
    Unknown(String),
}

impl Unit {
    /// Look up a unit by name
    pub fn from_name(name: &str) -> Self {
        match name {
            "MWh" => Self::MegawattHour,
            "MJ" => Self::Megajoule,
            "kg" => Self::Kilogram,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The unit's name
    pub fn name(&self) -> &str {
        match self {
            Self::MegawattHour => "MWh",
            Self::Megajoule => "MJ",
            Self::Kilogram => "kg",
            Self::Unknown(name) => name,
        }
    }

    /// The reference unit, if known
    pub fn reference(&self) -> Option<ReferenceEntity> {
        let (id, name) = match self {
            Self::MegawattHour => ("92e3bd49-8ed5-4885-9db6-fc88c7afcfcb", "MWh"),
            Self::Megajoule => ("52765a6c-3896-43c2-b2f4-c679acf13efe", "MJ"),
            Self::Kilogram => ("20aadc24-a391-41cf-b340-3e4529f44bde", "kg"),
            Self::Unknown(_) => return None,
        };

        Some(ReferenceEntity { id, name })
    }

    /// The reference flow property measured in this unit, if known
    pub fn flow_property(&self) -> Option<ReferenceEntity> {
        match self {
            Self::MegawattHour | Self::Megajoule => Some(ENERGY),
            Self::Kilogram => Some(MASS),
            Self::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MWh", Unit::MegawattHour, Some("Energy"))]
    #[case("MJ", Unit::Megajoule, Some("Energy"))]
    #[case("kg", Unit::Kilogram, Some("Mass"))]
    #[case("short tons", Unit::Unknown("short tons".into()), None)]
    fn unit_from_name(
        #[case] name: &str,
        #[case] expected: Unit,
        #[case] property: Option<&str>,
    ) {
        let unit = Unit::from_name(name);
        assert_eq!(unit, expected);
        assert_eq!(unit.name(), name);
        assert_eq!(unit.flow_property().map(|p| p.name), property);
        assert_eq!(unit.reference().map(|r| r.name), property.map(|_| name));
    }

    #[test]
    fn reference_descriptor() {
        let process = Process {
            name: "Coal mining".into(),
            category: None,
            description: None,
            exchanges: vec![
                None,
                Some(Exchange {
                    flow: Some(FlowRef {
                        id: "abc".into(),
                        name: "Carbon dioxide".into(),
                        flow_type: FlowType::Elementary,
                    }),
                    unit: Unit::Kilogram,
                    amount: Some(0.1),
                    input: None,
                    quantitative_reference: None,
                    avoided_product: None,
                }),
                Some(Exchange {
                    flow: Some(FlowRef {
                        id: "def".into(),
                        name: "coal, processed, at mine".into(),
                        flow_type: FlowType::Product,
                    }),
                    unit: Unit::Kilogram,
                    amount: Some(1.0),
                    input: Some(false),
                    quantitative_reference: Some(true),
                    avoided_product: None,
                }),
            ],
        };

        assert_eq!(
            process.reference_descriptor(),
            Some(UpstreamReference {
                name: "coal, processed, at mine".into(),
                flow_id: "def".into(),
                unit: "kg".into(),
            })
        );
    }
}
