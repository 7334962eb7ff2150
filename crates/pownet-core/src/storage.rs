//! Energy storage units (spec section 3).

use crate::units::Megawatts;

/// What a storage unit is wired to: a grid node, or another generator
/// (colocated storage, sharing the generator's curtailment balance;
/// spec section 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachTarget {
    Node(String),
    Generator(String),
}

/// An energy storage unit.
#[derive(Debug, Clone)]
pub struct StorageUnit {
    pub name: String,
    pub attach_target: AttachTarget,
    pub max_charge: Megawatts,
    pub max_discharge: Megawatts,
    pub min_capacity: Megawatts,
    pub max_capacity: Megawatts,
    /// η_c ∈ [0,1].
    pub charge_efficiency: f64,
    /// η_d ∈ [0,1].
    pub discharge_efficiency: f64,
    /// σ ∈ [0,1].
    pub self_discharge_rate: f64,
    /// Column into the storage derated-capacity table.
    pub derated_capacity_column: String,
    /// Discharge cost contract.
    pub cost_contract: String,
    /// State of charge a cold-started simulation begins with.
    pub initial_state_of_charge: Megawatts,
}

impl StorageUnit {
    pub fn attached_node<'a>(&'a self, generator_home_node: impl Fn(&str) -> Option<&'a str>) -> Option<&'a str> {
        match &self.attach_target {
            AttachTarget::Node(n) => Some(n.as_str()),
            AttachTarget::Generator(g) => generator_home_node(g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_attach_resolves_directly() {
        let unit = StorageUnit {
            name: "s1".into(),
            attach_target: AttachTarget::Node("n1".into()),
            max_charge: Megawatts::new(50.0),
            max_discharge: Megawatts::new(50.0),
            min_capacity: Megawatts::new(0.0),
            max_capacity: Megawatts::new(200.0),
            charge_efficiency: 0.9,
            discharge_efficiency: 0.9,
            self_discharge_rate: 0.0,
            derated_capacity_column: "s1".into(),
            cost_contract: "c1".into(),
            initial_state_of_charge: Megawatts::new(0.0),
        };
        assert_eq!(unit.attached_node(|_| None), Some("n1"));
    }

    #[test]
    fn generator_attach_resolves_via_lookup() {
        let unit = StorageUnit {
            name: "s1".into(),
            attach_target: AttachTarget::Generator("g1".into()),
            max_charge: Megawatts::new(50.0),
            max_discharge: Megawatts::new(50.0),
            min_capacity: Megawatts::new(0.0),
            max_capacity: Megawatts::new(200.0),
            charge_efficiency: 0.9,
            discharge_efficiency: 0.9,
            self_discharge_rate: 0.0,
            derated_capacity_column: "s1".into(),
            cost_contract: "c1".into(),
            initial_state_of_charge: Megawatts::new(0.0),
        };
        assert_eq!(unit.attached_node(|g| if g == "g1" { Some("n2") } else { None }), Some("n2"));
    }
}
