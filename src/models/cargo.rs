use serde::Deserialize;

/// One line of the carrier's cargo inventory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CargoItem {
    pub name: String,
    pub quantity: i64,
}

impl CargoItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self { name: name.into(), quantity }
    }
}

// Profile response: only the path down to the carrier inventory is modelled
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub fleet_carrier: Option<FleetCarrier>,
}

#[derive(Debug, Deserialize)]
pub struct FleetCarrier {
    #[serde(default)]
    pub cargo: CarrierCargo,
}

#[derive(Debug, Default, Deserialize)]
pub struct CarrierCargo {
    #[serde(default)]
    pub inventory: Vec<CargoItem>,
}
