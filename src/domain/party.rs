//! Reference entities owned by other registries. The core only reads them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipper {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub id: String,
    pub name: String,
    pub mc_number: String,
    pub dot_number: String,
    #[serde(default)]
    pub equipment_types: Vec<String>,
}

impl Carrier {
    pub fn operates(&self, equipment_code: &str) -> bool {
        self.equipment_types
            .iter()
            .any(|code| code.eq_ignore_ascii_case(equipment_code))
    }
}

/// Trailer or vehicle type, e.g. `DRY_VAN`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub code: String,
    pub description: String,
}

impl EquipmentType {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }

    /// Equipment types the brokerage quotes out of the box
    pub fn standard_catalog() -> Vec<EquipmentType> {
        vec![
            EquipmentType::new("DRY_VAN", "53' dry van"),
            EquipmentType::new("REEFER", "53' refrigerated trailer"),
            EquipmentType::new("FLATBED", "48' flatbed"),
            EquipmentType::new("STEP_DECK", "Step deck trailer"),
            EquipmentType::new("POWER_ONLY", "Tractor only, shipper trailer"),
        ]
    }
}
