use serde::{Deserialize, Serialize};
use supplysense_core::InventorySnapshot;

pub const DEMAND_SIGNAL_TRIGGER: &str = "demand_signal";
pub const DISRUPTION_TRIGGER: &str = "disruption";

/// A disruption injected into a coordination run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Disruption {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub products: Vec<String>,
}

/// A named, ready-made disruption.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Scenario {
    pub key: &'static str,
    pub label: &'static str,
    pub disruption: Disruption,
}

pub fn scenario_catalogue() -> Vec<Scenario> {
    vec![
        scenario(
            "stockout",
            "Supplier Stockout",
            "inventory_shortage",
            "Primary supplier reports critical component shortage, affecting 60% of production capacity",
            &["Webcam HD", "USB-C Hub"],
        ),
        scenario(
            "logistics_delay",
            "Logistics Delay",
            "logistics_disruption",
            "Major shipping route blocked, expected 7-day delay on all inbound shipments",
            &["Monitor Stand", "Mechanical Keyboard"],
        ),
        scenario(
            "demand_spike",
            "Demand Spike",
            "demand_surge",
            "Unexpected 300% increase in demand detected from retail channels",
            &["Wireless Mouse", "Laptop Sleeve"],
        ),
    ]
}

pub fn find_scenario(key: &str) -> Option<Scenario> {
    scenario_catalogue()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn scenario(
    key: &'static str,
    label: &'static str,
    kind: &str,
    description: &str,
    products: &[&str],
) -> Scenario {
    Scenario {
        key,
        label,
        disruption: Disruption {
            kind: kind.to_string(),
            description: description.to_string(),
            products: products.iter().map(|p| p.to_string()).collect(),
        },
    }
}

/// The user turn of a coordination request.
pub fn scenario_text(
    disruption: Option<&Disruption>,
    inventory: &[InventorySnapshot],
) -> Result<String, serde_json::Error> {
    let inventory = serde_json::to_string(inventory)?;
    Ok(match disruption {
        Some(disruption) => {
            let products = if disruption.products.is_empty() {
                "all".to_string()
            } else {
                disruption.products.join(", ")
            };
            format!(
                "DISRUPTION SCENARIO: {} - {}. Products affected: {}. Current inventory: {}",
                disruption.kind, disruption.description, products, inventory
            )
        }
        None => format!(
            "DEMAND SIGNAL: Retailer detected increased demand. Current inventory: {inventory}"
        ),
    })
}
