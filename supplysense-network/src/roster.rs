use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::NetworkError;

/// One participant of the simulated network.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub role: String,
    pub capabilities: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub policies: Value,
}

impl AgentProfile {
    fn new(
        id: &str,
        name: &str,
        role: &str,
        capabilities: &[&str],
        location: &str,
        policies: Value,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            location: location.to_string(),
            policies,
        }
    }

    /// `- Name (Role): capabilities=a, b, location=X, policies={...}`
    pub fn prompt_line(&self) -> String {
        format!(
            "- {} ({}): capabilities={}, location={}, policies={}",
            self.name,
            self.role,
            self.capabilities.join(", "),
            self.location,
            self.policies
        )
    }
}

/// The agents described to the model, in prompt order.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(transparent)]
pub struct AgentRoster {
    agents: Vec<AgentProfile>,
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self {
            agents: vec![
                AgentProfile::new(
                    "retailer",
                    "RetailBot",
                    "Retailer",
                    &["demand_forecasting", "order_placement", "inventory_tracking"],
                    "New York, US",
                    json!({"min_stock_days": 7, "max_order_value": 50000}),
                ),
                AgentProfile::new(
                    "manufacturer",
                    "MfgCore",
                    "Manufacturer",
                    &["production_planning", "capacity_management", "quality_control"],
                    "Detroit, US",
                    json!({"lead_time_days": 5, "max_capacity_units": 10000}),
                ),
                AgentProfile::new(
                    "supplier",
                    "SupplyLink",
                    "Supplier",
                    &["raw_materials", "component_supply", "bulk_pricing"],
                    "Shenzhen, CN",
                    json!({"min_order_qty": 100, "shipping_days": 3}),
                ),
                AgentProfile::new(
                    "logistics",
                    "LogiFlow",
                    "Logistics",
                    &["routing", "warehousing", "last_mile_delivery", "cold_chain"],
                    "Memphis, US",
                    json!({"max_weight_kg": 5000, "delivery_guarantee_days": 2}),
                ),
                AgentProfile::new(
                    "analytics",
                    "InsightAI",
                    "Analytics",
                    &["risk_assessment", "demand_prediction", "cost_optimization"],
                    "Cloud",
                    json!({"confidence_threshold": 0.85}),
                ),
            ],
        }
    }
}

impl AgentRoster {
    pub fn new(agents: Vec<AgentProfile>) -> Result<Self, NetworkError> {
        if agents.is_empty() {
            return Err(NetworkError::InvalidRoster(
                "roster must contain at least one agent".to_string(),
            ));
        }
        for (index, agent) in agents.iter().enumerate() {
            if agents[..index].iter().any(|other| other.id == agent.id) {
                return Err(NetworkError::InvalidRoster(format!(
                    "duplicate agent id '{}'",
                    agent.id
                )));
            }
        }
        Ok(Self { agents })
    }

    /// Reads a JSON array of agent profiles.
    pub fn from_json(raw: &str) -> Result<Self, NetworkError> {
        let agents: Vec<AgentProfile> = serde_json::from_str(raw)
            .map_err(|err| NetworkError::InvalidRoster(err.to_string()))?;
        Self::new(agents)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| NetworkError::RosterRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn agents(&self) -> &[AgentProfile] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Display name for an agent id; unknown ids are shown as-is.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|agent| agent.name.as_str()).unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_has_five_agents_in_prompt_order() {
        let roster = AgentRoster::default();
        let ids: Vec<&str> = roster.agents().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["retailer", "manufacturer", "supplier", "logistics", "analytics"]
        );
    }

    #[test]
    fn prompt_line_keeps_policy_key_order() {
        let roster = AgentRoster::default();
        assert_eq!(
            roster.agents()[0].prompt_line(),
            "- RetailBot (Retailer): capabilities=demand_forecasting, order_placement, \
             inventory_tracking, location=New York, US, \
             policies={\"min_stock_days\":7,\"max_order_value\":50000}"
        );
    }

    #[test]
    fn unknown_ids_display_verbatim() {
        let roster = AgentRoster::default();
        assert_eq!(roster.display_name("logistics"), "LogiFlow");
        assert_eq!(roster.display_name("warehouse-9"), "warehouse-9");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"[
            {"id": "a", "name": "A", "role": "R", "capabilities": [], "location": "X"},
            {"id": "a", "name": "B", "role": "R", "capabilities": [], "location": "Y"}
        ]"#;
        assert!(matches!(
            AgentRoster::from_json(raw),
            Err(NetworkError::InvalidRoster(_))
        ));
    }
}
