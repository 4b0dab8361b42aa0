use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{SupplySenseError, Value};

/// A validated CSV row, before it is assigned an id and owner.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NewSalesRecord {
    pub product_name: String,
    pub sale_date: NaiveDate,
    pub quantity_sold: i64,
    pub unit_price: f64,
    pub current_stock: i64,
    pub reorder_point: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SalesRecord {
    pub id: String,
    pub upload_id: String,
    pub user_id: String,
    pub product_name: String,
    pub sale_date: NaiveDate,
    pub quantity_sold: i64,
    pub unit_price: f64,
    pub current_stock: i64,
    pub reorder_point: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Upload {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub row_count: i64,
    pub created_at: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Healthy,
    AtRisk,
    Critical,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::AtRisk => "at_risk",
            Self::Critical => "critical",
        }
    }

    /// Human-readable form used in tables ("at risk").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::AtRisk => "at risk",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for InsightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightStatus {
    type Err = SupplySenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(Self::Healthy),
            "at_risk" => Ok(Self::AtRisk),
            "critical" => Ok(Self::Critical),
            other => Err(SupplySenseError::ParseFailed {
                output: other.to_string(),
                reason: "unknown insight status".to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = SupplySenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(SupplySenseError::ParseFailed {
                output: other.to_string(),
                reason: "unknown risk level".to_string(),
            }),
        }
    }
}

/// One product entry as returned by the analysis model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NewInsight {
    pub product_name: String,
    pub status: InsightStatus,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub explanation: String,
    pub recommended_order_qty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_next_30: Option<Vec<f64>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Insight {
    pub id: String,
    pub user_id: String,
    pub upload_id: Option<String>,
    pub product_name: String,
    pub status: InsightStatus,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub explanation: String,
    pub recommended_order_qty: f64,
    pub forecast_next_30: Option<Vec<f64>>,
    pub created_at: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = SupplySenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            other => Err(SupplySenseError::ParseFailed {
                output: other.to_string(),
                reason: "unknown session status".to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CoordinationSession {
    pub id: String,
    pub user_id: String,
    pub trigger_type: String,
    pub status: SessionStatus,
    pub report: Option<Value>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NewAgentMessage {
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: String,
    pub content: Value,
    pub timestamp_offset_ms: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AgentMessage {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: String,
    pub content: Value,
    pub timestamp_offset_ms: Option<f64>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&InsightStatus::AtRisk).unwrap();
        assert_eq!(json, "\"at_risk\"");
        assert_eq!("at_risk".parse::<InsightStatus>().unwrap(), InsightStatus::AtRisk);
        assert_eq!(InsightStatus::AtRisk.label(), "at risk");
    }

    #[test]
    fn unknown_risk_level_fails_to_parse() {
        assert!("severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn new_insight_forecast_is_optional() {
        let insight: NewInsight = serde_json::from_value(serde_json::json!({
            "product_name": "Webcam HD",
            "status": "critical",
            "risk_level": "high",
            "recommendation": "Reorder now",
            "explanation": "Stock below reorder point.",
            "recommended_order_qty": 120
        }))
        .unwrap();
        assert_eq!(insight.forecast_next_30, None);
        assert_eq!(insight.recommended_order_qty, 120.0);
    }
}
