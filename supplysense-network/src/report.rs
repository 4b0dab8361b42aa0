use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use supplysense_core::NewAgentMessage;

/// A message exchanged between two simulated agents, as the model returns it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CoordinationMessage {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_offset_ms: Option<f64>,
}

impl CoordinationMessage {
    pub fn to_new_agent_message(&self) -> NewAgentMessage {
        NewAgentMessage {
            from_agent: self.from.clone(),
            to_agent: self.to.clone(),
            message_type: self.kind.clone(),
            content: self.content.clone(),
            timestamp_offset_ms: self.timestamp_offset_ms,
        }
    }
}

/// Arguments of the `coordination_result` tool call.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CoordinationResult {
    #[serde(default)]
    pub messages: Vec<CoordinationMessage>,
    #[serde(default = "empty_object")]
    pub report: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Typed reading of a stored report. Every field is optional and unknown
/// fields are kept, since the model's output is not validated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CoordinationReport {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_agents: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_messages: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub coordination_time_ms: Option<f64>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default)]
    pub bottlenecks: Vec<Bottleneck>,
    #[serde(default)]
    pub graph: Option<ReportGraph>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cost_estimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub timeline_days: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Bottleneck {
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub severity: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: f64,
}

impl CoordinationReport {
    /// Reads a stored report one field at a time. A field of the wrong type
    /// is dropped, and so is a malformed list entry; the rest is kept.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            tracing::warn!("coordination report is not an object");
            return Self::default();
        };
        let mut extra = fields.clone();

        let mut report = Self {
            title: take_field(&mut extra, "title"),
            summary: take_field(&mut extra, "summary"),
            total_agents: take_number(&mut extra, "total_agents"),
            total_messages: take_number(&mut extra, "total_messages"),
            coordination_time_ms: take_number(&mut extra, "coordination_time_ms"),
            decisions: take_list(&mut extra, "decisions"),
            risk_assessment: take_field(&mut extra, "risk_assessment"),
            bottlenecks: take_list(&mut extra, "bottlenecks"),
            graph: extra.remove("graph").as_ref().and_then(ReportGraph::from_value),
            extra: Map::new(),
        };
        report.extra = extra;
        report
    }
}

impl ReportGraph {
    fn from_value(value: &Value) -> Option<Self> {
        let mut fields = value.as_object()?.clone();
        Some(Self {
            nodes: take_list(&mut fields, "nodes"),
            edges: take_list(&mut fields, "edges"),
        })
    }
}

fn take_field<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.remove(key).filter(|value| !value.is_null())?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = key, error = %err, "ignoring malformed report field");
            None
        }
    }
}

fn take_number(fields: &mut Map<String, Value>, key: &str) -> Option<f64> {
    fields.remove(key).as_ref().and_then(number_from)
}

fn take_list<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Vec<T> {
    match fields.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    tracing::warn!(field = key, error = %err, "skipping malformed report entry");
                    None
                }
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            tracing::warn!(field = key, "report field is not a list");
            Vec::new()
        }
    }
}

/// A number, or a string holding one; anything else reads as absent.
fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from(&Value::deserialize(deserializer)?))
}

fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::render::report_view;
    use crate::roster::AgentRoster;

    #[test]
    fn unknown_report_fields_are_kept() {
        let report = CoordinationReport::from_value(&json!({
            "title": "Restock plan",
            "summary": "Agents agreed.",
            "confidence": 0.9,
            "decisions": [{"agent": "supplier", "action": "Ship", "details": "2 pallets"}]
        }));
        assert_eq!(report.title.as_deref(), Some("Restock plan"));
        assert_eq!(report.decisions[0].cost_estimate, None);
        assert_eq!(report.extra.get("confidence"), Some(&json!(0.9)));
    }

    #[test]
    fn mistyped_fields_do_not_discard_the_report() {
        let report = CoordinationReport::from_value(&json!({
            "title": "Restock plan",
            "summary": "Agents agreed on an expedited order.",
            "total_agents": "5",
            "coordination_time_ms": "soon",
            "decisions": [
                {"agent": "supplier", "action": "Expedite", "details": "500 units",
                 "cost_estimate": "12500 USD", "timeline_days": 3},
                "not a decision"
            ],
            "risk_assessment": "medium",
            "bottlenecks": "none",
            "graph": {
                "nodes": [{"id": "supplier"}, {"role": "no id"}],
                "edges": [{"from": "supplier", "to": "retailer", "weight": "4"}]
            }
        }));

        assert_eq!(report.title.as_deref(), Some("Restock plan"));
        assert_eq!(report.summary.as_deref(), Some("Agents agreed on an expedited order."));
        assert_eq!(report.total_agents, Some(5.0));
        assert_eq!(report.coordination_time_ms, None);
        assert_eq!(report.decisions.len(), 1);
        assert_eq!(report.decisions[0].action, "Expedite");
        assert_eq!(report.decisions[0].cost_estimate, None);
        assert_eq!(report.decisions[0].timeline_days, Some(3.0));
        assert_eq!(report.risk_assessment, None);
        assert!(report.bottlenecks.is_empty());

        let view = report_view(&report, 2, &AgentRoster::default());
        assert!(view.is_displayable());
        assert_eq!(view.title, "Restock plan");

        let graph = report.graph.unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges[0].weight, 4.0);
    }

    #[test]
    fn non_object_report_is_empty() {
        assert_eq!(
            CoordinationReport::from_value(&json!("done")),
            CoordinationReport::default()
        );
    }

    #[test]
    fn missing_messages_and_report_default() {
        let result: CoordinationResult = serde_json::from_value(json!({})).unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(result.report, json!({}));
    }
}
