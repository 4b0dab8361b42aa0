//! Presentation of a finished coordination run: report summary, plain-text
//! rendering for the terminal and node positions for the network graph.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use serde::Serialize;

use crate::report::{CoordinationReport, ReportGraph};
use crate::roster::AgentRoster;

pub const DEFAULT_REPORT_TITLE: &str = "Coordination Complete";

const GRAPH_CENTER_X: f64 = 250.0;
const GRAPH_CENTER_Y: f64 = 180.0;
const GRAPH_RADIUS: f64 = 130.0;
const MIN_STROKE_WIDTH: f64 = 1.5;
const EDGE_LABEL_OFFSET: f64 = 10.0;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ReportView {
    pub title: String,
    pub summary: Option<String>,
    pub total_agents: Option<f64>,
    /// Number of messages actually returned, whatever the model claims.
    pub total_messages: usize,
    pub coordination_seconds: String,
    pub risk: Option<RiskView>,
    pub decisions: Vec<DecisionView>,
    pub bottlenecks: Vec<BottleneckView>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RiskView {
    pub level: String,
    pub factors: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DecisionView {
    pub agent_id: String,
    pub agent_name: String,
    pub action: String,
    pub details: String,
    pub cost: Option<String>,
    pub timeline_days: Option<f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BottleneckView {
    pub node: String,
    pub node_name: String,
    pub issue: String,
    pub severity: String,
}

impl ReportView {
    /// Reports without a summary are not shown.
    pub fn is_displayable(&self) -> bool {
        self.summary.as_deref().is_some_and(|summary| !summary.is_empty())
    }
}

pub fn report_view(
    report: &CoordinationReport,
    message_count: usize,
    roster: &AgentRoster,
) -> ReportView {
    let title = report
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_REPORT_TITLE)
        .to_string();
    let seconds = report.coordination_time_ms.unwrap_or(0.0) / 1000.0;

    ReportView {
        title,
        summary: report.summary.clone(),
        total_agents: report.total_agents,
        total_messages: message_count,
        coordination_seconds: format!("{seconds:.1}"),
        risk: report.risk_assessment.as_ref().map(|risk| RiskView {
            level: risk.level.clone(),
            factors: risk.factors.clone(),
        }),
        decisions: report
            .decisions
            .iter()
            .map(|decision| DecisionView {
                agent_id: decision.agent.clone(),
                agent_name: roster.display_name(&decision.agent).to_string(),
                action: decision.action.clone(),
                details: decision.details.clone(),
                cost: decision.cost_estimate.map(format_amount),
                timeline_days: decision.timeline_days,
            })
            .collect(),
        bottlenecks: report
            .bottlenecks
            .iter()
            .map(|bottleneck| BottleneckView {
                node: bottleneck.node.clone(),
                node_name: roster.display_name(&bottleneck.node).to_string(),
                issue: bottleneck.issue.clone(),
                severity: bottleneck.severity.clone(),
            })
            .collect(),
    }
}

pub fn render_text(view: &ReportView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    if let Some(summary) = &view.summary {
        let _ = writeln!(out, "{summary}");
    }
    let agents = view
        .total_agents
        .map(|count| count.to_string())
        .unwrap_or_else(|| "?".to_string());
    let _ = writeln!(
        out,
        "{agents} agents | {} messages | {}s coordination",
        view.total_messages, view.coordination_seconds
    );

    if let Some(risk) = &view.risk {
        let _ = writeln!(out, "\nRisk: {}", risk.level.to_uppercase());
        for factor in &risk.factors {
            let _ = writeln!(out, "  - {factor}");
        }
    }

    if !view.decisions.is_empty() {
        let _ = writeln!(out, "\nDecisions:");
        for decision in &view.decisions {
            let _ = write!(out, "  - {}: {}", decision.agent_name, decision.action);
            if !decision.details.is_empty() {
                let _ = write!(out, " ({})", decision.details);
            }
            if let Some(cost) = &decision.cost {
                let _ = write!(out, " ${cost}");
            }
            if let Some(days) = decision.timeline_days {
                let _ = write!(out, " {days} days");
            }
            out.push('\n');
        }
    }

    if !view.bottlenecks.is_empty() {
        let _ = writeln!(out, "\nBottlenecks:");
        for bottleneck in &view.bottlenecks {
            let _ = writeln!(
                out,
                "  - [{}] {}: {}",
                bottleneck.severity, bottleneck.node_name, bottleneck.issue
            );
        }
    }

    out
}

/// Thousands separators and at most three decimals.
fn format_amount(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let magnitude = rounded.abs();
    let whole = magnitude.trunc() as u64;
    let fraction = format!("{:.3}", magnitude.fract());
    let decimals = fraction
        .get(2..)
        .unwrap_or("")
        .trim_end_matches('0')
        .to_string();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if decimals.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{decimals}")
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GraphLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    pub status: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PositionedEdge {
    pub from: String,
    pub to: String,
    pub kind: String,
    pub label: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub stroke_width: f64,
}

/// Places nodes evenly on a circle starting at the top and draws every edge
/// whose endpoints are both placed.
pub fn graph_layout(graph: &ReportGraph) -> GraphLayout {
    let count = graph.nodes.len();
    let mut positions: HashMap<&str, (f64, f64)> = HashMap::with_capacity(count);
    let mut nodes = Vec::with_capacity(count);

    for (index, node) in graph.nodes.iter().enumerate() {
        let angle = (index as f64 * 2.0 * PI) / count as f64 - PI / 2.0;
        let x = GRAPH_CENTER_X + GRAPH_RADIUS * angle.cos();
        let y = GRAPH_CENTER_Y + GRAPH_RADIUS * angle.sin();
        positions.insert(node.id.as_str(), (x, y));
        nodes.push(PositionedNode {
            id: node.id.clone(),
            label: if node.role.is_empty() {
                node.id.clone()
            } else {
                node.role.clone()
            },
            status: if node.status.is_empty() {
                "active".to_string()
            } else {
                node.status.clone()
            },
            x,
            y,
        });
    }

    let edges = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let (x1, y1) = *positions.get(edge.from.as_str())?;
            let (x2, y2) = *positions.get(edge.to.as_str())?;
            Some(PositionedEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
                kind: edge.kind.clone(),
                label: edge.label.clone(),
                x1,
                y1,
                x2,
                y2,
                label_x: (x1 + x2) / 2.0,
                label_y: (y1 + y2) / 2.0 - EDGE_LABEL_OFFSET,
                stroke_width: (edge.weight / 2.0).max(MIN_STROKE_WIDTH),
            })
        })
        .collect();

    GraphLayout { nodes, edges }
}
