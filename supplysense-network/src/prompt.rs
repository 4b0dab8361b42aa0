use serde_json::json;
use supplysense_core::ToolSpec;

use crate::roster::AgentRoster;

pub const TOOL_NAME: &str = "coordination_result";

const INSTRUCTIONS: &str = r#"Simulate a realistic coordination cascade where agents discover each other, share data, negotiate, and reach agreements. Generate the full message exchange and final coordination report.

Return a JSON object with this exact structure:
{
  "messages": [
    {
      "from": "agent_id",
      "to": "agent_id",
      "type": "discovery|query|response|negotiate|confirm|alert",
      "content": { "summary": "short description", "details": { ... relevant data } },
      "timestamp_offset_ms": number (0 to 30000, simulating time progression)
    }
  ],
  "report": {
    "title": "string",
    "summary": "2-3 sentence executive summary",
    "total_agents": number,
    "total_messages": number,
    "coordination_time_ms": number,
    "decisions": [
      { "agent": "agent_id", "action": "string", "details": "string", "cost_estimate": number, "timeline_days": number }
    ],
    "risk_assessment": { "level": "low|medium|high|critical", "factors": ["string"] },
    "bottlenecks": [{ "node": "agent_id", "issue": "string", "severity": "low|medium|high" }],
    "graph": {
      "nodes": [{ "id": "agent_id", "role": "string", "status": "active|stressed|critical" }],
      "edges": [{ "from": "agent_id", "to": "agent_id", "type": "material|information|financial", "label": "string", "weight": number }]
    }
  }
}

Generate 8-15 realistic messages showing the full coordination cascade. Make it feel like real agents communicating."#;

pub fn system_prompt(roster: &AgentRoster) -> String {
    let agents: Vec<String> = roster
        .agents()
        .iter()
        .map(|agent| agent.prompt_line())
        .collect();
    format!(
        "You are simulating a multi-agent supply chain coordination network. There are {} agents:\n{}\n\n{}",
        roster.len(),
        agents.join("\n"),
        INSTRUCTIONS
    )
}

pub fn tool_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_NAME.to_string(),
        description: "Return the full multi-agent coordination result".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "messages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "from": { "type": "string" },
                            "to": { "type": "string" },
                            "type": { "type": "string" },
                            "content": { "type": "object" },
                            "timestamp_offset_ms": { "type": "number" }
                        },
                        "required": ["from", "to", "type", "content", "timestamp_offset_ms"]
                    }
                },
                "report": { "type": "object" }
            },
            "required": ["messages", "report"]
        }),
    }
}
