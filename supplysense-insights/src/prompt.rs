use serde_json::json;
use supplysense_core::{AnalysisSummary, ToolSpec};

pub const TOOL_NAME: &str = "supply_chain_analysis";

pub const SYSTEM_PROMPT: &str = r#"You are a supply chain analyst AI. Analyze inventory data and return a JSON array of product insights. For each product, provide:
- status: "healthy", "at_risk", or "critical"
- risk_level: "low", "medium", "high", or "critical"
- recommendation: a short action (e.g. "Reorder now", "Reduce stock", "Monitor")
- explanation: 2-3 sentences explaining the reasoning
- recommended_order_qty: integer (0 if no order needed)
- forecast_next_30: array of 30 numbers representing predicted daily demand

Base your analysis on: current stock vs reorder point, average daily sales, days of stock remaining, and trends.
Return ONLY valid JSON array, no markdown or extra text."#;

pub fn user_message(products: &[AnalysisSummary]) -> Result<String, serde_json::Error> {
    Ok(format!(
        "Analyze these products:\n{}",
        serde_json::to_string_pretty(products)?
    ))
}

pub fn tool_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_NAME.to_string(),
        description: "Return supply chain analysis results for all products".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "insights": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "product_name": { "type": "string" },
                            "status": { "type": "string", "enum": ["healthy", "at_risk", "critical"] },
                            "risk_level": { "type": "string", "enum": ["low", "medium", "high", "critical"] },
                            "recommendation": { "type": "string" },
                            "explanation": { "type": "string" },
                            "recommended_order_qty": { "type": "number" },
                            "forecast_next_30": { "type": "array", "items": { "type": "number" } }
                        },
                        "required": [
                            "product_name",
                            "status",
                            "risk_level",
                            "recommendation",
                            "explanation",
                            "recommended_order_qty"
                        ],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["insights"],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_embeds_pretty_json() {
        let products = vec![AnalysisSummary {
            name: "Mouse".to_string(),
            avg_daily_sales: 2.5,
            total_sold: 10,
            current_stock: 5,
            reorder_point: 8,
            unit_price: 19.99,
            data_points: 4,
            days_of_stock: 2,
        }];
        let message = user_message(&products).unwrap();
        assert!(message.starts_with("Analyze these products:\n[\n  {"));
        assert!(message.contains("\"avgDailySales\": 2.5"));
    }

    #[test]
    fn forecast_is_the_only_optional_field() {
        let spec = tool_spec();
        let required = spec.parameters["properties"]["insights"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 6);
        assert!(!required.iter().any(|field| field == "forecast_next_30"));
    }
}
