use supplysense_core::{Insight, InsightStatus};

/// Spoken summary of the current insights; empty when there are none.
pub fn briefing_text(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return String::new();
    }

    let critical = names_with_status(insights, InsightStatus::Critical);
    let at_risk = names_with_status(insights, InsightStatus::AtRisk);

    let mut text = format!(
        "Executive briefing. {} products analyzed. ",
        insights.len()
    );
    if !critical.is_empty() {
        text.push_str(&status_sentence(&critical, "critical"));
    }
    if !at_risk.is_empty() {
        text.push_str(&status_sentence(&at_risk, "at risk"));
    }

    let reorders: Vec<&Insight> = insights
        .iter()
        .filter(|insight| insight.recommended_order_qty > 0.0)
        .collect();
    if !reorders.is_empty() {
        text.push_str("Recommended actions: ");
        for insight in reorders {
            text.push_str(&format!(
                "Reorder {} units of {}. ",
                insight.recommended_order_qty, insight.product_name
            ));
        }
    }

    if critical.is_empty() && at_risk.is_empty() {
        text.push_str("All products are healthy. No immediate action required.");
    }
    text
}

fn names_with_status(insights: &[Insight], status: InsightStatus) -> Vec<&str> {
    insights
        .iter()
        .filter(|insight| insight.status == status)
        .map(|insight| insight.product_name.as_str())
        .collect()
}

fn status_sentence(names: &[&str], label: &str) -> String {
    let verb = if names.len() > 1 { "s are" } else { " is" };
    format!(
        "{} product{verb} {label}: {}. ",
        names.len(),
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use supplysense_core::RiskLevel;

    use super::*;

    fn insight(name: &str, status: InsightStatus, qty: f64) -> Insight {
        Insight {
            id: format!("id-{name}"),
            user_id: "user-1".to_string(),
            upload_id: None,
            product_name: name.to_string(),
            status,
            risk_level: RiskLevel::Low,
            recommendation: String::new(),
            explanation: String::new(),
            recommended_order_qty: qty,
            forecast_next_30: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn no_insights_means_no_briefing() {
        assert_eq!(briefing_text(&[]), "");
    }

    #[test]
    fn critical_and_at_risk_products_are_named() {
        let text = briefing_text(&[
            insight("Webcam HD", InsightStatus::Critical, 120.0),
            insight("USB-C Hub", InsightStatus::Critical, 0.0),
            insight("Mouse", InsightStatus::AtRisk, 40.0),
            insight("Sleeve", InsightStatus::Healthy, 0.0),
        ]);
        assert_eq!(
            text,
            "Executive briefing. 4 products analyzed. \
             2 products are critical: Webcam HD, USB-C Hub. \
             1 product is at risk: Mouse. \
             Recommended actions: Reorder 120 units of Webcam HD. Reorder 40 units of Mouse. "
        );
    }

    #[test]
    fn all_healthy_products_get_the_all_clear() {
        let text = briefing_text(&[insight("Sleeve", InsightStatus::Healthy, 0.0)]);
        assert_eq!(
            text,
            "Executive briefing. 1 products analyzed. \
             All products are healthy. No immediate action required."
        );
    }
}
