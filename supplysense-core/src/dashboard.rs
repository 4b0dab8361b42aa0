//! Read-side aggregation for the dashboard page.
//!
//! Everything here is computed in memory from rows that were already
//! fetched for the user; nothing is persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Insight, InsightStatus, RiskLevel, SalesRecord};

const INVENTORY_HEALTH_PRODUCTS: usize = 10;
const TOP_ACTIONS: usize = 5;
const PRODUCT_LABEL_CHARS: usize = 15;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardKpis {
    pub total_products: usize,
    pub critical: usize,
    pub at_risk: usize,
    pub healthy: usize,
    pub inventory_value: f64,
    pub total_sold: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StockLevel {
    pub product: String,
    pub stock: i64,
    pub reorder_point: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardView {
    pub kpis: DashboardKpis,
    pub sales_trend: Vec<TrendPoint>,
    pub inventory_health: Vec<StockLevel>,
    pub top_actions: Vec<Insight>,
    pub is_empty: bool,
}

/// `sales` must be ordered by sale date and `insights` newest first, as the
/// store returns them.
pub fn build_dashboard(sales: &[SalesRecord], insights: &[Insight]) -> DashboardView {
    let mut products: Vec<&str> = Vec::new();
    for record in sales {
        if !products.contains(&record.product_name.as_str()) {
            products.push(&record.product_name);
        }
    }

    let count_status =
        |status: InsightStatus| insights.iter().filter(|i| i.status == status).count();

    let kpis = DashboardKpis {
        total_products: products.len(),
        critical: count_status(InsightStatus::Critical),
        at_risk: count_status(InsightStatus::AtRisk),
        healthy: count_status(InsightStatus::Healthy),
        inventory_value: sales
            .iter()
            .map(|r| r.current_stock as f64 * r.unit_price)
            .sum(),
        total_sold: sales.iter().map(|r| r.quantity_sold).sum(),
    };

    let mut by_date: BTreeMap<String, i64> = BTreeMap::new();
    for record in sales {
        *by_date.entry(record.sale_date.to_string()).or_default() += record.quantity_sold;
    }
    let sales_trend = by_date
        .into_iter()
        .map(|(date, quantity)| TrendPoint { date, quantity })
        .collect();

    let inventory_health = products
        .iter()
        .take(INVENTORY_HEALTH_PRODUCTS)
        .map(|product| {
            let latest = sales.iter().rev().find(|r| r.product_name == *product);
            StockLevel {
                product: truncate_label(product),
                stock: latest.map(|r| r.current_stock).unwrap_or(0),
                reorder_point: latest.map(|r| r.reorder_point).unwrap_or(0),
            }
        })
        .collect();

    let top_actions = insights
        .iter()
        .filter(|i| i.risk_level != RiskLevel::Low)
        .take(TOP_ACTIONS)
        .cloned()
        .collect();

    DashboardView {
        kpis,
        sales_trend,
        inventory_health,
        top_actions,
        is_empty: sales.is_empty(),
    }
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() > PRODUCT_LABEL_CHARS {
        let head: String = name.chars().take(PRODUCT_LABEL_CHARS).collect();
        format!("{head}…")
    } else {
        name.to_string()
    }
}
