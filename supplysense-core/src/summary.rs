use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::SalesRecord;

/// Days of stock reported to the coordination model when a product never sells.
const NO_DEMAND_DAYS_OF_STOCK: i64 = 999;

/// Per-product aggregate over a user's sales rows.
///
/// Stock, reorder point and price come from the product's latest row in the
/// order the rows were supplied (callers pass rows sorted by sale date).
#[derive(Clone, Debug, PartialEq)]
pub struct ProductSummary {
    pub name: String,
    pub avg_daily_sales: f64,
    pub total_sold: i64,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub unit_price: f64,
    pub data_points: usize,
}

/// Shape sent to the insight model.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub name: String,
    #[serde(serialize_with = "whole_as_integer")]
    pub avg_daily_sales: f64,
    pub total_sold: i64,
    pub current_stock: i64,
    pub reorder_point: i64,
    #[serde(serialize_with = "whole_as_integer")]
    pub unit_price: f64,
    pub data_points: usize,
    pub days_of_stock: i64,
}

/// Shape embedded in the coordination scenario text.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub name: String,
    #[serde(serialize_with = "whole_as_integer")]
    pub avg_daily_sales: f64,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub days_of_stock: i64,
}

impl ProductSummary {
    pub fn analysis_view(&self) -> AnalysisSummary {
        let days_of_stock = if self.current_stock > 0 && self.avg_daily_sales > 0.0 {
            (self.current_stock as f64 / self.avg_daily_sales).round() as i64
        } else {
            0
        };
        AnalysisSummary {
            name: self.name.clone(),
            avg_daily_sales: round2(self.avg_daily_sales),
            total_sold: self.total_sold,
            current_stock: self.current_stock,
            reorder_point: self.reorder_point,
            unit_price: self.unit_price,
            data_points: self.data_points,
            days_of_stock,
        }
    }

    pub fn inventory_view(&self) -> InventorySnapshot {
        let days_of_stock = if self.avg_daily_sales > 0.0 {
            (self.current_stock as f64 / self.avg_daily_sales).round() as i64
        } else {
            NO_DEMAND_DAYS_OF_STOCK
        };
        InventorySnapshot {
            name: self.name.clone(),
            avg_daily_sales: round2(self.avg_daily_sales),
            current_stock: self.current_stock,
            reorder_point: self.reorder_point,
            days_of_stock,
        }
    }
}

/// Groups rows by product name, keeping products in order of first appearance.
pub fn summarize_products(records: &[SalesRecord]) -> Vec<ProductSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SalesRecord>> = HashMap::new();
    for record in records {
        let name = record.product_name.as_str();
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let rows = groups.get(name)?;
            let latest = rows.last()?;
            let total_sold: i64 = rows.iter().map(|r| r.quantity_sold).sum();
            Some(ProductSummary {
                name: name.to_string(),
                avg_daily_sales: total_sold as f64 / rows.len() as f64,
                total_sold,
                current_stock: latest.current_stock,
                reorder_point: latest.reorder_point,
                unit_price: latest.unit_price,
                data_points: rows.len(),
            })
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Writes `3.0` as `3`, the way the prompts show numbers.
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(name: &str, day: u32, sold: i64, stock: i64) -> SalesRecord {
        SalesRecord {
            id: format!("{name}-{day}"),
            upload_id: "u1".to_string(),
            user_id: "user".to_string(),
            product_name: name.to_string(),
            sale_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            quantity_sold: sold,
            unit_price: 9.5,
            current_stock: stock,
            reorder_point: 20,
        }
    }

    #[test]
    fn groups_in_first_appearance_order_and_uses_latest_row() {
        let rows = vec![
            row("Mouse", 1, 4, 100),
            row("Hub", 1, 1, 10),
            row("Mouse", 2, 6, 90),
        ];
        let summaries = summarize_products(&rows);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Mouse");
        assert_eq!(summaries[0].total_sold, 10);
        assert_eq!(summaries[0].current_stock, 90);
        assert_eq!(summaries[0].data_points, 2);
        assert_eq!(summaries[1].name, "Hub");
    }

    #[test]
    fn analysis_view_rounds_and_computes_days_of_stock() {
        let rows = vec![row("Mouse", 1, 1, 10), row("Mouse", 2, 2, 10), row("Mouse", 3, 0, 10)];
        let view = summarize_products(&rows)[0].analysis_view();
        assert_eq!(view.avg_daily_sales, 1.0);
        assert_eq!(view.days_of_stock, 10);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("avgDailySales").is_some());
        assert!(json.get("daysOfStock").is_some());
    }

    #[test]
    fn zero_demand_uses_distinct_defaults_per_view() {
        let rows = vec![row("Idle", 1, 0, 50)];
        let summaries = summarize_products(&rows);
        assert_eq!(summaries[0].analysis_view().days_of_stock, 0);
        assert_eq!(summaries[0].inventory_view().days_of_stock, 999);
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let rows = vec![row("Pen", 1, 1, 5), row("Pen", 2, 1, 5), row("Pen", 3, 2, 5)];
        let view = summarize_products(&rows)[0].inventory_view();
        assert_eq!(view.avg_daily_sales, 1.33);
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains(r#""avgDailySales":1.33"#));
    }

    #[test]
    fn whole_numbers_are_written_without_a_fraction() {
        let rows = vec![row("Idle", 1, 0, 50)];
        let summary = &summarize_products(&rows)[0];

        let inventory = serde_json::to_string(&summary.inventory_view()).unwrap();
        assert!(inventory.contains(r#""avgDailySales":0,"#));

        let analysis = serde_json::to_value(summary.analysis_view()).unwrap();
        assert_eq!(analysis["avgDailySales"].to_string(), "0");
        assert!(analysis["unitPrice"].is_number());
    }
}
