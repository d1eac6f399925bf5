use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Customer, WorkEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkAnalysis {
    pub customer: Customer,
    pub points: Vec<HoursPoint>,
    pub total_hours: f64,
    pub total_billing: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursPoint {
    pub date: NaiveDate,
    pub hours: f64,
    pub total_cost: f64,
}

/// Hours-over-time series for one customer's entries.
///
/// Entries whose date does not parse as `YYYY-MM-DD` are dropped, and so do
/// not count towards the totals either.
pub fn build_work_analysis(customer: Customer, entries: &[WorkEntry]) -> WorkAnalysis {
    let mut points: Vec<HoursPoint> = entries
        .iter()
        .filter(|e| e.customer_id == customer.id)
        .filter_map(|e| {
            let date = NaiveDate::parse_from_str(e.date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
            Some(HoursPoint {
                date,
                hours: e.hours?,
                total_cost: e.total_cost.unwrap_or(0.0),
            })
        })
        .collect();

    // stable, so same-day entries keep ledger order
    points.sort_by_key(|p| p.date);

    let total_hours = points.iter().map(|p| p.hours).sum();
    let total_billing = points.iter().map(|p| p.total_cost).sum();

    WorkAnalysis {
        customer,
        points,
        total_hours,
        total_billing,
    }
}
