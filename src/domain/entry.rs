use serde::{Deserialize, Serialize};

/// Numeric id of a customer, unique within one owner's ledger.
pub type CustomerId = i64;

/// One row of the ledger.
///
/// A row with no date is a placeholder: it only records that a customer
/// exists, with its id and contact, and never contributes to totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    /// Row id, assigned by the store on first write.
    pub id: Option<i64>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub contact: String,
    pub date: Option<String>,
    pub hours: Option<f64>,
    pub rate: Option<f64>,
    pub total_cost: Option<f64>,
}

impl WorkEntry {
    /// A placeholder row announcing a new customer.
    pub fn placeholder(
        customer_id: CustomerId,
        customer_name: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            customer_name: customer_name.into(),
            contact: contact.into(),
            date: None,
            hours: None,
            rate: None,
            total_cost: None,
        }
    }

    /// A dated work row. The total is fixed here and never recomputed.
    pub fn work(customer: &Customer, date: impl Into<String>, hours: f64, rate: f64) -> Self {
        Self {
            id: None,
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            contact: customer.contact.clone(),
            date: Some(date.into()),
            hours: Some(hours),
            rate: Some(rate),
            total_cost: Some(hours * rate),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.date.is_none()
    }
}

/// A customer as projected from the ledger rows that carry its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub contact: String,
}

/// An entry together with its index in the snapshot it was read from.
/// The position is only meaningful until the next write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedEntry {
    pub position: usize,
    pub entry: WorkEntry,
}

/// Next id to hand out: one past the largest id in use, or 1 for an empty ledger.
pub fn next_customer_id(entries: &[WorkEntry]) -> CustomerId {
    entries
        .iter()
        .map(|e| e.customer_id)
        .max()
        .map_or(1, |max| max + 1)
}

/// Distinct customers in order of first appearance.
/// Name and contact come from the first row carrying each id.
pub fn project_customers(entries: &[WorkEntry]) -> Vec<Customer> {
    let mut customers: Vec<Customer> = Vec::new();
    for entry in entries {
        if customers.iter().any(|c| c.id == entry.customer_id) {
            continue;
        }
        customers.push(Customer {
            id: entry.customer_id,
            name: entry.customer_name.clone(),
            contact: entry.contact.clone(),
        });
    }
    customers
}

pub fn find_customer(entries: &[WorkEntry], customer_id: CustomerId) -> Option<Customer> {
    entries
        .iter()
        .find(|e| e.customer_id == customer_id)
        .map(|e| Customer {
            id: e.customer_id,
            name: e.customer_name.clone(),
            contact: e.contact.clone(),
        })
}

/// Dated entries for a customer, keeping their snapshot positions.
pub fn customer_history(entries: &[WorkEntry], customer_id: CustomerId) -> Vec<PositionedEntry> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.customer_id == customer_id && !e.is_placeholder())
        .map(|(position, e)| PositionedEntry {
            position,
            entry: e.clone(),
        })
        .collect()
}

/// Sum of stored totals over a customer's work entries.
pub fn bill_total(entries: &[WorkEntry], customer_id: CustomerId) -> f64 {
    entries
        .iter()
        .filter(|e| e.customer_id == customer_id && !e.is_placeholder())
        .filter_map(|e| e.total_cost)
        .sum()
}
