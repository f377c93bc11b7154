//! Customer-level business-intelligence aggregates.
//!
//! Pure aggregation over raw transactions; independent of the forecasting
//! chain. Transactions without a customer id count toward global totals but
//! are excluded from per-customer views.

use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::core::Transaction;

/// Global KPI roll-up over all transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub transaction_count: usize,
    pub distinct_customers: usize,
    /// Average transaction value; defined as 0.0 when there are no
    /// transactions.
    pub average_ticket: f64,
}

/// Per-customer totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub customer_id: String,
    pub customer_name: String,
    pub total_sales: f64,
    pub transaction_count: usize,
}

/// Compute the global KPI summary.
pub fn summarize(transactions: &[Transaction]) -> SalesSummary {
    let total_sales: f64 = transactions.iter().map(|t| t.amount).sum();
    let transaction_count = transactions.len();
    let distinct_customers = {
        let mut ids: Vec<&str> = transactions
            .iter()
            .filter_map(|t| t.customer_id.as_deref())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    };
    let average_ticket = if transaction_count == 0 {
        0.0
    } else {
        total_sales / transaction_count as f64
    };

    SalesSummary {
        total_sales,
        transaction_count,
        distinct_customers,
        average_ticket,
    }
}

/// Top `n` customers by total sales, descending; ties break by customer id
/// ascending so the ranking is deterministic.
pub fn top_customers(transactions: &[Transaction], n: usize) -> Vec<CustomerAggregate> {
    let mut by_customer: HashMap<&str, CustomerAggregate> = HashMap::new();
    for tx in transactions {
        let Some(id) = tx.customer_id.as_deref() else {
            continue;
        };
        let entry = by_customer
            .entry(id)
            .or_insert_with(|| CustomerAggregate {
                customer_id: id.to_string(),
                customer_name: tx.customer_name.clone().unwrap_or_default(),
                total_sales: 0.0,
                transaction_count: 0,
            });
        entry.total_sales += tx.amount;
        entry.transaction_count += 1;
    }

    let mut ranking: Vec<CustomerAggregate> = by_customer.into_values().collect();
    ranking.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    ranking.truncate(n);
    ranking
}

/// Full transaction history for one customer, in chronological order.
///
/// Sorting is stable, so same-day transactions keep their input order.
pub fn customer_history<'a>(
    transactions: &'a [Transaction],
    customer_id: &str,
) -> Vec<&'a Transaction> {
    let mut history: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.customer_id.as_deref() == Some(customer_id))
        .collect();
    history.sort_by_key(|t| t.issue_date);
    history
}

/// Monthly sales totals for one customer, indexed by calendar month 1-12.
///
/// Month is deliberately not year-scoped: multi-year data folds into one
/// twelve-bucket seasonal profile.
pub fn monthly_totals(transactions: &[Transaction], customer_id: &str) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for tx in transactions {
        if tx.customer_id.as_deref() == Some(customer_id) {
            totals[tx.issue_date.month0() as usize] += tx.amount;
        }
    }
    totals
}
