//! Tier partitioning
//!
//! Validations sharing an `order` form a tier. Tiers run strictly in
//! ascending order; within a tier, registration order is preserved.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::models::GroupFailures;
use crate::core::ports::Validation;

/// Validations sharing one order value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// The shared order
    pub order: i64,
    /// Indices into the validation list, in registration order
    pub indices: Vec<usize>,
}

/// Partition validations into tiers by ascending order
#[must_use]
pub fn partition_tiers(validations: &[Arc<dyn Validation>]) -> Vec<Tier> {
    let mut by_order: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, validation) in validations.iter().enumerate() {
        by_order.entry(validation.order()).or_default().push(index);
    }
    by_order
        .into_iter()
        .map(|(order, indices)| Tier { order, indices })
        .collect()
}

/// An empty ledger entry for every group any validation belongs to
#[must_use]
pub fn initial_ledger(validations: &[Arc<dyn Validation>]) -> GroupFailures {
    GroupFailures::with_groups(validations.iter().filter_map(|v| v.group()))
}
