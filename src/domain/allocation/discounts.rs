//! Price-discount controller - a saturating per-group control signal.
//!
//! Each group carries a raw discount that is squashed through `tanh` before
//! use, so the effective discount always lies strictly inside `(-1, 1)` and
//! discounted prices can never reach zero or blow up.

use serde::Serialize;
use std::collections::BTreeMap;

use super::ConstrainedMesParameters;
use crate::domain::election::{Election, Project, SpendingBounds};
use crate::domain::foundation::GroupKey;

/// Smallest factor a nominal cost is multiplied by.
pub const MIN_PRICE_FACTOR: f64 = 1e-6;

/// `tanh` rounds to exactly 1.0 in f64 somewhere past 19; clamping the raw
/// signal here keeps the effective discount strictly inside `(-1, 1)`.
const RAW_DISCOUNT_LIMIT: f64 = 18.0;

/// Applies an effective discount to a nominal cost.
///
/// `floor(cost * max(MIN_PRICE_FACTOR, 1 - discount))`
pub fn discounted_cost(cost: u64, effective_discount: f64) -> u64 {
    let factor = (1.0 - effective_discount).max(MIN_PRICE_FACTOR);
    (cost as f64 * factor).floor() as u64
}

/// Per-group proportional controller steering group spend toward its bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountController {
    raw: BTreeMap<GroupKey, f64>,
    decay: f64,
    step: f64,
}

impl DiscountController {
    /// Creates a controller with every group's prices inflated by
    /// `initial_price_increase`.
    pub fn new<'a>(
        groups: impl IntoIterator<Item = &'a GroupKey>,
        initial_price_increase: f64,
        discount_per_iteration: f64,
        step: f64,
    ) -> Self {
        let start = (-initial_price_increase).clamp(-RAW_DISCOUNT_LIMIT, RAW_DISCOUNT_LIMIT);
        Self {
            raw: groups.into_iter().map(|key| (key.clone(), start)).collect(),
            decay: discount_per_iteration * step,
            step,
        }
    }

    /// Creates a controller for every group of the election.
    pub fn from_parameters(election: &Election, params: &ConstrainedMesParameters) -> Self {
        Self::new(
            election.group_keys(),
            params.initial_price_increase,
            params.discount_per_iteration,
            params.step,
        )
    }

    /// Unsquashed control signal of a group. Unknown groups read as 0.
    pub fn raw_discount(&self, group: &str) -> f64 {
        self.raw.get(group).copied().unwrap_or(0.0)
    }

    /// Discount actually applied to a group's prices, strictly within `(-1, 1)`.
    pub fn effective_discount(&self, group: &str) -> f64 {
        self.raw_discount(group).tanh()
    }

    /// Effective discount of every group.
    pub fn effective_discounts(&self) -> BTreeMap<GroupKey, f64> {
        self.raw
            .iter()
            .map(|(key, raw)| (key.clone(), raw.tanh()))
            .collect()
    }

    /// Discounted copies of every project in the election. Originals are untouched.
    pub fn reprice(&self, election: &Election) -> Vec<Project> {
        election
            .groups()
            .flat_map(|group| {
                let discount = self.effective_discount(group.key.as_str());
                group
                    .projects
                    .iter()
                    .map(move |p| p.repriced(discounted_cost(p.cost, discount)))
            })
            .collect()
    }

    /// Updates every group's signal from the spend observed in the last iteration.
    ///
    /// Groups missing from `observed` count as having spent nothing.
    pub fn advance(
        &mut self,
        observed: &BTreeMap<GroupKey, u64>,
        bounds: &BTreeMap<GroupKey, SpendingBounds>,
    ) {
        for (key, raw) in self.raw.iter_mut() {
            let spent = observed.get(key).copied().unwrap_or(0);
            let bound = bounds.get(key).copied().unwrap_or_default();
            let correction = correction(self.step, spent, bound);
            *raw = (*raw + self.decay + correction).clamp(-RAW_DISCOUNT_LIMIT, RAW_DISCOUNT_LIMIT);
        }
    }
}

fn correction(step: f64, spent: u64, bounds: SpendingBounds) -> f64 {
    match (bounds.lower_bound, bounds.upper_bound) {
        (Some(lower), _) if spent < lower => step * (1.0 - spent as f64 / lower as f64),
        (_, Some(upper)) if spent > upper => step * (1.0 - spent as f64 / upper.max(1) as f64),
        _ => 0.0,
    }
}
