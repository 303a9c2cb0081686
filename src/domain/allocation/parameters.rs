//! Tunable parameters of the allocation methods.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Parameters of the constrained equal-shares loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstrainedMesParameters {
    /// Gain of the proportional correction.
    pub step: f64,

    /// Constant drift toward cheaper prices, scaled by `step`.
    pub discount_per_iteration: f64,

    /// Initial price inflation applied to every group.
    pub initial_price_increase: f64,

    /// Fraction of the total budget under which a cost change counts as converged.
    pub difference_threshold: f64,

    /// Safety cap on loop iterations.
    pub max_iterations: usize,
}

impl Default for ConstrainedMesParameters {
    fn default() -> Self {
        Self {
            step: 0.5,
            discount_per_iteration: 0.01,
            initial_price_increase: 0.75,
            difference_threshold: 0.0001,
            max_iterations: 1000,
        }
    }
}

impl ConstrainedMesParameters {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("constrained_mes.step", self.step)?;
        non_negative(
            "constrained_mes.discount_per_iteration",
            self.discount_per_iteration,
        )?;
        non_negative(
            "constrained_mes.initial_price_increase",
            self.initial_price_increase,
        )?;
        non_negative(
            "constrained_mes.difference_threshold",
            self.difference_threshold,
        )?;
        at_least_one("constrained_mes.max_iterations", self.max_iterations)
    }
}

/// Parameters of the fixed-schedule discounting method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModifiedMesParameters {
    /// Discount added per iteration, relative to a group's budget share.
    pub step: f64,

    /// Share of the total budget the method may spend.
    pub part_of_initial_budget: f64,

    /// Safety cap on loop iterations.
    pub max_iterations: usize,
}

impl Default for ModifiedMesParameters {
    fn default() -> Self {
        Self {
            step: 0.1,
            part_of_initial_budget: 0.8,
            max_iterations: 1000,
        }
    }
}

impl ModifiedMesParameters {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("modified_mes.step", self.step)?;
        if !(self.part_of_initial_budget > 0.0 && self.part_of_initial_budget <= 1.0) {
            return Err(ValidationError::out_of_range(
                "modified_mes.part_of_initial_budget",
                0.0,
                1.0,
                self.part_of_initial_budget,
            ));
        }
        at_least_one("modified_mes.max_iterations", self.max_iterations)
    }
}

/// Parameters of equal shares with add-one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MesAddOneParameters {
    /// Money added to every voter's share per completion round.
    pub step: u64,
}

impl Default for MesAddOneParameters {
    fn default() -> Self {
        Self { step: 20 }
    }
}

impl MesAddOneParameters {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.step == 0 {
            return Err(ValidationError::out_of_range(
                "mes_add_one.step",
                1.0,
                u64::MAX as f64,
                0.0,
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, 0.0, f64::MAX, value))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, 0.0, f64::MAX, value))
    }
}

fn at_least_one(field: &str, value: usize) -> Result<(), ValidationError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, 1.0, usize::MAX as f64, 0.0))
    }
}
