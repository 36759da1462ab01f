#![deny(warnings)]

//! Profitability helpers for the upgrade planner.
//!
//! This module provides exact (decimal) utilities for:
//! - Profitability ratio: income increase per unit of cost
//! - Payback time: cost per unit of income increase
//! - Ranking unlocked upgrades by profitability with stable tie-breaking

use planner_core::Upgrade;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::trace;

/// Errors produced by profitability helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Divisor was zero.
    #[error("division by zero")]
    DivideByZero,
    /// Quotient does not fit in a decimal.
    #[error("decimal overflow")]
    Overflow,
    /// A ranked candidate has zero cost, so its ratio is undefined.
    #[error("candidate #{index} has zero cost")]
    ZeroCost { index: usize },
}

fn checked_quotient(num: Decimal, den: Decimal) -> Result<Decimal, EconError> {
    if den.is_zero() {
        return Err(EconError::DivideByZero);
    }
    num.checked_div(den).ok_or(EconError::Overflow)
}

/// Profitability ratio `income / cost`.
///
/// Example:
/// let r = profitability_ratio(Decimal::new(10, 0), Decimal::new(50, 0)).unwrap();
/// assert_eq!(r, Decimal::new(2, 1)); // 0.2
pub fn profitability_ratio(income: Decimal, cost: Decimal) -> Result<Decimal, EconError> {
    checked_quotient(income, cost)
}

/// Payback time `cost / income`, in the game's income period (hours).
///
/// Presentational only; never persisted.
pub fn payback_hours(cost: Decimal, income: Decimal) -> Result<Decimal, EconError> {
    checked_quotient(cost, income)
}

/// Anything that can be ranked by profitability.
pub trait Candidate {
    fn unlocked(&self) -> bool;
    fn income(&self) -> Decimal;
    fn cost(&self) -> Decimal;
}

impl Candidate for Upgrade {
    fn unlocked(&self) -> bool {
        self.unlocked
    }
    fn income(&self) -> Decimal {
        self.income_increase
    }
    fn cost(&self) -> Decimal {
        self.cost
    }
}

/// One ranking result: position in the input slice and its exact ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ranked {
    pub index: usize,
    pub ratio: Decimal,
}

/// Rank unlocked candidates by descending profitability ratio.
///
/// Locked entries are skipped and never divided. Equal ratios keep their
/// input order. At most `top_n` entries are returned, fewer if fewer are
/// unlocked.
pub fn rank<C: Candidate>(items: &[C], top_n: usize) -> Result<Vec<Ranked>, EconError> {
    let mut ranked = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.unlocked() {
            continue;
        }
        let ratio = profitability_ratio(item.income(), item.cost()).map_err(|e| match e {
            EconError::DivideByZero => EconError::ZeroCost { index },
            other => other,
        })?;
        ranked.push(Ranked { index, ratio });
    }
    // sort_by is stable: ties stay in input order
    ranked.sort_by(|a, b| b.ratio.cmp(&a.ratio));
    ranked.truncate(top_n);
    trace!(candidates = items.len(), returned = ranked.len(), "ranked upgrades");
    Ok(ranked)
}

/// The single most profitable unlocked candidate, if any.
pub fn best<C: Candidate>(items: &[C]) -> Result<Option<Ranked>, EconError> {
    Ok(rank(items, 1)?.into_iter().next())
}
