#![deny(warnings)]

//! Core domain models and invariants for the upgrade planner.
//!
//! This crate defines the serializable upgrade record shared by the store,
//! the ranking helpers and the CLI, with validation helpers guarding the
//! numeric invariants the ranking relies on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Upgrade category, e.g. "Markets" or "PR&Team".
///
/// The set is open: files may carry categories beyond [`Category::KNOWN`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub const MARKETS: &'static str = "Markets";
    pub const PR_TEAM: &'static str = "PR&Team";
    pub const LEGAL: &'static str = "Legal";
    pub const SPECIAL: &'static str = "Special";

    /// Categories offered by default when editing or filtering.
    pub const KNOWN: [&'static str; 4] = [
        Self::MARKETS,
        Self::PR_TEAM,
        Self::LEGAL,
        Self::SPECIAL,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the [`Category::KNOWN`] values.
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Category selection for listing; `All` matches every record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Label used for the catch-all filter.
    pub const ALL_LABEL: &'static str = "All";

    pub fn matches(&self, category: &Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == Self::ALL_LABEL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(Category::new(s)))
        }
    }
}

/// A purchasable improvement with its cost, income benefit and unlock status.
///
/// Field order matches the persisted JSON object layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Display name; expected unique within a file but not enforced.
    pub name: String,
    /// Purchase cost (> 0).
    #[serde(with = "amount")]
    pub cost: Decimal,
    /// Income gained once purchased (>= 0).
    #[serde(with = "amount")]
    pub income_increase: Decimal,
    pub category: Category,
    /// Whether the upgrade can currently be bought.
    pub unlocked: bool,
}

/// Planner configuration parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Backing JSON file (default: `upgrades.json`).
    pub data_file: PathBuf,
    /// Number of upgrades highlighted by ranking (default: 3).
    pub top_n: usize,
}

impl PlannerConfig {
    pub const DEFAULT_DATA_FILE: &'static str = "upgrades.json";
    pub const DEFAULT_TOP_N: usize = 3;
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(Self::DEFAULT_DATA_FILE),
            top_n: Self::DEFAULT_TOP_N,
        }
    }
}

/// Validation errors for upgrade invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Name must not be blank.
    #[error("upgrade name must not be empty")]
    EmptyName,
    /// Cost must be strictly positive.
    #[error("cost must be > 0, got {0}")]
    NonPositiveCost(Decimal),
    /// Income increase must be non-negative.
    #[error("income increase must be >= 0, got {0}")]
    NegativeIncome(Decimal),
    /// Category must not be blank.
    #[error("category must not be empty")]
    EmptyCategory,
    /// Amount would change when written as a JSON number.
    #[error("amount {0} cannot be stored exactly")]
    InexactAmount(Decimal),
}

/// Validate a single upgrade record.
pub fn validate_upgrade(u: &Upgrade) -> Result<(), ValidationError> {
    if u.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if u.cost <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveCost(u.cost));
    }
    if u.income_increase < Decimal::ZERO {
        return Err(ValidationError::NegativeIncome(u.income_increase));
    }
    if u.category.0.trim().is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    for value in [u.cost, u.income_increase] {
        if !amount::is_exact(&value) {
            return Err(ValidationError::InexactAmount(value));
        }
    }
    Ok(())
}

/// Serde adapter keeping monetary amounts as plain JSON numbers.
///
/// Integral values are written as integers and fractional ones as floats;
/// any JSON number is accepted on read, anything else is a type error.
pub mod amount {
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{ser, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = value.normalize();
        if normalized.scale() == 0 {
            if let Some(i) = normalized.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        // Parse the decimal text so the float is the nearest one to the exact value.
        match normalized.to_string().parse::<f64>() {
            Ok(f) if f.is_finite() => serializer.serialize_f64(f),
            _ => Err(<S::Error as ser::Error>::custom(format!(
                "amount {value} cannot be written as a JSON number"
            ))),
        }
    }

    /// Whether `value` reads back unchanged after [`serialize`].
    ///
    /// Integers within `i64` always do; anything else must survive the
    /// trip through the nearest `f64`.
    pub fn is_exact(value: &Decimal) -> bool {
        let normalized = value.normalize();
        if normalized.scale() == 0 && normalized.to_i64().is_some() {
            return true;
        }
        match normalized.to_string().parse::<f64>() {
            Ok(f) if f.is_finite() => f
                .to_string()
                .parse::<Decimal>()
                .map_or(false, |back| back == normalized),
            _ => false,
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a numeric amount")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            if !v.is_finite() {
                return Err(E::custom(format!("amount {v} is not finite")));
            }
            // Shortest float text first, so 0.1 reads back as exactly 0.1.
            v.to_string()
                .parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_f64(v))
                .ok_or_else(|| E::custom(format!("amount {v} is out of range")))
        }
    }
}
