#![deny(warnings)]

//! Persistence layer: the JSON-backed upgrade store.
//!
//! The store owns the ordered upgrade list. It is read whole from a flat
//! JSON array and rewritten whole on every save; nothing is appended and no
//! backup is kept.

use planner_core::{validate_upgrade, Category, CategoryFilter, Upgrade, ValidationError};
use planner_econ::{EconError, Ranked};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by the upgrade store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Backing file is not a JSON array of well-formed upgrade records.
    #[error("malformed upgrade data in {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A record parsed but breaks a numeric or naming invariant.
    #[error("invalid upgrade #{index} ({name}): {source}")]
    Invalid {
        index: usize,
        name: String,
        #[source]
        source: ValidationError,
    },
    /// Index does not address a record.
    #[error("index {index} out of range for {len} upgrades")]
    IndexOutOfRange { index: usize, len: usize },
    /// Ratio requested for a record whose cost is zero.
    #[error("cannot rank upgrade #{index} ({name}): cost is zero")]
    DivideByZero { index: usize, name: String },
    /// Ratio overflowed the decimal range.
    #[error("profitability computation failed: {0}")]
    Econ(EconError),
}

/// Read and validate every upgrade in `path`, in file order.
pub fn read_upgrades(path: &Path) -> Result<Vec<Upgrade>, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let upgrades: Vec<Upgrade> =
        serde_json::from_str(&text).map_err(|source| StoreError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    for (index, u) in upgrades.iter().enumerate() {
        validate_upgrade(u).map_err(|source| StoreError::Invalid {
            index,
            name: u.name.clone(),
            source,
        })?;
    }
    debug!(path = %path.display(), count = upgrades.len(), "loaded upgrades");
    Ok(upgrades)
}

/// Overwrite `path` with `upgrades` as a pretty JSON array (4-space indent).
pub fn write_upgrades(path: &Path, upgrades: &[Upgrade]) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    upgrades
        .serialize(&mut ser)
        .map_err(|source| StoreError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, &buf).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), count = upgrades.len(), bytes = buf.len(), "wrote upgrades");
    Ok(())
}

/// In-memory upgrade list bound to its backing JSON file.
#[derive(Clone, Debug)]
pub struct UpgradeStore {
    path: PathBuf,
    upgrades: Vec<Upgrade>,
}

impl UpgradeStore {
    /// Construct a store by loading `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let upgrades = read_upgrades(&path)?;
        Ok(Self { path, upgrades })
    }

    /// Construct a store from records already in memory, without validation.
    ///
    /// Nothing touches `path` until [`UpgradeStore::save`].
    pub fn from_upgrades<P: AsRef<Path>>(path: P, upgrades: Vec<Upgrade>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            upgrades,
        }
    }

    /// Re-read the backing file, replacing the in-memory records.
    ///
    /// On error the current records are kept.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.upgrades = read_upgrades(&self.path)?;
        Ok(())
    }

    /// Rewrite the backing file with the current records.
    pub fn save(&self) -> Result<(), StoreError> {
        write_upgrades(&self.path, &self.upgrades)?;
        info!(path = %self.path.display(), count = self.upgrades.len(), "saved upgrades");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    pub fn get(&self, index: usize) -> Option<&Upgrade> {
        self.upgrades.get(index)
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Records matching `filter`, paired with their store index.
    pub fn filter<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = (usize, &'a Upgrade)> + 'a {
        self.upgrades
            .iter()
            .enumerate()
            .filter(move |(_, u)| filter.matches(&u.category))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen: Vec<&Category> = Vec::new();
        for u in &self.upgrades {
            if !seen.contains(&&u.category) {
                seen.push(&u.category);
            }
        }
        seen
    }

    /// Top `top_n` unlocked upgrades by descending `income_increase / cost`.
    pub fn rank_by_profitability(&self, top_n: usize) -> Result<Vec<Ranked>, StoreError> {
        planner_econ::rank(&self.upgrades, top_n).map_err(|e| self.econ_error(e))
    }

    /// The single most profitable unlocked upgrade.
    pub fn most_profitable(&self) -> Result<Option<Ranked>, StoreError> {
        planner_econ::best(&self.upgrades).map_err(|e| self.econ_error(e))
    }

    /// Replace cost, income increase and category of the record at `index`.
    ///
    /// Name and unlock state are untouched. The store is left unmodified on
    /// error, and nothing is written until [`UpgradeStore::save`].
    pub fn update_record(
        &mut self,
        index: usize,
        cost: Decimal,
        income_increase: Decimal,
        category: Category,
    ) -> Result<(), StoreError> {
        let len = self.upgrades.len();
        let current = self
            .upgrades
            .get(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let updated = Upgrade {
            cost,
            income_increase,
            category,
            ..current.clone()
        };
        validate_upgrade(&updated).map_err(|source| StoreError::Invalid {
            index,
            name: updated.name.clone(),
            source,
        })?;
        info!(
            index,
            name = %updated.name,
            cost = %updated.cost,
            income_increase = %updated.income_increase,
            category = %updated.category,
            "updated upgrade"
        );
        self.upgrades[index] = updated;
        Ok(())
    }

    fn econ_error(&self, e: EconError) -> StoreError {
        match e {
            EconError::ZeroCost { index } => StoreError::DivideByZero {
                index,
                name: self
                    .upgrades
                    .get(index)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
            },
            other => StoreError::Econ(other),
        }
    }
}
