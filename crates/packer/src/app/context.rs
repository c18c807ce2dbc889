//! Binding of one selection strategy for callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::engine::{DynamicProgramming, Greedy, PackStrategy};
use crate::domain::errors::PackageError;
use crate::domain::model::{Package, Selection};

/// Built-in strategies selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Exact dynamic programming.
    #[default]
    Dynamic,
    /// Value-density heuristic.
    Greedy,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Dynamic => "dynamic",
            StrategyKind::Greedy => "greedy",
        }
    }

    pub fn all() -> &'static [StrategyKind] {
        &[StrategyKind::Dynamic, StrategyKind::Greedy]
    }

    /// Instantiate the strategy.
    pub fn build(self) -> Box<dyn PackStrategy> {
        match self {
            StrategyKind::Dynamic => Box::new(DynamicProgramming),
            StrategyKind::Greedy => Box::new(Greedy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`StrategyKind`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StrategyParseError {
    #[error("unknown strategy '{0}' (expected dynamic or greedy)")]
    UnknownStrategy(String),
}

impl FromStr for StrategyKind {
    type Err = StrategyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dynamic" | "dp" | "exact" => Ok(StrategyKind::Dynamic),
            "greedy" | "heuristic" => Ok(StrategyKind::Greedy),
            other => Err(StrategyParseError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Holds exactly one strategy, fixed at construction, and delegates to it.
pub struct PackContext {
    strategy: Box<dyn PackStrategy>,
}

impl PackContext {
    pub fn new(strategy: impl PackStrategy + 'static) -> Self {
        Self::from_boxed(Box::new(strategy))
    }

    pub fn from_boxed(strategy: Box<dyn PackStrategy>) -> Self {
        Self { strategy }
    }

    pub fn with_kind(kind: StrategyKind) -> Self {
        Self::from_boxed(kind.build())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run the bound strategy on an already validated package.
    pub fn pack(&self, package: &Package) -> Selection {
        let selection = self.strategy.select(package);
        debug!(
            strategy = self.strategy.name(),
            capacity = %package.capacity(),
            items = package.len(),
            chosen = %selection,
            value = %selection.total_value(),
            weight = %selection.total_weight(),
            "packed package"
        );
        selection
    }

    /// Parse one input line and pack it.
    pub fn pack_line(&self, line: &str) -> Result<Selection, PackageError> {
        let package = Package::parse(line)?;
        Ok(self.pack(&package))
    }
}

impl Default for PackContext {
    fn default() -> Self {
        Self::new(DynamicProgramming)
    }
}

impl fmt::Debug for PackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackContext")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
