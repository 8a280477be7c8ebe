//! Configuration types for cleaning, partitioning, and training.

use serde::{Deserialize, Serialize};

use crate::types::geography::GroupBy;

/// Configuration for the data cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Columns that identify a geography.
    pub group_by: GroupBy,

    /// A geography is kept only when it has strictly more sold records than this.
    ///
    /// Guards downstream regressions against tiny samples. Default: 1000.
    pub min_support: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            group_by: GroupBy::CityState,
            min_support: 1000,
        }
    }
}

impl CleanerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group by city name alone with the larger support threshold.
    pub fn city_only() -> Self {
        Self {
            group_by: GroupBy::City,
            min_support: 5000,
        }
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_min_support(mut self, min_support: usize) -> Self {
        self.min_support = min_support;
        self
    }
}

/// Configuration for per-geography outlier removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Rows priced at or below this quantile are dropped. Default: 0.025.
    pub lower_quantile: f64,

    /// Rows priced at or above this quantile are dropped. Default: 0.975.
    pub upper_quantile: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            lower_quantile: 0.025,
            upper_quantile: 0.975,
        }
    }
}

impl PartitionConfig {
    pub fn with_quantiles(mut self, lower: f64, upper: f64) -> Self {
        self.lower_quantile = lower;
        self.upper_quantile = upper;
        self
    }
}

/// Configuration for per-request training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Share of rows held out for the MAPE estimate. Default: 0.2.
    pub test_fraction: f64,

    /// Seed for both the split and the ensemble. Default: 42.
    pub seed: u64,

    /// Trees in the ensemble. Default: 100.
    pub n_estimators: usize,

    /// Maximum tree depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,

    /// Minimum rows needed to split a node. Default: 2.
    pub min_samples_split: usize,

    /// Minimum rows in each leaf. Default: 1.
    pub min_samples_leaf: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
