//! Geographic partitioning identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which columns identify a geography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// City and state together ("Richmond, VA" and "Richmond, CA" differ)
    #[default]
    CityState,

    /// City name only
    City,
}

impl GroupBy {
    /// Columns the grouping needs in the raw dataset.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::CityState => &["city", "state"],
            Self::City => &["city"],
        }
    }
}

/// A city, optionally qualified by its state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeographyKey {
    pub city: String,
    pub state: Option<String>,
}

impl GeographyKey {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: Some(state.into()),
        }
    }

    pub fn city_only(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: None,
        }
    }

    /// Build the key for a record under the given grouping.
    ///
    /// Returns `None` when a grouping column is missing.
    pub fn for_record(group_by: GroupBy, city: Option<&str>, state: Option<&str>) -> Option<Self> {
        let city = city?;
        match group_by {
            GroupBy::CityState => Some(Self::new(city, state?)),
            GroupBy::City => Some(Self::city_only(city)),
        }
    }

    /// Whether a record's city/state belongs to this geography.
    pub fn matches(&self, city: &str, state: Option<&str>) -> bool {
        if self.city != city {
            return false;
        }
        match &self.state {
            Some(expected) => state == Some(expected.as_str()),
            None => true,
        }
    }
}

impl fmt::Display for GeographyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}, {}", self.city, state),
            None => write!(f, "{}", self.city),
        }
    }
}
