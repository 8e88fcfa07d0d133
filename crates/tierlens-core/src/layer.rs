use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Refinement stage of a warehouse table, ordered bronze < silver < gold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Bronze,
    Silver,
    Gold,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Bronze, Layer::Silver, Layer::Gold];

    /// Rank used for ordering and styling.
    pub fn rank(self) -> i32 {
        match self {
            Layer::Bronze => 1,
            Layer::Silver => 2,
            Layer::Gold => 3,
        }
    }

    /// Lowercase name as stored in the `layers` table.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Layer::Bronze => "Bronze",
            Layer::Silver => "Silver",
            Layer::Gold => "Gold",
        }
    }

    /// Fixed qualifier shown next to the layer title in diagrams.
    pub fn subtitle(self) -> &'static str {
        match self {
            Layer::Bronze => "Raw Data",
            Layer::Silver => "Cleansed Data",
            Layer::Gold => "Business Ready",
        }
    }

    /// Resolve a stored layer name, ignoring case. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl FromStr for Layer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::from_name(s).ok_or_else(|| ValidationError::UnknownLayer(s.to_string()))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
