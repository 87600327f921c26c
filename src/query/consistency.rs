use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far a query's index scan may lag behind prior mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanConsistency {
    /// Read whatever the index holds right now. Fast, possibly stale.
    #[default]
    NotBounded,
    /// Wait until the index has caught up with every mutation made before the query.
    RequestPlus,
}

impl ScanConsistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanConsistency::NotBounded => "not_bounded",
            ScanConsistency::RequestPlus => "request_plus",
        }
    }
}

impl fmt::Display for ScanConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_bounded" => Ok(ScanConsistency::NotBounded),
            "request_plus" => Ok(ScanConsistency::RequestPlus),
            other => Err(format!("Unknown scan consistency '{}'", other)),
        }
    }
}
