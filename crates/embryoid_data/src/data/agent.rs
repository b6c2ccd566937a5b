use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of an agent, allocated by the simulation driver.
///
/// Identity alone defines equality and hashing of agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concrete kind of an agent, used for dispatch and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimType {
    DividingCell,
    StemCell,
}

impl SimType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SimType::DividingCell => "dividingcell",
            SimType::StemCell => "stemcell",
        }
    }
}

impl fmt::Display for SimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fate of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    #[serde(rename = "U")]
    Undifferentiated,
    #[serde(rename = "T")]
    Transitioning,
    #[serde(rename = "D")]
    Differentiated,
    /// Reserved. No rule currently moves a cell here.
    #[serde(rename = "A")]
    Apoptotic,
}

impl CellState {
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            CellState::Undifferentiated => 'U',
            CellState::Transitioning => 'T',
            CellState::Differentiated => 'D',
            CellState::Apoptotic => 'A',
        }
    }

    /// Counts towards the undifferentiated side of the neighbor tally.
    #[must_use]
    pub fn is_uncommitted(&self) -> bool {
        matches!(
            self,
            CellState::Undifferentiated | CellState::Transitioning
        )
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Per-agent production and consumption rates for one gradient.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceSink {
    pub source: f64,
    pub sink: f64,
}

impl SourceSink {
    #[must_use]
    pub const fn new(source: f64, sink: f64) -> Self {
        Self { source, sink }
    }
}

/// Cell index of an agent on a gradient grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl GridIndex {
    #[must_use]
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_serialize_as_letters() {
        let json = serde_json::to_string(&CellState::Differentiated).unwrap();
        assert_eq!(json, "\"D\"");
        let back: CellState = serde_json::from_str("\"T\"").unwrap();
        assert_eq!(back, CellState::Transitioning);
    }

    #[test]
    fn test_uncommitted_states() {
        assert!(CellState::Undifferentiated.is_uncommitted());
        assert!(CellState::Transitioning.is_uncommitted());
        assert!(!CellState::Differentiated.is_uncommitted());
        assert!(!CellState::Apoptotic.is_uncommitted());
    }

    #[test]
    fn test_sim_type_tags() {
        assert_eq!(SimType::StemCell.to_string(), "stemcell");
        assert_eq!(SimType::DividingCell.as_str(), "dividingcell");
    }
}
