// Data-driven engine configuration.
//
// All tunable routing behaviour lives in `MapConfig`, loaded from JSON by the
// process that owns the engine. Category labels and search policy are never
// hard-coded elsewhere.
//
// Two settings select between the intended and the legacy routing policy:
// - `outdoor_filter`: which neighbours the outdoor search may enter. The
//   old filter read "not Street or not Door", which admits everything;
//   `StreetOrDoor` is the intended reading and the default.
// - `exit_pair_selection`: how the best exit pair is chosen when start and
//   target sit in different buildings. The old code only compared the last
//   target exit per start exit; `FullMinimum` searches every pair.
//
// See also: `planner.rs` which consumes both policies, `registry.rs` which
// maps type names to `NodeCategory` through `CategoryNames`.

use serde::{Deserialize, Serialize};

use crate::types::NodeCategory;

/// Type names that carry routing meaning. Matching is exact and
/// case-sensitive, like the persistence layer's category names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryNames {
    pub building: String,
    pub street: String,
    pub door: String,
    pub elevator: String,
}

impl CategoryNames {
    /// Category for a type name; anything unrecognised is `Other`.
    pub fn classify(&self, name: &str) -> NodeCategory {
        if name == self.building {
            NodeCategory::Building
        } else if name == self.street {
            NodeCategory::Street
        } else if name == self.door {
            NodeCategory::Door
        } else if name == self.elevator {
            NodeCategory::Elevator
        } else {
            NodeCategory::Other
        }
    }
}

impl Default for CategoryNames {
    fn default() -> Self {
        Self {
            building: "Building".into(),
            street: "Street".into(),
            door: "Door".into(),
            elevator: "Elevator".into(),
        }
    }
}

/// Neighbour filter for the outdoor search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutdoorFilter {
    /// Expand only into Street and Door nodes (plus the search target).
    #[default]
    StreetOrDoor,
    /// Expand into any neighbour. Reproduces the legacy filter, which was a
    /// tautology and excluded nothing.
    Unrestricted,
}

/// How the outdoor leg between two buildings picks its exit pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExitPairSelection {
    /// Minimum outdoor length over the full start-exit × target-exit product.
    #[default]
    FullMinimum,
    /// Legacy parity: for each start exit only the pair with the last target
    /// exit (in id order) is compared against the running best.
    LastPairPerStartExit,
}

/// Top-level engine configuration. Loaded once, never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Type names for the categories the router treats specially.
    pub categories: CategoryNames,

    /// Neighbour filter applied by the outdoor (street) search.
    pub outdoor_filter: OutdoorFilter,

    /// Exit-pair policy for routes between two different buildings.
    pub exit_pair_selection: ExitPairSelection,

    /// Deadline for one `navigate` call, checked at every open-set pop.
    /// `None` lets searches run to completion.
    pub search_timeout_ms: Option<u64>,

    /// Run the per-exit outdoor searches on the rayon pool. Results are
    /// reduced in candidate order, so the answer is the same either way.
    pub parallel_exit_search: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            categories: CategoryNames::default(),
            outdoor_filter: OutdoorFilter::StreetOrDoor,
            exit_pair_selection: ExitPairSelection::FullMinimum,
            search_timeout_ms: Some(2_000),
            parallel_exit_search: true,
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
