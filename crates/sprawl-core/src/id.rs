use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a template in the catalog. Dense index, cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

/// Identifies a placed building. Assigned sequentially at placement and never
/// reused, so `BuildingId(n)` always lives in building slot `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

impl BuildingId {
    /// Id of the building stored at `slot` in the building list.
    pub fn from_slot(slot: usize) -> Self {
        Self(slot as u32 + 1)
    }

    /// Slot of this building in the building list. `None` for `BuildingId(0)`,
    /// which is never assigned.
    pub fn slot(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b-{}", self.0)
    }
}

/// Identifies a cluster. Only meaningful within one connectivity rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c-{}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_id_slot_round_trip() {
        for slot in 0..10 {
            assert_eq!(BuildingId::from_slot(slot).slot(), Some(slot));
        }
        assert_eq!(BuildingId::from_slot(0), BuildingId(1));
        assert_eq!(BuildingId(0).slot(), None);
    }

    #[test]
    fn display_matches_host_labels() {
        assert_eq!(BuildingId(3).to_string(), "b-3");
        assert_eq!(ClusterId(0).to_string(), "c-1");
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(TemplateId(0), "hub-cross");
        map.insert(TemplateId(1), "power-core");
        assert_eq!(map[&TemplateId(0)], "hub-cross");
    }
}
