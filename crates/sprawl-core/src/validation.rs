//! Invariant checks and state comparison for tests and debugging.
//!
//! [`check_invariants`] walks a simulation and reports every structural rule
//! it breaks. [`diff_simulations`] compares two simulations building by
//! building, for pinning down where two runs diverged.

use crate::engine::Simulation;
use crate::geometry::Cell;
use crate::id::BuildingId;

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

/// One broken structural rule.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// A building covers a cell outside the grid.
    OutOfBounds { building: BuildingId, cell: Cell },
    /// The grid does not record `building` on one of its cells.
    GridMismatch {
        building: BuildingId,
        cell: Cell,
        found: Option<BuildingId>,
    },
    /// The grid marks more cells than the buildings cover.
    StrayCells { marked: usize, covered: usize },
    /// A building is in zero or several clusters, or its cluster id points
    /// at a cluster that does not list it.
    ClusterMembership { building: BuildingId, memberships: usize },
    LevelBelowOne { building: BuildingId },
    LevelAboveCap {
        building: BuildingId,
        level: u32,
        cap: u32,
    },
    NegativeSupply { building: BuildingId, stored: f64 },
}

/// Every invariant violation in `sim`. Empty means healthy.
pub fn check_invariants(sim: &Simulation) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let grid = sim.grid();
    let clusters = sim.clusters();
    let mut covered = 0;

    for (slot, b) in sim.buildings().iter().enumerate() {
        for cell in b.cells() {
            covered += 1;
            if !grid.in_bounds(cell) {
                out.push(InvariantViolation::OutOfBounds {
                    building: b.id,
                    cell,
                });
                continue;
            }
            let found = grid.building_at(cell);
            if found != Some(b.id) {
                out.push(InvariantViolation::GridMismatch {
                    building: b.id,
                    cell,
                    found,
                });
            }
        }

        let memberships = clusters.iter().filter(|c| c.contains(slot)).count();
        let listed = b
            .cluster
            .and_then(|id| clusters.get(id.index()))
            .is_some_and(|c| c.contains(slot));
        if memberships != 1 || !listed {
            out.push(InvariantViolation::ClusterMembership {
                building: b.id,
                memberships,
            });
        }

        if b.level < 1 {
            out.push(InvariantViolation::LevelBelowOne { building: b.id });
        }
        if let Some(template) = sim.catalog().get(b.template) {
            let size = b
                .cluster
                .and_then(|id| clusters.get(id.index()))
                .map_or(1, |c| c.size());
            let cap = template.growth_cap(size);
            if b.level > cap {
                out.push(InvariantViolation::LevelAboveCap {
                    building: b.id,
                    level: b.level,
                    cap,
                });
            }
        }

        if b.stored_supply < 0.0 {
            out.push(InvariantViolation::NegativeSupply {
                building: b.id,
                stored: b.stored_supply,
            });
        }
    }

    let marked = grid.occupied_count();
    if marked > covered {
        out.push(InvariantViolation::StrayCells { marked, covered });
    }

    out
}

// ---------------------------------------------------------------------------
// State diff
// ---------------------------------------------------------------------------

/// A building-level difference between two simulations.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingDiff {
    OnlyInA(BuildingId),
    OnlyInB(BuildingId),
    StateMismatch {
        building: BuildingId,
        description: String,
    },
}

/// Full comparison of two simulations.
#[derive(Debug, Clone, PartialEq)]
pub struct SimDiff {
    pub is_identical: bool,
    pub year_matches: bool,
    pub supply_matches: bool,
    pub cluster_count_matches: bool,
    pub building_diffs: Vec<BuildingDiff>,
}

/// Compare two simulations. Floating values are compared bit for bit.
pub fn diff_simulations(a: &Simulation, b: &Simulation) -> SimDiff {
    let year_matches = a.year() == b.year();
    let supply_matches = a.cumulative_supply().to_bits() == b.cumulative_supply().to_bits();
    let cluster_count_matches = a.cluster_count() == b.cluster_count();

    let mut building_diffs = Vec::new();
    let (ba, bb) = (a.buildings(), b.buildings());
    for (x, y) in ba.iter().zip(bb) {
        let mut mismatches = Vec::new();
        if x.template != y.template {
            mismatches.push(format!("template {} vs {}", x.template.0, y.template.0));
        }
        if x.origin != y.origin || x.rotation != y.rotation {
            mismatches.push(format!(
                "placed at {:?}/{:?} vs {:?}/{:?}",
                x.origin, x.rotation, y.origin, y.rotation
            ));
        }
        if x.level != y.level {
            mismatches.push(format!("level {} vs {}", x.level, y.level));
        }
        if x.stored_supply.to_bits() != y.stored_supply.to_bits() {
            mismatches.push(format!("stored {} vs {}", x.stored_supply, y.stored_supply));
        }
        if x.cluster != y.cluster {
            mismatches.push(format!("cluster {:?} vs {:?}", x.cluster, y.cluster));
        }
        if !mismatches.is_empty() {
            building_diffs.push(BuildingDiff::StateMismatch {
                building: x.id,
                description: mismatches.join(", "),
            });
        }
    }
    building_diffs.extend(ba.iter().skip(bb.len()).map(|x| BuildingDiff::OnlyInA(x.id)));
    building_diffs.extend(bb.iter().skip(ba.len()).map(|y| BuildingDiff::OnlyInB(y.id)));

    SimDiff {
        is_identical: year_matches
            && supply_matches
            && cluster_count_matches
            && building_diffs.is_empty(),
        year_matches,
        supply_matches,
        cluster_count_matches,
        building_diffs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use crate::test_utils::*;

    #[test]
    fn fresh_and_populated_boards_are_healthy() {
        assert!(check_invariants(&fixture_sim()).is_empty());

        let mut sim = hub_and_line();
        place(&mut sim, ZED, Rotation::Cw270, 0, 0);
        place(&mut sim, CORE, Rotation::None, 6, 8);
        assert!(check_invariants(&sim).is_empty());
        sim.run_to_end();
        assert!(check_invariants(&sim).is_empty());
    }

    #[test]
    fn identical_runs_have_no_diff() {
        let mut a = hub_and_line();
        let mut b = hub_and_line();
        a.advance_year();
        b.advance_year();
        let diff = diff_simulations(&a, &b);
        assert!(diff.is_identical, "{diff:?}");
    }

    #[test]
    fn diverging_runs_are_reported() {
        let mut a = hub_and_line();
        let b = hub_and_line();
        a.advance_year();
        place(&mut a, ZED, Rotation::None, 0, 0);

        let diff = diff_simulations(&a, &b);
        assert!(!diff.is_identical);
        assert!(!diff.year_matches);
        assert!(!diff.supply_matches);
        assert!(diff.building_diffs.contains(&BuildingDiff::OnlyInA(BuildingId(3))));
        assert!(diff.building_diffs.iter().any(|d| matches!(
            d,
            BuildingDiff::StateMismatch { building, .. } if *building == BuildingId(1)
        )));
    }
}
