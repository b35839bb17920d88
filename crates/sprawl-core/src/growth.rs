//! Supply & growth: the once-per-year production, distribution, and
//! threshold-driven leveling of buildings.
//!
//! # Supply
//!
//! Every cluster pools what its members produce this year and hands it back
//! out by weight:
//!
//! ```text
//! weight = port_count * level^0.8 / (1 + nearest_distance * 0.3)   (min 0.01)
//! share  = total * weight / sum(weights)
//! ```
//!
//! # Growth
//!
//! After all shares land, each building spends stored supply on level-ups
//! while it is below its growth cap and can afford the next threshold.

use crate::building::Building;
use crate::connectivity::Cluster;
use crate::distance::DistanceOracle;
use crate::id::{BuildingId, ClusterId};
use crate::template::TemplateCatalog;
use tracing::warn;

/// Exponent applied to level when weighting a member's share.
pub const LEVEL_WEIGHT_EXPONENT: f64 = 0.8;
/// How strongly distance to the nearest neighbor shrinks a member's share.
pub const DISTANCE_PENALTY: f64 = 0.3;
/// Floor on any member's weight, so no member is starved outright.
pub const MIN_WEIGHT: f64 = 0.01;
/// Default upper bound on level-ups per building per year.
pub const DEFAULT_LEVEL_UP_GUARD: u32 = 999;

/// Distribution weight for one cluster member.
pub fn distribution_weight(port_count: usize, level: u32, nearest_distance: f64) -> f64 {
    let weight = port_count as f64 * f64::from(level).powf(LEVEL_WEIGHT_EXPONENT)
        / (1.0 + nearest_distance * DISTANCE_PENALTY);
    weight.max(MIN_WEIGHT)
}

/// Split `total` proportionally to `weights`. The shares sum to `total` when
/// the weights sum to something positive; otherwise every share is zero.
pub fn distribute_supply(total: f64, weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter().map(|w| total * (w / sum)).collect()
    } else {
        vec![0.0; weights.len()]
    }
}

/// What one cluster produced and how it was split this year.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSupply {
    pub cluster: ClusterId,
    pub total: f64,
    /// `(building slot, share)` for every member.
    pub shares: Vec<(usize, f64)>,
}

/// Produce and distribute one year of supply in every cluster. Sets each
/// cluster's `total_supply` and adds shares to members' stored supply.
pub fn supply_phase(
    buildings: &mut [Building],
    clusters: &mut [Cluster],
    catalog: &TemplateCatalog,
) -> Vec<ClusterSupply> {
    let mut out = Vec::with_capacity(clusters.len());

    for cluster in clusters.iter_mut() {
        let total: f64 = cluster
            .members
            .iter()
            .map(|&slot| {
                let b = &buildings[slot];
                catalog
                    .get(b.template)
                    .map_or(0.0, |t| t.supply_output(b.level))
            })
            .sum();
        cluster.total_supply = total;

        let oracle = DistanceOracle::for_cluster(cluster);
        let weights: Vec<f64> = cluster
            .members
            .iter()
            .map(|&slot| {
                let b = &buildings[slot];
                let ports = catalog.get(b.template).map_or(0, |t| t.port_count());
                let nearest = oracle.nearest_distance(slot).unwrap_or(0.0);
                distribution_weight(ports, b.level, nearest)
            })
            .collect();

        let shares = distribute_supply(total, &weights);
        for (&slot, &share) in cluster.members.iter().zip(&shares) {
            buildings[slot].stored_supply += share;
        }

        out.push(ClusterSupply {
            cluster: cluster.id,
            total,
            shares: cluster.members.iter().copied().zip(shares).collect(),
        });
    }

    out
}

/// Outcome of one growth phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Total level-ups across all buildings.
    pub level_ups: u32,
    /// Buildings whose loop was cut short by the guard.
    pub guard_trips: Vec<BuildingId>,
}

/// Level up every building that can afford it, bounded by `guard`
/// iterations per building.
pub fn growth_phase(
    buildings: &mut [Building],
    clusters: &[Cluster],
    catalog: &TemplateCatalog,
    guard: u32,
) -> GrowthReport {
    let mut report = GrowthReport::default();

    for b in buildings.iter_mut() {
        let Some(template) = catalog.get(b.template) else {
            continue;
        };
        let cluster_size = b
            .cluster
            .and_then(|id| clusters.get(id.index()))
            .map_or(1, Cluster::size);
        let cap = template.growth_cap(cluster_size);

        let mut steps = 0;
        while b.level < cap {
            let threshold = template.threshold(b.level);
            if b.stored_supply < threshold {
                break;
            }
            if steps >= guard {
                warn!(
                    target: "sprawl::growth",
                    building = %b.id,
                    level = b.level,
                    guard,
                    "growth.guard_tripped"
                );
                report.guard_trips.push(b.id);
                break;
            }
            b.stored_supply = (b.stored_supply - threshold).max(0.0);
            b.level += 1;
            steps += 1;
        }
        report.level_ups += steps;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::rebuild;
    use crate::geometry::{Cell, Rotation};
    use crate::template::{CatalogBuilder, GrowthType, TemplateDef};
    use crate::test_utils::*;

    #[test]
    fn weight_formula() {
        // 4 ports, level 1, nearest 0 -> 4.
        assert!((distribution_weight(4, 1, 0.0) - 4.0).abs() < 1e-12);
        // 2 ports, level 1, nearest 1 -> 2 / 1.3.
        assert!((distribution_weight(2, 1, 1.0) - 2.0 / 1.3).abs() < 1e-12);
        let w = distribution_weight(3, 5, 2.0);
        assert!((w - 3.0 * 5f64.powf(0.8) / 1.6).abs() < 1e-12);
    }

    #[test]
    fn weight_is_floored() {
        assert_eq!(distribution_weight(0, 3, 0.0), MIN_WEIGHT);
    }

    #[test]
    fn shares_conserve_total() {
        let shares = distribute_supply(37.5, &[1.0, 2.0, 0.01, 4.5]);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 37.5).abs() < 1e-9);
        assert!(shares[1] > shares[0]);
    }

    #[test]
    fn zero_weights_give_zero_shares() {
        assert_eq!(distribute_supply(10.0, &[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(distribute_supply(10.0, &[]).is_empty());
    }

    #[test]
    fn singleton_keeps_its_own_output() {
        let catalog = fixture_catalog();
        let mut buildings = vec![make_building(&catalog, 0, HUB, Rotation::None, Cell::new(5, 5))];
        let mut clusters = rebuild(&mut buildings, &catalog).clusters;

        let supply = supply_phase(&mut buildings, &mut clusters, &catalog);
        assert_eq!(supply.len(), 1);
        assert!((supply[0].total - 5.0).abs() < 1e-12);
        assert!((clusters[0].total_supply - 5.0).abs() < 1e-12);
        assert!((buildings[0].stored_supply - 5.0).abs() < 1e-12);
    }

    #[test]
    fn hub_takes_the_larger_share() {
        let catalog = fixture_catalog();
        let mut buildings = vec![
            make_building(&catalog, 0, HUB, Rotation::None, Cell::new(5, 5)),
            make_building(&catalog, 1, LINE, Rotation::None, Cell::new(4, 4)),
        ];
        let mut clusters = rebuild(&mut buildings, &catalog).clusters;
        assert_eq!(clusters.len(), 1);

        let supply = supply_phase(&mut buildings, &mut clusters, &catalog);
        // Both linear at level 1: 5 + 5.
        assert!((supply[0].total - 10.0).abs() < 1e-12);
        // Weights 4/1.3 and 2/1.3 -> 2:1 split.
        assert!((buildings[0].stored_supply - 20.0 / 3.0).abs() < 1e-9);
        assert!((buildings[1].stored_supply - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn growth_spends_thresholds() {
        let catalog = fixture_catalog();
        let mut buildings = vec![make_building(&catalog, 0, LINE, Rotation::None, Cell::new(0, 0))];
        let clusters = rebuild(&mut buildings, &catalog).clusters;

        // Thresholds 20 (lv1) + 40 (lv2) = 60; 70 leaves 10 short of 60 for lv3.
        buildings[0].stored_supply = 70.0;
        let report = growth_phase(&mut buildings, &clusters, &catalog, DEFAULT_LEVEL_UP_GUARD);
        assert_eq!(buildings[0].level, 3);
        assert!((buildings[0].stored_supply - 10.0).abs() < 1e-9);
        assert_eq!(report.level_ups, 2);
        assert!(report.guard_trips.is_empty());
    }

    #[test]
    fn growth_stops_at_cap() {
        let catalog = fixture_catalog();
        let mut buildings = vec![make_building(&catalog, 0, LINE, Rotation::None, Cell::new(0, 0))];
        let clusters = rebuild(&mut buildings, &catalog).clusters;

        buildings[0].stored_supply = 1.0e9;
        growth_phase(&mut buildings, &clusters, &catalog, DEFAULT_LEVEL_UP_GUARD);
        // base cap 4 + floor(1 * 0.8) = 4.
        assert_eq!(buildings[0].level, 4);
        assert!(buildings[0].stored_supply > 0.0);
    }

    #[test]
    fn guard_trips_without_panicking() {
        let mut builder = CatalogBuilder::new();
        let id = builder.register(TemplateDef {
            key: "free".to_string(),
            name: "free".to_string(),
            shape: vec![Cell::ORIGIN],
            ports: vec![],
            growth: GrowthType::Linear,
            base_threshold: 0.0,
            base_cap: 10_000,
            auto_connect: false,
            range: 0,
        });
        let catalog = builder.build(1).unwrap();
        let template = catalog.get(id).unwrap();
        let mut buildings = vec![Building::new(
            BuildingId(1),
            id,
            crate::building::Placement::new(template, Rotation::None, Cell::ORIGIN),
        )];
        let clusters = rebuild(&mut buildings, &catalog).clusters;

        let report = growth_phase(&mut buildings, &clusters, &catalog, 50);
        assert_eq!(buildings[0].level, 51);
        assert_eq!(report.level_ups, 50);
        assert_eq!(report.guard_trips, vec![BuildingId(1)]);
    }

    #[test]
    fn negative_threshold_never_drives_supply_negative() {
        let mut builder = CatalogBuilder::new();
        let id = builder.register(TemplateDef {
            key: "odd".to_string(),
            name: "odd".to_string(),
            shape: vec![Cell::ORIGIN],
            ports: vec![],
            growth: GrowthType::Linear,
            base_threshold: -3.0,
            base_cap: 6,
            auto_connect: false,
            range: 0,
        });
        let catalog = builder.build(1).unwrap();
        let template = catalog.get(id).unwrap();
        let mut buildings = vec![Building::new(
            BuildingId(1),
            id,
            crate::building::Placement::new(template, Rotation::None, Cell::ORIGIN),
        )];
        let clusters = rebuild(&mut buildings, &catalog).clusters;

        growth_phase(&mut buildings, &clusters, &catalog, DEFAULT_LEVEL_UP_GUARD);
        assert_eq!(buildings[0].level, 6);
        assert!(buildings[0].stored_supply >= 0.0);
    }
}
