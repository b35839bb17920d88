//! Intra-cluster shortest weighted distances.
//!
//! Port links weigh 1, auto links `distance * decay_factor`. Parallel links
//! between the same pair are kept as separate edges; Dijkstra picks the
//! cheaper one on its own.

use crate::connectivity::Cluster;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Frontier entry, ordered so the `BinaryHeap` pops the smallest distance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// All-pairs shortest distances within one cluster.
#[derive(Debug, Clone)]
pub struct DistanceOracle {
    /// Building slot -> local node index.
    local: HashMap<usize, usize>,
    /// `dist[i][j]` between local nodes; `f64::INFINITY` if unreachable.
    dist: Vec<Vec<f64>>,
}

impl DistanceOracle {
    /// Run Dijkstra from every member of `cluster`.
    pub fn for_cluster(cluster: &Cluster) -> Self {
        let local: HashMap<usize, usize> = cluster
            .members
            .iter()
            .enumerate()
            .map(|(i, &slot)| (slot, i))
            .collect();

        let n = cluster.members.len();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for link in &cluster.links {
            let (Some(&a), Some(&b)) = (local.get(&link.a), local.get(&link.b)) else {
                continue;
            };
            let w = link.weight();
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }

        let dist = (0..n).map(|start| dijkstra(&adjacency, start)).collect();
        Self { local, dist }
    }

    /// Shortest distance between two member slots.
    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        let a = *self.local.get(&from)?;
        let b = *self.local.get(&to)?;
        Some(self.dist[a][b])
    }

    /// Distance from `slot` to its nearest other member. `Some(0.0)` when the
    /// cluster has one member or nothing else is reachable; `None` if `slot`
    /// is not a member.
    pub fn nearest_distance(&self, slot: usize) -> Option<f64> {
        let a = *self.local.get(&slot)?;
        let nearest = self.dist[a]
            .iter()
            .enumerate()
            .filter(|&(b, _)| b != a)
            .map(|(_, &d)| d)
            .fold(f64::INFINITY, f64::min);
        Some(if nearest.is_finite() { nearest } else { 0.0 })
    }

    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }
}

fn dijkstra(adjacency: &[Vec<(usize, f64)>], start: usize) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; adjacency.len()];
    let mut heap = BinaryHeap::new();
    dist[start] = 0.0;
    heap.push(Frontier {
        dist: 0.0,
        node: start,
    });

    while let Some(Frontier { dist: d, node }) = heap.pop() {
        if d > dist[node] {
            continue;
        }
        for &(next, w) in &adjacency[node] {
            let candidate = d + w;
            if candidate < dist[next] {
                dist[next] = candidate;
                heap.push(Frontier {
                    dist: candidate,
                    node: next,
                });
            }
        }
    }
    dist
}
