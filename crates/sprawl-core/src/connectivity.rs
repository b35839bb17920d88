//! Connectivity resolver: derives the link graph between placed buildings
//! and partitions them into clusters.
//!
//! Every rebuild starts from scratch with a pairwise O(B^2) scan; no state
//! carries over between rebuilds. That is fine for boards of a few hundred
//! cells. Incremental, dirty-tracked connectivity would be the extension
//! point for larger boards.
//!
//! Two buildings are linked when
//! - a port of one sits on the cell another's port faces, and the two face
//!   each other (a **port** link, distance 1), or otherwise
//! - either template auto-connects and the closest pair of footprint cells
//!   is within the larger of the two ranges (an **auto** link).
//!
//! Auto links measure cells while port links need exact port adjacency.

use crate::building::Building;
use crate::id::ClusterId;
use crate::template::TemplateCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Union-find
// ---------------------------------------------------------------------------

/// Array-backed disjoint-set forest over building slots, with path
/// compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of the set containing `x`. Compresses the path on the way out.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were
    /// already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return false;
        }
        if self.rank[ra] < self.rank[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        if self.rank[ra] == self.rank[rb] {
            self.rank[ra] += 1;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Links and clusters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Port,
    Auto,
}

/// A discovered connection between the buildings in slots `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub kind: LinkKind,
    /// 1 for port links, closest-cell Manhattan distance for auto links.
    pub distance: u32,
    /// 1 for port links, mean template decay for auto links.
    pub decay_factor: f64,
}

impl Link {
    pub fn port(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            kind: LinkKind::Port,
            distance: 1,
            decay_factor: 1.0,
        }
    }

    pub fn auto(a: usize, b: usize, distance: u32, decay_factor: f64) -> Self {
        Self {
            a,
            b,
            kind: LinkKind::Auto,
            distance,
            decay_factor,
        }
    }

    /// Edge weight used for shortest paths.
    pub fn weight(&self) -> f64 {
        match self.kind {
            LinkKind::Port => 1.0,
            LinkKind::Auto => f64::from(self.distance) * self.decay_factor,
        }
    }

    pub fn touches(&self, slot: usize) -> bool {
        self.a == slot || self.b == slot
    }
}

/// A maximal set of transitively linked buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Union-find root of the group.
    pub root: usize,
    /// Member building slots, ascending.
    pub members: Vec<usize>,
    /// Links with both endpoints inside this cluster.
    pub links: Vec<Link>,
    /// Supply produced by the members this year.
    pub total_supply: f64,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.members.binary_search(&slot).is_ok()
    }
}

/// Result of one rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connectivity {
    /// Every link, in discovery order (by `a`, then `b`).
    pub links: Vec<Link>,
    pub clusters: Vec<Cluster>,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Find the link between two buildings, if any. Port links take precedence.
pub fn link_between(
    buildings: &[Building],
    catalog: &TemplateCatalog,
    i: usize,
    j: usize,
) -> Option<Link> {
    let (bi, bj) = (&buildings[i], &buildings[j]);
    if bi.ports_mate(bj) {
        return Some(Link::port(i, j));
    }

    let ti = catalog.get(bi.template)?;
    let tj = catalog.get(bj.template)?;
    if !(ti.auto_connect || tj.auto_connect) {
        return None;
    }
    let distance = bi.footprint_distance(bj);
    if distance <= ti.range.max(tj.range) {
        Some(Link::auto(i, j, distance, (ti.decay + tj.decay) / 2.0))
    } else {
        None
    }
}

/// Rebuild links and clusters from scratch and write each building's
/// cluster id.
///
/// Cluster ids follow the ascending slot of each group's first member, so
/// the cluster holding slot 0 is always `ClusterId(0)`.
pub fn rebuild(buildings: &mut [Building], catalog: &TemplateCatalog) -> Connectivity {
    let count = buildings.len();
    let mut uf = UnionFind::new(count);
    let mut links = Vec::new();

    for i in 0..count {
        for j in (i + 1)..count {
            if let Some(link) = link_between(buildings, catalog, i, j) {
                uf.union(i, j);
                links.push(link);
            }
        }
    }

    let mut root_to_cluster: HashMap<usize, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for slot in 0..count {
        let root = uf.find(slot);
        let index = *root_to_cluster.entry(root).or_insert_with(|| {
            clusters.push(Cluster {
                id: ClusterId(clusters.len() as u32),
                root,
                members: Vec::new(),
                links: Vec::new(),
                total_supply: 0.0,
            });
            clusters.len() - 1
        });
        clusters[index].members.push(slot);
        buildings[slot].cluster = Some(clusters[index].id);
    }

    for link in &links {
        // Both endpoints share a root, so one lookup places the link.
        let root = uf.find(link.a);
        if let Some(&index) = root_to_cluster.get(&root) {
            clusters[index].links.push(*link);
        }
    }

    Connectivity { links, clusters }
}
