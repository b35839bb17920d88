//! Placed buildings and the placement footprint they are created from.

use crate::geometry::{rotate_ports, rotate_shape, Cell, Port, Rotation};
use crate::id::{BuildingId, ClusterId, TemplateId};
use crate::template::Template;

/// Where a template would land for a given rotation and origin: the rotated,
/// normalized relative footprint plus its absolute cells and ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub origin: Cell,
    pub rotation: Rotation,
    pub shape: Vec<Cell>,
    pub ports: Vec<Port>,
}

impl Placement {
    pub fn new(template: &Template, rotation: Rotation, origin: Cell) -> Self {
        Self {
            origin,
            rotation,
            shape: rotate_shape(&template.shape, rotation),
            ports: rotate_ports(&template.ports, rotation, &template.shape),
        }
    }

    /// Footprint in grid coordinates. `None` if the origin pushes a cell
    /// past the `i32` range, which is never on the grid.
    pub fn absolute_cells(&self) -> Option<Vec<Cell>> {
        self.shape
            .iter()
            .map(|c| c.checked_offset_by(self.origin))
            .collect()
    }

    pub fn absolute_ports(&self) -> Option<Vec<Port>> {
        self.ports
            .iter()
            .map(|p| {
                Some(Port {
                    cell: p.cell.checked_offset_by(self.origin)?,
                    dir: p.dir,
                })
            })
            .collect()
    }
}

/// A placed instance of a template.
///
/// Shape, ports, rotation and origin are fixed at placement; only `level`,
/// `stored_supply` and `cluster` change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub template: TemplateId,
    pub rotation: Rotation,
    pub origin: Cell,
    /// Rotated, normalized shape relative to `origin`.
    pub shape: Vec<Cell>,
    /// Rotated ports relative to `origin`.
    pub ports: Vec<Port>,
    pub level: u32,
    pub stored_supply: f64,
    /// Cluster from the most recent connectivity rebuild.
    pub cluster: Option<ClusterId>,
}

impl Building {
    pub fn new(id: BuildingId, template: TemplateId, placement: Placement) -> Self {
        Self {
            id,
            template,
            rotation: placement.rotation,
            origin: placement.origin,
            shape: placement.shape,
            ports: placement.ports,
            level: 1,
            stored_supply: 0.0,
            cluster: None,
        }
    }

    /// Cells this building covers on the grid.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.shape.iter().map(|c| c.offset_by(self.origin))
    }

    /// Ports in absolute grid coordinates.
    pub fn absolute_ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().map(|p| Port {
            cell: p.cell.offset_by(self.origin),
            dir: p.dir,
        })
    }

    /// Minimum Manhattan distance between any cell of `self` and any cell
    /// of `other`.
    pub fn footprint_distance(&self, other: &Building) -> u32 {
        self.cells()
            .flat_map(|a| other.cells().map(move |b| a.manhattan_distance(&b)))
            .min()
            .unwrap_or(u32::MAX)
    }

    /// True if any port of `self` mates with any port of `other`.
    pub fn ports_mate(&self, other: &Building) -> bool {
        self.absolute_ports()
            .any(|p| other.absolute_ports().any(|q| p.mates_with(&q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn placement_translates_rotated_footprint() {
        let catalog = fixture_catalog();
        let line = catalog.get(catalog.id_of(LINE).unwrap()).unwrap();

        let placement = Placement::new(line, Rotation::Cw90, Cell::new(3, 3));
        assert_eq!(
            placement.absolute_cells(),
            Some(vec![Cell::new(3, 3), Cell::new(3, 4)])
        );
        let ports = placement.absolute_ports().unwrap();
        assert_eq!(ports[0].cell, Cell::new(3, 3));
        assert_eq!(ports[1].cell, Cell::new(3, 4));
    }

    #[test]
    fn new_building_starts_at_level_one() {
        let catalog = fixture_catalog();
        let hub = catalog.get(catalog.id_of(HUB).unwrap()).unwrap();
        let b = Building::new(
            BuildingId(1),
            hub.id,
            Placement::new(hub, Rotation::None, Cell::new(5, 5)),
        );
        assert_eq!(b.level, 1);
        assert_eq!(b.stored_supply, 0.0);
        assert_eq!(b.cluster, None);
        assert_eq!(b.cells().collect::<Vec<_>>(), vec![Cell::new(5, 5)]);
        assert_eq!(b.absolute_ports().count(), 4);
    }

    #[test]
    fn footprint_distance_uses_closest_cells() {
        let catalog = fixture_catalog();
        let l = catalog.get(catalog.id_of(ELL).unwrap()).unwrap();
        let a = Building::new(BuildingId(1), l.id, Placement::new(l, Rotation::None, Cell::new(0, 0)));
        let b = Building::new(BuildingId(2), l.id, Placement::new(l, Rotation::None, Cell::new(3, 1)));
        // (1, 1) to (3, 1)
        assert_eq!(a.footprint_distance(&b), 2);
        assert_eq!(b.footprint_distance(&a), 2);
    }
}
