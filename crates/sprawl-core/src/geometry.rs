//! Grid geometry: cells, cardinal directions, quarter-turn rotations, and the
//! shape/port rotation used when a template is placed.
//!
//! The grid is y-down (row 0 at the top), so a clockwise quarter turn maps
//! `(x, y)` to `(-y, x)` and takes North to East.

use crate::id::TemplateId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A cell coordinate, absolute on the grid or relative to a building origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan_distance(&self, other: &Cell) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// The neighboring cell one step in `dir`.
    pub fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.offset();
        Cell::new(self.x + dx, self.y + dy)
    }

    /// Translate by another cell treated as an offset.
    pub fn offset_by(self, by: Cell) -> Cell {
        Cell::new(self.x + by.x, self.y + by.y)
    }

    /// Translate by `by`, or `None` if either coordinate leaves `i32`.
    pub fn checked_offset_by(self, by: Cell) -> Option<Cell> {
        Some(Cell::new(self.x.checked_add(by.x)?, self.y.checked_add(by.y)?))
    }

    /// Rotate about the origin by the rotation's quarter turns.
    pub fn rotated(self, rotation: Rotation) -> Cell {
        match rotation {
            Rotation::None => self,
            Rotation::Cw90 => Cell::new(-self.y, self.x),
            Rotation::Cw180 => Cell::new(-self.x, -self.y),
            Rotation::Cw270 => Cell::new(self.y, -self.x),
        }
    }
}

/// Cardinal directions in clockwise order. Rotation is index arithmetic on
/// this order, never name comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(alias = "N")]
    North,
    #[serde(alias = "E")]
    East,
    #[serde(alias = "S")]
    South,
    #[serde(alias = "W")]
    West,
}

impl Direction {
    /// All four cardinal directions, clockwise from North.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Position of this direction in the clockwise order.
    pub fn index(self) -> usize {
        self as usize
    }

    fn from_index(index: usize) -> Direction {
        Direction::all()[index % 4]
    }

    /// Offset for this direction on a y-down grid.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        Direction::from_index(self.index() + 2)
    }

    /// Step clockwise by the rotation's quarter turns.
    pub fn rotated(self, rotation: Rotation) -> Direction {
        Direction::from_index(self.index() + rotation.quarter_turns() as usize)
    }
}

/// Rotation applied to a building at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees clockwise.
    Cw90,
    /// 180 degrees.
    Cw180,
    /// 270 degrees clockwise (90 degrees counter-clockwise).
    Cw270,
}

impl Rotation {
    /// All four rotation values.
    pub fn all() -> [Rotation; 4] {
        [
            Rotation::None,
            Rotation::Cw90,
            Rotation::Cw180,
            Rotation::Cw270,
        ]
    }

    /// Parse a rotation in degrees. Any multiple of 90 is accepted and wrapped
    /// into `0..360` (so `-90` is `Cw270`); anything else is rejected.
    pub fn from_degrees(degrees: i32) -> Result<Rotation, PlacementError> {
        if degrees % 90 != 0 {
            return Err(PlacementError::InvalidRotation(degrees));
        }
        Ok(Self::from_quarter_turns(degrees.rem_euclid(360) as u32 / 90))
    }

    fn from_quarter_turns(turns: u32) -> Rotation {
        Rotation::all()[(turns % 4) as usize]
    }

    pub fn quarter_turns(self) -> u32 {
        self as u32
    }

    pub fn degrees(self) -> u32 {
        self.quarter_turns() * 90
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(self) -> Self {
        self.then(Rotation::Cw90)
    }

    /// This rotation followed by `other`.
    pub fn then(self, other: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Rotation {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }
}

/// A directional connection point on a building footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub cell: Cell,
    pub dir: Direction,
}

impl Port {
    pub fn new(x: i32, y: i32, dir: Direction) -> Self {
        Self {
            cell: Cell::new(x, y),
            dir,
        }
    }

    /// True if `other` sits on the cell this port faces and faces back.
    pub fn mates_with(&self, other: &Port) -> bool {
        other.cell == self.cell.step(self.dir) && other.dir == self.dir.opposite()
    }
}

/// Contract violations in a placement command. A blocked or out-of-bounds
/// placement is not an error: it is reported as a plain `false`/`None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("unknown template {0:?}")]
    UnknownTemplate(TemplateId),
    #[error("rotation {0} is not a multiple of 90 degrees")]
    InvalidRotation(i32),
}

// ---------------------------------------------------------------------------
// Shape and port rotation
// ---------------------------------------------------------------------------

/// Offset that moves the rotated shape's bounding box to `(0, 0)`.
fn normalizing_offset(shape: &[Cell], rotation: Rotation) -> Cell {
    let min_x = shape.iter().map(|c| c.rotated(rotation).x).min().unwrap_or(0);
    let min_y = shape.iter().map(|c| c.rotated(rotation).y).min().unwrap_or(0);
    Cell::new(-min_x, -min_y)
}

/// Rotate a shape about the origin and translate it so its minimum x and
/// minimum y are both zero.
pub fn rotate_shape(shape: &[Cell], rotation: Rotation) -> Vec<Cell> {
    let offset = normalizing_offset(shape, rotation);
    shape
        .iter()
        .map(|c| c.rotated(rotation).offset_by(offset))
        .collect()
}

/// Rotate ports the same way as their shape. The translation comes from the
/// rotated `shape_before`, not from the ports, so ports stay on the cells they
/// were attached to.
pub fn rotate_ports(ports: &[Port], rotation: Rotation, shape_before: &[Cell]) -> Vec<Port> {
    let offset = normalizing_offset(shape_before, rotation);
    ports
        .iter()
        .map(|p| Port {
            cell: p.cell.rotated(rotation).offset_by(offset),
            dir: p.dir.rotated(rotation),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[(i32, i32)]) -> Vec<Cell> {
        raw.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    #[test]
    fn manhattan_distance() {
        let a = Cell::new(0, 0);
        assert_eq!(a.manhattan_distance(&Cell::new(3, 4)), 7);
        assert_eq!(Cell::new(-2, 5).manhattan_distance(&Cell::new(3, -1)), 11);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn direction_rotation_wraps() {
        assert_eq!(Direction::North.rotated(Rotation::Cw90), Direction::East);
        assert_eq!(Direction::West.rotated(Rotation::Cw90), Direction::North);
        assert_eq!(Direction::South.rotated(Rotation::Cw270), Direction::East);
        for dir in Direction::all() {
            assert_eq!(dir.rotated(Rotation::None), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn opposite_offsets_cancel() {
        for dir in Direction::all() {
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn from_degrees_accepts_multiples_of_ninety() {
        assert_eq!(Rotation::from_degrees(0), Ok(Rotation::None));
        assert_eq!(Rotation::from_degrees(90), Ok(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(180), Ok(Rotation::Cw180));
        assert_eq!(Rotation::from_degrees(270), Ok(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(360), Ok(Rotation::None));
        assert_eq!(Rotation::from_degrees(-90), Ok(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(450), Ok(Rotation::Cw90));
    }

    #[test]
    fn from_degrees_rejects_other_angles() {
        assert_eq!(
            Rotation::from_degrees(45),
            Err(PlacementError::InvalidRotation(45))
        );
        assert!(Rotation::from_degrees(-1).is_err());
    }

    #[test]
    fn rotation_composition() {
        assert_eq!(Rotation::Cw90.then(Rotation::Cw270), Rotation::None);
        assert_eq!(Rotation::Cw180.then(Rotation::Cw180), Rotation::None);
        assert_eq!(Rotation::Cw270.rotate_cw(), Rotation::None);
        for r in Rotation::all() {
            assert_eq!(r.then(r.inverse()), Rotation::None);
            assert_eq!(Rotation::from_degrees(r.degrees() as i32), Ok(r));
        }
    }

    #[test]
    fn rotate_shape_identity() {
        let shape = cells(&[(0, 0), (0, 1), (1, 1)]);
        assert_eq!(rotate_shape(&shape, Rotation::None), shape);
    }

    #[test]
    fn rotate_line_quarter_turn() {
        let shape = cells(&[(0, 0), (1, 0)]);
        assert_eq!(rotate_shape(&shape, Rotation::Cw90), cells(&[(0, 0), (0, 1)]));
        assert_eq!(rotate_shape(&shape, Rotation::Cw180), cells(&[(1, 0), (0, 0)]));
        assert_eq!(rotate_shape(&shape, Rotation::Cw270), cells(&[(0, 1), (0, 0)]));
    }

    #[test]
    fn rotated_shape_is_normalized() {
        let shape = cells(&[(0, 0), (1, 0), (1, 1)]);
        for r in Rotation::all() {
            let rotated = rotate_shape(&shape, r);
            assert_eq!(rotated.iter().map(|c| c.x).min(), Some(0));
            assert_eq!(rotated.iter().map(|c| c.y).min(), Some(0));
        }
    }

    #[test]
    fn rotate_shape_inverts() {
        let shape = cells(&[(0, 0), (1, 0), (2, 0), (2, 1)]);
        for r in Rotation::all() {
            let back = rotate_shape(&rotate_shape(&shape, r), r.inverse());
            assert_eq!(back, shape, "rotation {r:?}");
        }
    }

    #[test]
    fn rotate_shape_composes() {
        let shape = cells(&[(0, 0), (0, 1), (1, 1)]);
        for a in Rotation::all() {
            for b in Rotation::all() {
                assert_eq!(
                    rotate_shape(&rotate_shape(&shape, a), b),
                    rotate_shape(&shape, a.then(b))
                );
            }
        }
    }

    #[test]
    fn empty_shape_rotates_to_empty() {
        assert!(rotate_shape(&[], Rotation::Cw90).is_empty());
    }

    #[test]
    fn ports_follow_their_cells() {
        let shape = cells(&[(0, 0), (1, 0)]);
        let ports = vec![
            Port::new(0, 0, Direction::North),
            Port::new(1, 0, Direction::South),
        ];

        let rotated = rotate_ports(&ports, Rotation::Cw180, &shape);
        assert_eq!(rotated[0], Port::new(1, 0, Direction::South));
        assert_eq!(rotated[1], Port::new(0, 0, Direction::North));

        let rotated = rotate_ports(&ports, Rotation::Cw90, &shape);
        assert_eq!(rotated[0], Port::new(0, 0, Direction::East));
        assert_eq!(rotated[1], Port::new(0, 1, Direction::West));
    }

    #[test]
    fn ports_stay_on_rotated_shape() {
        let shape = cells(&[(0, 0), (0, 1), (1, 1)]);
        let ports = vec![
            Port::new(0, 0, Direction::East),
            Port::new(0, 1, Direction::North),
            Port::new(1, 1, Direction::West),
        ];
        for r in Rotation::all() {
            let rotated_shape = rotate_shape(&shape, r);
            for port in rotate_ports(&ports, r, &shape) {
                assert!(rotated_shape.contains(&port.cell), "{r:?}: {port:?}");
            }
        }
    }

    #[test]
    fn mating_ports() {
        let a = Port::new(5, 5, Direction::North);
        let b = Port::new(5, 4, Direction::South);
        assert!(a.mates_with(&b));
        assert!(b.mates_with(&a));

        let wrong_dir = Port::new(5, 4, Direction::North);
        assert!(!a.mates_with(&wrong_dir));
        let wrong_cell = Port::new(6, 4, Direction::South);
        assert!(!a.mates_with(&wrong_cell));
    }
}
