//! Dihedral canonicalization of stone shapes and board-orientation rotation.
//!
//! A shape is a move list in play order: even indices are Black stones and
//! odd indices White stones. Its canonical key is the lexicographically
//! greatest rendering over the eight symmetries of the square, after
//! translating the shape so that its bounding box starts at the origin.

use crate::pos::{BOARD_SIZE, Pos};

/// One of the eight symmetries of the square, as a map on `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// `(x, y)`
    Identity,
    /// `(x, -y)`
    MirrorRows,
    /// `(-x, y)`
    MirrorColumns,
    /// `(-x, -y)`
    HalfTurn,
    /// `(y, x)`
    Transpose,
    /// `(y, -x)`
    QuarterTurn,
    /// `(-y, x)`
    ThreeQuarterTurn,
    /// `(-y, -x)`
    AntiTranspose,
}

impl Symmetry {
    /// All symmetries, in the order they are tried.
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::MirrorRows,
        Symmetry::MirrorColumns,
        Symmetry::HalfTurn,
        Symmetry::Transpose,
        Symmetry::QuarterTurn,
        Symmetry::ThreeQuarterTurn,
        Symmetry::AntiTranspose,
    ];

    /// Map a coordinate pair.
    #[inline]
    pub const fn apply(self, x: i32, y: i32) -> (i32, i32) {
        match self {
            Symmetry::Identity => (x, y),
            Symmetry::MirrorRows => (x, -y),
            Symmetry::MirrorColumns => (-x, y),
            Symmetry::HalfTurn => (-x, -y),
            Symmetry::Transpose => (y, x),
            Symmetry::QuarterTurn => (y, -x),
            Symmetry::ThreeQuarterTurn => (-y, x),
            Symmetry::AntiTranspose => (-y, -x),
        }
    }

    /// The symmetry that undoes this one.
    #[inline]
    pub const fn invert(self) -> Symmetry {
        match self {
            Symmetry::QuarterTurn => Symmetry::ThreeQuarterTurn,
            Symmetry::ThreeQuarterTurn => Symmetry::QuarterTurn,
            other => other,
        }
    }
}

/// A shape mapped by one symmetry and translated to the origin.
struct Normalized {
    key: String,
    min_x: i32,
    min_y: i32,
}

fn normalize(shape: &[(i32, i32)], symmetry: Symmetry) -> Normalized {
    let mapped: Vec<(i32, i32)> = shape.iter().map(|&(x, y)| symmetry.apply(x, y)).collect();
    let min_x = mapped.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = mapped.iter().map(|&(_, y)| y).min().unwrap_or(0);

    let mut black = Vec::with_capacity(mapped.len().div_ceil(2));
    let mut white = Vec::with_capacity(mapped.len() / 2);
    for (i, &(x, y)) in mapped.iter().enumerate() {
        let cell = (y - min_y) * BOARD_SIZE as i32 + (x - min_x);
        if i % 2 == 0 {
            black.push(cell);
        } else {
            white.push(cell);
        }
    }
    black.sort_unstable();
    white.sort_unstable();

    Normalized {
        key: format!("{}:{}", render(&black), render(&white)),
        min_x,
        min_y,
    }
}

fn render(cells: &[i32]) -> String {
    let body: Vec<String> = cells.iter().map(i32::to_string).collect();
    format!("[{}]", body.join(", "))
}

fn coords(shape: &[Pos]) -> Vec<(i32, i32)> {
    shape.iter().map(|p| (p.x() as i32, p.y() as i32)).collect()
}

fn canonical_coords(shape: &[(i32, i32)], best: (i32, i32)) -> (String, (i32, i32)) {
    let mut key = String::new();
    let mut moved = best;
    for symmetry in Symmetry::ALL {
        let normalized = normalize(shape, symmetry);
        if normalized.key > key {
            let (bx, by) = symmetry.apply(best.0, best.1);
            moved = (bx - normalized.min_x, by - normalized.min_y);
            key = normalized.key;
        }
    }
    (key, moved)
}

/// Return the symmetry-invariant key of a shape.
pub fn canonical(shape: &[Pos]) -> String {
    canonical_coords(&coords(shape), (0, 0)).0
}

/// Return the canonical key of a shape together with `best` expressed in
/// the frame that produced the key.
pub fn canonical_with_move(shape: &[Pos], best: Pos) -> (String, (i32, i32)) {
    canonical_coords(&coords(shape), (best.x() as i32, best.y() as i32))
}

/// Look `shape` up under every symmetry and map a stored move back to board
/// coordinates.
///
/// `lookup` receives candidate keys and returns the move stored in the
/// canonical frame. Returns `None` if no key matches or the mapped move
/// falls off the board.
pub fn find_book_move<F>(shape: &[Pos], lookup: F) -> Option<Pos>
where
    F: Fn(&str) -> Option<(i32, i32)>,
{
    let shape = coords(shape);
    for symmetry in Symmetry::ALL {
        let normalized = normalize(&shape, symmetry);
        let Some((x, y)) = lookup(&normalized.key) else {
            continue;
        };
        let (x, y) = symmetry
            .invert()
            .apply(x + normalized.min_x, y + normalized.min_y);
        return Pos::from_signed(x, y);
    }
    None
}

const MID: i32 = (BOARD_SIZE / 2) as i32;

/// Clockwise rotation of the board about its centre cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Pick the rotation that maps `pos` into the quadrant right of and
    /// level with or below the centre. The centre itself selects `Deg0`.
    pub fn select(pos: Pos) -> Rotation {
        let (dx, dy) = to_delta(pos);
        if dx > 0 && dy <= 0 {
            Rotation::Deg0
        } else if dx >= 0 && dy > 0 {
            Rotation::Deg90
        } else if dx < 0 && dy >= 0 {
            Rotation::Deg180
        } else if dx <= 0 && dy < 0 {
            Rotation::Deg270
        } else {
            Rotation::Deg0
        }
    }

    /// The rotation that undoes this one.
    pub const fn inverse(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// Map an original-frame cell into the rotated frame.
    pub fn translate(self, pos: Pos) -> Pos {
        let (dx, dy) = to_delta(pos);
        let (dx, dy) = match self {
            Rotation::Deg0 => (dx, dy),
            Rotation::Deg90 => (dy, -dx),
            Rotation::Deg180 => (-dx, -dy),
            Rotation::Deg270 => (-dy, dx),
        };
        from_delta(dx, dy)
    }

    /// Map a rotated-frame cell back to the original frame.
    pub fn detranslate(self, pos: Pos) -> Pos {
        self.inverse().translate(pos)
    }
}

/// Offset from the centre, `dy` growing upwards.
fn to_delta(pos: Pos) -> (i32, i32) {
    (pos.x() as i32 - MID, MID - pos.y() as i32)
}

fn from_delta(dx: i32, dy: i32) -> Pos {
    Pos::at((dx + MID) as usize, (MID - dy) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::decode;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn single_stone_key() {
        assert_eq!(canonical(&[Pos::CENTER]), "[0]:[]");
        assert_eq!(canonical(&[Pos::at(3, 11)]), "[0]:[]");
    }

    #[test]
    fn key_picks_greatest_rendering() {
        let key = canonical(&decode("H8 I8").unwrap());
        assert_eq!(key, "[1]:[0]");
        assert_eq!(canonical(&decode("H8 H9").unwrap()), key);
    }

    #[test]
    fn inverse_undoes_every_symmetry() {
        for s in Symmetry::ALL {
            let (x, y) = s.apply(3, -5);
            assert_eq!(s.invert().apply(x, y), (3, -5), "{s:?}");
        }
    }

    #[test]
    fn book_move_survives_reflection() {
        let shape = decode("H8 I8 J9").unwrap();
        let best = Pos::at(10, 5);
        let (key, stored) = canonical_with_move(&shape, best);
        let book: HashMap<String, (i32, i32)> = [(key, stored)].into_iter().collect();
        let lookup = |k: &str| book.get(k).copied();

        assert_eq!(find_book_move(&shape, lookup), Some(best));

        // Mirror the position through the vertical axis of the board.
        let mirror = |p: Pos| Pos::at(14 - p.x(), p.y());
        let mirrored: Vec<Pos> = shape.iter().copied().map(mirror).collect();
        assert_eq!(find_book_move(&mirrored, lookup), Some(mirror(best)));
    }

    #[test]
    fn missing_book_entry() {
        let shape = decode("H8 I8").unwrap();
        assert_eq!(find_book_move(&shape, |_| None), None);
    }

    #[test]
    fn rotation_selection_quadrants() {
        assert_eq!(Rotation::select(Pos::at(8, 7)), Rotation::Deg0);
        assert_eq!(Rotation::select(Pos::at(7, 6)), Rotation::Deg90);
        assert_eq!(Rotation::select(Pos::at(6, 7)), Rotation::Deg180);
        assert_eq!(Rotation::select(Pos::at(7, 8)), Rotation::Deg270);
        assert_eq!(Rotation::select(Pos::CENTER), Rotation::Deg0);
    }

    #[test]
    fn selected_rotation_lands_in_first_quadrant() {
        for pos in Pos::all().filter(|&p| p != Pos::CENTER) {
            let moved = Rotation::select(pos).translate(pos);
            let (dx, dy) = to_delta(moved);
            assert!(dx > 0 && dy <= 0, "{pos:?} -> {moved:?}");
        }
    }

    #[test]
    fn detranslate_roundtrip() {
        for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            for pos in Pos::all() {
                assert_eq!(rotation.detranslate(rotation.translate(pos)), pos);
            }
        }
        assert_eq!(Rotation::Deg90.translate(Pos::at(7, 6)), Pos::at(8, 7));
    }

    proptest! {
        #[test]
        fn canonical_is_dihedral_invariant(
            cells in proptest::collection::vec((0i32..15, 0i32..15), 1..12),
            which in 0usize..8,
        ) {
            let symmetry = Symmetry::ALL[which];
            let moved: Vec<(i32, i32)> = cells.iter().map(|&(x, y)| symmetry.apply(x, y)).collect();
            let (a, _) = canonical_coords(&cells, (0, 0));
            let (b, _) = canonical_coords(&moved, (0, 0));
            prop_assert_eq!(a, b);
        }
    }
}
