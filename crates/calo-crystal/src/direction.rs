//! Symbolic face directions and the lateral side index they resolve to.
//!
//! A crystal has two end faces (`Up` = front, `Down` = back) and four lateral
//! faces. Lateral faces are addressed by `Side`, whose index is the position
//! of the face in the canonical corner ring: side `i` is bounded by corners
//! `i`, `i+4`, `(i+1)%4 + 4` and `(i+1)%4`.

use crate::error::CrystalError;

/// Lateral side of a crystal, index `0..4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Neighbouring side in ring order (shares the lateral edge `next().index()`).
    #[inline]
    pub fn next(self) -> Side {
        Side::ALL[(self.index() + 1) % 4]
    }

    #[inline]
    pub fn opposite(self) -> Side {
        Side::ALL[(self.index() + 2) % 4]
    }
}

impl TryFrom<usize> for Side {
    type Error = CrystalError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Side::ALL
            .get(index)
            .copied()
            .ok_or(CrystalError::IndexOutOfRange { index })
    }
}

/// One of the six faces, named symbolically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Lateral side for the four lateral directions, `None` for `Up`/`Down`.
    #[inline]
    pub fn side(self) -> Option<Side> {
        match self {
            Direction::Up | Direction::Down => None,
            Direction::North => Some(Side::North),
            Direction::East => Some(Side::East),
            Direction::South => Some(Side::South),
            Direction::West => Some(Side::West),
        }
    }

    /// Index into the six face planes: lateral sides 0..3, front 4, back 5.
    #[inline]
    pub fn face_index(self) -> usize {
        match self {
            Direction::Up => 4,
            Direction::Down => 5,
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::North => Direction::North,
            Side::East => Direction::East,
            Side::South => Direction::South,
            Side::West => Direction::West,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_indices_and_ring_order() {
        for (i, s) in Side::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
            assert_eq!(Side::try_from(i), Ok(*s));
            assert_eq!(s.next().next(), s.opposite());
        }
        assert_eq!(Side::West.next(), Side::North);
        assert_eq!(
            Side::try_from(4),
            Err(CrystalError::IndexOutOfRange { index: 4 })
        );
    }

    #[test]
    fn face_indices_cover_all_six_planes() {
        let mut seen: Vec<usize> = Direction::ALL.iter().map(|d| d.face_index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        for s in Side::ALL {
            assert_eq!(Direction::from(s).side(), Some(s));
        }
        assert_eq!(Direction::Up.side(), None);
    }

    #[test]
    fn lateral_face_index_is_side_index() {
        for s in Side::ALL {
            assert_eq!(Direction::from(s).face_index(), s.index());
        }
        assert_eq!(Direction::Up.face_index(), 4);
        assert_eq!(Direction::Down.face_index(), 5);
    }
}
