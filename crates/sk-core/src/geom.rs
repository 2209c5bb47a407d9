use core::ops::{Add, Sub};

/// Integer voxel index `(x, y, z)`.
///
/// The default value is the invalid sentinel `(-1, -1, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord3i {
    pub const INVALID: Coord3i = Coord3i {
        x: -1,
        y: -1,
        z: -1,
    };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn is_valid(self) -> bool {
        self.x >= 0 && self.y >= 0 && self.z >= 0
    }

    pub fn distance(self, rhs: Self) -> f64 {
        let dx = f64::from(self.x - rhs.x);
        let dy = f64::from(self.y - rhs.y);
        let dz = f64::from(self.z - rhs.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Chessboard distance; `1` means the two voxels are 26-adjacent.
    pub fn chebyshev(self, rhs: Self) -> i32 {
        (self.x - rhs.x)
            .abs()
            .max((self.y - rhs.y).abs())
            .max((self.z - rhs.z).abs())
    }

    /// Sum of absolute components; `1` means the two voxels share a face.
    pub fn manhattan(self, rhs: Self) -> i32 {
        (self.x - rhs.x).abs() + (self.y - rhs.y).abs() + (self.z - rhs.z).abs()
    }

    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Coord3i {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Add for Coord3i {
    type Output = Coord3i;

    fn add(self, rhs: Coord3i) -> Self::Output {
        Coord3i {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Coord3i {
    type Output = Coord3i;

    fn sub(self, rhs: Coord3i) -> Self::Output {
        Coord3i {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// Cumulative Euclidean length of a voxel chain.
pub fn arc_length(points: &[Coord3i]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::{Coord3i, arc_length};

    #[test]
    fn default_is_invalid_sentinel() {
        let c = Coord3i::default();
        assert_eq!(c, Coord3i::new(-1, -1, -1));
        assert!(!c.is_valid());
        assert!(Coord3i::new(0, 0, 0).is_valid());
    }

    #[test]
    fn coord_ops_and_metrics() {
        let a = Coord3i::new(1, 2, 3);
        let b = Coord3i::new(2, 4, 3);

        assert_eq!(a + b, Coord3i::new(3, 6, 6));
        assert_eq!(b - a, Coord3i::new(1, 2, 0));
        assert_eq!(a.chebyshev(b), 2);
        assert_eq!(a.manhattan(b), 3);
        assert!((a.distance(b) - 5.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn arc_length_of_diagonal_chain() {
        let pts = [
            Coord3i::new(0, 0, 0),
            Coord3i::new(1, 0, 0),
            Coord3i::new(2, 1, 0),
            Coord3i::new(3, 2, 1),
        ];
        let expected = 1.0 + 2.0_f64.sqrt() + 3.0_f64.sqrt();
        assert!((arc_length(&pts) - expected).abs() < 1e-12);
        assert_eq!(arc_length(&pts[..1]), 0.0);
    }
}
