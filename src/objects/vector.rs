//! Integer 3D vector used for room and item positions

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A position or offset in world coordinates
///
/// Serializes as a plain `[x, y, z]` array, which is also the form used in
/// object records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Vector3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// True for the all-zero vector
    pub fn is_null(&self) -> bool {
        self.x == 0 && self.y == 0 && self.z == 0
    }

    /// Euclidean length, truncated to whole units
    pub fn length(&self) -> i32 {
        let squared = f64::from(self.x) * f64::from(self.x)
            + f64::from(self.y) * f64::from(self.y)
            + f64::from(self.z) * f64::from(self.z);
        squared.sqrt() as i32
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, other: Vector3D) -> Vector3D {
        Vector3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, other: Vector3D) -> Vector3D {
        Vector3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl From<[i32; 3]> for Vector3D {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vector3D> for [i32; 3] {
    fn from(vector: Vector3D) -> Self {
        [vector.x, vector.y, vector.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Vector3D::new(1, 2, 3);
        let b = Vector3D::new(4, -2, 1);
        assert_eq!(a + b, Vector3D::new(5, 0, 4));
        assert_eq!(a - b, Vector3D::new(-3, 4, 2));
    }

    #[test]
    fn test_null() {
        assert!(Vector3D::default().is_null());
        assert!(!Vector3D::new(0, 1, 0).is_null());
    }

    #[test]
    fn test_length() {
        assert_eq!(Vector3D::new(3, 4, 0).length(), 5);
        assert_eq!(Vector3D::new(1, 1, 1).length(), 1);
    }

    #[test]
    fn test_json_array_form() {
        let vector = Vector3D::new(7, -1, 0);
        let json = serde_json::to_value(vector).unwrap();
        assert_eq!(json, serde_json::json!([7, -1, 0]));
        let back: Vector3D = serde_json::from_value(json).unwrap();
        assert_eq!(back, vector);
    }
}
