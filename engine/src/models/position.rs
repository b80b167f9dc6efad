//! World position
//!
//! Flat 2D coordinates; distances are Euclidean. Positions only matter to
//! the engine as inputs to travel-duration math.

use serde::{Deserialize, Serialize};

/// A point on the world map.
///
/// # Example
/// ```
/// use activity_engine_core_rs::Position;
///
/// let town = Position::new(0.0, 0.0);
/// let cave = Position::new(30.0, 40.0);
/// assert_eq!(town.distance_to(&cave), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// The map origin, used for actors that have not reported a position yet.
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(-3.0, 5.0);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(a.distance_to(&a), 0.0);
    }
}
