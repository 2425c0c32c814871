// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Axis-aligned 2D rectangles.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// A rectangle given by its minimum corner and its size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner.
    pub position: Vec2,
    /// Width and height, expected non-negative.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle spanning two corners in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            position: min,
            size: max - min,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Width over height, 0 for a flat rectangle.
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.y == 0.0 {
            0.0
        } else {
            self.size.x / self.size.y
        }
    }

    /// `true` when `point` is inside or on the border.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.position.x && point.y >= self.position.y && point.x <= max.x && point.y <= max.y
    }

    /// `true` when the two rectangles overlap with non-zero area.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.position.x < b_max.x
            && other.position.x < a_max.x
            && self.position.y < b_max.y
            && other.position.y < a_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_and_containment() {
        let r = Rect::from_corners(Vec2::new(4.0, 3.0), Vec2::new(0.0, 1.0));
        assert_eq!(r, Rect::new(0.0, 1.0, 4.0, 2.0));
        assert_eq!(r.center(), Vec2::new(2.0, 2.0));
        assert!(r.contains(Vec2::new(4.0, 3.0)));
        assert!(!r.contains(Vec2::new(4.1, 2.0)));
        assert_eq!(r.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&Rect::new(1.0, 0.0, 1.0, 1.0)));
        assert!(a.intersects(&Rect::new(0.5, 0.5, 1.0, 1.0)));
    }
}
