//! City blocks: closed polygons used as building sites.

use bevy::prelude::*;

use super::lot_geometry::{point_in_polygon, polygon_area, polygon_bounds};

/// A city block (closed polygon inferred from chained road edges).
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub vertices: Vec<Vec2>,
    pub area: f32,
}

impl Block {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        let area = polygon_area(&vertices);
        Self { vertices, area }
    }

    pub fn bounds(&self) -> Rect {
        polygon_bounds(&self.vertices)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_area_and_membership() {
        let block = Block::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(0.0, 5.0),
        ]);
        assert!((block.area - 50.0).abs() < 1e-3);
        assert!(block.contains(Vec2::new(5.0, 2.5)));
        assert!(!block.contains(Vec2::new(5.0, 7.5)));
        assert_eq!(block.bounds().size(), Vec2::new(10.0, 5.0));
    }
}
