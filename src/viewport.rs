use crate::Position;
use serde::{Deserialize, Serialize};

/// Pan/zoom transform applied to the canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    /// Convert a point on the editing surface into canvas coordinates
    pub fn project(&self, surface: Position) -> Position {
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        Position::new((surface.x - self.x) / zoom, (surface.y - self.y) / zoom)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.zoom.is_finite()
    }

    /// Convert a canvas point back onto the editing surface
    pub fn unproject(&self, canvas: Position) -> Position {
        Position::new(canvas.x * self.zoom + self.x, canvas.y * self.zoom + self.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Turns pointer positions into node positions for the current session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub viewport: Viewport,

    /// Grid to snap to, when snapping is on
    pub snap_grid: Option<[f64; 2]>,
}

impl Placement {
    pub fn new(viewport: Viewport, snap_grid: Option<[f64; 2]>) -> Self {
        Self {
            viewport,
            snap_grid,
        }
    }

    /// Canvas position for a node created under `pointer`, shifted left by `x_offset`
    pub fn place(&self, pointer: Position, x_offset: f64) -> Position {
        let projected = self.viewport.project(pointer);
        let shifted = Position::new(projected.x - x_offset, projected.y);
        match self.snap_grid {
            Some(grid) => shifted.snapped(grid),
            None => shifted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_projection() {
        let viewport = Viewport::default();
        let pos = Position::new(120.0, 40.0);
        assert_eq!(viewport.project(pos), pos);
    }

    #[test]
    fn test_pan_and_zoom() {
        let viewport = Viewport::new(100.0, 50.0, 2.0);
        let projected = viewport.project(Position::new(300.0, 250.0));
        assert_eq!(projected, Position::new(100.0, 100.0));
        assert_eq!(viewport.unproject(projected), Position::new(300.0, 250.0));
    }

    #[test]
    fn test_degenerate_zoom() {
        for zoom in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let viewport = Viewport::new(10.0, 10.0, zoom);
            assert_eq!(
                viewport.project(Position::new(20.0, 30.0)),
                Position::new(10.0, 20.0)
            );
        }
    }

    #[test]
    fn test_placement() {
        let placement = Placement::new(Viewport::new(0.0, 0.0, 2.0), None);
        assert_eq!(
            placement.place(Position::new(400.0, 100.0), 75.0),
            Position::new(125.0, 50.0)
        );

        let snapping = Placement::new(Viewport::default(), Some([15.0, 15.0]));
        assert_eq!(
            snapping.place(Position::new(200.0, 52.0), 75.0),
            Position::new(120.0, 45.0)
        );
    }
}
