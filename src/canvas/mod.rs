//! The editing canvas: view transform, layer geometry and hit testing.
//!
//! Canvas coordinates are image pixels with the origin at the base image's
//! top-left corner; screen coordinates are egui points.

mod paint;

pub use paint::{PaintContext, PaintedScene, paint_scene};

use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::layer::{HorizontalAlign, LayerId, Position, VerticalAlign};

pub const GRID_SPACING: f32 = 20.0;
pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 20.0;
/// Screen margin kept around the scene by fit and reset
pub const VIEW_MARGIN: f32 = 20.0;

/// Maps canvas pixels to screen points inside the canvas viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    /// Screen offset of the canvas origin from the viewport's top-left corner
    pub pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::splat(VIEW_MARGIN),
        }
    }
}

impl ViewTransform {
    pub fn to_screen(&self, viewport: Rect, canvas: Pos2) -> Pos2 {
        viewport.min + self.pan + canvas.to_vec2() * self.zoom
    }

    pub fn to_canvas(&self, viewport: Rect, screen: Pos2) -> Pos2 {
        ((screen - viewport.min - self.pan) / self.zoom).to_pos2()
    }

    pub fn rect_to_screen(&self, viewport: Rect, canvas: Rect) -> Rect {
        Rect::from_min_max(
            self.to_screen(viewport, canvas.min),
            self.to_screen(viewport, canvas.max),
        )
    }

    /// Scales `scene` to fill `viewport` and centers it
    pub fn fit(scene: Vec2, viewport: Rect) -> Self {
        if scene.x <= 0.0 || scene.y <= 0.0 {
            return Self::default();
        }
        let room = (viewport.size() - Vec2::splat(2.0 * VIEW_MARGIN)).max(Vec2::splat(1.0));
        let zoom = (room.x / scene.x).min(room.y / scene.y).clamp(MIN_ZOOM, MAX_ZOOM);
        let pan = (viewport.size() - scene * zoom) / 2.0;
        Self { zoom, pan }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zooms by `factor` keeping the canvas point under `anchor` (viewport-relative) in place
    pub fn zoom_about(&mut self, anchor: Vec2, factor: f32) {
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let applied = zoom / self.zoom;
        self.pan = anchor - (anchor - self.pan) * applied;
        self.zoom = zoom;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}

/// Top-left corner of a text block of `size` anchored at `anchor`
pub fn text_origin(anchor: Position, size: Vec2, h: HorizontalAlign, v: VerticalAlign) -> Pos2 {
    let x = anchor.x as f32
        - match h {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::Center => size.x / 2.0,
            HorizontalAlign::Right => size.x,
        };
    let y = anchor.y as f32
        - match v {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => size.y / 2.0,
            VerticalAlign::Bottom => size.y,
        };
    pos2(x, y)
}

/// Where a layer was drawn, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerBounds {
    pub id: LayerId,
    /// Unrotated rectangle
    pub rect: Rect,
    /// Degrees clockwise about the rectangle's center
    pub rotation: f32,
}

impl LayerBounds {
    pub fn contains(&self, point: Pos2) -> bool {
        if self.rotation == 0.0 {
            return self.rect.contains(point);
        }
        // Undo the rotation around the center, then test the plain rectangle
        let center = self.rect.center();
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let d = point - center;
        let local = center + vec2(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
        self.rect.contains(local)
    }

    /// Corners after rotation, clockwise from the top-left
    pub fn corners(&self) -> [Pos2; 4] {
        let r = self.rect;
        let corners = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()];
        if self.rotation == 0.0 {
            return corners;
        }
        let center = r.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        corners.map(|p| {
            let d = p - center;
            center + vec2(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
        })
    }
}

/// Top-most layer under `point`; `bounds` is in paint order
pub fn hit_test(bounds: &[LayerBounds], point: Pos2) -> Option<LayerId> {
    bounds
        .iter()
        .rev()
        .find(|bounds| bounds.contains(point))
        .map(|bounds| bounds.id)
}

/// An ongoing drag of a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDrag {
    pub id: LayerId,
    pub grab: Pos2,
    pub start: Position,
}

impl LayerDrag {
    /// Layer position with the pointer at `pointer` (canvas coordinates)
    pub fn position_at(&self, pointer: Pos2) -> (i32, i32) {
        let delta = pointer - self.grab;
        (
            self.start.x + delta.x.round() as i32,
            self.start.y + delta.y.round() as i32,
        )
    }
}

/// View and interaction state of the canvas, kept across frames
#[derive(Debug, Default)]
pub struct CanvasState {
    pub view: ViewTransform,
    pub drag: Option<LayerDrag>,
    /// Layer bounds from the last paint, for hit testing
    pub bounds: Vec<LayerBounds>,
    /// Fit the scene on the next frame, once the viewport size is known
    pub fit_requested: bool,
    pub scene_size: Vec2,
}

impl CanvasState {
    pub fn request_fit(&mut self) {
        self.fit_requested = true;
    }
}
