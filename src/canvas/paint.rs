use egui::{
    Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Ui, Vec2, load::SizedTexture, pos2, vec2,
};

use super::{GRID_SPACING, LayerBounds, ViewTransform, text_origin};
use crate::fonts::FontRegistry;
use crate::layer::{ImageLayer, Layer, LayerContent, TextLayer};
use crate::project::Project;
use crate::selection::Selection;
use crate::texture_manager::TextureManager;

const BACKGROUND_COLOR: Color32 = Color32::from_gray(48);
const CANVAS_COLOR: Color32 = Color32::WHITE;
const GRID_COLOR: Color32 = Color32::from_gray(220);
const MISSING_COLOR: Color32 = Color32::from_rgba_premultiplied(90, 90, 90, 160);
const FAILED_COLOR: Color32 = Color32::from_rgba_premultiplied(160, 30, 30, 160);
const SELECTION_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
const SELECTION_STROKE_WIDTH: f32 = 1.5;
/// Grid lines closer than this on screen are skipped
const MIN_GRID_SCREEN_SPACING: f32 = 4.0;

/// Everything the scene painter reads
pub struct PaintContext<'a> {
    pub project: &'a Project,
    pub textures: &'a mut TextureManager,
    pub fonts: &'a mut FontRegistry,
    pub selection: Selection,
    pub view: ViewTransform,
    pub viewport: Rect,
    pub show_grid: bool,
}

/// What the painter learned about the scene this frame
pub struct PaintedScene {
    pub bounds: Vec<LayerBounds>,
    pub scene_size: Vec2,
}

/// Paints the base image (or blank canvas) and every visible layer in order
pub fn paint_scene(ui: &Ui, cx: PaintContext<'_>) -> PaintedScene {
    let PaintContext {
        project,
        textures,
        fonts,
        selection,
        view,
        viewport,
        show_grid,
    } = cx;
    let painter = ui.painter_at(viewport);
    painter.rect_filled(viewport, 0.0, BACKGROUND_COLOR);

    let canvas_size = vec2(
        project.canvas_size.width as f32,
        project.canvas_size.height as f32,
    );
    let mut scene_size = canvas_size;

    match &project.base_image {
        Some(base) => match textures.texture(ui.ctx(), &base.image_path) {
            Ok(texture) => {
                if let Some([w, h]) = textures.dimensions(&base.image_path) {
                    scene_size = vec2(w as f32, h as f32);
                }
                let rect = view.rect_to_screen(viewport, Rect::from_min_size(Pos2::ZERO, scene_size));
                painter.image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            Err(err) => {
                let rect = view.rect_to_screen(viewport, Rect::from_min_size(Pos2::ZERO, scene_size));
                painter.rect_filled(rect, 0.0, FAILED_COLOR);
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    err.to_string(),
                    FontId::proportional(14.0),
                    Color32::WHITE,
                );
            }
        },
        None => {
            let rect = view.rect_to_screen(viewport, Rect::from_min_size(Pos2::ZERO, scene_size));
            painter.rect_filled(rect, 0.0, CANVAS_COLOR);
            if show_grid {
                paint_grid(&painter, rect, GRID_SPACING * view.zoom);
            }
        }
    }

    let mut bounds = Vec::new();
    for layer in project.layers().iter().filter(|layer| layer.visible) {
        let layer_bounds = match &layer.content {
            LayerContent::Image(image) => {
                paint_image_layer(ui, textures, view, viewport, layer, image)
            }
            LayerContent::Text(text) => {
                paint_text_layer(ui, fonts, view, viewport, layer, text)
            }
        };
        bounds.push(layer_bounds);
    }

    let outline = match selection {
        Selection::Layer(id) => bounds
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.corners().map(|p| view.to_screen(viewport, p))),
        Selection::BaseImage if project.base_image.is_some() => {
            let rect = view.rect_to_screen(viewport, Rect::from_min_size(Pos2::ZERO, scene_size));
            Some([rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()])
        }
        _ => None,
    };
    if let Some(corners) = outline {
        painter.add(Shape::closed_line(
            corners.to_vec(),
            Stroke::new(SELECTION_STROKE_WIDTH, SELECTION_COLOR),
        ));
    }

    PaintedScene { bounds, scene_size }
}

fn paint_grid(painter: &egui::Painter, rect: Rect, spacing: f32) {
    if spacing < MIN_GRID_SCREEN_SPACING {
        return;
    }
    let stroke = Stroke::new(1.0, GRID_COLOR);
    let mut x = rect.left() + spacing;
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += spacing;
    }
    let mut y = rect.top() + spacing;
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += spacing;
    }
}

fn paint_image_layer(
    ui: &Ui,
    textures: &mut TextureManager,
    view: ViewTransform,
    viewport: Rect,
    layer: &Layer,
    image: &ImageLayer,
) -> LayerBounds {
    let rect = Rect::from_min_size(
        pos2(layer.position.x as f32, layer.position.y as f32),
        vec2(image.size.width as f32, image.size.height as f32),
    );
    let bounds = LayerBounds {
        id: layer.id,
        rect,
        rotation: image.rotation,
    };
    let screen_rect = view.rect_to_screen(viewport, rect);

    let texture = image
        .image_path
        .as_deref()
        .map(|path| textures.texture(ui.ctx(), path));
    match texture {
        Some(Ok(texture)) => {
            let alpha = (image.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
            egui::Image::from_texture(SizedTexture::new(texture.id(), screen_rect.size()))
                .rotate(image.rotation.to_radians(), Vec2::splat(0.5))
                .tint(Color32::from_white_alpha(alpha))
                .paint_at(ui, screen_rect);
        }
        Some(Err(_)) => placeholder(ui, view, viewport, &bounds, FAILED_COLOR, "Cannot load image"),
        None => placeholder(ui, view, viewport, &bounds, MISSING_COLOR, "No image"),
    }
    bounds
}

fn placeholder(
    ui: &Ui,
    view: ViewTransform,
    viewport: Rect,
    bounds: &LayerBounds,
    fill: Color32,
    label: &str,
) {
    let painter = ui.painter_at(viewport);
    let points = bounds
        .corners()
        .map(|p| view.to_screen(viewport, p))
        .to_vec();
    painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
    painter.text(
        view.to_screen(viewport, bounds.rect.center()),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(12.0),
        Color32::WHITE,
    );
}

fn paint_text_layer(
    ui: &Ui,
    fonts: &mut FontRegistry,
    view: ViewTransform,
    viewport: Rect,
    layer: &Layer,
    text: &TextLayer,
) -> LayerBounds {
    let painter = ui.painter_at(viewport);
    let family = fonts.family_for(ui.ctx(), text.font_path.as_deref());
    let [r, g, b, a] = text.color.0;
    let color = Color32::from_rgba_unmultiplied(r, g, b, a);
    let galley = painter.layout_no_wrap(
        text.text.clone(),
        FontId::new(text.font_size as f32 * view.zoom, family),
        color,
    );

    // Keep empty text clickable
    let size = (galley.size() / view.zoom).max(vec2(4.0, 4.0));
    let origin = text_origin(layer.position, size, text.horizontal_align, text.vertical_align);
    painter.galley(view.to_screen(viewport, origin), galley, color);

    LayerBounds {
        id: layer.id,
        rect: Rect::from_min_size(origin, size),
        rotation: 0.0,
    }
}
