use eframe::egui;
use egui::{PointerButton, Rect, Sense};

use crate::PillowApp;
use crate::canvas::{LayerDrag, PaintContext, ViewTransform, ZOOM_STEP, hit_test, paint_scene};
use crate::selection::Selection;

pub fn central_panel(app: &mut PillowApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let viewport = ui.available_rect_before_wrap();
            let response = ui.allocate_rect(viewport, Sense::click_and_drag());

            handle_layer_input(app, &response, viewport);
            handle_view_input(app, ui, &response, viewport);

            let painted = paint_scene(
                ui,
                PaintContext {
                    project: &app.project,
                    textures: &mut app.textures,
                    fonts: &mut app.fonts,
                    selection: app.selection,
                    view: app.canvas.view,
                    viewport,
                    show_grid: app.settings.show_grid,
                },
            );
            app.canvas.bounds = painted.bounds;
            app.canvas.scene_size = painted.scene_size;

            if app.canvas.fit_requested {
                app.canvas.fit_requested = false;
                app.canvas.view = ViewTransform::fit(painted.scene_size, viewport);
                ctx.request_repaint();
            }
        });
}

fn handle_view_input(app: &mut PillowApp, ui: &egui::Ui, response: &egui::Response, viewport: Rect) {
    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            let factor = if scroll > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            let anchor = response
                .hover_pos()
                .map(|pos| pos - viewport.min)
                .unwrap_or(viewport.size() / 2.0);
            app.canvas.view.zoom_about(anchor, factor);
        }
    }

    let panning = response.dragged_by(PointerButton::Middle)
        || (response.dragged_by(PointerButton::Primary) && app.canvas.drag.is_none());
    if panning {
        app.canvas.view.pan_by(response.drag_delta());
    }
}

fn handle_layer_input(app: &mut PillowApp, response: &egui::Response, viewport: Rect) {
    let view = app.canvas.view;
    let pointer = response
        .interact_pointer_pos()
        .map(|pos| view.to_canvas(viewport, pos));

    if response.clicked() {
        if let Some(point) = pointer {
            app.seal_edit();
            app.selection = pick(app, point);
        }
    }

    if response.drag_started_by(PointerButton::Primary) {
        let hit = pointer.and_then(|point| hit_test(&app.canvas.bounds, point).map(|id| (id, point)));
        if let Some((id, grab)) = hit {
            if let Some(start) = app.project.get_layer(id).map(|layer| layer.position) {
                app.seal_edit();
                app.selection = Selection::Layer(id);
                app.canvas.drag = Some(LayerDrag { id, grab, start });
            }
        }
    }

    if let (Some(drag), Some(point)) = (app.canvas.drag, pointer) {
        if response.dragged_by(PointerButton::Primary) {
            if let Some(mut layer) = app.project.get_layer(drag.id).cloned() {
                let (x, y) = drag.position_at(point);
                layer.set_position(x, y);
                app.update_layer(layer, true);
            }
        }
    }

    if response.drag_stopped() && app.canvas.drag.take().is_some() {
        app.seal_edit();
    }
}

/// What a click at `point` (canvas coordinates) selects
fn pick(app: &PillowApp, point: egui::Pos2) -> Selection {
    if let Some(id) = hit_test(&app.canvas.bounds, point) {
        return Selection::Layer(id);
    }
    let scene = Rect::from_min_size(egui::Pos2::ZERO, app.canvas.scene_size);
    if app.project.base_image.is_some() && scene.contains(point) {
        Selection::BaseImage
    } else {
        Selection::None
    }
}
