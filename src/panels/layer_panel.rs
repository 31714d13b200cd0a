use eframe::egui;

use super::dialogs::{Dialog, PathPurpose};
use crate::PillowApp;
use crate::layer::{LayerId, LayerKind};
use crate::selection::Selection;

enum RowAction {
    Select(Selection),
    SetVisible(LayerId, bool),
}

/// Layer stack, top-most first, with the base image pinned at the bottom
pub fn layer_panel(app: &mut PillowApp, ui: &mut egui::Ui) {
    ui.heading("Layers");

    ui.horizontal(|ui| {
        if ui.button("+ Image").clicked() {
            app.dialog = Some(Dialog::path_prompt(PathPurpose::AddImageLayer, String::new()));
        }
        if ui.button("+ Text").clicked() {
            app.add_text_layer();
        }
    });

    let selected = app.selection.layer_id();
    ui.horizontal(|ui| {
        let index = selected.and_then(|id| app.project.index_of(id));
        let count = app.project.layers().len();
        let can_raise = index.is_some_and(|i| i + 1 < count);
        let can_lower = index.is_some_and(|i| i > 0);

        if ui.add_enabled(can_raise, egui::Button::new("Up")).clicked() {
            if let Some(id) = selected {
                app.raise_layer(id);
            }
        }
        if ui.add_enabled(can_lower, egui::Button::new("Down")).clicked() {
            if let Some(id) = selected {
                app.lower_layer(id);
            }
        }
        if ui.add_enabled(selected.is_some(), egui::Button::new("Duplicate")).clicked() {
            if let Some(id) = selected {
                app.duplicate_layer(id);
            }
        }
        let deletable = app.selection != Selection::None;
        if ui.add_enabled(deletable, egui::Button::new("Delete")).clicked() {
            app.delete_selected();
        }
    });
    ui.separator();

    let mut action = None;
    egui::ScrollArea::vertical()
        .id_salt("layer_list")
        .max_height(260.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for layer in app.project.layers().iter().rev() {
                ui.horizontal(|ui| {
                    let mut visible = layer.visible;
                    if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
                        action = Some(RowAction::SetVisible(layer.id, visible));
                    }
                    let icon = match layer.kind() {
                        LayerKind::Image => "🖼",
                        LayerKind::Text => "T",
                    };
                    let is_selected = app.selection == Selection::Layer(layer.id);
                    let label = format!("{icon}  {}", layer.name);
                    if ui.selectable_label(is_selected, label).clicked() {
                        action = Some(RowAction::Select(Selection::Layer(layer.id)));
                    }
                });
            }

            ui.separator();
            match &app.project.base_image {
                Some(base) => {
                    let is_selected = app.selection == Selection::BaseImage;
                    if ui.selectable_label(is_selected, base.name.as_str()).clicked() {
                        action = Some(RowAction::Select(Selection::BaseImage));
                    }
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.weak("No base image");
                        if ui.small_button("Set…").clicked() {
                            app.dialog =
                                Some(Dialog::path_prompt(PathPurpose::SetBaseImage, String::new()));
                        }
                    });
                }
            }
        });

    match action {
        Some(RowAction::Select(selection)) => {
            app.seal_edit();
            app.selection = selection;
        }
        Some(RowAction::SetVisible(id, visible)) => {
            if let Some(mut layer) = app.project.get_layer(id).cloned() {
                layer.visible = visible;
                app.update_layer(layer, false);
            }
        }
        None => {}
    }
}
