use std::path::PathBuf;

use eframe::egui;

use super::dialogs::{Dialog, PathPurpose};
use crate::PillowApp;
use crate::codegen::python::{is_identifier, is_keyword};
use crate::layer::{
    HorizontalAlign, ImageLayer, Layer, LayerContent, LayerId, MAX_FONT_SIZE, MAX_LAYER_EXTENT,
    MIN_FONT_SIZE, POSITION_LIMIT, ParamBinding, TextLayer, VerticalAlign,
};
use crate::params::ParamTarget;
use crate::selection::Selection;

/// Collected while drawing, applied once the working copy is released
#[derive(Default)]
struct Edits {
    toggle: Option<(ParamTarget, bool)>,
    /// A widget finished its interaction this frame
    finished: bool,
}

impl Edits {
    fn track(&mut self, response: &egui::Response) {
        if response.drag_stopped() || response.lost_focus() {
            self.finished = true;
        }
    }
}

/// Editor for whatever is selected
pub fn property_panel(app: &mut PillowApp, ui: &mut egui::Ui) {
    ui.heading("Properties");
    match app.selection {
        Selection::None => {
            ui.weak("Select a layer to edit it.");
        }
        Selection::BaseImage => base_image_properties(app, ui),
        Selection::Layer(id) => {
            let Some(original) = app.project.get_layer(id).cloned() else {
                return;
            };
            let mut layer = original.clone();
            let mut edits = Edits::default();
            layer_properties(&mut layer, ui, &mut edits);

            if let Some((target, enabled)) = edits.toggle {
                app.seal_edit();
                app.set_parameter(target, enabled);
            } else if layer != original {
                app.update_layer(layer, true);
            }
            if edits.finished {
                app.seal_edit();
            }
        }
    }
}

fn base_image_properties(app: &mut PillowApp, ui: &mut egui::Ui) {
    let Some(original) = app.project.base_image.clone() else {
        return;
    };
    let mut base = original.clone();
    let mut edits = Edits::default();

    egui::Grid::new("base_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Name:");
            edits.track(&ui.text_edit_singleline(&mut base.name));
            ui.end_row();

            ui.label("File:");
            ui.label(base.image_path.display().to_string());
            ui.end_row();

            if let Some([w, h]) = app.textures.dimensions(&base.image_path) {
                ui.label("Size:");
                ui.label(format!("{w} × {h}"));
                ui.end_row();
            }
        });

    if ui.button("Replace…").clicked() {
        app.dialog = Some(Dialog::path_prompt(
            PathPurpose::SetBaseImage,
            base.image_path.display().to_string(),
        ));
    }
    ui.separator();
    param_editor(
        ui,
        "Path as parameter",
        &mut base.path_param,
        ParamTarget::BaseImagePath,
        &mut edits,
    );

    if let Some((target, enabled)) = edits.toggle {
        app.seal_edit();
        app.set_parameter(target, enabled);
    } else if base != original {
        app.update_base_image(base, true);
    }
    if edits.finished {
        app.seal_edit();
    }
}

fn layer_properties(layer: &mut Layer, ui: &mut egui::Ui, edits: &mut Edits) {
    egui::Grid::new("layer_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Name:");
            edits.track(&ui.text_edit_singleline(&mut layer.name));
            ui.end_row();

            ui.label("Visible:");
            ui.checkbox(&mut layer.visible, "");
            ui.end_row();

            ui.label("Position:");
            ui.horizontal(|ui| {
                let (mut x, mut y) = (layer.position.x, layer.position.y);
                let range = -POSITION_LIMIT..=POSITION_LIMIT;
                edits.track(&ui.add(egui::DragValue::new(&mut x).range(range.clone()).prefix("x ")));
                edits.track(&ui.add(egui::DragValue::new(&mut y).range(range).prefix("y ")));
                layer.set_position(x, y);
            });
            ui.end_row();
        });
    ui.separator();

    let id = layer.id;
    match &mut layer.content {
        LayerContent::Image(image) => image_properties(image, id, ui, edits),
        LayerContent::Text(text) => text_properties(text, id, ui, edits),
    }
}

fn image_properties(
    image: &mut ImageLayer,
    id: LayerId,
    ui: &mut egui::Ui,
    edits: &mut Edits,
) {
    egui::Grid::new("image_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Image file:");
            optional_path_edit(
                ui,
                (id, "image_path"),
                &mut image.image_path,
                "/path/to/image.png",
                edits,
            );
            ui.end_row();

            ui.label("Size:");
            ui.horizontal(|ui| {
                let (mut w, mut h) = (image.size.width, image.size.height);
                let range = 1..=MAX_LAYER_EXTENT;
                edits.track(&ui.add(egui::DragValue::new(&mut w).range(range.clone()).prefix("w ")));
                edits.track(&ui.add(egui::DragValue::new(&mut h).range(range).prefix("h ")));
                image.set_size(w, h);
            });
            ui.end_row();

            ui.label("Rotation:");
            let mut rotation = image.rotation;
            edits.track(&ui.add(egui::Slider::new(&mut rotation, -360.0..=360.0).suffix("°")));
            image.set_rotation(rotation);
            ui.end_row();

            ui.label("Opacity:");
            let mut percent = (image.opacity * 100.0).round();
            let response = ui.add(egui::Slider::new(&mut percent, 0.0..=100.0).suffix(" %"));
            edits.track(&response);
            if response.changed() {
                image.set_opacity(percent / 100.0);
            }
            ui.end_row();
        });
    ui.separator();
    param_editor(
        ui,
        "Image path as parameter",
        &mut image.path_param,
        ParamTarget::ImagePath(id),
        edits,
    );
}

fn text_properties(text: &mut TextLayer, id: LayerId, ui: &mut egui::Ui, edits: &mut Edits) {
    ui.label("Text:");
    edits.track(&ui.add(
        egui::TextEdit::multiline(&mut text.text)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    ));

    egui::Grid::new("text_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Font file:");
            optional_path_edit(ui, (id, "font_path"), &mut text.font_path, "default font", edits);
            ui.end_row();

            ui.label("Font size:");
            let mut size = text.font_size;
            edits.track(&ui.add(egui::DragValue::new(&mut size).range(MIN_FONT_SIZE..=MAX_FONT_SIZE)));
            text.set_font_size(size);
            ui.end_row();

            ui.label("Color:");
            edits.track(&ui.color_edit_button_srgba_unmultiplied(&mut text.color.0));
            ui.end_row();

            ui.label("Horizontal:");
            ui.horizontal(|ui| {
                for align in HorizontalAlign::ALL {
                    ui.selectable_value(&mut text.horizontal_align, align, align.label());
                }
            });
            ui.end_row();

            ui.label("Vertical:");
            ui.horizontal(|ui| {
                for align in VerticalAlign::ALL {
                    ui.selectable_value(&mut text.vertical_align, align, align.label());
                }
            });
            ui.end_row();
        });
    ui.separator();
    param_editor(ui, "Text as parameter", &mut text.text_param, ParamTarget::Text(id), edits);
    param_editor(
        ui,
        "Font path as parameter",
        &mut text.font_param,
        ParamTarget::FontPath(id),
        edits,
    );
}

/// Path field that keeps the typed text while focused and commits it as an
/// absolute path once the field loses focus
fn optional_path_edit(
    ui: &mut egui::Ui,
    id_salt: (LayerId, &str),
    path: &mut Option<PathBuf>,
    hint: &str,
    edits: &mut Edits,
) {
    let id = ui.make_persistent_id(id_salt);
    let mut input = ui.data_mut(|data| data.get_temp::<String>(id)).unwrap_or_else(|| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    });
    let response = ui.add(egui::TextEdit::singleline(&mut input).id(id).hint_text(hint));
    edits.track(&response);
    if response.lost_focus() {
        ui.data_mut(|data| data.remove::<String>(id));
        *path = resolve_typed_path(&input);
    } else if response.has_focus() {
        ui.data_mut(|data| data.insert_temp(id, input));
    }
}

/// Trimmed and made absolute against the working directory; blank means unset
fn resolve_typed_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let path = PathBuf::from(trimmed);
    Some(std::path::absolute(&path).unwrap_or(path))
}

/// Checkbox that promotes an attribute to an argument, plus its name
fn param_editor(
    ui: &mut egui::Ui,
    label: &str,
    binding: &mut ParamBinding,
    target: ParamTarget,
    edits: &mut Edits,
) {
    let mut enabled = binding.enabled;
    if ui.checkbox(&mut enabled, label).changed() {
        edits.toggle = Some((target, enabled));
    }
    if binding.enabled {
        ui.horizontal(|ui| {
            ui.label("Name:");
            edits.track(&ui.text_edit_singleline(&mut binding.name));
        });
        let name = binding.name.trim();
        if !is_identifier(name) || is_keyword(name) {
            ui.colored_label(
                ui.visuals().error_fg_color,
                "Not a valid Python identifier",
            );
        }
    }
}
