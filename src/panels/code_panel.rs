use eframe::egui;

use crate::PillowApp;
use crate::codegen::{self, DEFAULT_OUTPUT_PARAM};
use super::dialogs::{Dialog, PathPurpose};

/// Last generated code and whether the project changed since
#[derive(Debug, Default)]
pub struct CodeView {
    pub source: Option<String>,
    pub error: Option<String>,
    pub stale: bool,
    /// Function name being edited, committed on focus loss
    pub function_name_draft: Option<String>,
    pub project_name_draft: Option<String>,
}

pub fn code_panel(app: &mut PillowApp, ctx: &egui::Context) {
    egui::SidePanel::right("code_panel")
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.heading("Python Code");
            ui.separator();

            function_settings(app, ui);
            ui.separator();
            parameter_list(app, ui);
            ui.separator();

            if app.project.base_image.is_none() {
                ui.colored_label(
                    ui.visuals().warn_fg_color,
                    "No base image: the code draws on a blank canvas.",
                );
            }

            ui.horizontal(|ui| {
                if ui.button("Generate").clicked() {
                    app.generate_code();
                }
                let has_code = app.code.source.is_some();
                if ui.add_enabled(has_code, egui::Button::new("Copy")).clicked() {
                    app.copy_code(ui.ctx());
                }
                if ui.add_enabled(has_code, egui::Button::new("Save .py…")).clicked() {
                    let suggestion = format!("{}.py", app.project.function_name.trim());
                    app.dialog = Some(Dialog::path_prompt(PathPurpose::SaveCode, suggestion));
                }
                if app.code.stale && has_code {
                    ui.label("(out of date)");
                }
            });

            if let Some(error) = &app.code.error {
                ui.colored_label(ui.visuals().error_fg_color, error.as_str());
            }

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| match &app.code.source {
                    Some(source) => {
                        ui.add(
                            egui::TextEdit::multiline(&mut source.as_str())
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    }
                    None => {
                        ui.weak("Press Generate to produce the function.");
                    }
                });
        });
}

fn function_settings(app: &mut PillowApp, ui: &mut egui::Ui) {
    egui::Grid::new("function_settings")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Project name:");
            let draft = app
                .code
                .project_name_draft
                .get_or_insert_with(|| app.project.project_name.clone());
            let response = ui.text_edit_singleline(draft);
            if response.lost_focus() {
                if let Some(name) = app.code.project_name_draft.take() {
                    app.rename_project(name);
                }
            } else if !response.has_focus() {
                app.code.project_name_draft = None;
            }
            ui.end_row();

            ui.label("Function name:");
            let draft = app
                .code
                .function_name_draft
                .get_or_insert_with(|| app.project.function_name.clone());
            let response = ui.text_edit_singleline(draft);
            if response.lost_focus() {
                if let Some(name) = app.code.function_name_draft.take() {
                    app.set_function_name(name);
                }
            } else if !response.has_focus() {
                app.code.function_name_draft = None;
            }
            ui.end_row();

            ui.label("Output:");
            ui.horizontal(|ui| {
                let mut changed = false;
                changed |= ui
                    .radio_value(&mut app.settings.save_to_path, false, "Return image")
                    .changed();
                changed |= ui
                    .radio_value(&mut app.settings.save_to_path, true, "Save to path")
                    .changed();
                if changed {
                    app.code.stale = true;
                }
            });
            ui.end_row();

            if app.settings.save_to_path {
                ui.label("Output parameter:");
                if ui
                    .text_edit_singleline(&mut app.settings.output_param_name)
                    .changed()
                {
                    app.code.stale = true;
                }
                if app.settings.output_param_name.trim().is_empty() {
                    app.settings.output_param_name = DEFAULT_OUTPUT_PARAM.to_owned();
                }
                ui.end_row();
            }

            ui.label("Example block:");
            if ui
                .checkbox(&mut app.settings.include_example, "Include __main__ example")
                .changed()
            {
                app.code.stale = true;
            }
            ui.end_row();
        });
}

fn parameter_list(app: &PillowApp, ui: &mut egui::Ui) {
    ui.strong("Parameters");
    let options = app.settings.codegen_options(&app.project.function_name);
    match codegen::signature(&app.project, &options) {
        Ok(params) if params.is_empty() => {
            ui.weak("No parameters");
        }
        Ok(params) => {
            for (index, param) in params.iter().enumerate() {
                ui.label(format!(
                    "{}. {}: {}  ({})",
                    index + 1,
                    param.name,
                    param.kind.python_type(),
                    param.description
                ));
            }
        }
        Err(err) => {
            ui.colored_label(ui.visuals().error_fg_color, err.to_string());
        }
    }
}
