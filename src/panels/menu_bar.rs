use eframe::egui;

use super::dialogs::{Dialog, PathPurpose, PendingAction};
use crate::PillowApp;

pub fn menu_bar(app: &mut PillowApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| file_menu(app, ui));
            ui.menu_button("Edit", |ui| edit_menu(app, ui));
            ui.menu_button("View", |ui| view_menu(app, ui));
            ui.menu_button("Code", |ui| {
                if ui.button("Generate").clicked() {
                    app.generate_code();
                    ui.close_menu();
                }
                let has_code = app.code.source.is_some();
                if ui.add_enabled(has_code, egui::Button::new("Copy to Clipboard")).clicked() {
                    app.copy_code(ui.ctx());
                    ui.close_menu();
                }
            });
        });
    });
}

fn file_menu(app: &mut PillowApp, ui: &mut egui::Ui) {
    if ui.add(egui::Button::new("New").shortcut_text("Ctrl+N")).clicked() {
        app.guard_unsaved(PendingAction::NewProject);
        ui.close_menu();
    }
    if ui.add(egui::Button::new("Open…").shortcut_text("Ctrl+O")).clicked() {
        app.guard_unsaved(PendingAction::PromptOpen);
        ui.close_menu();
    }
    ui.add_enabled_ui(!app.settings.recent_files.is_empty(), |ui| {
        ui.menu_button("Open Recent", |ui| {
            let mut chosen = None;
            for path in &app.settings.recent_files {
                if ui.button(path.display().to_string()).clicked() {
                    chosen = Some(path.clone());
                }
            }
            if let Some(path) = chosen {
                if path.is_file() {
                    app.guard_unsaved(PendingAction::OpenPath(path));
                } else {
                    app.status
                        .error(format!("Recent project is gone: {}", path.display()));
                    app.settings.forget_recent(&path);
                }
                ui.close_menu();
            }
        });
    });
    ui.separator();
    if ui.add(egui::Button::new("Save").shortcut_text("Ctrl+S")).clicked() {
        app.request_save();
        ui.close_menu();
    }
    if ui
        .add(egui::Button::new("Save As…").shortcut_text("Ctrl+Shift+S"))
        .clicked()
    {
        app.dialog = Some(Dialog::path_prompt(PathPurpose::SaveProjectAs, String::new()));
        ui.close_menu();
    }
    ui.separator();
    if ui.button("Set Base Image…").clicked() {
        app.dialog = Some(Dialog::path_prompt(PathPurpose::SetBaseImage, String::new()));
        ui.close_menu();
    }
    if ui
        .add_enabled(app.project.base_image.is_some(), egui::Button::new("Clear Base Image"))
        .clicked()
    {
        app.clear_base_image();
        ui.close_menu();
    }
    if ui.button("Save Python Code…").clicked() {
        let suggestion = format!("{}.py", app.project.function_name.trim());
        app.dialog = Some(Dialog::path_prompt(PathPurpose::SaveCode, suggestion));
        ui.close_menu();
    }
    ui.separator();
    if ui.button("Quit").clicked() {
        app.guard_unsaved(PendingAction::Quit);
        ui.close_menu();
    }
}

fn edit_menu(app: &mut PillowApp, ui: &mut egui::Ui) {
    let undo_text = match app.history.undo_labels().first() {
        Some(label) => format!("Undo {label}"),
        None => "Undo".to_owned(),
    };
    let redo_text = match app.history.redo_label() {
        Some(label) => format!("Redo {label}"),
        None => "Redo".to_owned(),
    };
    if ui
        .add_enabled(
            app.history.can_undo(),
            egui::Button::new(undo_text).shortcut_text("Ctrl+Z"),
        )
        .clicked()
    {
        app.undo();
        ui.close_menu();
    }
    if ui
        .add_enabled(
            app.history.can_redo(),
            egui::Button::new(redo_text).shortcut_text("Ctrl+Y"),
        )
        .clicked()
    {
        app.redo();
        ui.close_menu();
    }
    ui.separator();
    if ui.button("Add Text Layer").clicked() {
        app.add_text_layer();
        ui.close_menu();
    }
    if ui.button("Add Image Layer…").clicked() {
        app.dialog = Some(Dialog::path_prompt(PathPurpose::AddImageLayer, String::new()));
        ui.close_menu();
    }
    let has_selection = app.selection != crate::selection::Selection::None;
    if ui
        .add_enabled(has_selection, egui::Button::new("Delete Selected").shortcut_text("Del"))
        .clicked()
    {
        app.delete_selected();
        ui.close_menu();
    }
}

fn view_menu(app: &mut PillowApp, ui: &mut egui::Ui) {
    if ui.button("Fit to Window").clicked() {
        app.canvas.request_fit();
        ui.close_menu();
    }
    if ui.button("Reset View").clicked() {
        app.canvas.view.reset();
        ui.close_menu();
    }
    ui.checkbox(&mut app.settings.show_grid, "Show Grid");
}
