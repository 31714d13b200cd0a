use std::path::PathBuf;

use eframe::egui;

use crate::PillowApp;

/// What a typed path is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPurpose {
    OpenProject,
    SaveProjectAs,
    SetBaseImage,
    AddImageLayer,
    SaveCode,
}

impl PathPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            PathPurpose::OpenProject => "Open Project",
            PathPurpose::SaveProjectAs => "Save Project As",
            PathPurpose::SetBaseImage => "Set Base Image",
            PathPurpose::AddImageLayer => "Add Image Layer",
            PathPurpose::SaveCode => "Save Python Code",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            PathPurpose::OpenProject | PathPurpose::SaveProjectAs => "/path/to/project.pgp",
            PathPurpose::SetBaseImage | PathPurpose::AddImageLayer => "/path/to/image.png",
            PathPurpose::SaveCode => "/path/to/generate_image.py",
        }
    }
}

/// Action deferred behind the unsaved-changes prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    NewProject,
    /// Ask for a project path, then open it
    PromptOpen,
    OpenPath(PathBuf),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    PathPrompt {
        purpose: PathPurpose,
        input: String,
        /// Runs after a successful Save As started from the unsaved prompt
        then: Option<PendingAction>,
    },
    UnsavedChanges { then: PendingAction },
    Error { message: String },
}

impl Dialog {
    pub fn path_prompt(purpose: PathPurpose, input: String) -> Self {
        Dialog::PathPrompt {
            purpose,
            input,
            then: None,
        }
    }
}

enum Outcome {
    Keep,
    Close,
    SubmitPath(PathPurpose, PathBuf, Option<PendingAction>),
    SaveThen(PendingAction),
    DiscardThen(PendingAction),
}

/// Shows the open modal dialog, if any
pub fn dialogs(app: &mut PillowApp, ctx: &egui::Context) {
    let Some(dialog) = app.dialog.as_mut() else {
        return;
    };
    let mut outcome = Outcome::Keep;

    match dialog {
        Dialog::PathPrompt {
            purpose,
            input,
            then,
        } => {
            let mut open = true;
            egui::Window::new(purpose.title())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label("Path:");
                    let response = ui.add(
                        egui::TextEdit::singleline(input)
                            .hint_text(purpose.hint())
                            .desired_width(420.0),
                    );
                    response.request_focus();
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    ui.horizontal(|ui| {
                        let ok = ui
                            .add_enabled(!input.trim().is_empty(), egui::Button::new("OK"))
                            .clicked();
                        if (ok || submitted) && !input.trim().is_empty() {
                            outcome = Outcome::SubmitPath(
                                *purpose,
                                PathBuf::from(input.trim()),
                                then.clone(),
                            );
                        }
                        if ui.button("Cancel").clicked() {
                            outcome = Outcome::Close;
                        }
                    });
                });
            if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                outcome = Outcome::Close;
            }
        }
        Dialog::UnsavedChanges { then } => {
            egui::Window::new("Unsaved Changes")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("The current project has unsaved changes. Save them?");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            outcome = Outcome::SaveThen(then.clone());
                        }
                        if ui.button("Discard").clicked() {
                            outcome = Outcome::DiscardThen(then.clone());
                        }
                        if ui.button("Cancel").clicked() {
                            outcome = Outcome::Close;
                        }
                    });
                });
        }
        Dialog::Error { message } => {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message.as_str());
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        outcome = Outcome::Close;
                    }
                });
        }
    }

    match outcome {
        Outcome::Keep => {}
        Outcome::Close => app.dialog = None,
        Outcome::SubmitPath(purpose, path, then) => {
            app.dialog = None;
            app.submit_path(purpose, path, then);
        }
        Outcome::SaveThen(action) => {
            app.dialog = None;
            app.save_then(action);
        }
        Outcome::DiscardThen(action) => {
            app.dialog = None;
            app.perform(action);
        }
    }
}
