use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui;

use crate::canvas::CanvasState;
use crate::codegen;
use crate::command::{Command, CommandHistory};
use crate::event::{EventBus, ProjectEvent};
use crate::file_handler::{DropAction, FileHandler, is_image_path};
use crate::fonts::FontRegistry;
use crate::layer::{BaseImage, Layer, LayerId, LayerKind, Size};
use crate::panels::{self, CodeView, Dialog, PathPurpose, PendingAction, StatusLine};
use crate::params::ParamTarget;
use crate::project::Project;
use crate::project_file::{PROJECT_EXTENSION, ProjectManager};
use crate::selection::Selection;
use crate::settings::AppSettings;
use crate::texture_manager::TextureManager;

pub const APP_NAME: &str = "Pillow Generator";

/// Size given to image layers created from a file
pub const NEW_IMAGE_LAYER_SIZE: Size = Size {
    width: 200,
    height: 200,
};

/// Result of trying to save to the current project file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The project has never been saved; a path is needed
    NeedsPath,
    Failed,
}

pub struct PillowApp {
    pub project: Project,
    pub files: ProjectManager,
    pub history: CommandHistory,
    pub events: EventBus,
    pub settings: AppSettings,
    pub selection: Selection,
    pub canvas: CanvasState,
    pub code: CodeView,
    pub dialog: Option<Dialog>,
    pub status: StatusLine,
    pub(crate) textures: TextureManager,
    pub(crate) fonts: FontRegistry,
    file_handler: FileHandler,
    /// Set once the user agreed to close despite unsaved changes
    allow_close: bool,
    close_requested: bool,
    title: String,
}

impl PillowApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: AppSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let mut app = Self {
            project: Project::new(),
            files: ProjectManager::new(),
            history: CommandHistory::new(),
            events: EventBus::new(),
            settings,
            selection: Selection::None,
            canvas: CanvasState::default(),
            code: CodeView::default(),
            dialog: None,
            status: StatusLine::default(),
            textures: TextureManager::default(),
            fonts: FontRegistry::new(),
            file_handler: FileHandler::new(),
            allow_close: false,
            close_requested: false,
            title: String::new(),
        };
        app.reset_project();
        app
    }

    fn reset_project(&mut self) {
        self.project = self.files.new_project();
        self.project.function_name = self.settings.default_function_name.clone();
        self.files.set_baseline(&self.project);
        self.history.clear();
        self.selection = Selection::None;
        self.code = CodeView::default();
        self.textures.clear_cache();
    }

    pub fn is_modified(&self) -> bool {
        self.files.is_modified(&self.project)
    }

    pub fn window_title(&self) -> String {
        let name = self
            .files
            .display_name()
            .unwrap_or_else(|| self.project.project_name.clone());
        let modified = if self.is_modified() { "*" } else { "" };
        format!("{APP_NAME} - {name}{modified}")
    }

    // ---- commands

    /// Runs a command through the history; failures go to the status line
    pub fn execute(&mut self, command: Command) -> bool {
        match self.history.execute(command, &mut self.project) {
            Ok(event) => {
                self.events.emit(event);
                true
            }
            Err(err) => {
                self.status.error(err.to_string());
                false
            }
        }
    }

    /// Executes a step of an ongoing interaction, merged into one undo entry
    pub fn execute_coalesced(&mut self, command: Command) -> bool {
        match self.history.execute_coalesced(command, &mut self.project) {
            Ok(event) => {
                self.events.emit(event);
                true
            }
            Err(err) => {
                self.status.error(err.to_string());
                false
            }
        }
    }

    /// Ends the current interaction so the next edit starts a new undo entry
    pub fn seal_edit(&mut self) {
        self.history.seal();
    }

    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            return;
        }
        match self.history.undo(&mut self.project) {
            Ok(event) => self.events.emit(event),
            Err(err) => self.status.error(format!("Undo failed: {err}")),
        }
    }

    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            return;
        }
        match self.history.redo(&mut self.project) {
            Ok(event) => self.events.emit(event),
            Err(err) => self.status.error(format!("Redo failed: {err}")),
        }
    }

    /// Reacts to everything that happened to the project this frame
    pub fn process_events(&mut self) {
        for event in self.events.drain() {
            if event.touches_output() {
                self.code.stale = true;
            }
            match event {
                ProjectEvent::BaseImageChanged => self.canvas.request_fit(),
                ProjectEvent::ProjectLoaded { .. } | ProjectEvent::ProjectReset => {
                    self.canvas.request_fit();
                    self.code = CodeView::default();
                }
                _ => {}
            }
        }
        self.selection.fix_up(&self.project);
    }

    // ---- project files

    /// Runs `action` now, or after asking what to do with unsaved changes
    pub fn guard_unsaved(&mut self, action: PendingAction) {
        if self.is_modified() {
            self.dialog = Some(Dialog::UnsavedChanges { then: action });
        } else {
            self.perform(action);
        }
    }

    pub fn perform(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewProject => self.new_project(),
            PendingAction::PromptOpen => {
                self.dialog = Some(Dialog::path_prompt(PathPurpose::OpenProject, String::new()));
            }
            PendingAction::OpenPath(path) => self.open_project(&path),
            PendingAction::Quit => {
                self.allow_close = true;
                self.close_requested = true;
            }
        }
    }

    /// Saves, then continues with `action` (possibly after asking for a path)
    pub fn save_then(&mut self, action: PendingAction) {
        match self.save_project() {
            SaveOutcome::Saved => self.perform(action),
            SaveOutcome::NeedsPath => {
                self.dialog = Some(Dialog::PathPrompt {
                    purpose: PathPurpose::SaveProjectAs,
                    input: String::new(),
                    then: Some(action),
                });
            }
            SaveOutcome::Failed => {}
        }
    }

    pub fn new_project(&mut self) {
        self.reset_project();
        self.events.emit(ProjectEvent::ProjectReset);
        self.status.info("New project");
    }

    pub fn open_project(&mut self, path: &Path) {
        match self.files.open(path) {
            Ok(project) => {
                self.project = project;
                self.history.clear();
                self.textures.clear_cache();
                self.selection = Selection::None;
                self.settings.push_recent(path);
                self.events.emit(ProjectEvent::ProjectLoaded {
                    path: path.to_path_buf(),
                });
                self.status.info(format!("Opened {}", path.display()));
            }
            Err(err) => {
                let message = format!("Cannot open {}: {err}", path.display());
                self.status.error(message.clone());
                self.dialog = Some(Dialog::Error { message });
            }
        }
    }

    pub fn save_project(&mut self) -> SaveOutcome {
        match self.files.save(&self.project) {
            Ok(true) => {
                if let Some(path) = self.files.current_file().map(Path::to_path_buf) {
                    self.settings.push_recent(&path);
                    self.status.info(format!("Saved {}", path.display()));
                    self.events.emit(ProjectEvent::ProjectSaved { path });
                }
                SaveOutcome::Saved
            }
            Ok(false) => SaveOutcome::NeedsPath,
            Err(err) => {
                let message = format!("Cannot save project: {err}");
                self.status.error(message.clone());
                self.dialog = Some(Dialog::Error { message });
                SaveOutcome::Failed
            }
        }
    }

    /// Save, asking for a path when the project has none yet
    pub fn request_save(&mut self) {
        if self.save_project() == SaveOutcome::NeedsPath {
            self.dialog = Some(Dialog::path_prompt(PathPurpose::SaveProjectAs, String::new()));
        }
    }

    pub fn save_project_as(&mut self, path: &Path) -> bool {
        let mut path = path.to_path_buf();
        if path.extension().is_none() {
            path.set_extension(PROJECT_EXTENSION);
        }
        match self.files.save_as(&mut self.project, &path) {
            Ok(()) => {
                self.settings.push_recent(&path);
                self.status.info(format!("Saved {}", path.display()));
                self.events.emit(ProjectEvent::ProjectSaved { path });
                true
            }
            Err(err) => {
                let message = format!("Cannot save {}: {err}", path.display());
                self.status.error(message.clone());
                self.dialog = Some(Dialog::Error { message });
                false
            }
        }
    }

    /// Handles a path typed into the path prompt
    pub fn submit_path(&mut self, purpose: PathPurpose, path: PathBuf, then: Option<PendingAction>) {
        match purpose {
            PathPurpose::OpenProject => self.open_project(&path),
            PathPurpose::SaveProjectAs => {
                if self.save_project_as(&path) {
                    if let Some(action) = then {
                        self.perform(action);
                    }
                }
            }
            PathPurpose::SetBaseImage => self.set_base_image(path),
            PathPurpose::AddImageLayer => {
                self.add_image_layer(path);
            }
            PathPurpose::SaveCode => self.save_code(&path),
        }
    }

    // ---- editing

    fn check_image_file(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            self.status.error(format!("File not found: {}", path.display()));
            return false;
        }
        if !is_image_path(path) {
            self.status
                .error(format!("Not a supported image file: {}", path.display()));
            return false;
        }
        true
    }

    /// Pixel size of the composition: the base image's, else the canvas size
    pub fn scene_size(&self) -> (u32, u32) {
        self.project
            .base_image
            .as_ref()
            .and_then(|base| self.textures.dimensions(&base.image_path))
            .map(|[w, h]| (w, h))
            .unwrap_or((self.project.canvas_size.width, self.project.canvas_size.height))
    }

    /// Sets or replaces the base image, keeping its parameter binding
    pub fn set_base_image(&mut self, path: PathBuf) {
        if !self.check_image_file(&path) {
            return;
        }
        let path = std::path::absolute(&path).unwrap_or(path);
        self.textures.invalidate(&path);
        let mut base = BaseImage::new(path);
        if let Some(previous) = &self.project.base_image {
            base.path_param = previous.path_param.clone();
        }
        let name = base.name.clone();
        if self.execute(Command::set_base_image(&self.project, Some(base))) {
            self.selection = Selection::BaseImage;
            self.status.info(format!("Base image set: {name}"));
        }
    }

    pub fn clear_base_image(&mut self) {
        if self.project.base_image.is_some() {
            self.execute(Command::set_base_image(&self.project, None));
        }
    }

    /// Adds an image layer centered on the scene and selects it
    pub fn add_image_layer(&mut self, path: PathBuf) -> Option<LayerId> {
        if !self.check_image_file(&path) {
            return None;
        }
        let path = std::path::absolute(&path).unwrap_or(path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (w, h) = self.scene_size();
        let x = (w as i32 - NEW_IMAGE_LAYER_SIZE.width as i32) / 2;
        let y = (h as i32 - NEW_IMAGE_LAYER_SIZE.height as i32) / 2;
        let layer = Layer::new_image(&format!("Image - {file_name}"), Some(path), NEW_IMAGE_LAYER_SIZE)
            .with_position(x, y);
        self.add_layer(layer)
    }

    pub fn add_text_layer(&mut self) -> Option<LayerId> {
        let count = self.project.layers_by_kind(LayerKind::Text).count();
        let layer = Layer::new_text(&format!("Text {}", count + 1), "Sample text").with_position(20, 20);
        self.add_layer(layer)
    }

    fn add_layer(&mut self, layer: Layer) -> Option<LayerId> {
        let id = layer.id;
        let name = layer.name.clone();
        if self.execute(Command::add_layer(&self.project, layer)) {
            self.selection = Selection::Layer(id);
            self.status.info(format!("Added layer {name}"));
            Some(id)
        } else {
            None
        }
    }

    pub fn delete_layer(&mut self, id: LayerId) {
        match Command::remove_layer(&self.project, id) {
            Ok(command) => {
                self.execute(command);
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    pub fn delete_selected(&mut self) {
        match self.selection {
            Selection::Layer(id) => self.delete_layer(id),
            Selection::BaseImage => self.clear_base_image(),
            Selection::None => {}
        }
    }

    /// Moves a layer one step towards the top of the stack
    pub fn raise_layer(&mut self, id: LayerId) {
        if let Some(index) = self.project.index_of(id) {
            if index + 1 < self.project.layers().len() {
                self.move_layer(id, index + 1);
            }
        }
    }

    pub fn lower_layer(&mut self, id: LayerId) {
        if let Some(index) = self.project.index_of(id) {
            if index > 0 {
                self.move_layer(id, index - 1);
            }
        }
    }

    fn move_layer(&mut self, id: LayerId, to: usize) {
        match Command::move_layer(&self.project, id, to) {
            Ok(command) => {
                self.execute(command);
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    /// Inserts a copy directly above the layer and selects it
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let index = self.project.index_of(id)?;
        let copy = self.project.layers()[index].duplicate();
        let copy_id = copy.id;
        if self.execute(Command::AddLayer {
            index: index + 1,
            layer: copy,
        }) {
            self.selection = Selection::Layer(copy_id);
            Some(copy_id)
        } else {
            None
        }
    }

    /// Replaces a layer's attributes. `coalesce` merges into the ongoing edit.
    pub fn update_layer(&mut self, layer: Layer, coalesce: bool) {
        let Some(current) = self.project.get_layer(layer.id) else {
            return;
        };
        if *current == layer {
            return;
        }
        let old_font = current.as_text().and_then(|text| text.font_path.clone());
        if let Some(font) = layer.as_text().and_then(|text| text.font_path.as_deref()) {
            if old_font.as_deref() != Some(font) {
                self.fonts.retry(font);
            }
        }
        match Command::update_layer(&self.project, layer) {
            Ok(command) if coalesce => {
                self.execute_coalesced(command);
            }
            Ok(command) => {
                self.execute(command);
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    /// Edits the base image in place (name, parameter binding)
    pub fn update_base_image(&mut self, base: BaseImage, coalesce: bool) {
        if self.project.base_image.as_ref() == Some(&base) {
            return;
        }
        let command = Command::set_base_image(&self.project, Some(base));
        if coalesce {
            self.execute_coalesced(command);
        } else {
            self.execute(command);
        }
    }

    pub fn set_parameter(&mut self, target: ParamTarget, enabled: bool) {
        match Command::set_parameter(&self.project, target, enabled) {
            Ok(command) => {
                self.execute(command);
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    pub fn rename_project(&mut self, name: String) {
        let name = name.trim().to_owned();
        if !name.is_empty() && name != self.project.project_name {
            self.execute(Command::rename_project(&self.project, name));
        }
    }

    pub fn set_function_name(&mut self, name: String) {
        let name = name.trim().to_owned();
        if name != self.project.function_name {
            self.execute(Command::set_function_name(&self.project, name));
        }
    }

    pub fn handle_drops(&mut self, actions: Vec<DropAction>) {
        for action in actions {
            match action {
                DropAction::OpenProject(path) => self.guard_unsaved(PendingAction::OpenPath(path)),
                DropAction::SetBaseImage(path) => self.set_base_image(path),
                DropAction::AddImageLayer(path) => {
                    self.add_image_layer(path);
                }
            }
        }
    }

    // ---- code

    pub fn generate_code(&mut self) -> bool {
        let options = self.settings.codegen_options(&self.project.function_name);
        match codegen::generate(&self.project, &options) {
            Ok(source) => {
                self.code.source = Some(source);
                self.code.error = None;
                self.code.stale = false;
                self.status.info("Code generated");
                true
            }
            Err(err) => {
                self.code.error = Some(err.to_string());
                self.status.error(format!("Cannot generate code: {err}"));
                false
            }
        }
    }

    pub fn copy_code(&mut self, ctx: &egui::Context) {
        if let Some(source) = &self.code.source {
            ctx.copy_text(source.clone());
            self.status.info("Code copied to clipboard");
        }
    }

    pub fn save_code(&mut self, path: &Path) {
        if (self.code.source.is_none() || self.code.stale) && !self.generate_code() {
            return;
        }
        let Some(source) = &self.code.source else {
            return;
        };
        match fs::write(path, source) {
            Ok(()) => self.status.info(format!("Code saved to {}", path.display())),
            Err(err) => {
                let message = format!("Cannot write {}: {err}", path.display());
                self.status.error(message.clone());
                self.dialog = Some(Dialog::Error { message });
            }
        }
    }

    // ---- input

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, KeyboardShortcut, Modifiers};

        let shortcut = |modifiers: Modifiers, key: Key| {
            ctx.input_mut(|i| i.consume_shortcut(&KeyboardShortcut::new(modifiers, key)))
        };
        let command_shift = Modifiers::COMMAND | Modifiers::SHIFT;

        if shortcut(command_shift, Key::S) {
            self.dialog = Some(Dialog::path_prompt(PathPurpose::SaveProjectAs, String::new()));
        } else if shortcut(Modifiers::COMMAND, Key::S) {
            self.request_save();
        } else if shortcut(Modifiers::COMMAND, Key::N) {
            self.guard_unsaved(PendingAction::NewProject);
        } else if shortcut(Modifiers::COMMAND, Key::O) {
            self.guard_unsaved(PendingAction::PromptOpen);
        } else if shortcut(command_shift, Key::Z) || shortcut(Modifiers::COMMAND, Key::Y) {
            self.redo();
        } else if shortcut(Modifiers::COMMAND, Key::Z) {
            self.undo();
        }

        let typing = ctx.memory(|m| m.focused().is_some());
        if !typing && ctx.input(|i| i.key_pressed(Key::Delete)) {
            self.delete_selected();
        }
    }

    fn handle_close(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.allow_close && self.is_modified() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            if self.dialog.is_none() {
                self.dialog = Some(Dialog::UnsavedChanges {
                    then: PendingAction::Quit,
                });
            }
        }
        if self.close_requested {
            self.close_requested = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for PillowApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        self.fonts.install(ctx);
        self.handle_close(ctx);

        if self.dialog.is_none() {
            self.handle_shortcuts(ctx);
        }
        if self.file_handler.check_for_dropped_files(ctx) {
            let actions = self
                .file_handler
                .process_dropped_files(self.project.base_image.is_some());
            self.handle_drops(actions);
        }

        panels::menu_bar(self, ctx);
        panels::status_bar(self, ctx);
        panels::layers_side_panel(self, ctx);
        panels::code_panel(self, ctx);
        panels::central_panel(self, ctx);
        panels::dialogs(self, ctx);
        self.file_handler.preview_files_being_dropped(ctx);

        self.process_events();

        let title = self.window_title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_app_is_unmodified_and_uses_default_function_name() {
        let settings = AppSettings {
            default_function_name: "make_card".into(),
            ..AppSettings::default()
        };
        let app = PillowApp::with_settings(settings);
        assert!(!app.is_modified());
        assert_eq!(app.project.function_name, "make_card");
        assert_eq!(app.window_title(), "Pillow Generator - Untitled");
    }

    #[test]
    fn text_layer_edits_are_undoable() {
        let mut app = PillowApp::with_settings(AppSettings::default());
        let id = app.add_text_layer().unwrap();
        assert_eq!(app.selection, Selection::Layer(id));
        assert!(app.is_modified());

        let mut edited = app.project.get_layer(id).unwrap().clone();
        edited.as_text_mut().unwrap().text = "Hello".into();
        app.update_layer(edited, false);
        assert_eq!(app.project.get_layer(id).unwrap().as_text().unwrap().text, "Hello");

        app.undo();
        assert_eq!(app.project.get_layer(id).unwrap().as_text().unwrap().text, "Sample text");
        app.undo();
        app.process_events();
        assert!(app.project.layers().is_empty());
        assert_eq!(app.selection, Selection::None);
        assert!(!app.is_modified());
    }

    #[test]
    fn base_image_name_typing_is_one_undo_step() {
        let mut app = PillowApp::with_settings(AppSettings::default());
        app.project.set_base_image(BaseImage::new("/img/bg.png".into()));
        app.files.set_baseline(&app.project);

        for name in ["C", "Co", "Cover"] {
            let mut base = app.project.base_image.clone().unwrap();
            base.name = name.to_owned();
            app.update_base_image(base, true);
        }
        app.seal_edit();
        assert_eq!(app.history.undo_labels().len(), 1);

        app.undo();
        assert_eq!(app.project.base_image.as_ref().unwrap().name, "Base - bg.png");
        assert!(!app.is_modified());
    }

    #[test]
    fn missing_image_is_reported_not_added() {
        let mut app = PillowApp::with_settings(AppSettings::default());
        assert!(app.add_image_layer("/definitely/not/here.png".into()).is_none());
        assert!(app.project.layers().is_empty());
        assert!(app.status.current().is_some());
    }

    #[test]
    fn unsaved_changes_prompt_before_new_project() {
        let mut app = PillowApp::with_settings(AppSettings::default());
        app.add_text_layer();
        app.guard_unsaved(PendingAction::NewProject);
        assert_eq!(
            app.dialog,
            Some(Dialog::UnsavedChanges {
                then: PendingAction::NewProject
            })
        );

        app.dialog = None;
        app.perform(PendingAction::NewProject);
        assert!(app.project.layers().is_empty());
        assert!(!app.history.can_undo());
    }

    #[test]
    fn save_without_file_asks_for_path() {
        let mut app = PillowApp::with_settings(AppSettings::default());
        app.save_then(PendingAction::Quit);
        assert!(matches!(
            app.dialog,
            Some(Dialog::PathPrompt {
                purpose: PathPurpose::SaveProjectAs,
                then: Some(PendingAction::Quit),
                ..
            })
        ));
    }
}
