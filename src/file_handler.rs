use std::path::{Path, PathBuf};

use eframe::egui;

use crate::project_file::PROJECT_EXTENSION;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "gif", "webp"];

/// What a dropped file should turn into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    OpenProject(PathBuf),
    SetBaseImage(PathBuf),
    AddImageLayer(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroppedKind {
    Project,
    Image,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn is_image_path(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn classify(path: &Path) -> Option<DroppedKind> {
    match extension_of(path)?.as_str() {
        PROJECT_EXTENSION => Some(DroppedKind::Project),
        ext if IMAGE_EXTENSIONS.contains(&ext) => Some(DroppedKind::Image),
        _ => None,
    }
}

/// Turns dropped paths into actions. A project file wins over everything else;
/// otherwise the first image becomes the base image when there is none and the
/// rest become image layers.
pub fn plan_drops(paths: &[PathBuf], has_base_image: bool) -> Vec<DropAction> {
    if let Some(project) = paths
        .iter()
        .find(|path| classify(path) == Some(DroppedKind::Project))
    {
        return vec![DropAction::OpenProject(project.clone())];
    }

    let mut has_base = has_base_image;
    let mut actions = Vec::new();
    for path in paths {
        if classify(path) != Some(DroppedKind::Image) {
            log::warn!("Dropped file is not a supported type: {}", path.display());
            continue;
        }
        if has_base {
            actions.push(DropAction::AddImageLayer(path.clone()));
        } else {
            actions.push(DropAction::SetBaseImage(path.clone()));
            has_base = true;
        }
    }
    actions
}

#[derive(Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up newly dropped files from the UI context.
    /// Returns true if any new files were dropped.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });
        new_dropped_files
    }

    /// Consumes the dropped files and returns what to do with them
    pub fn process_dropped_files(&mut self, has_base_image: bool) -> Vec<DropAction> {
        let mut paths = Vec::new();
        for file in self.dropped_files.drain(..) {
            match file.path {
                Some(path) => paths.push(path),
                None => log::warn!("Dropped file has no path on disk: {}", file.name),
            }
        }
        plan_drops(&paths, has_base_image)
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => {
                        let hint = match classify(path) {
                            Some(DroppedKind::Project) => "open project",
                            Some(DroppedKind::Image) => "image",
                            None => "unsupported",
                        };
                        text += &format!("\n{} ({hint})", path.display());
                    }
                    None => text += "\n(Path not available)",
                }
            }
            text
        });

        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}
