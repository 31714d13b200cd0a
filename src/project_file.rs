//! Saving and loading `.pgp` project files.
//!
//! Paths are written relative to the directory holding the project file so a
//! project can be moved together with its assets, and resolved back to
//! absolute paths on load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ProjectFileError, ProjectFileResult};
use crate::project::Project;

pub const FORMAT_VERSION: &str = "1.0.0";
pub const SUPPORTED_MAJOR: u64 = 1;
pub const PROJECT_EXTENSION: &str = "pgp";

#[derive(Serialize)]
struct ProjectFileOut<'a> {
    version: &'a str,
    #[serde(flatten)]
    project: &'a Project,
}

#[derive(Deserialize)]
struct ProjectFileIn {
    #[serde(default)]
    version: Option<String>,
    #[serde(flatten)]
    project: Project,
}

/// Directory the project's relative paths are anchored to
fn anchor_dir(file_path: &Path) -> ProjectFileResult<PathBuf> {
    let dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    std::path::absolute(dir).map_err(|e| ProjectFileError::io(dir, e))
}

/// Serializes the project to pretty JSON with paths relative to `file_path`'s directory.
pub fn to_json(project: &Project, file_path: &Path) -> ProjectFileResult<String> {
    let base = anchor_dir(file_path)?;
    let mut stored = project.clone();
    let mut invalid = None;
    stored.map_paths(|path| {
        let relative = relative_path(path, &base);
        if relative.to_str().is_none() {
            invalid.get_or_insert_with(|| path.to_path_buf());
        }
        relative
    });
    if let Some(path) = invalid {
        return Err(ProjectFileError::InvalidPath(path));
    }
    let out = ProjectFileOut {
        version: FORMAT_VERSION,
        project: &stored,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Parses project JSON, resolving relative paths against `file_path`'s directory.
pub fn from_json(json: &str, file_path: &Path) -> ProjectFileResult<Project> {
    let mut value: Value = serde_json::from_str(json)?;
    nest_flat_bindings(&mut value);
    let parsed: ProjectFileIn = serde_json::from_value(value)?;
    if let Some(version) = &parsed.version {
        check_version(version)?;
    }
    let base = anchor_dir(file_path)?;
    let mut project = parsed.project;
    project.normalize();
    project.map_paths(|path| absolute_path(path, &base));
    repair_param_order(&mut project);
    Ok(project)
}

pub fn save_project(project: &Project, file_path: &Path) -> ProjectFileResult<()> {
    let json = to_json(project, file_path)?;
    fs::write(file_path, json).map_err(|e| ProjectFileError::io(file_path, e))?;
    log::info!("Saved project to {}", file_path.display());
    Ok(())
}

pub fn load_project(file_path: &Path) -> ProjectFileResult<Project> {
    let json = fs::read_to_string(file_path).map_err(|e| ProjectFileError::io(file_path, e))?;
    let project = from_json(&json, file_path)?;
    log::info!(
        "Loaded project {} ({} layers)",
        file_path.display(),
        project.layers().len()
    );
    Ok(project)
}

fn check_version(version: &str) -> ProjectFileResult<()> {
    let major = version
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u64>().ok());
    match major {
        Some(major) if major <= SUPPORTED_MAJOR => Ok(()),
        _ => Err(ProjectFileError::UnsupportedVersion {
            found: version.to_owned(),
            supported: SUPPORTED_MAJOR,
        }),
    }
}

/// Older 1.x files keep parameter bindings as flat keys on each layer
/// (`is_text_parameter` + `text_parameter_name` and so on). Rewrites them into
/// the nested binding objects.
fn nest_flat_bindings(value: &mut Value) {
    if let Some(base) = value.get_mut("base_image").and_then(Value::as_object_mut) {
        nest_binding(base, "is_path_parameter", "parameter_name", "path_param", "base_image_path");
    }
    let Some(layers) = value.get_mut("layers").and_then(Value::as_array_mut) else {
        return;
    };
    for layer in layers.iter_mut().filter_map(Value::as_object_mut) {
        nest_binding(layer, "is_path_parameter", "parameter_name", "path_param", "image_path");
        nest_binding(layer, "is_text_parameter", "text_parameter_name", "text_param", "text");
        nest_binding(layer, "is_font_parameter", "font_parameter_name", "font_param", "font_path");
    }
}

fn nest_binding(
    object: &mut Map<String, Value>,
    flag_key: &str,
    name_key: &str,
    nested_key: &str,
    default_name: &str,
) {
    let enabled = object.remove(flag_key);
    let name = object.remove(name_key);
    if object.contains_key(nested_key) || (enabled.is_none() && name.is_none()) {
        return;
    }
    let mut binding = Map::new();
    binding.insert("enabled".to_owned(), enabled.unwrap_or(Value::Bool(false)));
    binding.insert(
        "name".to_owned(),
        name.unwrap_or_else(|| Value::String(default_name.to_owned())),
    );
    object.insert(nested_key.to_owned(), Value::Object(binding));
}

/// Files written by hand may lack order stamps; keep the counter ahead of every stamp.
fn repair_param_order(project: &mut Project) {
    let mut highest = 0;
    for param in crate::params::collect_parameters(project) {
        highest = highest.max(param.order);
    }
    if project.next_param_order <= highest {
        project.next_param_order = highest + 1;
    }
}

/// `target` expressed relative to the directory `base`. Paths that are already
/// relative, or that share no root with `base` (another drive), are returned as-is.
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    if !target.is_absolute() || !base.is_absolute() {
        return target.to_path_buf();
    }
    let target = normalize_lexically(target);
    let base = normalize_lexically(base);
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    if target_parts.first() != base_parts.first() {
        return target.to_path_buf();
    }

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// `path` resolved against `base` when relative, with `.` and `..` folded away.
pub fn absolute_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Tracks which file the open project belongs to and whether it changed since.
#[derive(Debug, Default)]
pub struct ProjectManager {
    current_file: Option<PathBuf>,
    saved_snapshot: Option<Project>,
}

impl ProjectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Starts a fresh, unsaved project
    pub fn new_project(&mut self) -> Project {
        self.current_file = None;
        self.saved_snapshot = None;
        Project::new()
    }

    /// Loads `path`; the project takes its name from the file stem.
    pub fn open(&mut self, path: &Path) -> ProjectFileResult<Project> {
        let mut project = load_project(path)?;
        if let Some(stem) = file_stem(path) {
            project.project_name = stem;
        }
        self.current_file = Some(path.to_path_buf());
        self.saved_snapshot = Some(project.clone());
        Ok(project)
    }

    /// Saves to the current file. Returns `Ok(false)` when there is none yet.
    pub fn save(&mut self, project: &Project) -> ProjectFileResult<bool> {
        let Some(path) = self.current_file.clone() else {
            return Ok(false);
        };
        save_project(project, &path)?;
        self.saved_snapshot = Some(project.clone());
        Ok(true)
    }

    /// Saves under a new path and renames the project after the file stem.
    pub fn save_as(&mut self, project: &mut Project, path: &Path) -> ProjectFileResult<()> {
        if let Some(stem) = file_stem(path) {
            project.project_name = stem;
        }
        save_project(project, path)?;
        self.current_file = Some(path.to_path_buf());
        self.saved_snapshot = Some(project.clone());
        Ok(())
    }

    /// Records `project` as the unmodified state without writing it
    pub fn set_baseline(&mut self, project: &Project) {
        self.saved_snapshot = Some(project.clone());
    }

    pub fn is_modified(&self, project: &Project) -> bool {
        match &self.saved_snapshot {
            Some(saved) => saved != project,
            None => *project != Project::default(),
        }
    }

    pub fn display_name(&self) -> Option<String> {
        self.current_file
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_walks_up_and_down() {
        let base = Path::new("/work/projects/card");
        assert_eq!(
            relative_path(Path::new("/work/projects/card/img/logo.png"), base),
            PathBuf::from("img/logo.png")
        );
        assert_eq!(
            relative_path(Path::new("/work/assets/bg.png"), base),
            PathBuf::from("../../assets/bg.png")
        );
        assert_eq!(
            relative_path(Path::new("fonts/a.ttf"), base),
            PathBuf::from("fonts/a.ttf")
        );
    }

    #[test]
    fn absolute_path_folds_dots() {
        let base = Path::new("/work/projects/card");
        assert_eq!(
            absolute_path(Path::new("../../assets/./bg.png"), base),
            PathBuf::from("/work/assets/bg.png")
        );
        assert_eq!(
            absolute_path(Path::new("/abs/x.png"), base),
            PathBuf::from("/abs/x.png")
        );
    }

    #[test]
    fn newer_major_version_is_rejected() {
        assert!(check_version("1.0.0").is_ok());
        assert!(check_version("0.9").is_ok());
        assert!(matches!(
            check_version("2.0.0"),
            Err(ProjectFileError::UnsupportedVersion { .. })
        ));
        assert!(check_version("garbage").is_err());
    }

    #[test]
    fn hand_written_file_without_stamps_gets_counter_repaired() {
        let json = r#"{
            "project_name": "card",
            "layers": [{
                "id": "0b6a3c8e-96b8-4b8a-a7a2-6f1a2b3c4d5e",
                "name": "Title",
                "layer_type": "text",
                "text": "Hi",
                "text_param": { "enabled": true, "name": "title", "order": 7 }
            }]
        }"#;
        let project = from_json(json, Path::new("/tmp/card.pgp")).unwrap();
        assert_eq!(project.next_param_order, 8);
        assert_eq!(project.function_name, crate::project::DEFAULT_FUNCTION_NAME);
    }

    /// A 1.0.0 file with flat binding keys and empty strings for unset paths
    const FLAT_LAYOUT: &str = r#"{
        "version": "1.0.0",
        "project_name": "card",
        "function_name": "make_card",
        "base_image": {
            "id": "5d7f0c2a-1b1e-4d8e-9a55-2f0e1c3b4a69",
            "name": "Base - bg.png",
            "visible": true,
            "layer_type": "base",
            "position": { "x": 0, "y": 0 },
            "image_path": "bg.png",
            "is_path_parameter": true,
            "parameter_name": "background"
        },
        "layers": [
            {
                "id": "0b6a3c8e-96b8-4b8a-a7a2-6f1a2b3c4d5e",
                "name": "Title",
                "visible": true,
                "layer_type": "text",
                "position": { "x": 10, "y": 20 },
                "text": "Hello",
                "font_path": "",
                "font_size": 32,
                "color": [255, 0, 0, 255],
                "horizontal_align": "center",
                "vertical_align": "middle",
                "is_text_parameter": true,
                "text_parameter_name": "title",
                "is_font_parameter": false,
                "font_parameter_name": "font_path"
            },
            {
                "id": "9c1e7a44-2f3b-4c6d-8e9f-0a1b2c3d4e5f",
                "name": "Logo",
                "visible": true,
                "layer_type": "image",
                "position": { "x": 0, "y": 0 },
                "image_path": "",
                "size": { "width": 64, "height": 64 },
                "rotation": 0.0,
                "opacity": 1.0,
                "is_path_parameter": false,
                "parameter_name": "logo_path"
            }
        ]
    }"#;

    #[test]
    fn flat_binding_keys_are_nested_on_load() {
        let project = from_json(FLAT_LAYOUT, Path::new("/tmp/card/card.pgp")).unwrap();

        let base = project.base_image.as_ref().unwrap();
        assert!(base.path_param.enabled);
        assert_eq!(base.path_param.name, "background");

        let title = project.layers()[0].as_text().unwrap();
        assert!(title.text_param.enabled);
        assert_eq!(title.text_param.name, "title");
        assert!(!title.font_param.enabled);

        let logo = project.layers()[1].as_image().unwrap();
        assert!(!logo.path_param.enabled);
        assert_eq!(logo.path_param.name, "logo_path");

        let names: Vec<String> = crate::params::collect_parameters(&project)
            .into_iter()
            .map(|param| param.name)
            .collect();
        assert_eq!(names, ["background", "title"]);
    }

    #[test]
    fn empty_paths_load_as_unset() {
        let project = from_json(FLAT_LAYOUT, Path::new("/tmp/card/card.pgp")).unwrap();
        assert_eq!(project.layers()[0].as_text().unwrap().font_path, None);
        assert_eq!(project.layers()[1].as_image().unwrap().image_path, None);
        assert_eq!(
            project.base_image.as_ref().unwrap().image_path,
            PathBuf::from("/tmp/card/bg.png")
        );

        let code = crate::codegen::generate(&project, &crate::CodegenOptions::default()).unwrap();
        assert!(code.contains("image layer \"Logo\" has no image path, skipped"));
    }

    #[test]
    fn modified_tracking_follows_snapshots() {
        let mut manager = ProjectManager::new();
        let mut project = manager.new_project();
        assert!(!manager.is_modified(&project));

        project.function_name = "make_card".into();
        assert!(manager.is_modified(&project));
        assert!(!manager.save(&project).unwrap(), "no file yet");
    }
}
