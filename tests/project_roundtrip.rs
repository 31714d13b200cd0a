use std::fs;

use pillow_generator::layer::{HorizontalAlign, Layer, Rgba, Size, VerticalAlign};
use pillow_generator::params::ParamTarget;
use pillow_generator::project_file::{self, ProjectManager};
use pillow_generator::{BaseImage, Project, ProjectFileError};

fn sample_project(root: &std::path::Path) -> Project {
    let mut project = Project::new();
    project.set_base_image(BaseImage::new(root.join("assets/background.png")));

    let mut logo = Layer::new_image("Logo", Some(root.join("assets/logo.png")), Size::new(120, 80))
        .with_position(40, 30);
    let image = logo.as_image_mut().unwrap();
    image.set_rotation(15.0);
    image.set_opacity(0.5);
    project.add_layer(logo);

    let mut title = Layer::new_text("Title", "Hello \"world\"").with_position(400, 300);
    let text = title.as_text_mut().unwrap();
    text.font_path = Some(root.join("fonts/Inter.ttf"));
    text.color = Rgba([200, 10, 10, 255]);
    text.horizontal_align = HorizontalAlign::Center;
    text.vertical_align = VerticalAlign::Bottom;
    let title_id = title.id;
    project.add_layer(title);

    project.set_parameter(ParamTarget::Text(title_id), true);
    project.set_parameter(ParamTarget::BaseImagePath, true);
    project
}

#[test]
fn saved_project_loads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let project = sample_project(&root);
    let file = root.join("card.pgp");

    project_file::save_project(&project, &file).unwrap();
    let loaded = project_file::load_project(&file).unwrap();

    assert_eq!(loaded, project);
}

#[test]
fn paths_are_stored_relative_to_the_project_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let project = sample_project(&root);
    let file = root.join("card.pgp");
    project_file::save_project(&project, &file).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(
        json["base_image"]["image_path"],
        format!("assets{}background.png", std::path::MAIN_SEPARATOR)
    );
    assert_eq!(json["layers"][0]["layer_type"], "image");
    assert_eq!(json["layers"][1]["layer_type"], "text");
    assert_eq!(json["layers"][1]["horizontal_align"], "center");
}

#[test]
fn moved_project_resolves_paths_in_new_location() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let project = sample_project(&root.join("old"));
    let json = project_file::to_json(&project, &root.join("old/card.pgp")).unwrap();

    let moved = project_file::from_json(&json, &root.join("new/card.pgp")).unwrap();
    let base = moved.base_image.unwrap();
    assert_eq!(base.image_path, root.join("new/assets/background.png"));
}

#[test]
fn manager_tracks_file_and_modification() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let mut manager = ProjectManager::new();
    let mut project = manager.new_project();
    project.add_layer(Layer::new_text("Caption", "Hi"));
    assert!(manager.is_modified(&project));

    let file = root.join("poster.pgp");
    manager.save_as(&mut project, &file).unwrap();
    assert_eq!(project.project_name, "poster");
    assert_eq!(manager.current_file(), Some(file.as_path()));
    assert_eq!(manager.display_name().as_deref(), Some("poster.pgp"));
    assert!(!manager.is_modified(&project));

    let reopened = ProjectManager::new().open(&file).unwrap();
    assert_eq!(reopened, project);
}

#[test]
fn broken_files_report_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.pgp");
    fs::write(&file, "{ not json").unwrap();
    assert!(matches!(
        project_file::load_project(&file),
        Err(ProjectFileError::Json(_))
    ));

    fs::write(&file, r#"{ "version": "3.0.0", "layers": [] }"#).unwrap();
    assert!(matches!(
        project_file::load_project(&file),
        Err(ProjectFileError::UnsupportedVersion { .. })
    ));

    assert!(matches!(
        project_file::load_project(&dir.path().join("missing.pgp")),
        Err(ProjectFileError::Io { .. })
    ));
}
