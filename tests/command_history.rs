use pillow_generator::command::{Command, CommandError, CommandHistory};
use pillow_generator::layer::{Layer, Size};
use pillow_generator::params::ParamTarget;
use pillow_generator::{BaseImage, Project};

// Helper to create a project with one image and one text layer
fn create_test_project() -> (Project, Layer, Layer) {
    let mut project = Project::new();
    let image = Layer::new_image("Logo", Some("/imgs/logo.png".into()), Size::new(50, 50));
    let text = Layer::new_text("Title", "Hello");
    project.add_layer(image.clone());
    project.add_layer(text.clone());
    (project, image, text)
}

#[test]
fn every_edit_undoes_to_the_original_project() {
    let (mut project, image, text) = create_test_project();
    let original = project.clone();
    let mut history = CommandHistory::new();

    let mut moved = image.clone().with_position(30, 40);
    moved.as_image_mut().unwrap().set_opacity(0.3);
    let command = Command::update_layer(&project, moved).unwrap();
    history.execute(command, &mut project).unwrap();

    let command = Command::set_base_image(&project, Some(BaseImage::new("/imgs/bg.png".into())));
    history.execute(command, &mut project).unwrap();
    let command = Command::rename_project(&project, "Card".into());
    history.execute(command, &mut project).unwrap();
    let command = Command::set_function_name(&project, "make_card".into());
    history.execute(command, &mut project).unwrap();

    let command = Command::move_layer(&project, text.id, 0).unwrap();
    history.execute(command, &mut project).unwrap();
    let command = Command::set_parameter(&project, ParamTarget::Text(text.id), true).unwrap();
    history.execute(command, &mut project).unwrap();
    let command = Command::remove_layer(&project, image.id).unwrap();
    history.execute(command, &mut project).unwrap();

    assert_eq!(project.layers().len(), 1);
    assert_eq!(project.function_name, "make_card");
    assert!(project.binding(ParamTarget::Text(text.id)).unwrap().enabled);

    let edited = project.clone();
    while history.can_undo() {
        history.undo(&mut project).unwrap();
    }
    assert_eq!(project, original);

    while history.can_redo() {
        history.redo(&mut project).unwrap();
    }
    assert_eq!(project, edited);
}

#[test]
fn new_edit_discards_redo() {
    let (mut project, image, _) = create_test_project();
    let mut history = CommandHistory::new();

    history
        .execute(Command::remove_layer(&project, image.id).unwrap(), &mut project)
        .unwrap();
    history.undo(&mut project).unwrap();
    assert!(history.can_redo());

    history
        .execute(Command::rename_project(&project, "Other".into()), &mut project)
        .unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.redo(&mut project), Err(CommandError::NothingToRedo));
}

#[test]
fn slider_drag_is_a_single_undo_step() {
    let (mut project, image, _) = create_test_project();
    let mut history = CommandHistory::new();

    for step in 1..=10 {
        let mut layer = project.get_layer(image.id).unwrap().clone();
        layer.as_image_mut().unwrap().set_rotation(step as f32 * 9.0);
        history
            .execute_coalesced(Command::update_layer(&project, layer).unwrap(), &mut project)
            .unwrap();
    }
    history.seal();
    assert_eq!(project.get_layer(image.id).unwrap().as_image().unwrap().rotation, 90.0);
    assert_eq!(history.undo_labels().len(), 1);

    history.undo(&mut project).unwrap();
    assert_eq!(project.get_layer(image.id).unwrap().as_image().unwrap().rotation, 0.0);
    assert!(!history.can_undo());
}

#[test]
fn stale_commands_fail_cleanly() {
    let (mut project, image, _) = create_test_project();
    let remove = Command::remove_layer(&project, image.id).unwrap();
    let mut history = CommandHistory::new();
    history.execute(remove, &mut project).unwrap();

    assert_eq!(
        Command::move_layer(&project, image.id, 0),
        Err(CommandError::LayerNotFound(image.id))
    );
    assert_eq!(
        Command::set_parameter(&project, ParamTarget::BaseImagePath, true),
        Err(CommandError::NoSuchBinding(ParamTarget::BaseImagePath))
    );
    assert_eq!(history.undo(&mut project).map(|_| ()), Ok(()));
    assert_eq!(history.undo(&mut project), Err(CommandError::NothingToUndo));
}
