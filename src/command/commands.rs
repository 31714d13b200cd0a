use super::{CommandError, CommandResult};
use crate::event::ProjectEvent;
use crate::layer::{BaseImage, Layer, LayerId, ParamBinding};
use crate::params::ParamTarget;
use crate::project::Project;

/// An undoable edit of a [`Project`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddLayer { index: usize, layer: Layer },
    RemoveLayer { index: usize, layer: Layer },
    MoveLayer {
        id: LayerId,
        from: usize,
        to: usize,
    },
    /// Replace a layer's attributes; `before` and `after` share the id
    UpdateLayer { before: Layer, after: Layer },
    SetBaseImage {
        before: Option<BaseImage>,
        after: Option<BaseImage>,
    },
    RenameProject { before: String, after: String },
    SetFunctionName { before: String, after: String },
    SetParameter {
        target: ParamTarget,
        enabled: bool,
        /// Binding and counter as they were, for undo
        previous: ParamBinding,
        previous_counter: u64,
    },
}

impl Command {
    /// Adds `layer` on top of the stack
    pub fn add_layer(project: &Project, layer: Layer) -> Self {
        Command::AddLayer {
            index: project.layers().len(),
            layer,
        }
    }

    pub fn remove_layer(project: &Project, id: LayerId) -> CommandResult<Self> {
        let index = project.index_of(id).ok_or(CommandError::LayerNotFound(id))?;
        Ok(Command::RemoveLayer {
            index,
            layer: project.layers()[index].clone(),
        })
    }

    pub fn move_layer(project: &Project, id: LayerId, to: usize) -> CommandResult<Self> {
        let from = project.index_of(id).ok_or(CommandError::LayerNotFound(id))?;
        let len = project.layers().len();
        if to >= len {
            return Err(CommandError::IndexOutOfRange { index: to, len });
        }
        Ok(Command::MoveLayer { id, from, to })
    }

    /// Replaces the stored layer with `after`, remembering the current state
    pub fn update_layer(project: &Project, after: Layer) -> CommandResult<Self> {
        let before = project
            .get_layer(after.id)
            .ok_or(CommandError::LayerNotFound(after.id))?
            .clone();
        Ok(Command::UpdateLayer { before, after })
    }

    pub fn set_base_image(project: &Project, after: Option<BaseImage>) -> Self {
        Command::SetBaseImage {
            before: project.base_image.clone(),
            after,
        }
    }

    pub fn rename_project(project: &Project, after: String) -> Self {
        Command::RenameProject {
            before: project.project_name.clone(),
            after,
        }
    }

    pub fn set_function_name(project: &Project, after: String) -> Self {
        Command::SetFunctionName {
            before: project.function_name.clone(),
            after,
        }
    }

    pub fn set_parameter(
        project: &Project,
        target: ParamTarget,
        enabled: bool,
    ) -> CommandResult<Self> {
        let previous = project
            .binding(target)
            .ok_or(CommandError::NoSuchBinding(target))?
            .clone();
        Ok(Command::SetParameter {
            target,
            enabled,
            previous,
            previous_counter: project.next_param_order,
        })
    }

    /// Apply the command to the project
    pub fn execute(&self, project: &mut Project) -> CommandResult<ProjectEvent> {
        match self {
            Command::AddLayer { index, layer } => {
                let len = project.layers().len();
                if *index > len {
                    return Err(CommandError::IndexOutOfRange { index: *index, len });
                }
                project.insert_layer(*index, layer.clone());
                Ok(ProjectEvent::LayerAdded {
                    id: layer.id,
                    index: *index,
                })
            }
            Command::RemoveLayer { layer, .. } => {
                let (index, removed) = project
                    .remove_layer(layer.id)
                    .ok_or(CommandError::LayerNotFound(layer.id))?;
                Ok(ProjectEvent::LayerRemoved {
                    id: removed.id,
                    index,
                })
            }
            Command::MoveLayer { id, from, to } => reorder(project, *id, *from, *to),
            Command::UpdateLayer { after, .. } => replace(project, after),
            Command::SetBaseImage { after, .. } => {
                project.base_image = after.clone();
                Ok(ProjectEvent::BaseImageChanged)
            }
            Command::RenameProject { after, .. } => {
                project.project_name = after.clone();
                Ok(ProjectEvent::ProjectRenamed)
            }
            Command::SetFunctionName { after, .. } => {
                project.function_name = after.clone();
                Ok(ProjectEvent::ProjectRenamed)
            }
            Command::SetParameter {
                target, enabled, ..
            } => {
                if project.binding(*target).is_none() {
                    return Err(CommandError::NoSuchBinding(*target));
                }
                project.set_parameter(*target, *enabled);
                Ok(ProjectEvent::ParameterToggled { enabled: *enabled })
            }
        }
    }

    /// Revert the command. Must be called on a project in the state `execute` left it.
    pub fn undo(&self, project: &mut Project) -> CommandResult<ProjectEvent> {
        match self {
            Command::AddLayer { layer, .. } => {
                let (index, _) = project
                    .remove_layer(layer.id)
                    .ok_or(CommandError::LayerNotFound(layer.id))?;
                Ok(ProjectEvent::LayerRemoved {
                    id: layer.id,
                    index,
                })
            }
            Command::RemoveLayer { index, layer } => {
                project.insert_layer(*index, layer.clone());
                Ok(ProjectEvent::LayerAdded {
                    id: layer.id,
                    index: *index,
                })
            }
            Command::MoveLayer { id, from, to } => reorder(project, *id, *to, *from),
            Command::UpdateLayer { before, .. } => replace(project, before),
            Command::SetBaseImage { before, .. } => {
                project.base_image = before.clone();
                Ok(ProjectEvent::BaseImageChanged)
            }
            Command::RenameProject { before, .. } => {
                project.project_name = before.clone();
                Ok(ProjectEvent::ProjectRenamed)
            }
            Command::SetFunctionName { before, .. } => {
                project.function_name = before.clone();
                Ok(ProjectEvent::ProjectRenamed)
            }
            Command::SetParameter {
                target,
                previous,
                previous_counter,
                ..
            } => {
                let binding = project
                    .binding_mut(*target)
                    .ok_or(CommandError::NoSuchBinding(*target))?;
                *binding = previous.clone();
                project.next_param_order = *previous_counter;
                Ok(ProjectEvent::ParameterToggled {
                    enabled: previous.enabled,
                })
            }
        }
    }

    /// Short description for the Edit menu
    pub fn label(&self) -> String {
        match self {
            Command::AddLayer { layer, .. } => format!("Add layer '{}'", layer.name),
            Command::RemoveLayer { layer, .. } => format!("Delete layer '{}'", layer.name),
            Command::MoveLayer { .. } => "Reorder layers".to_owned(),
            Command::UpdateLayer { after, .. } => format!("Edit layer '{}'", after.name),
            Command::SetBaseImage { after: Some(_), .. } => "Set base image".to_owned(),
            Command::SetBaseImage { after: None, .. } => "Clear base image".to_owned(),
            Command::RenameProject { .. } => "Rename project".to_owned(),
            Command::SetFunctionName { .. } => "Rename function".to_owned(),
            Command::SetParameter { enabled: true, .. } => "Mark parameter".to_owned(),
            Command::SetParameter { enabled: false, .. } => "Unmark parameter".to_owned(),
        }
    }

    /// Folds `next` into this command when both edit the same layer, or both
    /// edit the base image in place
    pub(super) fn merge(&mut self, next: &Command) -> bool {
        match (self, next) {
            (
                Command::UpdateLayer { after, .. },
                Command::UpdateLayer {
                    after: next_after, ..
                },
            ) if after.id == next_after.id => {
                *after = next_after.clone();
                true
            }
            (
                Command::SetBaseImage {
                    before: Some(_),
                    after,
                },
                Command::SetBaseImage {
                    before: Some(_),
                    after: next_after,
                },
            ) if after.is_some() && next_after.is_some() => {
                *after = next_after.clone();
                true
            }
            _ => false,
        }
    }

    /// True for an update that ends where it started
    pub(super) fn is_noop(&self) -> bool {
        match self {
            Command::UpdateLayer { before, after } => before == after,
            Command::SetBaseImage { before, after } => before == after,
            Command::RenameProject { before, after }
            | Command::SetFunctionName { before, after } => before == after,
            Command::MoveLayer { from, to, .. } => from == to,
            _ => false,
        }
    }
}

fn reorder(project: &mut Project, id: LayerId, from: usize, to: usize) -> CommandResult<ProjectEvent> {
    let len = project.layers().len();
    if to >= len {
        return Err(CommandError::IndexOutOfRange { index: to, len });
    }
    if !project.move_layer(id, to) && project.index_of(id).is_none() {
        return Err(CommandError::LayerNotFound(id));
    }
    Ok(ProjectEvent::LayersReordered {
        id,
        old_index: from,
        new_index: to,
    })
}

fn replace(project: &mut Project, layer: &Layer) -> CommandResult<ProjectEvent> {
    if !project.update_layer(layer.clone()) {
        return Err(CommandError::LayerNotFound(layer.id));
    }
    Ok(ProjectEvent::LayerUpdated { id: layer.id })
}
