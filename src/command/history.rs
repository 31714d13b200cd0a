use super::{Command, CommandError, CommandResult};
use crate::event::ProjectEvent;
use crate::project::Project;

/// Oldest entries are dropped past this many undo steps
pub const MAX_HISTORY: usize = 200;

/// Manages the history of executed commands for undo/redo functionality
#[derive(Debug, Default)]
pub struct CommandHistory {
    /// Stack of commands that can be undone
    undo_stack: Vec<Command>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Command>,
    /// Whether the top of the undo stack may still absorb coalesced edits
    group_open: bool,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and add it to the history if successful
    pub fn execute(&mut self, command: Command, project: &mut Project) -> CommandResult<ProjectEvent> {
        self.group_open = false;
        let event = command.execute(project)?;
        if !command.is_noop() {
            self.push(command);
        }
        Ok(event)
    }

    /// Like [`execute`](Self::execute), but merges into the previous entry while
    /// the same interaction (a slider drag, a text edit) keeps editing one layer.
    pub fn execute_coalesced(
        &mut self,
        command: Command,
        project: &mut Project,
    ) -> CommandResult<ProjectEvent> {
        let event = command.execute(project)?;
        let merged = self.group_open
            && self
                .undo_stack
                .last_mut()
                .is_some_and(|top| top.merge(&command));
        if merged {
            if self.undo_stack.last().is_some_and(Command::is_noop) {
                self.undo_stack.pop();
                self.group_open = false;
                return Ok(event);
            }
        } else if command.is_noop() {
            return Ok(event);
        } else {
            self.push(command);
        }
        self.group_open = true;
        Ok(event)
    }

    /// Ends the current coalescing group
    pub fn seal(&mut self) {
        self.group_open = false;
    }

    fn push(&mut self, command: Command) {
        self.undo_stack.push(command);
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        // Clear redo stack when new command is executed
        self.redo_stack.clear();
    }

    /// Undo the last executed command
    pub fn undo(&mut self, project: &mut Project) -> CommandResult<ProjectEvent> {
        self.group_open = false;
        let command = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        match command.undo(project) {
            Ok(event) => {
                log::debug!("Undo: {}", command.label());
                self.redo_stack.push(command);
                Ok(event)
            }
            Err(err) => {
                log::warn!("Undo of '{}' failed: {err}", command.label());
                Err(err)
            }
        }
    }

    /// Redo the last undone command
    pub fn redo(&mut self, project: &mut Project) -> CommandResult<ProjectEvent> {
        self.group_open = false;
        let command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        match command.execute(project) {
            Ok(event) => {
                log::debug!("Redo: {}", command.label());
                self.undo_stack.push(command);
                Ok(event)
            }
            Err(err) => {
                log::warn!("Redo of '{}' failed: {err}", command.label());
                Err(err)
            }
        }
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Labels of undoable commands, most recent first
    pub fn undo_labels(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(Command::label).collect()
    }

    pub fn redo_label(&self) -> Option<String> {
        self.redo_stack.last().map(Command::label)
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{BaseImage, Layer};

    fn nudge(project: &Project, index: usize, x: i32) -> Command {
        let mut layer = project.layers()[index].clone();
        layer.set_position(x, 0);
        Command::update_layer(project, layer).unwrap()
    }

    #[test]
    fn coalesced_edits_undo_in_one_step() {
        let mut project = Project::new();
        let mut history = CommandHistory::new();
        history
            .execute(Command::add_layer(&project, Layer::new_text("t", "t")), &mut project)
            .unwrap();

        for x in [1, 2, 3] {
            let command = nudge(&project, 0, x);
            history.execute_coalesced(command, &mut project).unwrap();
        }
        history.seal();
        assert_eq!(history.undo_labels(), ["Edit layer 't'", "Add layer 't'"]);

        history.undo(&mut project).unwrap();
        assert_eq!(project.layers()[0].position.x, 0);
        history.redo(&mut project).unwrap();
        assert_eq!(project.layers()[0].position.x, 3);
    }

    #[test]
    fn sealed_group_starts_a_new_entry() {
        let mut project = Project::new();
        project.add_layer(Layer::new_text("t", "t"));
        let mut history = CommandHistory::new();

        history.execute_coalesced(nudge(&project, 0, 5), &mut project).unwrap();
        history.seal();
        history.execute_coalesced(nudge(&project, 0, 9), &mut project).unwrap();
        assert_eq!(history.undo_labels().len(), 2);
    }

    #[test]
    fn edit_back_to_start_leaves_no_entry() {
        let mut project = Project::new();
        project.add_layer(Layer::new_text("t", "t"));
        let mut history = CommandHistory::new();

        history.execute_coalesced(nudge(&project, 0, 5), &mut project).unwrap();
        history.execute_coalesced(nudge(&project, 0, 0), &mut project).unwrap();
        assert!(!history.can_undo());
    }

    #[test]
    fn base_image_renames_coalesce() {
        let mut project = Project::new();
        project.set_base_image(BaseImage::new("/img/bg.png".into()));
        let mut history = CommandHistory::new();

        for name in ["B", "Ba", "Back"] {
            let mut base = project.base_image.clone().unwrap();
            base.name = name.to_owned();
            let command = Command::set_base_image(&project, Some(base));
            history.execute_coalesced(command, &mut project).unwrap();
        }
        history.seal();
        assert_eq!(history.undo_labels(), ["Set base image"]);

        history.undo(&mut project).unwrap();
        assert_eq!(project.base_image.unwrap().name, "Base - bg.png");
    }

    #[test]
    fn new_command_clears_redo() {
        let mut project = Project::new();
        let mut history = CommandHistory::new();
        history
            .execute(Command::add_layer(&project, Layer::new_text("a", "a")), &mut project)
            .unwrap();
        history.undo(&mut project).unwrap();
        assert!(history.can_redo());

        history
            .execute(Command::add_layer(&project, Layer::new_text("b", "b")), &mut project)
            .unwrap();
        assert!(!history.can_redo());
    }

    #[test]
    fn empty_history_reports_nothing_to_undo() {
        let mut history = CommandHistory::new();
        assert_eq!(history.undo(&mut Project::new()), Err(CommandError::NothingToUndo));
        assert_eq!(history.redo(&mut Project::new()), Err(CommandError::NothingToRedo));
    }
}
