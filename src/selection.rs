use crate::layer::LayerId;
use crate::project::Project;

/// What the property panel and canvas outline refer to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    BaseImage,
    Layer(LayerId),
}

impl Selection {
    pub fn layer_id(&self) -> Option<LayerId> {
        match self {
            Selection::Layer(id) => Some(*id),
            _ => None,
        }
    }

    /// Drops a selection whose target no longer exists
    pub fn fix_up(&mut self, project: &Project) {
        let stale = match self {
            Selection::None => false,
            Selection::BaseImage => project.base_image.is_none(),
            Selection::Layer(id) => project.get_layer(*id).is_none(),
        };
        if stale {
            *self = Selection::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;

    #[test]
    fn fix_up_clears_removed_targets() {
        let mut project = Project::new();
        let layer = Layer::new_text("t", "t");
        let id = layer.id;
        project.add_layer(layer);

        let mut selection = Selection::Layer(id);
        selection.fix_up(&project);
        assert_eq!(selection, Selection::Layer(id));

        project.remove_layer(id);
        selection.fix_up(&project);
        assert_eq!(selection, Selection::None);

        let mut selection = Selection::BaseImage;
        selection.fix_up(&project);
        assert_eq!(selection, Selection::None);
    }
}
