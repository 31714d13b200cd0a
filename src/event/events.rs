use std::path::PathBuf;

use crate::layer::LayerId;

/// Something that changed in the open project
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    LayerAdded { id: LayerId, index: usize },
    LayerRemoved { id: LayerId, index: usize },
    LayerUpdated { id: LayerId },
    LayersReordered {
        id: LayerId,
        old_index: usize,
        new_index: usize,
    },
    BaseImageChanged,
    /// Project-level fields such as the name or function name
    ProjectRenamed,
    ParameterToggled { enabled: bool },
    ProjectReset,
    ProjectLoaded { path: PathBuf },
    ProjectSaved { path: PathBuf },
}

impl ProjectEvent {
    /// Whether the event invalidates previously generated code
    pub fn touches_output(&self) -> bool {
        !matches!(self, ProjectEvent::ProjectSaved { .. })
    }
}
