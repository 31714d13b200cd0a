use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::layer::{BaseImage, Layer, LayerId, LayerKind, ParamBinding, is_blank_path};
use crate::params::ParamTarget;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled";
pub const DEFAULT_FUNCTION_NAME: &str = "generate_image";

/// Size of the blank canvas used when no base image is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// A composition: an optional base image plus layers in paint order (first is bottom-most).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub project_name: String,
    pub function_name: String,
    pub canvas_size: CanvasSize,
    pub base_image: Option<BaseImage>,
    pub layers: Vec<Layer>,
    /// Next stamp handed out when a parameter binding is enabled
    pub next_param_order: u64,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_owned(),
            function_name: DEFAULT_FUNCTION_NAME.to_owned(),
            canvas_size: CanvasSize::default(),
            base_image: None,
            layers: Vec::new(),
            next_param_order: 1,
        }
    }
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_base_image(&mut self, base_image: BaseImage) {
        self.base_image = Some(base_image);
    }

    pub fn clear_base_image(&mut self) -> Option<BaseImage> {
        self.base_image.take()
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Inserts at `index`, clamped to the end of the list
    pub fn insert_layer(&mut self, index: usize, layer: Layer) {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
    }

    /// Removes the layer and returns it with the index it occupied
    pub fn remove_layer(&mut self, id: LayerId) -> Option<(usize, Layer)> {
        let index = self.index_of(id)?;
        Some((index, self.layers.remove(index)))
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn get_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    /// Replaces the stored layer with the same id. Returns false if there is none.
    pub fn update_layer(&mut self, layer: Layer) -> bool {
        match self.get_layer_mut(layer.id) {
            Some(slot) => {
                *slot = layer;
                true
            }
            None => false,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_by_kind(&self, kind: LayerKind) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |layer| layer.kind() == kind)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Moves a layer to `new_index` in paint order. Out-of-range indices are ignored.
    pub fn move_layer(&mut self, id: LayerId, new_index: usize) -> bool {
        let Some(old_index) = self.index_of(id) else {
            return false;
        };
        if new_index >= self.layers.len() || new_index == old_index {
            return false;
        }
        let layer = self.layers.remove(old_index);
        self.layers.insert(new_index, layer);
        true
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear();
    }

    /// Inserts a copy of the layer directly above it and returns the copy's id
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let index = self.index_of(id)?;
        let copy = self.layers[index].duplicate();
        let copy_id = copy.id;
        self.layers.insert(index + 1, copy);
        Some(copy_id)
    }

    pub fn binding(&self, target: ParamTarget) -> Option<&ParamBinding> {
        match target {
            ParamTarget::BaseImagePath => self.base_image.as_ref().map(|base| &base.path_param),
            ParamTarget::ImagePath(id) => self
                .get_layer(id)
                .and_then(Layer::as_image)
                .map(|image| &image.path_param),
            ParamTarget::Text(id) => self
                .get_layer(id)
                .and_then(Layer::as_text)
                .map(|text| &text.text_param),
            ParamTarget::FontPath(id) => self
                .get_layer(id)
                .and_then(Layer::as_text)
                .map(|text| &text.font_param),
        }
    }

    pub fn binding_mut(&mut self, target: ParamTarget) -> Option<&mut ParamBinding> {
        match target {
            ParamTarget::BaseImagePath => {
                self.base_image.as_mut().map(|base| &mut base.path_param)
            }
            ParamTarget::ImagePath(id) => self
                .get_layer_mut(id)
                .and_then(Layer::as_image_mut)
                .map(|image| &mut image.path_param),
            ParamTarget::Text(id) => self
                .get_layer_mut(id)
                .and_then(Layer::as_text_mut)
                .map(|text| &mut text.text_param),
            ParamTarget::FontPath(id) => self
                .get_layer_mut(id)
                .and_then(Layer::as_text_mut)
                .map(|text| &mut text.font_param),
        }
    }

    /// Enables or disables a parameter binding. Enabling stamps it with the next
    /// marking order; re-enabling moves it to the end of the signature.
    pub fn set_parameter(&mut self, target: ParamTarget, enabled: bool) -> bool {
        let order = self.next_param_order;
        let Some(binding) = self.binding_mut(target) else {
            return false;
        };
        if binding.enabled == enabled {
            return false;
        }
        binding.enabled = enabled;
        if enabled {
            binding.order = order;
            self.next_param_order += 1;
        }
        true
    }

    /// Brings values read from a file back into editor ranges. A base image
    /// with a blank path is dropped.
    pub fn normalize(&mut self) {
        if self
            .base_image
            .as_ref()
            .is_some_and(|base| is_blank_path(&base.image_path))
        {
            self.base_image = None;
        }
        for layer in &mut self.layers {
            layer.normalize();
        }
    }

    /// Rewrites every file path referenced by the project
    pub fn map_paths(&mut self, mut f: impl FnMut(&Path) -> PathBuf) {
        if let Some(base) = &mut self.base_image {
            base.image_path = f(&base.image_path);
        }
        for layer in &mut self.layers {
            for path in layer.paths_mut() {
                let mapped = f(path.as_path());
                *path = mapped;
            }
        }
    }
}
