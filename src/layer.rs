use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 200;
pub const MAX_LAYER_EXTENT: u32 = 9999;
pub const POSITION_LIMIT: i32 = 9999;

/// A unique identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position on the canvas in pixels. For text layers this is the alignment anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSize")]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Size as found in a file, before clamping
#[derive(Deserialize)]
struct StoredSize {
    width: u32,
    height: u32,
}

impl From<StoredSize> for Size {
    fn from(stored: StoredSize) -> Self {
        Size::new(stored.width, stored.height)
    }
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(1, MAX_LAYER_EXTENT),
            height: height.clamp(1, MAX_LAYER_EXTENT),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

/// Straight (non-premultiplied) RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    pub const ALL: [HorizontalAlign; 3] = [Self::Left, Self::Center, Self::Right];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub const ALL: [VerticalAlign; 3] = [Self::Top, Self::Middle, Self::Bottom];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Middle => "Middle",
            Self::Bottom => "Bottom",
        }
    }
}

/// Whether an attribute is promoted to a function argument in generated code.
///
/// `order` is stamped by [`crate::Project::set_parameter`] when the binding is
/// enabled, so that arguments appear in the order they were marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBinding {
    #[serde(default)]
    pub enabled: bool,
    pub name: String,
    #[serde(default)]
    pub order: u64,
}

impl ParamBinding {
    pub fn named(name: &str) -> Self {
        Self {
            enabled: false,
            name: name.to_owned(),
            order: 0,
        }
    }
}

fn default_image_param() -> ParamBinding {
    ParamBinding::named("image_path")
}

fn default_base_param() -> ParamBinding {
    ParamBinding::named("base_image_path")
}

fn default_text_param() -> ParamBinding {
    ParamBinding::named("text")
}

fn default_font_param() -> ParamBinding {
    ParamBinding::named("font_path")
}

fn default_opacity() -> f32 {
    1.0
}

fn default_font_size() -> u32 {
    24
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub size: Size,
    /// Degrees, clockwise on screen, about the layer center
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_image_param")]
    pub path_param: ParamBinding,
}

impl Default for ImageLayer {
    fn default() -> Self {
        Self {
            image_path: None,
            size: Size::default(),
            rotation: 0.0,
            opacity: 1.0,
            path_param: default_image_param(),
        }
    }
}

impl ImageLayer {
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = if degrees.is_finite() { degrees.clamp(-360.0, 360.0) } else { 0.0 };
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub color: Rgba,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default = "default_text_param")]
    pub text_param: ParamBinding,
    #[serde(default = "default_font_param")]
    pub font_param: ParamBinding,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            text: "Sample text".to_owned(),
            font_path: None,
            font_size: default_font_size(),
            color: Rgba::BLACK,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            text_param: default_text_param(),
            font_param: default_font_param(),
        }
    }
}

impl TextLayer {
    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Image,
    Text,
}

/// Content of a layer. Serialized with a `layer_type` tag next to the common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer_type", rename_all = "lowercase")]
pub enum LayerContent {
    Image(ImageLayer),
    Text(TextLayer),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Whether the layer is currently visible
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub position: Position,
    #[serde(flatten)]
    pub content: LayerContent,
}

fn default_visible() -> bool {
    true
}

impl Layer {
    pub fn new_image(name: &str, image_path: Option<PathBuf>, size: Size) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_owned(),
            visible: true,
            position: Position::default(),
            content: LayerContent::Image(ImageLayer {
                image_path,
                size,
                ..ImageLayer::default()
            }),
        }
    }

    pub fn new_text(name: &str, text: &str) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_owned(),
            visible: true,
            position: Position::default(),
            content: LayerContent::Text(TextLayer {
                text: text.to_owned(),
                ..TextLayer::default()
            }),
        }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Image(_) => LayerKind::Image,
            LayerContent::Text(_) => LayerKind::Text,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.content {
            LayerContent::Image(image) => Some(image),
            LayerContent::Text(_) => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match &mut self.content {
            LayerContent::Image(image) => Some(image),
            LayerContent::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match &self.content {
            LayerContent::Text(text) => Some(text),
            LayerContent::Image(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLayer> {
        match &mut self.content {
            LayerContent::Text(text) => Some(text),
            LayerContent::Image(_) => None,
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = Position::new(
            x.clamp(-POSITION_LIMIT, POSITION_LIMIT),
            y.clamp(-POSITION_LIMIT, POSITION_LIMIT),
        );
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Copy of this layer under a fresh id. Parameter bindings are carried over
    /// disabled, since two arguments may not share a name.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = LayerId::new();
        copy.name = format!("{} copy", self.name);
        match &mut copy.content {
            LayerContent::Image(image) => image.path_param.enabled = false,
            LayerContent::Text(text) => {
                text.text_param.enabled = false;
                text.font_param.enabled = false;
            }
        }
        copy
    }

    /// Re-applies the editor ranges and drops blank paths. Used on layers read
    /// from a file, which bypass the setters.
    pub fn normalize(&mut self) {
        self.set_position(self.position.x, self.position.y);
        match &mut self.content {
            LayerContent::Image(image) => {
                image.set_size(image.size.width, image.size.height);
                image.set_rotation(image.rotation);
                image.set_opacity(image.opacity);
                drop_blank(&mut image.image_path);
            }
            LayerContent::Text(text) => {
                text.set_font_size(text.font_size);
                drop_blank(&mut text.font_path);
            }
        }
    }

    /// Every file path this layer refers to
    pub fn paths_mut(&mut self) -> Vec<&mut PathBuf> {
        match &mut self.content {
            LayerContent::Image(image) => image.image_path.iter_mut().collect(),
            LayerContent::Text(text) => text.font_path.iter_mut().collect(),
        }
    }
}

/// True for an empty or whitespace-only path
pub fn is_blank_path(path: &std::path::Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

fn drop_blank(path: &mut Option<PathBuf>) {
    if path.as_deref().is_some_and(is_blank_path) {
        *path = None;
    }
}

/// The base image every layer is composited onto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseImage {
    pub name: String,
    pub image_path: PathBuf,
    #[serde(default = "default_base_param")]
    pub path_param: ParamBinding,
}

impl BaseImage {
    pub fn new(image_path: PathBuf) -> Self {
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name: format!("Base - {file_name}"),
            image_path,
            path_param: default_base_param(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_to_editor_ranges() {
        let mut layer = Layer::new_image("img", None, Size::new(0, 20_000));
        let image = layer.as_image_mut().unwrap();
        assert_eq!(image.size, Size { width: 1, height: MAX_LAYER_EXTENT });

        image.set_opacity(1.7);
        assert_eq!(image.opacity, 1.0);
        image.set_opacity(f32::NAN);
        assert_eq!(image.opacity, 1.0);
        image.set_rotation(-720.0);
        assert_eq!(image.rotation, -360.0);

        let mut text = Layer::new_text("t", "hi");
        text.as_text_mut().unwrap().set_font_size(4);
        assert_eq!(text.as_text().unwrap().font_size, MIN_FONT_SIZE);

        text.set_position(50_000, -50_000);
        assert_eq!(text.position, Position::new(POSITION_LIMIT, -POSITION_LIMIT));
    }

    #[test]
    fn duplicate_gets_new_id_and_disables_bindings() {
        let mut layer = Layer::new_text("Title", "Hello");
        layer.as_text_mut().unwrap().text_param.enabled = true;

        let copy = layer.duplicate();
        assert_ne!(copy.id, layer.id);
        assert_eq!(copy.name, "Title copy");
        assert!(!copy.as_text().unwrap().text_param.enabled);
        assert_eq!(copy.as_text().unwrap().text, "Hello");
    }

    #[test]
    fn layer_serializes_with_type_tag() {
        let layer = Layer::new_text("Caption", "Hi").with_position(3, 4);
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["layer_type"], "text");
        assert_eq!(json["position"]["x"], 3);
        assert_eq!(json["horizontal_align"], "left");

        let back: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn out_of_range_values_from_a_file_are_clamped() {
        let json = serde_json::json!({
            "id": "6f1c1a64-3c3f-4d55-9c6b-0d1f1e5a2b11",
            "name": "Logo",
            "layer_type": "image",
            "image_path": "",
            "size": { "width": 0, "height": 50 },
            "rotation": 900.0,
            "opacity": 3.5
        });
        let mut layer: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(layer.as_image().unwrap().size, Size::new(1, 50));

        layer.normalize();
        let image = layer.as_image().unwrap();
        assert_eq!(image.image_path, None);
        assert_eq!(image.rotation, 360.0);
        assert_eq!(image.opacity, 1.0);

        let json = serde_json::json!({
            "id": "0b6a3c8e-96b8-4b8a-a7a2-6f1a2b3c4d5e",
            "name": "Title",
            "layer_type": "text",
            "font_path": "  ",
            "font_size": 2
        });
        let mut layer: Layer = serde_json::from_value(json).unwrap();
        layer.normalize();
        let text = layer.as_text().unwrap();
        assert_eq!(text.font_size, MIN_FONT_SIZE);
        assert_eq!(text.font_path, None);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = serde_json::json!({
            "id": "6f1c1a64-3c3f-4d55-9c6b-0d1f1e5a2b11",
            "name": "Logo",
            "layer_type": "image",
            "image_path": "logo.png"
        });
        let layer: Layer = serde_json::from_value(json).unwrap();
        assert!(layer.visible);
        let image = layer.as_image().unwrap();
        assert_eq!(image.opacity, 1.0);
        assert_eq!(image.size, Size::default());
        assert_eq!(image.path_param.name, "image_path");
        assert!(!image.path_param.enabled);
    }
}
