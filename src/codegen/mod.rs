//! Renders a [`Project`] as a Python function built on Pillow.
//!
//! The generated function opens the base image (or a blank canvas), then walks
//! the layers in paint order emitting one `result.paste(...)` or
//! `draw.text(...)` per visible layer.

pub mod python;

use std::path::{Path, PathBuf};

use crate::error::CodegenError;
use crate::layer::{HorizontalAlign, ImageLayer, Layer, LayerContent, TextLayer, VerticalAlign};
use crate::params::{self, ParamKind, ParamTarget, Parameter};
use crate::project::{DEFAULT_FUNCTION_NAME, Project};
use crate::project_file::relative_path;
use python::{PythonWriter, docstring_text, float_literal, path_literal, string_literal};

pub const DEFAULT_OUTPUT_PARAM: &str = "output_path";

/// Names bound at module level or inside the function body
const RESERVED_NAMES: &[&str] = &["Image", "ImageDraw", "ImageFont", "result", "draw"];
/// Per-layer locals, suffixed with the layer number
const LOCAL_PREFIXES: &[&str] = &["image_", "alpha_", "font_", "bbox_", "text_x_", "text_y_"];

/// What the generated function does with the composed image
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputMode {
    #[default]
    ReturnImage,
    /// Takes a leading path argument and saves to it before returning
    SaveToPath { param_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    pub function_name: String,
    pub output: OutputMode,
    /// Emit file paths relative to this directory instead of as stored
    pub relative_to: Option<PathBuf>,
    pub include_example: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_owned(),
            output: OutputMode::ReturnImage,
            relative_to: None,
            include_example: true,
        }
    }
}

impl CodegenOptions {
    pub fn for_project(project: &Project) -> Self {
        Self {
            function_name: project.function_name.trim().to_owned(),
            ..Self::default()
        }
    }
}

/// The full parameter list of the generated function, in signature order
pub fn signature(
    project: &Project,
    options: &CodegenOptions,
) -> Result<Vec<Parameter>, CodegenError> {
    let mut all = Vec::new();
    if let OutputMode::SaveToPath { param_name } = &options.output {
        all.push(Parameter::output_path(param_name.trim()));
    }
    all.extend(params::collect_parameters(project));
    params::validate_parameters(&all)?;
    if let Some(param) = all.iter().find(|param| is_reserved(&param.name)) {
        return Err(CodegenError::ReservedName {
            name: param.name.clone(),
        });
    }
    Ok(all)
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
        || LOCAL_PREFIXES.iter().any(|prefix| {
            name.strip_prefix(prefix)
                .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        })
}

fn check_function_name(name: &str) -> Result<(), CodegenError> {
    if !python::is_identifier(name) || python::is_keyword(name) {
        return Err(CodegenError::InvalidIdentifier {
            name: name.to_owned(),
            context: "function name".to_owned(),
        });
    }
    if RESERVED_NAMES[..3].contains(&name) {
        return Err(CodegenError::ReservedName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Generates the Python module for `project`
pub fn generate(project: &Project, options: &CodegenOptions) -> Result<String, CodegenError> {
    check_function_name(&options.function_name)?;
    let signature = signature(project, options)?;

    let mut generator = Generator {
        project,
        options,
        signature: &signature,
        w: PythonWriter::new(),
        draw_ready: false,
    };
    generator.module();
    log::debug!(
        "Generated {}() with {} parameters for {} layers",
        options.function_name,
        signature.len(),
        project.layers().len()
    );
    Ok(generator.w.finish())
}

struct Generator<'a> {
    project: &'a Project,
    options: &'a CodegenOptions,
    signature: &'a [Parameter],
    w: PythonWriter,
    draw_ready: bool,
}

impl Generator<'_> {
    fn module(&mut self) {
        self.w.line("from PIL import Image, ImageDraw, ImageFont");
        self.w.blank();
        self.w.blank();

        let args: Vec<String> = self
            .signature
            .iter()
            .map(|param| format!("{}: {}", param.name, param.kind.python_type()))
            .collect();
        self.w
            .line(format!("def {}({}):", self.options.function_name, args.join(", ")));
        self.w.indent();
        self.docstring();
        self.base_image();
        let project = self.project;
        for (index, layer) in project.layers().iter().enumerate() {
            self.w.blank();
            self.layer(index + 1, layer);
        }
        self.w.blank();
        if let OutputMode::SaveToPath { param_name } = &self.options.output {
            self.w.line(format!("result.save({})", param_name.trim()));
        }
        self.w.line("return result");
        self.w.dedent();

        if self.options.include_example {
            self.w.blank();
            self.w.blank();
            self.example();
        }
    }

    fn docstring(&mut self) {
        self.w.line("\"\"\"");
        self.w
            .line(format!("Generate image - {}", docstring_text(&self.project.project_name)));
        if !self.signature.is_empty() {
            self.w.blank();
            self.w.line("Args:");
            for param in self.signature {
                self.w.line(format!(
                    "    {}: {}",
                    param.name,
                    docstring_text(&param.description)
                ));
            }
        }
        self.w.blank();
        self.w.line("Returns:");
        self.w.line("    PIL.Image.Image: the composed RGBA image");
        self.w.line("\"\"\"");
    }

    /// Argument name bound to `target`, if it is a parameter
    fn param_for(&self, target: ParamTarget) -> Option<&str> {
        self.signature
            .iter()
            .find(|param| param.target == Some(target))
            .map(|param| param.name.as_str())
    }

    fn path_expr(&self, path: &Path) -> String {
        match &self.options.relative_to {
            Some(dir) => path_literal(&relative_path(path, dir)),
            None => path_literal(path),
        }
    }

    fn base_image(&mut self) {
        let project = self.project;
        match &project.base_image {
            Some(base) => {
                let source = match self.param_for(ParamTarget::BaseImagePath) {
                    Some(name) => name.to_owned(),
                    None => self.path_expr(&base.image_path),
                };
                self.w.comment(&base.name);
                self.w
                    .line(format!("result = Image.open({source}).convert(\"RGBA\")"));
            }
            None => {
                let size = project.canvas_size;
                self.w.comment("Blank canvas");
                self.w.line(format!(
                    "result = Image.new(\"RGBA\", ({}, {}), (255, 255, 255, 255))",
                    size.width, size.height
                ));
            }
        }
    }

    fn layer(&mut self, number: usize, layer: &Layer) {
        let kind = match layer.content {
            LayerContent::Image(_) => "image",
            LayerContent::Text(_) => "text",
        };
        if !layer.visible {
            self.w
                .comment(&format!("Layer {number}: {} ({kind}) is hidden", layer.name));
            return;
        }
        self.w.comment(&format!("Layer {number}: {} ({kind})", layer.name));
        match &layer.content {
            LayerContent::Image(image) => self.image_layer(number, layer, image),
            LayerContent::Text(text) => self.text_layer(number, layer, text),
        }
    }

    fn image_layer(&mut self, n: usize, layer: &Layer, image: &ImageLayer) {
        let param = self
            .param_for(ParamTarget::ImagePath(layer.id))
            .map(str::to_owned);
        let source = match (param, &image.image_path) {
            (Some(name), _) => name,
            (None, Some(path)) => self.path_expr(path),
            (None, None) => {
                self.w.comment(&format!(
                    "Warning: image layer \"{}\" has no image path, skipped",
                    layer.name
                ));
                return;
            }
        };
        let var = format!("image_{n}");
        let (w, h) = (image.size.width.max(1), image.size.height.max(1));
        let (x, y) = (layer.position.x, layer.position.y);

        self.w
            .line(format!("{var} = Image.open({source}).convert(\"RGBA\")"));
        self.w.line(format!("{var} = {var}.resize(({w}, {h}))"));
        if image.opacity < 1.0 {
            self.w.line(format!(
                "alpha_{n} = {var}.getchannel(\"A\").point(lambda a: int(a * {}))",
                float_literal(image.opacity)
            ));
            self.w.line(format!("{var}.putalpha(alpha_{n})"));
        }
        if image.rotation != 0.0 {
            // Pillow rotates counter-clockwise; expand keeps the corners and
            // the offset keeps the layer's center in place
            self.w.line(format!(
                "{var} = {var}.rotate({}, expand=True, resample=Image.Resampling.BICUBIC)",
                float_literal(-image.rotation)
            ));
            self.w.line(format!(
                "result.paste({var}, ({x} + ({w} - {var}.width) // 2, {y} + ({h} - {var}.height) // 2), {var})"
            ));
        } else {
            self.w.line(format!("result.paste({var}, ({x}, {y}), {var})"));
        }
    }

    fn text_layer(&mut self, n: usize, layer: &Layer, text: &TextLayer) {
        if !self.draw_ready {
            self.w.line("draw = ImageDraw.Draw(result)");
            self.draw_ready = true;
        }

        let param = self
            .param_for(ParamTarget::FontPath(layer.id))
            .map(str::to_owned);
        let font_source = match (param, &text.font_path) {
            (Some(name), _) => Some(name),
            (None, Some(path)) => Some(self.path_expr(path)),
            (None, None) => None,
        };
        let font = format!("font_{n}");
        match font_source {
            Some(source) => {
                self.w.block("try:", |w| {
                    w.line(format!(
                        "{font} = ImageFont.truetype({source}, {})",
                        text.font_size
                    ));
                });
                self.w.block("except (OSError, ValueError):", |w| {
                    w.line(format!("{font} = ImageFont.load_default()"));
                });
            }
            None => self.w.line(format!("{font} = ImageFont.load_default()")),
        }

        let content = match self.param_for(ParamTarget::Text(layer.id)) {
            Some(name) => name.to_owned(),
            None => string_literal(&text.text),
        };
        let (x, y) = (layer.position.x, layer.position.y);
        let aligned = text.horizontal_align != HorizontalAlign::Left
            || text.vertical_align != VerticalAlign::Top;

        let origin = if aligned {
            let bbox = format!("bbox_{n}");
            self.w.line(format!(
                "{bbox} = draw.textbbox((0, 0), {content}, font={font})"
            ));
            let text_x = match text.horizontal_align {
                HorizontalAlign::Left => x.to_string(),
                HorizontalAlign::Center => format!("{x} - ({bbox}[2] - {bbox}[0]) // 2"),
                HorizontalAlign::Right => format!("{x} - ({bbox}[2] - {bbox}[0])"),
            };
            let text_y = match text.vertical_align {
                VerticalAlign::Top => y.to_string(),
                VerticalAlign::Middle => format!("{y} - ({bbox}[3] - {bbox}[1]) // 2"),
                VerticalAlign::Bottom => format!("{y} - ({bbox}[3] - {bbox}[1])"),
            };
            self.w.line(format!("text_x_{n} = {text_x}"));
            self.w.line(format!("text_y_{n} = {text_y}"));
            format!("(text_x_{n}, text_y_{n})")
        } else {
            format!("({x}, {y})")
        };

        let [r, g, b, a] = text.color.0;
        self.w.line(format!(
            "draw.text({origin}, {content}, font={font}, fill=({r}, {g}, {b}, {a}))"
        ));
    }

    fn example(&mut self) {
        let call_args: Vec<String> = self
            .signature
            .iter()
            .map(|param| format!("{}={}", param.name, self.example_value(param)))
            .collect();
        let function = self.options.function_name.clone();
        let save = matches!(self.options.output, OutputMode::ReturnImage);
        self.w.block("if __name__ == \"__main__\":", |w| {
            if call_args.is_empty() {
                w.line(format!("image = {function}()"));
            } else {
                w.line(format!("image = {function}("));
                w.indent();
                for arg in &call_args {
                    w.line(format!("{arg},"));
                }
                w.dedent();
                w.line(")");
            }
            if save {
                w.line("image.save(\"output.png\")");
            }
            w.line("print(f\"Generated image: {image.size[0]}x{image.size[1]}\")");
        });
    }

    /// Current design value of the attribute, or a placeholder
    fn example_value(&self, param: &Parameter) -> String {
        let project = self.project;
        let value = match param.target {
            Some(ParamTarget::BaseImagePath) => project
                .base_image
                .as_ref()
                .map(|base| self.path_expr(&base.image_path)),
            Some(ParamTarget::ImagePath(id)) => project
                .get_layer(id)
                .and_then(Layer::as_image)
                .and_then(|image| image.image_path.as_deref())
                .map(|path| self.path_expr(path)),
            Some(ParamTarget::FontPath(id)) => project
                .get_layer(id)
                .and_then(Layer::as_text)
                .and_then(|text| text.font_path.as_deref())
                .map(|path| self.path_expr(path)),
            Some(ParamTarget::Text(id)) => project
                .get_layer(id)
                .and_then(Layer::as_text)
                .map(|text| string_literal(&text.text)),
            None => None,
        };
        value.unwrap_or_else(|| {
            let placeholder = match param.kind {
                ParamKind::ImagePath => "path/to/image.png",
                ParamKind::FontPath => "path/to/font.ttf",
                ParamKind::Text => "Example text",
                ParamKind::OutputPath => "output.png",
            };
            string_literal(placeholder)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{BaseImage, Rgba, Size};

    fn drawing_calls(code: &str) -> Vec<&str> {
        code.lines()
            .map(str::trim)
            .filter(|line| line.starts_with("result.paste(") || line.starts_with("draw.text("))
            .collect()
    }

    #[test]
    fn empty_project_draws_on_blank_canvas() {
        let code = generate(&Project::new(), &CodegenOptions::default()).unwrap();
        assert!(code.contains("def generate_image():"));
        assert!(code.contains("Image.new(\"RGBA\", (800, 600), (255, 255, 255, 255))"));
        assert!(code.contains("    return result\n"));
        assert!(code.contains("image = generate_image()"));
        assert!(drawing_calls(&code).is_empty());
    }

    #[test]
    fn one_drawing_call_per_visible_layer_in_order() {
        let mut project = Project::new();
        project.set_base_image(BaseImage::new("/assets/bg.png".into()));
        project.add_layer(Layer::new_image("Logo", Some("/assets/logo.png".into()), Size::new(50, 40)));
        project.add_layer(Layer::new_text("Title", "Hello").with_position(10, 20));
        let mut hidden = Layer::new_text("Hidden", "nope");
        hidden.visible = false;
        project.add_layer(hidden);
        project.add_layer(Layer::new_image("Stamp", Some("/assets/stamp.png".into()), Size::default()));

        let code = generate(&project, &CodegenOptions::default()).unwrap();
        let calls = drawing_calls(&code);
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("result.paste(image_1"));
        assert!(calls[1].starts_with("draw.text((10, 20), \"Hello\""));
        assert!(calls[2].starts_with("result.paste(image_4"));
        assert!(code.contains("# Layer 3: Hidden (text) is hidden"));
        assert!(code.contains("Image.open(\"/assets/bg.png\").convert(\"RGBA\")"));
        assert_eq!(code.matches("ImageDraw.Draw(result)").count(), 1);
    }

    #[test]
    fn rotation_and_opacity_are_emitted() {
        let mut layer = Layer::new_image("Logo", Some("/a/logo.png".into()), Size::new(200, 100));
        layer.set_position(5, 6);
        let image = layer.as_image_mut().unwrap();
        image.set_rotation(15.0);
        image.set_opacity(0.5);
        let mut project = Project::new();
        project.add_layer(layer);

        let code = generate(&project, &CodegenOptions::default()).unwrap();
        assert!(code.contains("image_1 = image_1.resize((200, 100))"));
        assert!(code.contains("point(lambda a: int(a * 0.5))"));
        assert!(code.contains("image_1.rotate(-15.0, expand=True"));
        assert!(code.contains(
            "result.paste(image_1, (5 + (200 - image_1.width) // 2, 6 + (100 - image_1.height) // 2), image_1)"
        ));
    }

    #[test]
    fn parameters_replace_literals_and_lead_with_output_path() {
        let mut project = Project::new();
        let mut text = Layer::new_text("Title", "Hi \"there\"");
        text.as_text_mut().unwrap().font_path = Some("/fonts/a.ttf".into());
        text.as_text_mut().unwrap().color = Rgba([255, 0, 0, 128]);
        let id = text.id;
        project.add_layer(text);
        project.set_parameter(ParamTarget::FontPath(id), true);
        project.set_parameter(ParamTarget::Text(id), true);

        let options = CodegenOptions {
            output: OutputMode::SaveToPath {
                param_name: "output_path".into(),
            },
            ..CodegenOptions::default()
        };
        let code = generate(&project, &options).unwrap();
        assert!(code.contains(
            "def generate_image(output_path: str, font_path: str, text: str):"
        ));
        assert!(code.contains("font_1 = ImageFont.truetype(font_path, 24)"));
        assert!(code.contains("except (OSError, ValueError):"));
        assert!(code.contains("draw.text((0, 0), text, font=font_1, fill=(255, 0, 0, 128))"));
        assert!(code.contains("result.save(output_path)"));
        assert!(code.contains("text=\"Hi \\\"there\\\"\","));
        assert!(!code.contains("image.save(\"output.png\")"));
    }

    #[test]
    fn alignment_uses_text_bbox() {
        let mut layer = Layer::new_text("T", "x").with_position(100, 50);
        let text = layer.as_text_mut().unwrap();
        text.horizontal_align = HorizontalAlign::Center;
        text.vertical_align = VerticalAlign::Bottom;
        let mut project = Project::new();
        project.add_layer(layer);

        let code = generate(&project, &CodegenOptions::default()).unwrap();
        assert!(code.contains("bbox_1 = draw.textbbox((0, 0), \"x\", font=font_1)"));
        assert!(code.contains("text_x_1 = 100 - (bbox_1[2] - bbox_1[0]) // 2"));
        assert!(code.contains("text_y_1 = 50 - (bbox_1[3] - bbox_1[1])"));
        assert!(code.contains("draw.text((text_x_1, text_y_1), \"x\""));
    }

    #[test]
    fn image_without_source_is_skipped_with_warning() {
        let mut project = Project::new();
        project.add_layer(Layer::new_image("Empty", None, Size::default()));
        let code = generate(&project, &CodegenOptions::default()).unwrap();
        assert!(code.contains("# Warning: image layer \"Empty\" has no image path, skipped"));
        assert!(drawing_calls(&code).is_empty());
    }

    #[test]
    fn zero_extent_is_emitted_as_one_pixel() {
        let mut layer = Layer::new_image("Logo", Some("/img/logo.png".into()), Size::default());
        layer.as_image_mut().unwrap().size = Size {
            width: 0,
            height: 50,
        };
        let mut project = Project::new();
        project.add_layer(layer);
        let code = generate(&project, &CodegenOptions::default()).unwrap();
        assert!(code.contains("image_1 = image_1.resize((1, 50))"));
    }

    #[test]
    fn relative_paths_when_requested() {
        let mut project = Project::new();
        project.set_base_image(BaseImage::new("/work/card/bg.png".into()));
        let options = CodegenOptions {
            relative_to: Some("/work/card".into()),
            ..CodegenOptions::default()
        };
        let code = generate(&project, &options).unwrap();
        assert!(code.contains("Image.open(\"bg.png\")"));
    }

    #[test]
    fn bad_names_are_rejected() {
        let mut project = Project::new();
        let options = CodegenOptions {
            function_name: "make card".into(),
            ..CodegenOptions::default()
        };
        assert!(matches!(
            generate(&project, &options),
            Err(CodegenError::InvalidIdentifier { .. })
        ));

        let layer = Layer::new_text("T", "x");
        let id = layer.id;
        project.add_layer(layer);
        project.set_parameter(ParamTarget::Text(id), true);
        project.binding_mut(ParamTarget::Text(id)).unwrap().name = "result".into();
        assert_eq!(
            generate(&project, &CodegenOptions::default()),
            Err(CodegenError::ReservedName {
                name: "result".into()
            })
        );

        project.binding_mut(ParamTarget::Text(id)).unwrap().name = "font_path".into();
        assert!(generate(&project, &CodegenOptions::default()).is_ok());
    }
}
