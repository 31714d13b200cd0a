//! Collection of the attributes promoted to arguments of the generated function.

use std::collections::HashSet;

use crate::codegen::python;
use crate::error::CodegenError;
use crate::layer::{LayerContent, LayerId, ParamBinding};
use crate::project::Project;

/// Which attribute a parameter binding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
    BaseImagePath,
    ImagePath(LayerId),
    Text(LayerId),
    FontPath(LayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    ImagePath,
    Text,
    FontPath,
    OutputPath,
}

impl ParamKind {
    pub fn python_type(&self) -> &'static str {
        "str"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub target: Option<ParamTarget>,
    pub description: String,
    pub order: u64,
}

impl Parameter {
    pub fn output_path(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ParamKind::OutputPath,
            target: None,
            description: "Output image path".to_owned(),
            order: 0,
        }
    }
}

fn push(
    out: &mut Vec<(usize, Parameter)>,
    rank: usize,
    binding: &ParamBinding,
    kind: ParamKind,
    target: ParamTarget,
    description: String,
) {
    if binding.enabled {
        out.push((
            rank,
            Parameter {
                name: binding.name.trim().to_owned(),
                kind,
                target: Some(target),
                description,
                order: binding.order,
            },
        ));
    }
}

/// Every enabled binding in the order it was marked. Ties (e.g. hand-edited
/// project files) fall back to layer order. Hidden layers still contribute so
/// the signature does not change when a layer is toggled.
pub fn collect_parameters(project: &Project) -> Vec<Parameter> {
    let mut ranked = Vec::new();

    if let Some(base) = &project.base_image {
        push(
            &mut ranked,
            0,
            &base.path_param,
            ParamKind::ImagePath,
            ParamTarget::BaseImagePath,
            "Base image path".to_owned(),
        );
    }

    for (index, layer) in project.layers().iter().enumerate() {
        let rank = index + 1;
        match &layer.content {
            LayerContent::Image(image) => push(
                &mut ranked,
                rank,
                &image.path_param,
                ParamKind::ImagePath,
                ParamTarget::ImagePath(layer.id),
                format!("Image path - {}", layer.name),
            ),
            LayerContent::Text(text) => {
                push(
                    &mut ranked,
                    rank,
                    &text.text_param,
                    ParamKind::Text,
                    ParamTarget::Text(layer.id),
                    format!("Text - {}", layer.name),
                );
                push(
                    &mut ranked,
                    rank,
                    &text.font_param,
                    ParamKind::FontPath,
                    ParamTarget::FontPath(layer.id),
                    format!("Font path - {}", layer.name),
                );
            }
        }
    }

    // stable sort keeps text before font for the same layer on ties
    ranked.sort_by_key(|(rank, param)| (param.order, *rank));
    ranked.into_iter().map(|(_, param)| param).collect()
}

/// Checks that every name is a usable, unique Python identifier
pub fn validate_parameters(params: &[Parameter]) -> Result<(), CodegenError> {
    let mut seen = HashSet::new();
    for param in params {
        if !python::is_identifier(&param.name) || python::is_keyword(&param.name) {
            return Err(CodegenError::InvalidIdentifier {
                name: param.name.clone(),
                context: param.description.clone(),
            });
        }
        if !seen.insert(param.name.as_str()) {
            return Err(CodegenError::DuplicateParameter {
                name: param.name.clone(),
            });
        }
    }
    Ok(())
}
