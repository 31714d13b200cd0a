#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod codegen;
pub mod command;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod fonts;
pub mod layer;
pub mod panels;
pub mod params;
pub mod project;
pub mod project_file;
pub mod selection;
pub mod settings;
pub mod texture_manager;

pub use app::PillowApp;
pub use codegen::{CodegenOptions, OutputMode, generate};
pub use command::{Command, CommandHistory};
pub use error::{CodegenError, ProjectFileError};
pub use layer::{BaseImage, Layer, LayerContent, LayerId};
pub use project::Project;
pub use project_file::ProjectManager;
