use std::path::{Path, PathBuf};

use crate::codegen::{CodegenOptions, DEFAULT_OUTPUT_PARAM, OutputMode};
use crate::project::DEFAULT_FUNCTION_NAME;

pub const MAX_RECENT_FILES: usize = 8;

/// Preferences restored between runs through eframe's storage
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppSettings {
    pub recent_files: Vec<PathBuf>,
    /// Function name given to new projects
    pub default_function_name: String,
    pub save_to_path: bool,
    pub output_param_name: String,
    pub show_grid: bool,
    pub include_example: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
            default_function_name: DEFAULT_FUNCTION_NAME.to_owned(),
            save_to_path: false,
            output_param_name: DEFAULT_OUTPUT_PARAM.to_owned(),
            show_grid: true,
            include_example: true,
        }
    }
}

impl AppSettings {
    /// Moves `path` to the front of the recent list
    pub fn push_recent(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn forget_recent(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.save_to_path {
            OutputMode::SaveToPath {
                param_name: self.output_param_name.clone(),
            }
        } else {
            OutputMode::ReturnImage
        }
    }

    pub fn codegen_options(&self, function_name: &str) -> CodegenOptions {
        CodegenOptions {
            function_name: function_name.trim().to_owned(),
            output: self.output_mode(),
            relative_to: None,
            include_example: self.include_example,
        }
    }
}
