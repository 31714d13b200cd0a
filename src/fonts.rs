//! Font files referenced by text layers, installed into egui for the canvas preview.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use egui::{Context, FontData, FontDefinitions, FontFamily};

/// sfnt version tags of TrueType, OpenType and collection files
const FONT_MAGIC: [&[u8; 4]; 4] = [b"\x00\x01\x00\x00", b"OTTO", b"true", b"ttcf"];

pub fn looks_like_font(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && FONT_MAGIC.iter().any(|magic| bytes.starts_with(*magic))
}

/// Loads fonts on demand and hands out the egui family to draw them with.
///
/// egui applies new font definitions at the start of the next frame, so a font
/// previews with the default family for one frame after it is first requested.
pub struct FontRegistry {
    definitions: FontDefinitions,
    families: HashMap<PathBuf, String>,
    failed: HashSet<PathBuf>,
    dirty: bool,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self {
            definitions: FontDefinitions::default(),
            families: HashMap::new(),
            failed: HashSet::new(),
            dirty: false,
        }
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Family for `font_path`, falling back to the proportional default
    pub fn family_for(&mut self, ctx: &Context, font_path: Option<&Path>) -> FontFamily {
        let Some(path) = font_path else {
            return FontFamily::Proportional;
        };
        if self.failed.contains(path) {
            return FontFamily::Proportional;
        }
        let name = match self.families.get(path) {
            Some(name) => name.clone(),
            None => match self.load(path) {
                Some(name) => name,
                None => return FontFamily::Proportional,
            },
        };

        let family = FontFamily::Name(name.into());
        // Using a family egui has not installed yet panics
        if ctx.fonts(|fonts| fonts.families().contains(&family)) {
            family
        } else {
            FontFamily::Proportional
        }
    }

    fn load(&mut self, path: &Path) -> Option<String> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Cannot read font {}: {err}; using default font", path.display());
                self.failed.insert(path.to_path_buf());
                return None;
            }
        };
        if !looks_like_font(&bytes) {
            log::warn!("{} is not a TrueType/OpenType font; using default font", path.display());
            self.failed.insert(path.to_path_buf());
            return None;
        }

        let name = format!("layer-font-{}", self.families.len());
        self.definitions
            .font_data
            .insert(name.clone(), FontData::from_owned(bytes).into());
        let mut fallback = vec![name.clone()];
        fallback.extend(
            self.definitions
                .families
                .get(&FontFamily::Proportional)
                .cloned()
                .unwrap_or_default(),
        );
        self.definitions
            .families
            .insert(FontFamily::Name(name.clone().into()), fallback);
        self.families.insert(path.to_path_buf(), name.clone());
        self.dirty = true;
        log::info!("Loaded font {}", path.display());
        Some(name)
    }

    /// Pushes newly loaded fonts to egui; call once per frame
    pub fn install(&mut self, ctx: &Context) {
        if self.dirty {
            ctx.set_fonts(self.definitions.clone());
            self.dirty = false;
        }
    }

    /// Forgets a failure so the file is read again, e.g. after the path was edited
    pub fn retry(&mut self, path: &Path) {
        self.failed.remove(path);
    }

    pub fn is_failed(&self, path: &Path) -> bool {
        self.failed.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_font_headers() {
        assert!(looks_like_font(b"\x00\x01\x00\x00\x00\x0a\x00\x80\x00\x03\x00\x20"));
        assert!(looks_like_font(b"OTTO\x00\x0a\x00\x80\x00\x03\x00\x20"));
        assert!(!looks_like_font(b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0d"));
        assert!(!looks_like_font(b"OTTO"));
    }

    #[test]
    fn unreadable_font_falls_back_and_is_remembered() {
        let ctx = Context::default();
        let mut registry = FontRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        fs::write(&bogus, b"definitely not a font").unwrap();

        assert_eq!(registry.family_for(&ctx, Some(&bogus)), FontFamily::Proportional);
        assert!(registry.is_failed(&bogus));
        assert_eq!(registry.family_for(&ctx, None), FontFamily::Proportional);

        let missing = dir.path().join("missing.ttf");
        assert_eq!(registry.family_for(&ctx, Some(&missing)), FontFamily::Proportional);
        assert!(registry.is_failed(&missing));
    }
}
