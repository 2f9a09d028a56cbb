//! Lazily resolved overlay font

use std::path::Path;
use std::sync::OnceLock;

use ab_glyph::{Font, FontVec};
use posture_analysis::Locale;
use tracing::{debug, warn};

/// Character a font must cover to render the locale
fn sample_char(locale: Locale) -> char {
    match locale {
        Locale::English => 'A',
        Locale::Japanese => '姿',
    }
}

/// Font resource owned by one renderer.
///
/// The probe runs on first use and its outcome, including "no usable font",
/// is kept for the handle's lifetime. Dropping the handle releases the font.
pub struct FontHandle {
    paths: Vec<String>,
    locale: Locale,
    font: OnceLock<Option<FontVec>>,
}

impl FontHandle {
    pub fn new(paths: Vec<String>, locale: Locale) -> Self {
        Self {
            paths,
            locale,
            font: OnceLock::new(),
        }
    }

    /// The font, or `None` when no probed path yields one covering the locale
    pub fn get(&self) -> Option<&FontVec> {
        self.font.get_or_init(|| self.probe()).as_ref()
    }

    fn probe(&self) -> Option<FontVec> {
        let needed = sample_char(self.locale);
        for path in &self.paths {
            match load(Path::new(path)) {
                Ok(font) if font.glyph_id(needed).0 != 0 => {
                    debug!("Using overlay font {}", path);
                    return Some(font);
                }
                Ok(_) => debug!("Font {} lacks glyphs for {:?}", path, self.locale),
                Err(e) => debug!("Font {} unusable: {}", path, e),
            }
        }
        warn!(
            "No font covering {:?} found in {} probed paths, overlay text disabled",
            self.locale,
            self.paths.len()
        );
        None
    }
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.font.get() {
            None => "unresolved",
            Some(None) => "unavailable",
            Some(Some(_)) => "loaded",
        };
        f.debug_struct("FontHandle")
            .field("paths", &self.paths)
            .field("locale", &self.locale)
            .field("font", &state)
            .finish()
    }
}

fn load(path: &Path) -> Result<FontVec, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    // Index 0 works for both single fonts and collections
    FontVec::try_from_vec_and_index(data, 0).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fonts_resolve_to_none() {
        let handle = FontHandle::new(
            vec!["/nonexistent/a.ttf".to_string(), "/nonexistent/b.ttc".to_string()],
            Locale::Japanese,
        );
        assert!(handle.get().is_none());
        // Outcome is cached
        assert!(handle.get().is_none());
    }

    #[test]
    fn test_empty_probe_list() {
        let handle = FontHandle::new(Vec::new(), Locale::English);
        assert!(handle.get().is_none());
    }
}
