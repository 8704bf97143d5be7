//! Font loading.
//!
//! Invoices are set in DejaVu Sans Condensed, embedded in the binary, so rendering never depends
//! on what is installed on the host. A different family can be selected through [`FontConfig`]:
//! it is looked up first as variant files (`Name-Bold.ttf`, `Name_Italic.otf`, ...) in the
//! configured paths, then among the system fonts known to `fontdb`. Every candidate is parsed
//! with `rusttype` before it is accepted.
//!
//! A [`FontSource`] keeps the raw bytes of the four faces behind `Arc`s. It is resolved once
//! and then cloned into every render; each render builds its own [`FontFamily`] from it.

use fontdb::{Database, Family, Query, Stretch, Weight};
use genpdfi_extended::error::{Error, ErrorKind};
use genpdfi_extended::fonts::{FontData, FontFamily};
use log::{debug, info};
use once_cell::sync::Lazy;
use rusttype::Font;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static SANS_REGULAR: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed.ttf");
static SANS_BOLD: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed-Bold.ttf");
static SANS_ITALIC: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed-Oblique.ttf");
static SANS_BOLD_ITALIC: &[u8] = include_bytes!("../../fonts/DejaVuSansCondensed-BoldOblique.ttf");

/// Name of the embedded family.
pub const EMBEDDED_FAMILY: &str = "DejaVu Sans Condensed";

static EMBEDDED: Lazy<FontSource> = Lazy::new(|| FontSource {
    name: EMBEDDED_FAMILY.to_string(),
    regular: Arc::new(SANS_REGULAR.to_vec()),
    bold: Arc::new(SANS_BOLD.to_vec()),
    italic: Arc::new(SANS_ITALIC.to_vec()),
    bold_italic: Arc::new(SANS_BOLD_ITALIC.to_vec()),
});

/// Lists the family names that resolve to embedded fonts.
pub fn known_embedded_families() -> Vec<&'static str> {
    vec![EMBEDDED_FAMILY]
}

fn is_embedded_family(name: &str) -> bool {
    let l = name.to_ascii_lowercase();
    l.contains("dejavu") && (l.contains("sans") || l.contains("condensed"))
}

/// User font selection.
#[derive(Debug, Clone, Default)]
pub struct FontConfig {
    /// Directories or font files searched before the system fonts.
    pub custom_paths: Vec<PathBuf>,
    /// Family to use instead of the embedded one.
    pub default_font: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum FontVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    fn suffixes(&self) -> &[&str] {
        match self {
            FontVariant::Regular => &["", "regular"],
            FontVariant::Bold => &["bold", "bd", "b"],
            FontVariant::Italic => &["italic", "it", "i", "oblique"],
            FontVariant::BoldItalic => &["bolditalic", "bold italic", "boldoblique", "bdit", "bi"],
        }
    }

    fn weight(&self) -> Weight {
        match self {
            FontVariant::Regular | FontVariant::Italic => Weight::NORMAL,
            FontVariant::Bold | FontVariant::BoldItalic => Weight::BOLD,
        }
    }

    fn style(&self) -> fontdb::Style {
        match self {
            FontVariant::Regular | FontVariant::Bold => fontdb::Style::Normal,
            FontVariant::Italic | FontVariant::BoldItalic => fontdb::Style::Italic,
        }
    }
}

/// Raw bytes of the four faces of one font family.
#[derive(Debug, Clone)]
pub struct FontSource {
    name: String,
    regular: Arc<Vec<u8>>,
    bold: Arc<Vec<u8>>,
    italic: Arc<Vec<u8>>,
    bold_italic: Arc<Vec<u8>>,
}

impl FontSource {
    /// The embedded DejaVu Sans Condensed family.
    pub fn embedded() -> FontSource {
        EMBEDDED.clone()
    }

    /// Resolves the family selected by `config`.
    ///
    /// Without a `default_font`, or when it names the embedded family, this is
    /// [`FontSource::embedded`]. Missing bold or italic faces fall back to the regular face.
    pub fn from_config(config: &FontConfig) -> Result<FontSource, Error> {
        let name = match config.default_font.as_deref() {
            None => return Ok(Self::embedded()),
            Some(name) if is_embedded_family(name) => {
                debug!("Using embedded font family '{}' for '{}'", EMBEDDED_FAMILY, name);
                return Ok(Self::embedded());
            }
            Some(name) => name,
        };

        if let Some(source) = Self::from_paths(name, &config.custom_paths) {
            info!("Loaded font '{}' from custom paths", name);
            return Ok(source);
        }
        if let Some(source) = Self::from_system(name) {
            info!("Loaded font '{}' from system fonts", name);
            return Ok(source);
        }

        Err(Error::new(
            format!("No usable font found for family '{}'", name),
            ErrorKind::InvalidFont,
        ))
    }

    fn from_paths(name: &str, custom_paths: &[PathBuf]) -> Option<FontSource> {
        let regular = Arc::new(find_font_variant_in_paths(name, FontVariant::Regular, custom_paths)?);
        let variant = |v| {
            find_font_variant_in_paths(name, v, custom_paths)
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&regular))
        };
        Some(FontSource {
            name: name.to_string(),
            bold: variant(FontVariant::Bold),
            italic: variant(FontVariant::Italic),
            bold_italic: variant(FontVariant::BoldItalic),
            regular: Arc::clone(&regular),
        })
    }

    fn from_system(name: &str) -> Option<FontSource> {
        let mut db = Database::new();
        db.load_system_fonts();

        let regular = Arc::new(query_system_face(&db, name, FontVariant::Regular)?);
        let variant = |v| {
            query_system_face(&db, name, v)
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&regular))
        };
        Some(FontSource {
            name: name.to_string(),
            bold: variant(FontVariant::Bold),
            italic: variant(FontVariant::Italic),
            bold_italic: variant(FontVariant::BoldItalic),
            regular: Arc::clone(&regular),
        })
    }

    /// Family name as requested.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a layout-engine font family sharing this source's bytes.
    pub fn font_family(&self) -> Result<FontFamily<FontData>, Error> {
        let mk = |bytes: &Arc<Vec<u8>>| FontData::new_shared(Arc::clone(bytes), None);
        Ok(FontFamily {
            regular: mk(&self.regular)?,
            bold: mk(&self.bold)?,
            italic: mk(&self.italic)?,
            bold_italic: mk(&self.bold_italic)?,
        })
    }
}

fn is_valid_font(bytes: &[u8]) -> bool {
    Font::try_from_bytes(bytes).is_some()
}

fn query_system_face(db: &Database, name: &str, variant: FontVariant) -> Option<Vec<u8>> {
    let families = [Family::Name(name)];
    let query = Query {
        families: &families,
        weight: variant.weight(),
        style: variant.style(),
        stretch: Stretch::Normal,
    };
    let id = db.query(&query)?;
    // Collections share tables between faces; only the first face is usable here.
    let bytes = db.with_face_data(id, |data, index| (index == 0).then(|| data.to_vec()))??;
    if is_valid_font(&bytes) {
        Some(bytes)
    } else {
        debug!("Skipping unparsable system face for '{}'", name);
        None
    }
}

fn font_files(custom_path: &Path) -> Vec<PathBuf> {
    let is_font = |p: &Path| {
        p.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
    };

    if custom_path.is_file() {
        return vec![custom_path.to_path_buf()].into_iter().filter(|p| is_font(p)).collect();
    }
    let Ok(entries) = fs::read_dir(custom_path) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| is_font(p))
        .collect();
    files.sort();
    files
}

/// Finds a face file whose stem is the family name, optionally followed by a variant suffix.
///
/// `DejaVu Sans` matches `dejavusans-bold.ttf`, `DejaVu_Sans_Bold.otf` or `dejavu sans bold.ttf`.
fn find_font_variant_in_paths(
    base_name: &str,
    variant: FontVariant,
    custom_paths: &[PathBuf],
) -> Option<Vec<u8>> {
    let base_raw = base_name.to_lowercase();
    let bases = [
        base_raw.clone(),
        base_raw.replace(' ', ""),
        base_raw.replace(' ', "-"),
        base_raw.replace(' ', "_"),
    ];

    for custom_path in custom_paths {
        for path in font_files(custom_path) {
            let Some(stem) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = stem.to_lowercase();

            let matches = bases.iter().any(|base| {
                variant.suffixes().iter().any(|suffix| {
                    if suffix.is_empty() {
                        stem == *base
                    } else {
                        ["-", "_", " ", ""]
                            .iter()
                            .any(|sep| stem == format!("{}{}{}", base, sep, suffix))
                    }
                })
            });
            if !matches {
                continue;
            }

            match fs::read(&path) {
                Ok(bytes) if is_valid_font(&bytes) => {
                    debug!("Found {:?} face for '{}' at {:?}", variant, base_name, path);
                    return Some(bytes);
                }
                Ok(_) => debug!("Skipping unparsable font file {:?}", path),
                Err(e) => debug!("Failed to read font file {:?}: {}", path, e),
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_family_loads() {
        let source = FontSource::embedded();
        assert_eq!(source.name(), EMBEDDED_FAMILY);
        assert_eq!(source.regular.len(), SANS_REGULAR.len());
        assert!(source.font_family().is_ok());
    }

    #[test]
    fn embedded_source_shares_bytes() {
        let a = FontSource::embedded();
        let b = FontSource::embedded();
        assert!(Arc::ptr_eq(&a.bold, &b.bold));
    }

    #[test]
    fn embedded_faces_are_valid() {
        for bytes in [SANS_REGULAR, SANS_BOLD, SANS_ITALIC, SANS_BOLD_ITALIC] {
            assert!(is_valid_font(bytes));
        }
        assert!(!is_valid_font(b"not a font"));
    }

    #[test]
    fn default_config_uses_embedded_family() {
        let source = FontSource::from_config(&FontConfig::default()).unwrap();
        assert_eq!(source.name(), EMBEDDED_FAMILY);

        let config = FontConfig {
            default_font: Some("dejavu sans".into()),
            ..FontConfig::default()
        };
        assert_eq!(FontSource::from_config(&config).unwrap().name(), EMBEDDED_FAMILY);
    }

    #[test]
    fn finds_variants_in_custom_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Invoice Face.ttf"), SANS_REGULAR).unwrap();
        fs::write(dir.path().join("invoice_face-bold.ttf"), SANS_BOLD).unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let config = FontConfig {
            custom_paths: vec![dir.path().to_path_buf()],
            default_font: Some("Invoice Face".into()),
        };
        let source = FontSource::from_config(&config).unwrap();
        assert_eq!(source.name(), "Invoice Face");
        assert_eq!(source.regular.len(), SANS_REGULAR.len());
        assert_eq!(source.bold.len(), SANS_BOLD.len());
        // No italic file: the regular face stands in.
        assert!(Arc::ptr_eq(&source.italic, &source.regular));
        assert!(source.font_family().is_ok());
    }

    #[test]
    fn skips_invalid_font_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Broken.ttf"), b"garbage").unwrap();
        assert!(find_font_variant_in_paths("Broken", FontVariant::Regular, &[dir.path().to_path_buf()])
            .is_none());
    }

    #[test]
    fn accepts_direct_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Ledger.ttf");
        fs::write(&file, SANS_REGULAR).unwrap();
        let bytes = find_font_variant_in_paths("Ledger", FontVariant::Regular, &[file]);
        assert_eq!(bytes.map(|b| b.len()), Some(SANS_REGULAR.len()));
    }

    #[test]
    fn unknown_family_is_an_error() {
        let config = FontConfig {
            custom_paths: Vec::new(),
            default_font: Some("No Such Family 7f3a9c".into()),
        };
        assert!(FontSource::from_config(&config).is_err());
    }

    #[test]
    fn lists_embedded_family() {
        assert_eq!(known_embedded_families(), vec![EMBEDDED_FAMILY]);
        assert!(is_embedded_family("DejaVu Sans Condensed"));
        assert!(!is_embedded_family("Liberation Serif"));
    }
}
