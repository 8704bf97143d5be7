//! Style overrides loaded from TOML.
//!
//! The invoice layout (page size, margins, block order, column widths) is fixed. What a TOML
//! file can change is how the text looks: sizes, colors, alignment, weight and the spacing
//! around headings. Each section overrides one style of [`LayoutStyle`]; anything left out keeps
//! its default.
//!
//! # Sections
//!
//! - `title`, `subtitle` and `body` for the document heading, section headings and footer
//! - `product_name` for the wrapping first column of the product table
//! - `table.header`, `table.cell` and `table.total` for the product table rows
//! - `customer.label` and `customer.value` for the customer table
//! - `colors` with `grid` and `rule` for the product table lines
//!
//! # Style Properties
//!
//! - `size` - Font size in points (integer)
//! - `textcolor` - Text color: `{ r = 0, g = 0, b = 0 }`
//! - `backgroundcolor` - Cell background color: `{ r = 255, g = 255, b = 255 }`
//! - `alignment` - "left", "center" or "right"
//! - `bold`, `italic` - Booleans
//! - `beforespacing`, `afterspacing` - Space around headings in points (float)
//!
//! ```toml
//! [title]
//! size = 28
//! textcolor = { r = 120, g = 0, b = 0 }
//!
//! [table.header]
//! backgroundcolor = { r = 40, g = 40, b = 40 }
//!
//! [colors]
//! grid = { r = 200, g = 200, b = 200 }
//! ```
//!
//! Invalid TOML, or a file that cannot be read, yields the default theme. A warning is logged
//! in both cases.

use crate::styling::{BasicTextStyle, LayoutStyle, Palette, Rgb, TextAlignment};
use log::warn;
use std::fs;
use std::path::Path;
use toml::Value;

/// Where the style configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Built-in theme.
    Default,
    /// A TOML file on disk.
    File(&'a str),
    /// TOML text, typically from `include_str!`.
    Embedded(&'a str),
}

fn parse_color(value: Option<&Value>, field: &str) -> Option<Rgb> {
    value.and_then(|c| {
        let color = c.get(field)?;
        let r = color.get("r")?.as_integer()?;
        let g = color.get("g")?.as_integer()?;
        let b = color.get("b")?.as_integer()?;
        Some((
            u8::try_from(r).ok()?,
            u8::try_from(g).ok()?,
            u8::try_from(b).ok()?,
        ))
    })
}

fn parse_alignment(value: Option<&Value>) -> Option<TextAlignment> {
    value.and_then(|v| v.as_str()).map(|s| match s {
        "center" => TextAlignment::Center,
        "right" => TextAlignment::Right,
        _ => TextAlignment::Left,
    })
}

/// Applies the properties present in `value` on top of `default`.
fn parse_style(value: Option<&Value>, default: BasicTextStyle) -> BasicTextStyle {
    let mut style = default;
    if let Some(style_config) = value {
        if let Some(size) = style_config
            .get("size")
            .and_then(|v| v.as_integer())
            .and_then(|s| u8::try_from(s).ok())
            .filter(|s| *s > 0)
        {
            style.size = size;
        }

        if let Some(spacing) = style_config.get("beforespacing").and_then(as_points) {
            style.before_spacing = spacing;
        }
        if let Some(spacing) = style_config.get("afterspacing").and_then(as_points) {
            style.after_spacing = spacing;
        }

        if let Some(color) = parse_color(Some(style_config), "textcolor") {
            style.text_color = Some(color);
        }
        if let Some(bg_color) = parse_color(Some(style_config), "backgroundcolor") {
            style.background_color = Some(bg_color);
        }

        if let Some(alignment) = parse_alignment(style_config.get("alignment")) {
            style.alignment = Some(alignment);
        }

        if let Some(bold) = style_config.get("bold").and_then(|v| v.as_bool()) {
            style.bold = bold;
        }
        if let Some(italic) = style_config.get("italic").and_then(|v| v.as_bool()) {
            style.italic = italic;
        }
    }
    style
}

/// Accepts both `1.5` and `2` for spacing values.
fn as_points(value: &Value) -> Option<f32> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .map(|f| f as f32)
}

fn parse_palette(value: Option<&Value>, default: Palette) -> Palette {
    Palette {
        grid: parse_color(value, "grid").unwrap_or(default.grid),
        rule: parse_color(value, "rule").unwrap_or(default.rule),
    }
}

fn section<'v>(config: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(config, |value, key| value.get(key))
}

/// Parses TOML text into a complete theme, falling back to defaults for anything missing.
///
/// ```rust
/// use invoice2pdf::config::parse_config_string;
///
/// let style = parse_config_string(r#"
/// [table.total]
/// size = 14
///
/// [customer.label]
/// bold = false
/// "#);
/// assert_eq!(style.table_total.size, 14);
/// assert!(!style.customer_label.bold);
/// assert_eq!(style.title.size, 24);
/// ```
pub fn parse_config_string(config_str: &str) -> LayoutStyle {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring invalid style configuration: {}", e);
            return LayoutStyle::default();
        }
    };

    let defaults = LayoutStyle::default();
    LayoutStyle {
        title: parse_style(section(&config, &["title"]), defaults.title),
        subtitle: parse_style(section(&config, &["subtitle"]), defaults.subtitle),
        body: parse_style(section(&config, &["body"]), defaults.body),
        product_name: parse_style(section(&config, &["product_name"]), defaults.product_name),
        table_header: parse_style(section(&config, &["table", "header"]), defaults.table_header),
        table_cell: parse_style(section(&config, &["table", "cell"]), defaults.table_cell),
        table_total: parse_style(section(&config, &["table", "total"]), defaults.table_total),
        customer_label: parse_style(
            section(&config, &["customer", "label"]),
            defaults.customer_label,
        ),
        customer_value: parse_style(
            section(&config, &["customer", "value"]),
            defaults.customer_value,
        ),
        colors: parse_palette(config.get("colors"), defaults.colors),
    }
}

/// Loads the theme from `source`.
///
/// ```rust
/// use invoice2pdf::config::{load_config_from_source, ConfigSource};
/// use invoice2pdf::styling::LayoutStyle;
///
/// let style = load_config_from_source(ConfigSource::Default);
/// assert_eq!(style, LayoutStyle::default());
///
/// let style = load_config_from_source(ConfigSource::Embedded("[body]\nsize = 9"));
/// assert_eq!(style.body.size, 9);
/// ```
pub fn load_config_from_source(source: ConfigSource) -> LayoutStyle {
    match source {
        ConfigSource::Default => LayoutStyle::default(),
        ConfigSource::File(path) => match fs::read_to_string(Path::new(path)) {
            Ok(config_str) => parse_config_string(&config_str),
            Err(e) => {
                warn!("Cannot read style configuration {}: {}", path, e);
                LayoutStyle::default()
            }
        },
        ConfigSource::Embedded(content) => parse_config_string(content),
    }
}

fn alignment_name(alignment: TextAlignment) -> &'static str {
    match alignment {
        TextAlignment::Left => "left",
        TextAlignment::Center => "center",
        TextAlignment::Right => "right",
    }
}

fn color_entry(key: &str, (r, g, b): Rgb) -> String {
    format!("{} = {{ r = {}, g = {}, b = {} }}\n", key, r, g, b)
}

fn style_section(name: &str, style: &BasicTextStyle) -> String {
    let mut out = format!("[{}]\nsize = {}\n", name, style.size);
    if let Some(color) = style.text_color {
        out.push_str(&color_entry("textcolor", color));
    }
    if let Some(color) = style.background_color {
        out.push_str(&color_entry("backgroundcolor", color));
    }
    if let Some(alignment) = style.alignment {
        out.push_str(&format!("alignment = \"{}\"\n", alignment_name(alignment)));
    }
    out.push_str(&format!("bold = {}\nitalic = {}\n", style.bold, style.italic));
    out.push_str(&format!(
        "beforespacing = {:.1}\nafterspacing = {:.1}\n",
        style.before_spacing, style.after_spacing
    ));
    out
}

/// The default theme as a TOML document that [`parse_config_string`] reads back unchanged.
pub fn default_config_toml() -> String {
    let style = LayoutStyle::default();
    let sections = [
        style_section("title", &style.title),
        style_section("subtitle", &style.subtitle),
        style_section("body", &style.body),
        style_section("product_name", &style.product_name),
        style_section("table.header", &style.table_header),
        style_section("table.cell", &style.table_cell),
        style_section("table.total", &style.table_total),
        style_section("customer.label", &style.customer_label),
        style_section("customer.value", &style.customer_value),
        format!(
            "[colors]\n{}{}",
            color_entry("grid", style.colors.grid),
            color_entry("rule", style.colors.rule)
        ),
    ];
    sections.join("\n")
}
