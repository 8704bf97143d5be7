//! Visual theme of the invoice document.
//!
//! [`LayoutStyle`] groups the named text styles used by the layout blocks together with the
//! table palette. The default theme is built once per process and shared through
//! [`LayoutStyle::shared`]; nothing mutates it afterwards, so any number of concurrent renders
//! can read it. A customised theme (see [`crate::config`]) is likewise built once and then only
//! read.
//!
//! Page geometry is not part of the theme: the invoice is always laid out on a US Letter page
//! with the margins in [`LETTER`].

use genpdfi_extended::style::{Color, Style};
use genpdfi_extended::Alignment;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Points per inch.
pub const INCH: f64 = 72.0;

/// Converts PDF points to millimetres, the unit of the layout engine.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * 25.4 / INCH
}

/// An RGB color.
pub type Rgb = (u8, u8, u8);

/// Fixed page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl PageGeometry {
    /// Width left for content between the side margins.
    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }
}

/// US Letter, 72 pt margins except an 18 pt bottom margin.
pub const LETTER: PageGeometry = PageGeometry {
    width: 612.0,
    height: 792.0,
    margin_top: 72.0,
    margin_right: 72.0,
    margin_bottom: 18.0,
    margin_left: 72.0,
};

/// Horizontal text alignment inside a paragraph or table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

impl From<TextAlignment> for Alignment {
    fn from(alignment: TextAlignment) -> Self {
        match alignment {
            TextAlignment::Left => Alignment::Left,
            TextAlignment::Center => Alignment::Center,
            TextAlignment::Right => Alignment::Right,
        }
    }
}

/// Text appearance for one kind of content. Spacing values are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicTextStyle {
    pub size: u8,
    pub text_color: Option<Rgb>,
    pub background_color: Option<Rgb>,
    pub alignment: Option<TextAlignment>,
    pub bold: bool,
    pub italic: bool,
    pub before_spacing: f32,
    pub after_spacing: f32,
}

impl BasicTextStyle {
    /// A plain, left-aligned style of the given size.
    pub fn new(size: u8) -> Self {
        Self {
            size,
            text_color: None,
            background_color: None,
            alignment: None,
            bold: false,
            italic: false,
            before_spacing: 0.0,
            after_spacing: 0.0,
        }
    }

    fn with_color(mut self, color: Rgb) -> Self {
        self.text_color = Some(color);
        self
    }

    fn with_background(mut self, color: Rgb) -> Self {
        self.background_color = Some(color);
        self
    }

    fn aligned(mut self, alignment: TextAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn spaced_after(mut self, points: f32) -> Self {
        self.after_spacing = points;
        self
    }

    /// The alignment to use, or `default` when the style does not set one.
    pub fn alignment_or(&self, default: TextAlignment) -> TextAlignment {
        self.alignment.unwrap_or(default)
    }

    /// Converts to a layout-engine style. Background and spacing are handled by the
    /// elements themselves.
    pub fn to_style(&self) -> Style {
        let mut style = Style::new().with_font_size(self.size);
        if self.bold {
            style = style.bold();
        }
        if self.italic {
            style = style.italic();
        }
        if let Some((r, g, b)) = self.text_color {
            style = style.with_color(Color::Rgb(r, g, b));
        }
        style
    }
}

impl Default for BasicTextStyle {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Line colors used by the product table.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Cell grid around header and item rows.
    pub grid: Rgb,
    /// Heavy rules above and below the total row.
    pub rule: Rgb,
}

/// Inner spacing of a table cell, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl CellPadding {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Padding of the customer key/value table.
pub const CUSTOMER_CELL_PADDING: CellPadding = CellPadding::new(3.0, 6.0, 8.0, 6.0);
/// Padding of every product table cell.
pub const PRODUCT_CELL_PADDING: CellPadding = CellPadding::new(8.0, 10.0, 8.0, 10.0);
/// Grid line width of the product table, in points.
pub const GRID_LINE_WIDTH: f64 = 1.0;
/// Width of the rules framing the total row, in points.
pub const RULE_LINE_WIDTH: f64 = 2.0;

const DARK_BLUE: Rgb = (0x2c, 0x3e, 0x50);
const SLATE: Rgb = (0x34, 0x49, 0x5e);
const BRIGHT_BLUE: Rgb = (0x34, 0x98, 0xdb);
const WHITE_SMOKE: Rgb = (0xf5, 0xf5, 0xf5);
const LIGHT_GRAY: Rgb = (0xec, 0xf0, 0xf1);
const SILVER: Rgb = (0xbd, 0xc3, 0xc7);

/// The complete theme of an invoice document.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    /// Document heading.
    pub title: BasicTextStyle,
    /// Section headings ("DATOS DEL CLIENTE", "DETALLE DE PRODUCTOS").
    pub subtitle: BasicTextStyle,
    /// Footer note and other running text.
    pub body: BasicTextStyle,
    /// Product names, which wrap inside their column.
    pub product_name: BasicTextStyle,
    pub table_header: BasicTextStyle,
    pub table_cell: BasicTextStyle,
    pub table_total: BasicTextStyle,
    pub customer_label: BasicTextStyle,
    pub customer_value: BasicTextStyle,
    pub colors: Palette,
}

static SHARED_STYLE: Lazy<Arc<LayoutStyle>> = Lazy::new(|| Arc::new(LayoutStyle::default()));

impl LayoutStyle {
    /// The process-wide default theme.
    pub fn shared() -> Arc<LayoutStyle> {
        Arc::clone(&SHARED_STYLE)
    }
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            title: BasicTextStyle::new(24)
                .with_color(DARK_BLUE)
                .aligned(TextAlignment::Center)
                .bold()
                .spaced_after(30.0),
            subtitle: BasicTextStyle::new(14)
                .with_color(SLATE)
                .bold()
                .spaced_after(12.0),
            body: BasicTextStyle::new(10).with_color((0, 0, 0)),
            product_name: BasicTextStyle::new(10).aligned(TextAlignment::Left),
            table_header: BasicTextStyle::new(11)
                .with_color(WHITE_SMOKE)
                .with_background(BRIGHT_BLUE)
                .aligned(TextAlignment::Center)
                .bold(),
            table_cell: BasicTextStyle::new(10).aligned(TextAlignment::Right),
            table_total: BasicTextStyle::new(12)
                .with_color(DARK_BLUE)
                .with_background(LIGHT_GRAY)
                .aligned(TextAlignment::Right)
                .bold(),
            customer_label: BasicTextStyle::new(10)
                .with_color(DARK_BLUE)
                .aligned(TextAlignment::Right)
                .bold(),
            customer_value: BasicTextStyle::new(10).aligned(TextAlignment::Left),
            colors: Palette {
                grid: SILVER,
                rule: DARK_BLUE,
            },
        }
    }
}
