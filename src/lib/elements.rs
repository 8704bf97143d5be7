//! Layout-engine elements used by the invoice tables.
//!
//! The stock paragraph refuses words wider than its column and the stock frame decorator draws
//! one line style for every row. Invoice tables need wrapped product names, filled header and
//! total rows, and heavier rules around the total, so they are built from the elements here.

use crate::styling::{pt_to_mm, BasicTextStyle, CellPadding, Rgb, TextAlignment};
use genpdfi_extended::elements::CellDecorator;
use genpdfi_extended::error::Error;
use genpdfi_extended::render::Area;
use genpdfi_extended::style::{Color, LineStyle, Style};
use genpdfi_extended::{Context, Element, Mm, Position, RenderResult, Size};

/// Breaks `text` into lines no wider than `max_width`.
///
/// Words are separated by whitespace and packed greedily. A word that is wider than
/// `max_width` on its own is split between characters. Empty text yields one empty line so
/// that the cell still has a height.
pub fn wrap_words<F>(text: &str, max_width: f64, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if width_of(&candidate) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if width_of(word) <= max_width {
            current = word.to_string();
            continue;
        }

        for ch in word.chars() {
            let mut next = current.clone();
            next.push(ch);
            if !current.is_empty() && width_of(&next) > max_width {
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            } else {
                current = next;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn fill_color((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

/// A padded, optionally filled table cell whose text wraps to the column width.
///
/// When the page ends inside the cell, the lines that fit are printed and the rest continue at
/// the top of the next page.
pub struct TableCell {
    text: String,
    style: Style,
    alignment: TextAlignment,
    padding: CellPadding,
    background: Option<Rgb>,
    lines: Option<Vec<String>>,
    next_line: usize,
}

impl TableCell {
    pub fn new(
        text: impl Into<String>,
        style: &BasicTextStyle,
        default_alignment: TextAlignment,
        padding: CellPadding,
    ) -> Self {
        Self {
            text: text.into(),
            style: style.to_style(),
            alignment: style.alignment_or(default_alignment),
            padding,
            background: style.background_color,
            lines: None,
            next_line: 0,
        }
    }
}

impl Element for TableCell {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let mut result = RenderResult::default();

        let width = area.size().width.0;
        let (top, right, bottom, left) = (
            pt_to_mm(self.padding.top),
            pt_to_mm(self.padding.right),
            pt_to_mm(self.padding.bottom),
            pt_to_mm(self.padding.left),
        );
        let inner_width = (width - left - right).max(0.0);

        let text = &self.text;
        let lines = self.lines.get_or_insert_with(|| {
            wrap_words(text, inner_width, |s| {
                style.str_width(&context.font_cache, s).0
            })
        });
        if self.next_line >= lines.len() {
            return Ok(result);
        }

        let line_height = style.line_height(&context.font_cache).0;
        let available = area.size().height.0 - top - bottom;
        let fitting = if line_height > 0.0 && available > 0.0 {
            (available / line_height).floor() as usize
        } else {
            0
        };
        let count = fitting.min(lines.len() - self.next_line);
        if count == 0 {
            result.has_more = true;
            return Ok(result);
        }

        let height = top + count as f64 * line_height + bottom;
        if let Some(color) = self.background {
            // Filled as one stroke as thick as the cell.
            let fill = LineStyle::new()
                .with_thickness(Mm::from(height))
                .with_color(fill_color(color));
            area.draw_line(
                vec![
                    Position::new(Mm::from(0.0), Mm::from(height / 2.0)),
                    Position::new(Mm::from(width), Mm::from(height / 2.0)),
                ],
                fill,
            );
        }

        for (i, line) in lines[self.next_line..self.next_line + count].iter().enumerate() {
            let line_width = style.str_width(&context.font_cache, line).0;
            let x = match self.alignment {
                TextAlignment::Left => left,
                TextAlignment::Center => left + (inner_width - line_width) / 2.0,
                TextAlignment::Right => left + inner_width - line_width,
            };
            let y = top + i as f64 * line_height;
            area.print_str(
                &context.font_cache,
                Position::new(Mm::from(x.max(0.0)), Mm::from(y)),
                style,
                line,
            )?;
        }

        self.next_line += count;
        result.size = Size::new(Mm::from(width), Mm::from(height));
        result.has_more = self.next_line < lines.len();
        Ok(result)
    }
}

/// Fixed vertical gap. Cut short at the end of a page.
pub struct VerticalSpace {
    height: f64,
}

impl VerticalSpace {
    /// A gap of `points` points.
    pub fn from_points(points: f64) -> Self {
        Self {
            height: pt_to_mm(points.max(0.0)),
        }
    }
}

impl Element for VerticalSpace {
    fn render(
        &mut self,
        _context: &Context,
        area: Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let height = self.height.min(area.size().height.0.max(0.0));
        result.size = Size::new(Mm::from(0.0), Mm::from(height));
        Ok(result)
    }
}

/// Draws a thin grid around every cell except those of the total row, which get a heavy rule
/// above and below instead.
pub struct InvoiceGridDecorator {
    total_row: usize,
    grid_color: Rgb,
    grid_width: f64,
    rule_color: Rgb,
    rule_width: f64,
}

impl InvoiceGridDecorator {
    /// `total_row` is the zero-based index of the total row, header included.
    pub fn new(total_row: usize, grid_color: Rgb, grid_width: f64, rule_color: Rgb, rule_width: f64) -> Self {
        Self {
            total_row,
            grid_color,
            grid_width,
            rule_color,
            rule_width,
        }
    }

    fn line_style(color: Rgb, width_pt: f64) -> LineStyle {
        LineStyle::new()
            .with_thickness(Mm::from(pt_to_mm(width_pt)))
            .with_color(fill_color(color))
    }
}

impl CellDecorator for InvoiceGridDecorator {
    fn decorate_cell(
        &mut self,
        _column: usize,
        row: usize,
        has_more: bool,
        area: Area<'_>,
        row_height: Mm,
    ) -> Mm {
        let width = area.size().width;
        let at = |x: Mm, y: Mm| Position::new(x, y);
        let zero = Mm::from(0.0);

        if row == self.total_row {
            let rule = || Self::line_style(self.rule_color, self.rule_width);
            area.draw_line(vec![at(zero, zero), at(width, zero)], rule());
            if !has_more {
                area.draw_line(vec![at(zero, row_height), at(width, row_height)], rule());
            }
        } else {
            let grid = Self::line_style(self.grid_color, self.grid_width);
            let points = if has_more {
                vec![
                    at(zero, row_height),
                    at(zero, zero),
                    at(width, zero),
                    at(width, row_height),
                ]
            } else {
                vec![
                    at(zero, zero),
                    at(width, zero),
                    at(width, row_height),
                    at(zero, row_height),
                    at(zero, zero),
                ]
            };
            area.draw_line(points, grid);
        }

        row_height
    }
}
