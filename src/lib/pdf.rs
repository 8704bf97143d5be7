//! Composition of the document flow into a PDF.
//!
//! [`compose`] sets up a US Letter document, maps every [`Block`] onto layout-engine elements
//! and serializes the result into memory. The engine breaks pages as needed; tables continue on
//! the next page row by row, and a product name that does not fit is split between pages.

use crate::blocks::DOCUMENT_TITLE;
use crate::elements::{InvoiceGridDecorator, TableCell, VerticalSpace};
use crate::fonts::FontSource;
use crate::layout::{Block, HeadingLevel, ItemRow, CUSTOMER_COLUMN_WIDTHS, PRODUCT_COLUMN_WIDTHS};
use crate::styling::{
    pt_to_mm, BasicTextStyle, LayoutStyle, TextAlignment, CUSTOMER_CELL_PADDING, GRID_LINE_WIDTH,
    INCH, LETTER, PRODUCT_CELL_PADDING, RULE_LINE_WIDTH,
};
use crate::RenderError;
use genpdfi_extended::elements::{Paragraph, TableLayout};
use genpdfi_extended::error::{Error, ErrorKind};
use genpdfi_extended::{Document, Element, Margins, Mm, SimplePageDecorator, Size};
use log::debug;

/// Lays out `flow` on as many pages as needed and returns the serialized PDF.
pub fn compose(flow: &[Block], style: &LayoutStyle, fonts: &FontSource) -> Result<Vec<u8>, RenderError> {
    let mut doc = new_document(style, fonts)?;
    for block in flow {
        debug!("Composing {} block", block.kind());
        push_block(&mut doc, block, style)?;
    }
    render_to_bytes(doc)
}

fn new_document(style: &LayoutStyle, fonts: &FontSource) -> Result<Document, RenderError> {
    let font_family = fonts.font_family().map_err(|source| RenderError::Font {
        family: fonts.name().to_string(),
        source,
    })?;

    let mut doc = Document::new(font_family);
    doc.set_title(DOCUMENT_TITLE);
    doc.set_paper_size(Size::new(
        Mm::from(pt_to_mm(LETTER.width)),
        Mm::from(pt_to_mm(LETTER.height)),
    ));

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(
        Mm::from(pt_to_mm(LETTER.margin_top)),
        Mm::from(pt_to_mm(LETTER.margin_right)),
        Mm::from(pt_to_mm(LETTER.margin_bottom)),
        Mm::from(pt_to_mm(LETTER.margin_left)),
    ));
    doc.set_page_decorator(decorator);
    doc.set_font_size(style.body.size);
    Ok(doc)
}

/// Serializes a finished document into memory.
pub fn render_to_bytes(document: Document) -> Result<Vec<u8>, RenderError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    document.render(&mut buffer).map_err(classify_engine_error)?;
    Ok(buffer.into_inner())
}

/// Content that cannot be placed is a layout failure; anything else happened while writing.
fn classify_engine_error(err: Error) -> RenderError {
    let unplaceable = matches!(
        err.kind(),
        ErrorKind::PageSizeExceeded | ErrorKind::UnsupportedEncoding
    );
    if unplaceable {
        RenderError::Layout(err)
    } else {
        RenderError::Serialize(err)
    }
}

/// Integer column weights in half-inch units; the engine scales them to the frame width.
fn column_weights(widths: &[f64]) -> Vec<usize> {
    widths
        .iter()
        .map(|inches| ((inches * 2.0).round() as usize).max(1))
        .collect()
}

/// Quarter-inch weights for a table narrower than the frame. Two filler columns take up the
/// slack on either side, so the real columns keep their exact widths and the table is centered.
fn centered_column_weights(widths: &[f64], frame_width: f64) -> Vec<usize> {
    let quarters = |inches: f64| (inches * 4.0).round() as usize;
    let used: f64 = widths.iter().sum::<f64>() * INCH;
    let side = quarters(((frame_width - used) / 2.0).max(0.0) / INCH);

    let mut weights = Vec::with_capacity(widths.len() + 2);
    weights.push(side);
    weights.extend(widths.iter().map(|inches| quarters(*inches).max(1)));
    weights.push(side);
    weights
}

fn push_block(doc: &mut Document, block: &Block, style: &LayoutStyle) -> Result<(), RenderError> {
    match block {
        Block::Title { text, level } => {
            let heading = match level {
                HeadingLevel::Document => &style.title,
                HeadingLevel::Section => &style.subtitle,
            };
            push_paragraph(doc, text, heading, TextAlignment::Left);
        }
        Block::Spacer { points } => doc.push(VerticalSpace::from_points(*points)),
        Block::KeyValueTable { rows } => doc.push(customer_table(rows, style)?),
        Block::ItemTable {
            header,
            rows,
            total,
        } => doc.push(product_table(header, rows, total, style)?),
        Block::Note { text } => {
            let mut note = style.body.clone();
            note.italic = true;
            push_paragraph(doc, text, &note, TextAlignment::Left);
        }
    }
    Ok(())
}

fn push_paragraph(doc: &mut Document, text: &str, text_style: &BasicTextStyle, default: TextAlignment) {
    if text_style.before_spacing > 0.0 {
        doc.push(VerticalSpace::from_points(f64::from(text_style.before_spacing)));
    }

    let mut para = Paragraph::default();
    para.set_alignment(text_style.alignment_or(default).into());
    para.push_styled(text, text_style.to_style());
    doc.push(para);

    if text_style.after_spacing > 0.0 {
        doc.push(VerticalSpace::from_points(f64::from(text_style.after_spacing)));
    }
}

fn push_row(table: &mut TableLayout, cells: Vec<TableCell>) -> Result<(), RenderError> {
    let cells: Vec<Box<dyn Element>> = cells
        .into_iter()
        .map(|cell| Box::new(cell) as Box<dyn Element>)
        .collect();
    table.push_row(cells).map_err(RenderError::Layout)
}

fn customer_table(rows: &[(String, String)], style: &LayoutStyle) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(centered_column_weights(
        &CUSTOMER_COLUMN_WIDTHS,
        LETTER.content_width(),
    ));
    let filler = || {
        TableCell::new("", &BasicTextStyle::default(), TextAlignment::Left, CUSTOMER_CELL_PADDING)
    };
    for (label, value) in rows {
        push_row(
            &mut table,
            vec![
                filler(),
                TableCell::new(label, &style.customer_label, TextAlignment::Right, CUSTOMER_CELL_PADDING),
                TableCell::new(value, &style.customer_value, TextAlignment::Left, CUSTOMER_CELL_PADDING),
                filler(),
            ],
        )?;
    }
    Ok(table)
}

fn product_table(
    header: &ItemRow,
    rows: &[ItemRow],
    total: &ItemRow,
    style: &LayoutStyle,
) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(column_weights(&PRODUCT_COLUMN_WIDTHS));
    table.set_cell_decorator(InvoiceGridDecorator::new(
        rows.len() + 1,
        style.colors.grid,
        GRID_LINE_WIDTH,
        style.colors.rule,
        RULE_LINE_WIDTH,
    ));

    let cell = |text: &str, text_style: &BasicTextStyle, default| {
        TableCell::new(text, text_style, default, PRODUCT_CELL_PADDING)
    };

    push_row(
        &mut table,
        header
            .iter()
            .map(|text| cell(text.as_str(), &style.table_header, TextAlignment::Center))
            .collect(),
    )?;

    for row in rows {
        let cells = row
            .iter()
            .enumerate()
            .map(|(column, text)| match column {
                0 => cell(text.as_str(), &style.product_name, TextAlignment::Left),
                _ => cell(text.as_str(), &style.table_cell, TextAlignment::Right),
            })
            .collect();
        push_row(&mut table, cells)?;
    }

    push_row(
        &mut table,
        total
            .iter()
            .map(|text| cell(text.as_str(), &style.table_total, TextAlignment::Right))
            .collect(),
    )?;

    Ok(table)
}
