//! Layout block builders.
//!
//! Each builder turns one part of the invoice into blocks of the document flow. They run in a
//! fixed order: title, customer data, product detail, footer note.

use crate::format::{format_currency, format_quantity, format_timestamp};
use crate::layout::{Block, HeadingLevel, ItemRow};
use crate::model::{sum_totals, Customer, Invoice, LineItem};
use crate::styling::INCH;
use crate::RenderError;
use chrono::NaiveDateTime;
use log::{debug, warn};

pub const DOCUMENT_TITLE: &str = "FACTURA ELECTRÓNICA";
pub const CUSTOMER_HEADING: &str = "DATOS DEL CLIENTE";
pub const PRODUCT_HEADING: &str = "DETALLE DE PRODUCTOS";
pub const PRODUCT_HEADER: [&str; 4] = ["Producto", "Precio Unit.", "Cantidad", "Total"];
pub const TOTAL_LABEL: &str = "TOTAL:";
pub const FOOTER_NOTE: &str = "Thank you for your purchase. Invoice generated electronically.";

const CUSTOMER_LABELS: [&str; 4] = ["Nombre:", "Identificación:", "Email:", "Fecha:"];

fn spacer(inches: f64) -> Block {
    Block::Spacer {
        points: inches * INCH,
    }
}

/// The centered document title followed by a 0.3 in gap.
pub fn title_block() -> Vec<Block> {
    vec![
        Block::Title {
            text: DOCUMENT_TITLE.to_string(),
            level: HeadingLevel::Document,
        },
        spacer(0.3),
    ]
}

/// Customer heading and the four-row label/value table, followed by a 0.4 in gap.
///
/// The last row carries the generation `timestamp`.
pub fn customer_block(customer: &Customer, timestamp: NaiveDateTime) -> Vec<Block> {
    let values = [
        customer.name.clone(),
        customer.identification.clone(),
        customer.email.clone(),
        format_timestamp(timestamp),
    ];
    let rows = CUSTOMER_LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| (label.to_string(), value))
        .collect();

    vec![
        Block::Title {
            text: CUSTOMER_HEADING.to_string(),
            level: HeadingLevel::Section,
        },
        Block::KeyValueTable { rows },
        spacer(0.4),
    ]
}

fn item_row(item: &LineItem) -> ItemRow {
    [
        item.name.clone(),
        format_currency(item.price),
        format_quantity(item.quantity),
        format_currency(item.total),
    ]
}

/// Product heading and table, followed by a 0.5 in gap.
///
/// The total row shows the exact sum of the supplied line totals. A line total that differs
/// from `price * quantity` is logged but printed as given.
pub fn product_block(products: &[LineItem]) -> Result<Vec<Block>, RenderError> {
    if products.is_empty() {
        return Err(RenderError::EmptyInvoice);
    }

    for (index, item) in products.iter().enumerate() {
        let Some(expected) = item.expected_total() else {
            debug!("Line {} ('{}'): price x quantity overflows, skipping check", index + 1, item.name);
            continue;
        };
        if item.total != expected {
            warn!(
                "Line {} ('{}'): total {} differs from price x quantity {}",
                index + 1,
                item.name,
                item.total,
                expected
            );
        }
    }

    let sum = sum_totals(products).ok_or(RenderError::AmountOverflow)?;
    let total = [
        String::new(),
        String::new(),
        TOTAL_LABEL.to_string(),
        format_currency(sum),
    ];

    Ok(vec![
        Block::Title {
            text: PRODUCT_HEADING.to_string(),
            level: HeadingLevel::Section,
        },
        Block::ItemTable {
            header: PRODUCT_HEADER.map(String::from),
            rows: products.iter().map(item_row).collect(),
            total,
        },
        spacer(0.5),
    ])
}

/// The closing note.
pub fn footer_block() -> Vec<Block> {
    vec![Block::Note {
        text: FOOTER_NOTE.to_string(),
    }]
}

/// Builds the whole document flow for `invoice`, stamped with `timestamp`.
pub fn document_flow(invoice: &Invoice, timestamp: NaiveDateTime) -> Result<Vec<Block>, RenderError> {
    let mut flow = title_block();
    flow.extend(customer_block(&invoice.customer, timestamp));
    flow.extend(product_block(&invoice.products)?);
    flow.extend(footer_block());
    debug!(
        "Built document flow: {} blocks for {} line item(s)",
        flow.len(),
        invoice.products.len()
    );
    Ok(flow)
}
