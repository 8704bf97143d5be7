//! The document flow: an ordered list of layout blocks.
//!
//! Block builders (see [`crate::blocks`]) only produce these plain values. Turning them into
//! positioned PDF content is the job of [`crate::pdf::compose`], so a flow can be inspected,
//! compared or dumped to JSON without touching the layout engine.

use serde::Serialize;

/// Column widths of the customer table, in inches.
pub const CUSTOMER_COLUMN_WIDTHS: [f64; 2] = [2.0, 4.0];
/// Column widths of the product table, in inches.
pub const PRODUCT_COLUMN_WIDTHS: [f64; 4] = [3.0, 1.5, 1.0, 1.5];

/// Which heading style a [`Block::Title`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    /// The document title, centered.
    Document,
    /// A section heading above a table.
    Section,
}

/// One row of the product table: name, unit price, quantity, line total.
pub type ItemRow = [String; 4];

/// A unit of the document flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Title {
        text: String,
        level: HeadingLevel,
    },
    /// Fixed vertical gap, in points.
    Spacer {
        points: f64,
    },
    /// Label/value pairs in two columns.
    KeyValueTable {
        rows: Vec<(String, String)>,
    },
    /// The product table: header row, one row per item and the total row.
    ItemTable {
        header: ItemRow,
        rows: Vec<ItemRow>,
        total: ItemRow,
    },
    /// A short italic paragraph.
    Note {
        text: String,
    },
}

impl Block {
    /// Short name of the variant, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Title { .. } => "title",
            Block::Spacer { .. } => "spacer",
            Block::KeyValueTable { .. } => "key_value_table",
            Block::ItemTable { .. } => "item_table",
            Block::Note { .. } => "note",
        }
    }
}
