//! Invoice input model.
//!
//! These are the records a caller hands to the renderer. They deserialize from the JSON shape
//! the invoice service accepts:
//!
//! ```json
//! {
//!   "customer": { "name": "Juan Pérez", "identification": "1234567890", "email": "juan.perez@example.com" },
//!   "products": [ { "name": "Producto A", "price": 50000.00, "quantity": 2, "total": 100000.00 } ]
//! }
//! ```
//!
//! Monetary values are [`Decimal`]s so that sums stay exact. Numbers may be given either as JSON
//! numbers or as strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The person or company the invoice is issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub identification: String,
    pub email: String,
}

/// One product entry on the invoice.
///
/// `total` is expected to equal `price * quantity`, but it is taken as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total: Decimal,
}

impl LineItem {
    /// Creates a line item with an explicit total.
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u32, total: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            total,
        }
    }

    /// `price * quantity`, used only to flag totals that disagree with it. `None` when the
    /// product does not fit in a [`Decimal`].
    pub fn expected_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A complete invoice: one customer and an ordered list of line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub customer: Customer,
    pub products: Vec<LineItem>,
}

impl Invoice {
    /// Parses an invoice from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Exact decimal sum of the supplied line totals, or `None` on overflow.
    pub fn grand_total(&self) -> Option<Decimal> {
        sum_totals(&self.products)
    }
}

/// Sums the supplied line totals without panicking on overflow.
pub fn sum_totals(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total))
}
