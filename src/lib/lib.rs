//! The invoice2pdf library renders electronic invoices into paginated PDF documents.
//!
//! An [`Invoice`] (one customer and an ordered list of line items) goes in, the bytes of a
//! US Letter PDF come out. The document always has the same shape: a centered title, the
//! customer data, the product table closed by a total row, and a short footer note. Long product
//! names wrap inside their column and long invoices continue on further pages.
//!
//! Basic usage renders with the process-wide default renderer:
//! ```rust
//! use invoice2pdf::{render_invoice, Customer, Invoice, LineItem};
//! use rust_decimal::Decimal;
//!
//! let invoice = Invoice {
//!     customer: Customer {
//!         name: "Juan Pérez".into(),
//!         identification: "1234567890".into(),
//!         email: "juan.perez@example.com".into(),
//!     },
//!     products: vec![LineItem::new(
//!         "Producto A",
//!         Decimal::new(5_000_000, 2),
//!         2,
//!         Decimal::new(10_000_000, 2),
//!     )],
//! };
//! let pdf = render_invoice(&invoice).unwrap();
//! assert!(pdf.starts_with(b"%PDF-"));
//! ```
//!
//! A [`DocumentRenderer`] can be built with a customised theme, another font family or a fixed
//! clock, and shared between threads:
//! ```rust
//! use invoice2pdf::config::{load_config_from_source, ConfigSource};
//! use invoice2pdf::fonts::FontSource;
//! use invoice2pdf::{DocumentRenderer, FixedClock};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let style = load_config_from_source(ConfigSource::Embedded("[title]\nsize = 28"));
//! let when = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let renderer = DocumentRenderer::new(
//!     Arc::new(style),
//!     FontSource::embedded(),
//!     Arc::new(FixedClock(when)),
//! );
//! # let _ = renderer;
//! ```
//!
//! ## Rendering pipeline
//! ```text
//! +-----------+     +------------------+     +-----------------+     +-----------+
//! |  Invoice  | --> |  Block builders  | --> |  Compose pages  | --> |  PDF      |
//! |           |     |  title           |     |  US Letter      |     |  bytes    |
//! |           |     |  customer        |     |  tables, wrap,  |     |           |
//! |           |     |  products        |     |  page breaks    |     |           |
//! |           |     |  footer          |     |                 |     |           |
//! +-----------+     +------------------+     +-----------------+     +-----------+
//! ```
//!
//! The renderer trusts its input. Callers accepting invoices from outside should run
//! [`validation::validate_invoice`] first.

pub mod blocks;
pub mod clock;
pub mod config;
pub mod debug;
pub mod elements;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod styling;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use model::{Customer, Invoice, LineItem};

use fonts::FontSource;
use layout::Block;
use log::{debug, info};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use styling::LayoutStyle;
use thiserror::Error;

/// Errors that abort rendering. No output is produced when one occurs.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The invoice has no line items.
    #[error("failed to render invoice: the invoice has no line items")]
    EmptyInvoice,
    /// The sum of the line totals does not fit in a decimal.
    #[error("failed to render invoice: the line totals overflow the supported amount range")]
    AmountOverflow,
    /// The font family could not be prepared for the layout engine.
    #[error("failed to render invoice: cannot load font family '{family}'")]
    Font {
        family: String,
        source: genpdfi_extended::error::Error,
    },
    /// Content could not be placed on the page.
    #[error("failed to render invoice: layout failed")]
    Layout(#[source] genpdfi_extended::error::Error),
    /// The laid-out document could not be written as PDF.
    #[error("failed to render invoice: PDF serialization failed")]
    Serialize(#[source] genpdfi_extended::error::Error),
    /// The rendered document could not be saved.
    #[error("failed to render invoice: cannot write {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RenderError {
    /// A hint for the person running the tool.
    pub fn suggestion(&self) -> &'static str {
        match self {
            RenderError::EmptyInvoice => "Add at least one product to the invoice",
            RenderError::AmountOverflow => "Check the line totals for out-of-range amounts",
            RenderError::Font { .. } => {
                "Check the font name, or pass --font-path with the directory holding its files"
            }
            RenderError::Layout(_) => "Check for unusually long text in the invoice fields",
            RenderError::Serialize(_) => "Check available memory and try again",
            RenderError::Io { .. } => {
                "Check that the output directory exists and you have write permissions"
            }
        }
    }
}

/// Turns invoices into PDF bytes.
///
/// Holds only immutable state, so one renderer can serve concurrent calls; every call builds
/// its own document and output buffer.
#[derive(Clone)]
pub struct DocumentRenderer {
    style: Arc<LayoutStyle>,
    fonts: FontSource,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DocumentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRenderer")
            .field("style", &self.style)
            .field("fonts", &self.fonts.name())
            .finish_non_exhaustive()
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(
            LayoutStyle::shared(),
            FontSource::embedded(),
            Arc::new(SystemClock),
        )
    }
}

impl DocumentRenderer {
    pub fn new(style: Arc<LayoutStyle>, fonts: FontSource, clock: Arc<dyn Clock>) -> Self {
        Self {
            style,
            fonts,
            clock,
        }
    }

    pub fn style(&self) -> &LayoutStyle {
        &self.style
    }

    /// Builds the document flow, stamped with the renderer's clock.
    pub fn layout(&self, invoice: &Invoice) -> Result<Vec<Block>, RenderError> {
        blocks::document_flow(invoice, self.clock.now())
    }

    /// Lays out and serializes an already built flow.
    pub fn compose(&self, flow: &[Block]) -> Result<Vec<u8>, RenderError> {
        pdf::compose(flow, &self.style, &self.fonts)
    }

    /// Renders `invoice` into the bytes of a complete PDF.
    pub fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, RenderError> {
        debug!(
            "Rendering invoice for '{}' with font '{}'",
            invoice.customer.name,
            self.fonts.name()
        );
        let flow = self.layout(invoice)?;
        let bytes = self.compose(&flow)?;
        info!(
            "Rendered invoice: {} line item(s), {} bytes",
            invoice.products.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Renders `invoice` and writes the PDF to `path`. Nothing is written if rendering fails.
    pub fn render_to_file(&self, invoice: &Invoice, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        let bytes = self.render(invoice)?;
        std::fs::write(path, bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved invoice to {}", path.display());
        Ok(())
    }
}

static DEFAULT_RENDERER: Lazy<DocumentRenderer> = Lazy::new(DocumentRenderer::default);

/// Renders `invoice` with the shared default theme, the embedded fonts and the local clock.
pub fn render_invoice(invoice: &Invoice) -> Result<Vec<u8>, RenderError> {
    DEFAULT_RENDERER.render(invoice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::error::Error as _;

    fn invoice() -> Invoice {
        Invoice {
            customer: Customer {
                name: "Juan Pérez".into(),
                identification: "1234567890".into(),
                email: "juan.perez@example.com".into(),
            },
            products: vec![
                LineItem::new("Producto A", dec!(50000.00), 2, dec!(100000.00)),
                LineItem::new("Producto B", dec!(30000.00), 1, dec!(30000.00)),
            ],
        }
    }

    fn fixed_renderer() -> DocumentRenderer {
        let when = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        DocumentRenderer::new(
            LayoutStyle::shared(),
            FontSource::embedded(),
            Arc::new(FixedClock(when)),
        )
    }

    #[test]
    fn test_render_invoice_to_bytes() {
        let pdf_bytes = render_invoice(&invoice()).unwrap();
        assert!(!pdf_bytes.is_empty());
        assert!(pdf_bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_empty_invoice() {
        let mut inv = invoice();
        inv.products.clear();
        let result = render_invoice(&inv);
        assert!(matches!(result, Err(RenderError::EmptyInvoice)));
    }

    #[test]
    fn test_layout_uses_renderer_clock() {
        let flow = fixed_renderer().layout(&invoice()).unwrap();
        let Block::KeyValueTable { rows } = &flow[3] else {
            panic!("expected customer table, got {:?}", flow[3]);
        };
        assert_eq!(rows[3].1, "29/02/2024 08:15:00");
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factura.pdf");
        fixed_renderer().render_to_file(&invoice(), &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_invalid_output_path() {
        let result = fixed_renderer().render_to_file(&invoice(), "/nonexistent/directory/out.pdf");
        match result {
            Err(err @ RenderError::Io { .. }) => {
                assert!(err.to_string().starts_with("failed to render invoice"));
                assert!(err.source().is_some());
            }
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        let mut inv = invoice();
        inv.products.clear();
        assert!(fixed_renderer().render_to_file(&inv, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_error_messages_share_prefix() {
        for err in [RenderError::EmptyInvoice, RenderError::AmountOverflow] {
            assert!(err.to_string().starts_with("failed to render invoice"));
            assert!(!err.suggestion().is_empty());
        }
    }

    #[test]
    fn test_extreme_amounts_fail_without_panic() {
        let mut inv = invoice();
        inv.products[0] = LineItem::new("Producto A", rust_decimal::Decimal::MAX, 2, dec!(1.00));
        assert!(fixed_renderer().render(&inv).is_ok());

        inv.products[0].total = rust_decimal::Decimal::MAX;
        inv.products[1].total = rust_decimal::Decimal::MAX;
        assert!(matches!(
            fixed_renderer().render(&inv),
            Err(RenderError::AmountOverflow)
        ));
    }

    #[test]
    fn test_renderer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentRenderer>();
    }
}
