//! Invoice validation.
//!
//! The renderer assumes its input already satisfies these rules: required text is present, the
//! e-mail address has a `local@domain.tld` shape, there is at least one product, and every
//! amount and quantity is strictly positive. Callers that accept invoices from the outside
//! (the CLI, an HTTP handler) run [`validate_invoice`] first and reject failures there.

use crate::model::{Customer, Invoice, LineItem};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("e-mail pattern is a valid regex")
});

/// A single rule violation, addressed by a dotted field path such as `products[1].price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any violation concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid invoice ({} problem(s))", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Returns `true` when `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks an invoice against the input contract, collecting every violation.
pub fn validate_invoice(invoice: &Invoice) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    validate_customer(&invoice.customer, &mut errors);

    if invoice.products.is_empty() {
        errors.push(ValidationError::new(
            "products",
            "at least one product is required",
        ));
    }
    for (index, item) in invoice.products.iter().enumerate() {
        validate_line_item(index, item, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn validate_customer(customer: &Customer, errors: &mut Vec<ValidationError>) {
    if customer.name.is_empty() {
        errors.push(ValidationError::new("customer.name", "must not be empty"));
    }
    if customer.identification.is_empty() {
        errors.push(ValidationError::new(
            "customer.identification",
            "must not be empty",
        ));
    }
    if !is_valid_email(&customer.email) {
        errors.push(ValidationError::new(
            "customer.email",
            format!("'{}' is not a valid e-mail address", customer.email),
        ));
    }
}

fn validate_line_item(index: usize, item: &LineItem, errors: &mut Vec<ValidationError>) {
    let field = |name: &str| format!("products[{}].{}", index, name);

    if item.name.is_empty() {
        errors.push(ValidationError::new(field("name"), "must not be empty"));
    }
    if item.price <= Decimal::ZERO {
        errors.push(ValidationError::new(field("price"), "must be greater than 0"));
    }
    if item.quantity == 0 {
        errors.push(ValidationError::new(
            field("quantity"),
            "must be greater than 0",
        ));
    }
    if item.total <= Decimal::ZERO {
        errors.push(ValidationError::new(field("total"), "must be greater than 0"));
    }
}
