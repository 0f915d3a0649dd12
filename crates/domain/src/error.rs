//! Domain error types shared across modules.

use serde::Serialize;
use thiserror::Error;

/// Part of the checkout form a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormSection {
    Shipping,
    Billing,
    Payment,
}

impl std::fmt::Display for FormSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FormSection::Shipping => "shipping",
            FormSection::Billing => "billing",
            FormSection::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// A form field that must be filled in before the checkout can advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Street,
    City,
    State,
    ZipCode,
    Country,
    CardNumber,
    CardName,
    ExpiryDate,
    Cvv,
}

impl RequiredField {
    /// Returns the field name as used in request payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Street => "street",
            RequiredField::City => "city",
            RequiredField::State => "state",
            RequiredField::ZipCode => "zip_code",
            RequiredField::Country => "country",
            RequiredField::CardNumber => "card_number",
            RequiredField::CardName => "card_name",
            RequiredField::ExpiryDate => "expiry_date",
            RequiredField::Cvv => "cvv",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input that blocks a checkout step from advancing.
///
/// Never mutates what the user already entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are blank.
    #[error("{section}: missing required fields: {}", join_fields(.fields))]
    MissingFields {
        section: FormSection,
        fields: Vec<RequiredField>,
    },

    /// There is nothing in the cart to order.
    #[error("Cart is empty")]
    EmptyCart,
}

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
