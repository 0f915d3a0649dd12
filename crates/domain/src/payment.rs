//! Payment selection and payment status.

use serde::{Deserialize, Serialize};

use crate::error::{FormSection, ParseError, RequiredField, ValidationError};

/// How the buyer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(ParseError::new("payment method", other)),
        }
    }
}

/// Card fields entered on the payment step.
///
/// Only consulted when the method is [`PaymentMethod::Card`]. Never copied
/// into a placed order.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CardDetails {
    /// Returns the last four characters of the card number, if any.
    pub fn last_four(&self) -> &str {
        let number = self.card_number.trim();
        let start = number
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &number[start..]
    }

    fn missing_fields(&self) -> Vec<RequiredField> {
        [
            (RequiredField::CardNumber, &self.card_number),
            (RequiredField::CardName, &self.card_name),
            (RequiredField::ExpiryDate, &self.expiry_date),
            (RequiredField::Cvv, &self.cvv),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

// Card number and CVV stay out of logs and spans.
impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &format_args!("****{}", self.last_four()))
            .field("card_name", &self.card_name)
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"***")
            .finish()
    }
}

/// The payment method plus whatever fields it requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card: CardDetails,
}

impl PaymentSelection {
    /// Selects card payment with the given details.
    pub fn card(card: CardDetails) -> Self {
        Self {
            method: PaymentMethod::Card,
            card,
        }
    }

    /// Selects PayPal; no further fields are needed.
    pub fn paypal() -> Self {
        Self {
            method: PaymentMethod::Paypal,
            card: CardDetails::default(),
        }
    }

    /// Card fields must all be filled in when paying by card.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.method {
            PaymentMethod::Paypal => Ok(()),
            PaymentMethod::Card => {
                let fields = self.card.missing_fields();
                if fields.is_empty() {
                    Ok(())
                } else {
                    Err(ValidationError::MissingFields {
                        section: FormSection::Payment,
                        fields,
                    })
                }
            }
        }
    }
}

/// Payment state of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::new("payment status", s))
    }
}
