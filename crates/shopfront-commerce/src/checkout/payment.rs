//! Payment stage inputs.

use crate::checkout::format::{format_card_number, format_cvv, format_expiry};
use crate::checkout::validation::{Field, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CARD_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{16}$").expect("card pattern"));
static EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})/\d{2}$").expect("expiry pattern"));
static CVV: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,4}$").expect("cvv pattern"));

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit or debit card.
    #[default]
    Card,
    /// PayPal; no details collected here.
    Paypal,
}

impl PaymentMethod {
    /// Get the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }

    /// Get display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit Card",
            PaymentMethod::Paypal => "PayPal",
        }
    }
}

/// Card details as typed. Never serialized into an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    pub name: String,
    expiry: String,
    cvv: String,
}

impl CardDetails {
    /// Build from raw input, formatting each field.
    pub fn new(number: &str, name: impl Into<String>, expiry: &str, cvv: &str) -> Self {
        let mut card = Self {
            name: name.into(),
            ..Self::default()
        };
        card.set_number(number);
        card.set_expiry(expiry);
        card.set_cvv(cvv);
        card
    }

    /// Card number, grouped in blocks of four.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Expiry as `MM/YY`.
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// CVV digits.
    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    /// Set the card number from raw input.
    pub fn set_number(&mut self, input: &str) {
        self.number = format_card_number(input);
    }

    /// Set the expiry from raw input.
    pub fn set_expiry(&mut self, input: &str) {
        self.expiry = format_expiry(input);
    }

    /// Set the CVV from raw input.
    pub fn set_cvv(&mut self, input: &str) {
        self.cvv = format_cvv(input);
    }

    /// Last four digits, for confirmation screens.
    pub fn last_four(&self) -> Option<String> {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].iter().collect())
    }

    /// Check every card field, collecting all violations.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let digits: String = self.number.chars().filter(|c| !c.is_whitespace()).collect();
        if !CARD_NUMBER.is_match(&digits) {
            errors.add(Field::CardNumber, "Invalid card number");
        }
        if self.name.trim().is_empty() {
            errors.add(Field::CardName, "Cardholder name is required");
        }
        match EXPIRY.captures(&self.expiry) {
            Some(caps) => {
                let month: u8 = caps[1].parse().unwrap_or(0);
                if !(1..=12).contains(&month) {
                    errors.add(Field::Expiry, "Invalid expiry month");
                }
            }
            None => errors.add(Field::Expiry, "Invalid expiry date"),
        }
        if !CVV.is_match(&self.cvv) {
            errors.add(Field::Cvv, "Invalid CVV");
        }
        errors
    }
}

/// Validate the payment stage. Only cards need details.
pub fn validate_payment(method: PaymentMethod, card: &CardDetails) -> ValidationErrors {
    match method {
        PaymentMethod::Card => card.validate(),
        PaymentMethod::Paypal => ValidationErrors::new(),
    }
}
