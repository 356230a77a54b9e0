//! Shipping address form.

use crate::checkout::validation::{Field, ValidationErrors};
use crate::identity::UserProfile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Country used when the profile does not name one.
pub const DEFAULT_COUNTRY: &str = "United States";

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern"));

/// A postal address as entered on the shipping stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    /// Apartment, suite, etc. Optional.
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            street: String::new(),
            apartment: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl ShippingAddress {
    /// Pre-fill from the signed-in user's profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        let saved = profile.address.clone().unwrap_or_default();
        Self {
            full_name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            street: saved.street,
            apartment: String::new(),
            city: saved.city,
            state: saved.state,
            zip_code: saved.zip_code,
            country: saved
                .country
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        }
    }

    /// Check every required field, collecting all violations.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let required = [
            (Field::FullName, &self.full_name, "Name is required"),
            (Field::Email, &self.email, "Email is required"),
            (Field::Phone, &self.phone, "Phone is required"),
            (Field::Street, &self.street, "Street address is required"),
            (Field::City, &self.city, "City is required"),
            (Field::State, &self.state, "State is required"),
            (Field::ZipCode, &self.zip_code, "ZIP code is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.add(field, message);
            }
        }
        if !self.email.trim().is_empty() && !EMAIL.is_match(self.email.trim()) {
            errors.add(Field::Email, "Invalid email");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ProfileAddress;
    use crate::ids::UserId;

    fn complete() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            street: "12 Analytical Way".into(),
            apartment: String::new(),
            city: "London".into(),
            state: "LN".into(),
            zip_code: "10001".into(),
            country: DEFAULT_COUNTRY.into(),
        }
    }

    #[test]
    fn test_empty_address_reports_every_field() {
        let errors = ShippingAddress::default().validate();
        assert_eq!(errors.len(), 7);
        assert_eq!(errors.get(Field::ZipCode), Some("ZIP code is required"));
    }

    #[test]
    fn test_email_pattern() {
        let mut address = complete();
        assert!(address.validate().is_empty());

        address.email = "not-an-email".into();
        assert_eq!(address.validate().get(Field::Email), Some("Invalid email"));

        address.email = "a b@c.d".into();
        assert!(address.validate().get(Field::Email).is_some());
    }

    #[test]
    fn test_whitespace_is_blank() {
        let mut address = complete();
        address.city = "   ".into();
        assert_eq!(address.validate().get(Field::City), Some("City is required"));
    }

    #[test]
    fn test_from_profile() {
        let profile = UserProfile::new(UserId::new("u1"), "Ada", "ada@example.com")
            .with_phone("555-0100")
            .with_address(ProfileAddress {
                street: "1 Main St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62701".into(),
                country: None,
            });
        let address = ShippingAddress::from_profile(&profile);
        assert_eq!(address.full_name, "Ada");
        assert_eq!(address.zip_code, "62701");
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert!(address.validate().is_empty());
    }
}
