//! Signed-in identity for the current session.
//!
//! Sign-in itself happens elsewhere; this store only records who is signed
//! in so the cart and checkout can gate on it and pre-fill forms.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Saved postal address on a user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Option<String>,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Default shipping address.
    pub address: Option<ProfileAddress>,
}

impl UserProfile {
    /// Create a profile with no phone or address.
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
        }
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the default address.
    pub fn with_address(mut self, address: ProfileAddress) -> Self {
        self.address = Some(address);
        self
    }
}

/// Holds the identity for one session. Passed by reference to the cart
/// store and checkout; never global.
#[derive(Debug, Default)]
pub struct IdentityStore {
    user: RwLock<Option<UserProfile>>,
}

impl IdentityStore {
    /// A store with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with `user` already signed in.
    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, user: UserProfile) {
        tracing::debug!(user = %user.id, "signed in");
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Forget the signed-in user.
    pub fn sign_out(&self) {
        tracing::debug!("signed out");
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current user profile.
    pub fn current(&self) -> Option<UserProfile> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
