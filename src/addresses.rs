//! Shipping addresses

use crate::forms::FieldErrors;

/// Shipping address form as submitted. Every text field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Street
    pub street: String,
    /// House or flat number
    pub street_number: String,
    /// Postal code
    pub zip_code: String,
    /// City
    pub city: String,
    /// Country code
    pub country: String,
    /// Phone number
    pub phone: String,
    /// Make this the user's current address
    pub save_address: bool,
}

impl AddressForm {
    /// Validates the submission.
    ///
    /// # Errors
    ///
    /// Returns one field error per blank field.
    pub fn validate(self) -> Result<ShippingAddress, FieldErrors> {
        let mut errors = FieldErrors::default();

        errors.require("first_name", &self.first_name);
        errors.require("last_name", &self.last_name);
        errors.require("street", &self.street);
        errors.require("street_number", &self.street_number);
        errors.require("zip_code", &self.zip_code);
        errors.require("city", &self.city);
        errors.require("country", &self.country);
        errors.require("phone", &self.phone);

        errors.into_result(ShippingAddress {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            street: self.street.trim().to_string(),
            street_number: self.street_number.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
            current_address: self.save_address,
        })
    }
}

/// A validated shipping address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Street
    pub street: String,
    /// House or flat number
    pub street_number: String,
    /// Postal code
    pub zip_code: String,
    /// City
    pub city: String,
    /// Country code
    pub country: String,
    /// Phone number
    pub phone: String,
    /// Whether this is the user's current address
    pub current_address: bool,
}

impl ShippingAddress {
    /// One-line description shown in address pickers.
    pub fn describe(&self, username: &str) -> String {
        format!(
            "Shipping address for {username}: {} {}, {}",
            self.street, self.street_number, self.city
        )
    }
}
