//! # Share Links
//!
//! Builds the deep link that opens a WhatsApp chat with the buyer and the
//! bill text pre-filled. Opening the link is the caller's business.

use crate::error::{CoreError, CoreResult};

/// Country code prepended to bare 10-digit numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Normalises a phone number to digits only, adding the default country
/// code to bare 10-digit numbers.
///
/// ## Example
/// ```rust
/// use storefront_core::share::normalize_phone;
///
/// assert_eq!(normalize_phone("98765 43210").as_deref(), Some("919876543210"));
/// assert_eq!(normalize_phone("+44 20 7946 0958").as_deref(), Some("442079460958"));
/// assert_eq!(normalize_phone("n/a"), None);
/// ```
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0 => None,
        10 => Some(format!("{}{}", DEFAULT_COUNTRY_CODE, digits)),
        _ => Some(digits),
    }
}

/// Builds `whatsapp://send?phone=<digits>&text=<percent-encoded text>`.
///
/// ## Errors
/// `MissingPhoneNumber` when `phone` contains no digits.
pub fn whatsapp_share_url(text: &str, phone: &str) -> CoreResult<String> {
    let number = normalize_phone(phone).ok_or(CoreError::MissingPhoneNumber)?;
    Ok(format!(
        "whatsapp://send?phone={}&text={}",
        number,
        urlencoding::encode(text)
    ))
}
