//! Error types for gateway signing and verification.
//!
//! All errors implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Configuration Errors** ([`GatewayError::Configuration`]): bad merchant secret or
//!   config file. Fatal to the instance; fix the configuration and restart.
//! - **Argument Errors** ([`GatewayError::InvalidArgument`]): the caller passed something
//!   it should not have (empty signature, missing order reference).
//! - **Decode Errors** ([`GatewayError::Decode`]): the gateway payload is not valid
//!   base64, UTF-8 or a JSON object.
//! - **Crypto Errors** ([`GatewayError::Crypto`]): a cipher or MAC refused its key.
//!
//! A signature that simply does not match is *not* an error. Verification returns
//! `Ok(None)` for it, see [`Gateway::check_response_parameters`](crate::Gateway::check_response_parameters).
//!
//! # Examples
//!
//! ```
//! use redsys_signer::error::{GatewayError, Result};
//!
//! fn require_signature(signature: &str) -> Result<&str> {
//!     if signature.is_empty() {
//!         return Err(GatewayError::InvalidArgument("signature is required".to_owned()));
//!     }
//!     Ok(signature)
//! }
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while signing requests or checking responses.
///
/// # Error Recovery
///
/// None of these errors are transient. Cryptographic operations are deterministic,
/// so retrying with the same input yields the same error.
///
/// - **[`Configuration`](Self::Configuration)**: refuse to start; the merchant key is wrong
/// - **[`InvalidArgument`](Self::InvalidArgument)**: reject the single request (4xx)
/// - **[`Decode`](Self::Decode)**: reject the single request (4xx)
/// - **[`Crypto`](Self::Crypto)**: indicates a bug; key sizes are checked up front
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Merchant configuration is missing or invalid.
    ///
    /// Raised when the merchant secret is empty, is not base64, or does not decode to
    /// the 24-byte triple-DES key size. Also raised for unreadable or invalid TOML
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use redsys_signer::{Gateway, GatewayError};
    ///
    /// let err = Gateway::new("").unwrap_err();
    /// assert!(matches!(err, GatewayError::Configuration(_)));
    /// ```
    #[error("Invalid gateway configuration: {0}")]
    Configuration(String),

    /// The caller invoked an operation with an unusable argument.
    ///
    /// Most notably, verifying a response with an empty signature. This is a
    /// programming error and is deliberately distinct from a signature that does
    /// not match.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A merchant parameters payload could not be decoded.
    ///
    /// Common causes include:
    /// - Malformed base64
    /// - Bytes that are not UTF-8
    /// - Malformed JSON, or JSON that is not an object
    /// - Response payload without an order identifier
    #[error("Failed to decode merchant parameters: {0}")]
    Decode(String),

    /// Cryptographic primitive rejected its input.
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GatewayError::Configuration("merchant key is empty".into());
        assert_eq!(error.to_string(), "Invalid gateway configuration: merchant key is empty");
    }

    #[test]
    fn test_invalid_argument_error() {
        let error = GatewayError::InvalidArgument("signature is required".to_owned());
        assert_eq!(error.to_string(), "Invalid argument: signature is required");
    }

    #[test]
    fn test_decode_error() {
        let error = GatewayError::Decode("expected a JSON object".to_owned());
        assert!(error.to_string().contains("Failed to decode merchant parameters"));
    }

    #[test]
    fn test_crypto_error() {
        let error = GatewayError::Crypto("bad key length".to_owned());
        assert!(error.to_string().starts_with("Cryptographic operation failed"));
    }
}
