//! Merchant-facing gateway facade.
//!
//! [`Gateway`] holds one merchant secret and exposes the operations a shop needs:
//! signing outgoing payment requests and checking the notifications the gateway
//! posts back.
//!
//! # Examples
//!
//! ```rust
//! use redsys_signer::gateway::{Currency, Gateway, PaymentRequest, TransactionType};
//!
//! # fn example() -> redsys_signer::Result<()> {
//! let gateway = Gateway::new("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
//!
//! let request = PaymentRequest::new(
//!     "1000",
//!     "12345678",
//!     "327234688",
//!     Currency::Eur,
//!     TransactionType::Authorization,
//!     "1",
//! );
//! let signed = gateway.make_payment_parameters(&request)?;
//!
//! let decoded = gateway.check_response(&signed)?;
//! assert!(decoded.is_some());
//! # Ok(())
//! # }
//! ```

pub mod codes;
pub mod params;
pub mod response;

pub use codes::{Currency, TransactionType};
pub use params::PaymentRequest;
pub use response::PaymentOutcome;
use tracing::{debug, instrument};

use crate::{
    config::GatewayConfig,
    crypto::{
        self, DerivedKey, MerchantSecret, ParameterMapping, SIGNATURE_VERSION, SignedParameters,
    },
    error::{GatewayError, Result},
};

/// Signed notification posted by the gateway to the merchant URL.
///
/// Carries the same three fields as an outgoing request.
pub type NotificationParams = SignedParameters;

/// Signs requests and verifies notifications for one merchant.
#[derive(Debug, Clone)]
pub struct Gateway {
    secret: MerchantSecret,
}

impl Gateway {
    /// Creates a gateway from the base64 merchant key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the key is empty, not base64, or
    /// not 24 bytes once decoded.
    pub fn new(merchant_key: &str) -> Result<Self> {
        Ok(Self::from_secret(MerchantSecret::from_base64(merchant_key)?))
    }

    /// Creates a gateway from an already decoded secret.
    #[must_use]
    pub const fn from_secret(secret: MerchantSecret) -> Self {
        Self { secret }
    }

    /// Creates a gateway from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the configured key is invalid.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Ok(Self::from_secret(config.secret()?))
    }

    /// Derives the per-order key and returns it as base64.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Crypto`] if the cipher cannot be initialised.
    pub fn encrypt(&self, order_id: &str) -> Result<String> {
        Ok(self.derive_key(order_id)?.to_base64())
    }

    /// Derives the per-order HMAC key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Crypto`] if the cipher cannot be initialised.
    pub fn derive_key(&self, order_id: &str) -> Result<DerivedKey> {
        self.secret.derive_key(order_id)
    }

    /// Signs an already encoded payload with the key of `order_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Crypto`] if key derivation or the MAC fails.
    pub fn sign_payload(&self, payload: &str, order_id: &str) -> Result<String> {
        crypto::sign(payload, &self.derive_key(order_id)?)
    }

    /// Encodes and signs a raw parameter mapping.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if the mapping has no order field.
    pub fn sign_parameters(&self, params: &ParameterMapping) -> Result<SignedParameters> {
        crypto::sign_parameters(&self.secret, params)
    }

    /// Validates a payment request and produces the three form fields.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if the request fails validation.
    #[instrument(skip_all, fields(order = %request.order_reference))]
    pub fn make_payment_parameters(&self, request: &PaymentRequest) -> Result<SignedParameters> {
        request.validate()?;
        let signed = self.sign_parameters(&request.to_parameters())?;
        debug!("payment request signed");
        Ok(signed)
    }

    /// Verifies a notification payload and signature.
    ///
    /// Returns `Ok(None)` when the signature does not match.
    ///
    /// # Errors
    ///
    /// Returns error if the signature is blank or the payload cannot be decoded.
    pub fn check_response_parameters(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<Option<ParameterMapping>> {
        crypto::verify(payload, signature, &self.secret)
    }

    /// Verifies a complete notification, including its signature version.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] for an unsupported signature
    /// version, plus the errors of [`Gateway::check_response_parameters`].
    pub fn check_response(
        &self,
        notification: &NotificationParams,
    ) -> Result<Option<ParameterMapping>> {
        if notification.signature_version != SIGNATURE_VERSION {
            return Err(GatewayError::InvalidArgument(format!(
                "unsupported signature version: {}",
                notification.signature_version
            )));
        }
        self.check_response_parameters(&notification.merchant_parameters, &notification.signature)
    }

    /// Decodes a payload without checking any signature.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] if the payload is malformed.
    pub fn decode(&self, payload: &str) -> Result<ParameterMapping> {
        crypto::decode(payload)
    }
}
