//! Request signing with HMAC-SHA256 over the encoded merchant parameters.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::{
    crypto::{
        cipher::{DerivedKey, MerchantSecret},
        encoding::{ParameterMapping, encode},
    },
    error::{GatewayError, Result},
};

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme identifier sent as `Ds_SignatureVersion`.
pub const SIGNATURE_VERSION: &str = "HMAC_SHA256_V1";

/// Field names that may carry the order identifier, in lookup order.
///
/// Notifications use `Ds_Order`; payment requests use `DS_MERCHANT_ORDER`. The gateway
/// accepts either letter case for request fields.
pub const ORDER_FIELDS: [&str; 4] = ["Ds_Order", "DS_ORDER", "DS_MERCHANT_ORDER", "Ds_Merchant_Order"];

/// The three form fields exchanged with the gateway.
///
/// Used for outgoing payment requests and for the signed notification the gateway
/// sends back, which carries the same fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedParameters {
    /// Signature scheme, always [`SIGNATURE_VERSION`] for this crate.
    #[serde(rename = "Ds_SignatureVersion")]
    pub signature_version: String,
    /// Base64 of the JSON merchant parameters.
    #[serde(rename = "Ds_MerchantParameters")]
    pub merchant_parameters: String,
    /// Base64 HMAC-SHA256 of `merchant_parameters`.
    #[serde(rename = "Ds_Signature")]
    pub signature: String,
}

/// Computes the base64 HMAC-SHA256 of `payload` keyed with `key`.
///
/// The MAC covers the UTF-8 bytes of the payload string exactly as given. The result
/// uses the standard base64 alphabet with padding.
///
/// # Errors
///
/// Returns [`GatewayError::Crypto`] if the MAC rejects the key. HMAC accepts keys of
/// any length, so this does not happen in practice.
///
/// # Examples
///
/// ```
/// use redsys_signer::crypto::{MerchantSecret, sign};
///
/// # fn example() -> redsys_signer::Result<()> {
/// let secret = MerchantSecret::from_base64("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
/// let key = secret.derive_key("1234567890")?;
///
/// assert_eq!(sign("", &key)?, "IbxBdJyVLrE5WaBnqWx7c2Y8DMFIZq5u6/4IxqmJJnY=");
/// # Ok(())
/// # }
/// ```
pub fn sign(payload: &str, key: &DerivedKey) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| GatewayError::Crypto(format!("HMAC key setup failed: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Encodes and signs a parameter mapping.
///
/// The signing key is derived from the mapping's order field (see [`ORDER_FIELDS`]).
///
/// # Errors
///
/// Returns [`GatewayError::InvalidArgument`] if the mapping has no string order field.
#[instrument(skip(secret, params), fields(field_count = params.len()))]
pub fn sign_parameters(secret: &MerchantSecret, params: &ParameterMapping) -> Result<SignedParameters> {
    let order_id = order_id_of(params).ok_or_else(|| {
        GatewayError::InvalidArgument(
            "merchant parameters must contain a DS_MERCHANT_ORDER string".to_owned(),
        )
    })?;

    let merchant_parameters = encode(params)?;
    let key = secret.derive_key(order_id)?;
    let signature = sign(&merchant_parameters, &key)?;
    debug!(order_id, payload_len = merchant_parameters.len(), "merchant parameters signed");

    Ok(SignedParameters {
        signature_version: SIGNATURE_VERSION.to_owned(),
        merchant_parameters,
        signature,
    })
}

/// Returns the order identifier carried by `params`, if any.
#[must_use]
pub fn order_id_of(params: &ParameterMapping) -> Option<&str> {
    ORDER_FIELDS.iter().find_map(|field| params.get(*field).and_then(Value::as_str))
}
