//! `HMAC_SHA256_V1` signature scheme.
//!
//! The redirect gateway authenticates merchant parameters with a per-order HMAC key.
//! Signing a payment request takes three steps:
//!
//! ```text
//! order id ──3DES-CBC(merchant secret, IV=0)──▶ derived key
//! parameters ──JSON──▶ base64 ──────────────────▶ payload
//! payload ──HMAC-SHA256(derived key)──▶ base64 ──▶ signature
//! ```
//!
//! Verification runs the same pipeline backwards: the payload is decoded to find the
//! order id, the key is re-derived, and the recomputed signature is compared with the
//! one the gateway sent.
//!
//! # Key Components
//!
//! - [`MerchantSecret`]: decoded 24-byte triple-DES key
//! - [`DerivedKey`]: per-order HMAC key
//! - [`encode`] / [`decode`]: canonical payload encoding
//! - [`sign`] / [`sign_parameters`]: HMAC-SHA256 signatures
//! - [`verify`]: signature check plus decode
//!
//! # Examples
//!
//! ```rust
//! use redsys_signer::crypto::{MerchantSecret, ParameterMapping, sign_parameters, verify};
//!
//! # fn example() -> redsys_signer::Result<()> {
//! let secret = MerchantSecret::from_base64("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
//!
//! let mut params = ParameterMapping::new();
//! params.insert("DS_MERCHANT_AMOUNT".to_owned(), "1000".into());
//! params.insert("DS_MERCHANT_ORDER".to_owned(), "12345678".into());
//!
//! let signed = sign_parameters(&secret, &params)?;
//! let decoded = verify(&signed.merchant_parameters, &signed.signature, &secret)?;
//! assert_eq!(decoded, Some(params));
//! # Ok(())
//! # }
//! ```
//!
//! # Pitfalls
//!
//! None of these raise an error. The gateway just rejects the signature:
//! - Padding the order id with anything other than zero bytes
//! - Reordering JSON keys or adding whitespace before encoding
//! - Signing the decoded JSON instead of the base64 payload string
//! - Comparing signatures across base64 alphabets without normalizing

pub mod cipher;
pub mod encoding;
pub mod signer;
pub mod verifier;


pub use cipher::{DerivedKey, MerchantSecret};
pub use encoding::{ParameterMapping, decode, decode_raw, encode};
pub use signer::{SIGNATURE_VERSION, SignedParameters, order_id_of, sign, sign_parameters};
pub use verifier::verify;
