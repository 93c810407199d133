//! Redsys Signer: `HMAC_SHA256_V1` signatures for the Redsys redirect gateway
//!
//! A Rust library that produces and checks the signed form fields exchanged with the
//! Redsys card-payment gateway. A shop uses it to sign the payment request it
//! redirects the customer with, and to authenticate the notification the gateway
//! posts back once the payment settles.
//!
//! # What does it do?
//!
//! Every message carries three fields:
//!
//! - `Ds_SignatureVersion`: always `HMAC_SHA256_V1`
//! - `Ds_MerchantParameters`: base64 of a flat JSON object
//! - `Ds_Signature`: base64 HMAC-SHA256 of the previous field
//!
//! The HMAC key is not the merchant secret itself. It is derived per order by
//! encrypting the order id with triple DES under the merchant secret, so a leaked
//! signature for one order says nothing about another.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   PaymentRequest    ┌────────────────────────────┐
//! │   Shop backend   │────────────────────▶│   Gateway (this crate)     │
//! │                  │◀────────────────────│  ┌──────────┐ ┌─────────┐  │
//! └────────┬─────────┘  SignedParameters   │  │ gateway  │─│ crypto  │  │
//!          │                               │  │ (fields) │ │ (3DES + │  │
//!          │ HTML form POST                │  └──────────┘ │  HMAC)  │  │
//!          ▼                               │               └─────────┘  │
//! ┌──────────────────┐  notification POST  └────────────────────────────┘
//! │  Redsys gateway  │─────────────────────▶ check_response()
//! └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Sign a Payment Request
//!
//! ```rust
//! use redsys_signer::{
//!     Gateway,
//!     gateway::{Currency, PaymentRequest, TransactionType},
//! };
//!
//! # fn example() -> redsys_signer::Result<()> {
//! let gateway = Gateway::new("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
//!
//! let request = PaymentRequest {
//!     merchant_name: Some("SPEC SHOP".to_owned()),
//!     merchant_url: Some("http://www.spec-shop.com/".to_owned()),
//!     success_url: Some("http://www.spec-shop/success".to_owned()),
//!     error_url: Some("http://www.spec-shop/error".to_owned()),
//!     ..PaymentRequest::new(
//!         "1000",
//!         "12345678",
//!         "327234688",
//!         Currency::Eur,
//!         TransactionType::Authorization,
//!         "1",
//!     )
//! };
//!
//! let signed = gateway.make_payment_parameters(&request)?;
//! assert_eq!(signed.signature, "OJHmZ7cVCM2YdKoFUWkSvK9suPLRvl3DPS840EgBW00=");
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Check a Notification
//!
//! ```rust
//! use redsys_signer::{Gateway, gateway::PaymentOutcome};
//!
//! # fn example(payload: &str, signature: &str) -> redsys_signer::Result<()> {
//! let gateway = Gateway::new("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
//!
//! match gateway.check_response_parameters(payload, signature)? {
//!     Some(params) => {
//!         let outcome = PaymentOutcome::from_params(&params)?;
//!         println!("order {} authorized: {}", params["Ds_Order"], outcome.is_authorized());
//!     }
//!     None => eprintln!("forged notification rejected"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! - Signatures are compared in constant time
//! - Secrets are zeroized on drop and redacted from `Debug` output
//! - Notifications are decoded only after their signature checks out
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, GatewayError>`](Result). A signature
//! mismatch is reported as `Ok(None)`, never as an error, so callers cannot confuse a
//! forged notification with a malformed one.
//!
//! # Logging
//!
//! The crate emits [`tracing`] spans and events. Install a subscriber (the `redsys`
//! CLI uses `tracing-subscriber`) to see them. Secrets and signatures are never
//! logged, only their lengths.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod gateway;

pub use config::GatewayConfig;
pub use crypto::{ParameterMapping, SignedParameters};
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
