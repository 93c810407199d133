//! Payment request signing and notification checking example.
//!
//! Signs a payment request the way a shop backend would before redirecting the
//! customer, then checks the gateway's notification for the same order.
//!
//! # Running this example
//!
//! Uses the public test key unless one is provided:
//! ```bash
//! export REDSYS_MERCHANT_KEY=sq7HjrUOBfKmC576ILgskD5srU870gJ7
//! cargo run --example payment_roundtrip
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::env;

use redsys_signer::{
    Gateway, GatewayError,
    gateway::{Currency, PaymentOutcome, PaymentRequest, TransactionType},
};

/// Public key of the gateway's test environment.
const TEST_MERCHANT_KEY: &str = "sq7HjrUOBfKmC576ILgskD5srU870gJ7";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Redsys Signer: Payment Round-trip Example\n");

    // Step 1: Load the merchant key
    println!("1. Loading merchant key...");
    let key = env::var("REDSYS_MERCHANT_KEY").unwrap_or_else(|_| TEST_MERCHANT_KEY.to_owned());
    let gateway = Gateway::new(&key)?;
    println!("   Key loaded: {:?}\n", gateway);

    // Step 2: Sign the outgoing payment request
    println!("2. Signing payment request...");
    let request = PaymentRequest {
        merchant_name: Some("SPEC SHOP".to_owned()),
        merchant_url: Some("http://www.spec-shop.com/".to_owned()),
        success_url: Some("http://www.spec-shop/success".to_owned()),
        error_url: Some("http://www.spec-shop/error".to_owned()),
        ..PaymentRequest::new(
            "1000",
            "12345678",
            "327234688",
            Currency::Eur,
            TransactionType::Authorization,
            "1",
        )
    };
    let signed = gateway.make_payment_parameters(&request)?;
    println!("   Ds_SignatureVersion:   {}", signed.signature_version);
    println!("   Ds_MerchantParameters: {}", signed.merchant_parameters);
    println!("   Ds_Signature:          {}\n", signed.signature);

    // Step 3: Check a notification carrying the same three fields
    println!("3. Checking notification...");
    match gateway.check_response(&signed)? {
        Some(params) => {
            println!("   Signature valid, {} parameters", params.len());
            match PaymentOutcome::from_params(&params) {
                Ok(outcome) => println!("   Authorized: {}", outcome.is_authorized()),
                Err(e) => println!("   No response code yet: {}", e),
            }
        }
        None => println!("   Signature rejected"),
    }

    // Step 4: Show how a forged signature is reported
    println!("\n4. Checking a forged notification...");
    let mut forged = signed.clone();
    forged.signature = "12345==".to_owned();
    assert!(gateway.check_response(&forged)?.is_none());
    println!("   Forged signature rejected (Ok(None), not an error)");

    // Step 5: Show an argument error
    println!("\n5. Checking a notification without signature...");
    forged.signature.clear();
    match gateway.check_response(&forged) {
        Err(GatewayError::InvalidArgument(msg)) => println!("   Rejected: {}", msg),
        other => println!("   Unexpected result: {:?}", other),
    }

    Ok(())
}
