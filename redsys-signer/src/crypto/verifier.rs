//! Verification of signed gateway notifications.

use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};

use crate::{
    crypto::{
        cipher::MerchantSecret,
        encoding::{ParameterMapping, decode_raw, percent_decode_params, to_url_safe_alphabet},
        signer::{order_id_of, sign},
    },
    error::{GatewayError, Result},
};

/// Verifies a signed payload and decodes it.
///
/// The signing key is re-derived from the order identifier inside the payload, the
/// expected signature is recomputed over the payload string exactly as received, and
/// both signatures are compared in the URL-safe base64 alphabet in constant time.
///
/// Returns `Ok(Some(params))` with percent-decoded values when the signature matches
/// and `Ok(None)` when it does not. A mismatch is an expected outcome for forged or
/// tampered notifications, not an error.
///
/// # Errors
///
/// - [`GatewayError::InvalidArgument`] if `signature` is empty
/// - [`GatewayError::Decode`] if the payload cannot be decoded or has no order field
///
/// # Examples
///
/// ```
/// use redsys_signer::crypto::{MerchantSecret, verify};
///
/// # fn example() -> redsys_signer::Result<()> {
/// let secret = MerchantSecret::from_base64("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
/// let payload = "eyJEc19PcmRlciI6IjEyMzQifQ==";
///
/// assert!(verify(payload, "forged", &secret)?.is_none());
/// assert!(verify(payload, "", &secret).is_err());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(payload_len = payload.len(), signature_len = signature.len()))]
pub fn verify(
    payload: &str,
    signature: &str,
    secret: &MerchantSecret,
) -> Result<Option<ParameterMapping>> {
    if signature.trim().is_empty() {
        return Err(GatewayError::InvalidArgument("signature is required".to_owned()));
    }

    let mut params = decode_raw(payload)?;
    let order_id = order_id_of(&params)
        .ok_or_else(|| GatewayError::Decode("payload has no order identifier".to_owned()))?;

    let key = secret.derive_key(order_id)?;
    let expected = to_url_safe_alphabet(&sign(payload, &key)?);
    let received = to_url_safe_alphabet(signature);

    if !signatures_match(&expected, &received) {
        warn!(order_id, "signature mismatch, rejecting notification");
        return Ok(None);
    }

    debug!(order_id, "signature verified");
    percent_decode_params(&mut params)?;
    Ok(Some(params))
}

/// Constant-time comparison; different lengths never match.
fn signatures_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::crypto::{encoding::encode, signer::sign_parameters};

    const TEST_KEY: &str = "sq7HjrUOBfKmC576ILgskD5srU870gJ7";
    const RESPONSE_PAYLOAD: &str = "eyJEc19EYXRlIjoiMjglMkYwNSUyRjIwMTgiLCJEc19Ib3VyIjoiMTAlM0E0NCIsIkRzX1NlY3VyZVBheW1lbnQiOiIxIiwiRHNfQW1vdW50IjoiNjcwMCIsIkRzX0N1cnJlbmN5IjoiOTc4IiwiRHNfT3JkZXIiOiIwMDAwRkI5QTE3MiIsIkRzX01lcmNoYW50Q29kZSI6IjMzNjcwNDY1NSIsIkRzX1Rlcm1pbmFsIjoiMDAxIiwiRHNfUmVzcG9uc2UiOiIwMDAwIiwiRHNfVHJhbnNhY3Rpb25UeXBlIjoiMCIsIkRzX01lcmNoYW50RGF0YSI6IiIsIkRzX0F1dGhvcmlzYXRpb25Db2RlIjoiMjE4MDQ4IiwiRHNfQ29uc3VtZXJMYW5ndWFnZSI6IjEiLCJEc19DYXJkX0NvdW50cnkiOiI3MjQiLCJEc19DYXJkX0JyYW5kIjoiMSJ9";
    const RESPONSE_SIGNATURE: &str = "3Fg6oB4URw8ykL-hkvdYPW4RKvT3ikz6qAv6WMHFH2I=";

    fn secret() -> MerchantSecret {
        MerchantSecret::from_base64(TEST_KEY).unwrap()
    }

    #[test]
    fn test_verify_valid_notification() {
        let params = verify(RESPONSE_PAYLOAD, RESPONSE_SIGNATURE, &secret()).unwrap().unwrap();
        assert_eq!(params["Ds_Date"], "28/05/2018");
        assert_eq!(params["Ds_Hour"], "10:44");
        assert_eq!(params["Ds_AuthorisationCode"], "218048");
    }

    #[test]
    fn test_verify_accepts_standard_alphabet_signature() {
        let standard = RESPONSE_SIGNATURE.replace('-', "+").replace('_', "/");
        assert!(verify(RESPONSE_PAYLOAD, &standard, &secret()).unwrap().is_some());
    }

    #[test]
    fn test_verify_rejects_altered_signatures() {
        for forged in ["00000", "12345", "12345=="] {
            assert!(verify(RESPONSE_PAYLOAD, forged, &secret()).unwrap().is_none());
        }
    }

    #[test]
    fn test_verify_rejects_truncated_and_padded_signatures() {
        let truncated = &RESPONSE_SIGNATURE[..RESPONSE_SIGNATURE.len() - 1];
        let padded = format!("{RESPONSE_SIGNATURE}=");
        let lowercase = RESPONSE_SIGNATURE.to_lowercase();

        assert!(verify(RESPONSE_PAYLOAD, truncated, &secret()).unwrap().is_none());
        assert!(verify(RESPONSE_PAYLOAD, &padded, &secret()).unwrap().is_none());
        assert!(verify(RESPONSE_PAYLOAD, &lowercase, &secret()).unwrap().is_none());
    }

    #[test]
    fn test_verify_requires_signature() {
        let err = verify(RESPONSE_PAYLOAD, "", &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));

        let err = verify(RESPONSE_PAYLOAD, "  ", &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[test]
    fn test_verify_wrong_secret_is_mismatch() {
        let other = MerchantSecret::from_bytes(&[7u8; 24]).unwrap();
        assert!(verify(RESPONSE_PAYLOAD, RESPONSE_SIGNATURE, &other).unwrap().is_none());
    }

    #[test]
    fn test_verify_tampered_payload_is_mismatch() {
        let mut params = verify(RESPONSE_PAYLOAD, RESPONSE_SIGNATURE, &secret()).unwrap().unwrap();
        params.insert("Ds_Amount".to_owned(), "1".into());
        let tampered = encode(&params).unwrap();

        assert!(verify(&tampered, RESPONSE_SIGNATURE, &secret()).unwrap().is_none());
    }

    #[test]
    fn test_verify_own_signature() {
        let Value::Object(params) = json!({
            "DS_MERCHANT_AMOUNT": "1500",
            "DS_MERCHANT_ORDER": "00001234",
        }) else {
            unreachable!()
        };

        let signed = sign_parameters(&secret(), &params).unwrap();
        let decoded = verify(&signed.merchant_parameters, &signed.signature, &secret()).unwrap();
        assert_eq!(decoded, Some(params));
    }

    #[test]
    fn test_verify_payload_without_order() {
        let payload = encode(&json!({ "Ds_Amount": "100" })).unwrap();
        let err = verify(&payload, "c2ln", &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_verify_malformed_payload() {
        assert!(matches!(verify("%%%", "c2ln", &secret()), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_signatures_match() {
        assert!(signatures_match("abc=", "abc="));
        assert!(!signatures_match("abc=", "abc"));
        assert!(!signatures_match("abc=", "abd="));
        assert!(!signatures_match("", "a"));
    }
}
