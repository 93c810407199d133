//! Canonical merchant-parameter encoding.
//!
//! Signed payloads are compact JSON, base64-encoded. The HMAC covers the base64 text,
//! so the JSON must come out byte-for-byte the same every time: keys stay in insertion
//! order, no whitespace, only standard JSON string escaping.

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Ordered mapping of gateway field names to values.
///
/// Iteration order is insertion order (`serde_json` is built with `preserve_order`).
pub type ParameterMapping = serde_json::Map<String, Value>;

/// Lenient decoder for payloads coming back from the gateway.
const PAYLOAD_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Serializes parameters to compact JSON and base64-encodes them.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidArgument`] if `params` cannot be serialized as JSON.
///
/// # Examples
///
/// ```
/// use redsys_signer::crypto::{ParameterMapping, encode};
///
/// # fn example() -> redsys_signer::Result<()> {
/// let mut params = ParameterMapping::new();
/// params.insert("DS_MERCHANT_AMOUNT".to_owned(), "1000".into());
///
/// let payload = encode(&params)?;
/// assert_eq!(payload, "eyJEU19NRVJDSEFOVF9BTU9VTlQiOiIxMDAwIn0=");
/// # Ok(())
/// # }
/// ```
pub fn encode<T: Serialize + ?Sized>(params: &T) -> Result<String> {
    let json = serde_json::to_string(params).map_err(|e| {
        GatewayError::InvalidArgument(format!("parameters are not serializable as JSON: {e}"))
    })?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a merchant parameters payload into a mapping.
///
/// Accepts the standard or URL-safe base64 alphabet, with or without padding. Every
/// string value is percent-decoded afterwards, so a gateway date such as
/// `28%2F05%2F2018` comes back as `28/05/2018`. A literal `+` is kept as is.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if the payload is not base64, not UTF-8, not JSON,
/// not a JSON object, or holds a percent-encoded value that is not UTF-8.
pub fn decode(payload: &str) -> Result<ParameterMapping> {
    let mut params = decode_raw(payload)?;
    percent_decode_params(&mut params)?;
    Ok(params)
}

/// Decodes a payload without percent-decoding its values.
///
/// Values come back exactly as the gateway serialized them.
///
/// # Errors
///
/// Same as [`decode`], except for the percent-decoding failure.
pub fn decode_raw(payload: &str) -> Result<ParameterMapping> {
    let normalized = to_standard_alphabet(payload.trim());
    let bytes = PAYLOAD_DECODER
        .decode(normalized.as_bytes())
        .map_err(|e| GatewayError::Decode(format!("invalid base64: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| GatewayError::Decode(format!("payload is not UTF-8: {e}")))?;

    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(other) => Err(GatewayError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(GatewayError::Decode(format!("invalid JSON: {e}"))),
    }
}

/// Maps the URL-safe base64 alphabet onto the standard one.
pub(crate) fn to_standard_alphabet(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Maps the standard base64 alphabet onto the URL-safe one.
pub(crate) fn to_url_safe_alphabet(input: &str) -> String {
    input.replace('+', "-").replace('/', "_")
}

/// Percent-decodes every string value of `params` in place.
pub(crate) fn percent_decode_params(params: &mut ParameterMapping) -> Result<()> {
    params.values_mut().try_for_each(percent_decode_value)
}

fn percent_decode_value(value: &mut Value) -> Result<()> {
    match value {
        Value::String(text) => {
            if text.contains('%') {
                let decoded = urlencoding::decode(text).map_err(|e| {
                    GatewayError::Decode(format!("percent-encoded value is not UTF-8: {e}"))
                })?;
                *text = decoded.into_owned();
            }
        }
        Value::Array(items) => {
            for item in items {
                percent_decode_value(item)?;
            }
        }
        Value::Object(fields) => {
            for field in fields.values_mut() {
                percent_decode_value(field)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const RESPONSE_PAYLOAD: &str = "eyJEc19EYXRlIjoiMjglMkYwNSUyRjIwMTgiLCJEc19Ib3VyIjoiMTAlM0E0NCIsIkRzX1NlY3VyZVBheW1lbnQiOiIxIiwiRHNfQW1vdW50IjoiNjcwMCIsIkRzX0N1cnJlbmN5IjoiOTc4IiwiRHNfT3JkZXIiOiIwMDAwRkI5QTE3MiIsIkRzX01lcmNoYW50Q29kZSI6IjMzNjcwNDY1NSIsIkRzX1Rlcm1pbmFsIjoiMDAxIiwiRHNfUmVzcG9uc2UiOiIwMDAwIiwiRHNfVHJhbnNhY3Rpb25UeXBlIjoiMCIsIkRzX01lcmNoYW50RGF0YSI6IiIsIkRzX0F1dGhvcmlzYXRpb25Db2RlIjoiMjE4MDQ4IiwiRHNfQ29uc3VtZXJMYW5ndWFnZSI6IjEiLCJEc19DYXJkX0NvdW50cnkiOiI3MjQiLCJEc19DYXJkX0JyYW5kIjoiMSJ9";

    fn mapping(value: Value) -> ParameterMapping {
        match value {
            Value::Object(map) => map,
            _ => panic!("test mapping must be an object"),
        }
    }

    #[test]
    fn test_encode_preserves_insertion_order() {
        let mut params = ParameterMapping::new();
        params.insert("Z".to_owned(), "1".into());
        params.insert("A".to_owned(), "2".into());

        let payload = encode(&params).unwrap();
        let json = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(json, r#"{"Z":"1","A":"2"}"#);
    }

    #[test]
    fn test_encode_does_not_escape_slashes() {
        let params = mapping(json!({ "DS_MERCHANT_URLOK": "http://www.spec-shop/success" }));
        let json = String::from_utf8(STANDARD.decode(encode(&params).unwrap()).unwrap()).unwrap();
        assert_eq!(json, r#"{"DS_MERCHANT_URLOK":"http://www.spec-shop/success"}"#);
    }

    #[test]
    fn test_decode_percent_decodes_values() {
        let params = decode(RESPONSE_PAYLOAD).unwrap();
        assert_eq!(params["Ds_Date"], "28/05/2018");
        assert_eq!(params["Ds_Hour"], "10:44");
        assert_eq!(params["Ds_Order"], "0000FB9A172");
        assert_eq!(params["Ds_MerchantData"], "");
        assert_eq!(params.keys().next().map(String::as_str), Some("Ds_Date"));
        assert_eq!(params.len(), 15);
    }

    #[test]
    fn test_decode_raw_keeps_percent_sequences() {
        let params = decode_raw(RESPONSE_PAYLOAD).unwrap();
        assert_eq!(params["Ds_Date"], "28%2F05%2F2018");
    }

    #[test]
    fn test_decode_keeps_plus_signs() {
        let payload = encode(&mapping(json!({ "Ds_AuthorisationCode": "++++++" }))).unwrap();
        assert_eq!(decode(&payload).unwrap()["Ds_AuthorisationCode"], "++++++");
    }

    #[test]
    fn test_decode_nested_values() {
        let payload =
            encode(&mapping(json!({ "outer": { "list": ["a%20b", 7, null], "flag": true } })))
                .unwrap();
        let params = decode(&payload).unwrap();
        assert_eq!(params["outer"]["list"][0], "a b");
        assert_eq!(params["outer"]["list"][1], 7);
        assert_eq!(params["outer"]["flag"], true);
    }

    #[test]
    fn test_decode_accepts_url_safe_and_unpadded() {
        // {"k":"??>"} encodes with a '+' in the standard alphabet
        let params = mapping(json!({ "k": "??>" }));
        let standard = encode(&params).unwrap();
        let url_safe = to_url_safe_alphabet(&standard);
        let unpadded = standard.trim_end_matches('=');

        assert_eq!(decode(&url_safe).unwrap(), params);
        assert_eq!(decode(unpadded).unwrap(), params);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = decode("not*base64").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let payload = STANDARD.encode(b"{not json");
        assert!(matches!(decode(&payload), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_non_object_json() {
        let payload = STANDARD.encode(br#"["Ds_Order","1234"]"#);
        let err = decode(&payload).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got an array"));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8_after_percent_decoding() {
        let payload = STANDARD.encode(br#"{"Ds_Date":"%FF%FE"}"#);
        assert!(matches!(decode(&payload), Err(GatewayError::Decode(_))));
        assert!(decode_raw(&payload).is_ok());
    }

    #[test]
    fn test_alphabet_normalization() {
        assert_eq!(to_url_safe_alphabet("a+b/c="), "a-b_c=");
        assert_eq!(to_standard_alphabet("a-b_c="), "a+b/c=");
    }
}
