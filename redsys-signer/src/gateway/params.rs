//! Payment request parameters.
//!
//! Maps business fields onto the gateway's `DS_MERCHANT_*` field names. The insertion
//! order below is part of the signature: the gateway recomputes the HMAC over the
//! payload as sent, and the reference integrations emit the fields in this order.

use serde::Deserialize;
use url::Url;

use crate::{
    config::GatewayConfig,
    crypto::ParameterMapping,
    error::{GatewayError, Result},
    gateway::codes::{Currency, TransactionType},
};

/// Amount in the currency's minor unit (`"1000"` is 10.00 EUR).
pub const AMOUNT: &str = "DS_MERCHANT_AMOUNT";
/// Merchant order reference.
pub const ORDER: &str = "DS_MERCHANT_ORDER";
/// Merchant display name.
pub const MERCHANT_NAME: &str = "DS_MERCHANT_MERCHANTNAME";
/// Merchant code (FUC) issued by the acquirer.
pub const MERCHANT_CODE: &str = "DS_MERCHANT_MERCHANTCODE";
/// ISO 4217 numeric currency code.
pub const CURRENCY: &str = "DS_MERCHANT_CURRENCY";
/// Transaction type code.
pub const TRANSACTION_TYPE: &str = "DS_MERCHANT_TRANSACTIONTYPE";
/// Terminal number.
pub const TERMINAL: &str = "DS_MERCHANT_TERMINAL";
/// Server-to-server notification URL.
pub const MERCHANT_URL: &str = "DS_MERCHANT_MERCHANTURL";
/// Browser redirect after a successful payment.
pub const SUCCESS_URL: &str = "DS_MERCHANT_URLOK";
/// Browser redirect after a failed payment.
pub const ERROR_URL: &str = "DS_MERCHANT_URLKO";
/// Product description shown on the payment page.
pub const PRODUCT_DESCRIPTION: &str = "DS_MERCHANT_PRODUCTDESCRIPTION";
/// Cardholder name.
pub const TITULAR: &str = "DS_MERCHANT_TITULAR";
/// Opaque merchant data echoed back in the notification.
pub const MERCHANT_DATA: &str = "DS_MERCHANT_MERCHANTDATA";
/// Payment page language code.
pub const CONSUMER_LANGUAGE: &str = "DS_MERCHANT_CONSUMERLANGUAGE";
/// Allowed payment methods.
pub const PAY_METHODS: &str = "DS_MERCHANT_PAYMETHODS";

const ORDER_MIN_LEN: usize = 4;
const ORDER_MAX_LEN: usize = 12;

/// Business-level description of a payment to initiate.
///
/// Deserializes from camelCase JSON (`orderReference`, `merchantURL`, ...). Merchant
/// code and terminal may be left out and filled from [`GatewayConfig`] with
/// [`with_defaults`](Self::with_defaults).
///
/// # Examples
///
/// ```
/// use redsys_signer::gateway::{Currency, PaymentRequest, TransactionType};
///
/// let request = PaymentRequest::new(
///     "1000",
///     "12345678",
///     "327234688",
///     Currency::Eur,
///     TransactionType::Authorization,
///     "1",
/// );
///
/// let params = request.to_parameters();
/// assert_eq!(params["DS_MERCHANT_CURRENCY"], "978");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in minor units, digits only.
    pub amount: String,
    /// Merchant order reference, 4 to 12 alphanumeric characters.
    pub order_reference: String,
    /// Merchant display name.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Merchant code.
    #[serde(default)]
    pub merchant_code: String,
    /// Settlement currency.
    #[serde(default)]
    pub currency: Currency,
    /// Transaction type.
    #[serde(default)]
    pub transaction_type: TransactionType,
    /// Terminal number.
    #[serde(default)]
    pub terminal: String,
    /// Notification URL.
    #[serde(default, rename = "merchantURL", alias = "merchantUrl")]
    pub merchant_url: Option<String>,
    /// Success redirect URL.
    #[serde(default, rename = "successURL", alias = "successUrl")]
    pub success_url: Option<String>,
    /// Error redirect URL.
    #[serde(default, rename = "errorURL", alias = "errorUrl")]
    pub error_url: Option<String>,
    /// Product description.
    #[serde(default)]
    pub product_description: Option<String>,
    /// Cardholder name.
    #[serde(default)]
    pub titular: Option<String>,
    /// Opaque merchant data.
    #[serde(default)]
    pub merchant_data: Option<String>,
    /// Payment page language code.
    #[serde(default)]
    pub consumer_language: Option<String>,
    /// Allowed payment methods.
    #[serde(default)]
    pub pay_methods: Option<String>,
}

impl PaymentRequest {
    /// Creates a request with the required fields and no optional ones.
    #[must_use]
    pub fn new(
        amount: &str,
        order_reference: &str,
        merchant_code: &str,
        currency: Currency,
        transaction_type: TransactionType,
        terminal: &str,
    ) -> Self {
        Self {
            amount: amount.to_owned(),
            order_reference: order_reference.to_owned(),
            merchant_code: merchant_code.to_owned(),
            currency,
            transaction_type,
            terminal: terminal.to_owned(),
            ..Self::default()
        }
    }

    /// Fills merchant fields the request left empty from `config`.
    ///
    /// Currency and transaction type are not touched: they always carry a value.
    #[must_use]
    pub fn with_defaults(mut self, config: &GatewayConfig) -> Self {
        if self.merchant_code.is_empty() {
            self.merchant_code.clone_from(&config.merchant_code);
        }
        if self.terminal.is_empty() {
            self.terminal.clone_from(&config.terminal);
        }
        fill(&mut self.merchant_name, config.merchant_name.as_ref());
        fill(&mut self.merchant_url, config.merchant_url.as_ref());
        fill(&mut self.success_url, config.success_url.as_ref());
        fill(&mut self.error_url, config.error_url.as_ref());
        self
    }

    /// Checks the request against the gateway's field rules.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if:
    /// - the amount is empty or not all digits
    /// - the order reference is not 4 to 12 ASCII alphanumeric characters
    /// - the merchant code or terminal is empty
    /// - a URL field does not parse as an `http` or `https` URL
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_empty() || !self.amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayError::InvalidArgument(format!(
                "amount must be digits in minor units, got '{}'",
                self.amount
            )));
        }

        let order_len = self.order_reference.len();
        if !(ORDER_MIN_LEN..=ORDER_MAX_LEN).contains(&order_len)
            || !self.order_reference.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(GatewayError::InvalidArgument(format!(
                "order reference must be {ORDER_MIN_LEN}-{ORDER_MAX_LEN} alphanumeric \
                 characters, got '{}'",
                self.order_reference
            )));
        }

        if self.merchant_code.trim().is_empty() {
            return Err(GatewayError::InvalidArgument("merchant code is required".to_owned()));
        }
        if self.terminal.trim().is_empty() {
            return Err(GatewayError::InvalidArgument("terminal is required".to_owned()));
        }

        for (name, value) in [
            ("merchantURL", &self.merchant_url),
            ("successURL", &self.success_url),
            ("errorURL", &self.error_url),
        ] {
            if let Some(url) = value {
                check_url(name, url).map_err(GatewayError::InvalidArgument)?;
            }
        }

        Ok(())
    }

    /// Builds the gateway parameter mapping.
    ///
    /// Optional fields that are `None` are left out entirely.
    #[must_use]
    pub fn to_parameters(&self) -> ParameterMapping {
        let mut params = ParameterMapping::new();
        let mut put = |name: &str, value: &str| {
            params.insert(name.to_owned(), value.into());
        };

        put(AMOUNT, self.amount.as_str());
        put(ORDER, self.order_reference.as_str());
        if let Some(name) = &self.merchant_name {
            put(MERCHANT_NAME, name.as_str());
        }
        put(MERCHANT_CODE, self.merchant_code.as_str());
        put(CURRENCY, self.currency.code());
        put(TRANSACTION_TYPE, self.transaction_type.code());
        put(TERMINAL, self.terminal.as_str());

        for (name, value) in [
            (MERCHANT_URL, &self.merchant_url),
            (SUCCESS_URL, &self.success_url),
            (ERROR_URL, &self.error_url),
            (PRODUCT_DESCRIPTION, &self.product_description),
            (TITULAR, &self.titular),
            (MERCHANT_DATA, &self.merchant_data),
            (CONSUMER_LANGUAGE, &self.consumer_language),
            (PAY_METHODS, &self.pay_methods),
        ] {
            if let Some(value) = value {
                put(name, value.as_str());
            }
        }

        params
    }
}

fn fill(field: &mut Option<String>, default: Option<&String>) {
    if field.is_none() {
        *field = default.cloned();
    }
}

/// Checks that `value` is an absolute `http` or `https` URL.
pub(crate) fn check_url(name: &str, value: &str) -> std::result::Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("invalid {name} '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{name} must use http or https, got: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_shop_request() -> PaymentRequest {
        PaymentRequest {
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
        }
    }

    #[test]
    fn test_to_parameters_field_order() {
        let params = spec_shop_request().to_parameters();
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            [
                AMOUNT,
                ORDER,
                MERCHANT_NAME,
                MERCHANT_CODE,
                CURRENCY,
                TRANSACTION_TYPE,
                TERMINAL,
                MERCHANT_URL,
                SUCCESS_URL,
                ERROR_URL,
            ]
        );
        assert_eq!(params[CURRENCY], "978");
        assert_eq!(params[TRANSACTION_TYPE], "0");
    }

    #[test]
    fn test_to_parameters_skips_missing_optionals() {
        let request = PaymentRequest::new(
            "500",
            "0001abcd",
            "999008881",
            Currency::Usd,
            TransactionType::PreAuthorization,
            "2",
        );
        let params = request.to_parameters();

        assert_eq!(params.len(), 6);
        assert!(!params.contains_key(MERCHANT_NAME));
        assert_eq!(params[TRANSACTION_TYPE], "1");
    }

    #[test]
    fn test_to_parameters_optional_tail() {
        let request = PaymentRequest {
            product_description: Some("Widget".to_owned()),
            consumer_language: Some("002".to_owned()),
            ..spec_shop_request()
        };
        let params = request.to_parameters();
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();

        assert_eq!(keys[keys.len() - 2..], [PRODUCT_DESCRIPTION, CONSUMER_LANGUAGE]);
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        assert!(spec_shop_request().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_amount() {
        for amount in ["", "10.00", "-5", "1e3"] {
            let request = PaymentRequest { amount: amount.to_owned(), ..spec_shop_request() };
            assert!(
                matches!(request.validate(), Err(GatewayError::InvalidArgument(_))),
                "amount '{amount}' should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_order_reference() {
        for order in ["123", "1234567890123", "1234-5678", "1234 567"] {
            let request =
                PaymentRequest { order_reference: order.to_owned(), ..spec_shop_request() };
            assert!(request.validate().is_err(), "order '{order}' should be rejected");
        }
    }

    #[test]
    fn test_validate_requires_merchant_fields() {
        let request = PaymentRequest { merchant_code: String::new(), ..spec_shop_request() };
        assert!(request.validate().unwrap_err().to_string().contains("merchant code"));

        let request = PaymentRequest { terminal: " ".to_owned(), ..spec_shop_request() };
        assert!(request.validate().unwrap_err().to_string().contains("terminal"));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let request =
            PaymentRequest { success_url: Some("not a url".to_owned()), ..spec_shop_request() };
        assert!(request.validate().unwrap_err().to_string().contains("successURL"));

        let request = PaymentRequest {
            merchant_url: Some("ftp://files.example.com/".to_owned()),
            ..spec_shop_request()
        };
        assert!(request.validate().unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "amount": "1000",
            "orderReference": "12345678",
            "merchantName": "SPEC SHOP",
            "merchantCode": "327234688",
            "currency": "EUR",
            "transactionType": "AUTHORIZATION",
            "terminal": "1",
            "merchantURL": "http://www.spec-shop.com/",
            "successUrl": "http://www.spec-shop/success"
        }"#;

        let request: PaymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.order_reference, "12345678");
        assert_eq!(request.merchant_url.as_deref(), Some("http://www.spec-shop.com/"));
        assert_eq!(request.success_url.as_deref(), Some("http://www.spec-shop/success"));
        assert_eq!(request.error_url, None);
    }

    #[test]
    fn test_with_defaults_fills_only_missing_fields() {
        let config = GatewayConfig::from_toml(
            r#"
            merchant_key = "sq7HjrUOBfKmC576ILgskD5srU870gJ7"
            merchant_code = "999008881"
            terminal = "7"
            merchant_name = "CONFIG SHOP"
            error_url = "https://shop.example.com/ko"
            "#,
        )
        .unwrap();

        let request = PaymentRequest {
            amount: "100".to_owned(),
            order_reference: "0001ABCD".to_owned(),
            merchant_name: Some("REQUEST SHOP".to_owned()),
            ..PaymentRequest::default()
        }
        .with_defaults(&config);

        assert_eq!(request.merchant_code, "999008881");
        assert_eq!(request.terminal, "7");
        assert_eq!(request.merchant_name.as_deref(), Some("REQUEST SHOP"));
        assert_eq!(request.error_url.as_deref(), Some("https://shop.example.com/ko"));
        assert!(request.validate().is_ok());
    }
}
