//! Gateway configuration.
//!
//! A merchant's gateway credentials and redirect URLs, loaded from TOML:
//!
//! ```toml
//! merchant_key = "sq7HjrUOBfKmC576ILgskD5srU870gJ7"
//! merchant_code = "327234688"
//! terminal = "1"
//! merchant_name = "SPEC SHOP"
//! merchant_url = "http://www.spec-shop.com/"
//! success_url = "http://www.spec-shop/success"
//! error_url = "http://www.spec-shop/error"
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;

use crate::{
    crypto::MerchantSecret,
    error::{GatewayError, Result},
    gateway::params::check_url,
};

/// Merchant credentials and defaults for payment requests.
///
/// `Debug` output never includes the merchant key.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base64-encoded 24-byte merchant secret.
    pub merchant_key: String,

    /// Merchant code (FUC) assigned by the acquirer.
    pub merchant_code: String,

    /// Terminal number.
    #[serde(default = "default_terminal")]
    pub terminal: String,

    /// Shop name shown on the payment page.
    #[serde(default)]
    pub merchant_name: Option<String>,

    /// URL receiving the server-to-server notification.
    #[serde(default)]
    pub merchant_url: Option<String>,

    /// Redirect URL after a successful payment.
    #[serde(default)]
    pub success_url: Option<String>,

    /// Redirect URL after a failed payment.
    #[serde(default)]
    pub error_url: Option<String>,
}

fn default_terminal() -> String {
    "1".to_owned()
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_key", &"[REDACTED]")
            .field("merchant_code", &self.merchant_code)
            .field("terminal", &self.terminal)
            .field("merchant_name", &self.merchant_name)
            .field("merchant_url", &self.merchant_url)
            .field("success_url", &self.success_url)
            .field("error_url", &self.error_url)
            .finish()
    }
}

impl GatewayConfig {
    /// Validates the configuration.
    ///
    /// This method checks for:
    /// - Merchant key must decode to a 24-byte secret
    /// - Merchant code and terminal must not be blank
    /// - Configured URLs must be absolute `http` or `https` URLs
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if any check fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use redsys_signer::config::GatewayConfig;
    ///
    /// let toml = r#"
    ///     merchant_key = "sq7HjrUOBfKmC576ILgskD5srU870gJ7"
    ///     merchant_code = "327234688"
    /// "#;
    ///
    /// let config: GatewayConfig = toml::from_str(toml).unwrap();
    /// assert!(config.validate().is_ok());
    /// assert_eq!(config.terminal, "1");
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.secret()?;

        if self.merchant_code.trim().is_empty() {
            return Err(GatewayError::Configuration("merchant_code must not be empty".to_owned()));
        }
        if self.terminal.trim().is_empty() {
            return Err(GatewayError::Configuration("terminal must not be empty".to_owned()));
        }

        for (name, value) in [
            ("merchant_url", &self.merchant_url),
            ("success_url", &self.success_url),
            ("error_url", &self.error_url),
        ] {
            if let Some(url) = value {
                check_url(name, url).map_err(GatewayError::Configuration)?;
            }
        }

        Ok(())
    }

    /// Decodes the configured merchant key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the key is not valid base64 or
    /// does not decode to 24 bytes.
    pub fn secret(&self) -> Result<MerchantSecret> {
        MerchantSecret::from_base64(&self.merchant_key)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails or configuration validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GatewayError::Configuration(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or its contents are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GatewayError::Configuration(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }
}
