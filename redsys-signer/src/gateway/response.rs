//! Interpretation of verified gateway notifications.

use serde_json::Value;

use crate::{
    crypto::ParameterMapping,
    error::{GatewayError, Result},
};

/// Field names carrying the gateway response code, in lookup order.
const RESPONSE_FIELDS: [&str; 2] = ["Ds_Response", "DS_RESPONSE"];

/// Highest response code of an authorized payment.
const MAX_AUTHORIZED_CODE: u16 = 99;

/// Response code of an authorized refund or confirmation.
const AUTHORIZED_REFUND_CODE: u16 = 900;

/// Business outcome of a payment notification.
///
/// Only meaningful for a notification whose signature has already been verified.
///
/// # Examples
///
/// ```
/// use redsys_signer::{crypto::ParameterMapping, gateway::PaymentOutcome};
///
/// # fn example() -> redsys_signer::Result<()> {
/// let mut params = ParameterMapping::new();
/// params.insert("Ds_Response".to_owned(), "0000".into());
///
/// let outcome = PaymentOutcome::from_params(&params)?;
/// assert!(outcome.is_authorized());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The payment (or refund/confirmation) was authorized.
    Authorized {
        /// Gateway response code.
        code: u16,
    },
    /// The payment was denied or failed.
    Denied {
        /// Gateway response code.
        code: u16,
    },
}

impl PaymentOutcome {
    /// Classifies a gateway response code.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        if code <= MAX_AUTHORIZED_CODE || code == AUTHORIZED_REFUND_CODE {
            Self::Authorized { code }
        } else {
            Self::Denied { code }
        }
    }

    /// Reads the response code from decoded notification parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] if the response field is missing or not a
    /// number.
    pub fn from_params(params: &ParameterMapping) -> Result<Self> {
        let raw = RESPONSE_FIELDS
            .iter()
            .find_map(|field| params.get(*field))
            .ok_or_else(|| GatewayError::Decode("notification has no Ds_Response".to_owned()))?;

        let code = match raw {
            Value::String(text) => text.trim().parse::<u16>().ok(),
            Value::Number(number) => number.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
        .ok_or_else(|| GatewayError::Decode(format!("invalid Ds_Response value: {raw}")))?;

        Ok(Self::from_code(code))
    }

    /// True for [`PaymentOutcome::Authorized`].
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    /// Gateway response code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Authorized { code } | Self::Denied { code } => *code,
        }
    }
}
