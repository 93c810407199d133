//! Currency and transaction-type code tables.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::GatewayError;

/// Settlement currency, sent as its ISO 4217 numeric code.
///
/// Parses from the alphabetic ISO code (`"EUR"`, case-insensitive) or from the
/// numeric code (`"978"`).
///
/// # Examples
///
/// ```
/// use redsys_signer::gateway::Currency;
///
/// let currency: Currency = "eur".parse().unwrap();
/// assert_eq!(currency, Currency::Eur);
/// assert_eq!(currency.code(), "978");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Currency {
    /// Euro.
    #[default]
    Eur,
    /// US dollar.
    Usd,
    /// Pound sterling.
    Gbp,
    /// Japanese yen.
    Jpy,
    /// Swiss franc.
    Chf,
    /// Canadian dollar.
    Cad,
    /// Australian dollar.
    Aud,
    /// Chinese yuan.
    Cny,
    /// Argentine peso.
    Ars,
    /// Chilean peso.
    Clp,
    /// Colombian peso.
    Cop,
    /// Indian rupee.
    Inr,
    /// Mexican peso.
    Mxn,
    /// Peruvian sol.
    Pen,
    /// Russian ruble.
    Rub,
    /// Venezuelan bolívar.
    Vef,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Self; 16] = [
        Self::Eur,
        Self::Usd,
        Self::Gbp,
        Self::Jpy,
        Self::Chf,
        Self::Cad,
        Self::Aud,
        Self::Cny,
        Self::Ars,
        Self::Clp,
        Self::Cop,
        Self::Inr,
        Self::Mxn,
        Self::Pen,
        Self::Rub,
        Self::Vef,
    ];

    /// ISO 4217 numeric code, as sent in `DS_MERCHANT_CURRENCY`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eur => "978",
            Self::Usd => "840",
            Self::Gbp => "826",
            Self::Jpy => "392",
            Self::Chf => "756",
            Self::Cad => "124",
            Self::Aud => "036",
            Self::Cny => "156",
            Self::Ars => "032",
            Self::Clp => "152",
            Self::Cop => "170",
            Self::Inr => "356",
            Self::Mxn => "484",
            Self::Pen => "604",
            Self::Rub => "643",
            Self::Vef => "937",
        }
    }

    /// ISO 4217 alphabetic code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Chf => "CHF",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Cny => "CNY",
            Self::Ars => "ARS",
            Self::Clp => "CLP",
            Self::Cop => "COP",
            Self::Inr => "INR",
            Self::Mxn => "MXN",
            Self::Pen => "PEN",
            Self::Rub => "RUB",
            Self::Vef => "VEF",
        }
    }
}

impl FromStr for Currency {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.code() == s)
            .ok_or_else(|| GatewayError::InvalidArgument(format!("unknown currency: {s}")))
    }
}

impl TryFrom<String> for Currency {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gateway transaction type, sent in `DS_MERCHANT_TRANSACTIONTYPE`.
///
/// Parses from the semantic name (`"AUTHORIZATION"`, case-insensitive, `-` or `_`
/// separated) or from the gateway code (`"0"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TransactionType {
    /// Standard payment.
    #[default]
    Authorization,
    /// Hold funds for later confirmation.
    PreAuthorization,
    /// Confirm a pre-authorization.
    Confirmation,
    /// Refund.
    AutoRefund,
    /// Recurring payment, first charge.
    RecurringTransaction,
    /// Recurring payment, subsequent charge.
    SuccessiveTransaction,
    /// Authenticate the cardholder without charging.
    PreAuthentication,
    /// Confirm a pre-authentication.
    PreAuthenticationConfirmation,
    /// Cancel a pre-authorization.
    PreAuthorizationCancel,
    /// Deferred authorization.
    DeferredAuthorization,
    /// Confirm a deferred authorization.
    DeferredAuthorizationConfirmation,
    /// Cancel a deferred authorization.
    DeferredAuthorizationCancel,
    /// Deferred instalment plan, first fee.
    DeferredInitialFee,
    /// Deferred instalment plan, subsequent fee.
    DeferredSuccessiveFee,
}

impl TransactionType {
    /// Every supported transaction type.
    pub const ALL: [Self; 14] = [
        Self::Authorization,
        Self::PreAuthorization,
        Self::Confirmation,
        Self::AutoRefund,
        Self::RecurringTransaction,
        Self::SuccessiveTransaction,
        Self::PreAuthentication,
        Self::PreAuthenticationConfirmation,
        Self::PreAuthorizationCancel,
        Self::DeferredAuthorization,
        Self::DeferredAuthorizationConfirmation,
        Self::DeferredAuthorizationCancel,
        Self::DeferredInitialFee,
        Self::DeferredSuccessiveFee,
    ];

    /// Gateway code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Authorization => "0",
            Self::PreAuthorization => "1",
            Self::Confirmation => "2",
            Self::AutoRefund => "3",
            Self::RecurringTransaction => "5",
            Self::SuccessiveTransaction => "6",
            Self::PreAuthentication => "7",
            Self::PreAuthenticationConfirmation => "8",
            Self::PreAuthorizationCancel => "9",
            Self::DeferredAuthorization => "O",
            Self::DeferredAuthorizationConfirmation => "P",
            Self::DeferredAuthorizationCancel => "Q",
            Self::DeferredInitialFee => "R",
            Self::DeferredSuccessiveFee => "S",
        }
    }

    /// Semantic name in `SCREAMING_SNAKE_CASE`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authorization => "AUTHORIZATION",
            Self::PreAuthorization => "PRE_AUTHORIZATION",
            Self::Confirmation => "CONFIRMATION",
            Self::AutoRefund => "AUTO_REFUND",
            Self::RecurringTransaction => "RECURRING_TRANSACTION",
            Self::SuccessiveTransaction => "SUCCESSIVE_TRANSACTION",
            Self::PreAuthentication => "PRE_AUTHENTICATION",
            Self::PreAuthenticationConfirmation => "PRE_AUTHENTICATION_CONFIRMATION",
            Self::PreAuthorizationCancel => "PRE_AUTHORIZATION_CANCEL",
            Self::DeferredAuthorization => "DEFERRED_AUTHORIZATION",
            Self::DeferredAuthorizationConfirmation => "DEFERRED_AUTHORIZATION_CONFIRMATION",
            Self::DeferredAuthorizationCancel => "DEFERRED_AUTHORIZATION_CANCEL",
            Self::DeferredInitialFee => "DEFERRED_INITIAL_FEE",
            Self::DeferredSuccessiveFee => "DEFERRED_SUCCESSIVE_FEE",
        }
    }
}

impl FromStr for TransactionType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(&normalized) || t.code() == normalized)
            .ok_or_else(|| {
                GatewayError::InvalidArgument(format!("unknown transaction type: {}", s.trim()))
            })
    }
}

impl TryFrom<String> for TransactionType {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
