//! Per-order key derivation with triple-DES.
//!
//! The gateway never signs with the merchant secret directly. Each order gets its own
//! HMAC key: the order identifier, zero-padded to the 8-byte DES block size, encrypted
//! with 3DES-EDE3 in CBC mode under an all-zero IV.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use tracing::instrument;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{GatewayError, Result};

type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;

/// Triple-DES key length in bytes.
pub const MERCHANT_KEY_LEN: usize = 24;

/// DES block size in bytes.
pub const BLOCK_SIZE: usize = 8;

const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Merchant secret shared with the gateway operator.
///
/// Decoded once from its base64 form and held as immutable key material. The bytes
/// are wiped on drop and never appear in `Debug` output.
///
/// # Examples
///
/// ```
/// use redsys_signer::crypto::MerchantSecret;
///
/// # fn example() -> redsys_signer::Result<()> {
/// let secret = MerchantSecret::from_base64("sq7HjrUOBfKmC576ILgskD5srU870gJ7")?;
/// let key = secret.derive_key("1234567890")?;
/// assert_eq!(key.to_base64(), "ntVrJPxp2xlsetWVajPl0g==");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MerchantSecret {
    key: [u8; MERCHANT_KEY_LEN],
}

impl MerchantSecret {
    /// Decodes a base64 merchant secret.
    ///
    /// Surrounding whitespace is ignored so keys pasted into config files still load.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the secret is empty, is not valid
    /// base64, or does not decode to exactly 24 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(GatewayError::Configuration("merchant key is empty".to_owned()));
        }

        let mut bytes = STANDARD.decode(encoded).map_err(|e| {
            GatewayError::Configuration(format!("merchant key is not valid base64: {e}"))
        })?;
        let secret = Self::from_bytes(&bytes);
        bytes.zeroize();
        secret
    }

    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] unless `bytes` is exactly 24 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; MERCHANT_KEY_LEN] = bytes.try_into().map_err(|_| {
            GatewayError::Configuration(format!(
                "merchant key must decode to {MERCHANT_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Derives the HMAC key for one order.
    ///
    /// The empty order identifier derives the empty key without touching the cipher.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Crypto`] if the cipher rejects the key, which cannot
    /// happen for a constructed `MerchantSecret`.
    #[instrument(skip(self), fields(order_len = order_id.len()))]
    pub fn derive_key(&self, order_id: &str) -> Result<DerivedKey> {
        if order_id.is_empty() {
            return Ok(DerivedKey(Vec::new()));
        }

        let mut block = zero_pad(order_id.as_bytes());
        let encryptor = TdesCbcEnc::new_from_slices(&self.key, &ZERO_IV)
            .map_err(|e| GatewayError::Crypto(format!("3DES key setup failed: {e}")))?;
        let ciphertext = encryptor.encrypt_padded_vec_mut::<NoPadding>(&block);
        block.zeroize();

        Ok(DerivedKey(ciphertext))
    }
}

impl fmt::Debug for MerchantSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MerchantSecret([REDACTED])")
    }
}

/// Right-pads with zero bytes up to the next multiple of [`BLOCK_SIZE`].
fn zero_pad(plaintext: &[u8]) -> Vec<u8> {
    let padded_len = plaintext.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let mut block = Vec::with_capacity(padded_len);
    block.extend_from_slice(plaintext);
    block.resize(padded_len, 0);
    block
}

/// Per-order HMAC key.
///
/// Raw 3DES ciphertext of the padded order identifier. Computed fresh for every
/// signing or verification call.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    /// Raw key bytes, as fed to HMAC.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Standard base64 of the key (the "encrypted order id").
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True only for the key derived from the empty order identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").field("len", &self.0.len()).finish_non_exhaustive()
    }
}
