use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::amount::Amount;
use super::canonical::{CanonicalEncoder, DOMAIN_TX_ID, DOMAIN_TX_SIGN};
use crate::wallet::{pubkey_to_address_hex, verify_signature_hex};

/// A signed value-transfer intent. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    /// Sender-scoped sequence number; must equal the ledger's next-expected value.
    pub nonce: u64,
    /// Surcharge-only units. Does not change ordering.
    #[serde(default)]
    pub extra_priority: u64,
    #[serde(default)]
    pub is_token_transfer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// Hex compressed secp256k1 public key of the sender.
    #[serde(default)]
    pub public_key: String,
    /// Hex compact (r || s) ECDSA signature.
    #[serde(default)]
    pub signature: String,
}

impl Transaction {
    /// Unsigned ordinary transfer.
    pub fn new(from: String, to: String, amount: Amount, nonce: u64) -> Self {
        Self {
            from,
            to,
            amount,
            nonce,
            extra_priority: 0,
            is_token_transfer: false,
            token_id: None,
            public_key: String::new(),
            signature: String::new(),
        }
    }

    fn put_signed_fields(&self, enc: &mut CanonicalEncoder) {
        enc.put_str(&self.from)
            .put_str(&self.to)
            .put_u64(self.amount.base_units())
            .put_u64(self.nonce)
            .put_u64(self.extra_priority)
            .put_bool(self.is_token_transfer)
            .put_opt_str(self.token_id.as_deref());
    }

    /// The exact bytes covered by the signature. Excludes the public key and
    /// the signature itself.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut enc = CanonicalEncoder::new(DOMAIN_TX_SIGN);
        self.put_signed_fields(&mut enc);
        enc.finish()
    }

    /// SHA-256 of the signing payload.
    pub fn sighash(&self) -> [u8; 32] {
        Sha256::digest(self.signing_payload()).into()
    }

    /// Full record as it is committed into a block preimage.
    pub fn encode_record(&self, enc: &mut CanonicalEncoder) {
        self.put_signed_fields(enc);
        enc.put_str(&self.public_key).put_str(&self.signature);
    }

    /// Content identifier, for logs and pool listings.
    pub fn txid(&self) -> String {
        let mut enc = CanonicalEncoder::new(DOMAIN_TX_ID);
        self.encode_record(&mut enc);
        hex::encode(Sha256::digest(enc.finish()))
    }

    /// Structural checks done at ingress, before any ledger rule runs.
    pub fn check_shape(&self) -> Result<(), &'static str> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err("from and to addresses are required");
        }
        match (&self.token_id, self.is_token_transfer) {
            (Some(id), true) if !id.is_empty() => Ok(()),
            (None, false) => Ok(()),
            (_, true) => Err("token transfers require a token_id"),
            (Some(_), false) => Err("token_id is only allowed on token transfers"),
        }
    }

    /// Signature verification contract: the signature must verify over
    /// [`Transaction::sighash`] with `public_key`, and `public_key` must own
    /// `from`. Malformed encodings count as failure.
    pub fn verify(&self) -> bool {
        if self.signature.is_empty() || self.public_key.is_empty() {
            return false;
        }
        match pubkey_to_address_hex(&self.public_key) {
            Ok(owner) if owner == self.from => {}
            _ => return false,
        }
        verify_signature_hex(&self.public_key, &self.signature, self.sighash()).unwrap_or(false)
    }
}
