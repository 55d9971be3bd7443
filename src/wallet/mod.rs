use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};
use sha2::{Digest, Sha256};

use crate::transaction::{Amount, Transaction};

/// A secp256k1 key pair with its derived address.
/// Only used by development helpers and tests; the ledger itself never holds keys.
#[derive(Debug, Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: String,
}

impl Wallet {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self::from_keys(secret_key, public_key)
    }

    /// Restore a wallet from a hex-encoded 32-byte secret key.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, &'static str> {
        let bytes = hex::decode(secret_hex.trim()).map_err(|_| "invalid secret key hex")?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| "invalid secret key bytes")?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret_key);
        Ok(Self::from_keys(secret_key, public_key))
    }

    fn from_keys(secret_key: SecretKey, public_key: PublicKey) -> Self {
        let address = address_from_pubkey(&public_key);
        Self {
            secret_key,
            public_key,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Hex of the compressed (33 byte) public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Build and sign an ordinary transfer. `nonce` is used as given.
    pub fn create_transaction(&self, to: &str, amount: Amount, nonce: u64) -> Transaction {
        let mut tx = Transaction::new(self.address.clone(), to.to_string(), amount, nonce);
        self.sign(&mut tx);
        tx
    }

    /// Build and sign a token transfer. `nonce` is used as given.
    pub fn create_token_transfer(
        &self,
        to: &str,
        amount: Amount,
        token_id: &str,
        nonce: u64,
    ) -> Transaction {
        let mut tx = Transaction::new(self.address.clone(), to.to_string(), amount, nonce);
        tx.is_token_transfer = true;
        tx.token_id = Some(token_id.to_string());
        self.sign(&mut tx);
        tx
    }

    /// Fill in `public_key` and `signature` over the transaction's signing payload.
    pub fn sign(&self, tx: &mut Transaction) {
        let secp = Secp256k1::signing_only();
        let msg = Message::from_digest(tx.sighash());
        let sig = secp.sign_ecdsa(&msg, &self.secret_key);
        tx.public_key = self.public_key_hex();
        tx.signature = hex::encode(sig.serialize_compact());
    }
}

/// Address = hex(SHA-256(compressed public key bytes)).
fn address_from_pubkey(pk: &PublicKey) -> String {
    hex::encode(Sha256::digest(pk.serialize()))
}

/// Derive the address owned by a hex public key (compressed or uncompressed).
pub fn pubkey_to_address_hex(pubkey_hex: &str) -> Result<String, &'static str> {
    let bytes = hex::decode(pubkey_hex).map_err(|_| "invalid pubkey hex")?;
    let pk = PublicKey::from_slice(&bytes).map_err(|_| "invalid pubkey bytes")?;
    Ok(address_from_pubkey(&pk))
}

/// Verify a hex compact (r || s, 64 bytes) signature against a hex public key
/// and a 32-byte message hash.
pub fn verify_signature_hex(
    pubkey_hex: &str,
    sig_hex: &str,
    msg32: [u8; 32],
) -> Result<bool, &'static str> {
    let secp = Secp256k1::verification_only();

    let sig_bytes = hex::decode(sig_hex).map_err(|_| "invalid signature hex")?;
    let sig = Signature::from_compact(&sig_bytes).map_err(|_| "invalid compact signature")?;

    let pk_bytes = hex::decode(pubkey_hex).map_err(|_| "invalid pubkey hex")?;
    let pk = PublicKey::from_slice(&pk_bytes).map_err(|_| "invalid pubkey bytes")?;

    let msg = Message::from_digest(msg32);
    Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_hash_of_public_key() {
        let w = Wallet::generate();
        assert_eq!(w.address().len(), 64);
        assert_eq!(pubkey_to_address_hex(&w.public_key_hex()).unwrap(), w.address());
    }

    #[test]
    fn restores_from_secret_hex() {
        let w = Wallet::generate();
        let restored = Wallet::from_secret_hex(&w.secret_hex()).unwrap();
        assert_eq!(restored.address(), w.address());
        assert!(Wallet::from_secret_hex("zz").is_err());
        assert!(Wallet::from_secret_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn created_transaction_keeps_given_nonce() {
        let w = Wallet::generate();
        let tx = w.create_transaction("someone", Amount::from_coins(10), 0);
        assert_eq!(tx.from, w.address());
        assert_eq!(tx.nonce, 0);
        assert!(!tx.signature.is_empty());
    }

    #[test]
    fn signature_checks_out_and_rejects_garbage() {
        let w = Wallet::generate();
        let tx = w.create_transaction("someone", Amount::from_coins(1), 3);
        assert_eq!(
            verify_signature_hex(&tx.public_key, &tx.signature, tx.sighash()),
            Ok(true)
        );
        assert!(verify_signature_hex(&tx.public_key, "abcd", tx.sighash()).is_err());
        assert!(verify_signature_hex("nothex", &tx.signature, tx.sighash()).is_err());
    }
}
