//! Order-fixed binary encoding shared by the signer, the verifier and the
//! block hasher. Every preimage starts with [`ENCODING_VERSION`] and a
//! domain tag, so a signing payload can never collide with a block preimage.

/// Bumped whenever the field layout of any preimage changes.
pub const ENCODING_VERSION: u8 = 1;

pub const DOMAIN_TX_SIGN: &str = "tx-sign";
pub const DOMAIN_TX_ID: &str = "tx-id";
pub const DOMAIN_BLOCK: &str = "block";

#[derive(Debug)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    pub fn new(domain: &str) -> Self {
        let mut enc = Self {
            buf: Vec::with_capacity(256),
        };
        enc.buf.push(ENCODING_VERSION);
        enc.put_str(domain);
        enc
    }

    /// u32 big-endian byte length followed by the UTF-8 bytes.
    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.buf
            .extend_from_slice(&(value.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(u8::from(value));
        self
    }

    /// Presence byte, then the string when present.
    pub fn put_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => {
                self.buf.push(1);
                self.put_str(v)
            }
            None => {
                self.buf.push(0);
                self
            }
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
