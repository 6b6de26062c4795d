use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

/// Failure taxonomy for wallet signature verification. The three variants are
/// deliberately distinct so callers can tell user error (bad address), a
/// malformed signature, and an active forgery (wrong signer) apart for auditing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid wallet address format")]
    InvalidWalletFormat,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("signature does not match wallet address")]
    SignatureMismatch,
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// A 20-byte Ethereum address. `Display` renders the canonical lowercase
/// `0x…` form used for storage keys and comparisons; [`WalletAddress::checksum`]
/// renders the EIP-55 mixed-case form for external display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletAddress([u8; 20]);

impl WalletAddress {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());
        let mut output = String::with_capacity(42);
        output.push_str("0x");
        for (index, ch) in lower.chars().enumerate() {
            let shift = if index % 2 == 0 { 4 } else { 0 };
            let nibble = (digest[index / 2] >> shift) & 0x0f;
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                output.push(ch.to_ascii_uppercase());
            } else {
                output.push(ch);
            }
        }
        output
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for WalletAddress {
    type Err = SignatureError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex_part = input
            .strip_prefix("0x")
            .ok_or(SignatureError::InvalidWalletFormat)?;
        if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SignatureError::InvalidWalletFormat);
        }
        let raw = hex::decode(hex_part).map_err(|_| SignatureError::InvalidWalletFormat)?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

/// EIP-712 domain parameters, configured per deployment. The digest computed
/// by [`Eip712Domain::login_digest`] must match bit-for-bit what a wallet's
/// `eth_signTypedData_v4` computes for the same payload, otherwise the
/// recovered key is garbage.
#[derive(Debug, Clone)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
}

const EIP712_DOMAIN_TYPE: &[u8] = b"EIP712Domain(string name,string version,uint256 chainId)";
const LOGIN_TYPE: &[u8] = b"Login(string message)";

impl Eip712Domain {
    fn separator(&self) -> [u8; 32] {
        let mut chain_id = [0u8; 32];
        chain_id[24..].copy_from_slice(&self.chain_id.to_be_bytes());

        let mut buffer = Vec::with_capacity(128);
        buffer.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE));
        buffer.extend_from_slice(&keccak256(self.name.as_bytes()));
        buffer.extend_from_slice(&keccak256(self.version.as_bytes()));
        buffer.extend_from_slice(&chain_id);
        keccak256(&buffer)
    }

    /// Typed-data digest over `Login { message: string }`:
    /// `keccak256(0x19 0x01 || domainSeparator || structHash)`.
    pub fn login_digest(&self, message: &str) -> [u8; 32] {
        let mut struct_buffer = Vec::with_capacity(64);
        struct_buffer.extend_from_slice(&keccak256(LOGIN_TYPE));
        struct_buffer.extend_from_slice(&keccak256(message.as_bytes()));
        let struct_hash = keccak256(&struct_buffer);

        let mut buffer = Vec::with_capacity(66);
        buffer.extend_from_slice(b"\x19\x01");
        buffer.extend_from_slice(&self.separator());
        buffer.extend_from_slice(&struct_hash);
        keccak256(&buffer)
    }
}

/// Derive the Ethereum address from a recovered public key: keccak256 of the
/// uncompressed point minus its 0x04 tag, rightmost 20 bytes.
pub fn address_from_verifying_key(key: &VerifyingKey) -> WalletAddress {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    WalletAddress(bytes)
}

/// Verifies 65-byte ECDSA signatures over the EIP-712 login digest by
/// recovering the signing address and comparing it to the claimed one.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    domain: Eip712Domain,
}

impl SignatureVerifier {
    pub fn new(domain: Eip712Domain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn verify(
        &self,
        wallet_address: &str,
        signature_hex: &str,
        message: &str,
    ) -> Result<(), SignatureError> {
        let wallet: WalletAddress = wallet_address.parse()?;

        let raw = hex::decode(signature_hex.strip_prefix("0x").unwrap_or(signature_hex))
            .map_err(|_| SignatureError::InvalidSignature)?;
        if raw.len() != 65 {
            return Err(SignatureError::InvalidSignature);
        }

        let (rs, v_byte) = raw.split_at(64);
        // Wallets emit v = 27/28 (legacy) or 0/1 (raw); normalize to 0/1.
        let v = if v_byte[0] >= 27 {
            v_byte[0] - 27
        } else {
            v_byte[0]
        };
        let recovery_id =
            RecoveryId::from_byte(v).ok_or(SignatureError::InvalidSignature)?;
        let signature =
            Signature::from_slice(rs).map_err(|_| SignatureError::InvalidSignature)?;

        let digest = self.domain.login_digest(message);
        let recovered_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
            .map_err(|_| SignatureError::InvalidSignature)?;

        if address_from_verifying_key(&recovered_key) != wallet {
            return Err(SignatureError::SignatureMismatch);
        }

        Ok(())
    }
}
