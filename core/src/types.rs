//! Units, addresses and call context

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

/// Account or contract identifier. The empty string is the zero address.
pub type Address = String;

/// Token and payment amounts in base units
pub type Amount = u128;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// BABY token decimals
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token (and one whole payment unit) in base units
pub const TOKEN_UNIT: Amount = 1_000_000_000_000_000_000;

pub const SECONDS_PER_DAY: Timestamp = 86_400;

/// Who is calling, what they attached, and the block time the call executes at.
///
/// Built once per operation; `now` never changes while the operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub value: Amount,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: impl Into<Address>, now: Timestamp) -> Self {
        Self {
            caller: caller.into(),
            value: 0,
            now,
        }
    }

    /// Attach a payment to the call
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// Reject the zero address
pub fn ensure_address(address: &str, what: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(LedgerError::InvalidParameter(format!(
            "{} must not be the zero address",
            what
        )));
    }
    Ok(())
}

/// Deterministic address for a contract created by `deployer` at `nonce`
pub fn contract_address(deployer: &str, nonce: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(deployer.as_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[..20]))
}
