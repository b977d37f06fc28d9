//! NNBU Team Reserve Module
//!
//! Holds the team allocation minted at sale finalization:
//! - Locked for 365 days, then releasable once to the beneficiary
//! - Reclaimable by the deployer after 465 days (key-loss long stop)
//!
//! Either release path empties the reserve; kill also disables it.

pub mod error;
pub mod reserve;

pub use reserve::{ReserveEvent, ReserveState, TeamReserve};

pub use nnbu_economics::constants::{RESERVE_KILL_DELAY, RESERVE_UNLOCK_DELAY};

pub use error::{ReserveError, Result};
