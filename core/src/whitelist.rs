//! Purchase whitelist registry

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LedgerError, Result};
use crate::types::{ensure_address, Address, CallContext, Timestamp};

/// Read side consumed by the sale
pub trait WhitelistRegistry {
    fn is_whitelisted(&self, address: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WhitelistOperation {
    Added,
    Removed,
}

/// One record per affected member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhitelistEvent {
    pub timestamp: Timestamp,
    pub operation: WhitelistOperation,
    pub member: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whitelist {
    address: Address,
    owner: Address,
    members: HashSet<Address>,
    events: Vec<WhitelistEvent>,
}

impl Whitelist {
    pub fn new(address: impl Into<Address>, owner: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            owner: owner.into(),
            members: HashSet::new(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn events(&self) -> &[WhitelistEvent] {
        &self.events
    }

    pub fn add_to_whitelist(&mut self, ctx: &CallContext, addresses: &[Address]) -> Result<()> {
        self.update(ctx, addresses, WhitelistOperation::Added)
    }

    pub fn remove_from_whitelist(&mut self, ctx: &CallContext, addresses: &[Address]) -> Result<()> {
        self.update(ctx, addresses, WhitelistOperation::Removed)
    }

    fn update(
        &mut self,
        ctx: &CallContext,
        addresses: &[Address],
        operation: WhitelistOperation,
    ) -> Result<()> {
        if ctx.caller != self.owner {
            return Err(LedgerError::Unauthorized(format!(
                "{} does not own the whitelist",
                ctx.caller
            )));
        }
        for address in addresses {
            ensure_address(address, "whitelist member")?;
        }

        for address in addresses {
            match operation {
                WhitelistOperation::Added => self.members.insert(address.clone()),
                WhitelistOperation::Removed => self.members.remove(address),
            };
            self.events.push(WhitelistEvent {
                timestamp: ctx.now,
                operation,
                member: address.clone(),
            });
        }

        info!(
            "Whitelist {:?}: {} address(es), {} member(s) total",
            operation,
            addresses.len(),
            self.members.len()
        );
        Ok(())
    }
}

impl WhitelistRegistry for Whitelist {
    fn is_whitelisted(&self, address: &str) -> bool {
        self.members.contains(address)
    }
}
