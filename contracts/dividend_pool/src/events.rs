use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct DividendDisbursedEvent {
    pub reward_token: Address,
    pub disburser: Address,
    pub index: u32,
    pub amount: i128,
    /// Ledger whose closing balances the shares are computed from
    pub snapshot_block: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DividendClaimedEvent {
    pub reward_token: Address,
    pub holder: Address,
    pub amount: i128,
    /// Disbursements scanned, `from_index..to_index`
    pub from_index: u32,
    pub to_index: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DividendDeactivatedEvent {
    pub reward_token: Address,
    pub index: u32,
    /// Unclaimed remainder returned to the disburser
    pub reclaimed: i128,
}
