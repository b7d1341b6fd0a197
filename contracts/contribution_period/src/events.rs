use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoundInitializedEvent {
    pub round: u32,
    pub start: u64,
    pub end: u64,
    pub target_percentage: u128,
    /// Zero until the previous round is finalized
    pub available: u128,
    pub threshold: u128,
    pub cap: u128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ContributionEvent {
    pub round: u32,
    pub contributor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoundFinalizedEvent {
    pub round: u32,
    pub price: u128,
    pub distribution: u128,
    pub total_contributed: u128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimedEvent {
    pub round: u32,
    pub account: Address,
    pub reward: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PeriodEndedEvent {
    /// Supply never distributed, handed to the post-sale controller
    pub unsold: i128,
    pub controller: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FundsCollectedEvent {
    pub wallet: Address,
    pub amount: i128,
}
