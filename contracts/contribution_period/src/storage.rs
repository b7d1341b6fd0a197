use crate::error::Error;
use soroban_sdk::{contracttype, Address, Env};

/// Parameters fixed for the whole period. Ratios are WAD-scaled.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodConfig {
    /// Sale tokens minted at initialization (S)
    pub initial_supply: u128,
    /// Base currency needed for round 0 to sell out at 100% (scaled by its percentage)
    pub init_min_target: u128,
    /// Base currency round 0 accepts at 100% (scaled by its percentage)
    pub init_max_target: u128,
    /// Multiplier on the previous price for the next threshold, >= 1.0
    pub threshold_coefficient: u128,
    /// Multiplier on the previous price for the next cap, >= threshold_coefficient
    pub cap_coefficient: u128,
    pub round_count: u32,
    pub min_contribution: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodState {
    /// Lowest round not yet finalized
    pub current_round: u32,
    pub cumulative_distribution: u128,
    pub cumulative_contribution: u128,
    /// Sum of the target percentages of every scheduled round
    pub cumulative_percentage: u128,
    pub ended: bool,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Round {
    pub index: u32,
    /// Unix timestamp the window opens
    pub start: u64,
    /// Unix timestamp the window closes (inclusive), 0 while unscheduled
    pub end: u64,
    pub target_percentage: u128,
    /// Sale tokens on offer, 0 until derived
    pub available: u128,
    pub threshold: u128,
    pub cap: u128,
    /// Final price in base currency per sale token, 0 until finalized
    pub price: u128,
    pub distribution: u128,
    pub total_contributed: u128,
}

impl Round {
    pub fn is_scheduled(&self) -> bool {
        self.end != 0
    }

    pub fn is_derived(&self) -> bool {
        self.available != 0
    }

    pub fn is_finalized(&self) -> bool {
        self.price != 0
    }

    pub fn has_started(&self, now: u64) -> bool {
        self.is_scheduled() && now >= self.start
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundStatus {
    /// No schedule set
    Uninitialized = 0,
    /// Scheduled, window not opened yet
    Initialized = 1,
    /// Window opened, not finalized
    Active = 2,
    Finalized = 3,
}

/// Per-round view of one account's position
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountRoundInfo {
    pub round: u32,
    pub contributed: u128,
    pub claimed: u128,
    /// What `claim` would pay out right now
    pub claimable: u128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Admin,
    BaseToken,
    SaleToken,
    Wallet,
    PostSaleController,
    Config,
    State,
    Round(u32),
    Contribution(u32, Address), // (round, account)
    Claimed(u32, Address),      // (round, account)
}

pub struct Storage;

impl Storage {
    // Configuration
    pub fn is_initialized(env: &Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    pub fn set_initialized(env: &Env) {
        env.storage().instance().set(&DataKey::Initialized, &true);
    }

    pub fn get_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
        env.storage().instance().get(key).ok_or(Error::NotInitialized)
    }

    pub fn set_address(env: &Env, key: &DataKey, address: &Address) {
        env.storage().instance().set(key, address);
    }

    pub fn get_config(env: &Env) -> Result<PeriodConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_config(env: &Env, config: &PeriodConfig) {
        env.storage().instance().set(&DataKey::Config, config);
    }

    pub fn get_state(env: &Env) -> Result<PeriodState, Error> {
        env.storage()
            .instance()
            .get(&DataKey::State)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_state(env: &Env, state: &PeriodState) {
        env.storage().instance().set(&DataKey::State, state);
    }

    // Rounds
    pub fn get_round(env: &Env, index: u32) -> Round {
        env.storage()
            .persistent()
            .get(&DataKey::Round(index))
            .unwrap_or(Round {
                index,
                ..Round::default()
            })
    }

    pub fn set_round(env: &Env, round: &Round) {
        env.storage()
            .persistent()
            .set(&DataKey::Round(round.index), round);
    }

    // Per-account bookkeeping
    pub fn get_contribution(env: &Env, round: u32, account: &Address) -> u128 {
        env.storage()
            .persistent()
            .get(&DataKey::Contribution(round, account.clone()))
            .unwrap_or(0)
    }

    pub fn set_contribution(env: &Env, round: u32, account: &Address, amount: u128) {
        env.storage()
            .persistent()
            .set(&DataKey::Contribution(round, account.clone()), &amount);
    }

    /// Reward already paid, `None` if the account never claimed this round
    pub fn get_claimed(env: &Env, round: u32, account: &Address) -> Option<u128> {
        env.storage()
            .persistent()
            .get(&DataKey::Claimed(round, account.clone()))
    }

    pub fn set_claimed(env: &Env, round: u32, account: &Address, reward: u128) {
        env.storage()
            .persistent()
            .set(&DataKey::Claimed(round, account.clone()), &reward);
    }
}
