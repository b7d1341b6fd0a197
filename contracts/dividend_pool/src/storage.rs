use crate::error::Error;
use soroban_sdk::{contracttype, Address, Env};

/// Most disbursements a single claim scans
pub const MAX_CLAIM_ENTRIES: u32 = 50;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disbursement {
    pub amount: i128,
    /// Paid out to holders so far
    pub claimed: i128,
    /// Ledger sequence the shares are read at
    pub snapshot_block: u32,
    /// Unix timestamp of the disbursement
    pub timestamp: u64,
    pub deactivated: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Admin,
    Ledger,
    DeactivationDelay,
    Disburser(Address),
    DisbursementCount(Address),     // reward token
    Disbursement(Address, u32),     // (reward token, index)
    TotalDisbursed(Address),        // reward token
    DeactivatedCount(Address),      // reward token
    ClaimCursor(Address, Address),  // (reward token, holder)
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

    pub fn get_admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_admin(env: &Env, admin: &Address) {
        env.storage().instance().set(&DataKey::Admin, admin);
    }

    pub fn get_ledger(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Ledger)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_ledger(env: &Env, ledger: &Address) {
        env.storage().instance().set(&DataKey::Ledger, ledger);
    }

    pub fn get_deactivation_delay(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::DeactivationDelay)
            .unwrap_or(0)
    }

    pub fn set_deactivation_delay(env: &Env, delay: u64) {
        env.storage()
            .instance()
            .set(&DataKey::DeactivationDelay, &delay);
    }

    // Disbursers
    pub fn is_disburser(env: &Env, disburser: &Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Disburser(disburser.clone()))
            .unwrap_or(false)
    }

    pub fn set_disburser(env: &Env, disburser: &Address, enabled: bool) {
        let key = DataKey::Disburser(disburser.clone());
        if enabled {
            env.storage().instance().set(&key, &true);
        } else {
            env.storage().instance().remove(&key);
        }
    }

    // Disbursement history, per reward token
    pub fn get_count(env: &Env, token: &Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::DisbursementCount(token.clone()))
            .unwrap_or(0)
    }

    pub fn set_count(env: &Env, token: &Address, count: u32) {
        env.storage()
            .persistent()
            .set(&DataKey::DisbursementCount(token.clone()), &count);
    }

    pub fn get_disbursement(env: &Env, token: &Address, index: u32) -> Result<Disbursement, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Disbursement(token.clone(), index))
            .ok_or(Error::DisbursementNotFound)
    }

    pub fn set_disbursement(env: &Env, token: &Address, index: u32, disbursement: &Disbursement) {
        env.storage()
            .persistent()
            .set(&DataKey::Disbursement(token.clone(), index), disbursement);
    }

    pub fn get_total_disbursed(env: &Env, token: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::TotalDisbursed(token.clone()))
            .unwrap_or(0)
    }

    pub fn set_total_disbursed(env: &Env, token: &Address, total: i128) {
        env.storage()
            .persistent()
            .set(&DataKey::TotalDisbursed(token.clone()), &total);
    }

    pub fn get_deactivated_count(env: &Env, token: &Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::DeactivatedCount(token.clone()))
            .unwrap_or(0)
    }

    pub fn set_deactivated_count(env: &Env, token: &Address, count: u32) {
        env.storage()
            .persistent()
            .set(&DataKey::DeactivatedCount(token.clone()), &count);
    }

    // Claim progress
    pub fn get_cursor(env: &Env, token: &Address, holder: &Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::ClaimCursor(token.clone(), holder.clone()))
            .unwrap_or(0)
    }

    pub fn set_cursor(env: &Env, token: &Address, holder: &Address, cursor: u32) {
        env.storage()
            .persistent()
            .set(&DataKey::ClaimCursor(token.clone(), holder.clone()), &cursor);
    }
}
