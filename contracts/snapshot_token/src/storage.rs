use crate::checkpoints::Checkpoint;
use crate::error::Error;
use soroban_sdk::{contracttype, Address, Env, String, Vec};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    pub decimal: u32,
    pub name: String,
    pub symbol: String,
}

/// Token this ledger was cloned from, and the ledger sequence it forked at
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParentLedger {
    pub token: Address,
    pub snapshot_block: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Controller,
    Metadata,
    Parent,
    Hook,
    Operator(Address),
    Allowance(Address, Address), // (from, spender)
    History(Address),            // account -> Vec<Checkpoint>
    SupplyHistory,
    Snapshots,                   // Vec<u32>, strictly increasing
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

    pub fn get_controller(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Controller)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_controller(env: &Env, controller: &Address) {
        env.storage().instance().set(&DataKey::Controller, controller);
    }

    pub fn get_metadata(env: &Env) -> Result<TokenMetadata, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Metadata)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_metadata(env: &Env, metadata: &TokenMetadata) {
        env.storage().instance().set(&DataKey::Metadata, metadata);
    }

    pub fn get_parent(env: &Env) -> Option<ParentLedger> {
        env.storage().instance().get(&DataKey::Parent)
    }

    pub fn set_parent(env: &Env, parent: &ParentLedger) {
        env.storage().instance().set(&DataKey::Parent, parent);
    }

    pub fn get_hook(env: &Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Hook)
    }

    pub fn set_hook(env: &Env, hook: &Option<Address>) {
        match hook {
            Some(hook) => env.storage().instance().set(&DataKey::Hook, hook),
            None => env.storage().instance().remove(&DataKey::Hook),
        }
    }

    // Operators
    pub fn is_operator(env: &Env, operator: &Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operator(operator.clone()))
            .unwrap_or(false)
    }

    pub fn set_operator(env: &Env, operator: &Address, enabled: bool) {
        let key = DataKey::Operator(operator.clone());
        if enabled {
            env.storage().instance().set(&key, &true);
        } else {
            env.storage().instance().remove(&key);
        }
    }

    // Allowances
    pub fn get_allowance(env: &Env, from: &Address, spender: &Address) -> AllowanceValue {
        let allowance = env
            .storage()
            .persistent()
            .get::<DataKey, AllowanceValue>(&DataKey::Allowance(from.clone(), spender.clone()));

        match allowance {
            Some(a) if a.expiration_ledger >= env.ledger().sequence() => a,
            Some(a) => AllowanceValue {
                amount: 0,
                expiration_ledger: a.expiration_ledger,
            },
            None => AllowanceValue {
                amount: 0,
                expiration_ledger: 0,
            },
        }
    }

    pub fn set_allowance(env: &Env, from: &Address, spender: &Address, value: &AllowanceValue) {
        env.storage()
            .persistent()
            .set(&DataKey::Allowance(from.clone(), spender.clone()), value);
    }

    // Checkpoint histories
    pub fn get_history(env: &Env, account: &Address) -> Vec<Checkpoint> {
        env.storage()
            .persistent()
            .get(&DataKey::History(account.clone()))
            .unwrap_or(Vec::new(env))
    }

    pub fn set_history(env: &Env, account: &Address, history: &Vec<Checkpoint>) {
        env.storage()
            .persistent()
            .set(&DataKey::History(account.clone()), history);
    }

    pub fn get_supply_history(env: &Env) -> Vec<Checkpoint> {
        env.storage()
            .persistent()
            .get(&DataKey::SupplyHistory)
            .unwrap_or(Vec::new(env))
    }

    pub fn set_supply_history(env: &Env, history: &Vec<Checkpoint>) {
        env.storage()
            .persistent()
            .set(&DataKey::SupplyHistory, history);
    }

    // Snapshot boundaries
    pub fn get_snapshots(env: &Env) -> Vec<u32> {
        env.storage()
            .persistent()
            .get(&DataKey::Snapshots)
            .unwrap_or(Vec::new(env))
    }

    pub fn set_snapshots(env: &Env, snapshots: &Vec<u32>) {
        env.storage().persistent().set(&DataKey::Snapshots, snapshots);
    }

    pub fn last_snapshot(env: &Env) -> Option<u32> {
        Self::get_snapshots(env).last()
    }
}
