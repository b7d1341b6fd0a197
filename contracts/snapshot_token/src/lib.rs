#![no_std]

mod checkpoints;
mod error;
mod events;
mod storage;

pub use checkpoints::Checkpoint;
pub use error::Error;
use events::*;
use storage::{AllowanceValue, ParentLedger, Storage, TokenMetadata};

use soroban_sdk::{
    contract, contractimpl, log, vec, Address, Env, IntoVal, String, Symbol, Val, Vec,
};

/// Token ledger that keeps a checkpointed history of every balance and of the
/// total supply, so balances can be queried as of any past snapshot.
#[contract]
pub struct SnapshotToken;

#[contractimpl]
impl SnapshotToken {
    // ============================================
    // INITIALIZATION & CONTROLLER
    // ============================================

    /// Initialize the token
    ///
    /// `parent` turns this token into a clone: accounts without history of
    /// their own read the parent's balances as of `parent_snapshot_block`.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidParent`: Fork point is ahead of the current ledger
    pub fn initialize(
        env: Env,
        controller: Address,
        decimal: u32,
        name: String,
        symbol: String,
        parent: Option<Address>,
        parent_snapshot_block: u32,
    ) -> Result<(), Error> {
        if Storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        if let Some(token) = parent {
            if parent_snapshot_block > env.ledger().sequence() {
                return Err(Error::InvalidParent);
            }
            Storage::set_parent(
                &env,
                &ParentLedger {
                    token,
                    snapshot_block: parent_snapshot_block,
                },
            );
        }

        Storage::set_initialized(&env);
        Storage::set_controller(&env, &controller);
        Storage::set_metadata(
            &env,
            &TokenMetadata {
                decimal,
                name,
                symbol,
            },
        );

        Ok(())
    }

    pub fn controller(env: Env) -> Result<Address, Error> {
        Storage::get_controller(&env)
    }

    /// Hand control (mint, burn, operators, hook) to another address
    pub fn change_controller(env: Env, new_controller: Address) -> Result<(), Error> {
        let previous = Storage::get_controller(&env)?;
        previous.require_auth();

        Storage::set_controller(&env, &new_controller);

        env.events().publish(
            (Symbol::new(&env, "controller_changed"),),
            ControllerChangedEvent {
                previous,
                controller: new_controller,
            },
        );

        Ok(())
    }

    /// Allow `operator` to take snapshots
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        Storage::get_controller(&env)?.require_auth();
        Storage::set_operator(&env, &operator, true);
        Ok(())
    }

    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        Storage::get_controller(&env)?.require_auth();
        Storage::set_operator(&env, &operator, false);
        Ok(())
    }

    pub fn is_operator(env: Env, operator: Address) -> bool {
        Storage::is_operator(&env, &operator)
    }

    /// Install (or clear) the contract consulted on transfers and approvals
    pub fn set_hook(env: Env, hook: Option<Address>) -> Result<(), Error> {
        Storage::get_controller(&env)?.require_auth();
        Storage::set_hook(&env, &hook);
        Ok(())
    }

    pub fn hook(env: Env) -> Option<Address> {
        Storage::get_hook(&env)
    }

    // ============================================
    // SUPPLY MANAGEMENT
    // ============================================

    /// Create `amount` new tokens for `to` (controller only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `ArithmeticOverflow`: Supply or balance would overflow
    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        Storage::get_controller(&env)?.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let supply = Self::current_supply(&env)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        let balance = Self::current_balance(&env, &to)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        Self::write_supply(&env, supply);
        Self::write_balance(&env, &to, balance);

        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent { to, amount },
        );

        Ok(())
    }

    /// Destroy `amount` tokens held by `from` (controller only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: `from` holds less than `amount`
    pub fn burn(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        Storage::get_controller(&env)?.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let balance = Self::current_balance(&env, &from);
        if balance < amount {
            return Err(Error::InsufficientBalance);
        }
        let supply = Self::current_supply(&env)
            .checked_sub(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        Self::write_balance(&env, &from, balance - amount);
        Self::write_supply(&env, supply);

        env.events().publish(
            (Symbol::new(&env, "burn"), from.clone()),
            BurnEvent { from, amount },
        );

        Ok(())
    }

    // ============================================
    // TRANSFERS & ALLOWANCES
    // ============================================

    /// Move tokens between accounts
    ///
    /// # Errors
    /// - `InvalidAmount`: Amount < 0
    /// - `TransferRejected`: Hook refused the transfer
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        from.require_auth();
        Self::move_tokens(&env, &from, &to, amount)
    }

    /// Move tokens on behalf of `from` using an allowance granted to `spender`
    ///
    /// # Errors
    /// - `InvalidAmount`: Amount < 0
    /// - `InsufficientAllowance`: Allowance missing, expired or too small
    /// - `TransferRejected`: Hook refused the transfer
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        spender.require_auth();

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let allowance = Storage::get_allowance(&env, &from, &spender);
        if allowance.amount < amount {
            return Err(Error::InsufficientAllowance);
        }

        Self::move_tokens(&env, &from, &to, amount)?;

        if amount > 0 {
            Storage::set_allowance(
                &env,
                &from,
                &spender,
                &AllowanceValue {
                    amount: allowance.amount - amount,
                    expiration_ledger: allowance.expiration_ledger,
                },
            );
        }

        Ok(())
    }

    /// Let `spender` move up to `amount` of `from`'s tokens until `expiration_ledger`
    ///
    /// # Errors
    /// - `InvalidAmount`: Amount < 0
    /// - `InvalidExpiration`: Non-zero allowance that already expired
    /// - `ApprovalRejected`: Hook refused the approval
    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), Error> {
        from.require_auth();

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }
        if amount > 0 && expiration_ledger < env.ledger().sequence() {
            return Err(Error::InvalidExpiration);
        }

        if !Self::hook_allows(&env, "on_approve", &from, &spender, amount) {
            return Err(Error::ApprovalRejected);
        }

        Storage::set_allowance(
            &env,
            &from,
            &spender,
            &AllowanceValue {
                amount,
                expiration_ledger,
            },
        );

        env.events().publish(
            (Symbol::new(&env, "approve"), from.clone(), spender.clone()),
            ApproveEvent {
                from,
                spender,
                amount,
                expiration_ledger,
            },
        );

        Ok(())
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        Storage::get_allowance(&env, &from, &spender).amount
    }

    // ============================================
    // SNAPSHOTS
    // ============================================

    /// Record the current ledger as a snapshot boundary.
    ///
    /// Balances as they stand right now, including writes made earlier in
    /// this ledger, stay queryable through `balance_at(.., boundary)` no
    /// matter what is written afterwards.
    ///
    /// # Errors
    /// - `Unauthorized`: Caller is neither the controller nor an operator
    /// - `SnapshotAlreadyTaken`: Boundaries must be strictly increasing
    pub fn snapshot(env: Env, caller: Address) -> Result<u32, Error> {
        caller.require_auth();

        let controller = Storage::get_controller(&env)?;
        if caller != controller && !Storage::is_operator(&env, &caller) {
            return Err(Error::Unauthorized);
        }

        let block = env.ledger().sequence();
        let mut snapshots = Storage::get_snapshots(&env);
        if let Some(last) = snapshots.last() {
            if last >= block {
                return Err(Error::SnapshotAlreadyTaken);
            }
        }

        snapshots.push_back(block);
        Storage::set_snapshots(&env, &snapshots);

        let index = snapshots.len() - 1;
        log!(&env, "snapshot boundary recorded", block, index);

        env.events().publish(
            (Symbol::new(&env, "snapshot"), block),
            SnapshotEvent { block, index },
        );

        Ok(block)
    }

    pub fn is_snapshot(env: Env, block: u32) -> bool {
        checkpoints::is_boundary(&Storage::get_snapshots(&env), block)
    }

    pub fn last_snapshot(env: Env) -> Option<u32> {
        Storage::last_snapshot(&env)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn balance(env: Env, id: Address) -> i128 {
        Self::current_balance(&env, &id)
    }

    /// Balance of `id` as of ledger `block`
    ///
    /// For a snapshot block this is the balance when the snapshot was taken.
    pub fn balance_at(env: Env, id: Address, block: u32) -> i128 {
        Self::read_balance(&env, &id, block)
    }

    pub fn total_supply(env: Env) -> i128 {
        Self::current_supply(&env)
    }

    /// Total supply as of ledger `block`
    pub fn total_supply_at(env: Env, block: u32) -> i128 {
        Self::read_supply(&env, block)
    }

    /// Raw checkpoint history of `id` in this ledger (parent history excluded)
    pub fn history(env: Env, id: Address) -> Vec<Checkpoint> {
        Storage::get_history(&env, &id)
    }

    pub fn decimals(env: Env) -> Result<u32, Error> {
        Ok(Storage::get_metadata(&env)?.decimal)
    }

    pub fn name(env: Env) -> Result<String, Error> {
        Ok(Storage::get_metadata(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        Ok(Storage::get_metadata(&env)?.symbol)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn move_tokens(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        if !Self::hook_allows(env, "on_transfer", from, to, amount) {
            return Err(Error::TransferRejected);
        }

        let from_balance = Self::current_balance(env, from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        if amount > 0 {
            Self::write_balance(env, from, from_balance - amount);

            let to_balance = Self::current_balance(env, to)
                .checked_add(amount)
                .ok_or(Error::ArithmeticOverflow)?;
            Self::write_balance(env, to, to_balance);
        }

        env.events().publish(
            (Symbol::new(env, "transfer"), from.clone(), to.clone()),
            TransferEvent {
                from: from.clone(),
                to: to.clone(),
                amount,
            },
        );

        Ok(())
    }

    /// Ask the installed hook whether the operation may proceed.
    ///
    /// The hook is not consulted for its own outgoing transfers: it is the
    /// contract currently executing and the host forbids re-entry.
    fn hook_allows(env: &Env, callback: &str, first: &Address, second: &Address, amount: i128) -> bool {
        match Storage::get_hook(env) {
            Some(hook) if &hook != first => env.invoke_contract::<bool>(
                &hook,
                &Symbol::new(env, callback),
                vec![
                    env,
                    first.into_val(env),
                    second.into_val(env),
                    amount.into_val(env)
                ],
            ),
            _ => true,
        }
    }

    // The newest checkpoint may start after the current ledger when it was
    // written after a snapshot taken in this ledger.
    fn current_balance(env: &Env, id: &Address) -> i128 {
        match Storage::get_history(env, id).last() {
            Some(newest) => newest.value,
            None => Self::parent_value(env, "balance_at", Some(id), u32::MAX),
        }
    }

    fn current_supply(env: &Env) -> i128 {
        match Storage::get_supply_history(env).last() {
            Some(newest) => newest.value,
            None => Self::parent_value(env, "total_supply_at", None, u32::MAX),
        }
    }

    fn read_balance(env: &Env, id: &Address, block: u32) -> i128 {
        let history = Storage::get_history(env, id);
        match checkpoints::value_at(&history, block) {
            Some(value) => value,
            None => Self::parent_value(env, "balance_at", Some(id), block),
        }
    }

    fn read_supply(env: &Env, block: u32) -> i128 {
        let history = Storage::get_supply_history(env);
        match checkpoints::value_at(&history, block) {
            Some(value) => value,
            None => Self::parent_value(env, "total_supply_at", None, block),
        }
    }

    /// Value from the parent ledger, capped at the fork point; 0 without a parent
    fn parent_value(env: &Env, query: &str, id: Option<&Address>, block: u32) -> i128 {
        let Some(parent) = Storage::get_parent(env) else {
            return 0;
        };

        let at = if block < parent.snapshot_block {
            block
        } else {
            parent.snapshot_block
        };

        let args: Vec<Val> = match id {
            Some(id) => vec![env, id.into_val(env), at.into_val(env)],
            None => vec![env, at.into_val(env)],
        };

        env.invoke_contract::<i128>(&parent.token, &Symbol::new(env, query), args)
    }

    fn write_balance(env: &Env, id: &Address, value: i128) {
        let mut history = Storage::get_history(env, id);
        checkpoints::record(
            &mut history,
            value,
            env.ledger().sequence(),
            Storage::last_snapshot(env),
        );
        Storage::set_history(env, id, &history);
    }

    fn write_supply(env: &Env, value: i128) {
        let mut history = Storage::get_supply_history(env);
        checkpoints::record(
            &mut history,
            value,
            env.ledger().sequence(),
            Storage::last_snapshot(env),
        );
        Storage::set_supply_history(env, &history);
    }
}
