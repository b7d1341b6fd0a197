#![no_std]

mod error;
mod events;
mod ledger;
mod storage;

pub use error::Error;
use events::*;
pub use storage::{Disbursement, MAX_CLAIM_ENTRIES};
use storage::Storage;

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol};

/// Pro-rata distribution of reward tokens to the holders of a snapshot token.
///
/// Every disbursement is pinned to a snapshot of the holder ledger; a
/// holder's share is its balance at that snapshot over the total supply.
#[contract]
pub struct DividendPool;

#[contractimpl]
impl DividendPool {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the pool
    ///
    /// The pool must be registered as an operator on `ledger` before the
    /// first disbursement, so it can take snapshots.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        ledger: Address,
        deactivation_delay: u64,
    ) -> Result<(), Error> {
        if Storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        Storage::set_initialized(&env);
        Storage::set_admin(&env, &admin);
        Storage::set_ledger(&env, &ledger);
        Storage::set_deactivation_delay(&env, deactivation_delay);

        Ok(())
    }

    pub fn add_disburser(env: Env, disburser: Address) -> Result<(), Error> {
        Storage::get_admin(&env)?.require_auth();
        Storage::set_disburser(&env, &disburser, true);
        Ok(())
    }

    pub fn remove_disburser(env: Env, disburser: Address) -> Result<(), Error> {
        Storage::get_admin(&env)?.require_auth();
        Storage::set_disburser(&env, &disburser, false);
        Ok(())
    }

    pub fn is_disburser(env: Env, disburser: Address) -> bool {
        Storage::is_disburser(&env, &disburser)
    }

    // ============================================
    // DISBURSEMENTS
    // ============================================

    /// Deposit `amount` of `reward_token` for the current holders.
    ///
    /// Takes a snapshot on the ledger (or reuses one taken in this ledger)
    /// and returns the index of the new disbursement.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: `from` is not a disburser
    /// - `InvalidAmount`: Amount <= 0
    pub fn disburse(
        env: Env,
        from: Address,
        reward_token: Address,
        amount: i128,
    ) -> Result<u32, Error> {
        let ledger = Storage::get_ledger(&env)?;

        if !Storage::is_disburser(&env, &from) {
            return Err(Error::Unauthorized);
        }
        from.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        token::Client::new(&env, &reward_token).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );

        let snapshot_block = ledger::ensure_snapshot(&env, &ledger);

        let index = Storage::get_count(&env, &reward_token);
        let total = Storage::get_total_disbursed(&env, &reward_token)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        Storage::set_disbursement(
            &env,
            &reward_token,
            index,
            &Disbursement {
                amount,
                claimed: 0,
                snapshot_block,
                timestamp: env.ledger().timestamp(),
                deactivated: false,
            },
        );
        Storage::set_count(&env, &reward_token, index + 1);
        Storage::set_total_disbursed(&env, &reward_token, total);

        env.events().publish(
            (Symbol::new(&env, "dividend_disbursed"), reward_token.clone(), index),
            DividendDisbursedEvent {
                reward_token,
                disburser: from,
                index,
                amount,
                snapshot_block,
            },
        );

        Ok(index)
    }

    /// Collect `holder`'s share of up to `max_entries` disbursements
    ///
    /// Scanning starts at the holder's cursor (or the first active
    /// disbursement, if later) and the cursor always moves past every scanned
    /// entry, even when the share is zero. `max_entries` of 0, or above
    /// `MAX_CLAIM_ENTRIES`, scans `MAX_CLAIM_ENTRIES`.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn claim(
        env: Env,
        holder: Address,
        reward_token: Address,
        max_entries: u32,
    ) -> Result<i128, Error> {
        holder.require_auth();

        let ledger = Storage::get_ledger(&env)?;
        let (from_index, to_index) = Self::scan_range(&env, &reward_token, &holder, max_entries);

        let mut total: i128 = 0;
        for index in from_index..to_index {
            let mut disbursement = Storage::get_disbursement(&env, &reward_token, index)?;
            let share = Self::share_of(&env, &ledger, &holder, &disbursement)?;
            if share == 0 {
                continue;
            }

            disbursement.claimed = disbursement
                .claimed
                .checked_add(share)
                .ok_or(Error::ArithmeticOverflow)?;
            Storage::set_disbursement(&env, &reward_token, index, &disbursement);

            total = total.checked_add(share).ok_or(Error::ArithmeticOverflow)?;
        }

        Storage::set_cursor(&env, &reward_token, &holder, to_index);

        if total > 0 {
            token::Client::new(&env, &reward_token).transfer(
                &env.current_contract_address(),
                &holder,
                &total,
            );
        }

        if to_index > from_index {
            env.events().publish(
                (Symbol::new(&env, "dividend_claimed"), reward_token.clone(), holder.clone()),
                DividendClaimedEvent {
                    reward_token,
                    holder,
                    amount: total,
                    from_index,
                    to_index,
                },
            );
        }

        Ok(total)
    }

    /// What `claim` with the same arguments would pay out
    pub fn claimable(
        env: Env,
        holder: Address,
        reward_token: Address,
        max_entries: u32,
    ) -> Result<i128, Error> {
        let ledger = Storage::get_ledger(&env)?;
        let (from_index, to_index) = Self::scan_range(&env, &reward_token, &holder, max_entries);

        let mut total: i128 = 0;
        for index in from_index..to_index {
            let disbursement = Storage::get_disbursement(&env, &reward_token, index)?;
            total = total
                .checked_add(Self::share_of(&env, &ledger, &holder, &disbursement)?)
                .ok_or(Error::ArithmeticOverflow)?;
        }

        Ok(total)
    }

    /// Close the oldest active disbursement and return its unclaimed remainder
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: `disburser` is not a disburser
    /// - `DisbursementNotFound`: No disbursement at `index`
    /// - `DeactivationOutOfOrder`: An earlier disbursement is still active
    /// - `DeactivationTooEarly`: Deactivation delay has not elapsed
    pub fn deactivate(
        env: Env,
        disburser: Address,
        reward_token: Address,
        index: u32,
    ) -> Result<i128, Error> {
        Storage::get_ledger(&env)?;

        if !Storage::is_disburser(&env, &disburser) {
            return Err(Error::Unauthorized);
        }
        disburser.require_auth();

        if index >= Storage::get_count(&env, &reward_token) {
            return Err(Error::DisbursementNotFound);
        }
        if index != Storage::get_deactivated_count(&env, &reward_token) {
            return Err(Error::DeactivationOutOfOrder);
        }

        let mut disbursement = Storage::get_disbursement(&env, &reward_token, index)?;
        let unlocks_at = disbursement
            .timestamp
            .saturating_add(Storage::get_deactivation_delay(&env));
        if env.ledger().timestamp() < unlocks_at {
            return Err(Error::DeactivationTooEarly);
        }

        let reclaimed = disbursement.amount - disbursement.claimed;
        disbursement.deactivated = true;

        Storage::set_disbursement(&env, &reward_token, index, &disbursement);
        Storage::set_deactivated_count(&env, &reward_token, index + 1);

        if reclaimed > 0 {
            token::Client::new(&env, &reward_token).transfer(
                &env.current_contract_address(),
                &disburser,
                &reclaimed,
            );
        }

        log!(&env, "disbursement deactivated", index, reclaimed);

        env.events().publish(
            (Symbol::new(&env, "dividend_deactivated"), reward_token.clone(), index),
            DividendDeactivatedEvent {
                reward_token,
                index,
                reclaimed,
            },
        );

        Ok(reclaimed)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_disbursement(env: Env, reward_token: Address, index: u32) -> Result<Disbursement, Error> {
        Storage::get_disbursement(&env, &reward_token, index)
    }

    pub fn disbursement_count(env: Env, reward_token: Address) -> u32 {
        Storage::get_count(&env, &reward_token)
    }

    pub fn total_disbursed(env: Env, reward_token: Address) -> i128 {
        Storage::get_total_disbursed(&env, &reward_token)
    }

    pub fn deactivated_count(env: Env, reward_token: Address) -> u32 {
        Storage::get_deactivated_count(&env, &reward_token)
    }

    pub fn claim_cursor(env: Env, reward_token: Address, holder: Address) -> u32 {
        Storage::get_cursor(&env, &reward_token, &holder)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    /// Disbursement indices a claim scans: `from..to`
    fn scan_range(env: &Env, reward_token: &Address, holder: &Address, max_entries: u32) -> (u32, u32) {
        let count = Storage::get_count(env, reward_token);
        let cursor = Storage::get_cursor(env, reward_token, holder);
        let from = cursor.max(Storage::get_deactivated_count(env, reward_token));

        let limit = if max_entries == 0 || max_entries > MAX_CLAIM_ENTRIES {
            MAX_CLAIM_ENTRIES
        } else {
            max_entries
        };

        (from, from.saturating_add(limit).min(count).max(from))
    }

    /// Share = amount × balance / total supply, both read at the snapshot
    fn share_of(
        env: &Env,
        ledger: &Address,
        holder: &Address,
        disbursement: &Disbursement,
    ) -> Result<i128, Error> {
        let supply = ledger::total_supply_at(env, ledger, disbursement.snapshot_block);
        if supply <= 0 {
            return Ok(0);
        }
        let balance = ledger::balance_at(env, ledger, holder, disbursement.snapshot_block);
        if balance <= 0 {
            return Ok(0);
        }

        let share = wad::mul_div(disbursement.amount as u128, balance as u128, supply as u128)?;
        i128::try_from(share).map_err(|_| Error::ArithmeticOverflow)
    }
}
