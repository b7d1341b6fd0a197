#![no_std]

mod claims;
mod error;
mod events;
mod rounds;
mod storage;

pub use error::Error;
use events::*;
use rounds::Allocation;
use storage::{DataKey, Storage};
pub use storage::{AccountRoundInfo, PeriodConfig, PeriodState, Round, RoundStatus};

use soroban_sdk::{contract, contractimpl, log, token, vec, Address, Env, IntoVal, Symbol, Vec};
use wad::{add, min, sub, WAD};

/// Tiered multi-round sale of a fixed token supply against a base currency.
///
/// Each round offers a slice of the supply; its price settles between the
/// threshold (base price) and the cap, and the next round opens at or above
/// that price.
#[contract]
pub struct ContributionPeriod;

#[contractimpl]
impl ContributionPeriod {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the period and mint the full sale supply to this contract.
    ///
    /// The contract must already be the sale token's controller. It installs
    /// itself as the token's transfer hook, which keeps sale tokens locked
    /// until the period ends.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidConfig`: Targets, coefficients or round count out of range
    pub fn initialize(
        env: Env,
        admin: Address,
        base_token: Address,
        sale_token: Address,
        wallet: Address,
        post_sale_controller: Address,
        config: PeriodConfig,
    ) -> Result<(), Error> {
        if Storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        Self::validate_config(&config)?;
        let supply = to_amount(config.initial_supply)?;

        Storage::set_initialized(&env);
        Storage::set_address(&env, &DataKey::Admin, &admin);
        Storage::set_address(&env, &DataKey::BaseToken, &base_token);
        Storage::set_address(&env, &DataKey::SaleToken, &sale_token);
        Storage::set_address(&env, &DataKey::Wallet, &wallet);
        Storage::set_address(&env, &DataKey::PostSaleController, &post_sale_controller);
        Storage::set_config(&env, &config);
        Storage::set_state(
            &env,
            &PeriodState {
                current_round: 0,
                cumulative_distribution: 0,
                cumulative_contribution: 0,
                cumulative_percentage: 0,
                ended: false,
            },
        );

        let this = env.current_contract_address();
        env.invoke_contract::<()>(
            &sale_token,
            &Symbol::new(&env, "mint"),
            vec![&env, this.into_val(&env), supply.into_val(&env)],
        );

        let hook: Option<Address> = Some(this);
        env.invoke_contract::<()>(
            &sale_token,
            &Symbol::new(&env, "set_hook"),
            vec![&env, hook.into_val(&env)],
        );

        log!(&env, "contribution period initialized", config.round_count, supply);

        Ok(())
    }

    /// Schedule (or reschedule) a round before its window opens
    ///
    /// Availability, threshold and cap are derived immediately for round 0,
    /// and for a later round once its predecessor is finalized.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `PeriodEnded`: Period already ended
    /// - `InvalidRound`: Index >= round count
    /// - `RoundAlreadyFinalized`: Index below the current round
    /// - `InvalidSchedule`: Start in the past, empty window, or overlap with a neighbour
    /// - `RoundAlreadyStarted`: The round's window already opened
    /// - `PreviousRoundNotScheduled`: Previous round has no end time yet
    /// - `InvalidPercentage`: Zero, or total above 100%
    /// - `InvalidAllocation`: Derived availability or threshold is zero
    pub fn initialize_round(
        env: Env,
        index: u32,
        start: u64,
        end: u64,
        target_percentage: u128,
    ) -> Result<(), Error> {
        let admin = Storage::get_address(&env, &DataKey::Admin)?;
        admin.require_auth();

        let config = Storage::get_config(&env)?;
        let mut state = Storage::get_state(&env)?;

        if state.ended {
            return Err(Error::PeriodEnded);
        }
        if index >= config.round_count {
            return Err(Error::InvalidRound);
        }
        if index < state.current_round {
            return Err(Error::RoundAlreadyFinalized);
        }

        let now = env.ledger().timestamp();
        if start < now || end <= start {
            return Err(Error::InvalidSchedule);
        }

        let existing = Storage::get_round(&env, index);
        if existing.has_started(now) {
            return Err(Error::RoundAlreadyStarted);
        }

        if index > 0 {
            let previous = Storage::get_round(&env, index - 1);
            if !previous.is_scheduled() {
                return Err(Error::PreviousRoundNotScheduled);
            }
            if start < previous.end {
                return Err(Error::InvalidSchedule);
            }
        }
        if index + 1 < config.round_count {
            let next = Storage::get_round(&env, index + 1);
            if next.is_scheduled() && end > next.start {
                return Err(Error::InvalidSchedule);
            }
        }

        if target_percentage == 0 {
            return Err(Error::InvalidPercentage);
        }
        let cumulative_percentage = add(
            sub(state.cumulative_percentage, existing.target_percentage)?,
            target_percentage,
        )?;
        if cumulative_percentage > WAD {
            return Err(Error::InvalidPercentage);
        }

        let mut round = Round {
            index,
            start,
            end,
            target_percentage,
            ..Round::default()
        };

        if index == 0 || Storage::get_round(&env, index - 1).is_finalized() {
            let allocation = Self::allocation_for(&env, &config, &state, &round)?;
            if allocation.available == 0 || allocation.threshold == 0 {
                return Err(Error::InvalidAllocation);
            }
            Self::apply_allocation(&mut round, allocation);
        }

        state.cumulative_percentage = cumulative_percentage;
        Storage::set_round(&env, &round);
        Storage::set_state(&env, &state);

        env.events().publish(
            (Symbol::new(&env, "round_initialized"), index),
            RoundInitializedEvent {
                round: index,
                start,
                end,
                target_percentage,
                available: round.available,
                threshold: round.threshold,
                cap: round.cap,
            },
        );

        Ok(())
    }

    /// Sweep the collected base currency to the wallet
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn collect_funds(env: Env) -> Result<i128, Error> {
        let admin = Storage::get_address(&env, &DataKey::Admin)?;
        admin.require_auth();

        let wallet = Storage::get_address(&env, &DataKey::Wallet)?;
        let base = token::Client::new(&env, &Storage::get_address(&env, &DataKey::BaseToken)?);
        let amount = base.balance(&env.current_contract_address());

        if amount > 0 {
            base.transfer(&env.current_contract_address(), &wallet, &amount);

            env.events().publish(
                (Symbol::new(&env, "funds_collected"), wallet.clone()),
                FundsCollectedEvent { wallet, amount },
            );
        }

        Ok(amount)
    }

    // ============================================
    // CONTRIBUTIONS
    // ============================================

    /// Contribute base currency to the current round
    ///
    /// The full `amount` is pulled; whatever exceeds the round's remaining
    /// cap is sent straight back. Reaching the cap finalizes the round.
    /// Returns the accepted amount.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `PeriodEnded`: Period already ended
    /// - `InvalidAmount`: Amount <= 0
    /// - `BelowMinimumContribution`: Amount under the configured minimum
    /// - `RoundNotOpen`: Outside the window, not derived yet, or cap reached
    pub fn contribute(env: Env, contributor: Address, amount: i128) -> Result<i128, Error> {
        let config = Storage::get_config(&env)?;
        let mut state = Storage::get_state(&env)?;

        if state.ended {
            return Err(Error::PeriodEnded);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let requested = amount as u128;
        if requested < config.min_contribution {
            return Err(Error::BelowMinimumContribution);
        }

        contributor.require_auth();

        let now = env.ledger().timestamp();
        let mut round = Storage::get_round(&env, state.current_round);
        if !round.is_derived()
            || round.is_finalized()
            || now < round.start
            || now > round.end
            || round.total_contributed >= round.cap
        {
            return Err(Error::RoundNotOpen);
        }

        let accepted = min(requested, sub(round.cap, round.total_contributed)?);
        let refund = requested - accepted;

        let base = token::Client::new(&env, &Storage::get_address(&env, &DataKey::BaseToken)?);
        let this = env.current_contract_address();
        base.transfer(&contributor, &this, &amount);

        round.total_contributed = add(round.total_contributed, accepted)?;
        let contributed = add(
            Storage::get_contribution(&env, round.index, &contributor),
            accepted,
        )?;
        state.cumulative_contribution = add(state.cumulative_contribution, accepted)?;

        Storage::set_contribution(&env, round.index, &contributor, contributed);
        Storage::set_round(&env, &round);
        Storage::set_state(&env, &state);

        if refund > 0 {
            base.transfer(&this, &contributor, &to_amount(refund)?);
            log!(&env, "contribution capped", round.index, accepted, refund);
        } else {
            env.events().publish(
                (Symbol::new(&env, "contribution"), round.index, contributor.clone()),
                ContributionEvent {
                    round: round.index,
                    contributor,
                    amount,
                },
            );
        }

        if round.total_contributed == round.cap {
            Self::finalize(&env, round.index)?;
        }

        to_amount(accepted)
    }

    /// Settle the current round once it is full or its window has closed
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `PeriodEnded`: Period already ended
    /// - `RoundAlreadyFinalized`: Index below the current round
    /// - `NotCurrentRound`: Index above the current round
    /// - `RoundNotInitialized`: Round not scheduled or not derived
    /// - `RoundStillOpen`: Below cap and window still open
    pub fn finalize_round(env: Env, index: u32) -> Result<(), Error> {
        let state = Storage::get_state(&env)?;

        if state.ended {
            return Err(Error::PeriodEnded);
        }
        if index < state.current_round {
            return Err(Error::RoundAlreadyFinalized);
        }
        if index > state.current_round {
            return Err(Error::NotCurrentRound);
        }

        let round = Storage::get_round(&env, index);
        if !round.is_derived() {
            return Err(Error::RoundNotInitialized);
        }
        if round.total_contributed < round.cap && env.ledger().timestamp() <= round.end {
            return Err(Error::RoundStillOpen);
        }

        Self::finalize(&env, index)
    }

    // ============================================
    // CLAIMS
    // ============================================

    /// Collect the sale tokens earned in `round`; 0 when nothing is due
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidRound`: Index >= round count
    pub fn claim(env: Env, account: Address, round: u32) -> Result<i128, Error> {
        account.require_auth();
        to_amount(claims::claim_round(&env, &account, round)?)
    }

    /// Collect every round reached so far
    pub fn claim_all(env: Env, account: Address) -> Result<i128, Error> {
        account.require_auth();
        to_amount(claims::claim_all(&env, &account)?)
    }

    // ============================================
    // TRANSFER HOOK
    // ============================================

    /// Sale tokens stay locked until the period ends
    pub fn on_transfer(env: Env, _from: Address, _to: Address, _amount: i128) -> bool {
        Self::transfers_enabled(&env)
    }

    pub fn on_approve(env: Env, _owner: Address, _spender: Address, _amount: i128) -> bool {
        Self::transfers_enabled(&env)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_config(env: Env) -> Result<PeriodConfig, Error> {
        Storage::get_config(&env)
    }

    pub fn get_state(env: Env) -> Result<PeriodState, Error> {
        Storage::get_state(&env)
    }

    pub fn get_round(env: Env, index: u32) -> Result<Round, Error> {
        Self::check_round_index(&env, index)?;
        Ok(Storage::get_round(&env, index))
    }

    pub fn round_status(env: Env, index: u32) -> Result<RoundStatus, Error> {
        Self::check_round_index(&env, index)?;

        let round = Storage::get_round(&env, index);
        let status = if round.is_finalized() {
            RoundStatus::Finalized
        } else if !round.is_scheduled() {
            RoundStatus::Uninitialized
        } else if round.has_started(env.ledger().timestamp()) {
            RoundStatus::Active
        } else {
            RoundStatus::Initialized
        };

        Ok(status)
    }

    pub fn contribution_of(env: Env, account: Address, round: u32) -> u128 {
        Storage::get_contribution(&env, round, &account)
    }

    pub fn claimed_of(env: Env, account: Address, round: u32) -> u128 {
        Storage::get_claimed(&env, round, &account).unwrap_or(0)
    }

    /// Contributed, claimed and claimable amounts for every round reached so far
    pub fn contribution_info(env: Env, account: Address) -> Result<Vec<AccountRoundInfo>, Error> {
        claims::account_info(&env, &account)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn validate_config(config: &PeriodConfig) -> Result<(), Error> {
        if config.initial_supply == 0
            || config.init_min_target == 0
            || config.init_min_target > config.init_max_target
            || config.threshold_coefficient < WAD
            || config.cap_coefficient < config.threshold_coefficient
            || config.round_count == 0
        {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    fn check_round_index(env: &Env, index: u32) -> Result<(), Error> {
        if index >= Storage::get_config(env)?.round_count {
            return Err(Error::InvalidRound);
        }
        Ok(())
    }

    fn transfers_enabled(env: &Env) -> bool {
        Storage::get_state(env).map_or(false, |state| state.ended)
    }
}

impl ContributionPeriod {
    /// Price the round, advance to the next one and, after the last round,
    /// end the period.
    pub(crate) fn finalize(env: &Env, index: u32) -> Result<(), Error> {
        let config = Storage::get_config(env)?;
        let mut state = Storage::get_state(env)?;
        let mut round = Storage::get_round(env, index);

        let (price, distribution) = rounds::settle(&round)?;
        if price == 0 {
            return Err(Error::InvalidAllocation);
        }

        round.price = price;
        round.distribution = distribution;
        state.cumulative_distribution = add(state.cumulative_distribution, distribution)?;
        state.current_round = index + 1;

        Storage::set_round(env, &round);
        Storage::set_state(env, &state);

        log!(env, "round finalized", index, price, distribution);

        env.events().publish(
            (Symbol::new(env, "round_finalized"), index),
            RoundFinalizedEvent {
                round: index,
                price,
                distribution,
                total_contributed: round.total_contributed,
            },
        );

        if state.current_round >= config.round_count {
            return Self::end_period(env, &config, &mut state);
        }

        // A round scheduled ahead of time is priced now that its predecessor settled
        let mut next = Storage::get_round(env, state.current_round);
        if next.is_scheduled() {
            let allocation = Self::allocation_for(env, &config, &state, &next)?;
            if allocation.available != 0 && allocation.threshold != 0 {
                Self::apply_allocation(&mut next, allocation);
                Storage::set_round(env, &next);
            }
        }

        Ok(())
    }

    fn end_period(env: &Env, config: &PeriodConfig, state: &mut PeriodState) -> Result<(), Error> {
        let unsold = to_amount(sub(config.initial_supply, state.cumulative_distribution)?)?;

        state.ended = true;
        Storage::set_state(env, state);

        let sale_token = Storage::get_address(env, &DataKey::SaleToken)?;
        let controller = Storage::get_address(env, &DataKey::PostSaleController)?;

        if unsold > 0 {
            token::Client::new(env, &sale_token).transfer(
                &env.current_contract_address(),
                &controller,
                &unsold,
            );
        }

        env.invoke_contract::<()>(
            &sale_token,
            &Symbol::new(env, "change_controller"),
            vec![env, controller.into_val(env)],
        );

        log!(env, "contribution period ended", unsold);

        env.events().publish(
            (Symbol::new(env, "period_ended"),),
            PeriodEndedEvent { unsold, controller },
        );

        Ok(())
    }

    fn allocation_for(
        env: &Env,
        config: &PeriodConfig,
        state: &PeriodState,
        round: &Round,
    ) -> Result<Allocation, Error> {
        if round.index == 0 {
            return Ok(rounds::first_allocation(config, round.target_percentage)?);
        }

        let mut cumulative_pct = round.target_percentage;
        for i in 0..round.index {
            cumulative_pct = add(cumulative_pct, Storage::get_round(env, i).target_percentage)?;
        }
        let previous = Storage::get_round(env, round.index - 1);

        Ok(rounds::next_allocation(
            config,
            cumulative_pct,
            state.cumulative_distribution,
            previous.price,
        )?)
    }

    fn apply_allocation(round: &mut Round, allocation: Allocation) {
        round.available = allocation.available;
        round.threshold = allocation.threshold;
        round.cap = allocation.cap;
    }
}

pub(crate) fn to_amount(value: u128) -> Result<i128, Error> {
    i128::try_from(value).map_err(|_| Error::ArithmeticOverflow)
}

#[cfg(test)]
mod test;
