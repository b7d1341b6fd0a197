use crate::error::Error;
use crate::events::ClaimedEvent;
use crate::rounds;
use crate::storage::{AccountRoundInfo, DataKey, Round, Storage};
use crate::{to_amount, ContributionPeriod};
use soroban_sdk::{token, Address, Env, Symbol, Vec};

/// Pay `account` its share of round `index`.
///
/// A current round whose window has closed is finalized first. Unfinalized
/// rounds, rounds nobody contributed to, accounts that contributed nothing
/// and repeated claims all return 0 without effect.
pub fn claim_round(env: &Env, account: &Address, index: u32) -> Result<u128, Error> {
    let config = Storage::get_config(env)?;
    if index >= config.round_count {
        return Err(Error::InvalidRound);
    }

    settle_if_expired(env, index)?;

    let round = Storage::get_round(env, index);
    let Some(reward) = owed(env, account, &round)? else {
        return Ok(0);
    };

    Storage::set_claimed(env, index, account, reward);

    let amount = to_amount(reward)?;
    if amount > 0 {
        let sale_token = Storage::get_address(env, &DataKey::SaleToken)?;
        token::Client::new(env, &sale_token).transfer(
            &env.current_contract_address(),
            account,
            &amount,
        );
    }

    env.events().publish(
        (Symbol::new(env, "claimed"), index, account.clone()),
        ClaimedEvent {
            round: index,
            account: account.clone(),
            reward: amount,
        },
    );

    Ok(reward)
}

/// Claim rounds `0..=current_round`, skipping the ones with nothing due
pub fn claim_all(env: &Env, account: &Address) -> Result<u128, Error> {
    let round_count = Storage::get_config(env)?.round_count;

    let mut total = 0u128;
    let mut index = 0u32;
    // current_round moves forward when a claim finalizes an expired round
    while index < round_count && index <= Storage::get_state(env)?.current_round {
        total = wad::add(total, claim_round(env, account, index)?)?;
        index += 1;
    }

    Ok(total)
}

pub fn account_info(env: &Env, account: &Address) -> Result<Vec<AccountRoundInfo>, Error> {
    let round_count = Storage::get_config(env)?.round_count;
    let current_round = Storage::get_state(env)?.current_round;

    let mut info = Vec::new(env);
    for index in 0..round_count {
        if index > current_round {
            break;
        }

        let round = Storage::get_round(env, index);
        info.push_back(AccountRoundInfo {
            round: index,
            contributed: Storage::get_contribution(env, index, account),
            claimed: Storage::get_claimed(env, index, account).unwrap_or(0),
            claimable: owed(env, account, &round)?.unwrap_or(0),
        });
    }

    Ok(info)
}

fn settle_if_expired(env: &Env, index: u32) -> Result<(), Error> {
    let state = Storage::get_state(env)?;
    if state.ended || index != state.current_round {
        return Ok(());
    }

    let round = Storage::get_round(env, index);
    if round.is_derived() && !round.is_finalized() && env.ledger().timestamp() > round.end {
        ContributionPeriod::finalize(env, index)?;
    }

    Ok(())
}

/// Reward still owed for `round`, `None` when a claim would be a no-op
fn owed(env: &Env, account: &Address, round: &Round) -> Result<Option<u128>, Error> {
    if !round.is_finalized() || round.total_contributed == 0 {
        return Ok(None);
    }

    let contribution = Storage::get_contribution(env, round.index, account);
    if contribution == 0 || Storage::get_claimed(env, round.index, account).is_some() {
        return Ok(None);
    }

    Ok(Some(rounds::reward(
        contribution,
        round.distribution,
        round.total_contributed,
    )?))
}
