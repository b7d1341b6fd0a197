use crate::storage::{PeriodConfig, Round};
use wad::{max, min, mul_div, sub, wdiv, wmul, wmul_up, MathError};

/// Supply on offer for a round and the contribution levels that price it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Allocation {
    pub available: u128,
    pub threshold: u128,
    pub cap: u128,
}

/// Allocation of the opening round
///
/// Formula:
/// - available = pct × initial_supply
/// - threshold = pct × init_min_target
/// - cap = pct × init_max_target
///
/// Example:
/// - pct: 0.5, supply: 100, targets: 10 / 40
/// - available 50, threshold 5, cap 20
pub fn first_allocation(config: &PeriodConfig, pct: u128) -> Result<Allocation, MathError> {
    Ok(Allocation {
        available: wmul(pct, config.initial_supply)?,
        threshold: wmul(pct, config.init_min_target)?,
        cap: wmul(pct, config.init_max_target)?,
    })
}

/// Allocation of a later round, once its predecessor settled at `previous_price`
///
/// Formula:
/// - available = cumulative_pct × initial_supply − distributed so far
/// - threshold = ⌈threshold_coefficient × previous_price × available⌉
/// - cap = ⌈cap_coefficient × previous_price × available⌉
///
/// Levels round up, so the opening price of the round (threshold / available)
/// is never below the price the previous round settled at.
pub fn next_allocation(
    config: &PeriodConfig,
    cumulative_pct: u128,
    distributed: u128,
    previous_price: u128,
) -> Result<Allocation, MathError> {
    let available = sub(wmul(cumulative_pct, config.initial_supply)?, distributed)?;
    let threshold = wmul_up(wmul(config.threshold_coefficient, previous_price)?, available)?;
    let cap = wmul_up(wmul(config.cap_coefficient, previous_price)?, available)?;

    Ok(Allocation {
        available,
        threshold,
        cap,
    })
}

/// Final price and distribution of a round
///
/// Formula:
/// - price = max(threshold / available, total / available)
/// - distribution = min(available, total / price)
///
/// Example:
/// - available 50, threshold 5, total 2
/// - price 0.1, distribution 20
pub fn settle(round: &Round) -> Result<(u128, u128), MathError> {
    let base_price = wdiv(round.threshold, round.available)?;
    let price = max(base_price, wdiv(round.total_contributed, round.available)?);
    let distribution = min(round.available, wdiv(round.total_contributed, price)?);
    Ok((price, distribution))
}

/// Sale tokens owed for `contribution`: its pro-rata part of the distribution
///
/// Formula: reward = contribution × distribution / total_contributed
///
/// Rewards floor, so their sum never exceeds the distribution.
pub fn reward(contribution: u128, distribution: u128, total_contributed: u128) -> Result<u128, MathError> {
    mul_div(contribution, distribution, total_contributed)
}
