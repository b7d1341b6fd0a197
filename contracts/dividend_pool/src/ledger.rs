use soroban_sdk::{vec, Address, Env, IntoVal, Symbol};

// Calls into the snapshot token that backs the pool

pub fn balance_at(env: &Env, ledger: &Address, holder: &Address, block: u32) -> i128 {
    env.invoke_contract::<i128>(
        ledger,
        &Symbol::new(env, "balance_at"),
        vec![env, holder.into_val(env), block.into_val(env)],
    )
}

pub fn total_supply_at(env: &Env, ledger: &Address, block: u32) -> i128 {
    env.invoke_contract::<i128>(
        ledger,
        &Symbol::new(env, "total_supply_at"),
        vec![env, block.into_val(env)],
    )
}

/// Make sure a snapshot boundary exists at the current ledger.
///
/// Returns the boundary block. Balances read there are the ones in place when
/// the snapshot was taken.
pub fn ensure_snapshot(env: &Env, ledger: &Address) -> u32 {
    let sequence = env.ledger().sequence();

    let taken = env.invoke_contract::<bool>(
        ledger,
        &Symbol::new(env, "is_snapshot"),
        vec![env, sequence.into_val(env)],
    );
    if !taken {
        env.invoke_contract::<u32>(
            ledger,
            &Symbol::new(env, "snapshot"),
            vec![env, env.current_contract_address().into_val(env)],
        );
    }

    sequence
}
