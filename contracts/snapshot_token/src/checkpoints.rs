use soroban_sdk::{contracttype, Vec};

/// Value of a balance (or of the total supply) from `from_block` onwards
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub from_block: u32,
    pub value: i128,
}

/// Floor search over an ascending sequence of `len` keys.
///
/// Returns the largest index whose key is ≤ `target`, or `None` when every
/// key is greater (or the sequence is empty).
pub fn floor_index(len: u32, target: u32, key_at: impl Fn(u32) -> u32) -> Option<u32> {
    if len == 0 || key_at(0) > target {
        return None;
    }

    // Most queries are for the present
    let newest = len - 1;
    if key_at(newest) <= target {
        return Some(newest);
    }

    let mut low = 0u32;
    let mut high = newest;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if key_at(mid) <= target {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Some(low)
}

/// Value recorded at or before `block`, if any checkpoint covers it
pub fn value_at(history: &Vec<Checkpoint>, block: u32) -> Option<i128> {
    floor_index(history.len(), block, |i| history.get_unchecked(i).from_block)
        .map(|i| history.get_unchecked(i).value)
}

/// Whether `block` is one of the recorded snapshot boundaries
pub fn is_boundary(boundaries: &Vec<u32>, block: u32) -> bool {
    floor_index(boundaries.len(), block, |i| boundaries.get_unchecked(i))
        .map_or(false, |i| boundaries.get_unchecked(i) == block)
}

/// Record `value` as of `block`.
///
/// The newest checkpoint is overwritten in place unless a snapshot boundary
/// was recorded at or after the block it starts at; in that case its value is
/// frozen and a new checkpoint is appended. History therefore grows with the
/// number of snapshots crossed, not with the number of writes.
///
/// Appended checkpoints start after the last boundary, so a write made later
/// in the ledger a snapshot was taken in is not visible at that snapshot.
pub fn record(history: &mut Vec<Checkpoint>, value: i128, block: u32, last_boundary: Option<u32>) {
    if let Some(newest) = history.last() {
        let frozen = last_boundary.map_or(false, |boundary| boundary >= newest.from_block);
        if !frozen {
            history.set(
                history.len() - 1,
                Checkpoint {
                    from_block: newest.from_block,
                    value,
                },
            );
            return;
        }
    }

    let from_block = match last_boundary {
        Some(boundary) => block.max(boundary.saturating_add(1)),
        None => block,
    };
    history.push_back(Checkpoint { from_block, value });
}
