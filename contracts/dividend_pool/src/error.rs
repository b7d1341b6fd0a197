use soroban_sdk::contracterror;
use wad::MathError;

/// Codes start at 201, clear of the holder ledger's codes (1-59) and the
/// contribution period's (101-159).
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (201-209)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 201,
    /// Contract not initialized
    NotInitialized = 202,

    // ============================================
    // AUTHORIZATION ERRORS (210-219)
    // ============================================
    /// Caller is not a registered disburser
    Unauthorized = 210,

    // ============================================
    // DISBURSEMENT STATE ERRORS (220-239)
    // ============================================
    /// No disbursement at this index for the reward token
    DisbursementNotFound = 220,
    /// Disbursements are deactivated strictly in order
    DeactivationOutOfOrder = 221,
    /// Deactivation delay has not elapsed yet
    DeactivationTooEarly = 222,

    // ============================================
    // AMOUNT ERRORS (240-249)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 240,

    // ============================================
    // ARITHMETIC ERRORS (250-259)
    // ============================================
    ArithmeticOverflow = 250,
}

impl From<MathError> for Error {
    fn from(_: MathError) -> Self {
        Error::ArithmeticOverflow
    }
}
