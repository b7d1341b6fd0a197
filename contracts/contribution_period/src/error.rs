use soroban_sdk::contracterror;
use wad::MathError;

/// Codes start at 101 so they never read as the sale token's own codes when a
/// token call fails inside this contract.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (101-109)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 101,
    /// Contract not initialized
    NotInitialized = 102,
    /// Targets, coefficients or round count out of range
    InvalidConfig = 103,

    // ============================================
    // ROUND STATE ERRORS (120-139)
    // ============================================
    /// The period is over, rounds are closed for good
    PeriodEnded = 120,
    /// Round index >= round count
    InvalidRound = 121,
    /// Round window already opened, schedule is frozen
    RoundAlreadyStarted = 122,
    /// Start in the past, empty window, or overlap with a neighbouring round
    InvalidSchedule = 123,
    /// Previous round has no end time yet
    PreviousRoundNotScheduled = 124,
    /// Current round is outside its window, full, or not derived yet
    RoundNotOpen = 125,
    /// Round was never scheduled
    RoundNotInitialized = 126,
    RoundAlreadyFinalized = 127,
    /// Round neither reached its cap nor passed its end time
    RoundStillOpen = 128,
    /// Rounds finalize strictly in order
    NotCurrentRound = 129,

    // ============================================
    // AMOUNT ERRORS (140-149)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 140,
    BelowMinimumContribution = 141,
    /// Percentage is zero or pushes the total above 100%
    InvalidPercentage = 142,
    /// Derived availability or threshold came out as zero
    InvalidAllocation = 143,

    // ============================================
    // ARITHMETIC ERRORS (150-159)
    // ============================================
    ArithmeticOverflow = 150,
}

impl From<MathError> for Error {
    fn from(_: MathError) -> Self {
        Error::ArithmeticOverflow
    }
}
