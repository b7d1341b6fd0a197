use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Parent fork point lies in the future
    InvalidParent = 3,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller is neither the controller nor an operator
    Unauthorized = 10,

    // ============================================
    // LEDGER STATE ERRORS (20-39)
    // ============================================
    /// Transfer hook refused the transfer
    TransferRejected = 20,
    /// Transfer hook refused the approval
    ApprovalRejected = 21,
    /// A snapshot boundary already exists at or after this ledger
    SnapshotAlreadyTaken = 22,

    // ============================================
    // AMOUNT/BALANCE ERRORS (40-49)
    // ============================================
    /// Amount must be positive (non-negative for transfers)
    InvalidAmount = 40,
    InsufficientBalance = 41,
    InsufficientAllowance = 42,
    /// Approval expires before the current ledger
    InvalidExpiration = 43,

    // ============================================
    // ARITHMETIC ERRORS (50-59)
    // ============================================
    ArithmeticOverflow = 50,
}
