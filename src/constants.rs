/// Tolerance applied wherever share sums and balances are compared.
pub const SPLIT_TOLERANCE: f64 = 0.01;

pub const DEFAULT_CURRENCY: &str = "INR";

pub const MAX_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_BILL_AMOUNT: f64 = 1_000_000.0;

/// Attempts for a versioned read-modify-write before giving up.
pub const MAX_WRITE_RETRIES: u32 = 3;

// Audit action names.
pub const BILL_CREATED: &str = "bill_created";
pub const PAYMENT_RECORDED: &str = "payment_recorded";
pub const PAYMENT_CONFIRMED: &str = "payment_confirmed";
pub const SHARE_REJECTED: &str = "share_rejected";
pub const REMINDER_SCHEDULED: &str = "reminder_scheduled";
pub const BILL_CANCELLED: &str = "bill_cancelled";
pub const SETTLEMENT_CALCULATED: &str = "settlement_calculated";
