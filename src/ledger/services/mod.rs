//! Session ledger service and retry policy.

mod ledger;
mod retry;

pub use ledger::{
    LedgerConfig, LedgerError, LedgerResult, RecordInvocationRequest, SessionLedger,
};
pub use retry::RetryPolicy;
