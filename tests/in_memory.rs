//! In-memory integration tests.
//!
//! Tests are organised into modules by subsystem:
//! - `registry_tests`: registry administration and its effect on scoring
//! - `ledger_tests`: independent sessions and cleanup
//! - `coordinator_tests`: end-to-end turns across transports

mod in_memory {
    pub mod helpers;

    mod coordinator_tests;
    mod ledger_tests;
    mod registry_tests;
}
