#![doc(test(attr(deny(warnings))))]

//! Budgetwise is a personal-finance tracker: users record income and expense
//! transactions against categories, set monthly budgets and read reports
//! through an interactive shell.

pub mod cli;
pub mod core;
pub mod utils;

pub use budgetwise_config as config;
pub use budgetwise_core as services;
pub use budgetwise_domain as domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Budgetwise tracing initialized.");
    });
}
