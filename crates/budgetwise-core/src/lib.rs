//! budgetwise-core
//!
//! Business logic and services for Budgetwise.
//! Depends on budgetwise-domain. No CLI, no terminal I/O. Persistence goes
//! through the [`FinanceStorage`] trait.

pub mod auth_service;
pub mod budget_service;
pub mod category_service;
pub mod error;
pub mod format;
pub mod public_api;
pub mod report_service;
pub mod storage;
pub mod time;
pub mod transaction_service;

pub use auth_service::*;
pub use budget_service::*;
pub use category_service::*;
pub use error::{CoreError, ServiceResult};
pub use public_api::*;
pub use report_service::*;
pub use storage::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction_service::*;

#[cfg(test)]
mod tests;
