//! budgetwise-domain
//!
//! Pure domain models (User, Category, Transaction, Budget, Book, Session).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod book;
pub mod budget;
pub mod category;
pub mod common;
pub mod session;
pub mod transaction;
pub mod user;

pub use book::*;
pub use budget::*;
pub use category::*;
pub use common::*;
pub use session::*;
pub use transaction::*;
pub use user::*;
