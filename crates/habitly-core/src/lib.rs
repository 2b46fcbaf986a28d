//! Habitly domain: habits, recurrence rules, validation, pagination, and the
//! store and notifier seams. No HTTP or database code lives here.

#![allow(async_fn_in_trait)]

pub mod account;
pub mod error;
pub mod frequency;
pub mod habit;
pub mod notify;
pub mod page;
pub mod recurrence;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
