//! Implementations that are useful accross the whole project
//!
//! Date management, half-month periods, money, and the debt ledger itself

pub mod amount;
pub mod date;
pub mod entry;
pub mod ledger;
pub mod period;
pub mod summary;
