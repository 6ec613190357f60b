//! Everything the user sees
//!
//! `session` drives the ledger from parsed commands, the other modules
//! only format what it hands them.

pub mod card;
pub mod plot;
pub mod session;
pub mod table;
