//! Business logic over the record store. Handlers call into these; nothing
//! here knows about HTTP.

pub mod accounts;
pub mod chirps;

pub use accounts::Accounts;
pub use chirps::{Chirps, SortOrder};
