//! Domain logic for the MJ manufacturing-order tracker.
//!
//! Everything here is pure: money arithmetic, delivery-status derivation,
//! packing-list grouping, warehouse progress, calendar and finance rollups,
//! and input validation. The `db` and `api` crates call into this crate;
//! nothing here touches the database or the network.

pub mod calendar;
pub mod delivery;
pub mod error;
pub mod finance;
pub mod packing;
pub mod payment;
pub mod roles;
pub mod types;
pub mod upload;
pub mod validation;
pub mod warehouse;
