//! Domain types of the purchase workflow and the ports the engine depends on.

pub mod amortization;
pub mod credit;
pub mod identity;
pub mod keys;
pub mod money;
pub mod ports;
pub mod profile;
pub mod property;
pub mod request;
