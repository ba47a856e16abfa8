//! Application layer orchestrating the purchase workflow.
//!
//! `LendingEngine` is the entry point. Every operation authorizes its caller, works
//! inside a `LedgerTx`, and commits its writes in one batch.

pub mod approval;
pub mod auth;
pub mod command;
pub mod engine;
pub mod escrow;
pub mod ledger_tx;
pub mod profiles;
pub mod queues;
