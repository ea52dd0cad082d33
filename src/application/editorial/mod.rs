//! Editorial services: post mutations and the audit trail behind them.

pub mod audit;
pub mod posts;
