//! # Ledger Fabric Test Suite
//!
//! Cross-subsystem scenarios exercising the fabric end to end: the
//! bridge voting flow, lazy refunds, batch ordering, consensus
//! elections, and fan-out failure isolation.

#[cfg(test)]
mod scenarios;
