//! # Block Execution Context
//!
//! The surrounding runtime delivers commands in consensus order, one at a
//! time, each wrapped in a transaction. `BlockContext` is the only channel
//! through which block height and block time reach the components — no
//! component reads a wall clock or an RNG, so applying the same command
//! stream always reproduces the same state.

use crate::temporal::Timestamp;

/// Execution context for a single command.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    /// Height of the block containing the command.
    pub height: u64,
    /// Block time, shared by every command in the block.
    pub now: Timestamp,
}

impl BlockContext {
    /// Create a context for the given height and block time.
    pub fn new(height: u64, now: Timestamp) -> Self {
        Self { height, now }
    }
}
