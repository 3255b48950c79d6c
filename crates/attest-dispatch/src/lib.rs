//! # attest-dispatch — Message Dispatcher
//!
//! The single entry point for the ledger. Every inbound command is a typed
//! message; the dispatcher validates its well-formedness, routes it to the
//! owning component, and on success returns a typed response plus the
//! structured events external indexers consume.
//!
//! ## Execution Contract
//!
//! Commands arrive one at a time, in consensus order, each wrapped in a host
//! transaction. A command either fully applies — primary store, indexes, and
//! events consistent — or returns a typed error with no state change. All
//! validation runs before the first write; there is no retry machinery here,
//! a caller resubmits a corrected command.

pub mod dispatch;
pub mod msg;

pub use dispatch::{DispatchOutcome, Dispatcher};
pub use msg::{
    Msg, MsgAddProtocolIdentity, MsgCreateIdentity, MsgGrantPermission, MsgIssueCredential,
    MsgIssueVc, MsgIssueZkCredential, MsgPerformAudit, MsgResponse, MsgRevokeCredential,
    MsgRevokePermission, MsgRevokeVc, MsgUpdateCompliance, MsgUpdateIdentity,
    MsgVerifyCredential, MsgVerifyZkProof,
};
