//! Transaction submission.
//!
//! Every action that changes ledger state funnels through
//! [`TransactionDispatcher::sign_and_send`] once the adapter has produced a raw
//! transaction.

pub mod dispatcher;
pub mod options;

pub use dispatcher::{
    ensure_signing_path, DispatchOutcome, SigningPath, TransactionDispatcher, REQUEST_ID_HEADER,
};
pub use options::{Callback, InvokeOptions};
