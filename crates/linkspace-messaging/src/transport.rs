//! Transport abstraction for reaching remote processes

use async_trait::async_trait;

use crate::error::MessagingResult;
use crate::message::{Cursor, DataItem, DryRunRequest, MessageId, ProcessId, ProcessResult, ResultsPage};

/// Transport to the process network
///
/// Implementations deliver signed data items, expose each process's result
/// feed, and evaluate read-only requests. Any call may fail with
/// [`MessagingError::Transport`](crate::MessagingError::Transport).
#[async_trait]
pub trait ProcessTransport: Send + Sync {
    /// Deliver a signed message to its target process
    async fn post(&self, item: DataItem) -> MessagingResult<()>;

    /// Fetch the result for a message, if one is visible yet
    async fn result(
        &self,
        process: &ProcessId,
        message_id: &MessageId,
    ) -> MessagingResult<Option<ProcessResult>>;

    /// List a process's results in ascending order, starting after `from`
    async fn results(
        &self,
        process: &ProcessId,
        from: Option<&Cursor>,
        limit: usize,
    ) -> MessagingResult<ResultsPage>;

    /// Evaluate a request without applying it
    async fn dry_run(&self, request: DryRunRequest) -> MessagingResult<ProcessResult>;
}
