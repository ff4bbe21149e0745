//! Messaging client
//!
//! Signs requests with the connected wallet, posts them to a process, and
//! polls for their results.
//!
//! Every call to the transport is bounded by `result_timeout`; a call that
//! does not finish in time fails with [`MessagingError::Timeout`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use linkspace_core::{Identity, Wallet};
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use crate::config::MessagingConfig;
use crate::error::{MessagingError, MessagingResult};
use crate::message::{
    ACTION_TAG, Cursor, DataItem, DryRunRequest, MessageId, ProcessId, ProcessResult,
    ResultsPage, Tags, signing_payload,
};
use crate::transport::ProcessTransport;

/// Client for request/result messaging with remote processes
#[derive(Clone)]
pub struct MessagingClient {
    transport: Arc<dyn ProcessTransport>,
    wallet: Arc<dyn Wallet>,
    config: MessagingConfig,
}

impl MessagingClient {
    pub fn new(
        transport: Arc<dyn ProcessTransport>,
        wallet: Arc<dyn Wallet>,
        config: MessagingConfig,
    ) -> Self {
        Self {
            transport,
            wallet,
            config,
        }
    }

    /// Same transport and configuration, different signer
    pub fn with_wallet(&self, wallet: Arc<dyn Wallet>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            wallet,
            config: self.config.clone(),
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn ProcessTransport> {
        &self.transport
    }

    /// Identity of the connected wallet
    pub fn identity(&self) -> MessagingResult<Identity> {
        Ok(self.wallet.identity()?)
    }

    /// Run one transport call under the configured timeout
    async fn bounded<T>(
        &self,
        request: impl Display,
        call: impl Future<Output = MessagingResult<T>>,
    ) -> MessagingResult<T> {
        let started = Instant::now();
        match tokio::time::timeout(self.config.result_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let waited_ms = started.elapsed().as_millis() as u64;
                warn!(request = %request, waited_ms, "Transport call timed out");
                Err(MessagingError::Timeout {
                    message_id: request.to_string(),
                    waited_ms,
                })
            }
        }
    }

    fn outgoing_tags(&self, action: &str, tags: Tags) -> Tags {
        let mut all = self.config.common_tags();
        all.extend(tags);
        all.push(ACTION_TAG, action);
        all
    }

    /// Sign and post a mutating request
    ///
    /// Fails with [`MessagingError::NotAuthenticated`] before touching the
    /// network when no wallet is connected.
    #[instrument(skip_all, fields(process = %process, action = %action))]
    pub async fn send(
        &self,
        process: &ProcessId,
        action: &str,
        tags: Tags,
        data: impl Into<String>,
    ) -> MessagingResult<MessageId> {
        let owner = self.wallet.identity()?;
        let tags = self.outgoing_tags(action, tags);
        let data = data.into();
        let anchor: [u8; 32] = rand::random();

        let payload = signing_payload(process, &owner, &anchor, &tags, &data)?;
        let signature = self.wallet.sign(&payload)?;
        let id = MessageId::from_signature(&signature);

        let item = DataItem {
            id: id.clone(),
            process: process.clone(),
            anchor,
            tags,
            data,
            signature,
        };

        // A post that times out may still have been accepted
        self.bounded(&id, self.transport.post(item)).await?;
        debug!(message_id = %id, owner = %owner.short_id(), "Message sent");
        Ok(id)
    }

    /// Wait for the result of a sent message
    ///
    /// Polls until the result is visible or the configured timeout elapses.
    /// Transport errors while polling are retried until the deadline, since
    /// the message itself was already accepted.
    #[instrument(skip_all, fields(process = %process, message_id = %message_id))]
    pub async fn await_result(
        &self,
        process: &ProcessId,
        message_id: &MessageId,
    ) -> MessagingResult<ProcessResult> {
        let started = Instant::now();
        let deadline = started + self.config.result_timeout;

        let timed_out = || MessagingError::Timeout {
            message_id: message_id.to_string(),
            waited_ms: started.elapsed().as_millis() as u64,
        };

        loop {
            let poll =
                tokio::time::timeout_at(deadline, self.transport.result(process, message_id))
                    .await
                    .map_err(|_| timed_out())?;
            match poll {
                Ok(Some(result)) => {
                    trace!(waited_ms = started.elapsed().as_millis() as u64, "Result received");
                    return Ok(result);
                }
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Result poll failed, will retry");
                }
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Send a request and wait for its result
    pub async fn send_and_await(
        &self,
        process: &ProcessId,
        action: &str,
        tags: Tags,
        data: impl Into<String>,
    ) -> MessagingResult<(MessageId, ProcessResult)> {
        let id = self.send(process, action, tags, data).await?;
        let result = self.await_result(process, &id).await?;
        Ok((id, result))
    }

    /// Fetch one page of a process's results in ascending order
    ///
    /// `page_size` of `None` uses the configured default.
    #[instrument(skip_all, fields(process = %process))]
    pub async fn query_batch(
        &self,
        process: &ProcessId,
        from: Option<&Cursor>,
        page_size: Option<usize>,
    ) -> MessagingResult<ResultsPage> {
        let limit = page_size.unwrap_or(self.config.page_size).max(1);
        let page = self
            .bounded(
                format!("results of {}", process),
                self.transport.results(process, from, limit),
            )
            .await?;
        debug!(count = page.results.len(), "Fetched results page");
        Ok(page)
    }

    /// Evaluate a read-only request
    ///
    /// Needs no wallet and never mutates remote state.
    #[instrument(skip_all, fields(process = %process, action = %action))]
    pub async fn dry_run(
        &self,
        process: &ProcessId,
        action: &str,
        tags: Tags,
        data: impl Into<String>,
    ) -> MessagingResult<ProcessResult> {
        let request = DryRunRequest {
            process: process.clone(),
            tags: self.outgoing_tags(action, tags),
            data: data.into(),
        };
        let result = self
            .bounded(
                format!("dry run {} on {}", action, process),
                self.transport.dry_run(request),
            )
            .await?;
        if let Some(error) = &result.error {
            return Err(MessagingError::Rejected(error.clone()));
        }
        Ok(result)
    }
}

impl std::fmt::Debug for MessagingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
