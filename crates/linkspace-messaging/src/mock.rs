//! In-memory process network for testing
//!
//! Hosts [`ProcessHandler`]s behind the [`ProcessTransport`] trait so the
//! messaging, registry and workflow layers can be exercised without a real
//! network.
//!
//! ## Fault injection
//!
//! - [`MockProcessNetwork::set_unreachable`]: every call to the process fails
//!   with a transport error
//! - [`MockProcessNetwork::fail_next_posts`]: the next `n` posts fail before
//!   reaching the process
//! - [`MockProcessNetwork::lose_next_posts`]: the next `n` posts are accepted
//!   but never reach the process, so no result ever appears
//! - [`MockProcessNetwork::withhold_results`]: messages are applied but their
//!   results stay invisible until [`MockProcessNetwork::release_withheld`]
//! - [`MockProcessNetwork::set_result_delay`]: results become visible only
//!   after a delay

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use linkspace_core::Identity;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{MessagingError, MessagingResult};
use crate::message::{
    Cursor, DataItem, DryRunRequest, MessageId, ProcessId, ProcessResult, ResultsPage, Tags,
};
use crate::transport::ProcessTransport;

/// A message as seen by a process handler
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    /// Verified sender; `None` for dry runs
    pub from: Option<Identity>,
    pub tags: Tags,
    pub data: String,
}

impl InboundMessage {
    pub fn action(&self) -> Option<&str> {
        self.tags.action()
    }
}

/// Behavior of a process hosted on the mock network
pub trait ProcessHandler: Send + Sync {
    /// Apply a signed message, possibly mutating state
    fn handle(&mut self, message: &InboundMessage) -> ProcessResult;

    /// Evaluate a message read-only
    fn dry_run(&self, message: &InboundMessage) -> ProcessResult;
}

struct LoggedResult {
    result: ProcessResult,
    /// `None` while withheld
    visible_at: Option<Instant>,
}

impl LoggedResult {
    fn is_visible(&self, now: Instant) -> bool {
        self.visible_at.is_some_and(|at| at <= now)
    }
}

struct HostedProcess {
    handler: Mutex<Box<dyn ProcessHandler>>,
    log: Mutex<Vec<LoggedResult>>,
    posted: Mutex<Vec<DataItem>>,
    unreachable: AtomicBool,
    fail_posts: AtomicUsize,
    lose_posts: AtomicUsize,
    withhold: AtomicBool,
    delay_ms: AtomicUsize,
}

impl HostedProcess {
    fn new(handler: Box<dyn ProcessHandler>) -> Self {
        Self {
            handler: Mutex::new(handler),
            log: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            unreachable: AtomicBool::new(false),
            fail_posts: AtomicUsize::new(0),
            lose_posts: AtomicUsize::new(0),
            withhold: AtomicBool::new(false),
            delay_ms: AtomicUsize::new(0),
        }
    }

    fn check_reachable(&self, process: &ProcessId) -> MessagingResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(MessagingError::Transport(format!(
                "process {} unreachable",
                process
            )));
        }
        Ok(())
    }
}

/// In-memory network of processes
#[derive(Default)]
pub struct MockProcessNetwork {
    processes: DashMap<ProcessId, Arc<HostedProcess>>,
}

impl MockProcessNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host a process under `id`, replacing any previous one
    pub fn spawn(&self, id: ProcessId, handler: impl ProcessHandler + 'static) {
        self.processes
            .insert(id, Arc::new(HostedProcess::new(Box::new(handler))));
    }

    fn process(&self, id: &ProcessId) -> MessagingResult<Arc<HostedProcess>> {
        self.processes
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MessagingError::Rejected(format!("unknown process {}", id)))
    }

    pub fn set_unreachable(&self, id: &ProcessId, unreachable: bool) {
        if let Some(p) = self.processes.get(id) {
            p.unreachable.store(unreachable, Ordering::SeqCst);
        }
    }

    /// Fail the next `count` posts to the process with a transport error
    pub fn fail_next_posts(&self, id: &ProcessId, count: usize) {
        if let Some(p) = self.processes.get(id) {
            p.fail_posts.store(count, Ordering::SeqCst);
        }
    }

    /// Accept the next `count` posts without delivering them
    pub fn lose_next_posts(&self, id: &ProcessId, count: usize) {
        if let Some(p) = self.processes.get(id) {
            p.lose_posts.store(count, Ordering::SeqCst);
        }
    }

    /// Apply messages but keep their results invisible
    pub fn withhold_results(&self, id: &ProcessId, withhold: bool) {
        if let Some(p) = self.processes.get(id) {
            p.withhold.store(withhold, Ordering::SeqCst);
        }
    }

    /// Make every withheld result visible now
    pub async fn release_withheld(&self, id: &ProcessId) {
        let Ok(process) = self.process(id) else {
            return;
        };
        let now = Instant::now();
        let mut log = process.log.lock().await;
        for entry in log.iter_mut().filter(|e| e.visible_at.is_none()) {
            entry.visible_at = Some(now);
        }
    }

    /// Delay the visibility of new results
    pub fn set_result_delay(&self, id: &ProcessId, delay: Duration) {
        if let Some(p) = self.processes.get(id) {
            let ms = usize::try_from(delay.as_millis()).unwrap_or(usize::MAX);
            p.delay_ms.store(ms, Ordering::SeqCst);
        }
    }

    /// Every message the process has accepted, in arrival order
    pub async fn posted(&self, id: &ProcessId) -> Vec<DataItem> {
        match self.process(id) {
            Ok(p) => p.posted.lock().await.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of messages the process has accepted
    pub async fn post_count(&self, id: &ProcessId) -> usize {
        self.posted(id).await.len()
    }
}

#[async_trait]
impl ProcessTransport for MockProcessNetwork {
    async fn post(&self, item: DataItem) -> MessagingResult<()> {
        let process = self.process(&item.process)?;
        process.check_reachable(&item.process)?;

        let injected = process
            .fail_posts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(MessagingError::Transport("injected post failure".into()));
        }

        item.verify()?;

        let lost = process
            .lose_posts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lost {
            debug!(process = %item.process, message_id = %item.id, "Mock network lost message");
            return Ok(());
        }

        let inbound = InboundMessage {
            id: item.id.clone(),
            from: Some(item.owner().clone()),
            tags: item.tags.clone(),
            data: item.data.clone(),
        };

        let mut result = process.handler.lock().await.handle(&inbound);
        result.message_id = Some(item.id.clone());

        let visible_at = if process.withhold.load(Ordering::SeqCst) {
            None
        } else {
            let delay = process.delay_ms.load(Ordering::SeqCst) as u64;
            Some(Instant::now() + Duration::from_millis(delay))
        };

        debug!(
            process = %item.process,
            message_id = %item.id,
            action = item.tags.action().unwrap_or(""),
            withheld = visible_at.is_none(),
            "Mock process handled message"
        );

        process.log.lock().await.push(LoggedResult { result, visible_at });
        process.posted.lock().await.push(item);
        Ok(())
    }

    async fn result(
        &self,
        process_id: &ProcessId,
        message_id: &MessageId,
    ) -> MessagingResult<Option<ProcessResult>> {
        let process = self.process(process_id)?;
        process.check_reachable(process_id)?;

        let now = Instant::now();
        let log = process.log.lock().await;
        Ok(log
            .iter()
            .find(|e| e.result.message_id.as_ref() == Some(message_id))
            .filter(|e| e.is_visible(now))
            .map(|e| e.result.clone()))
    }

    async fn results(
        &self,
        process_id: &ProcessId,
        from: Option<&Cursor>,
        limit: usize,
    ) -> MessagingResult<ResultsPage> {
        let process = self.process(process_id)?;
        process.check_reachable(process_id)?;

        let start = match from {
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .map_err(|_| MessagingError::Rejected(format!("bad cursor {}", cursor)))?,
            None => 0,
        };

        // Stop at the first invisible entry so the cursor never skips it
        let now = Instant::now();
        let log = process.log.lock().await;
        let results: Vec<ProcessResult> = log
            .iter()
            .skip(start)
            .take(limit)
            .take_while(|e| e.is_visible(now))
            .map(|e| e.result.clone())
            .collect();

        let cursor = if results.is_empty() {
            from.cloned()
        } else {
            Some(Cursor::new((start + results.len()).to_string()))
        };
        Ok(ResultsPage { cursor, results })
    }

    async fn dry_run(&self, request: DryRunRequest) -> MessagingResult<ProcessResult> {
        let process = self.process(&request.process)?;
        process.check_reachable(&request.process)?;

        let inbound = InboundMessage {
            id: MessageId::new("dry-run"),
            from: None,
            tags: request.tags,
            data: request.data,
        };
        Ok(process.handler.lock().await.dry_run(&inbound))
    }
}
