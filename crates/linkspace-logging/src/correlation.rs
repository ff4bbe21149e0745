//! Correlation ids for workflow runs
//!
//! A [`CorrelationContext`] is created when a workflow run starts and a
//! child is derived for each step. The remote message id produced by a step
//! is attached to its context, so a run's logs can be joined with the
//! registry's result feed.

use serde::{Deserialize, Serialize};
use tracing::field;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationContext {
    /// Same for every step of one run
    pub trace_id: Uuid,

    /// Unique to this step
    pub span_id: Uuid,

    pub parent_span_id: Option<Uuid>,

    /// Remote message id produced by this step, if any
    pub message_id: Option<String>,

    /// Steps since the root
    pub depth: u32,
}

impl CorrelationContext {
    /// Context for a new run
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            span_id: Uuid::new_v4(),
            parent_span_id: None,
            message_id: None,
            depth: 0,
        }
    }

    /// Context for the next step of the same run
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: Uuid::new_v4(),
            parent_span_id: Some(self.span_id),
            message_id: None,
            depth: self.depth + 1,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// W3C trace context header: `00-{trace_id}-{span_id}-01`
    pub fn to_traceparent(&self) -> String {
        let trace_id = self.trace_id.as_simple().to_string();
        let span_id = self.span_id.as_simple().to_string();
        format!("00-{}-{}-01", trace_id, &span_id[..16])
    }

    /// Parse a W3C `traceparent` header
    ///
    /// Only the trace id survives exactly; the 8-byte span id is zero-padded.
    pub fn from_traceparent(traceparent: &str) -> Option<Self> {
        let mut parts = traceparent.split('-');
        let (Some(_version), Some(trace), Some(span), Some(_flags), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };
        if span.len() != 16 {
            return None;
        }

        let trace_id = Uuid::parse_str(trace).ok()?;
        let span_id = Uuid::parse_str(&format!("{}0000000000000000", span)).ok()?;
        Some(Self {
            trace_id,
            span_id,
            parent_span_id: None,
            message_id: None,
            depth: 0,
        })
    }
}

impl Default for CorrelationContext {
    fn default() -> Self {
        Self::new_root()
    }
}

/// Record correlation fields on a span
///
/// The span must declare the fields (e.g. `trace_id = field::Empty`);
/// undeclared fields are ignored.
pub trait CorrelationExt {
    fn record_correlation(&self, ctx: &CorrelationContext);
}

impl CorrelationExt for tracing::Span {
    fn record_correlation(&self, ctx: &CorrelationContext) {
        self.record(fields::TRACE_ID, field::display(&ctx.trace_id));
        self.record(fields::SPAN_ID, field::display(&ctx.span_id));
        if let Some(parent) = ctx.parent_span_id {
            self.record(fields::PARENT_SPAN_ID, field::display(parent));
        }
        if let Some(message_id) = &ctx.message_id {
            self.record(fields::MESSAGE_ID, message_id.as_str());
        }
    }
}

/// Standard field names
pub mod fields {
    pub const TRACE_ID: &str = "trace_id";
    pub const SPAN_ID: &str = "span_id";
    pub const PARENT_SPAN_ID: &str = "parent_span_id";
    pub const MESSAGE_ID: &str = "message_id";
    pub const IDENTITY: &str = "identity";
    pub const NAME: &str = "name";
    pub const CONTENT_ID: &str = "content_id";
    pub const PROCESS: &str = "process";
    pub const ACTION: &str = "action";
    pub const STATE: &str = "state";
    pub const ATTEMPT: &str = "attempt";
}

/// Standard span names
pub mod spans {
    // Workflow
    pub const CLAIM: &str = "claim";
    pub const REPUBLISH: &str = "republish";
    pub const RELEASE: &str = "release";
    pub const RECONCILE: &str = "reconcile";

    // Publishing
    pub const PUBLISH_ARTIFACT: &str = "publish_artifact";
    pub const PUBLISH_FOLDER: &str = "publish_folder";

    // Registry
    pub const LOOKUP: &str = "lookup";
    pub const REGISTER: &str = "register";
    pub const REBIND: &str = "rebind";
    pub const REMOVE: &str = "remove";

    // Messaging
    pub const SEND_MESSAGE: &str = "send";
    pub const AWAIT_RESULT: &str = "await_result";
    pub const DRY_RUN: &str = "dry_run";
}
