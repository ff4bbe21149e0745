//! Identity context injection
//!
//! Thread-local storage for the acting identity, so spans opened while a
//! [`IdentityContextGuard`] is alive can be attributed to it.

use std::cell::RefCell;

use linkspace_core::Identity;
use uuid::Uuid;

/// Context stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContextData {
    /// Short form of the acting identity
    pub identity: String,
    /// Unique id for this session
    pub instance_id: Uuid,
}

thread_local! {
    static IDENTITY_CONTEXT: RefCell<Option<IdentityContextData>> = const { RefCell::new(None) };
}

/// RAII guard for the identity context
///
/// Sets the context for the current thread on creation and restores the
/// previous one on drop. Only hold it across synchronous code: an async
/// task may resume on a different thread.
///
/// ```ignore
/// let _guard = IdentityContextGuard::new(&identity);
/// tracing::info!("Building artifact");
/// ```
pub struct IdentityContextGuard {
    previous: Option<IdentityContextData>,
}

impl IdentityContextGuard {
    /// Set `identity` as the context with a fresh instance id
    pub fn new(identity: &Identity) -> Self {
        Self::with_instance_id(identity, Uuid::new_v4())
    }

    /// Set `identity` as the context, keeping a known session id
    pub fn with_instance_id(identity: &Identity, instance_id: Uuid) -> Self {
        let previous = IDENTITY_CONTEXT.with(|ctx| ctx.borrow().clone());
        let data = IdentityContextData {
            identity: identity.short_id(),
            instance_id,
        };
        IDENTITY_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(data));
        Self { previous }
    }

    pub fn current() -> Option<IdentityContextData> {
        IDENTITY_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    pub fn current_identity() -> Option<String> {
        Self::current().map(|ctx| ctx.identity)
    }

    pub fn current_instance_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.instance_id)
    }
}

impl Drop for IdentityContextGuard {
    fn drop(&mut self) {
        IDENTITY_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}

/// Run a block with an identity context
///
/// ```ignore
/// with_identity_context!(&identity, {
///     tracing::info!("Validating name");
/// });
/// ```
#[macro_export]
macro_rules! with_identity_context {
    ($identity:expr, $body:block) => {{
        let _guard = $crate::context::IdentityContextGuard::new($identity);
        $body
    }};
}
