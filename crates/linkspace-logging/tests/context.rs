//! Identity context and correlation under concurrency

use std::sync::{Arc, Barrier};
use std::thread;

use linkspace_core::{Identity, KeypairWallet, Wallet};
use linkspace_logging::{CorrelationContext, IdentityContextGuard};

#[test]
fn test_contexts_are_per_thread() {
    const THREADS: usize = 16;
    const ITERATIONS: usize = 100;

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let identity = KeypairWallet::generate().identity().unwrap();
                barrier.wait();

                for _ in 0..ITERATIONS {
                    let _guard = IdentityContextGuard::new(&identity);
                    assert_eq!(
                        IdentityContextGuard::current_identity(),
                        Some(identity.short_id())
                    );
                }
                assert!(IdentityContextGuard::current().is_none());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_rapid_context_switching() {
    let alice = Identity::new("alice-address").unwrap();
    let bob = Identity::new("bob-address").unwrap();

    for i in 0..1_000 {
        let current = if i % 2 == 0 { &alice } else { &bob };
        let _guard = IdentityContextGuard::new(current);
        assert_eq!(
            IdentityContextGuard::current_identity(),
            Some(current.short_id())
        );
    }
    assert!(IdentityContextGuard::current().is_none());
}

#[test]
fn test_long_step_chain_shares_trace() {
    let root = CorrelationContext::new_root();
    let mut ctx = root.clone();
    for step in 1..=500 {
        ctx = ctx.child().with_message_id(format!("msg-{}", step));
        assert_eq!(ctx.depth, step);
    }
    assert_eq!(ctx.trace_id, root.trace_id);
    assert_eq!(ctx.message_id.as_deref(), Some("msg-500"));
}

#[test]
fn test_context_serializes() {
    let ctx = CorrelationContext::new_root().child().with_message_id("abc");
    let json = serde_json::to_string(&ctx).unwrap();
    let back: CorrelationContext = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ctx);
}
