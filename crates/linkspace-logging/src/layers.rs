//! Custom tracing layers

use tracing::{Subscriber, span};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use crate::context::{IdentityContextData, IdentityContextGuard};

/// Attaches the active identity context to every new span
///
/// The context is stored as an [`IdentityContextExtension`] on the span,
/// where other layers can read it.
#[derive(Debug, Default)]
pub struct IdentityContextLayer;

impl IdentityContextLayer {
    pub fn new() -> Self {
        Self
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct IdentityContextExtension {
    pub data: IdentityContextData,
}

impl<S> Layer<S> for IdentityContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        if let (Some(span), Some(data)) = (ctx.span(id), IdentityContextGuard::current()) {
            span.extensions_mut().insert(IdentityContextExtension { data });
        }
    }
}

/// JSONL formatting layer
///
/// Each event becomes one flat JSON object per line with the current span.
/// `verbose` adds the span list and source location.
pub fn jsonl_layer<S, W>(writer: W, verbose: bool) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(verbose)
        .flatten_event(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use linkspace_core::Identity;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_span_gets_identity_extension() {
        let subscriber = tracing_subscriber::registry()
            .with(IdentityContextLayer::new())
            .with(CheckLayer);

        tracing::subscriber::with_default(subscriber, || {
            let _guard = IdentityContextGuard::new(&Identity::new("alice-address").unwrap());
            let span = tracing::info_span!("claim");
            let _entered = span.enter();
        });
    }

    struct CheckLayer;

    impl<S> Layer<S> for CheckLayer
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
            let span = ctx.span(id).unwrap();
            let extensions = span.extensions();
            let ext = extensions.get::<IdentityContextExtension>().unwrap();
            assert_eq!(ext.data.identity, "alice-ad");
        }
    }

    #[test]
    fn test_jsonl_layer_writes_one_object_per_line() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry().with(jsonl_layer(buffer.clone(), false));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(name = "john-doe", "Name registered");
            tracing::warn!(attempt = 2, "Retrying");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["name"], "john-doe");
        assert_eq!(lines[0]["message"], "Name registered");
        assert_eq!(lines[1]["attempt"], 2);
        assert!(lines[0].get("filename").is_none());
    }
}
