//! A `tracing` layer that captures events and closed spans for assertions.
//!
//! Install it on a [`tracing_subscriber::Registry`] with
//! [`tracing::subscriber::with_default`](::tracing::subscriber::with_default)
//! and inspect what the sweep emitted afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use ::tracing::field::{Field, Visit};
use ::tracing::span::{Attributes, Id, Record};
use ::tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Captured event with its level and stringified fields.
///
/// The event message is stored under the `message` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Level the event was emitted at.
    pub level: Level,
    /// Stringified structured fields, including `message`.
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Returns the value recorded for `name`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the event message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }
}

/// Captured span, recorded when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSpan {
    /// Span name from the callsite metadata.
    pub name: String,
    /// Fields recorded at creation or later through `Span::record`.
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct Captured {
    events: Vec<CapturedEvent>,
    spans: Vec<CapturedSpan>,
}

/// Layer recording every event and every closed span.
///
/// Clones share the same storage, so keep one handle for assertions and hand
/// another to the subscriber.
///
/// # Examples
/// ```
/// use kmsweep_test_support::tracing::RecordingLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let layer = RecordingLayer::default();
/// let subscriber = tracing_subscriber::registry().with(layer.clone());
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::warn!(clusters = 7, "invocation failed");
/// });
/// let warnings = layer.events_at(tracing::Level::WARN);
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].field("clusters"), Some("7"));
/// ```
#[derive(Clone, Default)]
pub struct RecordingLayer {
    captured: Arc<Mutex<Captured>>,
}

impl RecordingLayer {
    /// Returns every captured event in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().events.clone()
    }

    /// Returns the captured events emitted at exactly `level`.
    #[must_use]
    pub fn events_at(&self, level: Level) -> Vec<CapturedEvent> {
        self.lock()
            .events
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }

    /// Returns every closed span in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.lock().spans.clone()
    }

    /// Returns the first closed span called `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<CapturedSpan> {
        self.lock()
            .spans
            .iter()
            .find(|span| span.name == name)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().expect("recording layer lock poisoned")
    }
}

struct OpenSpan(CapturedSpan);

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut Stringify(&mut fields));
        span.extensions_mut().insert(OpenSpan(CapturedSpan {
            name: attrs.metadata().name().to_owned(),
            fields,
        }));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
            values.record(&mut Stringify(&mut open.0.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if let Some(open) = span.extensions_mut().remove::<OpenSpan>() {
            self.lock().spans.push(open.0);
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut Stringify(&mut fields));
        self.lock().events.push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}

struct Stringify<'a>(&'a mut HashMap<String, String>);

impl Visit for Stringify<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt;

    #[rstest]
    fn captures_recorded_span_fields() {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        ::tracing::subscriber::with_default(subscriber, || {
            let span = ::tracing::info_span!("outer", count = ::tracing::field::Empty);
            span.record("count", 3_u64);
        });
        let span = layer.span("outer").expect("span must be captured");
        assert_eq!(span.fields.get("count").map(String::as_str), Some("3"));
    }

    #[rstest]
    fn message_is_captured_as_plain_text() {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        ::tracing::subscriber::with_default(subscriber, || {
            ::tracing::info!(reason = "gone", "hello");
        });
        let events = layer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "hello");
        assert_eq!(events[0].field("reason"), Some("gone"));
    }
}
