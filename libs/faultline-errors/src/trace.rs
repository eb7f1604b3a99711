//! Correlation id generation for problem responses.

use uuid::Uuid;

/// Source of fresh correlation ids.
///
/// Implementations must be safe to call from many requests at once. Any
/// `Fn() -> String` closure qualifies, which keeps tests deterministic.
pub trait TraceIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> TraceIdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random 128-bit ids (UUID v4) rendered in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTraceIds;

impl TraceIdGenerator for RandomTraceIds {
    fn generate(&self) -> String {
        new_trace_id()
    }
}

/// Fresh random trace id.
#[must_use]
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}
