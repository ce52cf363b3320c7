use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;

use crate::index::Index;
use crate::record::LiveQueryRecord;
use crate::result::LiveResult;
use crate::schema::ExecutableSchema;

/// A live query's sequence of results (spec.md §3 "Subscriber Contract").
///
/// A pull-based `Stream` rather than a push-based callback: this is how
/// the teacher's own async GraphQL surfaces a subscription's results, and
/// it gives backpressure for free — a subscriber that is not polling
/// simply does not receive the next coalesced result until it asks.
pub struct LiveQueryStream<S: ExecutableSchema> {
    receiver: tokio::sync::mpsc::Receiver<LiveResult>,
    record: Arc<LiveQueryRecord<S>>,
    index: Arc<Index<S>>,
}

impl<S: ExecutableSchema> LiveQueryStream<S> {
    pub(crate) fn new(receiver: tokio::sync::mpsc::Receiver<LiveResult>, record: Arc<LiveQueryRecord<S>>, index: Arc<Index<S>>) -> Self {
        Self { receiver, record, index }
    }

    /// Unsubscribe explicitly. Equivalent to dropping the stream, but
    /// lets callers do so without losing ownership of other bindings held
    /// alongside it.
    pub fn stop(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if !self.record.terminated.swap(true, Ordering::SeqCst) {
            self.index.clear(&self.record);
        }
        self.receiver.close();
    }
}

impl<S: ExecutableSchema> Stream for LiveQueryStream<S> {
    type Item = LiveResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<S: ExecutableSchema> Drop for LiveQueryStream<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
