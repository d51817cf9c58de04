//! # Debounced Explanations
//!
//! While the user drags the moon the phase bucket can change many times a
//! second. An explanation is fetched only once the bucket has stayed put for the
//! configured delay.
//!
//! Each scheduled request owns a [`CancellationToken`]. Scheduling a different
//! bucket cancels the previous token, which stops the task during its delay or
//! while its request is still in flight, so a stale explanation is never
//! delivered. Dropping the scheduler cancels whatever is pending.

use crate::phase::PhaseBucket;
use crate::tutor::Tutor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Progress of a scheduled explanation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplanationEvent {
    /// The delay elapsed and the request was sent
    Loading(PhaseBucket),
    /// The tutor answered
    Ready { phase: PhaseBucket, text: String },
}

/// Receiving half of a cancellation signal.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

/// Sending half of a cancellation signal. Dropping it also cancels.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked handle/token pair.
pub fn cancellation_pair() -> (CancelHandle, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancellationToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        // No receivers left means the task is already gone
        let _ = self.tx.send(true);
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the handle cancels or is dropped.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

struct PendingRequest {
    phase: PhaseBucket,
    handle: CancelHandle,
    task: JoinHandle<()>,
}

/// Schedules one explanation fetch per phase-bucket change.
pub struct ExplanationScheduler<T> {
    tutor: Arc<T>,
    delay: Duration,
    events: mpsc::UnboundedSender<ExplanationEvent>,
    pending: Option<PendingRequest>,
    scheduled: Option<PhaseBucket>,
}

impl<T: Tutor + 'static> ExplanationScheduler<T> {
    /// Create a scheduler and the stream its events arrive on.
    pub fn new(
        tutor: Arc<T>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ExplanationEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tutor,
            delay,
            events,
            pending: None,
            scheduled: None,
        };
        (scheduler, rx)
    }

    /// Report the current bucket. Schedules a fetch when it differs from the
    /// last scheduled one; returns whether a fetch was scheduled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_phase(&mut self, phase: PhaseBucket) -> bool {
        if self.scheduled == Some(phase) {
            return false;
        }
        self.cancel();
        self.scheduled = Some(phase);

        let (handle, mut token) = cancellation_pair();
        let tutor = Arc::clone(&self.tutor);
        let events = self.events.clone();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("explanation for {} cancelled before sending", phase);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let _ = events.send(ExplanationEvent::Loading(phase));
            log::info!("Fetching explanation for {}", phase);

            let text = tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("explanation for {} cancelled in flight", phase);
                    return;
                }
                text = tutor.explain(phase.short_name()) => text,
            };
            // Both branches may be ready in the same poll
            if token.is_cancelled() {
                log::debug!("explanation for {} cancelled on arrival", phase);
                return;
            }
            let _ = events.send(ExplanationEvent::Ready { phase, text });
        });

        self.pending = Some(PendingRequest {
            phase,
            handle,
            task,
        });
        true
    }

    /// Cancel the pending fetch, if any. The next `on_phase` always schedules.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.task.is_finished() {
                log::debug!("cancelling explanation for {}", pending.phase);
            }
            pending.handle.cancel();
        }
        self.scheduled = None;
    }

    /// Let the pending fetch run to completion, then drop the scheduler.
    ///
    /// Every event it produced is buffered in the receiver, which yields
    /// `None` once they have been read.
    pub async fn finish(mut self) {
        if let Some(PendingRequest {
            phase,
            handle,
            task,
        }) = self.pending.take()
        {
            if let Err(e) = task.await {
                log::error!("explanation task for {} failed: {}", phase, e);
            }
            drop(handle);
        }
    }

    /// Bucket of the fetch still waiting or in flight.
    pub fn pending_phase(&self) -> Option<PhaseBucket> {
        self.pending
            .as_ref()
            .filter(|p| !p.task.is_finished())
            .map(|p| p.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizQuestion;
    use std::sync::Mutex;
    use tokio::sync::mpsc::error::TryRecvError;

    #[derive(Default)]
    struct RecordingTutor {
        topics: Mutex<Vec<String>>,
    }

    impl Tutor for RecordingTutor {
        async fn explain(&self, topic: &str) -> String {
            self.topics.lock().unwrap().push(topic.to_string());
            format!("about {topic}")
        }

        async fn quiz(&self, _count: usize) -> Vec<QuizQuestion> {
            Vec::new()
        }

        async fn chat(&self, message: &str) -> String {
            message.to_string()
        }
    }

    const DELAY: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let tutor = Arc::new(RecordingTutor::default());
        let (mut scheduler, mut rx) = ExplanationScheduler::new(Arc::clone(&tutor), DELAY);

        assert!(scheduler.on_phase(PhaseBucket::Full));
        assert_eq!(scheduler.pending_phase(), Some(PhaseBucket::Full));

        assert_eq!(rx.recv().await, Some(ExplanationEvent::Loading(PhaseBucket::Full)));
        assert_eq!(
            rx.recv().await,
            Some(ExplanationEvent::Ready {
                phase: PhaseBucket::Full,
                text: "about 満月".to_string()
            })
        );
        assert_eq!(*tutor.topics.lock().unwrap(), vec!["満月".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_before_delay_cancels_previous() {
        let tutor = Arc::new(RecordingTutor::default());
        let (mut scheduler, mut rx) = ExplanationScheduler::new(Arc::clone(&tutor), DELAY);

        scheduler.on_phase(PhaseBucket::Full);
        tokio::time::sleep(Duration::from_millis(500)).await;
        scheduler.on_phase(PhaseBucket::New);

        assert_eq!(rx.recv().await, Some(ExplanationEvent::Loading(PhaseBucket::New)));
        assert!(matches!(
            rx.recv().await,
            Some(ExplanationEvent::Ready { phase: PhaseBucket::New, .. })
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(*tutor.topics.lock().unwrap(), vec!["新月".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_phase_is_not_rescheduled() {
        let tutor = Arc::new(RecordingTutor::default());
        let (mut scheduler, mut rx) = ExplanationScheduler::new(Arc::clone(&tutor), DELAY);

        assert!(scheduler.on_phase(PhaseBucket::FirstQuarter));
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!scheduler.on_phase(PhaseBucket::FirstQuarter));

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        assert!(!scheduler.on_phase(PhaseBucket::FirstQuarter));
        assert_eq!(tutor.topics.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_delivers_last_explanation() {
        let tutor = Arc::new(RecordingTutor::default());
        let (mut scheduler, mut rx) = ExplanationScheduler::new(Arc::clone(&tutor), DELAY);

        scheduler.on_phase(PhaseBucket::WaxingGibbous);
        scheduler.on_phase(PhaseBucket::Full);
        scheduler.finish().await;

        assert_eq!(rx.recv().await, Some(ExplanationEvent::Loading(PhaseBucket::Full)));
        assert_eq!(
            rx.recv().await,
            Some(ExplanationEvent::Ready {
                phase: PhaseBucket::Full,
                text: "about 満月".to_string()
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_without_pending_closes_stream() {
        let tutor = Arc::new(RecordingTutor::default());
        let (scheduler, mut rx) = ExplanationScheduler::new(tutor, DELAY);
        scheduler.finish().await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let tutor = Arc::new(RecordingTutor::default());
        let (mut scheduler, mut rx) = ExplanationScheduler::new(Arc::clone(&tutor), DELAY);

        scheduler.on_phase(PhaseBucket::WaningCrescent);
        drop(scheduler);

        // All senders are gone once the cancelled task exits
        assert_eq!(rx.recv().await, None);
        assert!(tutor.topics.lock().unwrap().is_empty());
    }

    #[test]
    fn test_token_observes_cancel_and_drop() {
        let (handle, token) = cancellation_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());

        let (handle, token) = cancellation_pair();
        drop(handle);
        assert!(token.is_cancelled());
    }
}
