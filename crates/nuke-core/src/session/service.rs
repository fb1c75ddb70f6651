//! Couples the registry with spawned delete loops

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::deletion::{DeletionReport, DeletionRequest, DeletionWorker};
use crate::platform::ReportSink;
use crate::session::registry::SessionRegistry;
use crate::types::ChannelId;
use crate::Result;

/// Starts and stops deletion loops, one per channel at most
#[derive(Clone)]
pub struct DeletionService {
    registry: Arc<SessionRegistry>,
    worker: DeletionWorker,
    sink: Arc<dyn ReportSink>,
    tasks: TaskTracker,
}

impl DeletionService {
    pub fn new(worker: DeletionWorker, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            worker,
            sink,
            tasks: TaskTracker::new(),
        }
    }

    /// Register a session for the request's channel and spawn its loop.
    ///
    /// Returns without waiting for the loop. The report goes to the sink;
    /// the handle resolves to the same report.
    pub fn start(&self, request: DeletionRequest) -> Result<JoinHandle<DeletionReport>> {
        let ticket = self
            .registry
            .start(request.channel_id, request.requested_by)?;

        let registry = Arc::clone(&self.registry);
        let worker = self.worker.clone();
        let sink = Arc::clone(&self.sink);

        Ok(self.tasks.spawn(async move {
            // A panic inside the loop must still free the channel and yield a report
            let signal = ticket.signal();
            let run = {
                let request = request.clone();
                tokio::spawn(async move { worker.run(&request, &signal).await })
            };
            let report = match run.await {
                Ok(report) => report,
                Err(e) => {
                    error!(
                        "Deletion loop in channel {} ended abnormally: {}",
                        request.channel_id, e
                    );
                    DeletionReport::aborted(&request, e.to_string())
                }
            };
            registry.finish(&ticket);

            if let Err(e) = sink.deliver(&report).await {
                warn!(
                    "Failed to deliver deletion report for channel {}: {}",
                    report.channel_id, e
                );
            }
            report
        }))
    }

    /// Cancel the running deletion in a channel
    pub fn stop(&self, channel_id: ChannelId) -> bool {
        self.registry.stop(channel_id)
    }

    pub fn is_active(&self, channel_id: ChannelId) -> bool {
        self.registry.is_active(channel_id)
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Cancel every loop and wait up to `grace` for their reports
    pub async fn shutdown(&self, grace: Duration) {
        let stopped = self.registry.stop_all();
        self.tasks.close();
        info!("Stopping {} running deletion(s)", stopped);

        if tokio::time::timeout(grace, self.tasks.wait()).await.is_err() {
            warn!(
                "{} deletion task(s) still running after {:?}",
                self.tasks.len(),
                grace
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::{DeletionOutcome, Pacing};
    use crate::testing::{FakeChannel, RecordingSink};
    use crate::types::{MessageId, UserId};
    use crate::Error;

    const CHANNEL: ChannelId = ChannelId::new(77);
    const USER: UserId = UserId::new(3);

    fn service(channel: &Arc<FakeChannel>, sink: &Arc<RecordingSink>) -> DeletionService {
        let worker = DeletionWorker::new(channel.clone());
        DeletionService::new(worker, sink.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion_delivers_report() {
        let channel = Arc::new(FakeChannel::with_messages(150));
        let sink = Arc::new(RecordingSink::default());
        let service = service(&channel, &sink);

        let handle = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        assert!(service.is_active(CHANNEL));

        let report = handle.await.unwrap();
        assert_eq!(report.deleted, 150);
        assert_eq!(report.outcome, DeletionOutcome::Completed);
        assert!(!service.is_active(CHANNEL));

        let delivered = sink.reports();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].deleted, 150);
        assert_eq!(delivered[0].requested_by, USER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected_while_running() {
        let channel = Arc::new(FakeChannel::with_messages(20));
        let sink = Arc::new(RecordingSink::default());
        let service = service(&channel, &sink);

        let handle = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        let second = service.start(DeletionRequest::all(CHANNEL, USER));
        assert!(matches!(second, Err(Error::AlreadyRunning(_))));

        let report = handle.await.unwrap();
        assert_eq!(report.deleted, 20);
        assert_eq!(sink.reports().len(), 1);

        // Free again once the first loop is done
        let again = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        assert_eq!(again.await.unwrap().deleted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_loop_without_further_fetches() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let sink = Arc::new(RecordingSink::default());
        let service = service(&channel, &sink);

        let handle = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(service.stop(CHANNEL));
        assert!(!service.stop(CHANNEL));

        let report = handle.await.unwrap();
        assert_eq!(report.outcome, DeletionOutcome::Cancelled);
        assert!(report.deleted > 0);
        assert!(report.deleted < 100);
        assert_eq!(channel.fetch_count(), 1);
        assert_eq!(sink.reports().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_is_not_cancelled_by_old_loop() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let sink = Arc::new(RecordingSink::default());
        let worker = DeletionWorker::new(channel.clone()).with_pacing(Pacing::new(
            Duration::from_secs(1),
            Duration::ZERO,
        ));
        let service = DeletionService::new(worker, sink.clone());

        let old = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        assert!(service.stop(CHANNEL));
        let new = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();

        let old_report = old.await.unwrap();
        assert_eq!(old_report.outcome, DeletionOutcome::Cancelled);
        assert!(service.is_active(CHANNEL));

        let new_report = new.await.unwrap();
        assert_eq!(new_report.outcome, DeletionOutcome::Completed);
        assert!(!service.is_active(CHANNEL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_failure_does_not_lose_report() {
        let channel = Arc::new(FakeChannel::with_messages(5));
        let sink = Arc::new(RecordingSink::failing());
        let service = service(&channel, &sink);

        let report = service
            .start(DeletionRequest::all(CHANNEL, USER))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(report.deleted, 5);
        assert_eq!(sink.reports().len(), 1);
        assert!(!service.is_active(CHANNEL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_panic_frees_channel_and_reports() {
        let channel = Arc::new(FakeChannel::with_messages(5));
        channel.panic_on_delete(MessageId::new(3));
        let sink = Arc::new(RecordingSink::default());
        let service = service(&channel, &sink);

        let report = service
            .start(DeletionRequest::all(CHANNEL, USER))
            .unwrap()
            .await
            .unwrap();

        assert!(matches!(report.outcome, DeletionOutcome::Aborted(_)));
        assert!(!service.is_active(CHANNEL));
        assert_eq!(sink.reports().len(), 1);
        assert_eq!(sink.reports()[0].requested_by, USER);

        // The channel accepts a new run afterwards
        let again = service.start(DeletionRequest::all(CHANNEL, USER)).unwrap();
        assert_eq!(again.await.unwrap().outcome, DeletionOutcome::Completed);
        assert_eq!(channel.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_everything() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let sink = Arc::new(RecordingSink::default());
        let service = service(&channel, &sink);

        let a = service.start(DeletionRequest::all(ChannelId::new(1), USER)).unwrap();
        let b = service.start(DeletionRequest::all(ChannelId::new(2), USER)).unwrap();
        assert_eq!(service.active_count(), 2);

        service.shutdown(Duration::from_secs(5)).await;

        assert_eq!(service.active_count(), 0);
        assert_eq!(a.await.unwrap().outcome, DeletionOutcome::Cancelled);
        assert_eq!(b.await.unwrap().outcome, DeletionOutcome::Cancelled);
        assert_eq!(sink.reports().len(), 2);
    }
}
