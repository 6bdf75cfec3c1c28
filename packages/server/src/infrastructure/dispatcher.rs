//! Background job dispatcher running jobs on a tokio worker task.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::domain::{DispatchError, Job, JobDispatcher, JobError, JobHandler};

/// How many times a failing job is attempted before it is dropped.
pub const MAX_JOB_ATTEMPTS: u32 = 3;

/// Queues jobs on an unbounded channel drained by a single worker.
///
/// `dispatch` never waits on the worker.
pub struct TokioJobDispatcher {
    sender: mpsc::UnboundedSender<Job>,
}

impl TokioJobDispatcher {
    /// Start the worker and return the dispatcher feeding it.
    ///
    /// The worker exits once every dispatcher clone is dropped.
    pub fn spawn(handler: Arc<dyn JobHandler>) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                run_with_retry(handler.as_ref(), &job).await;
            }
            debug!("Job worker stopped");
        });
        (Self { sender }, worker)
    }
}

impl JobDispatcher for TokioJobDispatcher {
    fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
        self.sender.send(job).map_err(|_| DispatchError::QueueClosed)
    }
}

async fn run_with_retry(handler: &dyn JobHandler, job: &Job) {
    for attempt in 1..=MAX_JOB_ATTEMPTS {
        match handler.handle(job).await {
            Ok(()) => return,
            Err(e) if attempt < MAX_JOB_ATTEMPTS => {
                warn!(?job, attempt, error = %e, "Job failed, retrying");
            }
            Err(e) => {
                error!(?job, attempt, error = %e, "Job failed, giving up");
            }
        }
    }
}

/// Records message activity in the log.
pub struct ActivityLogHandler;

#[async_trait]
impl JobHandler for ActivityLogHandler {
    async fn handle(&self, job: &Job) -> Result<(), JobError> {
        match job {
            Job::MessageCreated {
                message_id,
                author,
                recipient,
                characters,
            } => {
                info!(
                    message_id = %message_id,
                    author = %author,
                    recipient = %recipient,
                    characters,
                    "Message created"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, UserId};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyHandler {
        calls: AtomicU32,
        failures: u32,
    }

    #[async_trait]
    impl JobHandler for FlakyHandler {
        async fn handle(&self, _job: &Job) -> Result<(), JobError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(JobError::Failed(format!("attempt {call}")));
            }
            Ok(())
        }
    }

    fn job() -> Job {
        Job::MessageCreated {
            message_id: MessageId::new(1).unwrap(),
            author: UserId::new(1).unwrap(),
            recipient: UserId::new(2).unwrap(),
            characters: 2,
        }
    }

    #[tokio::test]
    async fn test_failed_job_is_retried() {
        // テスト項目: 失敗したジョブは再試行される
        // given (前提条件): 2 回失敗するハンドラ
        let handler = Arc::new(FlakyHandler {
            calls: AtomicU32::new(0),
            failures: 2,
        });
        let (dispatcher, worker) = TokioJobDispatcher::spawn(handler.clone());

        // when (操作):
        dispatcher.dispatch(job()).unwrap();
        drop(dispatcher);
        worker.await.unwrap();

        // then (期待する結果):
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_job_gives_up_after_max_attempts() {
        // テスト項目: 上限回数を超えて再試行しない
        let handler = Arc::new(FlakyHandler {
            calls: AtomicU32::new(0),
            failures: u32::MAX,
        });
        let (dispatcher, worker) = TokioJobDispatcher::spawn(handler.clone());

        dispatcher.dispatch(job()).unwrap();
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(handler.calls.load(Ordering::SeqCst), MAX_JOB_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_dispatch_after_worker_stopped_fails() {
        // テスト項目: ワーカー停止後の投入は QueueClosed になる
        let (dispatcher, worker) = TokioJobDispatcher::spawn(Arc::new(ActivityLogHandler));
        worker.abort();
        let _ = worker.await;

        assert_eq!(dispatcher.dispatch(job()), Err(DispatchError::QueueClosed));
    }
}
