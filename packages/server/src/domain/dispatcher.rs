//! Background job dispatch port.

use async_trait::async_trait;
use thiserror::Error;

use super::value_object::{MessageId, UserId};

/// Work offloaded from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// A message was persisted and its notification published
    MessageCreated {
        message_id: MessageId,
        author: UserId,
        recipient: UserId,
        characters: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Job queue is closed")]
    QueueClosed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("Job failed: {0}")]
    Failed(String),
}

/// Fire-and-forget job submission. `dispatch` must return without waiting
/// for the job to run.
#[cfg_attr(test, mockall::automock)]
pub trait JobDispatcher: Send + Sync {
    fn dispatch(&self, job: Job) -> Result<(), DispatchError>;
}

/// Executes dispatched jobs. May be invoked more than once for the same job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> Result<(), JobError>;
}
