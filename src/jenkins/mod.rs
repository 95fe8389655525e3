//! Jenkins Capability Module
//!
//! [`JenkinsApi`] is the set of remote operations the bridge needs. Two HTTP
//! implementations exist: [`RichClient`] (primary path) and [`RawClient`]
//! (secondary path). [`ResilientClient`] tries the first and falls back to the
//! second.

pub mod confirm;
pub mod endpoints;
#[cfg(test)]
pub(crate) mod fake;
mod http;
mod raw;
mod resilient;
mod rich;
pub mod types;
pub mod xml;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RemoteError;

pub use confirm::{trigger_and_confirm, TriggerOutcome, WaitOptions};
pub use raw::RawClient;
pub use resilient::ResilientClient;
pub use rich::RichClient;
pub use types::{BuildInfo, JobInfo, JobSummary, NodeInfo, QueueItem, WhoAmI};

/// Result type at the capability boundary.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

// == Jenkins Api ==
/// Remote operations against one Jenkins server.
///
/// Job names may contain `/` to address jobs inside folders.
#[async_trait]
pub trait JenkinsApi: Send + Sync {
    /// Top-level jobs.
    async fn list_jobs(&self) -> RemoteResult<Vec<JobSummary>>;

    async fn job_info(&self, job: &str) -> RemoteResult<JobInfo>;

    async fn build_info(&self, job: &str, number: u64) -> RemoteResult<BuildInfo>;

    /// Full plain-text console log of a build.
    async fn console_text(&self, job: &str, number: u64) -> RemoteResult<String>;

    /// Queues a build, with parameters when `params` is non-empty.
    /// Returns the queue id when the server reports one.
    async fn trigger_build(&self, job: &str, params: &Map<String, Value>)
        -> RemoteResult<Option<u64>>;

    async fn stop_build(&self, job: &str, number: u64) -> RemoteResult<()>;

    async fn create_job(&self, job: &str, config_xml: &str) -> RemoteResult<()>;

    async fn update_job_config(&self, job: &str, config_xml: &str) -> RemoteResult<()>;

    async fn delete_job(&self, job: &str) -> RemoteResult<()>;

    /// `new_name` is the new leaf name; the job stays in its folder.
    async fn rename_job(&self, job: &str, new_name: &str) -> RemoteResult<()>;

    async fn enable_job(&self, job: &str) -> RemoteResult<()>;

    async fn disable_job(&self, job: &str) -> RemoteResult<()>;

    /// Raw `config.xml`.
    async fn job_config(&self, job: &str) -> RemoteResult<String>;

    async fn list_nodes(&self) -> RemoteResult<Vec<NodeInfo>>;

    async fn node_info(&self, node: &str) -> RemoteResult<NodeInfo>;

    async fn queue_items(&self) -> RemoteResult<Vec<QueueItem>>;

    /// Identity of the authenticated user.
    async fn whoami(&self) -> RemoteResult<WhoAmI>;

    /// Value of the `X-Jenkins` header, `"Unknown"` when absent.
    async fn server_version(&self) -> RemoteResult<String>;

    /// `lastBuild`, else `lastCompletedBuild`; `None` for a job never built.
    async fn last_build_number(&self, job: &str) -> RemoteResult<Option<u64>> {
        Ok(self.job_info(job).await?.last_build_number())
    }
}
