//! Primary/secondary fallback around every remote operation.
//!
//! The primary path is tried first; any failure is logged at debug and the
//! same operation is repeated on the secondary path, whose error (if any) is
//! returned unchanged. Mutations fall back too, so a primary failure after the
//! server applied the change can repeat it.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::{BuildInfo, JenkinsApi, JobInfo, JobSummary, NodeInfo, QueueItem, RemoteResult, WhoAmI};

pub struct ResilientClient {
    primary: Arc<dyn JenkinsApi>,
    secondary: Arc<dyn JenkinsApi>,
}

impl ResilientClient {
    pub fn new(primary: Arc<dyn JenkinsApi>, secondary: Arc<dyn JenkinsApi>) -> Self {
        Self { primary, secondary }
    }

    async fn attempt<T, P, S, SF>(&self, operation: &str, primary: P, secondary: S) -> RemoteResult<T>
    where
        P: Future<Output = RemoteResult<T>>,
        S: FnOnce() -> SF,
        SF: Future<Output = RemoteResult<T>>,
    {
        match primary.await {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("Primary path failed for {}, using secondary: {}", operation, e);
                secondary().await
            }
        }
    }
}

#[async_trait]
impl JenkinsApi for ResilientClient {
    async fn list_jobs(&self) -> RemoteResult<Vec<JobSummary>> {
        self.attempt("list_jobs", self.primary.list_jobs(), || {
            self.secondary.list_jobs()
        })
        .await
    }

    async fn job_info(&self, job: &str) -> RemoteResult<JobInfo> {
        self.attempt("job_info", self.primary.job_info(job), || {
            self.secondary.job_info(job)
        })
        .await
    }

    async fn build_info(&self, job: &str, number: u64) -> RemoteResult<BuildInfo> {
        self.attempt("build_info", self.primary.build_info(job, number), || {
            self.secondary.build_info(job, number)
        })
        .await
    }

    async fn console_text(&self, job: &str, number: u64) -> RemoteResult<String> {
        self.attempt("console_text", self.primary.console_text(job, number), || {
            self.secondary.console_text(job, number)
        })
        .await
    }

    async fn trigger_build(
        &self,
        job: &str,
        params: &Map<String, Value>,
    ) -> RemoteResult<Option<u64>> {
        self.attempt("trigger_build", self.primary.trigger_build(job, params), || {
            self.secondary.trigger_build(job, params)
        })
        .await
    }

    async fn stop_build(&self, job: &str, number: u64) -> RemoteResult<()> {
        self.attempt("stop_build", self.primary.stop_build(job, number), || {
            self.secondary.stop_build(job, number)
        })
        .await
    }

    async fn create_job(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        self.attempt("create_job", self.primary.create_job(job, config_xml), || {
            self.secondary.create_job(job, config_xml)
        })
        .await
    }

    async fn update_job_config(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        self.attempt(
            "update_job_config",
            self.primary.update_job_config(job, config_xml),
            || self.secondary.update_job_config(job, config_xml),
        )
        .await
    }

    async fn delete_job(&self, job: &str) -> RemoteResult<()> {
        self.attempt("delete_job", self.primary.delete_job(job), || {
            self.secondary.delete_job(job)
        })
        .await
    }

    async fn rename_job(&self, job: &str, new_name: &str) -> RemoteResult<()> {
        self.attempt("rename_job", self.primary.rename_job(job, new_name), || {
            self.secondary.rename_job(job, new_name)
        })
        .await
    }

    async fn enable_job(&self, job: &str) -> RemoteResult<()> {
        self.attempt("enable_job", self.primary.enable_job(job), || {
            self.secondary.enable_job(job)
        })
        .await
    }

    async fn disable_job(&self, job: &str) -> RemoteResult<()> {
        self.attempt("disable_job", self.primary.disable_job(job), || {
            self.secondary.disable_job(job)
        })
        .await
    }

    async fn job_config(&self, job: &str) -> RemoteResult<String> {
        self.attempt("job_config", self.primary.job_config(job), || {
            self.secondary.job_config(job)
        })
        .await
    }

    async fn list_nodes(&self) -> RemoteResult<Vec<NodeInfo>> {
        self.attempt("list_nodes", self.primary.list_nodes(), || {
            self.secondary.list_nodes()
        })
        .await
    }

    async fn node_info(&self, node: &str) -> RemoteResult<NodeInfo> {
        self.attempt("node_info", self.primary.node_info(node), || {
            self.secondary.node_info(node)
        })
        .await
    }

    async fn queue_items(&self) -> RemoteResult<Vec<QueueItem>> {
        self.attempt("queue_items", self.primary.queue_items(), || {
            self.secondary.queue_items()
        })
        .await
    }

    async fn whoami(&self) -> RemoteResult<WhoAmI> {
        self.attempt("whoami", self.primary.whoami(), || self.secondary.whoami())
            .await
    }

    async fn server_version(&self) -> RemoteResult<String> {
        self.attempt("server_version", self.primary.server_version(), || {
            self.secondary.server_version()
        })
        .await
    }
}
