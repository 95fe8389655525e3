//! Secondary call path: plain REST endpoints with separate connect and read
//! timeouts and no crumb.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::info;
use url::Url;

use super::endpoints::split_parent;
use super::http::{self, HttpCore};
use super::types::{JobList, NodeList, QueueList};
use super::{BuildInfo, JenkinsApi, JobInfo, JobSummary, NodeInfo, QueueItem, RemoteResult, WhoAmI};
use crate::config::JenkinsConfig;
use crate::error::BridgeError;

#[derive(Debug, Clone)]
pub struct RawClient {
    http: HttpCore,
}

impl RawClient {
    pub fn new(config: &JenkinsConfig) -> Result<Self, BridgeError> {
        let builder = http::client_builder(config)
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout());
        Ok(Self {
            http: HttpCore::new(config, http::build_client(builder)?)?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> RemoteResult<T> {
        self.http.json(self.http.request(Method::GET, url)).await
    }

    async fn post_empty(&self, url: Url) -> RemoteResult<()> {
        self.http.send(self.http.request(Method::POST, url)).await?;
        Ok(())
    }
}

#[async_trait]
impl JenkinsApi for RawClient {
    async fn list_jobs(&self) -> RemoteResult<Vec<JobSummary>> {
        let list: JobList = self
            .get_json(self.http.endpoints().root(&["api", "json"]))
            .await?;
        Ok(list.jobs)
    }

    async fn job_info(&self, job: &str) -> RemoteResult<JobInfo> {
        self.get_json(self.http.endpoints().job(job, &["api", "json"]))
            .await
    }

    async fn build_info(&self, job: &str, number: u64) -> RemoteResult<BuildInfo> {
        self.get_json(self.http.endpoints().build(job, number, &["api", "json"]))
            .await
    }

    async fn console_text(&self, job: &str, number: u64) -> RemoteResult<String> {
        let url = self.http.endpoints().build(job, number, &["consoleText"]);
        self.http.text(self.http.request(Method::GET, url)).await
    }

    async fn trigger_build(
        &self,
        job: &str,
        params: &Map<String, Value>,
    ) -> RemoteResult<Option<u64>> {
        let request = if params.is_empty() {
            self.http
                .request(Method::POST, self.http.endpoints().job(job, &["build"]))
        } else {
            self.http
                .request(
                    Method::POST,
                    self.http.endpoints().job(job, &["buildWithParameters"]),
                )
                .query(&http::parameter_pairs(params))
        };

        let response = self.http.send(request).await?;
        let queue_id = http::queue_id(&response);
        info!("Triggered build for {} (queue id {:?})", job, queue_id);
        Ok(queue_id)
    }

    async fn stop_build(&self, job: &str, number: u64) -> RemoteResult<()> {
        self.post_empty(self.http.endpoints().build(job, number, &["stop"]))
            .await?;
        info!("Stopped build {} #{}", job, number);
        Ok(())
    }

    async fn create_job(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let (_, leaf) = split_parent(job);
        let request = self
            .http
            .request(
                Method::POST,
                self.http.endpoints().parent(job, &["createItem"]),
            )
            .query(&[("name", leaf)]);
        self.http.send(http::with_xml(request, config_xml)).await?;
        info!("Created job: {}", job);
        Ok(())
    }

    async fn update_job_config(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let request = self
            .http
            .request(Method::POST, self.http.endpoints().job(job, &["config.xml"]));
        self.http.send(http::with_xml(request, config_xml)).await?;
        info!("Updated config for job: {}", job);
        Ok(())
    }

    async fn delete_job(&self, job: &str) -> RemoteResult<()> {
        self.post_empty(self.http.endpoints().job(job, &["doDelete"]))
            .await?;
        info!("Deleted job: {}", job);
        Ok(())
    }

    async fn rename_job(&self, job: &str, new_name: &str) -> RemoteResult<()> {
        let request = self
            .http
            .request(Method::POST, self.http.endpoints().job(job, &["doRename"]))
            .query(&[("newName", new_name)]);
        self.http.send(request).await?;
        info!("Renamed job: {} -> {}", job, new_name);
        Ok(())
    }

    async fn enable_job(&self, job: &str) -> RemoteResult<()> {
        self.post_empty(self.http.endpoints().job(job, &["enable"]))
            .await?;
        info!("Enabled job: {}", job);
        Ok(())
    }

    async fn disable_job(&self, job: &str) -> RemoteResult<()> {
        self.post_empty(self.http.endpoints().job(job, &["disable"]))
            .await?;
        info!("Disabled job: {}", job);
        Ok(())
    }

    async fn job_config(&self, job: &str) -> RemoteResult<String> {
        let url = self.http.endpoints().job(job, &["config.xml"]);
        self.http.text(self.http.request(Method::GET, url)).await
    }

    async fn list_nodes(&self) -> RemoteResult<Vec<NodeInfo>> {
        let list: NodeList = self
            .get_json(self.http.endpoints().root(&["computer", "api", "json"]))
            .await?;
        Ok(list.computer)
    }

    async fn node_info(&self, node: &str) -> RemoteResult<NodeInfo> {
        self.get_json(self.http.endpoints().node(node, &["api", "json"]))
            .await
    }

    async fn queue_items(&self) -> RemoteResult<Vec<QueueItem>> {
        let list: QueueList = self
            .get_json(self.http.endpoints().root(&["queue", "api", "json"]))
            .await?;
        Ok(list.items)
    }

    async fn whoami(&self) -> RemoteResult<WhoAmI> {
        self.get_json(self.http.endpoints().root(&["me", "api", "json"]))
            .await
    }

    async fn server_version(&self) -> RemoteResult<String> {
        let url = self.http.endpoints().root(&["api", "json"]);
        let response = self.http.send(self.http.request(Method::GET, url)).await?;
        Ok(http::jenkins_version(&response))
    }
}
