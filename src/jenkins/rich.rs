//! Primary call path.
//!
//! One overall request timeout, `tree=` projections on every JSON read and a
//! CSRF crumb on every POST. Jenkins binds crumbs to the web session, so the
//! client keeps the session cookie between the crumb fetch and the POST.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use super::endpoints::split_parent;
use super::http::{self, HttpCore};
use super::types::{Crumb, JobList, NodeList, QueueList};
use super::{BuildInfo, JenkinsApi, JobInfo, JobSummary, NodeInfo, QueueItem, RemoteResult, WhoAmI};
use crate::config::JenkinsConfig;
use crate::error::BridgeError;

// == Projections ==
const JOBS_TREE: &str = "jobs[name,fullName,url,color]";
const JOB_TREE: &str = "name,fullName,url,description,buildable,color,inQueue,nextBuildNumber,\
lastBuild[number,url],lastCompletedBuild[number,url],lastSuccessfulBuild[number,url],\
lastFailedBuild[number,url],builds[number,url]";
const BUILD_TREE: &str = "number,url,result,building,duration,estimatedDuration,timestamp,\
displayName,changeSet[items[author[fullName],comment,msg]],\
changeSets[items[author[fullName],comment,msg]]";
const NODES_TREE: &str = "computer[displayName,description,offline,temporarilyOffline,\
offlineCauseReason,numExecutors,idle]";
const NODE_TREE: &str = "displayName,description,offline,temporarilyOffline,\
offlineCauseReason,numExecutors,idle";
const QUEUE_TREE: &str = "items[id,task[name,url],inQueueSince,why,blocked,buildable,stuck]";
const WHOAMI_TREE: &str = "id,fullName,absoluteUrl";

#[derive(Debug, Clone)]
pub struct RichClient {
    http: HttpCore,
}

impl RichClient {
    pub fn new(config: &JenkinsConfig) -> Result<Self, BridgeError> {
        let client = http::build_client(
            http::client_builder(config)
                .timeout(config.timeout())
                .cookie_store(true),
        )?;
        Ok(Self {
            http: HttpCore::new(config, client)?,
        })
    }

    fn get_tree(&self, url: Url, tree: &str) -> RequestBuilder {
        self.http.request(Method::GET, url).query(&[("tree", tree)])
    }

    /// A 404 from the issuer means CSRF protection is off.
    async fn crumb(&self) -> RemoteResult<Option<Crumb>> {
        let url = self.http.endpoints().root(&["crumbIssuer", "api", "json"]);
        match self.http.json::<Crumb>(self.http.request(Method::GET, url)).await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if e.status() == Some(404) => {
                debug!("Crumb issuer disabled");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn post(&self, url: Url) -> RemoteResult<RequestBuilder> {
        let request = self.http.request(Method::POST, url);
        Ok(match self.crumb().await? {
            Some(crumb) => request.header(crumb.crumb_request_field, crumb.crumb),
            None => request,
        })
    }
}

#[async_trait]
impl JenkinsApi for RichClient {
    async fn list_jobs(&self) -> RemoteResult<Vec<JobSummary>> {
        let url = self.http.endpoints().root(&["api", "json"]);
        let list: JobList = self.http.json(self.get_tree(url, JOBS_TREE)).await?;
        Ok(list.jobs)
    }

    async fn job_info(&self, job: &str) -> RemoteResult<JobInfo> {
        let url = self.http.endpoints().job(job, &["api", "json"]);
        self.http.json(self.get_tree(url, JOB_TREE)).await
    }

    async fn build_info(&self, job: &str, number: u64) -> RemoteResult<BuildInfo> {
        let url = self.http.endpoints().build(job, number, &["api", "json"]);
        self.http.json(self.get_tree(url, BUILD_TREE)).await
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
            self.post(self.http.endpoints().job(job, &["build"])).await?
        } else {
            self.post(self.http.endpoints().job(job, &["buildWithParameters"]))
                .await?
                .query(&http::parameter_pairs(params))
        };

        let response = self.http.send(request).await?;
        let queue_id = http::queue_id(&response);
        info!("Triggered build for {} (queue id {:?})", job, queue_id);
        Ok(queue_id)
    }

    async fn stop_build(&self, job: &str, number: u64) -> RemoteResult<()> {
        let url = self.http.endpoints().build(job, number, &["stop"]);
        self.http.send(self.post(url).await?).await?;
        info!("Stopped build {} #{}", job, number);
        Ok(())
    }

    /// Creates the job, then applies the same config once more so plugins that
    /// only read it on reconfigure pick it up.
    async fn create_job(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let (_, leaf) = split_parent(job);
        let url = self.http.endpoints().parent(job, &["createItem"]);
        let request = self.post(url).await?.query(&[("name", leaf)]);
        self.http.send(http::with_xml(request, config_xml)).await?;
        self.update_job_config(job, config_xml).await?;
        info!("Created job: {}", job);
        Ok(())
    }

    async fn update_job_config(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let url = self.http.endpoints().job(job, &["config.xml"]);
        let request = http::with_xml(self.post(url).await?, config_xml);
        self.http.send(request).await?;
        info!("Updated config for job: {}", job);
        Ok(())
    }

    async fn delete_job(&self, job: &str) -> RemoteResult<()> {
        let url = self.http.endpoints().job(job, &["doDelete"]);
        self.http.send(self.post(url).await?).await?;
        info!("Deleted job: {}", job);
        Ok(())
    }

    async fn rename_job(&self, job: &str, new_name: &str) -> RemoteResult<()> {
        let url = self.http.endpoints().job(job, &["doRename"]);
        let request = self.post(url).await?.query(&[("newName", new_name)]);
        self.http.send(request).await?;
        info!("Renamed job: {} -> {}", job, new_name);
        Ok(())
    }

    async fn enable_job(&self, job: &str) -> RemoteResult<()> {
        let url = self.http.endpoints().job(job, &["enable"]);
        self.http.send(self.post(url).await?).await?;
        info!("Enabled job: {}", job);
        Ok(())
    }

    async fn disable_job(&self, job: &str) -> RemoteResult<()> {
        let url = self.http.endpoints().job(job, &["disable"]);
        self.http.send(self.post(url).await?).await?;
        info!("Disabled job: {}", job);
        Ok(())
    }

    async fn job_config(&self, job: &str) -> RemoteResult<String> {
        let url = self.http.endpoints().job(job, &["config.xml"]);
        self.http.text(self.http.request(Method::GET, url)).await
    }

    async fn list_nodes(&self) -> RemoteResult<Vec<NodeInfo>> {
        let url = self.http.endpoints().root(&["computer", "api", "json"]);
        let list: NodeList = self.http.json(self.get_tree(url, NODES_TREE)).await?;
        Ok(list.computer)
    }

    async fn node_info(&self, node: &str) -> RemoteResult<NodeInfo> {
        let url = self.http.endpoints().node(node, &["api", "json"]);
        self.http.json(self.get_tree(url, NODE_TREE)).await
    }

    async fn queue_items(&self) -> RemoteResult<Vec<QueueItem>> {
        let url = self.http.endpoints().root(&["queue", "api", "json"]);
        let list: QueueList = self.http.json(self.get_tree(url, QUEUE_TREE)).await?;
        Ok(list.items)
    }

    async fn whoami(&self) -> RemoteResult<WhoAmI> {
        let url = self.http.endpoints().root(&["me", "api", "json"]);
        self.http.json(self.get_tree(url, WHOAMI_TREE)).await
    }

    async fn server_version(&self) -> RemoteResult<String> {
        let url = self.http.endpoints().root(&["api", "json"]);
        let response = self.http.send(self.get_tree(url, "mode")).await?;
        Ok(http::jenkins_version(&response))
    }
}
