//! In-memory Jenkins used by unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;

use super::{BuildInfo, JenkinsApi, JobInfo, JobSummary, NodeInfo, QueueItem, RemoteResult, WhoAmI};
use super::types::{BuildRef, QueueTask};
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct FakeJob {
    config: String,
    enabled: bool,
    builds: BTreeMap<u64, (BuildInfo, String)>,
    /// A triggered build that appears on the next `job_info`
    pending: bool,
}

#[derive(Debug, Default)]
struct State {
    jobs: BTreeMap<String, FakeJob>,
    nodes: Vec<NodeInfo>,
    queue: Vec<QueueItem>,
    failure: Option<RemoteError>,
    /// Failures scoped to one operation name
    failing: BTreeMap<String, RemoteError>,
    /// `list_jobs` reads its snapshot, then waits here before answering
    listing_gate: Option<Arc<Notify>>,
    auto_start: bool,
    next_queue_id: u64,
    calls: Vec<String>,
}

pub(crate) struct FakeJenkins {
    state: Mutex<State>,
}

impl FakeJenkins {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                auto_start: true,
                next_queue_id: 100,
                ..Default::default()
            }),
        }
    }

    /// Adds a job whose builds are numbered `1..=last_build`.
    pub fn with_job(self, name: &str, last_build: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut job = FakeJob {
                config: format!("<project><description>{}</description></project>", name),
                enabled: true,
                ..Default::default()
            };
            for number in 1..=last_build {
                job.builds.insert(number, fake_build(number, "line\n".repeat(3)));
            }
            state.jobs.insert(name.to_string(), job);
        }
        self
    }

    pub fn with_node(self, name: &str, offline: bool) -> Self {
        self.state.lock().unwrap().nodes.push(NodeInfo {
            display_name: name.to_string(),
            offline,
            num_executors: 2,
            ..Default::default()
        });
        self
    }

    pub fn with_console(self, job: &str, number: u64, text: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let job = state.jobs.entry(job.to_string()).or_default();
            job.builds
                .insert(number, fake_build(number, text.to_string()));
        }
        self
    }

    /// Holds every `list_jobs` answer until `gate` is notified.
    pub fn with_listing_gate(self, gate: Arc<Notify>) -> Self {
        self.state.lock().unwrap().listing_gate = Some(gate);
        self
    }

    /// Triggered builds never start.
    pub fn without_auto_start(self) -> Self {
        self.state.lock().unwrap().auto_start = false;
        self
    }

    /// Every call fails with `err` until cleared.
    pub fn fail_with(&self, err: Option<RemoteError>) {
        self.state.lock().unwrap().failure = err;
    }

    /// Only `operation` fails with `err`; other calls go through.
    pub fn fail_on(&self, operation: &str, err: RemoteError) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(operation.to_string(), err);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn has_job(&self, name: &str) -> bool {
        self.state.lock().unwrap().jobs.contains_key(name)
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.state.lock().unwrap().jobs.get(name).map(|j| j.enabled)
    }

    pub fn config_of(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().jobs.get(name).map(|j| j.config.clone())
    }

    fn enter(&self, operation: &str) -> RemoteResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        match state.failure.as_ref().or_else(|| state.failing.get(operation)) {
            Some(err) => Err(err.clone()),
            None => Ok(state),
        }
    }
}

fn fake_build(number: u64, console: String) -> (BuildInfo, String) {
    let info = BuildInfo {
        number,
        url: Some(format!("http://fake/job/x/{}/", number)),
        result: Some("SUCCESS".to_string()),
        duration: 2500,
        timestamp: Some(1_700_000_000_000 + number as i64),
        ..Default::default()
    };
    (info, console)
}

fn not_found(what: &str) -> RemoteError {
    RemoteError::from_status(404, format!("http://fake/{}", what), "Not Found")
}

#[async_trait]
impl JenkinsApi for FakeJenkins {
    async fn list_jobs(&self) -> RemoteResult<Vec<JobSummary>> {
        let (jobs, gate) = {
            let state = self.enter("list_jobs")?;
            let jobs: Vec<JobSummary> = state
                .jobs
                .iter()
                .map(|(name, job)| JobSummary {
                    name: name.clone(),
                    full_name: Some(name.clone()),
                    url: Some(format!("http://fake/job/{}/", name)),
                    color: Some(if job.enabled { "blue" } else { "disabled" }.to_string()),
                })
                .collect();
            (jobs, state.listing_gate.clone())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(jobs)
    }

    async fn job_info(&self, job: &str) -> RemoteResult<JobInfo> {
        let mut state = self.enter("job_info")?;
        let entry = state.jobs.get_mut(job).ok_or_else(|| not_found(job))?;
        if entry.pending {
            entry.pending = false;
            let next = entry.builds.keys().next_back().copied().unwrap_or(0) + 1;
            entry.builds.insert(next, fake_build(next, String::new()));
        }

        let refs: Vec<BuildRef> = entry
            .builds
            .keys()
            .rev()
            .map(|n| BuildRef {
                number: *n,
                url: None,
            })
            .collect();
        Ok(JobInfo {
            name: job.to_string(),
            url: Some(format!("http://fake/job/{}/", job)),
            buildable: entry.enabled,
            last_build: refs.first().cloned(),
            last_completed_build: refs.first().cloned(),
            last_successful_build: refs.first().cloned(),
            builds: refs,
            ..Default::default()
        })
    }

    async fn build_info(&self, job: &str, number: u64) -> RemoteResult<BuildInfo> {
        let state = self.enter("build_info")?;
        state
            .jobs
            .get(job)
            .and_then(|j| j.builds.get(&number))
            .map(|(info, _)| info.clone())
            .ok_or_else(|| not_found(job))
    }

    async fn console_text(&self, job: &str, number: u64) -> RemoteResult<String> {
        let state = self.enter("console_text")?;
        state
            .jobs
            .get(job)
            .and_then(|j| j.builds.get(&number))
            .map(|(_, console)| console.clone())
            .ok_or_else(|| not_found(job))
    }

    async fn trigger_build(&self, job: &str, _: &Map<String, Value>) -> RemoteResult<Option<u64>> {
        let mut state = self.enter("trigger_build")?;
        let auto_start = state.auto_start;
        let entry = state.jobs.get_mut(job).ok_or_else(|| not_found(job))?;
        entry.pending = auto_start;
        state.next_queue_id += 1;
        let id = state.next_queue_id;
        state.queue.push(QueueItem {
            id,
            task: Some(QueueTask {
                name: Some(job.to_string()),
                url: None,
            }),
            why: Some("Waiting for next available executor".to_string()),
            ..Default::default()
        });
        Ok(Some(id))
    }

    async fn stop_build(&self, job: &str, number: u64) -> RemoteResult<()> {
        let mut state = self.enter("stop_build")?;
        let (info, _) = state
            .jobs
            .get_mut(job)
            .and_then(|j| j.builds.get_mut(&number))
            .ok_or_else(|| not_found(job))?;
        info.result = Some("ABORTED".to_string());
        Ok(())
    }

    async fn create_job(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let mut state = self.enter("create_job")?;
        if state.jobs.contains_key(job) {
            return Err(RemoteError::from_status(400, "http://fake/createItem", "A job already exists"));
        }
        state.jobs.insert(
            job.to_string(),
            FakeJob {
                config: config_xml.to_string(),
                enabled: true,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn update_job_config(&self, job: &str, config_xml: &str) -> RemoteResult<()> {
        let mut state = self.enter("update_job_config")?;
        let entry = state.jobs.get_mut(job).ok_or_else(|| not_found(job))?;
        entry.config = config_xml.to_string();
        Ok(())
    }

    async fn delete_job(&self, job: &str) -> RemoteResult<()> {
        let mut state = self.enter("delete_job")?;
        state.jobs.remove(job).map(|_| ()).ok_or_else(|| not_found(job))
    }

    async fn rename_job(&self, job: &str, new_name: &str) -> RemoteResult<()> {
        let mut state = self.enter("rename_job")?;
        let entry = state.jobs.remove(job).ok_or_else(|| not_found(job))?;
        state.jobs.insert(new_name.to_string(), entry);
        Ok(())
    }

    async fn enable_job(&self, job: &str) -> RemoteResult<()> {
        let mut state = self.enter("enable_job")?;
        state.jobs.get_mut(job).ok_or_else(|| not_found(job))?.enabled = true;
        Ok(())
    }

    async fn disable_job(&self, job: &str) -> RemoteResult<()> {
        let mut state = self.enter("disable_job")?;
        state.jobs.get_mut(job).ok_or_else(|| not_found(job))?.enabled = false;
        Ok(())
    }

    async fn job_config(&self, job: &str) -> RemoteResult<String> {
        let state = self.enter("job_config")?;
        state
            .jobs
            .get(job)
            .map(|j| j.config.clone())
            .ok_or_else(|| not_found(job))
    }

    async fn list_nodes(&self) -> RemoteResult<Vec<NodeInfo>> {
        Ok(self.enter("list_nodes")?.nodes.clone())
    }

    async fn node_info(&self, node: &str) -> RemoteResult<NodeInfo> {
        let state = self.enter("node_info")?;
        state
            .nodes
            .iter()
            .find(|n| n.display_name == node)
            .cloned()
            .ok_or_else(|| not_found(node))
    }

    async fn queue_items(&self) -> RemoteResult<Vec<QueueItem>> {
        Ok(self.enter("queue_items")?.queue.clone())
    }

    async fn whoami(&self) -> RemoteResult<WhoAmI> {
        self.enter("whoami")?;
        Ok(WhoAmI {
            id: Some("bot".to_string()),
            full_name: Some("Build Bot".to_string()),
            absolute_url: None,
        })
    }

    async fn server_version(&self) -> RemoteResult<String> {
        self.enter("server_version")?;
        Ok("2.440.3".to_string())
    }
}
