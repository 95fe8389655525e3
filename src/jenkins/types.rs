//! Serde types matching Jenkins JSON API responses.
//!
//! Every field is defaulted so partial projections (`tree=`) and older
//! servers decode cleanly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSummary {
    pub name: String,
    pub full_name: Option<String>,
    pub url: Option<String>,
    /// Ball colour, e.g. `blue`, `red`, `disabled`, `blue_anime`
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRef {
    pub number: u64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobInfo {
    pub name: String,
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub buildable: bool,
    pub color: Option<String>,
    pub in_queue: bool,
    pub next_build_number: Option<u64>,
    pub last_build: Option<BuildRef>,
    pub last_completed_build: Option<BuildRef>,
    pub last_successful_build: Option<BuildRef>,
    pub last_failed_build: Option<BuildRef>,
    /// Newest first
    pub builds: Vec<BuildRef>,
}

impl JobInfo {
    /// `lastBuild`, else `lastCompletedBuild`.
    pub fn last_build_number(&self) -> Option<u64> {
        self.last_build
            .as_ref()
            .or(self.last_completed_build.as_ref())
            .map(|b| b.number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildInfo {
    pub number: u64,
    pub url: Option<String>,
    /// `SUCCESS`, `FAILURE`, `ABORTED`, ... or null while running
    pub result: Option<String>,
    pub building: bool,
    /// Milliseconds
    pub duration: u64,
    pub estimated_duration: Option<i64>,
    /// Milliseconds since the epoch
    pub timestamp: Option<i64>,
    pub display_name: Option<String>,
    /// Freestyle jobs
    pub change_set: Option<ChangeSet>,
    /// Pipeline jobs
    pub change_sets: Vec<ChangeSet>,
}

impl BuildInfo {
    pub fn changes(&self) -> impl Iterator<Item = &ChangeItem> {
        self.change_set
            .iter()
            .chain(self.change_sets.iter())
            .flat_map(|set| set.items.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    pub items: Vec<ChangeItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeItem {
    pub author: Option<Person>,
    pub comment: Option<String>,
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueItem {
    pub id: u64,
    pub task: Option<QueueTask>,
    pub in_queue_since: Option<i64>,
    pub why: Option<String>,
    pub blocked: bool,
    pub buildable: bool,
    pub stuck: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueTask {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInfo {
    pub display_name: String,
    pub description: Option<String>,
    pub offline: bool,
    pub temporarily_offline: bool,
    pub offline_cause_reason: Option<String>,
    pub num_executors: u32,
    pub idle: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhoAmI {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub absolute_url: Option<String>,
}

// == List Envelopes ==
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct JobList {
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct NodeList {
    pub computer: Vec<NodeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct QueueList {
    pub items: Vec<QueueItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Crumb {
    pub crumb: String,
    pub crumb_request_field: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_info_last_build_fallback() {
        let info: JobInfo = serde_json::from_value(json!({
            "name": "demo",
            "lastBuild": null,
            "lastCompletedBuild": {"number": 40, "url": "http://j/job/demo/40/"}
        }))
        .unwrap();
        assert_eq!(info.last_build_number(), Some(40));

        let info: JobInfo = serde_json::from_value(json!({
            "name": "demo",
            "lastBuild": {"number": 41},
            "lastCompletedBuild": {"number": 40}
        }))
        .unwrap();
        assert_eq!(info.last_build_number(), Some(41));

        assert_eq!(JobInfo::default().last_build_number(), None);
    }

    #[test]
    fn test_build_changes_from_both_shapes() {
        let build: BuildInfo = serde_json::from_value(json!({
            "number": 7,
            "result": "SUCCESS",
            "duration": 1500,
            "changeSet": {"items": [{"author": {"fullName": "Ann"}, "comment": "fix"}]},
            "changeSets": [{"items": [{"author": {"fullName": "Bob"}, "msg": "feat"}]}]
        }))
        .unwrap();

        let authors: Vec<_> = build
            .changes()
            .filter_map(|c| c.author.as_ref()?.full_name.as_deref())
            .collect();
        assert_eq!(authors, vec!["Ann", "Bob"]);
        assert!(!build.building);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let node: NodeInfo = serde_json::from_value(json!({
            "_class": "hudson.model.Hudson$MasterComputer",
            "displayName": "built-in",
            "numExecutors": 2,
            "monitorData": {"whatever": 1}
        }))
        .unwrap();
        assert_eq!(node.display_name, "built-in");
        assert_eq!(node.num_executors, 2);
    }
}
