//! Tool catalogue: every operation the dispatcher accepts, with its argument
//! schema and kind.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ListJobs,
    GetJobDetails,
    GetBuildInfo,
    GetBuildConsole,
    GetLastBuildNumber,
    GetLastBuildTimestamp,
    TriggerBuild,
    StopBuild,
    CreateJob,
    CreateJobFromCopy,
    CreateJobFromData,
    DeleteJob,
    EnableJob,
    DisableJob,
    RenameJob,
    GetJobConfig,
    UpdateJobConfig,
    GetQueueInfo,
    ListNodes,
    GetNodeInfo,
    HealthCheck,
    GetCacheStats,
    ClearCache,
    GetMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Read-only, served from cache when fresh
    CacheableRead,
    Read,
    /// Changes Jenkins state
    Mutation,
    Diagnostic,
    /// Reads or resets the bridge's own cache and metrics
    Introspection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl Tool {
    pub const ALL: [Tool; 24] = [
        Tool::ListJobs,
        Tool::GetJobDetails,
        Tool::GetBuildInfo,
        Tool::GetBuildConsole,
        Tool::GetLastBuildNumber,
        Tool::GetLastBuildTimestamp,
        Tool::TriggerBuild,
        Tool::StopBuild,
        Tool::CreateJob,
        Tool::CreateJobFromCopy,
        Tool::CreateJobFromData,
        Tool::DeleteJob,
        Tool::EnableJob,
        Tool::DisableJob,
        Tool::RenameJob,
        Tool::GetJobConfig,
        Tool::UpdateJobConfig,
        Tool::GetQueueInfo,
        Tool::ListNodes,
        Tool::GetNodeInfo,
        Tool::HealthCheck,
        Tool::GetCacheStats,
        Tool::ClearCache,
        Tool::GetMetrics,
    ];

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn kind(self) -> ToolKind {
        self.spec().kind
    }

    /// Whether a success must drop cached job listings.
    pub fn invalidates_listings(self) -> bool {
        matches!(
            self,
            Tool::TriggerBuild
                | Tool::CreateJob
                | Tool::CreateJobFromCopy
                | Tool::CreateJobFromData
                | Tool::DeleteJob
                | Tool::EnableJob
                | Tool::DisableJob
                | Tool::RenameJob
        )
    }

    /// Introspection tools work without a Jenkins connection.
    pub fn needs_connection(self) -> bool {
        self.kind() != ToolKind::Introspection
    }

    pub fn spec(self) -> ToolSpec {
        use ToolKind::*;
        let (name, description, kind, required, optional): (
            &'static str,
            &'static str,
            ToolKind,
            &'static [&'static str],
            &'static [&'static str],
        ) = match self {
            Tool::ListJobs => (
                "list-jobs",
                "List all Jenkins jobs, optionally filtered by a case-insensitive name substring",
                CacheableRead,
                &[],
                &["filter"],
            ),
            Tool::GetJobDetails => (
                "get-job-details",
                "Get job details and its most recent builds",
                Read,
                &["job_name"],
                &["max_recent_builds"],
            ),
            Tool::GetBuildInfo => (
                "get-build-info",
                "Get result, timing and changes of one build",
                Read,
                &["job_name", "build_number"],
                &[],
            ),
            Tool::GetBuildConsole => (
                "get-build-console",
                "Get a build's console output, truncated to max_lines",
                Read,
                &["job_name", "build_number"],
                &["max_lines", "tail_only"],
            ),
            Tool::GetLastBuildNumber => (
                "get-last-build-number",
                "Get the number of a job's last build",
                Read,
                &["job_name"],
                &[],
            ),
            Tool::GetLastBuildTimestamp => (
                "get-last-build-timestamp",
                "Get the start time of a job's last build",
                Read,
                &["job_name"],
                &[],
            ),
            Tool::TriggerBuild => (
                "trigger-build",
                "Queue a build and optionally wait for its build number",
                Mutation,
                &["job_name"],
                &["parameters", "wait_for_start"],
            ),
            Tool::StopBuild => (
                "stop-build",
                "Abort a running build",
                Mutation,
                &["job_name", "build_number"],
                &[],
            ),
            Tool::CreateJob => (
                "create-job",
                "Create a job from config XML",
                Mutation,
                &["job_name", "config_xml"],
                &[],
            ),
            Tool::CreateJobFromCopy => (
                "create-job-from-copy",
                "Create a job by copying another job's config",
                Mutation,
                &["new_job_name", "source_job_name"],
                &[],
            ),
            Tool::CreateJobFromData => (
                "create-job-from-data",
                "Create a job from a JSON description converted to XML",
                Mutation,
                &["job_name", "config_data"],
                &["root_tag"],
            ),
            Tool::DeleteJob => ("delete-job", "Delete a job", Mutation, &["job_name"], &[]),
            Tool::EnableJob => ("enable-job", "Enable a disabled job", Mutation, &["job_name"], &[]),
            Tool::DisableJob => ("disable-job", "Disable a job", Mutation, &["job_name"], &[]),
            Tool::RenameJob => (
                "rename-job",
                "Rename a job inside its folder",
                Mutation,
                &["job_name", "new_name"],
                &[],
            ),
            Tool::GetJobConfig => (
                "get-job-config",
                "Get a job's config XML",
                Read,
                &["job_name"],
                &[],
            ),
            Tool::UpdateJobConfig => (
                "update-job-config",
                "Replace a job's config XML",
                Mutation,
                &["job_name", "config_xml"],
                &[],
            ),
            Tool::GetQueueInfo => (
                "get-queue-info",
                "List items waiting in the build queue",
                Read,
                &[],
                &[],
            ),
            Tool::ListNodes => (
                "list-nodes",
                "List build nodes and agents",
                CacheableRead,
                &[],
                &[],
            ),
            Tool::GetNodeInfo => (
                "get-node-info",
                "Get status of one node",
                Read,
                &["node_name"],
                &[],
            ),
            Tool::HealthCheck => (
                "health-check",
                "Check reachability, authentication and API responsiveness",
                Diagnostic,
                &[],
                &[],
            ),
            Tool::GetCacheStats => (
                "get-cache-stats",
                "Show cache counters and entries",
                Introspection,
                &[],
                &[],
            ),
            Tool::ClearCache => (
                "clear-cache",
                "Drop every cached result",
                Introspection,
                &[],
                &[],
            ),
            Tool::GetMetrics => (
                "get-metrics",
                "Show execution metrics, for one operation or all",
                Introspection,
                &[],
                &["operation"],
            ),
        };

        ToolSpec {
            name,
            description,
            kind,
            required,
            optional,
        }
    }
}

/// Specs of every tool, in catalogue order.
pub fn catalogue() -> Vec<ToolSpec> {
    Tool::ALL.iter().map(|tool| tool.spec()).collect()
}
