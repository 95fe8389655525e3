//! Typed tool requests.
//!
//! Every argument is checked here, before a connection is requested, so bad
//! input never costs a network round trip.

use serde_json::{Map, Value};

use super::args::Args;
use super::catalogue::Tool;
use crate::error::{BridgeError, Result};
use crate::jenkins::xml::json_to_config_xml;

pub const DEFAULT_RECENT_BUILDS: i64 = 3;
pub const MAX_RECENT_BUILDS: i64 = 10;
pub const MIN_CONSOLE_LINES: i64 = 10;
pub const MAX_CONSOLE_LINES: i64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    ListJobs {
        filter: Option<String>,
    },
    GetJobDetails {
        job: String,
        max_recent_builds: usize,
    },
    GetBuildInfo {
        job: String,
        number: u64,
    },
    GetBuildConsole {
        job: String,
        number: u64,
        max_lines: usize,
        tail_only: bool,
    },
    GetLastBuildNumber {
        job: String,
    },
    GetLastBuildTimestamp {
        job: String,
    },
    TriggerBuild {
        job: String,
        parameters: Map<String, Value>,
        wait_for_start: Option<bool>,
    },
    StopBuild {
        job: String,
        number: u64,
    },
    CreateJob {
        job: String,
        config_xml: String,
    },
    CreateJobFromCopy {
        new_job: String,
        source_job: String,
    },
    /// `config_data` is already converted to XML at parse time.
    CreateJobFromData {
        job: String,
        config_xml: String,
    },
    DeleteJob {
        job: String,
    },
    EnableJob {
        job: String,
    },
    DisableJob {
        job: String,
    },
    RenameJob {
        job: String,
        new_name: String,
    },
    GetJobConfig {
        job: String,
    },
    UpdateJobConfig {
        job: String,
        config_xml: String,
    },
    GetQueueInfo,
    ListNodes,
    GetNodeInfo {
        node: String,
    },
    HealthCheck,
    GetCacheStats,
    ClearCache,
    GetMetrics {
        operation: Option<String>,
    },
}

impl ToolRequest {
    /// Validates `args` for `tool`.
    ///
    /// `console_max_lines` is the configured default for `max_lines`.
    pub fn parse(tool: Tool, args: &Map<String, Value>, console_max_lines: usize) -> Result<Self> {
        let args = Args::new(args);
        let job = || args.required_str("job_name");

        let request = match tool {
            Tool::ListJobs => ToolRequest::ListJobs {
                filter: args.optional_str("filter")?,
            },
            Tool::GetJobDetails => ToolRequest::GetJobDetails {
                job: job()?,
                max_recent_builds: args.clamped(
                    "max_recent_builds",
                    0..=MAX_RECENT_BUILDS,
                    DEFAULT_RECENT_BUILDS,
                ) as usize,
            },
            Tool::GetBuildInfo => ToolRequest::GetBuildInfo {
                job: job()?,
                number: args.build_number("build_number")?,
            },
            Tool::GetBuildConsole => {
                let default = i64::try_from(console_max_lines).unwrap_or(MAX_CONSOLE_LINES);
                ToolRequest::GetBuildConsole {
                    job: job()?,
                    number: args.build_number("build_number")?,
                    max_lines: args.clamped(
                        "max_lines",
                        MIN_CONSOLE_LINES..=MAX_CONSOLE_LINES,
                        default,
                    ) as usize,
                    tail_only: args.flag("tail_only", false),
                }
            }
            Tool::GetLastBuildNumber => ToolRequest::GetLastBuildNumber { job: job()? },
            Tool::GetLastBuildTimestamp => ToolRequest::GetLastBuildTimestamp { job: job()? },
            Tool::TriggerBuild => ToolRequest::TriggerBuild {
                job: job()?,
                parameters: args.object("parameters")?.unwrap_or_default(),
                wait_for_start: args
                    .contains("wait_for_start")
                    .then(|| args.flag("wait_for_start", true)),
            },
            Tool::StopBuild => ToolRequest::StopBuild {
                job: job()?,
                number: args.build_number("build_number")?,
            },
            Tool::CreateJob => ToolRequest::CreateJob {
                job: job()?,
                config_xml: args.config_xml("config_xml")?,
            },
            Tool::CreateJobFromCopy => ToolRequest::CreateJobFromCopy {
                new_job: args.required_str("new_job_name")?,
                source_job: args.required_str("source_job_name")?,
            },
            Tool::CreateJobFromData => {
                let job = job()?;
                let data = args.required_object("config_data")?;
                let root_tag = args
                    .optional_str("root_tag")?
                    .unwrap_or_else(|| "project".to_string());
                ToolRequest::CreateJobFromData {
                    job,
                    config_xml: json_to_config_xml(&root_tag, &Value::Object(data))?,
                }
            }
            Tool::DeleteJob => ToolRequest::DeleteJob { job: job()? },
            Tool::EnableJob => ToolRequest::EnableJob { job: job()? },
            Tool::DisableJob => ToolRequest::DisableJob { job: job()? },
            Tool::RenameJob => {
                let job = job()?;
                let new_name = args.required_str("new_name")?;
                if new_name.contains('/') {
                    return Err(BridgeError::Validation(
                        "new_name must be a plain job name without '/'".to_string(),
                    ));
                }
                ToolRequest::RenameJob { job, new_name }
            }
            Tool::GetJobConfig => ToolRequest::GetJobConfig { job: job()? },
            Tool::UpdateJobConfig => ToolRequest::UpdateJobConfig {
                job: job()?,
                config_xml: args.config_xml("config_xml")?,
            },
            Tool::GetQueueInfo => ToolRequest::GetQueueInfo,
            Tool::ListNodes => ToolRequest::ListNodes,
            Tool::GetNodeInfo => ToolRequest::GetNodeInfo {
                node: args.required_str("node_name")?,
            },
            Tool::HealthCheck => ToolRequest::HealthCheck,
            Tool::GetCacheStats => ToolRequest::GetCacheStats,
            Tool::ClearCache => ToolRequest::ClearCache,
            Tool::GetMetrics => ToolRequest::GetMetrics {
                operation: args.optional_str("operation")?,
            },
        };

        Ok(request)
    }

    /// Key for cacheable reads, `None` for everything else.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            ToolRequest::ListJobs { filter } => Some(format!(
                "{}:{}",
                Tool::ListJobs.name(),
                filter.as_deref().unwrap_or_default()
            )),
            ToolRequest::ListNodes => Some(format!("{}:", Tool::ListNodes.name())),
            _ => None,
        }
    }
}
