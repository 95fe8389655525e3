//! Jenkins-backed tool handlers.
//!
//! Each handler turns one [`ToolRequest`] into calls on the shared handle and
//! renders the result. Errors propagate unchanged for the dispatcher to
//! classify.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::report::{console_excerpt, health_report, HealthChecks, HealthLevel, HealthStatus};
use super::request::ToolRequest;
use super::ToolOutput;
use crate::config::JenkinsConfig;
use crate::error::{BridgeError, ErrorCategory, Result};
use crate::jenkins::xml::rename_job_references;
use crate::jenkins::{trigger_and_confirm, JenkinsApi, WaitOptions};

/// Responses slower than this mark a healthy server as slow.
const SLOW_HEALTH_MS: f64 = 2000.0;

pub(super) struct Context<'a> {
    pub config: &'a JenkinsConfig,
    pub wait: WaitOptions,
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn done(text: impl Into<String>) -> ToolOutput {
    ToolOutput {
        text: text.into(),
        data: None,
    }
}

fn with_data(heading: String, data: Value) -> ToolOutput {
    ToolOutput {
        text: format!("{}\n\n{}", heading, pretty(&data)),
        data: Some(data),
    }
}

fn seconds(duration_ms: u64) -> f64 {
    duration_ms as f64 / 1000.0
}

pub(super) async fn execute(
    api: &dyn JenkinsApi,
    request: &ToolRequest,
    ctx: &Context<'_>,
) -> Result<ToolOutput> {
    match request {
        // == Job information ==
        ToolRequest::ListJobs { filter } => list_jobs(api, filter.as_deref()).await,
        ToolRequest::GetJobDetails {
            job,
            max_recent_builds,
        } => job_details(api, job, *max_recent_builds).await,

        // == Build information ==
        ToolRequest::GetBuildInfo { job, number } => build_info(api, job, *number).await,
        ToolRequest::GetBuildConsole {
            job,
            number,
            max_lines,
            tail_only,
        } => {
            let console = api.console_text(job, *number).await?;
            Ok(done(console_excerpt(
                job, *number, &console, *max_lines, *tail_only,
            )))
        }
        ToolRequest::GetLastBuildNumber { job } => {
            let number = api.last_build_number(job).await?;
            let shown = number.map_or_else(|| "none".to_string(), |n| n.to_string());
            Ok(ToolOutput {
                text: format!("Last build number for '{}': {}", job, shown),
                data: Some(json!({ "job": job, "last_build_number": number })),
            })
        }
        ToolRequest::GetLastBuildTimestamp { job } => last_build_timestamp(api, job).await,

        // == Builds ==
        ToolRequest::TriggerBuild {
            job,
            parameters,
            wait_for_start,
        } => {
            let mut wait = ctx.wait;
            if let Some(flag) = wait_for_start {
                wait.wait_for_start = *flag;
            }

            let outcome = trigger_and_confirm(api, job, parameters, wait).await?;
            let mut text = format!("Successfully triggered build for job '{}'.\n", job);
            if let Some(id) = outcome.queue_id {
                text.push_str(&format!("Queue ID: {}\n", id));
            }
            match outcome.build_number {
                Some(number) => text.push_str(&format!("Build number: #{}\n", number)),
                None if wait.wait_for_start => text.push_str(&format!(
                    "Build has not started within {}s; it is still queued.\n",
                    wait.timeout.as_secs()
                )),
                None => {}
            }
            if !parameters.is_empty() {
                text.push_str(&format!(
                    "Parameters: {}",
                    pretty(&Value::Object(parameters.clone()))
                ));
            }
            Ok(ToolOutput {
                text,
                data: Some(json!(outcome)),
            })
        }
        ToolRequest::StopBuild { job, number } => {
            api.stop_build(job, *number).await?;
            Ok(done(format!(
                "Successfully stopped build #{} for job '{}'.",
                number, job
            )))
        }

        // == Job management ==
        ToolRequest::CreateJob { job, config_xml } => {
            api.create_job(job, config_xml).await?;
            Ok(done(format!("Successfully created job '{}'", job)))
        }
        ToolRequest::CreateJobFromCopy {
            new_job,
            source_job,
        } => {
            let source = api.job_config(source_job).await?;
            let config = rename_job_references(&source, source_job, new_job);
            api.create_job(new_job, &config).await?;
            Ok(done(format!(
                "Successfully created job '{}' from '{}'",
                new_job, source_job
            )))
        }
        ToolRequest::CreateJobFromData { job, config_xml } => {
            api.create_job(job, config_xml).await?;
            Ok(done(format!("Successfully created job '{}' from data", job)))
        }
        ToolRequest::DeleteJob { job } => {
            api.delete_job(job).await?;
            Ok(done(format!("Successfully deleted job '{}'", job)))
        }
        ToolRequest::EnableJob { job } => {
            api.enable_job(job).await?;
            Ok(done(format!("Successfully enabled job '{}'", job)))
        }
        ToolRequest::DisableJob { job } => {
            api.disable_job(job).await?;
            Ok(done(format!("Successfully disabled job '{}'", job)))
        }
        ToolRequest::RenameJob { job, new_name } => {
            api.rename_job(job, new_name).await?;
            Ok(done(format!(
                "Successfully renamed job '{}' to '{}'",
                job, new_name
            )))
        }

        // == Job configuration ==
        ToolRequest::GetJobConfig { job } => Ok(done(api.job_config(job).await?)),
        ToolRequest::UpdateJobConfig { job, config_xml } => {
            api.update_job_config(job, config_xml).await?;
            Ok(done(format!("Successfully updated config for job '{}'", job)))
        }

        // == System information ==
        ToolRequest::GetQueueInfo => queue_info(api).await,
        ToolRequest::ListNodes => {
            let nodes = api.list_nodes().await?;
            let rows: Vec<Value> = nodes
                .iter()
                .map(|node| {
                    json!({
                        "name": node.display_name,
                        "description": node.description.clone().unwrap_or_default(),
                        "offline": node.offline,
                        "executors": node.num_executors,
                    })
                })
                .collect();
            Ok(with_data(
                format!("Jenkins nodes/agents ({} total):", rows.len()),
                Value::Array(rows),
            ))
        }
        ToolRequest::GetNodeInfo { node } => {
            let info = api.node_info(node).await?;
            Ok(with_data(
                format!("Information for node '{}':", node),
                json!({
                    "name": info.display_name,
                    "description": info.description,
                    "offline": info.offline,
                    "temporarilyOffline": info.temporarily_offline,
                    "offlineCause": info.offline_cause_reason.clone().unwrap_or_default(),
                    "executors": info.num_executors,
                }),
            ))
        }
        ToolRequest::HealthCheck => Ok(health_check(api, ctx.config).await),

        ToolRequest::GetCacheStats | ToolRequest::ClearCache | ToolRequest::GetMetrics { .. } => {
            Err(BridgeError::UnknownTool(format!("{:?}", request)))
        }
    }
}

// == List Jobs ==
async fn list_jobs(api: &dyn JenkinsApi, filter: Option<&str>) -> Result<ToolOutput> {
    let jobs = api.list_jobs().await?;
    let needle = filter.map(str::to_lowercase);

    let rows: Vec<Value> = jobs
        .iter()
        .filter(|job| match &needle {
            Some(needle) => job.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|job| {
            json!({
                "name": job.name,
                "url": job.url,
                "status": job.color.as_deref().unwrap_or("unknown"),
            })
        })
        .collect();

    let heading = match filter {
        Some(filter) => format!("Jenkins Jobs matching '{}' ({} found):", filter, rows.len()),
        None => format!("Jenkins Jobs ({} total):", rows.len()),
    };
    Ok(with_data(heading, Value::Array(rows)))
}

// == Job Details ==
async fn job_details(
    api: &dyn JenkinsApi,
    job: &str,
    max_recent_builds: usize,
) -> Result<ToolOutput> {
    let info = api.job_info(job).await?;
    let name = if info.name.is_empty() {
        job
    } else {
        info.name.as_str()
    };

    let mut details = json!({
        "name": name,
        "url": info.url.clone().unwrap_or_default(),
        "description": info.description.clone().unwrap_or_default(),
        "buildable": info.buildable,
        "lastBuild": info.last_build,
        "lastSuccessfulBuild": info.last_successful_build,
        "lastFailedBuild": info.last_failed_build,
    });

    if max_recent_builds > 0 && !info.builds.is_empty() {
        let wanted: Vec<u64> = info
            .builds
            .iter()
            .take(max_recent_builds)
            .map(|b| b.number)
            .collect();
        info!("Fetching {} recent builds for '{}'", wanted.len(), job);

        let mut recent = Vec::with_capacity(wanted.len());
        for number in wanted {
            match api.build_info(job, number).await {
                Ok(build) => recent.push(json!({
                    "number": build.number,
                    "result": build.result,
                    "timestamp": build.timestamp,
                    "duration_seconds": seconds(build.duration),
                })),
                Err(e) => warn!("Could not fetch build {} of '{}': {}", number, job, e),
            }
        }
        details["recentBuildsCount"] = json!(recent.len());
        details["recentBuilds"] = Value::Array(recent);
    }

    Ok(with_data(format!("Job details for '{}':", job), details))
}

// == Build Info ==
async fn build_info(api: &dyn JenkinsApi, job: &str, number: u64) -> Result<ToolOutput> {
    let build = api.build_info(job, number).await?;

    let mut data = json!({
        "number": build.number,
        "result": build.result,
        "timestamp": build.timestamp,
        "duration_seconds": seconds(build.duration),
        "url": build.url,
        "building": build.building,
    });

    let changes: Vec<Value> = build
        .changes()
        .map(|change| {
            json!({
                "author": change
                    .author
                    .as_ref()
                    .and_then(|a| a.full_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                "comment": change.comment.clone().or_else(|| change.msg.clone()).unwrap_or_default(),
            })
        })
        .collect();
    if !changes.is_empty() {
        data["changes"] = Value::Array(changes);
    }

    Ok(with_data(
        format!("Build info for {} #{}:", job, number),
        data,
    ))
}

// == Last Build Timestamp ==
async fn last_build_timestamp(api: &dyn JenkinsApi, job: &str) -> Result<ToolOutput> {
    let timestamp = match api.last_build_number(job).await? {
        Some(number) => api.build_info(job, number).await?.timestamp,
        None => None,
    };

    let shown = match timestamp {
        Some(ms) => match DateTime::<Utc>::from_timestamp_millis(ms) {
            Some(at) => format!("{} ({})", ms, at.to_rfc3339()),
            None => ms.to_string(),
        },
        None => "none".to_string(),
    };

    Ok(ToolOutput {
        text: format!("Last build timestamp for '{}': {}", job, shown),
        data: Some(json!({ "job": job, "timestamp": timestamp })),
    })
}

// == Queue ==
async fn queue_info(api: &dyn JenkinsApi) -> Result<ToolOutput> {
    let items = api.queue_items().await?;
    if items.is_empty() {
        return Ok(ToolOutput {
            text: "Jenkins build queue is empty.".to_string(),
            data: Some(json!([])),
        });
    }

    let rows: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "id": item.id,
                "job": item
                    .task
                    .as_ref()
                    .and_then(|t| t.name.as_deref())
                    .unwrap_or("Unknown"),
                "inQueueSince": item.in_queue_since,
                "why": item.why.as_deref().unwrap_or("Unknown reason"),
                "blocked": item.blocked,
            })
        })
        .collect();

    Ok(with_data(
        format!("Jenkins build queue ({} items):", rows.len()),
        Value::Array(rows),
    ))
}

// == Health Check ==
/// Always succeeds: an unreachable server is a finding, not a failure.
async fn health_check(api: &dyn JenkinsApi, config: &JenkinsConfig) -> ToolOutput {
    let started = Instant::now();
    let mut checks = HealthChecks {
        server_url: config.url.clone(),
        username: config.username.clone(),
        checked_at: Utc::now().to_rfc3339(),
        ..Default::default()
    };

    let status = match api.whoami().await {
        Ok(_) => {
            checks.server_reachable = true;
            checks.authentication_valid = true;

            match api.server_version().await {
                Ok(version) => {
                    checks.server_version = Some(version);
                    checks.api_responsive = true;
                }
                Err(e) => warn!("Could not get Jenkins version: {}", e),
            }

            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            checks.response_time_ms = Some((elapsed_ms * 100.0).round() / 100.0);

            let (level, summary) = match (checks.api_responsive, elapsed_ms > SLOW_HEALTH_MS) {
                (true, false) => (HealthLevel::Healthy, "Healthy"),
                (true, true) => (HealthLevel::Degraded, "Healthy (Slow)"),
                (false, _) => (HealthLevel::Degraded, "Partially Healthy (API issues)"),
            };
            HealthStatus {
                level,
                summary: summary.to_string(),
                error: None,
            }
        }
        Err(e) => {
            let summary = match ErrorCategory::classify(&e) {
                ErrorCategory::Timeout => "Timeout - Server not responding".to_string(),
                ErrorCategory::AuthenticationFailed => {
                    checks.server_reachable = true;
                    "Authentication Failed".to_string()
                }
                ErrorCategory::ConnectionRefused => {
                    "Connection Failed - Server unreachable".to_string()
                }
                other => {
                    checks.server_reachable = e.status().is_some();
                    format!("Error: {}", other.title())
                }
            };
            HealthStatus {
                level: HealthLevel::Unhealthy,
                summary,
                error: Some(e.to_string()),
            }
        }
    };

    ToolOutput {
        text: health_report(&checks, &status),
        data: Some(json!({ "status": status, "checks": checks })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::jenkins::fake::FakeJenkins;
    use serde_json::Map;
    use std::time::Duration;

    fn config() -> JenkinsConfig {
        JenkinsConfig {
            url: Some("http://jenkins:8080".into()),
            username: Some("bot".into()),
            token: Some("t".into()),
            ..Default::default()
        }
    }

    async fn run(api: &FakeJenkins, request: ToolRequest) -> Result<ToolOutput> {
        let config = config();
        let ctx = Context {
            config: &config,
            wait: WaitOptions {
                wait_for_start: true,
                timeout: Duration::from_millis(300),
                poll_interval: Duration::from_millis(10),
            },
        };
        execute(api, &request, &ctx).await
    }

    #[tokio::test]
    async fn test_list_jobs_filter_is_case_insensitive() {
        let api = FakeJenkins::new()
            .with_job("API-Server", 1)
            .with_job("web", 1);

        let output = run(
            &api,
            ToolRequest::ListJobs {
                filter: Some("api".into()),
            },
        )
        .await
        .unwrap();

        assert!(output.text.starts_with("Jenkins Jobs matching 'api' (1 found):"));
        let data = output.data.unwrap();
        assert_eq!(data[0]["name"], "API-Server");
        assert_eq!(data[0]["status"], "blue");
    }

    #[tokio::test]
    async fn test_job_details_includes_recent_builds() {
        let api = FakeJenkins::new().with_job("demo", 5);

        let output = run(
            &api,
            ToolRequest::GetJobDetails {
                job: "demo".into(),
                max_recent_builds: 2,
            },
        )
        .await
        .unwrap();

        let data = output.data.unwrap();
        assert_eq!(data["recentBuildsCount"], 2);
        assert_eq!(data["recentBuilds"][0]["number"], 5);
        assert_eq!(data["recentBuilds"][0]["duration_seconds"], 2.5);
        assert_eq!(api.calls("build_info"), 2);
    }

    #[tokio::test]
    async fn test_job_details_without_recent_builds() {
        let api = FakeJenkins::new().with_job("demo", 5);

        let output = run(
            &api,
            ToolRequest::GetJobDetails {
                job: "demo".into(),
                max_recent_builds: 0,
            },
        )
        .await
        .unwrap();

        assert!(output.data.unwrap().get("recentBuilds").is_none());
        assert_eq!(api.calls("build_info"), 0);
    }

    #[tokio::test]
    async fn test_trigger_reports_build_number() {
        let api = FakeJenkins::new().with_job("demo", 41);
        let mut parameters = Map::new();
        parameters.insert("BRANCH".into(), json!("main"));

        let output = run(
            &api,
            ToolRequest::TriggerBuild {
                job: "demo".into(),
                parameters,
                wait_for_start: None,
            },
        )
        .await
        .unwrap();

        assert!(output.text.contains("Build number: #42"));
        assert!(output.text.contains("\"BRANCH\": \"main\""));
        assert_eq!(output.data.unwrap()["build_number"], 42);
    }

    #[tokio::test]
    async fn test_trigger_without_wait() {
        let api = FakeJenkins::new().with_job("demo", 41);

        let output = run(
            &api,
            ToolRequest::TriggerBuild {
                job: "demo".into(),
                parameters: Map::new(),
                wait_for_start: Some(false),
            },
        )
        .await
        .unwrap();

        assert!(!output.text.contains("Build number"));
        assert_eq!(output.data.unwrap()["build_number"], Value::Null);
    }

    #[tokio::test]
    async fn test_copy_rewrites_references() {
        let api = FakeJenkins::new().with_job("old", 0);
        api.update_job_config(
            "old",
            "<project><projectName>old</projectName></project>",
        )
        .await
        .unwrap();

        run(
            &api,
            ToolRequest::CreateJobFromCopy {
                new_job: "new".into(),
                source_job: "old".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            api.config_of("new").as_deref(),
            Some("<project><projectName>new</projectName></project>")
        );
    }

    #[tokio::test]
    async fn test_last_build_timestamp() {
        let api = FakeJenkins::new().with_job("demo", 2);

        let output = run(&api, ToolRequest::GetLastBuildTimestamp { job: "demo".into() })
            .await
            .unwrap();
        assert!(output.text.contains("1700000000002"));
        assert!(output.text.contains("2023-11-14T"));

        let api = FakeJenkins::new().with_job("fresh", 0);
        let output = run(&api, ToolRequest::GetLastBuildTimestamp { job: "fresh".into() })
            .await
            .unwrap();
        assert!(output.text.ends_with(": none"));
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let api = FakeJenkins::new();
        let output = run(&api, ToolRequest::GetQueueInfo).await.unwrap();
        assert_eq!(output.text, "Jenkins build queue is empty.");
    }

    #[tokio::test]
    async fn test_missing_job_propagates_not_found() {
        let api = FakeJenkins::new();
        let err = run(&api, ToolRequest::DeleteJob { job: "ghost".into() })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let api = FakeJenkins::new();
        let output = run(&api, ToolRequest::HealthCheck).await.unwrap();

        assert!(output.text.contains("Jenkins Health Check: Healthy"));
        let data = output.data.unwrap();
        assert_eq!(data["status"]["level"], "healthy");
        assert_eq!(data["checks"]["server_version"], "2.440.3");
    }

    #[tokio::test]
    async fn test_health_check_reports_auth_failure() {
        let api = FakeJenkins::new();
        api.fail_with(Some(RemoteError::from_status(401, "http://fake/me", "")));

        let output = run(&api, ToolRequest::HealthCheck).await.unwrap();

        assert!(output.text.contains("Authentication Failed"));
        let data = output.data.unwrap();
        assert_eq!(data["status"]["level"], "unhealthy");
        assert_eq!(data["checks"]["server_reachable"], true);
        assert_eq!(data["checks"]["authentication_valid"], false);
    }

    #[tokio::test]
    async fn test_health_check_reports_timeout() {
        let api = FakeJenkins::new();
        api.fail_with(Some(RemoteError::Timeout("read timed out".into())));

        let output = run(&api, ToolRequest::HealthCheck).await.unwrap();
        assert!(output.text.contains("Timeout - Server not responding"));
        assert!(output.text.contains("curl http://jenkins:8080/api/json"));
    }
}
