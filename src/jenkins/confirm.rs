//! Build triggering with start confirmation.
//!
//! After queueing, the job's last build number is polled until it moves past
//! the number seen before the trigger, or the wait window closes. A closed
//! window is not an error: the build was queued, only the number is unknown.
//! Neither is a failed baseline read: the build is still queued, but without a
//! baseline there is nothing to compare against, so polling is skipped.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::{JenkinsApi, RemoteResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitOptions {
    pub wait_for_start: bool,
    /// Upper bound on the whole poll loop
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait_for_start: true,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    pub queue_id: Option<u64>,
    /// `None` when the build did not start inside the wait window
    pub build_number: Option<u64>,
}

pub async fn trigger_and_confirm(
    api: &dyn JenkinsApi,
    job: &str,
    params: &Map<String, Value>,
    options: WaitOptions,
) -> RemoteResult<TriggerOutcome> {
    let baseline = if options.wait_for_start {
        match api.last_build_number(job).await {
            Ok(number) => Some(number.unwrap_or(0)),
            Err(e) => {
                debug!("Reading the last build of {} failed, not waiting: {}", job, e);
                None
            }
        }
    } else {
        None
    };

    let queue_id = api.trigger_build(job, params).await?;
    let mut outcome = TriggerOutcome {
        queue_id,
        build_number: None,
    };
    let Some(before) = baseline else {
        return Ok(outcome);
    };

    let deadline = Instant::now() + options.timeout;
    while Instant::now() < deadline {
        sleep(options.poll_interval).await;

        match api.last_build_number(job).await {
            Ok(Some(current)) if current > before => {
                info!("Build {} #{} started", job, current);
                outcome.build_number = Some(current);
                break;
            }
            Ok(_) => {}
            // the poll is best effort, the trigger already succeeded
            Err(e) => debug!("Polling {} for its new build failed: {}", job, e),
        }
    }

    if outcome.build_number.is_none() {
        debug!(
            "Build for {} did not start within {:?}",
            job, options.timeout
        );
    }
    Ok(outcome)
}
