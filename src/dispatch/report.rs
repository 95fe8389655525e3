//! Text rendering for tool results: failure reports, console excerpts and the
//! health report.

use serde::Serialize;

use crate::error::{BridgeError, ErrorCategory};

// == Failure Report ==
/// Category headline, the failing tool, the original error text and the
/// category's checklist. `<url>` in the checklist becomes the configured URL.
pub fn failure_report(tool: &str, err: &BridgeError, jenkins_url: Option<&str>) -> String {
    let category = err.category();
    let mut text = format!("{} ({})\n\nError: {}\n", category.title(), tool, err);

    if category == ErrorCategory::ConnectionRefused {
        if let Some(url) = jenkins_url {
            text.push_str(&format!("Jenkins URL: {}\n", url));
        }
    }

    text.push_str("\nTroubleshooting:\n");
    for (i, step) in category.remediation().iter().enumerate() {
        let step = step.replace("<url>", jenkins_url.unwrap_or("<url>"));
        text.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    text
}

// == Console Excerpt ==
/// Keeps at most `max_lines` lines of `console`, from the end when
/// `tail_only`, with a header describing what was cut.
pub fn console_excerpt(
    job: &str,
    number: u64,
    console: &str,
    max_lines: usize,
    tail_only: bool,
) -> String {
    let lines: Vec<&str> = console.split('\n').collect();
    let total = lines.len();

    if total <= max_lines {
        return format!(
            "[Complete output: {} lines]\n\nConsole output for {} #{}:\n\n```\n{}\n```",
            total, job, number, console
        );
    }

    let omitted = total - max_lines;
    let (header, shown, tip) = if tail_only {
        (
            format!(
                "[Showing last {} of {} lines - {} earlier lines omitted]",
                max_lines, total, omitted
            ),
            &lines[omitted..],
            format!(
                "Tip: use max_lines to see more lines (current: {}, max: 10000)",
                max_lines
            ),
        )
    } else {
        (
            format!(
                "[Showing first {} of {} lines - {} later lines truncated]",
                max_lines, total, omitted
            ),
            &lines[..max_lines],
            format!(
                "Tip: set tail_only=true to see the last {} lines, or increase max_lines (current: {}, max: 10000)",
                max_lines, max_lines
            ),
        )
    };

    format!(
        "{}\n\nConsole output for {} #{}:\n\n```\n{}\n```\n\n{}",
        header,
        job,
        number,
        shown.join("\n"),
        tip
    )
}

// == Health Report ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthChecks {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub server_reachable: bool,
    pub authentication_valid: bool,
    pub api_responsive: bool,
    pub server_version: Option<String>,
    pub response_time_ms: Option<f64>,
    pub checked_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub level: HealthLevel,
    pub summary: String,
    pub error: Option<String>,
}

const RULE: &str = "=======================================";

fn yes_no(value: bool, yes: &str, no: &str) -> String {
    let text = if value { yes } else { no };
    text.to_string()
}

pub fn health_report(checks: &HealthChecks, status: &HealthStatus) -> String {
    let url = checks.server_url.as_deref().unwrap_or("(not set)");
    let mut report = format!(
        "Jenkins Health Check: {}\n\n{RULE}\nCONNECTION STATUS\n{RULE}\n\
         Server URL:          {}\n\
         Username:            {}\n\
         Server Reachable:    {}\n\
         Authentication:      {}\n\
         API Responsive:      {}\n\n\
         {RULE}\nSERVER DETAILS\n{RULE}\n\
         Jenkins Version:     {}\n\
         Response Time:       {}\n\
         Checked At:          {}\n",
        status.summary,
        url,
        checks.username.as_deref().unwrap_or("(not set)"),
        yes_no(checks.server_reachable, "Yes", "No"),
        yes_no(checks.authentication_valid, "Valid", "Failed"),
        yes_no(checks.api_responsive, "Yes", "No"),
        checks.server_version.as_deref().unwrap_or("Unknown"),
        checks
            .response_time_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "n/a".to_string()),
        checks.checked_at,
    );

    if let Some(error) = &status.error {
        report.push_str(&format!("\n{RULE}\nERROR DETAILS\n{RULE}\n{}\n", error));
    }

    if status.level == HealthLevel::Unhealthy {
        report.push_str(&format!("\n{RULE}\nTROUBLESHOOTING STEPS\n{RULE}\n"));
        if !checks.server_reachable {
            report.push_str(&format!(
                "Server not reachable:\n  \
                 1. Verify Jenkins is running\n  \
                 2. Check the URL is correct\n  \
                 3. Test with: curl {}/api/json\n  \
                 4. Check firewall and VPN settings\n",
                url
            ));
        } else if !checks.authentication_valid {
            report.push_str(
                "Authentication failed:\n  \
                 1. Verify the username is correct\n  \
                 2. Regenerate the API token in Jenkins\n  \
                 3. Update JENKINS_TOKEN with the new token\n",
            );
        }
    }

    report
}
