use intake_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const CHECK_NAMES: [&str; 4] =
    ["telephony_credentials", "completion_api", "notification_api", "public_callback_url"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_telephony(&config));
            checks.push(check_completion_api(&config));
            checks.push(check_notification_api(&config));
            checks.push(check_public_url(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in CHECK_NAMES {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_telephony(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "telephony_credentials",
        status: CheckStatus::Pass,
        details: format!(
            "account `{}` with auth token of {} characters",
            config.telephony.account_sid,
            config.telephony.auth_token.expose_secret().len()
        ),
    }
}

fn check_completion_api(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "completion_api",
        status: CheckStatus::Pass,
        details: format!(
            "model `{}` at {}/chat/completions (timeout {}s)",
            config.llm.model,
            config.llm.base_url.trim_end_matches('/'),
            config.llm.timeout_secs
        ),
    }
}

fn check_notification_api(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "notification_api",
        status: CheckStatus::Pass,
        details: format!(
            "confirmations sent via {}/send (timeout {}s)",
            config.notify.base_url.trim_end_matches('/'),
            config.notify.timeout_secs
        ),
    }
}

fn check_public_url(config: &AppConfig) -> DoctorCheck {
    let inbound = config.server.public_url("/inbound_call");
    match &config.tunnel.auth_token {
        Some(_) => DoctorCheck {
            name: "public_callback_url",
            status: CheckStatus::Warn,
            details: format!(
                "tunnel token is set but tunnels are not started here; make sure {inbound} forwards to port {}",
                config.server.port
            ),
        },
        None => DoctorCheck {
            name: "public_callback_url",
            status: CheckStatus::Pass,
            details: format!("point the phone number's voice webhook at {inbound}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
