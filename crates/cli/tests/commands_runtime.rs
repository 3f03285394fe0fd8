use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use axum::routing::post;
use axum::{Json, Router};
use intake_cli::commands::{config, doctor, extract};
use intake_core::config::ENV_KEYS;
use serde_json::{json, Value};
use tempfile::TempDir;

const VALID_ENV: &[(&str, &str)] = &[
    ("BASE_URL", "intake.example.com"),
    ("OPENAI_API_KEY", "sk-test"),
    ("TWILIO_ACCOUNT_SID", "AC0123456789"),
    ("TWILIO_AUTH_TOKEN", "twilio-secret-value"),
    ("COURIER_AUTH_TOKEN", "pk_courier-secret"),
];

#[test]
fn config_reports_sources_and_redacts_secrets() {
    let mut vars = VALID_ENV.to_vec();
    vars.push(("INTAKE_LLM_MODEL", "gpt-4o-mini"));

    with_env(&vars, || {
        let output = config::run();

        assert!(output.contains("- server.base_url = intake.example.com (source: env (BASE_URL))"));
        assert!(output.contains("- llm.model = gpt-4o-mini (source: env (INTAKE_LLM_MODEL))"));
        assert!(output.contains("- llm.api_key = sk-*** (source: env (OPENAI_API_KEY))"));
        assert!(output.contains("- notify.base_url = https://api.courier.com (source: default)"));
        assert!(output.contains("- tunnel.auth_token = <unset> (source: default)"));
        assert!(!output.contains("twilio-secret-value"));
        assert!(!output.contains("courier-secret"));
    });
}

#[test]
fn config_reports_validation_failure_without_credentials() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed:"));
    });
}

#[test]
fn doctor_json_passes_with_valid_env() {
    with_env(VALID_ENV, || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let names: Vec<_> = payload["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .filter_map(|check| check["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "config_validation",
                "telephony_credentials",
                "completion_api",
                "notification_api",
                "public_callback_url"
            ]
        );
        assert!(!result.output.contains("twilio-secret-value"));
    });
}

#[test]
fn doctor_warns_when_only_a_tunnel_token_is_configured() {
    let mut vars = VALID_ENV.to_vec();
    vars.push(("NGROK_AUTH_TOKEN", "ngrok-token"));

    with_env(&vars, || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("- [warn] public_callback_url:"));
        assert!(result.output.contains("https://intake.example.com/inbound_call"));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_fails() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
    });
}

#[test]
fn extract_requires_valid_config() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("call.txt");
        fs::write(&path, "HUMAN: hello").expect("write transcript");

        let result = extract::run(&path);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "extract");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn extract_reports_missing_transcript_file() {
    with_env(VALID_ENV, || {
        let result = extract::run(std::path::Path::new("definitely/not/here.txt"));
        assert_eq!(result.exit_code, 1);
        assert_eq!(parse_payload(&result.output)["error_class"], "input");
    });
}

#[test]
fn extract_prints_fields_from_completion_api() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let base_url = runtime.block_on(async {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
                let content = if prompt.contains("HUMAN: I'm Jane Doe") {
                    "Email: jane@example.com\nName: Jane Doe\nInfo: Checkup with Doctor Smith on Monday"
                } else {
                    "Name: Unknown"
                };
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
            }),
        );
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    });

    let mut vars = VALID_ENV.to_vec();
    vars.push(("INTAKE_LLM_BASE_URL", base_url.as_str()));

    with_env(&vars, || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("call.json");
        fs::write(
            &path,
            r#"[{"speaker":"bot","text":"What is your name?"},{"speaker":"human","text":"I'm Jane Doe"}]"#,
        )
        .expect("write transcript");

        let result = extract::run(&path);
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(
            payload["data"],
            json!({
                "email": "jane@example.com",
                "name": "Jane Doe",
                "info": "Checkup with Doctor Smith on Monday"
            })
        );
    });

    drop(runtime);
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let previous_values: Vec<(&str, Option<String>)> =
        ENV_KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in ENV_KEYS {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, _) in vars {
        env::remove_var(key);
    }
    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        }
    }
}
