use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use intake_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    let tunnel_token = config
        .tunnel
        .auth_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        ConfigField {
            key_path: "server.base_url",
            env_keys: &["INTAKE_SERVER_BASE_URL", "BASE_URL"],
            value: config.server.base_url.clone(),
        },
        ConfigField {
            key_path: "server.bind_address",
            env_keys: &["INTAKE_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        ConfigField {
            key_path: "server.port",
            env_keys: &["INTAKE_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        ConfigField {
            key_path: "server.graceful_shutdown_secs",
            env_keys: &["INTAKE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        ConfigField {
            key_path: "llm.api_key",
            env_keys: &["INTAKE_LLM_API_KEY", "OPENAI_API_KEY"],
            value: redact_secret(&config.llm.api_key),
        },
        ConfigField {
            key_path: "llm.base_url",
            env_keys: &["INTAKE_LLM_BASE_URL"],
            value: config.llm.base_url.clone(),
        },
        ConfigField {
            key_path: "llm.model",
            env_keys: &["INTAKE_LLM_MODEL"],
            value: config.llm.model.clone(),
        },
        ConfigField {
            key_path: "llm.timeout_secs",
            env_keys: &["INTAKE_LLM_TIMEOUT_SECS"],
            value: config.llm.timeout_secs.to_string(),
        },
        ConfigField {
            key_path: "telephony.account_sid",
            env_keys: &["INTAKE_TELEPHONY_ACCOUNT_SID", "TWILIO_ACCOUNT_SID"],
            value: config.telephony.account_sid.clone(),
        },
        ConfigField {
            key_path: "telephony.auth_token",
            env_keys: &["INTAKE_TELEPHONY_AUTH_TOKEN", "TWILIO_AUTH_TOKEN"],
            value: redact_secret(&config.telephony.auth_token),
        },
        ConfigField {
            key_path: "notify.api_key",
            env_keys: &["INTAKE_NOTIFY_API_KEY", "COURIER_AUTH_TOKEN"],
            value: redact_secret(&config.notify.api_key),
        },
        ConfigField {
            key_path: "notify.base_url",
            env_keys: &["INTAKE_NOTIFY_BASE_URL"],
            value: config.notify.base_url.clone(),
        },
        ConfigField {
            key_path: "notify.timeout_secs",
            env_keys: &["INTAKE_NOTIFY_TIMEOUT_SECS"],
            value: config.notify.timeout_secs.to_string(),
        },
        ConfigField {
            key_path: "tunnel.auth_token",
            env_keys: &["INTAKE_TUNNEL_AUTH_TOKEN", "NGROK_AUTH_TOKEN"],
            value: tunnel_token,
        },
        ConfigField {
            key_path: "agent.kind",
            env_keys: &["INTAKE_AGENT_KIND"],
            value: format!("{:?}", config.agent.kind),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["INTAKE_LOGGING_LEVEL", "INTAKE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["INTAKE_LOGGING_FORMAT", "INTAKE_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("intake.toml"), PathBuf::from("config/intake.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &SecretString) -> String {
    redact_token(secret.expose_secret())
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once(['-', '_']) {
        if prefix.len() <= 4 {
            return format!("{prefix}-***");
        }
    }

    "<redacted>".to_string()
}
