use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::agent_config::{AgentConfig, ChatGptAgentConfig, SpellerAgentConfig};
use crate::prompts;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub telephony: TelephonyConfig,
    pub notify: NotifyConfig,
    pub tunnel: TunnelConfig,
    pub agent: AgentSettings,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Public host the telephony provider calls back on, without scheme.
    pub base_url: String,
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
}

#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TunnelConfig {
    pub auth_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct AgentSettings {
    pub kind: AgentKind,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    ChatGpt,
    Speller,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub agent_kind: Option<AgentKind>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub telephony_account_sid: Option<String>,
    pub telephony_auth_token: Option<String>,
    pub notify_api_key: Option<String>,
    pub notify_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: String::new(),
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            llm: LlmConfig {
                api_key: String::new().into(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                timeout_secs: 30,
            },
            telephony: TelephonyConfig {
                account_sid: String::new(),
                auth_token: String::new().into(),
            },
            notify: NotifyConfig {
                api_key: String::new().into(),
                base_url: "https://api.courier.com".to_string(),
                timeout_secs: 10,
            },
            tunnel: TunnelConfig::default(),
            agent: AgentSettings { kind: AgentKind::ChatGpt },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat_gpt" | "chatgpt" => Ok(Self::ChatGpt),
            "speller" => Ok(Self::Speller),
            other => Err(ConfigError::Validation(format!(
                "unsupported agent kind `{other}` (expected chat_gpt|speller)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ServerConfig {
    pub fn public_url(&self, path: &str) -> String {
        format!("https://{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("intake.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Agent configuration handed to the factory for every inbound call.
    pub fn agent_config(&self) -> AgentConfig {
        match self.agent.kind {
            AgentKind::ChatGpt => AgentConfig::ChatGpt(ChatGptAgentConfig {
                initial_message: Some(prompts::INITIAL_GREETING.to_string()),
                prompt_preamble: prompts::INTAKE_PREAMBLE.to_string(),
                generate_responses: true,
            }),
            AgentKind::Speller => AgentConfig::Speller(SpellerAgentConfig::default()),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(base_url) = server.base_url {
                self.server.base_url = base_url;
            }
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = secret_value(llm_api_key_value);
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(telephony) = patch.telephony {
            if let Some(account_sid) = telephony.account_sid {
                self.telephony.account_sid = account_sid;
            }
            if let Some(auth_token_value) = telephony.auth_token {
                self.telephony.auth_token = secret_value(auth_token_value);
            }
        }

        if let Some(notify) = patch.notify {
            if let Some(notify_api_key_value) = notify.api_key {
                self.notify.api_key = secret_value(notify_api_key_value);
            }
            if let Some(base_url) = notify.base_url {
                self.notify.base_url = base_url;
            }
            if let Some(timeout_secs) = notify.timeout_secs {
                self.notify.timeout_secs = timeout_secs;
            }
        }

        if let Some(tunnel) = patch.tunnel {
            if let Some(auth_token_value) = tunnel.auth_token {
                self.tunnel.auth_token = Some(secret_value(auth_token_value));
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(kind) = agent.kind {
                self.agent.kind = kind;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INTAKE_SERVER_BASE_URL").or_else(|| read_env("BASE_URL")) {
            self.server.base_url = value;
        }
        if let Some(value) = read_env("INTAKE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("INTAKE_SERVER_PORT") {
            self.server.port = parse_u16("INTAKE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("INTAKE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("INTAKE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("INTAKE_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY")) {
            self.llm.api_key = secret_value(value);
        }
        if let Some(value) = read_env("INTAKE_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("INTAKE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("INTAKE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("INTAKE_LLM_TIMEOUT_SECS", &value)?;
        }

        let account_sid =
            read_env("INTAKE_TELEPHONY_ACCOUNT_SID").or_else(|| read_env("TWILIO_ACCOUNT_SID"));
        if let Some(value) = account_sid {
            self.telephony.account_sid = value;
        }
        let auth_token =
            read_env("INTAKE_TELEPHONY_AUTH_TOKEN").or_else(|| read_env("TWILIO_AUTH_TOKEN"));
        if let Some(value) = auth_token {
            self.telephony.auth_token = secret_value(value);
        }

        let notify_key = read_env("INTAKE_NOTIFY_API_KEY").or_else(|| read_env("COURIER_AUTH_TOKEN"));
        if let Some(value) = notify_key {
            self.notify.api_key = secret_value(value);
        }
        if let Some(value) = read_env("INTAKE_NOTIFY_BASE_URL") {
            self.notify.base_url = value;
        }
        if let Some(value) = read_env("INTAKE_NOTIFY_TIMEOUT_SECS") {
            self.notify.timeout_secs = parse_u64("INTAKE_NOTIFY_TIMEOUT_SECS", &value)?;
        }

        let tunnel_token =
            read_env("INTAKE_TUNNEL_AUTH_TOKEN").or_else(|| read_env("NGROK_AUTH_TOKEN"));
        if let Some(value) = tunnel_token {
            self.tunnel.auth_token = Some(secret_value(value));
        }

        if let Some(value) = read_env("INTAKE_AGENT_KIND") {
            self.agent.kind = value.parse()?;
        }

        let log_level = read_env("INTAKE_LOGGING_LEVEL").or_else(|| read_env("INTAKE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INTAKE_LOGGING_FORMAT").or_else(|| read_env("INTAKE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.server.base_url = base_url;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(agent_kind) = overrides.agent_kind {
            self.agent.kind = agent_kind;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = secret_value(llm_api_key);
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(account_sid) = overrides.telephony_account_sid {
            self.telephony.account_sid = account_sid;
        }
        if let Some(auth_token) = overrides.telephony_auth_token {
            self.telephony.auth_token = secret_value(auth_token);
        }
        if let Some(notify_api_key) = overrides.notify_api_key {
            self.notify.api_key = secret_value(notify_api_key);
        }
        if let Some(notify_base_url) = overrides.notify_base_url {
            self.notify.base_url = notify_base_url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_telephony(&self.telephony)?;
        validate_server(&self.server)?;
        validate_llm(&self.llm)?;
        validate_notify(&self.notify)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("intake.toml"), PathBuf::from("config/intake.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_telephony(telephony: &TelephonyConfig) -> Result<(), ConfigError> {
    let account_sid = telephony.account_sid.trim();
    if account_sid.is_empty() {
        return Err(ConfigError::Validation(
            "telephony.account_sid is required. Find it on the Twilio console dashboard (Account Info > Account SID)".to_string(),
        ));
    }
    if !account_sid.starts_with("AC") {
        let hint = if account_sid.starts_with("SK") {
            " (hint: you may have used an API key SID instead of the account SID)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "telephony.account_sid must start with `AC`{hint}"
        )));
    }

    if telephony.auth_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "telephony.auth_token is required. Find it on the Twilio console dashboard (Account Info > Auth Token)".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    let base_url = server.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::Validation(
            "server.base_url is required (set BASE_URL to the public host that forwards to this server)"
                .to_string(),
        ));
    }
    if base_url.contains("://") {
        return Err(ConfigError::Validation(format!(
            "server.base_url must be a bare host such as `intake.example.com`, without a scheme (got `{base_url}`)"
        )));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if llm.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm.api_key is required (set OPENAI_API_KEY or INTAKE_LLM_API_KEY)".to_string(),
        ));
    }
    validate_http_url("llm.base_url", &llm.base_url)?;
    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }
    Ok(())
}

fn validate_notify(notify: &NotifyConfig) -> Result<(), ConfigError> {
    if notify.timeout_secs == 0 || notify.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "notify.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if notify.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "notify.api_key is required (set COURIER_AUTH_TOKEN or INTAKE_NOTIFY_API_KEY)"
                .to_string(),
        ));
    }
    validate_http_url("notify.base_url", &notify.base_url)
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Validation(format!("{key} must start with http:// or https://")));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    llm: Option<LlmPatch>,
    telephony: Option<TelephonyPatch>,
    notify: Option<NotifyPatch>,
    tunnel: Option<TunnelPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    base_url: Option<String>,
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TelephonyPatch {
    account_sid: Option<String>,
    auth_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotifyPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TunnelPatch {
    auth_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    kind: Option<AgentKind>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

/// Every environment variable the loader reads. Tests clear these so the
/// host environment cannot leak into assertions.
pub const ENV_KEYS: &[&str] = &[
    "INTAKE_SERVER_BASE_URL",
    "BASE_URL",
    "INTAKE_SERVER_BIND_ADDRESS",
    "INTAKE_SERVER_PORT",
    "INTAKE_SERVER_GRACEFUL_SHUTDOWN_SECS",
    "INTAKE_LLM_API_KEY",
    "OPENAI_API_KEY",
    "INTAKE_LLM_BASE_URL",
    "INTAKE_LLM_MODEL",
    "INTAKE_LLM_TIMEOUT_SECS",
    "INTAKE_TELEPHONY_ACCOUNT_SID",
    "TWILIO_ACCOUNT_SID",
    "INTAKE_TELEPHONY_AUTH_TOKEN",
    "TWILIO_AUTH_TOKEN",
    "INTAKE_NOTIFY_API_KEY",
    "COURIER_AUTH_TOKEN",
    "INTAKE_NOTIFY_BASE_URL",
    "INTAKE_NOTIFY_TIMEOUT_SECS",
    "INTAKE_TUNNEL_AUTH_TOKEN",
    "NGROK_AUTH_TOKEN",
    "INTAKE_AGENT_KIND",
    "INTAKE_LOGGING_LEVEL",
    "INTAKE_LOG_LEVEL",
    "INTAKE_LOGGING_FORMAT",
    "INTAKE_LOG_FORMAT",
];

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{
        AgentKind, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, ENV_KEYS,
    };
    use crate::domain::agent_config::AgentConfig;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], test: impl FnOnce() -> T) -> Result<T, String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        for key in ENV_KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let result = test();

        for (key, _) in vars {
            env::remove_var(key);
        }
        Ok(result)
    }

    const VALID_ENV: &[(&str, &str)] = &[
        ("BASE_URL", "intake.example.com"),
        ("OPENAI_API_KEY", "sk-test"),
        ("TWILIO_ACCOUNT_SID", "AC0123456789"),
        ("TWILIO_AUTH_TOKEN", "twilio-secret-value"),
        ("COURIER_AUTH_TOKEN", "pk_courier-secret-value"),
    ];

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn unprefixed_provider_variables_are_accepted() -> Result<(), String> {
        with_env(VALID_ENV, || -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.base_url == "intake.example.com", "base url from BASE_URL")?;
            ensure(config.llm.api_key.expose_secret() == "sk-test", "llm key from OPENAI_API_KEY")?;
            ensure(config.telephony.account_sid == "AC0123456789", "sid from TWILIO_ACCOUNT_SID")?;
            ensure(config.llm.model == "gpt-3.5-turbo", "default completion model")?;
            ensure(config.agent.kind == AgentKind::ChatGpt, "default agent is chat gpt")?;
            ensure(config.tunnel.auth_token.is_none(), "tunnel token is optional")?;
            Ok(())
        })?
    }

    #[test]
    fn prefixed_variables_win_over_unprefixed_aliases() -> Result<(), String> {
        let mut vars = VALID_ENV.to_vec();
        vars.push(("INTAKE_LLM_API_KEY", "sk-prefixed"));
        vars.push(("INTAKE_LOG_LEVEL", "warn"));
        vars.push(("INTAKE_LOG_FORMAT", "pretty"));

        with_env(&vars, || -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.api_key.expose_secret() == "sk-prefixed", "prefixed key should win")?;
            ensure(config.logging.level == "warn", "log level alias should apply")?;
            ensure(matches!(config.logging.format, LogFormat::Pretty), "log format alias")?;
            Ok(())
        })?
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let vars = [("TEST_TWILIO_TOKEN", "from-env-token")];
        with_env(&vars, || -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("intake.toml");
            fs::write(
                &path,
                r#"
[server]
base_url = "calls.example.org"
port = 4000

[llm]
api_key = "sk-file"

[telephony]
account_sid = "ACfile"
auth_token = "${TEST_TWILIO_TOKEN}"

[notify]
api_key = "courier-file"

[agent]
kind = "speller"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telephony.auth_token.expose_secret() == "from-env-token",
                "auth token should be interpolated from environment",
            )?;
            ensure(config.server.port == 4000, "port should come from file")?;
            ensure(config.agent.kind == AgentKind::Speller, "agent kind should come from file")?;
            Ok(())
        })?
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let mut vars = VALID_ENV.to_vec();
        vars.push(("INTAKE_LLM_MODEL", "gpt-from-env"));

        with_env(&vars, || -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("intake.toml");
            fs::write(
                &path,
                r#"
[llm]
model = "gpt-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.model == "gpt-from-env", "env model should win over file")?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            Ok(())
        })?
    }

    #[test]
    fn missing_telephony_credentials_fail_fast() -> Result<(), String> {
        let vars: Vec<_> =
            VALID_ENV.iter().copied().filter(|(key, _)| *key != "TWILIO_AUTH_TOKEN").collect();

        with_env(&vars, || -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected validation failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::Validation(ref message) if message.contains("telephony.auth_token")),
                "validation failure should mention telephony.auth_token",
            )
        })?
    }

    #[test]
    fn base_url_with_scheme_is_rejected() -> Result<(), String> {
        let mut vars: Vec<_> =
            VALID_ENV.iter().copied().filter(|(key, _)| *key != "BASE_URL").collect();
        vars.push(("BASE_URL", "https://intake.example.com"));

        with_env(&vars, || -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected validation failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::Validation(ref message) if message.contains("server.base_url")),
                "validation failure should mention server.base_url",
            )
        })?
    }

    #[test]
    fn invalid_numeric_override_is_reported() -> Result<(), String> {
        let mut vars = VALID_ENV.to_vec();
        vars.push(("INTAKE_SERVER_PORT", "eighty"));

        with_env(&vars, || -> Result<(), String> {
            ensure(
                matches!(
                    AppConfig::load(LoadOptions::default()),
                    Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "INTAKE_SERVER_PORT"
                ),
                "bad port should surface as invalid env override",
            )
        })?
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        with_env(VALID_ENV, || -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("twilio-secret-value"), "debug must not contain auth token")?;
            ensure(!debug.contains("pk_courier-secret-value"), "debug must not contain notify key")?;
            ensure(matches!(config.logging.format, LogFormat::Compact), "default format compact")?;
            Ok(())
        })?
    }

    #[test]
    fn agent_config_follows_configured_kind() -> Result<(), String> {
        with_env(VALID_ENV, || -> Result<(), String> {
            let mut config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            let AgentConfig::ChatGpt(chat) = config.agent_config() else {
                return Err("default agent config should be chat gpt".to_string());
            };
            ensure(chat.generate_responses, "chat gpt agent generates responses")?;
            ensure(
                chat.initial_message.as_deref().is_some_and(|m| m.starts_with("Hello!")),
                "greeting should be set",
            )?;

            config.agent.kind = AgentKind::Speller;
            ensure(
                matches!(config.agent_config(), AgentConfig::Speller(_)),
                "speller kind should map to speller config",
            )?;
            ensure(
                config.server.public_url("/inbound_call") == "https://intake.example.com/inbound_call",
                "public url should be https on the base host",
            )?;
            Ok(())
        })?
    }
}
