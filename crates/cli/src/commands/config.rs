use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ipmes_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// One rendered setting: dotted key, env var(s) that override it, value.
struct Setting<'a> {
    key: &'a str,
    env_keys: &'a [&'a str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let settings = [
        Setting {
            key: "api.base_url",
            env_keys: &["IPMES_API_BASE_URL"],
            value: config.api.base_url.clone(),
        },
        Setting {
            key: "api.timeout_secs",
            env_keys: &["IPMES_API_TIMEOUT_SECS"],
            value: config.api.timeout_secs.to_string(),
        },
        Setting {
            key: "files.base_url",
            env_keys: &["IPMES_FILE_SERVER_BASE_URL"],
            value: config.files.base_url.clone(),
        },
        Setting {
            key: "session.token_path",
            env_keys: &["IPMES_SESSION_TOKEN_PATH"],
            value: config.session.token_path.display().to_string(),
        },
        Setting {
            key: "session.token",
            env_keys: &[],
            value: stored_token_state(&config.session.token_path),
        },
        Setting {
            key: "logging.level",
            env_keys: &["IPMES_LOGGING_LEVEL", "IPMES_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Setting {
            key: "logging.format",
            env_keys: &["IPMES_LOGGING_FORMAT", "IPMES_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for setting in &settings {
        let source = if setting.key == "session.token" {
            "token file".to_string()
        } else {
            field_source(
                setting.key,
                setting.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            )
        };
        lines.push(render_line(setting.key, &setting.value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    ["ipmes.toml", "config/ipmes.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
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

/// The token itself is never printed.
fn stored_token_state(path: &Path) -> String {
    use ipmes_core::session::{FileTokenStore, TokenStore};

    match FileTokenStore::new(path).load() {
        Ok(Some(_)) => "<redacted>".to_string(),
        Ok(None) => "<unset>".to_string(),
        Err(_) => "<unreadable>".to_string(),
    }
}
