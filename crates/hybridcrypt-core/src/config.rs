//! Client configuration model and loaders.

use crate::error::{HybridError, HybridResult};
use directories_next::{ProjectDirs, UserDirs};
use hybridcrypt_contract::EncryptionMode;
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub const CONFIG_ENV: &str = "HYBRIDCRYPT_CONFIG";
pub const SERVICE_URL_ENV: &str = "HYBRIDCRYPT_SERVICE_URL";
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5002";
const CONFIG_FILE_NAME: &str = "hybridcrypt.toml";
const APP_QUALIFIER: &str = "io";
const APP_ORGANIZATION: &str = "HybridCrypt";
const APP_NAME: &str = "hybridcrypt";
const MAX_AUTO_ADVANCE_MS: u64 = 60_000;

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

/// Where the remote service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceCfg {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceCfg {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Step workflow knobs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowCfg {
    /// Delay before a successful step advances to the next one.
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u64,

    #[serde(default)]
    #[schemars(with = "String")]
    pub default_mode: EncryptionMode,

    /// Where downloaded artifacts are written.
    #[serde(default)]
    pub download_dir: Option<String>,
}

fn default_auto_advance_ms() -> u64 {
    1_500
}

impl Default for WorkflowCfg {
    fn default() -> Self {
        Self {
            auto_advance_ms: default_auto_advance_ms(),
            default_mode: EncryptionMode::default(),
            download_dir: None,
        }
    }
}

/// Notification behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlertCfg {
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

fn default_dismiss_after_ms() -> u64 {
    5_000
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

/// Top-level configuration snapshot loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceCfg,

    #[serde(default)]
    pub workflow: WorkflowCfg,

    #[serde(default)]
    pub alerts: AlertCfg,

    #[serde(skip)]
    pub path: PathBuf,
}

impl ClientConfig {
    /// Per-user configuration path.
    pub fn user_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Pick the configuration path: explicit flag, then `HYBRIDCRYPT_CONFIG`, then the user dir.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        Self::user_config_path().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load configuration from disk, writing a bootstrap copy first when missing.
    pub fn load_or_bootstrap<P: AsRef<Path>>(path: P) -> HybridResult<Self> {
        let target = path.as_ref();
        if target.exists() {
            return Self::load(target);
        }

        match ensure_bootstrap_file(target) {
            Ok(created) => {
                if created {
                    info!("hybridcrypt config bootstrap created at {}", target.display());
                }
                Self::load(target)
            }
            Err(err) => Err(HybridError::InvalidConfig(format!(
                "failed to initialise configuration at {}: {err}",
                target.display()
            ))),
        }
    }

    /// Read a config file, detect its format, and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> HybridResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        );
        let mut cfg = if is_yaml {
            serde_yaml::from_str::<Self>(&contents)?
        } else {
            toml::from_str::<Self>(&contents)?
        };

        cfg.path = path.to_path_buf();
        cfg.apply_env_overrides();

        if cfg.service.base_url.trim().is_empty() {
            return Err(HybridError::InvalidConfig(
                "service.base_url must not be empty".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Let `HYBRIDCRYPT_SERVICE_URL` point the client at another service.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(SERVICE_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() && url != self.service.base_url {
                warn!(
                    "service URL overridden by {SERVICE_URL_ENV}: {} -> {url}",
                    self.service.base_url
                );
                self.service.base_url = url.to_string();
            }
        }
    }

    /// Perform a best-effort validation pass and return human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let url = self.service.base_url.trim();
        if url.is_empty() {
            issues.push("service.base_url must not be empty".to_string());
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(format!(
                "service.base_url must start with http:// or https:// (found `{url}`)"
            ));
        }
        if self.service.timeout_secs == 0 {
            issues.push("service.timeout_secs must be at least 1".to_string());
        }
        if self.workflow.auto_advance_ms == 0 {
            issues.push("workflow.auto_advance_ms must be greater than 0".to_string());
        }
        if self.workflow.auto_advance_ms > MAX_AUTO_ADVANCE_MS {
            issues.push(format!(
                "workflow.auto_advance_ms must not exceed {MAX_AUTO_ADVANCE_MS}"
            ));
        }
        if let Some(dir) = &self.workflow.download_dir {
            if dir.trim().is_empty() {
                issues.push("workflow.download_dir is set but empty".to_string());
            }
        }
        if self.alerts.dismiss_after_ms == 0 {
            issues.push("alerts.dismiss_after_ms must be greater than 0".to_string());
        }

        issues
    }

    pub fn service_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.workflow.auto_advance_ms)
    }

    pub fn alert_lifetime(&self) -> Duration {
        Duration::from_millis(self.alerts.dismiss_after_ms)
    }

    /// Resolve the artifact download directory: configured, then the user's Downloads, then `.`.
    pub fn download_dir(&self) -> PathBuf {
        self.workflow
            .download_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Commented template written on first run.
pub fn bootstrap_template() -> String {
    format!(
        "# Auto-generated HybridCrypt client configuration.\n\n[service]\n# Base URL of the key exchange / encryption service.\nbase_url = \"{DEFAULT_SERVICE_URL}\"\ntimeout_secs = {}\n\n[workflow]\n# Delay before a finished step advances to the next one.\nauto_advance_ms = {}\n# Block mode used for encryption: \"gcm\" or \"cbc\".\ndefault_mode = \"gcm\"\n# download_dir = \"/home/user/Downloads\"\n\n[alerts]\ndismiss_after_ms = {}\n",
        default_timeout_secs(),
        default_auto_advance_ms(),
        default_dismiss_after_ms()
    )
}

fn ensure_bootstrap_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(mut file) => {
            file.write_all(bootstrap_template().as_bytes())?;
            file.flush()?;
            #[cfg(unix)]
            fs::set_permissions(path, PermissionsExt::from_mode(0o600))?;
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}
