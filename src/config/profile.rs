use crate::utils::error::{Result, SyncError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Connection profile for one remote deployment, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub profile: ProfileInfo,
    pub remote: RemoteConfig,
    pub auth: Option<AuthConfig>,
    pub pagination: Option<PaginationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub script_id: String,
    pub deploy_id: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
}

/// Either a prebuilt Authorization header or a key/secret pair consumed by
/// the signer. Values are usually `${ENV_VAR}` references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub header: Option<String>,
    pub key: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub page_size: Option<usize>,
    pub max_pages_per_sync: Option<u32>,
}

impl RemoteProfile {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "profile_toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ERP_AUTH_HEADER})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("remote.endpoint", &self.remote.endpoint)?;
        crate::utils::validation::validate_non_empty_string(
            "remote.script_id",
            &self.remote.script_id,
        )?;
        crate::utils::validation::validate_non_empty_string(
            "remote.deploy_id",
            &self.remote.deploy_id,
        )?;

        crate::utils::validation::validate_positive_number("pagination.page_size", self.page_size(), 1)?;
        crate::utils::validation::validate_range(
            "pagination.max_pages_per_sync",
            self.max_pages(),
            1,
            10_000,
        )?;

        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.pagination
            .as_ref()
            .and_then(|p| p.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn max_pages(&self) -> u32 {
        self.pagination
            .as_ref()
            .and_then(|p| p.max_pages_per_sync)
            .unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.remote.timeout_seconds
    }

    pub fn retry_attempts(&self) -> u32 {
        self.remote.retry_attempts.unwrap_or(0)
    }

    pub fn retry_delay_seconds(&self) -> u64 {
        self.remote.retry_delay_seconds.unwrap_or(1)
    }
}

impl Validate for RemoteProfile {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
