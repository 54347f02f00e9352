use crate::core::cache::{CacheStore, MemoryCacheStore, NoopCacheStore};
use crate::core::identity::DEFAULT_STUDENT_ID_HEADER;
use crate::utils::error::{InquiryError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data: Option<DataConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "grade-inquiry".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub header_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_STUDENT_ID_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: Option<u64>,
    pub max_entries: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: None,
            max_entries: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub fixture_path: String,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InquiryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` references.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InquiryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| InquiryError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn header_name(&self) -> &str {
        &self.identity.header_name
    }

    pub fn fixture_path(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.fixture_path.as_str())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache.ttl_seconds.map(Duration::from_secs)
    }

    /// Builds the cache store this configuration describes.
    pub fn cache_store(&self) -> Arc<dyn CacheStore> {
        if !self.cache.enabled {
            tracing::info!("Grade cache disabled");
            return Arc::new(NoopCacheStore);
        }

        let mut store = MemoryCacheStore::new();
        if let Some(ttl) = self.cache_ttl() {
            store = store.with_ttl(ttl);
        }
        if let Some(max_entries) = self.cache.max_entries {
            store = store.with_max_entries(usize::try_from(max_entries).unwrap_or(usize::MAX));
        }
        tracing::info!(
            "Grade cache enabled (ttl: {:?}, max entries: {:?})",
            self.cache_ttl(),
            self.cache.max_entries
        );
        Arc::new(store)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("service.name", &self.service.name)?;
        validation::validate_header_name("identity.header_name", &self.identity.header_name)?;

        if let Some(ttl) = self.cache.ttl_seconds {
            validation::validate_range("cache.ttl_seconds", ttl, 1, MAX_TTL_SECONDS)?;
        }
        if let Some(max_entries) = self.cache.max_entries {
            validation::validate_positive_number("cache.max_entries", max_entries, 1)?;
        }

        if let Some(path) = self.fixture_path() {
            if path.contains("${") {
                return Err(InquiryError::InvalidConfigValueError {
                    field: "data.fixture_path".to_string(),
                    value: path.to_string(),
                    reason: "Unresolved environment variable".to_string(),
                });
            }
            validation::validate_path("data.fixture_path", path)?;
            validation::validate_file_extension("data.fixture_path", path, &["toml"])?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[service]
name = "registrar-grades"

[identity]
header_name = "X-Student-Id"

[cache]
enabled = true
ttl_seconds = 600
max_entries = 5000

[data]
fixture_path = "./records.toml"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.service.name, "registrar-grades");
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.fixture_path(), Some("./records.toml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.header_name(), "X-Student-Id");
        assert!(config.cache.enabled);
        assert_eq!(config.cache_ttl(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GRADE_INQUIRY_TEST_FIXTURE", "/srv/grades/records.toml");

        let toml_content = r#"
[data]
fixture_path = "${GRADE_INQUIRY_TEST_FIXTURE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.fixture_path(), Some("/srv/grades/records.toml"));

        std::env::remove_var("GRADE_INQUIRY_TEST_FIXTURE");
    }

    #[test]
    fn test_unresolved_env_var_fails_validation() {
        let toml_content = r#"
[data]
fixture_path = "${GRADE_INQUIRY_SURELY_UNSET_VAR}"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[cache]\nenabled = true\nttl_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[identity]\nheader_name = \"X Student\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_disabled_cache_builds_noop_store() {
        use crate::core::cache::{CacheKey, CachedValue};
        use crate::domain::model::{StudentId, Term};

        let config = TomlConfig::from_toml_str("[cache]\nenabled = false\n").unwrap();
        let store = config.cache_store();
        let key = CacheKey::Terms {
            student_id: StudentId(1),
        };
        store
            .put(key.clone(), CachedValue::Terms(vec![Term::from("2024-1")]))
            .await;
        assert!(store.get(&key).await.is_none());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[service]\nname = \"file-test\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.service.name, "file-test");
    }
}
