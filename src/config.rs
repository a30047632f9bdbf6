use crate::object::ResolveOptions;
use crate::services::activation::ComponentRegistry;
use crate::services::naming::{NamingService, UrlDirectory};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub resolve: ResolveConfig,
    pub activation: ActivationConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Опции для вызовов `resolve_configured` / `resolve_async_configured`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveConfig {
    pub flags: u32,
    /// Миллисекунды, -1 отключает дедлайн.
    pub timeout_ms: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivationConfig {
    pub query_cache: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    pub url_root: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            resolve: ResolveConfig {
                flags: 0,
                timeout_ms: ResolveOptions::NO_TIMEOUT,
            },
            activation: ActivationConfig { query_cache: true },
            directory: DirectoryConfig {
                url_root: vec!["MATE".to_string(), "URL".to_string()],
            },
        }
    }
}

impl Config {
    /// Значения по умолчанию, затем TOML-файл (если есть), затем переменные
    /// `MONIKER_*` (`MONIKER_RESOLVE__TIMEOUT_MS=500`).
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("MONIKER_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.resolve.timeout_ms < ResolveOptions::NO_TIMEOUT {
            anyhow::bail!(
                "resolve.timeout_ms должно быть -1 или неотрицательным, получено {}",
                self.resolve.timeout_ms
            );
        }

        if self.directory.url_root.is_empty() {
            anyhow::bail!("directory.url_root должен содержать хотя бы один контекст");
        }
        for (i, element) in self.directory.url_root.iter().enumerate() {
            if element.is_empty() {
                anyhow::bail!("Пустой элемент #{} в directory.url_root", i + 1);
            }
        }

        Ok(())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::new(self.resolve.flags, self.resolve.timeout_ms)
    }

    pub fn component_registry(&self) -> ComponentRegistry {
        ComponentRegistry::new(self.activation.query_cache)
    }

    pub fn url_directory(&self, naming: Arc<dyn NamingService>) -> UrlDirectory {
        UrlDirectory::new(naming, self.directory.url_root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::testing::StubObject;
    use crate::services::naming::{MemoryNamingService, NamingContext};
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_options(), ResolveOptions::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resolve.timeout_ms = -5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.directory.url_root.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.directory.url_root.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load("/nonexistent/moniker.toml").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.directory.url_root, vec!["MATE", "URL"]);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("moniker-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[resolve]\ntimeout_ms = 250\n\n[directory]\nurl_root = [\"Apps\"]").unwrap();
        drop(file);

        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.resolve_options(), ResolveOptions::new(0, 250));
        assert_eq!(config.directory.url_root, vec!["Apps"]);
        assert!(config.activation.query_cache);
    }

    #[test]
    fn test_url_directory_uses_configured_root() {
        let mut config = Config::default();
        config.directory.url_root = vec!["Apps".to_string()];
        let naming = MemoryNamingService::new();
        let directory = config.url_directory(Arc::new(naming.clone()));

        directory.register("svc", "a", None, StubObject::new("a", &[])).unwrap();
        assert!(naming
            .root()
            .resolve_context(&crate::services::naming::parse_path("Apps/svc").unwrap())
            .is_ok());
    }
}
