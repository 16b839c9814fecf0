use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Сколько секунд операция может повторяться до отказа
    pub global_timeout_secs: u64,
    /// Пауза между попытками
    pub backoff_ms: u64,
    /// Сколько вызовов источника выполняется одновременно
    /// (и потоков рантайма с таймерами повторов)
    pub worker_threads: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            global_timeout_secs: 120,
            backoff_ms: 10,
            worker_threads: 2,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.global_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub polling_interval_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 1000,
        }
    }
}

impl ScanConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // WINSIFT_RETRY__BACKOFF_MS=20 -> retry.backoff_ms
        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("WINSIFT_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек повторов
        if self.retry.global_timeout_secs == 0 {
            anyhow::bail!("global_timeout_secs должно быть больше 0");
        }

        if self.retry.backoff_ms == 0 {
            anyhow::bail!("backoff_ms должно быть больше 0");
        }

        if self.retry.backoff() >= self.retry.global_timeout() {
            anyhow::bail!(
                "backoff_ms ({}) должно быть меньше global_timeout_secs ({} с)",
                self.retry.backoff_ms,
                self.retry.global_timeout_secs
            );
        }

        if self.retry.worker_threads == 0 {
            anyhow::bail!("worker_threads должно быть минимум 1");
        }

        if self.scan.polling_interval_ms < 100 {
            anyhow::bail!("polling_interval_ms должно быть минимум 100");
        }

        Ok(())
    }

    /// Директива фильтра для tracing: явный фильтр или уровень
    pub fn log_directive(&self) -> &str {
        self.logging
            .filter
            .as_deref()
            .unwrap_or(self.logging.level.as_str())
    }
}
