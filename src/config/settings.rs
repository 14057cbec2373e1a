// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::source::Source;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含浏览器、数据库、日志和站点列表等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 站点列表，未配置时使用内置站点
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 单个等待或导航操作的超时（毫秒），必须配置
    pub timeout_ms: u64,
    /// 是否以无头模式启动
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// 已运行浏览器的调试地址，配置后不再启动本地浏览器
    #[serde(default)]
    pub remote_url: Option<String>,
    /// 浏览器可执行文件路径
    #[serde(default)]
    pub executable: Option<String>,
    /// 等待查询匹配时的轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 默认过滤表达式，`RUST_LOG` 优先
    #[serde(default = "default_filter")]
    pub filter: String,
    /// 错误日志文件，配置后错误级别日志同时追加写入该文件
    #[serde(default)]
    pub error_file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            error_file: None,
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_filter() -> String {
    "info".to_string()
}

impl BrowserSettings {
    /// 仅指定超时、其余使用默认值的浏览器配置
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            headless: default_headless(),
            remote_url: None,
            executable: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 先加载 `.env`，再依次叠加默认值、配置文件和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败或缺少超时配置
    pub fn new() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("VACANCY").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    /// 从已构建的配置中反序列化并校验
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 带默认值的配置构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("browser.headless", true)?
            .set_default("browser.poll_interval_ms", 100)?
            .set_default("database.url", "sqlite://vacancies.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("logging.filter", "info")?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "browser.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.browser.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "browser.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 全局单操作超时
    pub fn timeout(&self) -> Duration {
        self.browser.timeout()
    }
}
