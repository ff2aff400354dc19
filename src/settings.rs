//! 翻译设置管理
//!
//! 通过键值存储抽象读取用户设置，逐字段应用默认值。存储读取失败
//! 从不向用户暴露，只记录日志并回退到默认配置。

use std::collections::HashMap;
use std::path::Path;

use crate::error::{TranslationError, TranslationResult};

/// 设置相关常量
pub mod keys {
    /// 翻译引擎选择
    pub const ENGINE: &str = "translator-engine";
    /// 源语言
    pub const SOURCE_LANG: &str = "translator-source-lang";
    /// 目标语言
    pub const TARGET_LANG: &str = "translator-target-lang";
    /// 大模型 API 地址
    pub const LLM_BASE_URL: &str = "translator-llm-baseurl";
    /// 大模型 API 密钥
    pub const LLM_API_KEY: &str = "translator-llm-apikey";
    /// 大模型名称
    pub const LLM_MODEL: &str = "translator-llm-model";
}

/// 默认值
pub mod defaults {
    pub const ENGINE: &str = "google";
    pub const SOURCE_LANG: &str = "auto";
    pub const TARGET_LANG: &str = "zh";
    pub const LLM_MODEL: &str = "gpt-3.5-turbo";
}

/// 设置文件搜索路径
pub const SETTINGS_PATHS: &[&str] = &[
    "translation-buddy.toml",
    ".translation-buddy.toml",
    "~/.config/translation-buddy/settings.toml",
];

/// 翻译引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// 公共机器翻译端点，逐条翻译
    Google,
    /// 大模型聊天端点，支持批量翻译
    Llm,
}

impl Engine {
    /// 解析引擎标识，未知值回退到默认引擎
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "llm" => Engine::Llm,
            _ => Engine::Google,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Google => "google",
            Engine::Llm => "llm",
        }
    }
}

/// 大模型端点设置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmSettings {
    /// 聊天补全端点地址
    pub base_url: String,
    /// Bearer 令牌
    pub api_key: String,
    /// 模型名称
    pub model_name: String,
}

impl LlmSettings {
    /// 凭据是否完整（地址与密钥都非空）
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// 翻译设置
///
/// 每次翻译请求加载一次，字段缺失或存储读取失败时逐字段回退默认值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub engine: Engine,
    pub source_language: String,
    pub target_language: String,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: Engine::Google,
            source_language: defaults::SOURCE_LANG.to_string(),
            target_language: defaults::TARGET_LANG.to_string(),
            llm: LlmSettings {
                base_url: String::new(),
                api_key: String::new(),
                model_name: defaults::LLM_MODEL.to_string(),
            },
        }
    }
}

impl Settings {
    /// 从键值存储加载设置，逐字段应用默认值
    pub fn from_store(store: &dyn SettingsStore) -> Self {
        let get = |key: &str, default: &str| -> String {
            store
                .get(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            engine: Engine::parse(&get(keys::ENGINE, defaults::ENGINE)),
            source_language: get(keys::SOURCE_LANG, defaults::SOURCE_LANG),
            target_language: get(keys::TARGET_LANG, defaults::TARGET_LANG),
            llm: LlmSettings {
                base_url: get(keys::LLM_BASE_URL, ""),
                api_key: get(keys::LLM_API_KEY, ""),
                model_name: get(keys::LLM_MODEL, defaults::LLM_MODEL),
            },
        }
    }
}

/// 键值设置存储抽象
///
/// 由 TOML 文件或内存表实现；嵌入方可以接入自己的存储。
pub trait SettingsStore: Send + Sync {
    /// 读取指定键的值，键不存在时返回 `None`
    fn get(&self, key: &str) -> Option<String>;
}

/// 内存设置存储，主要用于测试和 CLI 参数覆盖
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// TOML 文件设置存储
///
/// 文件是一张平铺的字符串表：
///
/// ```toml
/// "translator-engine" = "llm"
/// "translator-target-lang" = "zh"
/// "translator-llm-baseurl" = "https://api.openai.com/v1/chat/completions"
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlSettingsStore {
    values: HashMap<String, String>,
}

impl TomlSettingsStore {
    /// 从文件加载，文件不存在或解析失败返回错误（调用方回退默认值）
    pub fn load<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TranslationError::ConfigError(format!(
                "读取设置文件失败 {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    /// 从 TOML 字符串加载
    pub fn from_str(content: &str) -> TranslationResult<Self> {
        let table: toml::Table = content.parse()?;
        let mut values = HashMap::new();
        for (key, value) in table {
            if let toml::Value::String(s) = value {
                values.insert(key, s);
            }
        }
        Ok(Self { values })
    }

    /// 在标准路径中查找并加载设置文件，找不到时返回空存储
    pub fn discover() -> Self {
        for path in SETTINGS_PATHS {
            let expanded = expand_home(path);
            if Path::new(&expanded).exists() {
                match Self::load(&expanded) {
                    Ok(store) => {
                        tracing::debug!("已加载设置文件: {}", expanded);
                        return store;
                    }
                    Err(e) => {
                        tracing::warn!("设置文件无效，已忽略 {}: {}", expanded, e);
                    }
                }
            }
        }
        Self::default()
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return Path::new(&home).join(rest).display().to_string();
        }
    }
    path.to_string()
}
