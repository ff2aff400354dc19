//! # Translation Buddy Library
//!
//! 网页文本就地翻译库：扫描 HTML 文档中可见的文本元素，经缓存与
//! 批量合并后调用谷歌翻译或 LLM 接口，把译文作为结果节点写回原
//! 元素。
//!
//! ## 模块组织
//!
//! - `session` - 翻译会话（扫描、分发、写回的上下文对象）
//! - `scanner` - 可翻译文本元素的收集与过滤规则
//! - `coordinator` - 翻译请求协调器（引擎选择、批量与回退）
//! - `backends` - 谷歌翻译与 LLM 后端
//! - `batch` - 批量文本的合并与拆分
//! - `writer` - 译文结果节点的样式推导与 DOM 写入
//! - `watcher` - DOM 变化与滚动事件的防抖
//! - `cache` - 会话级翻译缓存
//! - `settings` - 引擎与语言设置
//! - `dom` - HTML 解析、序列化与节点操作
//! - `geometry` - 视口几何与布局提供者
//! - `error` - 错误类型

pub mod backends;
pub mod batch;
pub mod cache;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod scanner;
pub mod session;
pub mod settings;
pub mod watcher;
pub mod writer;

// Re-export commonly used items for convenience
pub use coordinator::{Coordinator, CoordinatorHandle, Translation};
pub use error::{TranslationError, TranslationResult};
pub use session::TranslationSession;
pub use settings::{Engine, Settings, SettingsStore};
