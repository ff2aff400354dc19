//! 翻译缓存
//!
//! 原文 → 译文 的会话级缓存。生命周期与翻译会话一致：激活时创建，
//! 停用时整体清空，期间不做任何淘汰。不变式：只要原文在缓存中，
//! 就不会再次发往后端。

use std::collections::HashMap;

/// 缓存统计信息
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
}

impl CacheStats {
    /// 缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

/// 翻译缓存
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
    stats: CacheStats,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询译文并记录命中统计
    pub fn get(&mut self, original: &str) -> Option<String> {
        self.stats.total_requests += 1;
        match self.entries.get(original) {
            Some(translated) => {
                self.stats.cache_hits += 1;
                Some(translated.clone())
            }
            None => {
                self.stats.cache_misses += 1;
                None
            }
        }
    }

    /// 只读探测，不影响统计
    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    /// 写入译文
    pub fn insert(&mut self, original: String, translated: String) {
        self.entries.insert(original, translated);
        self.stats.total_entries = self.entries.len();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 整体清空（会话停用时调用）
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.total_entries = 0;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
