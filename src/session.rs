//! 翻译会话
//!
//! 会话是激活一次翻译产生的显式上下文对象，持有映射、缓存、
//! 已翻译集合与激活标志，停用时整体清空。所有可变状态集中在
//! 这里，不会跨激活泄漏。
//!
//! 流程：扫描建立映射 → 分拣缓存命中（同步写回）与未命中
//! （发往协调器）→ 结果消息回流时写缓存并更新 DOM。滚动与 DOM
//! 变化经防抖后触发增量重扫。重叠的扫描可能对尚未回流的同一
//! 原文重复发起请求，这里有意不做在途去重。

use std::collections::HashSet;

use markup5ever_rcdom::RcDom;
use tokio::sync::mpsc;

use crate::cache::TranslationCache;
use crate::coordinator::{CoordinatorHandle, Translation};
use crate::error::TranslationResult;
use crate::geometry::{LayoutProvider, Viewport};
use crate::scanner::{Scanner, TextElementMap};
use crate::watcher::{self, DomEvent};
use crate::writer::ResultWriter;

/// 翻译会话
pub struct TranslationSession {
    dom: RcDom,
    scanner: Scanner,
    layout: Box<dyn LayoutProvider>,
    coordinator: CoordinatorHandle,

    map: TextElementMap,
    cache: TranslationCache,
    translated: HashSet<usize>,
    active: bool,

    reply_tx: mpsc::Sender<Translation>,
    reply_rx: mpsc::Receiver<Translation>,
    /// 已发出、尚未回流的原文（文档模式驱动器用它判断何时收敛）
    pending: HashSet<String>,
}

impl TranslationSession {
    pub fn new(
        dom: RcDom,
        coordinator: CoordinatorHandle,
        layout: Box<dyn LayoutProvider>,
        viewport: Viewport,
    ) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel(256);
        Self {
            dom,
            scanner: Scanner::new(viewport),
            layout,
            coordinator,
            map: TextElementMap::new(),
            cache: TranslationCache::new(),
            translated: HashSet::new(),
            active: false,
            reply_tx,
            reply_rx,
            pending: HashSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 激活翻译：建立状态并立即扫描当前内容
    pub async fn activate(&mut self) -> TranslationResult<()> {
        if self.active {
            return Ok(());
        }
        self.active = true;
        tracing::info!("翻译已激活");
        self.rescan().await
    }

    /// 重新扫描并分发（激活时、滚动或 DOM 变化防抖后调用）
    pub async fn rescan(&mut self) -> TranslationResult<()> {
        if !self.active {
            return Ok(());
        }
        self.scanner
            .scan(&self.dom, self.layout.as_ref(), &self.translated, &mut self.map);
        self.process_translation().await
    }

    /// 分拣缓存命中与未命中并分发
    async fn process_translation(&mut self) -> TranslationResult<()> {
        if !self.active || self.map.is_empty() {
            return Ok(());
        }

        let mut texts_to_translate: Vec<String> = Vec::new();
        let mut cached_texts: Vec<String> = Vec::new();
        for text in self.map.texts() {
            if self.cache.contains(text) {
                cached_texts.push(text.to_string());
            } else {
                texts_to_translate.push(text.to_string());
            }
        }

        tracing::debug!(
            "总文本数: {}，需要翻译: {}，已缓存: {}",
            self.map.len(),
            texts_to_translate.len(),
            cached_texts.len()
        );

        // 缓存命中：同步写回，覆盖本轮新发现的同文元素
        for text in cached_texts {
            if let Some(translated_text) = self.cache.get(&text) {
                if let Some(elements) = self.map.elements_of(&text) {
                    ResultWriter::insert_for_all(
                        &self.dom,
                        elements,
                        &mut self.translated,
                        &translated_text,
                    );
                }
            }
        }

        // 未命中：一次请求携带全部去重原文
        if !texts_to_translate.is_empty() {
            self.pending.extend(texts_to_translate.iter().cloned());
            self.coordinator
                .translate_texts(texts_to_translate, self.reply_tx.clone())
                .await?;
        }
        Ok(())
    }

    /// 处理一条回流的翻译结果
    ///
    /// 停用后到达的迟到结果被静默丢弃，不写缓存。译文先入缓存再做
    /// 可见性检查：不可见译文不改 DOM，但缓存住避免反复重新请求。
    pub fn handle_translation(&mut self, message: Translation) {
        self.pending.remove(&message.original_text);

        if !self.active {
            tracing::debug!("会话已停用，丢弃迟到的翻译结果");
            return;
        }

        self.cache.insert(
            message.original_text.clone(),
            message.translated_text.clone(),
        );

        let elements = match self.map.elements_of(&message.original_text) {
            Some(elements) if !elements.is_empty() => elements.to_vec(),
            _ => {
                tracing::warn!("无法找到原文对应的元素列表");
                return;
            }
        };

        let updated = ResultWriter::insert_for_all(
            &self.dom,
            &elements,
            &mut self.translated,
            &message.translated_text,
        );
        tracing::debug!("翻译已插入到 {} 个元素", updated);
    }

    /// 监听 DOM 变化与滚动事件并在防抖后重新扫描
    ///
    /// 事件先经 300 毫秒防抖合并（见 [`watcher::debounce`]），每次
    /// 触发做一轮 重新扫描 + 分发。所有事件句柄被丢弃后返回；会话
    /// 未激活时直接返回。回流结果仍由 [`Self::run_until_settled`]
    /// 或 [`Self::handle_translation`] 消化。
    pub async fn run_watched(
        &mut self,
        events: mpsc::Receiver<DomEvent>,
    ) -> TranslationResult<()> {
        let mut triggers = watcher::debounce(events);
        while self.active {
            match triggers.recv().await {
                Some(()) => self.rescan().await?,
                None => break,
            }
        }
        Ok(())
    }

    /// 文档模式驱动器：接收结果直到所有在途原文回流完毕
    pub async fn run_until_settled(&mut self) {
        while !self.pending.is_empty() {
            match self.reply_rx.recv().await {
                Some(message) => self.handle_translation(message),
                None => break,
            }
        }
    }

    /// 停用翻译：清空映射、缓存与已翻译集合
    ///
    /// 在途请求不取消，其结果到达时经 `handle_translation` 的激活
    /// 检查被丢弃。
    pub fn deactivate(&mut self) {
        self.active = false;
        self.map.clear();
        self.cache.clear();
        self.translated.clear();
        tracing::info!("翻译已停用");
    }

    /// 缓存统计（命中率等）
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats().clone()
    }

    /// 结束会话并取回 DOM
    pub fn into_dom(self) -> RcDom {
        self.dom
    }
}
