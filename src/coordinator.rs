//! 后台翻译协调器
//!
//! 独立的后台任务：接收会话发来的去重原文列表，按设置选择后端，
//! 把结果作为独立消息流式发回。一次请求对应零到多条响应，请求
//! 被通道接收即视为确认。
//!
//! 谷歌引擎逐条翻译，每条完成即发回，完成顺序不定；大模型引擎
//! 批量拼接翻译，批量调用出错时整批回退到逐条调用。所有失败
//! 最终都以哨兵译文的形式发回，协调器本身从不停摆。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backends::{failure_sentinel, google, llm};
use crate::batch::{join_batch, split_batch, valid_texts};
use crate::error::{TranslationError, TranslationResult};
use crate::settings::{Engine, Settings, SettingsStore};

/// 一条翻译结果消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub original_text: String,
    pub translated_text: String,
}

/// 一次翻译请求
///
/// `reply` 是显式的结果流通道：请求方收到的每条 [`Translation`]
/// 对应一条已解析的原文。
pub struct TranslateRequest {
    pub texts: Vec<String>,
    pub reply: mpsc::Sender<Translation>,
}

/// 协调器句柄，会话侧用它提交请求
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<TranslateRequest>,
}

impl CoordinatorHandle {
    /// 提交一批待翻译原文；通道接收成功即为确认
    pub async fn translate_texts(
        &self,
        texts: Vec<String>,
        reply: mpsc::Sender<Translation>,
    ) -> TranslationResult<()> {
        self.tx
            .send(TranslateRequest { texts, reply })
            .await
            .map_err(|_| TranslationError::ChannelError("协调器已停止".to_string()))
    }
}

/// 后台协调器任务
pub struct Coordinator {
    client: reqwest::Client,
    store: Arc<dyn SettingsStore>,
    rx: mpsc::Receiver<TranslateRequest>,
}

impl Coordinator {
    /// 启动协调器任务，返回句柄与任务句柄
    ///
    /// 所有句柄被丢弃后任务自然结束。
    pub fn spawn(store: Arc<dyn SettingsStore>) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let coordinator = Self {
            client: reqwest::Client::new(),
            store,
            rx,
        };
        let task = tokio::spawn(coordinator.run());
        (CoordinatorHandle { tx }, task)
    }

    async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            // 设置按请求加载一次
            let settings = Settings::from_store(self.store.as_ref());
            tracing::debug!(
                "收到翻译请求: {} 条文本，引擎 {}",
                request.texts.len(),
                settings.engine.as_str()
            );

            let client = self.client.clone();
            tokio::spawn(async move {
                handle_request(client, settings, request.texts, request.reply).await;
            });
        }
        tracing::debug!("协调器已退出");
    }
}

async fn handle_request(
    client: reqwest::Client,
    settings: Settings,
    texts: Vec<String>,
    reply: mpsc::Sender<Translation>,
) {
    match settings.engine {
        Engine::Google => translate_with_google(client, settings, texts, reply).await,
        Engine::Llm => translate_with_llm(client, settings, texts, reply).await,
    }
}

/// 谷歌引擎：逐条翻译，每条独立任务，完成即发回
async fn translate_with_google(
    client: reqwest::Client,
    settings: Settings,
    texts: Vec<String>,
    reply: mpsc::Sender<Translation>,
) {
    for text in texts {
        if text.trim().is_empty() {
            continue;
        }
        let client = client.clone();
        let reply = reply.clone();
        let source = settings.source_language.clone();
        let target = settings.target_language.clone();
        tokio::spawn(async move {
            let translated = google::translate(&client, &text, &source, &target).await;
            // 接收端关闭说明会话已结束，结果直接丢弃
            let _ = reply
                .send(Translation {
                    original_text: text,
                    translated_text: translated,
                })
                .await;
        });
    }
}

/// 大模型引擎：批量拼接翻译，失败时整批回退到逐条
async fn translate_with_llm(
    client: reqwest::Client,
    settings: Settings,
    texts: Vec<String>,
    reply: mpsc::Sender<Translation>,
) {
    let valid = valid_texts(&texts);
    if valid.is_empty() {
        return;
    }

    let batch_text = join_batch(&valid);
    tracing::debug!("批量翻译: {} 条，共 {} 字符", valid.len(), batch_text.len());

    match llm::translate(
        &client,
        &batch_text,
        &settings.source_language,
        &settings.target_language,
        &settings.llm,
        true,
    )
    .await
    {
        Ok(response) => {
            dispatch_batch_results(&valid, &response, &reply).await;
        }
        Err(e) => {
            tracing::warn!("批量翻译失败，回退到逐条翻译: {}", e);
            translate_with_llm_individually(client, settings, valid, reply).await;
        }
    }
}

/// 把批量响应按原文顺序拆成逐条结果并发回
///
/// 数量不匹配时由 [`split_batch`] 补空/截断，发回的消息数恒等于
/// 有效原文数。
pub async fn dispatch_batch_results(
    valid: &[String],
    response: &str,
    reply: &mpsc::Sender<Translation>,
) {
    let parts = split_batch(response, valid.len());
    for (original, translated) in valid.iter().zip(parts) {
        let _ = reply
            .send(Translation {
                original_text: original.clone(),
                translated_text: translated,
            })
            .await;
    }
}

/// 大模型逐条翻译（批量失败后的回退路径）
async fn translate_with_llm_individually(
    client: reqwest::Client,
    settings: Settings,
    texts: Vec<String>,
    reply: mpsc::Sender<Translation>,
) {
    for text in texts {
        let translated = match llm::translate(
            &client,
            &text,
            &settings.source_language,
            &settings.target_language,
            &settings.llm,
            false,
        )
        .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::error!("大模型翻译单条文本失败: {}", e);
                failure_sentinel(&text)
            }
        };
        let _ = reply
            .send(Translation {
                original_text: text,
                translated_text: translated,
            })
            .await;
    }
}
