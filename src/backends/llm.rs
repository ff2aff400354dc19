//! 大模型聊天端点
//!
//! POST 聊天补全请求，Bearer 令牌鉴权。批量模式下提示词要求模型
//! 保留分隔符并保持段落数量与顺序。这里返回 `Result`，由协调器
//! 决定是回退到逐条翻译还是退化为哨兵译文。

use serde::{Deserialize, Serialize};

use crate::batch::{batch_prompt, single_prompt};
use crate::error::{TranslationError, TranslationResult};
use crate::settings::LlmSettings;

/// 聊天补全请求体
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// 聊天补全响应体，未知字段忽略
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// 翻译一段文本（单条或已拼接的批量文本）
pub async fn translate(
    client: &reqwest::Client,
    text: &str,
    source_lang: &str,
    target_lang: &str,
    llm: &LlmSettings,
    is_batch: bool,
) -> TranslationResult<String> {
    if !llm.is_configured() {
        return Err(TranslationError::ConfigError("LLM设置不完整".to_string()));
    }

    let prompt = if is_batch {
        batch_prompt(text, source_lang, target_lang)
    } else {
        single_prompt(text, source_lang, target_lang)
    };

    let request = ChatRequest {
        model: &llm.model_name,
        messages: vec![ChatMessage {
            role: "user",
            content: &prompt,
        }],
        temperature: 0.3,
        max_tokens: 1000,
    };

    let response = client
        .post(&llm.base_url)
        .bearer_auth(&llm.api_key)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&request)?)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TranslationError::NetworkError(format!(
            "LLM API请求失败: {}",
            response.status()
        )));
    }

    let body = response.text().await?;
    parse_response(&body)
}

/// 解析聊天补全响应，取 `choices[0].message.content`
pub fn parse_response(body: &str) -> TranslationResult<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| TranslationError::ParseError("LLM返回格式错误".to_string()))
}
