//! 公共机器翻译端点
//!
//! GET 请求携带 client/sl/tl/dt/q 查询参数，响应是多层嵌套的 JSON
//! 数组，译文位于 `[0][0][0]`。任何偏离该结构的响应都按错误处理。

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::backends::failure_sentinel;
use crate::error::{TranslationError, TranslationResult};

/// 公共翻译端点地址
pub const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// 翻译单条文本，失败时返回哨兵译文
pub async fn translate(
    client: &reqwest::Client,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    match request(client, text, source_lang, target_lang).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::error!("谷歌翻译失败: {}", e);
            failure_sentinel(text)
        }
    }
}

async fn request(
    client: &reqwest::Client,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> TranslationResult<String> {
    let url = format!(
        "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
        ENDPOINT,
        source_lang,
        target_lang,
        utf8_percent_encode(text, NON_ALPHANUMERIC),
    );

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(TranslationError::NetworkError(format!(
            "谷歌翻译请求失败: {}",
            response.status()
        )));
    }

    let body = response.text().await?;
    parse_response(&body)
}

/// 解析嵌套数组响应，译文在 `[0][0][0]`
pub fn parse_response(body: &str) -> TranslationResult<String> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    value
        .get(0)
        .and_then(|v| v.get(0))
        .and_then(|v| v.get(0))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| TranslationError::ParseError("谷歌翻译返回格式错误".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_array_response() {
        let body = r#"[[["你好","Hello",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "你好");
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(parse_response("not json").is_err());
        assert!(parse_response("[]").is_err());
        assert!(parse_response(r#"[[[]]]"#).is_err());
        assert!(parse_response(r#"[[[42]]]"#).is_err());
    }
}
