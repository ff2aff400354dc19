//! 错误处理集成测试
//!
//! 覆盖后端响应解析失败、批量数量不匹配与错误分类

use translation_buddy::backends::{failure_sentinel, google, llm, FAILURE_PREFIX};
use translation_buddy::batch::{split_batch, SEPARATOR};
use translation_buddy::error::TranslationError;

/// 测试谷歌翻译响应解析的各种失败形态
#[test]
fn test_google_response_parsing_failures() {
    // 空响应
    assert!(google::parse_response("").is_err(), "Empty body should fail");

    // 非 JSON
    assert!(
        google::parse_response("<html>blocked</html>").is_err(),
        "Non-JSON body should fail"
    );

    // JSON 但结构不对
    assert!(
        google::parse_response(r#"{"error": "rate limited"}"#).is_err(),
        "Unexpected JSON shape should fail"
    );
    assert!(
        google::parse_response("[[]]").is_err(),
        "Missing nested segments should fail"
    );

    // 正常结构
    let ok = google::parse_response(r#"[[["你好","Hello",null,null]]]"#).unwrap();
    assert_eq!(ok, "你好");

    println!("✅ Google response parsing test passed");
}

/// 测试大模型响应解析的各种失败形态
#[test]
fn test_llm_response_parsing_failures() {
    assert!(llm::parse_response("").is_err(), "Empty body should fail");
    assert!(
        llm::parse_response(r#"{"error": {"message": "invalid key"}}"#).is_err(),
        "Error payload should fail"
    );
    assert!(
        llm::parse_response(r#"{"choices": []}"#).is_err(),
        "Empty choices should fail"
    );

    let ok = llm::parse_response(
        r#"{"choices": [{"message": {"role": "assistant", "content": "  你好  "}}]}"#,
    )
    .unwrap();
    assert_eq!(ok, "你好", "Content should be trimmed");

    println!("✅ LLM response parsing test passed");
}

/// 测试批量拆分对数量不匹配的容错
#[test]
fn test_batch_split_mismatch_tolerance() {
    // 响应段数不足时补空
    let short = split_batch("只有一段", 3);
    assert_eq!(short, vec!["只有一段".to_string(), String::new(), String::new()]);

    // 响应段数过多时截断
    let joined = format!("一{}二{}三{}四", SEPARATOR, SEPARATOR, SEPARATOR);
    let long = split_batch(&joined, 2);
    assert_eq!(long, vec!["一".to_string(), "二".to_string()]);

    // 空白段被丢弃后再对齐
    let blanks = format!("一{}   {}二", SEPARATOR, SEPARATOR);
    let aligned = split_batch(&blanks, 2);
    assert_eq!(aligned, vec!["一".to_string(), "二".to_string()]);

    println!("✅ Batch mismatch tolerance test passed");
}

/// 测试失败哨兵保留原文
#[test]
fn test_failure_sentinel_keeps_original() {
    let sentinel = failure_sentinel("Hello world");
    assert!(sentinel.starts_with(FAILURE_PREFIX));
    assert!(sentinel.ends_with("Hello world"));

    println!("✅ Failure sentinel test passed");
}

/// 测试错误分类与可重试判断
#[test]
fn test_error_classification() {
    let network = TranslationError::NetworkError("连接超时".to_string());
    assert!(network.is_retryable(), "Network errors should be retryable");

    let config = TranslationError::ConfigError("缺少密钥".to_string());
    assert!(!config.is_retryable(), "Config errors should not be retryable");

    let parse = TranslationError::ParseError("格式错误".to_string());
    assert!(!parse.is_retryable(), "Parse errors should not be retryable");

    // 错误信息对用户可读
    assert!(network.to_string().contains("连接超时"));
    assert!(config.to_string().contains("缺少密钥"));

    println!("✅ Error classification test passed");
}
