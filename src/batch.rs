//! 批量翻译的拼接与还原
//!
//! 大模型批量翻译把多条原文用分隔符拼成一次请求，响应按同一
//! 分隔符切回。切分是尽力而为的启发式：数量不匹配时补空或截断，
//! 不保证正确性（由上层的逐条回退兜底）。

/// 批量翻译分隔符，不允许出现在可翻译内容中
pub const SEPARATOR: &str = "---TRANSLATE_SEPARATOR---";

/// 过滤出有效原文（非空、去除首尾空白后拼接）
pub fn valid_texts(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_string())
        .collect()
}

/// 把有效原文拼成一条批量请求文本
pub fn join_batch(texts: &[String]) -> String {
    texts.join(SEPARATOR)
}

/// 把批量响应切回逐条译文
///
/// 去掉切分后为空白的片段；结果数少于期望时补空字符串，多于
/// 期望时截断。返回向量长度恒等于 `expected_count`。
pub fn split_batch(response: &str, expected_count: usize) -> Vec<String> {
    let mut parts: Vec<String> = response
        .split(SEPARATOR)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() != expected_count {
        tracing::warn!(
            "批量翻译结果数量不匹配: 期望 {}，得到 {}",
            expected_count,
            parts.len()
        );
        if parts.len() < expected_count {
            parts.resize(expected_count, String::new());
        } else {
            parts.truncate(expected_count);
        }
    }

    parts
}

/// 语言代码 → 名称，用于翻译提示词
pub fn language_name(code: &str) -> &str {
    match code {
        "auto" => "自动检测",
        "zh" => "中文",
        "en" => "英文",
        "ja" => "日文",
        "ko" => "韩文",
        "fr" => "法文",
        "de" => "德文",
        "es" => "西班牙文",
        "ru" => "俄文",
        "it" => "意大利文",
        other => other,
    }
}

/// 批量翻译提示词：要求模型保留分隔符、保持段落数量与顺序
pub fn batch_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "请将以下文本从{}翻译成{}。\n\n\
         文本中使用\"{}\"分隔不同的段落，请保持相同的分隔符在翻译结果中，\
         只翻译文本内容，不要翻译分隔符本身。\n\n\
         原文：\n{}\n\n\
         翻译要求：\n\
         1. 保持\"{}\"分隔符不变\n\
         2. 只翻译文本内容\n\
         3. 保持相同的段落数量和顺序\n\
         4. 不要添加任何解释或说明",
        language_name(source_lang),
        language_name(target_lang),
        SEPARATOR,
        text,
        SEPARATOR,
    )
}

/// 单条翻译提示词
pub fn single_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "请将以下文本从{}翻译成{}，只返回翻译结果，不要添加任何解释：\n\n{}",
        language_name(source_lang),
        language_name(target_lang),
        text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_texts_drops_blank_entries() {
        let texts = vec![
            "Hello".to_string(),
            "   ".to_string(),
            "".to_string(),
            "  World  ".to_string(),
        ];
        assert_eq!(valid_texts(&texts), vec!["Hello", "World"]);
    }

    #[test]
    fn test_split_roundtrip() {
        let texts = vec!["Hello".to_string(), "World".to_string()];
        let joined = join_batch(&texts);
        assert_eq!(joined, format!("Hello{}World", SEPARATOR));
        assert_eq!(split_batch(&joined, 2), texts);
    }

    #[test]
    fn test_split_exact_segments() {
        let response = format!("你好{}世界", SEPARATOR);
        assert_eq!(split_batch(&response, 2), vec!["你好", "世界"]);
    }

    #[test]
    fn test_split_pads_missing_segments() {
        let response = format!("你好{}世界", SEPARATOR);
        let parts = split_batch(&response, 3);
        assert_eq!(parts, vec!["你好", "世界", ""]);
    }

    #[test]
    fn test_split_truncates_extra_segments() {
        let response = format!("一{}二{}三{}四", SEPARATOR, SEPARATOR, SEPARATOR);
        let parts = split_batch(&response, 2);
        assert_eq!(parts, vec!["一", "二"]);
    }

    #[test]
    fn test_split_ignores_blank_segments() {
        let response = format!("你好{}{}世界", SEPARATOR, SEPARATOR);
        assert_eq!(split_batch(&response, 2), vec!["你好", "世界"]);
    }

    #[test]
    fn test_prompts_mention_languages_and_separator() {
        let batch = batch_prompt("Hello", "en", "zh");
        assert!(batch.contains("英文"));
        assert!(batch.contains("中文"));
        assert!(batch.contains(SEPARATOR));

        let single = single_prompt("Hello", "auto", "ja");
        assert!(single.contains("自动检测"));
        assert!(single.contains("日文"));
        assert!(single.contains("Hello"));
    }

    #[test]
    fn test_language_name_falls_back_to_code() {
        assert_eq!(language_name("pt"), "pt");
    }
}
