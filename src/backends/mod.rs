//! 翻译后端
//!
//! 两个可互换的外部调用：公共机器翻译端点（逐条）和大模型聊天端点
//! （逐条或批量）。后端失败不向上抛错误，统一退化为哨兵译文，
//! 保证管道不会因单条失败而停滞。

pub mod google;
pub mod llm;

/// 翻译失败时的哨兵前缀
pub const FAILURE_PREFIX: &str = "[翻译失败]";

/// 生成哨兵译文
pub fn failure_sentinel(original: &str) -> String {
    format!("{} {}", FAILURE_PREFIX, original)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_format() {
        assert_eq!(failure_sentinel("Hello"), "[翻译失败] Hello");
    }
}
