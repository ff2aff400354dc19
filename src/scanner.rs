//! DOM 扫描器
//!
//! 遍历候选元素，过滤不可翻译内容（脚本、代码块、隐藏元素、
//! 纯数字文本），提取直接文本，建立 原文 → 元素列表 的有序映射。
//!
//! 判定逻辑拆成两层：对提取出的事实（标签、class、样式、包围盒、
//! 文本）做判断的纯函数，和从 rcdom 提取这些事实的适配代码。

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, RcDom};
use regex::Regex;

use crate::dom::{
    get_classes, get_direct_text, get_node_attr, get_node_name, get_parent_node, has_class,
    node_id, walk_elements,
};
use crate::geometry::{is_in_viewport, LayoutProvider, Viewport};
use crate::writer::TRANSLATION_RESULT_CLASS;

/// 可能承载文本的候选元素标签
pub const CANDIDATE_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "div", "li", "td", "th", "a", "label",
    "button", "blockquote", "pre", "code",
];

/// 不参与翻译的标签
pub const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "meta", "link", "title", "code", "pre", "kbd", "samp", "var",
];

/// 代码相关 class 关键词（统一小写比较）
pub const CODE_CLASS_PATTERNS: &[&str] = &[
    "code",
    "highlight",
    "syntax",
    "language-",
    "hljs",
    "prism",
    "codehilite",
    "sourcecode",
    "code-block",
    "code-snippet",
    "terminal",
    "console",
    "shell",
    "bash",
    "cmd",
];

/// 最小可翻译文本长度（字符数）
pub const MIN_TEXT_LENGTH: usize = 2;

// ============================================================================
// 纯决策函数
// ============================================================================

/// 标签是否在跳过列表中
pub fn is_skip_tag(tag: &str) -> bool {
    SKIP_TAGS.contains(&tag)
}

/// class 列表是否命中代码相关关键词
pub fn has_code_class(classes: &[String]) -> bool {
    classes
        .iter()
        .any(|class| CODE_CLASS_PATTERNS.iter().any(|p| class.contains(p)))
}

/// 文本是否值得翻译：至少 2 个字符，且不是纯数字/标点/空白
pub fn is_translatable_text(text: &str) -> bool {
    if text.chars().count() < MIN_TEXT_LENGTH {
        return false;
    }
    static NUMERIC_PUNCT: OnceLock<Regex> = OnceLock::new();
    let re = NUMERIC_PUNCT
        .get_or_init(|| Regex::new(r#"^[\d\s\-_.,;:!?()\[\]{}'"]*$"#).unwrap());
    !re.is_match(text)
}

/// 内联样式是否把元素隐藏
///
/// 没有计算样式可用，只检查内联声明。
pub fn is_hidden_style(style: &str) -> bool {
    for declaration in style.split(';') {
        let mut parts = declaration.splitn(2, ':');
        let property = parts.next().unwrap_or("").trim().to_lowercase();
        let value = parts.next().unwrap_or("").trim().to_lowercase();
        match property.as_str() {
            "display" if value == "none" => return true,
            "visibility" if value == "hidden" => return true,
            "opacity" if value == "0" || value == "0.0" => return true,
            _ => {}
        }
    }
    false
}

// ============================================================================
// 原文 → 元素映射
// ============================================================================

/// 原文到元素列表的有序映射
///
/// 保持首次发现顺序；同一原文可对应页面上多个元素，同一元素
/// 不会被重复记录。每轮扫描增量补充，停用时整体清空。
#[derive(Default)]
pub struct TextElementMap {
    order: Vec<String>,
    entries: HashMap<String, Vec<Handle>>,
}

impl TextElementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条 原文 → 元素 关联，元素按身份去重
    pub fn insert(&mut self, text: &str, element: Handle) {
        let elements = match self.entries.get_mut(text) {
            Some(existing) => existing,
            None => {
                self.order.push(text.to_string());
                self.entries.entry(text.to_string()).or_default()
            }
        };
        let id = node_id(&element);
        if !elements.iter().any(|e| node_id(e) == id) {
            elements.push(element);
        }
    }

    /// 获取原文对应的元素列表
    pub fn elements_of(&self, text: &str) -> Option<&[Handle]> {
        self.entries.get(text).map(|v| v.as_slice())
    }

    /// 按插入顺序迭代原文
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

// ============================================================================
// 扫描器
// ============================================================================

/// DOM 扫描器
pub struct Scanner {
    viewport: Viewport,
}

impl Scanner {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// 扫描文档并把可翻译文本补充进映射
    pub fn scan(
        &self,
        dom: &RcDom,
        layout: &dyn LayoutProvider,
        translated: &HashSet<usize>,
        map: &mut TextElementMap,
    ) {
        let mut candidates: Vec<Handle> = Vec::new();
        walk_elements(&dom.document, &mut |node| {
            if let Some(tag) = get_node_name(node) {
                if CANDIDATE_TAGS.contains(&tag) {
                    candidates.push(node.clone());
                }
            }
        });

        let mut scanned = 0usize;
        for element in candidates {
            if !self.should_translate_element(&element, translated) {
                continue;
            }
            if !self.is_element_in_viewport(&element, layout) {
                continue;
            }
            let text = get_direct_text(&element);
            if !is_translatable_text(&text) {
                continue;
            }
            map.insert(&text, element);
            scanned += 1;
        }

        tracing::debug!("扫描完成: 新增 {} 处文本，映射共 {} 条", scanned, map.len());
    }

    /// 元素是否应该参与翻译
    ///
    /// 排除顺序与规则：已翻译元素、翻译结果节点、跳过标签、
    /// 代码类 class（含祖先链，直到 body）、隐藏样式。
    pub fn should_translate_element(&self, element: &Handle, translated: &HashSet<usize>) -> bool {
        if translated.contains(&node_id(element)) {
            return false;
        }

        if has_class(element, TRANSLATION_RESULT_CLASS) {
            return false;
        }

        let tag = match get_node_name(element) {
            Some(tag) => tag.to_string(),
            None => return false,
        };
        if is_skip_tag(&tag) {
            return false;
        }

        if has_code_class(&get_classes(element)) {
            return false;
        }

        // 祖先链检查：代码容器内的任何元素都跳过
        let mut parent = get_parent_node(element);
        while let Some(ancestor) = parent {
            match get_node_name(&ancestor) {
                Some("body") | None => break,
                Some(ancestor_tag) => {
                    if ancestor_tag == "pre" || ancestor_tag == "code" {
                        return false;
                    }
                    if has_code_class(&get_classes(&ancestor)) {
                        return false;
                    }
                }
            }
            parent = get_parent_node(&ancestor);
        }

        if get_node_attr(element, "hidden").is_some() {
            return false;
        }
        if let Some(style) = get_node_attr(element, "style") {
            if is_hidden_style(&style) {
                return false;
            }
        }

        true
    }

    fn is_element_in_viewport(&self, element: &Handle, layout: &dyn LayoutProvider) -> bool {
        match layout.rect_of(node_id(element)) {
            Some(rect) => is_in_viewport(&rect, &self.viewport),
            // 没有布局信息的节点按可见处理
            None => true,
        }
    }
}
