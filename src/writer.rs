//! 翻译结果写入
//!
//! 把译文写回 DOM：为每个仍挂载在文档中的目标元素创建（或更新）
//! 一个翻译结果节点，替换元素的可见内容。锚元素的译文节点保留
//! `href`/`target`/`rel`，其余元素使用块级容器。译文样式从原元素
//! 派生：字体与行高继承，字号缩到 0.9 倍但不低于 12px。

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, RcDom};

use crate::dom::{
    append_child, clear_children, create_element_node, create_text_node, find_child_by_class,
    get_node_attr, get_node_name, is_attached, node_id,
};

/// 翻译结果节点的 class 标记，扫描器据此排除这些节点
pub const TRANSLATION_RESULT_CLASS: &str = "translation-result";

/// 译文最小字号（px）
pub const MIN_FONT_SIZE: f64 = 12.0;

/// 判断文本是否完全由不可见字符组成
///
/// 不可见字符类：空白、控制字符（U+0000–U+001F、U+007F–U+009F）、
/// 零宽字符（U+200B–U+200D）和 BOM（U+FEFF）。空字符串也算不可见。
pub fn is_invisible_text(text: &str) -> bool {
    text.chars().all(|c| {
        c.is_whitespace()
            || matches!(
                c as u32,
                0x0000..=0x001F | 0x007F..=0x009F | 0x200B..=0x200D | 0xFEFF
            )
    })
}

/// 原元素的排版信息（来自内联样式）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typography {
    pub font_family: Option<String>,
    pub font_size_px: Option<f64>,
    pub line_height: Option<String>,
}

/// 从元素内联样式提取排版信息
pub fn typography_of(element: &Handle) -> Typography {
    let mut typography = Typography::default();
    let style = match get_node_attr(element, "style") {
        Some(style) => style,
        None => return typography,
    };

    for declaration in style.split(';') {
        let mut parts = declaration.splitn(2, ':');
        let property = parts.next().unwrap_or("").trim().to_lowercase();
        let value = parts.next().unwrap_or("").trim().to_string();
        if value.is_empty() {
            continue;
        }
        match property.as_str() {
            "font-family" => typography.font_family = Some(value),
            "line-height" => typography.line_height = Some(value),
            "font-size" => {
                if let Some(px) = value.strip_suffix("px") {
                    if let Ok(size) = px.trim().parse::<f64>() {
                        typography.font_size_px = Some(size);
                    }
                }
            }
            _ => {}
        }
    }

    typography
}

/// 从原元素排版派生译文节点的样式字符串
pub fn derive_style(typography: &Typography) -> String {
    let mut style = String::new();
    if let Some(family) = &typography.font_family {
        style.push_str(&format!("font-family: {}; ", family));
    }
    // 默认字号 16px，缩小到 0.9 倍，下限 12px
    let base = typography.font_size_px.unwrap_or(16.0);
    let size = (base * 0.9).max(MIN_FONT_SIZE);
    style.push_str(&format!("font-size: {}px; ", size));
    if let Some(line_height) = &typography.line_height {
        style.push_str(&format!("line-height: {}; ", line_height));
    }
    style.push_str("color: #666; margin-top: 4px; display: block;");
    style
}

/// 翻译结果写入器
pub struct ResultWriter;

impl ResultWriter {
    /// 为一条原文对应的所有元素写入译文
    ///
    /// 译文完全不可见时不触碰 DOM，但仍把元素标记为已翻译，
    /// 保证跳过是幂等的且不会反复重新请求。返回实际更新的元素数。
    pub fn insert_for_all(
        dom: &RcDom,
        elements: &[Handle],
        translated: &mut HashSet<usize>,
        translated_text: &str,
    ) -> usize {
        if is_invisible_text(translated_text) {
            tracing::debug!("跳过不可见译文");
            for element in elements {
                translated.insert(node_id(element));
            }
            return 0;
        }

        let mut updated = 0;
        for element in elements {
            if !is_attached(dom, element) {
                tracing::debug!("元素已从文档中移除，跳过");
                continue;
            }
            Self::insert_into_element(dom, element, translated_text);
            translated.insert(node_id(element));
            updated += 1;
        }
        updated
    }

    /// 在单个元素内写入译文节点
    ///
    /// 已有译文节点时只更新文本，否则创建新节点并替换元素内容。
    fn insert_into_element(dom: &RcDom, element: &Handle, translated_text: &str) {
        if let Some(existing) = find_child_by_class(element, TRANSLATION_RESULT_CLASS) {
            set_text(&existing, translated_text);
            return;
        }

        let result_node = if get_node_name(element) == Some("a") {
            let mut attrs: Vec<(&str, String)> = Vec::new();
            for attr_name in ["href", "target", "rel"] {
                if let Some(value) = get_node_attr(element, attr_name) {
                    attrs.push((attr_name, value));
                }
            }
            create_element_node(dom, "a", attrs)
        } else {
            create_element_node(dom, "div", vec![])
        };

        crate::dom::set_node_attr(
            &result_node,
            "class",
            Some(TRANSLATION_RESULT_CLASS.to_string()),
        );
        crate::dom::set_node_attr(
            &result_node,
            "style",
            Some(derive_style(&typography_of(element))),
        );
        set_text(&result_node, translated_text);

        // 译文替换原文内容，原文不再保留
        clear_children(element);
        append_child(element, &result_node);
    }
}

fn set_text(node: &Handle, text: &str) {
    clear_children(node);
    append_child(node, &create_text_node(text));
}
