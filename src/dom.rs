//! DOM 适配层
//!
//! 基于 html5ever / markup5ever_rcdom 的基础 DOM 操作：解析、序列化、
//! 属性读写、节点身份与挂载检查。管道其余部分通过这里访问 DOM，
//! 纯决策逻辑（视口、过滤）不直接接触 rcdom 类型。

use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// 将 HTML 字节解析为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// 序列化整个文档
pub fn serialize_document(dom: &RcDom) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .expect("Unable to serialize DOM into buffer");
    buf
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 设置节点属性（`None` 表示删除属性）
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;
                if let Some(attr_value) = attr_value.clone() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }
            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                let name = QualName::new(None, ns!(), LocalName::from(attr_name));
                attrs_mut.push(Attribute {
                    name,
                    value: attr_value.into(),
                });
            }
        }
    }
}

/// 获取元素节点的标签名
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点，根节点返回 `None`
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let parent = child.parent.take();
    child.parent.set(parent.clone());
    parent.and_then(|weak| weak.upgrade())
}

/// 节点身份标识（指针地址）
///
/// rcdom 节点没有稳定 ID，已翻译集合用 `Rc` 指针地址做成员判定。
pub fn node_id(node: &Handle) -> usize {
    Rc::as_ptr(node) as usize
}

/// 检查节点是否仍挂载在文档树中
///
/// 对应浏览器端的 `document.contains(element)`：沿父链向上爬，
/// 终点是 Document 节点才算挂载。
pub fn is_attached(dom: &RcDom, node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if Rc::ptr_eq(&current, &dom.document) {
            return true;
        }
        match get_parent_node(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// 获取元素 class 列表（统一小写）
pub fn get_classes(node: &Handle) -> Vec<String> {
    get_node_attr(node, "class")
        .map(|value| {
            value
                .split_whitespace()
                .map(|c| c.to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

/// 检查元素是否带指定 class
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_classes(node).iter().any(|c| c == class_name)
}

/// 收集元素的直接文本内容（不含子元素文本），并去除首尾空白
pub fn get_direct_text(node: &Handle) -> String {
    let mut text = String::new();
    for child in node.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }
    text.trim().to_string()
}

/// 创建元素节点
pub fn create_element_node(dom: &RcDom, tag_name: &str, attrs: Vec<(&str, String)>) -> Handle {
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        })
        .collect();
    create_element(
        dom,
        QualName::new(None, ns!(), LocalName::from(tag_name)),
        attributes,
    )
}

/// 创建文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(text.into()),
    })
}

/// 追加子节点并维护父指针
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// 清空元素的所有子节点
pub fn clear_children(node: &Handle) {
    for child in node.children.borrow().iter() {
        child.parent.set(None);
    }
    node.children.borrow_mut().clear();
}

/// 按文档顺序遍历所有元素节点
pub fn walk_elements<F: FnMut(&Handle)>(node: &Handle, visit: &mut F) {
    if let NodeData::Element { .. } = node.data {
        visit(node);
    }
    for child in node.children.borrow().iter() {
        walk_elements(child, visit);
    }
}

/// 在子元素中查找第一个带指定 class 的元素
pub fn find_child_by_class(node: &Handle, class_name: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }) && has_class(child, class_name))
        .cloned()
}

/// 查找文档中的 body 元素
pub fn get_body(dom: &RcDom) -> Option<Handle> {
    let mut body = None;
    walk_elements(&dom.document, &mut |node| {
        if body.is_none() && get_node_name(node) == Some("body") {
            body = Some(node.clone());
        }
    });
    body
}
