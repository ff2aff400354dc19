//! 视口几何判定
//!
//! 纯决策层：给定元素包围盒与视口尺寸，判断元素是否落在
//! 预加载范围内。布局信息通过 `LayoutProvider` 注入，静态文档
//! 模式下没有布局引擎，所有元素视为可见。

use std::collections::HashMap;

/// 预加载距离（像素）
///
/// 视口向下、向右各扩展这个距离，提前翻译即将滚动进入视口的内容。
pub const PRELOAD_DISTANCE: f64 = 4000.0;

/// 元素包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// 视口尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// 预加载距离，仅作用于下边界和右边界
    pub preload_distance: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            preload_distance: PRELOAD_DISTANCE,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            preload_distance: PRELOAD_DISTANCE,
        }
    }
}

/// 判断包围盒是否在视口（含预加载范围）内
///
/// 上边界和左边界不扩展：已滚过的内容不重新进入扫描范围。
/// 零尺寸元素视为不可见。
pub fn is_in_viewport(rect: &Rect, viewport: &Viewport) -> bool {
    rect.top >= 0.0
        && rect.left >= 0.0
        && rect.bottom() <= viewport.height + viewport.preload_distance
        && rect.right() <= viewport.width + viewport.preload_distance
        && rect.width > 0.0
        && rect.height > 0.0
}

/// 布局信息提供者
///
/// 把"元素在哪"从扫描决策中分离出来。返回 `None` 表示该节点没有
/// 布局信息，按可见处理（服务端处理静态文档时的默认语义）。
pub trait LayoutProvider {
    /// 返回节点（按 `dom::node_id` 标识）的包围盒
    fn rect_of(&self, node_id: usize) -> Option<Rect>;
}

/// 无布局引擎：所有元素视为可见
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFlowLayout;

impl LayoutProvider for DocumentFlowLayout {
    fn rect_of(&self, _node_id: usize) -> Option<Rect> {
        None
    }
}

/// 静态布局表，测试和嵌入方可为节点显式提供包围盒
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    rects: HashMap<usize, Rect>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rect(&mut self, node_id: usize, rect: Rect) {
        self.rects.insert(node_id, rect);
    }
}

impl LayoutProvider for StaticLayout {
    fn rect_of(&self, node_id: usize) -> Option<Rect> {
        self.rects.get(&node_id).copied()
    }
}
