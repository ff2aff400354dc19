//! DOM 变化与滚动监听
//!
//! 翻译激活期间，DOM 新增节点和滚动事件都会触发重新扫描。事件
//! 通过通道送入看门循环，300 毫秒防抖：同一连发内的事件合并为
//! 一次 重新扫描 + 重新分发。停用即关闭通道，循环随之结束。

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use crate::writer::TRANSLATION_RESULT_CLASS;

/// 防抖延迟
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// DOM 事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    /// 子树中新增了元素节点
    Mutation,
    /// 页面滚动
    Scroll,
}

/// 新增节点是否值得触发重新扫描
///
/// 翻译结果节点自身的插入不触发，否则写回会引起扫描风暴。
pub fn is_relevant_addition(classes: &[String]) -> bool {
    !classes.iter().any(|c| c == TRANSLATION_RESULT_CLASS)
}

/// 看门事件源句柄
#[derive(Clone)]
pub struct WatcherHandle {
    tx: mpsc::Sender<DomEvent>,
}

impl WatcherHandle {
    /// 上报一次 DOM 变化
    pub async fn notify_mutation(&self) {
        let _ = self.tx.send(DomEvent::Mutation).await;
    }

    /// 上报一次滚动
    pub async fn notify_scroll(&self) {
        let _ = self.tx.send(DomEvent::Scroll).await;
    }
}

/// 创建事件通道
pub fn channel() -> (WatcherHandle, mpsc::Receiver<DomEvent>) {
    let (tx, rx) = mpsc::channel(64);
    (WatcherHandle { tx }, rx)
}

/// 把事件流折叠成防抖后的触发流
///
/// 每个连发产生一次触发。触发通道容量为 1：尚未被消费的触发会
/// 吸收后续连发，消费方不会积压。事件通道关闭后触发流随之结束。
pub fn debounce(rx: mpsc::Receiver<DomEvent>) -> mpsc::Receiver<()> {
    let (tick_tx, tick_rx) = mpsc::channel(1);
    tokio::spawn(run_debounced(rx, move || {
        let _ = tick_tx.try_send(());
    }));
    tick_rx
}

/// 防抖循环
///
/// 每收到一个事件就等待 [`DEBOUNCE_DELAY`]，期间的后续事件被合并；
/// 静默达到延迟后调用一次 `trigger`。通道关闭时循环结束（此时
/// 尚未触发的合并事件仍会触发最后一次）。
pub async fn run_debounced<F: FnMut()>(mut rx: mpsc::Receiver<DomEvent>, mut trigger: F) {
    while let Some(_event) = rx.recv().await {
        loop {
            match timeout(DEBOUNCE_DELAY, rx.recv()).await {
                // 连发内的事件，继续合并
                Ok(Some(_)) => continue,
                // 通道关闭，触发最后一次后退出
                Ok(None) => {
                    trigger();
                    return;
                }
                // 静默期满，触发一次
                Err(_) => {
                    trigger();
                    break;
                }
            }
        }
    }
}
