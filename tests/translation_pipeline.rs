//! 翻译管道集成测试
//!
//! 覆盖扫描、分发、结果写回的端到端流程

use std::sync::Arc;

use tokio::sync::mpsc;

use translation_buddy::backends::FAILURE_PREFIX;
use translation_buddy::batch::SEPARATOR;
use translation_buddy::coordinator::{dispatch_batch_results, Coordinator, Translation};
use translation_buddy::geometry::{DocumentFlowLayout, Viewport};
use translation_buddy::session::TranslationSession;
use translation_buddy::settings::{keys, MemorySettingsStore};

mod common {
    include!("common/mod.rs");
}

use common::HtmlTestHelper;

/// 构建使用 LLM 引擎但未配置凭据的会话
///
/// 凭据缺失时后端不发起网络请求，每条原文确定性地收到哨兵译文，
/// 适合离线驱动完整管道。
fn make_offline_session(html: &str) -> TranslationSession {
    let mut store = MemorySettingsStore::new();
    store.set(keys::ENGINE, "llm");
    let (handle, _task) = Coordinator::spawn(Arc::new(store));
    TranslationSession::new(
        HtmlTestHelper::create_test_dom(html),
        handle,
        Box::new(DocumentFlowLayout),
        Viewport::default(),
    )
}

/// 测试完整管道：扫描、分发、结果回流、写入文档
#[tokio::test]
async fn test_full_pipeline_settles_with_fallback_results() {
    let html = HtmlTestHelper::create_simple_english_page();
    let mut session = make_offline_session(&html);

    session.activate().await.expect("activation should succeed");
    session.run_until_settled().await;

    let output = HtmlTestHelper::serialize(&session.into_dom());

    // 每个可翻译元素都收到了结果节点
    assert!(
        output.contains("translation-result"),
        "Result nodes should be inserted"
    );
    // 凭据缺失路径下译文是哨兵，原文保留在哨兵内
    assert!(
        output.contains(&format!("{} Welcome to Test", FAILURE_PREFIX)),
        "Fallback result should carry original text"
    );

    println!("✅ Full pipeline test passed");
}

/// 测试代码块不被翻译
#[tokio::test]
async fn test_code_blocks_left_untouched() {
    let html = HtmlTestHelper::create_code_heavy_page();
    let mut session = make_offline_session(&html);

    session.activate().await.expect("activation should succeed");
    session.run_until_settled().await;

    let output = HtmlTestHelper::serialize(&session.into_dom());

    assert!(
        !output.contains(&format!("{} cargo install", FAILURE_PREFIX)),
        "Text inside pre/code should not be translated"
    );
    assert!(
        !output.contains(&format!("{} fn main", FAILURE_PREFIX)),
        "Text inside highlight containers should not be translated"
    );
    assert!(
        !output.contains(&format!("{} let x", FAILURE_PREFIX)),
        "Elements with code classes should not be translated"
    );
    assert!(
        output.contains(&format!("{} Install the package first.", FAILURE_PREFIX)),
        "Normal paragraphs should still be translated"
    );
    assert!(
        output.contains(&format!("{} Then run the command.", FAILURE_PREFIX)),
        "Normal paragraphs should still be translated"
    );

    println!("✅ Code block exclusion test passed");
}

/// 测试隐藏元素与纯符号文本被跳过
#[tokio::test]
async fn test_hidden_and_symbol_only_text_skipped() {
    let html = HtmlTestHelper::create_edge_case_page();
    let mut session = make_offline_session(&html);

    session.activate().await.expect("activation should succeed");
    session.run_until_settled().await;

    let output = HtmlTestHelper::serialize(&session.into_dom());

    assert!(
        !output.contains(&format!("{} Hidden text", FAILURE_PREFIX)),
        "display:none elements should be skipped"
    );
    assert!(
        !output.contains(&format!("{} Also hidden", FAILURE_PREFIX)),
        "hidden attribute elements should be skipped"
    );
    assert!(
        !output.contains(&format!("{} 12345", FAILURE_PREFIX)),
        "Digit-only text should be skipped"
    );
    assert!(
        !output.contains(&format!("{} ---", FAILURE_PREFIX)),
        "Symbol-only text should be skipped"
    );
    assert!(
        output.contains(&format!("{} Visible text here.", FAILURE_PREFIX)),
        "Visible text should be translated"
    );
    assert!(
        output.contains(&format!("{} List entry one", FAILURE_PREFIX)),
        "List items should be translated"
    );

    println!("✅ Edge case filtering test passed");
}

/// 测试译文写回替换元素内容并继承链接属性
#[tokio::test]
async fn test_result_replaces_content_and_preserves_anchor_attrs() {
    let html = HtmlTestHelper::create_simple_english_page();
    let mut session = make_offline_session(&html);
    session.activate().await.expect("activation should succeed");

    // 直接注入结果消息，模拟后端回流
    session.handle_translation(Translation {
        original_text: "Read the documentation".into(),
        translated_text: "阅读文档".into(),
    });

    let output = HtmlTestHelper::serialize(&session.into_dom());
    assert!(output.contains("阅读文档"), "Translation should be written");
    assert!(
        !output.contains("Read the documentation"),
        "Original anchor text should be replaced"
    );
    // 结果节点本身是链接并继承导航属性
    assert!(
        output.contains(r#"href="/docs""#),
        "href should be preserved on result node"
    );
    assert!(
        output.contains(r#"target="_blank""#),
        "target should be preserved on result node"
    );
    assert!(
        output.contains(r#"rel="noopener""#),
        "rel should be preserved on result node"
    );

    println!("✅ Result writing test passed");
}

/// 测试重复扫描时缓存命中不再重新分发
#[tokio::test]
async fn test_rescan_uses_cache_for_known_text() {
    let html = "<body><p>Stable paragraph</p></body>";
    let mut session = make_offline_session(html);
    session.activate().await.expect("activation should succeed");
    session.run_until_settled().await;

    let first_stats = session.cache_stats();
    assert_eq!(first_stats.total_entries, 1, "Result should be cached");

    // 第二次扫描：元素已标记、译文已缓存，不应产生新的在途请求
    session.rescan().await.expect("rescan should succeed");
    session.run_until_settled().await;

    let second_stats = session.cache_stats();
    assert_eq!(
        second_stats.total_entries, 1,
        "Rescan should not add new cache entries"
    );

    println!("✅ Cache reuse test passed");
}

/// 测试停用后迟到的结果被丢弃
#[tokio::test]
async fn test_deactivation_drops_late_results() {
    let html = "<body><p>Pending paragraph</p></body>";
    let mut session = make_offline_session(html);
    session.activate().await.expect("activation should succeed");
    session.deactivate();

    session.handle_translation(Translation {
        original_text: "Pending paragraph".into(),
        translated_text: "迟到的译文".into(),
    });

    let stats = session.cache_stats();
    assert_eq!(stats.total_entries, 0, "Late results should not be cached");

    let output = HtmlTestHelper::serialize(&session.into_dom());
    assert!(
        !output.contains("迟到的译文"),
        "Late results should not touch the document"
    );
    assert!(
        output.contains("Pending paragraph"),
        "Original text should remain"
    );

    println!("✅ Late result handling test passed");
}

/// 测试批量响应的拆分与逐条回流
#[tokio::test]
async fn test_batch_results_flow_into_session() {
    let html = "<body><p>First line</p><p>Second line</p></body>";
    let mut session = make_offline_session(html);
    session.activate().await.expect("activation should succeed");

    // 模拟一次批量响应经协调器拆分后回流
    let valid = vec!["First line".to_string(), "Second line".to_string()];
    let response = format!("第一行{}第二行", SEPARATOR);
    let (tx, mut rx) = mpsc::channel(8);
    dispatch_batch_results(&valid, &response, &tx).await;
    drop(tx);

    while let Some(message) = rx.recv().await {
        session.handle_translation(message);
    }

    let output = HtmlTestHelper::serialize(&session.into_dom());
    assert!(output.contains("第一行"), "First batch part should be written");
    assert!(output.contains("第二行"), "Second batch part should be written");

    println!("✅ Batch flow test passed");
}

/// 测试同一原文出现在多个元素时全部更新
#[tokio::test]
async fn test_duplicate_text_updates_all_elements() {
    let html = "<body><p>Same text</p><div>Same text</div><span>Same text</span></body>";
    let mut session = make_offline_session(html);
    session.activate().await.expect("activation should succeed");

    session.handle_translation(Translation {
        original_text: "Same text".into(),
        translated_text: "相同文本".into(),
    });

    let output = HtmlTestHelper::serialize(&session.into_dom());
    assert_eq!(
        output.matches("相同文本").count(),
        3,
        "All elements sharing the text should be updated"
    );

    println!("✅ Duplicate text test passed");
}
