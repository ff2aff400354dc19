// 集成测试公共模块
//
// 提供测试页面构建与会话驱动辅助工具

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;

use translation_buddy::dom::serialize_document;

/// HTML 测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 解析测试 HTML
    pub fn create_test_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .unwrap()
    }

    /// 简单英文页面
    pub fn create_simple_english_page() -> String {
        r#"<!DOCTYPE html>
<html>
<head><title>Test Page</title></head>
<body>
    <h1>Welcome to Test</h1>
    <p>This is a test paragraph with some content.</p>
    <p>Another paragraph for translation.</p>
    <a href="/docs" target="_blank" rel="noopener">Read the documentation</a>
</body>
</html>"#
            .to_string()
    }

    /// 混合内容页面：普通文本与代码块
    pub fn create_code_heavy_page() -> String {
        r#"<!DOCTYPE html>
<html>
<body>
    <p>Install the package first.</p>
    <pre><code>cargo install translation-buddy</code></pre>
    <div class="highlight-rust"><span>fn main() {}</span></div>
    <p class="code-block">let x = 1;</p>
    <p>Then run the command.</p>
</body>
</html>"#
            .to_string()
    }

    /// 含隐藏元素与纯符号文本的页面
    pub fn create_edge_case_page() -> String {
        r#"<!DOCTYPE html>
<html>
<body>
    <p>Visible text here.</p>
    <p style="display: none">Hidden text</p>
    <p hidden>Also hidden</p>
    <span>12345</span>
    <span>---</span>
    <li>List entry one</li>
</body>
</html>"#
            .to_string()
    }

    /// 序列化为字符串便于断言
    pub fn serialize(dom: &RcDom) -> String {
        String::from_utf8(serialize_document(dom)).unwrap()
    }
}
