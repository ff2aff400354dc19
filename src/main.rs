//! 命令行入口
//!
//! 读取本地文件、URL 或标准输入中的 HTML，对文档中可翻译的文本
//! 元素执行就地翻译，并把结果文档写到输出。

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use translation_buddy::coordinator::Coordinator;
use translation_buddy::dom::{html_to_dom, serialize_document};
use translation_buddy::geometry::{DocumentFlowLayout, Viewport};
use translation_buddy::session::TranslationSession;
use translation_buddy::settings::{keys, MemorySettingsStore, SettingsStore, TomlSettingsStore};

/// Translation Buddy CLI
#[derive(Parser)]
#[command(name = "translation-buddy")]
#[command(about = "Translate visible webpage text in place")]
#[command(version)]
struct Cli {
    /// 输入来源：URL、文件路径或 `-`（标准输入）
    source: String,

    /// 输出文件路径（默认输出到标准输出）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 翻译引擎（google 或 llm），覆盖设置文件
    #[arg(long)]
    engine: Option<String>,

    /// 源语言代码，覆盖设置文件
    #[arg(long)]
    from: Option<String>,

    /// 目标语言代码，覆盖设置文件
    #[arg(long)]
    to: Option<String>,

    /// 设置文件路径（默认在标准路径中查找）
    #[arg(long)]
    settings: Option<PathBuf>,

    /// 输入文档的字符集（默认按 UTF-8 解码）
    #[arg(long, default_value = "utf-8")]
    charset: String,

    /// 静默模式，只输出错误日志
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let data = read_source(&cli.source).await?;
    let dom = html_to_dom(&data, &cli.charset);

    let store = build_store(&cli)?;
    let (handle, _coordinator) = Coordinator::spawn(Arc::new(store));

    let mut session = TranslationSession::new(
        dom,
        handle,
        Box::new(DocumentFlowLayout),
        Viewport::default(),
    );
    session.activate().await?;
    session.run_until_settled().await;

    let stats = session.cache_stats();
    tracing::info!(
        "翻译完成，共 {} 条译文，缓存命中率 {:.0}%",
        stats.total_entries,
        stats.hit_rate() * 100.0
    );

    let output = serialize_document(&session.into_dom());
    match &cli.output {
        Some(path) => std::fs::write(path, output)?,
        None => std::io::stdout().write_all(&output)?,
    }
    Ok(())
}

/// 读取输入文档（URL、文件或标准输入）
async fn read_source(source: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if source == "-" {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        return Ok(data);
    }
    if let Ok(url) = Url::parse(source) {
        if url.scheme() == "http" || url.scheme() == "https" {
            tracing::info!("正在获取文档: {}", url);
            let response = reqwest::Client::new().get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(format!("获取文档失败: HTTP {}", response.status()).into());
            }
            return Ok(response.bytes().await?.to_vec());
        }
    }
    Ok(std::fs::read(source)?)
}

/// 构建设置存储：设置文件打底，命令行参数覆盖
fn build_store(cli: &Cli) -> Result<MemorySettingsStore, Box<dyn std::error::Error>> {
    let base = match &cli.settings {
        Some(path) => TomlSettingsStore::load(path)?,
        None => TomlSettingsStore::discover(),
    };

    let mut store = MemorySettingsStore::new();
    for key in [
        keys::ENGINE,
        keys::SOURCE_LANG,
        keys::TARGET_LANG,
        keys::LLM_BASE_URL,
        keys::LLM_API_KEY,
        keys::LLM_MODEL,
    ] {
        if let Some(value) = base.get(key) {
            store.set(key, &value);
        }
    }
    if let Some(engine) = &cli.engine {
        store.set(keys::ENGINE, engine);
    }
    if let Some(from) = &cli.from {
        store.set(keys::SOURCE_LANG, from);
    }
    if let Some(to) = &cli.to {
        store.set(keys::TARGET_LANG, to);
    }
    Ok(store)
}
