use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::browser::executable::ResolvedExecutable;
use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// 通用启动参数：关闭沙盒、GPU 以及自动化特征
pub const LAUNCH_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage", // 防止共享内存不足
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-extensions",
    "--disable-background-networking",
];

/// 在每个新文档加载前执行，隐藏 webdriver 特征
const STEALTH_SCRIPT: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    window.chrome = window.chrome || { runtime: {} };
"#;

/// 启动无头浏览器
///
/// # 返回
/// 返回浏览器句柄以及后台事件处理任务
pub async fn launch_headless_browser(
    config: &Config,
    executable: &ResolvedExecutable,
) -> Result<(Browser, JoinHandle<()>)> {
    info!("🚀 启动浏览器: {}", executable.path.display());

    let launch_failed = |message: String| ScrapeError::BrowserLaunchFailed {
        executable: executable.path.display().to_string(),
        message,
        hint: executable.remediation_hint(),
    };

    let (width, height) = config.viewport;
    let mut builder = BrowserConfig::builder()
        .chrome_executable(&executable.path)
        .no_sandbox()
        .launch_timeout(config.launch_timeout)
        .request_timeout(config.navigation_timeout)
        .window_size(width, height)
        .args(LAUNCH_ARGS.iter().copied())
        .args(executable.extra_args.iter().cloned());
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        launch_failed(format!("配置浏览器失败: {}", e))
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        launch_failed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("浏览器事件处理出错: {}", e);
            }
        }
    });

    Ok((browser, handle))
}

/// 为新页面设置视口、User-Agent 和反自动化脚本
pub async fn prepare_page(page: &Page, config: &Config) -> Result<()> {
    let (width, height) = config.viewport;
    let setup_failed = |e: chromiumoxide::error::CdpError| ScrapeError::page_creation_failed(e, false);

    page.execute(SetDeviceMetricsOverrideParams::new(
        i64::from(width),
        i64::from(height),
        1.0,
        false,
    ))
    .await
    .map_err(setup_failed)?;

    page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
        .await
        .map_err(setup_failed)?;

    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
        .await
        .map_err(setup_failed)?;

    debug!("页面已设置视口 {}x{}", width, height);
    Ok(())
}
