//! 浏览器生命周期管理
//!
//! 每个会话只持有一个浏览器进程和一个页面。
//! 创建新页面会关闭旧页面；启动失败属于配置问题，这里不做重试。

use std::time::Duration;

use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::browser::executable::{ExecutableResolver, LaunchEnvironment};
use crate::browser::launch::{launch_headless_browser, prepare_page};
use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// 连接探测超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// 单个关闭步骤的超时
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// 浏览器会话
pub struct BrowserSession {
    config: Config,
    resolver: ExecutableResolver,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
    authenticated: bool,
}

impl BrowserSession {
    pub fn new(config: Config) -> Self {
        let resolver = ExecutableResolver::new(LaunchEnvironment::from_config(&config));
        Self::with_resolver(config, resolver)
    }

    pub fn with_resolver(config: Config, resolver: ExecutableResolver) -> Self {
        Self {
            config,
            resolver,
            browser: None,
            handler: None,
            page: None,
            authenticated: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 浏览器进程是否已启动（不代表仍然连通）
    pub fn is_launched(&self) -> bool {
        self.browser.is_some()
    }

    /// 当前页面
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    async fn is_connected(browser: &Browser) -> bool {
        matches!(timeout(PROBE_TIMEOUT, browser.version()).await, Ok(Ok(_)))
    }

    /// 确保有一个连通的浏览器，已失效的句柄会被丢弃并重新启动
    pub async fn ensure_browser(&mut self) -> Result<()> {
        if let Some(browser) = &self.browser {
            if Self::is_connected(browser).await {
                return Ok(());
            }
            warn!("浏览器连接已失效，重新启动");
            self.shutdown_browser().await;
        }

        let executable = self.resolver.resolve()?;
        let (browser, handler) = launch_headless_browser(&self.config, &executable).await?;

        if !Self::is_connected(&browser).await {
            let mut browser = browser;
            kill_browser(&mut browser).await;
            handler.abort();
            return Err(ScrapeError::BrowserLaunchFailed {
                executable: executable.path.display().to_string(),
                message: "浏览器已启动但无法建立连接".to_string(),
                hint: executable.remediation_hint(),
            });
        }

        self.browser = Some(browser);
        self.handler = Some(handler);
        Ok(())
    }

    /// 创建新页面（先关闭旧页面）
    pub async fn new_page(&mut self) -> Result<Page> {
        if let Some(page) = self.page.take() {
            debug!("关闭旧页面");
            close_page(page).await;
        }

        self.ensure_browser().await?;
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScrapeError::page_creation_failed("浏览器未启动", true))?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let stale = !Self::is_connected(browser).await;
                return Err(ScrapeError::page_creation_failed(e, stale));
            }
        };

        if let Err(e) = prepare_page(&page, &self.config).await {
            close_page(page).await;
            return Err(e);
        }

        debug!("新页面已创建");
        self.page = Some(page.clone());
        Ok(page)
    }

    /// 关闭页面和浏览器，任何错误只记录不抛出，状态总会被重置
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            close_page(page).await;
        }

        if self.browser.is_some() {
            self.shutdown_browser().await;
            info!("浏览器已关闭");
        }

        self.authenticated = false;
    }

    async fn shutdown_browser(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            let closed = match timeout(CLOSE_TIMEOUT, browser.close()).await {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    warn!("关闭浏览器失败: {}", e);
                    false
                }
                Err(_) => {
                    warn!("关闭浏览器超时");
                    false
                }
            };

            if closed {
                if let Ok(Err(e)) = timeout(CLOSE_TIMEOUT, browser.wait()).await {
                    warn!("等待浏览器进程退出失败: {}", e);
                }
            } else {
                kill_browser(&mut browser).await;
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// 强制结束浏览器进程，失败只记录
async fn kill_browser(browser: &mut Browser) {
    if let Some(Err(e)) = browser.kill().await {
        warn!("强制结束浏览器进程失败: {}", e);
    }
}

async fn close_page(page: Page) {
    match timeout(CLOSE_TIMEOUT, page.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("关闭页面失败: {}", e),
        Err(_) => warn!("关闭页面超时"),
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_without_browser_is_noop() {
        let mut session = BrowserSession::new(Config::default());
        session.set_authenticated(true);
        session.close().await;
        session.close().await;
        assert!(!session.is_launched());
        assert!(session.page().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    #[ignore] // 需要本地安装 Chrome/Chromium
    async fn test_new_page_replaces_previous_page() {
        let mut session = BrowserSession::new(Config::from_env());
        let first = session.new_page().await.expect("创建页面失败");
        let second = session.new_page().await.expect("创建页面失败");
        assert_ne!(first.target_id(), second.target_id());
        assert!(session.is_launched());
        session.close().await;
        assert!(!session.is_launched());
    }

    #[tokio::test]
    #[ignore] // 需要本地安装 Chrome/Chromium
    async fn test_kill_browser_twice_only_logs() {
        let mut session = BrowserSession::new(Config::from_env());
        session.ensure_browser().await.expect("启动浏览器失败");
        let mut browser = session.browser.take().expect("浏览器未启动");
        kill_browser(&mut browser).await;
        kill_browser(&mut browser).await;
        assert!(!BrowserSession::is_connected(&browser).await);
        session.close().await;
    }
}
