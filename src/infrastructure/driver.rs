//! 页面驱动 - 供各平台适配器组合使用
//!
//! 把浏览器会话、导航引擎和提取工具收拢到一个对象里，适配器只持有它

use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tracing::debug;

use crate::browser::session::BrowserSession;
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extraction::dom::{self, NodeSnapshot};
use crate::infrastructure::navigator::{NavigationOptions, Navigator, WaitUntil};

pub struct PageDriver {
    session: BrowserSession,
    navigator: Navigator,
}

impl PageDriver {
    pub fn new(config: Config) -> Self {
        Self::with_session(BrowserSession::new(config))
    }

    pub fn with_session(session: BrowserSession) -> Self {
        let navigator = Navigator::new(NavigationOptions::from_config(session.config()));
        Self { session, navigator }
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BrowserSession {
        &mut self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// 创建新页面，旧页面会被关闭
    pub async fn new_page(&mut self) -> Result<()> {
        self.session.new_page().await?;
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.session
            .page()
            .ok_or_else(|| ScrapeError::page_creation_failed("尚未创建页面", false))
    }

    /// 导航到 `url`（相对地址按 `base` 解析），返回实际访问的地址
    pub async fn goto(&self, url: &str, base: Option<&str>, wait_until: WaitUntil) -> Result<String> {
        self.navigator.safe_goto(self.page()?, url, base, wait_until).await
    }

    /// 使用默认超时和重试次数等待元素
    pub async fn wait_for(&self, selector: &str) -> Result<Element> {
        let options = self.navigator.options();
        self.navigator
            .wait_for_element(self.page()?, selector, options.element_timeout, options.retries)
            .await
    }

    /// 短暂探测元素是否存在，不重试
    pub async fn exists(&self, selector: &str) -> Result<bool> {
        let brief = self.navigator.options().brief_timeout;
        match self.navigator.wait_for_element(self.page()?, selector, brief, 1).await {
            Ok(_) => Ok(true),
            Err(ScrapeError::ElementNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn wait_for_navigation(&self, wait_until: WaitUntil) -> Result<()> {
        let limit = self.navigator.options().navigation_timeout;
        self.navigator.wait_for_navigation(self.page()?, limit, wait_until).await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.navigator.current_url(self.page()?).await
    }

    pub async fn text(&self, selector: &str, required: bool) -> Result<String> {
        dom::extract_text(&self.navigator, self.page()?, selector, required).await
    }

    pub async fn html(&self, selector: &str, required: bool) -> Result<String> {
        dom::extract_html(&self.navigator, self.page()?, selector, required).await
    }

    pub async fn elements<T, F>(&self, selector: &str, mapper: F, min_count: usize) -> Result<Vec<T>>
    where
        F: FnMut(&NodeSnapshot) -> Option<T>,
    {
        dom::extract_elements(&self.navigator, self.page()?, selector, mapper, min_count).await
    }

    /// 所有匹配节点的快照（不等待）
    pub async fn snapshots(&self, selector: &str) -> Result<Vec<NodeSnapshot>> {
        dom::snapshot_all(self.page()?, selector).await
    }

    /// 等待输入框出现后输入文本
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.wait_for(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        debug!("已在 `{}` 输入 {} 个字符", selector, text.chars().count());
        Ok(())
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self.wait_for(selector).await?;
        element.click().await?;
        debug!("已点击 `{}`", selector);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.session.set_authenticated(authenticated);
    }

    /// 关闭页面和浏览器，不会失败
    pub async fn close(&mut self) {
        self.session.close().await;
    }

    /// 出错时先关闭浏览器再把错误原样返回
    pub async fn close_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.close().await;
        }
        result
    }
}
