//! 导航引擎 - 基础设施层
//!
//! 所有页面操作（导航、等待元素、等待导航完成）都带超时，瞬时失败按退避重试

use std::future::Future;
use std::time::Duration;

use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::infrastructure::retry::retry_operation;

/// networkidle 的近似：文档完成后再静默等待一段时间
const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(500);

/// 导航完成的判定条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    /// `document.readyState == "complete"`
    #[default]
    Load,
    /// DOM 已解析（`interactive` 或 `complete`）
    DomContentLoaded,
    /// 文档完成后再静默等待
    NetworkIdle,
}

impl WaitUntil {
    pub fn is_satisfied(self, ready_state: &str) -> bool {
        match self {
            WaitUntil::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            WaitUntil::Load | WaitUntil::NetworkIdle => ready_state == "complete",
        }
    }
}

/// 导航相关的超时与重试参数
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub navigation_timeout: Duration,
    pub element_timeout: Duration,
    /// 可选元素的短暂等待
    pub brief_timeout: Duration,
    pub retries: usize,
    pub base_delay: Duration,
    pub poll_interval: Duration,
}

impl NavigationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: config.navigation_timeout,
            element_timeout: config.element_timeout,
            brief_timeout: config.element_timeout.min(Duration::from_secs(3)),
            retries: config.max_retries,
            base_delay: config.retry_base_delay,
            poll_interval: Duration::from_millis(200),
        }
    }
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 把相对地址解析为绝对地址，已是绝对地址的原样返回
pub fn resolve_url(url: &str, base: Option<&str>) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ScrapeError::navigation_failed(url, "URL 为空"));
    }

    match Url::parse(url) {
        Ok(parsed) => Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                ScrapeError::navigation_failed(url, "相对地址缺少 base URL")
            })?;
            let base = Url::parse(base)
                .map_err(|e| ScrapeError::navigation_failed(base, format!("无效的 base URL: {}", e)))?;
            base.join(url)
                .map_err(|e| ScrapeError::navigation_failed(url, format!("无法拼接 URL: {}", e)))
        }
        Err(e) => Err(ScrapeError::navigation_failed(url, format!("无效的 URL: {}", e))),
    }
}

/// 空白页或错误页不算有效地址
fn is_blank_url(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url == "about:blank" || url.starts_with("chrome-error://")
}

/// 等待导航超时后是否仍接受当前页面：地址非空白且文档已可交互
pub fn accept_after_timeout(url: &str, ready_state: &str) -> bool {
    !is_blank_url(url) && WaitUntil::DomContentLoaded.is_satisfied(ready_state)
}

/// 导航引擎
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    options: NavigationOptions,
}

impl Navigator {
    pub fn new(options: NavigationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    /// 使用默认的重试次数和退避延迟执行操作
    pub async fn retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        retry_operation(op, self.options.retries, self.options.base_delay).await
    }

    /// 当前页面地址
    pub async fn current_url(&self, page: &Page) -> Result<String> {
        Ok(page.url().await?.unwrap_or_default())
    }

    async fn ready_state(&self, page: &Page) -> Result<String> {
        let state: String = page.evaluate("document.readyState").await?.into_value()?;
        Ok(state)
    }

    /// 校验并解析 URL 后导航，返回实际访问的地址
    pub async fn safe_goto(
        &self,
        page: &Page,
        url: &str,
        base: Option<&str>,
        wait_until: WaitUntil,
    ) -> Result<String> {
        let target = resolve_url(url, base)?.to_string();
        let limit = self.options.navigation_timeout;
        info!("🌐 导航到: {}", target);

        let result = self
            .retry(|| {
                let page = page.clone();
                let target = target.clone();
                async move {
                    match timeout(limit, page.goto(target.as_str())).await {
                        Ok(Ok(_)) => Ok(()),
                        Ok(Err(e)) => Err(ScrapeError::navigation_failed(&target, e)),
                        Err(_) => Err(ScrapeError::navigation_failed(
                            &target,
                            format!("超过 {:?} 未完成", limit),
                        )),
                    }
                }
            })
            .await;

        match result {
            Ok(()) => {}
            Err(e @ ScrapeError::RetryExhausted { .. }) => {
                return Err(ScrapeError::navigation_failed(&target, e));
            }
            Err(e) => return Err(e),
        }

        self.wait_for_ready_state(page, wait_until, limit).await?;
        debug!("页面导航成功: {}", target);
        Ok(target)
    }

    /// 轮询 `document.readyState` 直到满足条件
    async fn wait_for_ready_state(
        &self,
        page: &Page,
        wait_until: WaitUntil,
        limit: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + limit;
        loop {
            let state = self.ready_state(page).await.unwrap_or_default();
            if wait_until.is_satisfied(&state) {
                if wait_until == WaitUntil::NetworkIdle {
                    sleep(NETWORK_IDLE_SETTLE).await;
                }
                return Ok(());
            }
            if Instant::now() >= deadline {
                let url = self.current_url(page).await.unwrap_or_default();
                return Err(ScrapeError::navigation_failed(
                    url,
                    format!("页面就绪状态停留在 `{}` ({:?})", state, wait_until),
                ));
            }
            sleep(self.options.poll_interval).await;
        }
    }

    /// 等待导航完成
    ///
    /// 原生导航信号与计时器竞争；超时后只有当页面地址非空白且文档已可交互时才视为完成
    pub async fn wait_for_navigation(
        &self,
        page: &Page,
        limit: Duration,
        wait_until: WaitUntil,
    ) -> Result<()> {
        match timeout(limit, page.wait_for_navigation()).await {
            Ok(Ok(_)) => self.wait_for_ready_state(page, wait_until, limit).await,
            Ok(Err(e)) => {
                let url = self.current_url(page).await.unwrap_or_default();
                Err(ScrapeError::navigation_failed(url, e))
            }
            Err(_) => {
                let url = self.current_url(page).await.unwrap_or_default();
                let state = self.ready_state(page).await.unwrap_or_default();
                if accept_after_timeout(&url, &state) {
                    warn!(
                        "等待导航超时 ({:?})，页面 {} 已处于 `{}` 状态，按已完成处理",
                        limit, url, state
                    );
                    Ok(())
                } else {
                    Err(ScrapeError::navigation_failed(
                        url,
                        format!("等待导航超时 ({:?})，页面状态 `{}`", limit, state),
                    ))
                }
            }
        }
    }

    /// 等待选择器出现（只要求存在，不要求可见）
    ///
    /// # 参数
    /// - `limit`: 单次尝试的轮询时长
    /// - `retries`: 总尝试次数
    pub async fn wait_for_element(
        &self,
        page: &Page,
        selector: &str,
        limit: Duration,
        retries: usize,
    ) -> Result<Element> {
        debug!("等待元素: {}", selector);
        let poll_interval = self.options.poll_interval;

        let result = retry_operation(
            || {
                let page = page.clone();
                let selector = selector.to_string();
                async move { poll_for_element(&page, &selector, limit, poll_interval).await }
            },
            retries,
            self.options.base_delay,
        )
        .await;

        match result {
            Ok(element) => Ok(element),
            Err(ScrapeError::RetryExhausted { attempts, failures }) => {
                Err(ScrapeError::ElementNotFound {
                    selector: selector.to_string(),
                    attempts,
                    detail: failures.last().cloned().unwrap_or_default(),
                })
            }
            Err(e) => Err(e),
        }
    }
}

async fn poll_for_element(
    page: &Page,
    selector: &str,
    limit: Duration,
    poll_interval: Duration,
) -> Result<Element> {
    let deadline = Instant::now() + limit;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(ScrapeError::ElementNotFound {
                selector: selector.to_string(),
                attempts: 1,
                detail: format!("{:?} 内未出现", limit),
            });
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url_passes_through() {
        let url = resolve_url("https://leetcode.com/problems/two-sum/", Some("https://example.com")).unwrap();
        assert_eq!(url.as_str(), "https://leetcode.com/problems/two-sum/");
    }

    #[test]
    fn test_resolve_relative_url_against_base() {
        let url = resolve_url("/problems/two-sum/", Some("https://leetcode.com/problemset/")).unwrap();
        assert_eq!(url.as_str(), "https://leetcode.com/problems/two-sum/");

        let url = resolve_url("two-sum", Some("https://leetcode.com/problems/")).unwrap();
        assert_eq!(url.as_str(), "https://leetcode.com/problems/two-sum");
    }

    #[test]
    fn test_resolve_rejects_malformed_input() {
        assert!(matches!(
            resolve_url("/problems/x", None),
            Err(ScrapeError::NavigationFailed { .. })
        ));
        assert!(matches!(
            resolve_url("   ", Some("https://leetcode.com")),
            Err(ScrapeError::NavigationFailed { .. })
        ));
        assert!(matches!(
            resolve_url("http://[::1", None),
            Err(ScrapeError::NavigationFailed { .. })
        ));
        assert!(matches!(
            resolve_url("/x", Some("not a url")),
            Err(ScrapeError::NavigationFailed { .. })
        ));
    }

    #[test]
    fn test_wait_until_ready_states() {
        assert!(WaitUntil::DomContentLoaded.is_satisfied("interactive"));
        assert!(WaitUntil::DomContentLoaded.is_satisfied("complete"));
        assert!(!WaitUntil::DomContentLoaded.is_satisfied("loading"));
        assert!(!WaitUntil::Load.is_satisfied("interactive"));
        assert!(WaitUntil::NetworkIdle.is_satisfied("complete"));
    }

    #[test]
    fn test_timeout_accepts_only_ready_real_pages() {
        assert!(accept_after_timeout("https://leetcode.com/problemset/", "complete"));
        assert!(accept_after_timeout("https://leetcode.com/problemset/", "interactive"));
        assert!(!accept_after_timeout("https://leetcode.com/problemset/", "loading"));
        assert!(!accept_after_timeout("https://leetcode.com/problemset/", ""));
        assert!(!accept_after_timeout("about:blank", "complete"));
        assert!(!accept_after_timeout("", "complete"));
        assert!(!accept_after_timeout("chrome-error://chromewebdata/", "complete"));
    }

    #[test]
    fn test_blank_urls() {
        assert!(is_blank_url(""));
        assert!(is_blank_url("about:blank"));
        assert!(is_blank_url("chrome-error://chromewebdata/"));
        assert!(!is_blank_url("https://leetcode.com/"));
    }
}
