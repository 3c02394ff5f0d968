//! 题目平台适配器
//!
//! 每个平台一个适配器，共同实现 [`ProblemProvider`]；
//! 浏览器生命周期、重试和提取逻辑都由组合进来的 [`PageDriver`](crate::infrastructure::PageDriver) 提供

pub mod factory;
pub mod geeksforgeeks;
pub mod leetcode;

use async_trait::async_trait;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::infrastructure::navigator::resolve_url;
use crate::models::{Credentials, Problem, ProviderKind};

pub use factory::{ProviderAdapter, ProviderFactory};
pub use geeksforgeeks::GeeksForGeeksProvider;
pub use leetcode::LeetCodeProvider;

/// 平台适配器的能力集合
#[async_trait]
pub trait ProblemProvider: Send {
    /// 适配器对应的平台
    fn kind(&self) -> ProviderKind;

    /// 登录
    ///
    /// 传输或配置错误返回 `Err`；能识别的凭证错误返回 `Ok(false)`。
    /// 未登录成功时浏览器总会被关闭
    async fn login(&mut self, credentials: &Credentials) -> Result<bool>;

    /// 抓取今天的每日一题，出错前会先关闭浏览器
    async fn scrape_daily_question(&mut self) -> Result<Problem>;

    /// 关闭浏览器，可以重复调用
    async fn close_browser(&mut self);

    /// 当前会话是否已登录
    fn is_authenticated(&self) -> bool;
}

/// 从题目 URL 推导出的标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemIdentity {
    pub id: String,
    pub slug: String,
    /// 规范化后的题目地址
    pub url: String,
}

/// 解析题目地址，返回 `/problems/` 之后的路径段
///
/// 相对地址按 `base` 解析；不含 `/problems/{slug}` 的地址返回 `InvalidProblemUrl`
fn problem_segments(raw: &str, base: &str) -> Result<(Url, Vec<String>)> {
    let url = resolve_url(raw, Some(base)).map_err(|_| ScrapeError::invalid_problem_url(raw))?;

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .skip_while(|s| *s != "problems")
                .skip(1)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    match segments.first() {
        Some(slug) if is_valid_slug(slug) => Ok((url, segments)),
        _ => Err(ScrapeError::invalid_problem_url(raw)),
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
