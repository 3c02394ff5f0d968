//! LeetCode 适配器

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extraction::dom::{non_empty_text, NodeSnapshot};
use crate::extraction::parser::{
    extract_clean_description, html_to_text, parse_constraints, parse_examples,
};
use crate::infrastructure::navigator::WaitUntil;
use crate::infrastructure::PageDriver;
use crate::models::{Credentials, Difficulty, Problem, ProviderKind};
use crate::providers::{problem_segments, ProblemIdentity, ProblemProvider};
use crate::utils::logging::truncate_text;

pub const BASE_URL: &str = "https://leetcode.com";
const LOGIN_PATH: &str = "/accounts/login/";
const PROBLEMSET_PATH: &str = "/problemset/";

mod selectors {
    pub const LOGIN_USERNAME: &str = r#"input#id_login, input[name="login"]"#;
    pub const LOGIN_PASSWORD: &str = r#"input#id_password, input[name="password"]"#;
    pub const LOGIN_SUBMIT: &str = r#"button#signin_btn, button[type="submit"]"#;
    pub const LOGIN_ERROR: &str = r#".error-message__27FL, .alert-danger, [data-cy="sign-in-error"]"#;
    pub const AUTH_SIGNAL: &str = r#"a[href*="/accounts/logout"], #navbar_user_avatar, a[href^="/u/"]"#;

    pub const DAILY_LINK: &str = r#"a[href*="envType=daily-question"]"#;
    pub const PROBLEM_LIST_LINK: &str = r#"div[role="rowgroup"] a[href^="/problems/"]"#;

    pub const TITLE: &str = r#"div[data-cy="question-title"], div.text-title-large a, div.text-title-large"#;
    pub const DIFFICULTY: &str = r#"div[class*="text-difficulty-"], div[diff]"#;
    pub const TOPICS: &str = r#"a[href^="/tag/"]"#;
    pub const CONTENT: &str = r#"div[data-track-load="description_content"]"#;
    /// 只在题面区域内查找锁定标记，导航栏上的 Premium 入口不算
    pub const PREMIUM_LOCK: &str = r#"div[data-track-load="description_content"] svg[data-icon="lock"], div[class*="premium-lock"]"#;
}

/// 解析 LeetCode 题目地址：`/problems/{slug}`，id 即 slug
pub fn parse_problem_url(raw: &str) -> Result<ProblemIdentity> {
    let (_, segments) = problem_segments(raw, BASE_URL)?;
    let slug = segments[0].clone();
    Ok(ProblemIdentity {
        id: slug.clone(),
        url: format!("{}/problems/{}/", BASE_URL, slug),
        slug,
    })
}

/// 去掉标题前的题号，如 "1. Two Sum" → "Two Sum"
fn clean_title(raw: &str) -> String {
    let raw = raw.trim();
    match raw.split_once(". ") {
        Some((number, rest)) if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
            rest.trim().to_string()
        }
        _ => raw.to_string(),
    }
}

/// 会员题判定：题面区域内有锁定标记，或题面只剩订阅提示
fn is_premium_locked(content: &str, lock_markers: &[NodeSnapshot]) -> bool {
    !lock_markers.is_empty() || content.to_lowercase().contains("subscribe to unlock")
}

pub struct LeetCodeProvider {
    driver: PageDriver,
}

impl LeetCodeProvider {
    pub fn new(config: Config) -> Self {
        Self {
            driver: PageDriver::new(config),
        }
    }

    async fn try_login(&mut self, credentials: &Credentials) -> Result<bool> {
        self.driver.new_page().await?;
        self.driver
            .goto(LOGIN_PATH, Some(BASE_URL), WaitUntil::DomContentLoaded)
            .await?;

        self.driver
            .type_into(selectors::LOGIN_USERNAME, &credentials.identifier)
            .await?;
        self.driver
            .type_into(selectors::LOGIN_PASSWORD, &credentials.secret)
            .await?;
        self.driver.click(selectors::LOGIN_SUBMIT).await?;
        self.driver.wait_for_navigation(WaitUntil::DomContentLoaded).await?;

        if self.driver.exists(selectors::LOGIN_ERROR).await? {
            warn!("LeetCode 登录失败: 用户名或密码错误");
            return Ok(false);
        }
        if !self.driver.exists(selectors::AUTH_SIGNAL).await? {
            warn!("LeetCode 登录后未检测到用户入口");
            return Ok(false);
        }

        self.driver.set_authenticated(true);
        info!("✓ LeetCode 登录成功");
        Ok(true)
    }

    /// 找到每日一题链接：优先每日一题标记，其次题目列表中的第一题
    async fn resolve_daily_link(&self) -> Result<String> {
        if self.driver.exists(selectors::DAILY_LINK).await? {
            let links = self
                .driver
                .elements(selectors::DAILY_LINK, |node| node.href.clone(), 1)
                .await?;
            if let Some(link) = links.into_iter().next() {
                return Ok(link);
            }
        }

        warn!("未找到每日一题标记，改用题目列表中的第一题");
        let links = self
            .driver
            .elements(selectors::PROBLEM_LIST_LINK, |node| node.href.clone(), 1)
            .await?;
        Ok(links.into_iter().next().unwrap_or_default())
    }

    async fn try_scrape(&mut self) -> Result<Problem> {
        self.driver.new_page().await?;
        self.driver
            .goto(PROBLEMSET_PATH, Some(BASE_URL), WaitUntil::DomContentLoaded)
            .await?;

        let link = self.resolve_daily_link().await?;
        let identity = parse_problem_url(&link)?;
        info!("📌 今日题目: {}", identity.slug);

        self.driver
            .goto(&identity.url, None, WaitUntil::DomContentLoaded)
            .await?;

        let title = clean_title(&self.driver.text(selectors::TITLE, true).await?);
        let difficulty = Difficulty::normalize_label(&self.driver.text(selectors::DIFFICULTY, false).await?);
        let topics = self.driver.elements(selectors::TOPICS, non_empty_text, 0).await?;
        let content = html_to_text(&self.driver.html(selectors::CONTENT, false).await?);
        let lock_markers = self.driver.snapshots(selectors::PREMIUM_LOCK).await?;
        let is_premium = is_premium_locked(&content, &lock_markers);

        // 会员题没有公开题面，其余题目必须有题面
        if content.is_empty() && !is_premium {
            return Err(ScrapeError::RequiredTextMissing {
                selector: selectors::CONTENT.to_string(),
            });
        }
        let description = Some(extract_clean_description(&content)).filter(|d| !d.is_empty());
        info!("题面: {}", truncate_text(description.as_deref().unwrap_or(""), 60));

        Problem::builder(ProviderKind::LeetCode)
            .identity(identity.id, identity.slug, identity.url)
            .title(title)
            .difficulty(difficulty)
            .topics(topics)
            .description(description)
            .examples(parse_examples(&content))
            .constraints(parse_constraints(&content))
            .premium(is_premium)
            .date(Utc::now())
            .build()
    }
}

#[async_trait]
impl ProblemProvider for LeetCodeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LeetCode
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool> {
        let result = self.try_login(credentials).await;
        if !matches!(result, Ok(true)) {
            self.driver.close().await;
        }
        result
    }

    async fn scrape_daily_question(&mut self) -> Result<Problem> {
        let result = self.try_scrape().await;
        self.driver.close_on_error(result).await
    }

    async fn close_browser(&mut self) {
        self.driver.close().await;
    }

    fn is_authenticated(&self) -> bool {
        self.driver.is_authenticated()
    }
}
