//! GeeksforGeeks 适配器
//!
//! 题面中的示例是 `<strong>Input:</strong> ...` 这样的标签/值结构，没有 "Example N:" 编号

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extraction::dom::{non_empty_text, NodeSnapshot};
use crate::extraction::parser::{
    extract_clean_labeled_description, html_to_text, parse_constraints, parse_examples,
    parse_labeled_examples,
};
use crate::infrastructure::navigator::WaitUntil;
use crate::infrastructure::PageDriver;
use crate::models::{Credentials, Difficulty, Problem, ProblemExample, ProviderKind};
use crate::providers::{problem_segments, ProblemIdentity, ProblemProvider};

pub const BASE_URL: &str = "https://www.geeksforgeeks.org";
const LOGIN_URL: &str = "https://auth.geeksforgeeks.org/";
const POTD_PATH: &str = "/problem-of-the-day";
const FALLBACK_LINK_TEXT: &str = "solve problem";

mod selectors {
    pub const LOGIN_USERNAME: &str = r#"input#luser, input[name="user"]"#;
    pub const LOGIN_PASSWORD: &str = r#"input#password, input[name="pass"]"#;
    pub const LOGIN_SUBMIT: &str = r#"button.signin-button, button[type="submit"]"#;
    pub const LOGIN_ERROR: &str = r#".alert-danger, .signin-error, .error-message"#;
    pub const AUTH_SIGNAL: &str = r#"a[href*="logout"], .profile_pic, div[class*="header-main__profile"]"#;

    pub const POTD_CARD_LINK: &str = r#"div[class*="problemOfTheDay"] a[href*="/problems/"], div[class*="potd"] a[href*="/problems/"]"#;
    pub const ANY_LINK: &str = "a[href]";

    pub const TITLE: &str = r#"h3[class*="problems_header_content__title"], div[class*="problems_header_content"] h3"#;
    pub const HEADER_DESCRIPTION: &str = r#"div[class*="problems_header_description"]"#;
    pub const TOPICS: &str = r#"div[class*="problems_tag_container"] a, a[href*="category%5B%5D="]"#;
    pub const CONTENT: &str = r#"div[class*="problems_problem_content"]"#;
}

/// 解析 GeeksforGeeks 题目地址：`/problems/{slug}/{n}`
///
/// 有数字段时 id 为 `{slug}-{n}`，否则为 slug
pub fn parse_problem_url(raw: &str) -> Result<ProblemIdentity> {
    let (_, segments) = problem_segments(raw, BASE_URL)?;
    let slug = segments[0].clone();

    let number = segments
        .get(1)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));

    let identity = match number {
        Some(n) => ProblemIdentity {
            id: format!("{}-{}", slug, n),
            url: format!("{}/problems/{}/{}", BASE_URL, slug, n),
            slug,
        },
        None => ProblemIdentity {
            id: slug.clone(),
            url: format!("{}/problems/{}", BASE_URL, slug),
            slug,
        },
    };
    Ok(identity)
}

/// 备用策略：链接文字包含 "Solve Problem" 的题目链接
fn find_solve_link(nodes: &[NodeSnapshot]) -> Option<String> {
    nodes
        .iter()
        .filter(|node| node.text.to_lowercase().contains(FALLBACK_LINK_TEXT))
        .find_map(|node| node.href.clone())
}

/// 示例优先按标签/值解析，没有结果时再尝试带编号的格式
fn parse_problem_examples(content: &str) -> Vec<ProblemExample> {
    let examples = parse_labeled_examples(content);
    if examples.is_empty() {
        parse_examples(content)
    } else {
        examples
    }
}

pub struct GeeksForGeeksProvider {
    driver: PageDriver,
}

impl GeeksForGeeksProvider {
    pub fn new(config: Config) -> Self {
        Self {
            driver: PageDriver::new(config),
        }
    }

    async fn try_login(&mut self, credentials: &Credentials) -> Result<bool> {
        self.driver.new_page().await?;
        self.driver
            .goto(LOGIN_URL, None, WaitUntil::DomContentLoaded)
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
            warn!("GeeksforGeeks 登录失败: 用户名或密码错误");
            return Ok(false);
        }
        if !self.driver.exists(selectors::AUTH_SIGNAL).await? {
            warn!("GeeksforGeeks 登录后未检测到用户入口");
            return Ok(false);
        }

        self.driver.set_authenticated(true);
        info!("✓ GeeksforGeeks 登录成功");
        Ok(true)
    }

    /// 优先取每日一题卡片里的题目链接，其次取文字为 "Solve Problem" 的链接
    async fn resolve_potd_link(&self) -> Result<String> {
        if self.driver.exists(selectors::POTD_CARD_LINK).await? {
            let links = self
                .driver
                .elements(selectors::POTD_CARD_LINK, |node| node.href.clone(), 1)
                .await?;
            if let Some(link) = links.into_iter().next() {
                return Ok(link);
            }
        }

        warn!("未找到每日一题卡片，改用 \"Solve Problem\" 链接");
        let nodes = self.driver.snapshots(selectors::ANY_LINK).await?;
        find_solve_link(&nodes).ok_or_else(|| ScrapeError::ElementNotFound {
            selector: selectors::POTD_CARD_LINK.to_string(),
            attempts: 1,
            detail: "页面中没有 \"Solve Problem\" 链接".to_string(),
        })
    }

    async fn try_scrape(&mut self) -> Result<Problem> {
        self.driver.new_page().await?;
        self.driver
            .goto(POTD_PATH, Some(BASE_URL), WaitUntil::NetworkIdle)
            .await?;

        let link = self.resolve_potd_link().await?;
        let identity = parse_problem_url(&link)?;
        info!("📌 今日题目: {}", identity.id);

        self.driver
            .goto(&identity.url, None, WaitUntil::DomContentLoaded)
            .await?;

        let title = self.driver.text(selectors::TITLE, true).await?;
        let header = self.driver.text(selectors::HEADER_DESCRIPTION, false).await?;
        let difficulty = Difficulty::find(&header)
            .map(|d| d.label().to_string())
            .unwrap_or_else(|| Difficulty::normalize_label(&header));
        let topics = self.driver.elements(selectors::TOPICS, non_empty_text, 0).await?;

        let content = html_to_text(&self.driver.html(selectors::CONTENT, true).await?);
        let description = Some(extract_clean_labeled_description(&content)).filter(|d| !d.is_empty());

        Problem::builder(ProviderKind::GeeksForGeeks)
            .identity(identity.id, identity.slug, identity.url)
            .title(title)
            .difficulty(difficulty)
            .topics(topics)
            .description(description)
            .examples(parse_problem_examples(&content))
            .constraints(parse_constraints(&content))
            .premium(false)
            .date(Utc::now())
            .build()
    }
}

#[async_trait]
impl ProblemProvider for GeeksForGeeksProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GeeksForGeeks
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_with_numeric_segment() {
        let identity =
            parse_problem_url("https://www.geeksforgeeks.org/problems/kadanes-algorithm-1587115620/1?page=1").unwrap();
        assert_eq!(identity.slug, "kadanes-algorithm-1587115620");
        assert_eq!(identity.id, "kadanes-algorithm-1587115620-1");
        assert_eq!(
            identity.url,
            "https://www.geeksforgeeks.org/problems/kadanes-algorithm-1587115620/1"
        );
    }

    #[test]
    fn test_parse_url_without_numeric_segment() {
        let identity = parse_problem_url("/problems/rotate-array/").unwrap();
        assert_eq!(identity.id, "rotate-array");
        assert_eq!(identity.url, "https://www.geeksforgeeks.org/problems/rotate-array");

        let identity = parse_problem_url("/problems/rotate-array/editorial").unwrap();
        assert_eq!(identity.id, "rotate-array");
    }

    #[test]
    fn test_parse_rejects_non_problem_url() {
        assert!(matches!(
            parse_problem_url("https://www.geeksforgeeks.org/problem-of-the-day"),
            Err(ScrapeError::InvalidProblemUrl { .. })
        ));
    }

    #[test]
    fn test_fallback_link_by_text() {
        let nodes = vec![
            NodeSnapshot {
                text: "Practice".into(),
                html: String::new(),
                href: Some("https://www.geeksforgeeks.org/explore".into()),
            },
            NodeSnapshot {
                text: "  SOLVE PROBLEM ".into(),
                html: String::new(),
                href: Some("https://www.geeksforgeeks.org/problems/rotate-array/1".into()),
            },
        ];
        assert_eq!(
            find_solve_link(&nodes).as_deref(),
            Some("https://www.geeksforgeeks.org/problems/rotate-array/1")
        );
        assert!(find_solve_link(&nodes[..1]).is_none());
    }

    #[test]
    fn test_labeled_examples_from_problem_html() {
        let html = "<p>Given an array arr[], find the maximum.</p>\
            <p><strong>Examples:</strong></p>\
            <pre><strong>Input: </strong>arr[] = [1, 2, 3]\n<strong>Output: </strong>3\n\
            <strong>Explanation: </strong>3 is the largest.</pre>\
            <pre><strong>Input: </strong>arr[] = [7]\n<strong>Output: </strong>7</pre>\
            <p><strong>Constraints:</strong><br>1 ≤ arr.size() ≤ 10<sup>5</sup></p>";
        let content = html_to_text(html);
        let examples = parse_problem_examples(&content);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].index, 1);
        assert_eq!(examples[0].input, "arr[] = [1, 2, 3]");
        assert_eq!(examples[0].output, "3");
        assert_eq!(examples[0].explanation.as_deref(), Some("3 is the largest."));
        assert_eq!(examples[1].index, 2);
        assert_eq!(examples[1].output, "7");

        let constraints = parse_constraints(&content);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].text, "1 ≤ arr.size() ≤ 10^5");

        let description = extract_clean_labeled_description(&content);
        assert_eq!(description, "Given an array arr[], find the maximum.");
        assert!(!description.contains("Input:"));
    }
}
