use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::models::provider::ProviderKind;

/// 单条约束允许的最大字符数，超过说明章节边界解析出错
pub const MAX_CONSTRAINT_LEN: usize = 200;

/// 登录凭据，只在内存中使用
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

/// 题目示例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemExample {
    /// 示例序号（从 1 开始）
    pub index: u32,
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProblemExample {
    /// 序号为正且输入输出都非空
    pub fn is_valid(&self) -> bool {
        self.index >= 1 && !self.input.trim().is_empty() && !self.output.trim().is_empty()
    }
}

/// 题目约束
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConstraint {
    pub text: String,
}

impl ProblemConstraint {
    /// 空白或超长文本返回 None
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_CONSTRAINT_LEN {
            return None;
        }
        Some(Self {
            text: text.to_string(),
        })
    }
}

/// 规范化后的题目记录，引擎唯一的输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub slug: String,
    pub url: String,
    pub title: String,
    pub difficulty: String,
    pub topics: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<ProblemExample>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<ProblemConstraint>>,
    pub is_premium: bool,
    pub provider: ProviderKind,
    /// 当天 00:00 (UTC)
    pub problem_date: DateTime<Utc>,
}

impl Problem {
    pub fn builder(provider: ProviderKind) -> ProblemBuilder {
        ProblemBuilder::new(provider)
    }
}

/// 把任意时刻截断到当天 UTC 零点
pub fn day_start_utc(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// 构建 Problem 并保证不变量
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    provider: ProviderKind,
    id: String,
    slug: String,
    url: String,
    title: String,
    difficulty: String,
    topics: BTreeSet<String>,
    description: Option<String>,
    examples: Vec<ProblemExample>,
    constraints: Vec<ProblemConstraint>,
    is_premium: bool,
    problem_date: DateTime<Utc>,
}

impl ProblemBuilder {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            id: String::new(),
            slug: String::new(),
            url: String::new(),
            title: String::new(),
            difficulty: String::new(),
            topics: BTreeSet::new(),
            description: None,
            examples: Vec::new(),
            constraints: Vec::new(),
            is_premium: false,
            problem_date: Utc::now(),
        }
    }

    pub fn identity(mut self, id: impl Into<String>, slug: impl Into<String>, url: impl Into<String>) -> Self {
        self.id = id.into();
        self.slug = slug.into();
        self.url = url.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.topics.extend(
            topics
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn examples(mut self, examples: Vec<ProblemExample>) -> Self {
        self.examples = examples.into_iter().filter(ProblemExample::is_valid).collect();
        self
    }

    pub fn constraints(mut self, constraints: Vec<ProblemConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn premium(mut self, is_premium: bool) -> Self {
        self.is_premium = is_premium;
        self
    }

    /// 题目日期，会被截断到 UTC 零点
    pub fn date(mut self, at: DateTime<Utc>) -> Self {
        self.problem_date = at;
        self
    }

    pub fn build(self) -> Result<Problem> {
        if self.id.trim().is_empty() || self.slug.trim().is_empty() {
            return Err(ScrapeError::invalid_problem_url(self.url));
        }
        if self.title.trim().is_empty() {
            return Err(ScrapeError::RequiredTextMissing {
                selector: "title".to_string(),
            });
        }

        Ok(Problem {
            id: self.id,
            slug: self.slug,
            url: self.url,
            title: self.title.trim().to_string(),
            difficulty: self.difficulty,
            topics: self.topics,
            description: self.description,
            examples: Some(self.examples).filter(|e| !e.is_empty()),
            constraints: Some(self.constraints).filter(|c| !c.is_empty()),
            is_premium: self.is_premium,
            provider: self.provider,
            problem_date: day_start_utc(self.problem_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn sample_builder() -> ProblemBuilder {
        Problem::builder(ProviderKind::LeetCode)
            .identity("two-sum", "two-sum", "https://leetcode.com/problems/two-sum/")
            .title("Two Sum")
            .difficulty("Easy")
    }

    #[test]
    fn test_problem_date_is_midnight_utc() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 58).unwrap();
        let problem = sample_builder().date(at).build().unwrap();
        assert_eq!(problem.problem_date.hour(), 0);
        assert_eq!(problem.problem_date.minute(), 0);
        assert_eq!(problem.problem_date.second(), 0);
        assert_eq!(problem.problem_date.nanosecond(), 0);
        assert_eq!(problem.problem_date.date_naive(), at.date_naive());
    }

    #[test]
    fn test_empty_topics_are_dropped() {
        let problem = sample_builder()
            .topics(["Array", "", "  ", "Hash Table", "Array"])
            .build()
            .unwrap();
        assert_eq!(problem.topics.len(), 2);
        assert!(problem.topics.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_empty_identity_is_rejected() {
        let result = Problem::builder(ProviderKind::GeeksForGeeks)
            .identity("", "", "https://example.com/")
            .title("x")
            .build();
        assert!(matches!(result, Err(ScrapeError::InvalidProblemUrl { .. })));
    }

    #[test]
    fn test_invalid_examples_are_filtered() {
        let examples = vec![
            ProblemExample {
                index: 1,
                input: "a = 1".into(),
                output: "2".into(),
                explanation: None,
                image: None,
            },
            ProblemExample {
                index: 2,
                input: "a = 2".into(),
                output: " ".into(),
                explanation: None,
                image: None,
            },
        ];
        let problem = sample_builder().examples(examples).build().unwrap();
        assert_eq!(problem.examples.unwrap().len(), 1);
        assert!(problem.constraints.is_none());
    }

    #[test]
    fn test_constraint_length_bound() {
        assert!(ProblemConstraint::new("1 <= n <= 10^5").is_some());
        assert!(ProblemConstraint::new("   ").is_none());
        assert!(ProblemConstraint::new(&"x".repeat(MAX_CONSTRAINT_LEN + 1)).is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
