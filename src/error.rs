use thiserror::Error;

/// 抓取引擎错误类型
///
/// 分为三类：
/// - 配置/环境错误（致命）：`ExecutableNotResolved`、`BrowserLaunchFailed`、`PageCreationFailed`
/// - 瞬时错误（内部重试后才抛出）：`ElementNotFound`、`NavigationFailed`、`Cdp`
/// - 结构性错误（页面结构不符，重试无意义）：`InvalidProblemUrl`、`RequiredTextMissing`、`InsufficientElements`
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 无法确定浏览器可执行文件
    #[error("无法解析浏览器可执行文件路径: {reason}")]
    ExecutableNotResolved { reason: String },

    /// 浏览器进程启动失败
    #[error("启动浏览器失败 ({executable}): {message}{}", format_hint(.hint))]
    BrowserLaunchFailed {
        executable: String,
        message: String,
        hint: Option<String>,
    },

    /// 创建页面失败
    #[error("创建页面失败: {reason}")]
    PageCreationFailed {
        reason: String,
        /// 浏览器已断开，调用方可以选择重新启动后再试
        stale_browser: bool,
    },

    /// 元素等待超时
    #[error("未找到元素 `{selector}` (已尝试 {attempts} 次): {detail}")]
    ElementNotFound {
        selector: String,
        attempts: usize,
        detail: String,
    },

    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },

    /// 重试耗尽，保留每一次尝试的错误信息
    #[error("操作在 {attempts} 次尝试后仍然失败:\n{}", format_failures(.failures))]
    RetryExhausted {
        attempts: usize,
        failures: Vec<String>,
    },

    /// 重试途中遇到不可重试的错误，保留之前每一次瞬时失败
    #[error("操作在第 {} 次尝试时遇到不可重试的错误: {cause}\n{}", .failures.len() + 1, format_failures(.failures))]
    RetryAborted {
        failures: Vec<String>,
        cause: Box<ScrapeError>,
    },

    /// URL 不符合任何已知的题目路径格式
    #[error("无法识别的题目 URL: {url}")]
    InvalidProblemUrl { url: String },

    /// 必需的文本不存在或为空
    #[error("必需的文本缺失: `{selector}`")]
    RequiredTextMissing { selector: String },

    /// 匹配的元素数量不足
    #[error("元素 `{selector}` 数量不足: 至少需要 {expected} 个, 实际 {found} 个")]
    InsufficientElements {
        selector: String,
        expected: usize,
        found: usize,
    },

    /// 不支持的题目平台
    #[error("不支持的题目平台: {provider}")]
    UnsupportedProvider { provider: String },

    /// CDP 协议错误
    #[error("浏览器协议错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// 页面脚本返回值解析失败
    #[error("脚本结果解析失败: {0}")]
    Script(#[from] serde_json::Error),
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!("\n提示: {}", hint),
        None => String::new(),
    }
}

fn format_failures(failures: &[String]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(i, msg)| format!("  第 {} 次尝试: {}", i + 1, msg))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ScrapeError {
    /// 是否属于可重试的瞬时错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::ElementNotFound { .. }
                | ScrapeError::NavigationFailed { .. }
                | ScrapeError::Cdp(_)
        )
    }

    /// 去掉重试包装后的根本错误
    pub fn root_cause(&self) -> &ScrapeError {
        match self {
            ScrapeError::RetryAborted { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    // ========== 便捷构造函数 ==========

    /// 创建导航失败错误
    pub fn navigation_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        ScrapeError::NavigationFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建页面创建失败错误
    pub fn page_creation_failed(reason: impl ToString, stale_browser: bool) -> Self {
        ScrapeError::PageCreationFailed {
            reason: reason.to_string(),
            stale_browser,
        }
    }

    /// 创建无效题目 URL 错误
    pub fn invalid_problem_url(url: impl Into<String>) -> Self {
        ScrapeError::InvalidProblemUrl { url: url.into() }
    }
}

// ========== Result 类型别名 ==========

/// 抓取引擎结果类型
pub type Result<T> = std::result::Result<T, ScrapeError>;
