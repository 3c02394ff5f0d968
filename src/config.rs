use std::path::PathBuf;
use std::time::Duration;

/// 显式指定浏览器可执行文件的环境变量
pub const EXECUTABLE_OVERRIDE_VAR: &str = "CHROME_EXECUTABLE_PATH";

/// 存在任意一个即视为运行在 serverless / 受限文件系统环境
pub const SERVERLESS_MARKER_VARS: &[&str] = &["AWS_LAMBDA_FUNCTION_NAME", "VERCEL"];

/// 抓取引擎配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 显式指定的浏览器路径（优先级最高）
    pub chrome_executable: Option<PathBuf>,
    /// 是否运行在 serverless 环境
    pub serverless: bool,
    /// 是否无头运行
    pub headless: bool,
    /// 浏览器启动超时
    pub launch_timeout: Duration,
    /// 单次导航超时
    pub navigation_timeout: Duration,
    /// 单次元素等待超时
    pub element_timeout: Duration,
    /// 瞬时操作的最大尝试次数
    pub max_retries: usize,
    /// 退避基准延迟
    pub retry_base_delay: Duration,
    /// 页面视口 (宽, 高)
    pub viewport: (u32, u32),
    /// 页面 User-Agent
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            serverless: false,
            headless: true,
            launch_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
            viewport: (1366, 768),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载，仅读取浏览器路径与 serverless 标记
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            chrome_executable: std::env::var(EXECUTABLE_OVERRIDE_VAR)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            serverless: SERVERLESS_MARKER_VARS
                .iter()
                .any(|var| std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false)),
            ..default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.headless);
        assert!(config.chrome_executable.is_none());
        assert!(!config.serverless);
        assert_eq!(config.max_retries, 3);
        assert!(config.user_agent.contains("Chrome"));
    }
}
