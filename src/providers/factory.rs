//! 平台工厂：平台标识 → 适配器

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::models::{Credentials, Problem, ProviderKind};
use crate::providers::{GeeksForGeeksProvider, LeetCodeProvider, ProblemProvider};

/// 所有平台适配器
pub enum ProviderAdapter {
    LeetCode(LeetCodeProvider),
    GeeksForGeeks(GeeksForGeeksProvider),
}

impl ProviderAdapter {
    fn inner(&self) -> &dyn ProblemProvider {
        match self {
            ProviderAdapter::LeetCode(p) => p,
            ProviderAdapter::GeeksForGeeks(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ProblemProvider {
        match self {
            ProviderAdapter::LeetCode(p) => p,
            ProviderAdapter::GeeksForGeeks(p) => p,
        }
    }
}

#[async_trait]
impl ProblemProvider for ProviderAdapter {
    fn kind(&self) -> ProviderKind {
        self.inner().kind()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool> {
        self.inner_mut().login(credentials).await
    }

    async fn scrape_daily_question(&mut self) -> Result<Problem> {
        self.inner_mut().scrape_daily_question().await
    }

    async fn close_browser(&mut self) {
        self.inner_mut().close_browser().await
    }

    fn is_authenticated(&self) -> bool {
        self.inner().is_authenticated()
    }
}

/// 平台工厂，无状态
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn is_supported(provider: &str) -> bool {
        ProviderKind::from_id(provider).is_some()
    }

    /// 使用环境变量中的配置创建适配器
    pub fn create(provider: &str) -> Result<ProviderAdapter> {
        Self::create_with_config(provider, Config::from_env())
    }

    /// 创建适配器，此时不会启动浏览器
    pub fn create_with_config(provider: &str, config: Config) -> Result<ProviderAdapter> {
        let kind = ProviderKind::from_id(provider).ok_or_else(|| ScrapeError::UnsupportedProvider {
            provider: provider.to_string(),
        })?;
        debug!("创建适配器: {}", kind.display_name());

        let adapter = match kind {
            ProviderKind::LeetCode => ProviderAdapter::LeetCode(LeetCodeProvider::new(config)),
            ProviderKind::GeeksForGeeks => {
                ProviderAdapter::GeeksForGeeks(GeeksForGeeksProvider::new(config))
            }
        };
        Ok(adapter)
    }

    /// 所有支持的平台标识
    pub fn list_supported() -> Vec<&'static str> {
        ProviderKind::ALL.iter().map(|kind| kind.id()).collect()
    }
}
