use std::time::Duration;

use anyhow::{bail, Context, Result};
use daily_problem_scraper::utils::logging;
use daily_problem_scraper::{Config, Credentials, Problem, ProblemProvider, ProviderAdapter, ProviderFactory};
use tracing::warn;

/// 整个抓取流程的截止时间
const SCRAPE_DEADLINE: Duration = Duration::from_secs(180);
const LOGIN_ID_VAR: &str = "SCRAPER_LOGIN_ID";
const LOGIN_SECRET_VAR: &str = "SCRAPER_LOGIN_SECRET";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    let provider = match std::env::args().nth(1) {
        Some(arg) if arg == "--list" || arg == "-l" => {
            for id in ProviderFactory::list_supported() {
                println!("{}", id);
            }
            return Ok(());
        }
        Some(arg) => arg,
        None => bail!(
            "用法: daily-problem-scraper <provider> | --list\n支持的平台: {}",
            ProviderFactory::list_supported().join(", ")
        ),
    };

    // 加载配置
    let config = Config::from_env();
    let mut adapter = ProviderFactory::create_with_config(&provider, config)?;
    let credentials = credentials_from_env();
    logging::log_scrape_start(adapter.kind(), credentials.is_some());

    let outcome = tokio::time::timeout(SCRAPE_DEADLINE, run(&mut adapter, credentials.as_ref())).await;
    adapter.close_browser().await;

    let problem = match outcome {
        Ok(result) => result?,
        Err(_) => bail!("抓取超过 {:?} 仍未完成", SCRAPE_DEADLINE),
    };

    logging::log_problem_summary(&problem);
    println!("{}", serde_json::to_string_pretty(&problem)?);
    Ok(())
}

async fn run(adapter: &mut ProviderAdapter, credentials: Option<&Credentials>) -> Result<Problem> {
    if let Some(credentials) = credentials {
        let logged_in = adapter.login(credentials).await.context("登录时出错")?;
        if !logged_in {
            warn!("登录未成功，以游客身份继续抓取");
        }
    }

    adapter
        .scrape_daily_question()
        .await
        .context("抓取每日一题失败")
}

fn credentials_from_env() -> Option<Credentials> {
    let identifier = std::env::var(LOGIN_ID_VAR).ok().filter(|v| !v.trim().is_empty())?;
    let secret = std::env::var(LOGIN_SECRET_VAR).ok().filter(|v| !v.is_empty())?;
    Some(Credentials::new(identifier.trim(), secret))
}
