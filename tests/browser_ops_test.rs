//! 需要本地浏览器的页面操作测试，默认忽略：cargo test -- --ignored

use std::time::Duration;

use chromiumoxide::Page;
use daily_problem_scraper::browser::BrowserSession;
use daily_problem_scraper::config::Config;
use daily_problem_scraper::extraction::dom::{extract_elements, extract_text, non_empty_text};
use daily_problem_scraper::infrastructure::{NavigationOptions, Navigator, WaitUntil};
use daily_problem_scraper::utils::logging;
use daily_problem_scraper::ScrapeError;

const PROBLEM_HTML: &str = "<html><body>\
    <h1>Two Sum</h1>\
    <p id='blank'></p>\
    <ul><li>Array</li><li>Hash Table</li></ul>\
    </body></html>";

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", html.replace(' ', "%20"))
}

async fn open_page(html: &str) -> (BrowserSession, Page, Navigator) {
    logging::init();

    let config = Config::from_env();
    let mut session = BrowserSession::new(config.clone());
    let page = session.new_page().await.expect("创建页面失败");

    let navigator = Navigator::new(NavigationOptions {
        element_timeout: Duration::from_millis(500),
        brief_timeout: Duration::from_millis(300),
        base_delay: Duration::from_millis(20),
        ..NavigationOptions::from_config(&config)
    });
    navigator
        .safe_goto(&page, &data_url(html), None, WaitUntil::Load)
        .await
        .expect("打开测试页面失败");

    (session, page, navigator)
}

#[tokio::test]
#[ignore]
async fn test_wait_for_element_reports_attempts() {
    let (mut session, page, navigator) = open_page(PROBLEM_HTML).await;

    let found = navigator
        .wait_for_element(&page, "h1", Duration::from_millis(500), 1)
        .await;
    assert!(found.is_ok());

    let missing = navigator
        .wait_for_element(&page, "#missing", Duration::from_millis(200), 2)
        .await;
    match missing {
        Err(ScrapeError::ElementNotFound { selector, attempts, .. }) => {
            assert_eq!(selector, "#missing");
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_extract_text_optional_and_required() {
    let (mut session, page, navigator) = open_page(PROBLEM_HTML).await;

    assert_eq!(extract_text(&navigator, &page, "h1", true).await.unwrap(), "Two Sum");
    assert_eq!(extract_text(&navigator, &page, "#missing", false).await.unwrap(), "");
    assert_eq!(extract_text(&navigator, &page, "#blank", false).await.unwrap(), "");

    for selector in ["#missing", "#blank"] {
        match extract_text(&navigator, &page, selector, true).await {
            Err(ScrapeError::RequiredTextMissing { selector: reported }) => {
                assert_eq!(reported, selector)
            }
            other => panic!("unexpected result for {}: {:?}", selector, other),
        }
    }

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_extract_elements_min_count() {
    let (mut session, page, navigator) = open_page(PROBLEM_HTML).await;

    let topics = extract_elements(&navigator, &page, "li", non_empty_text, 2)
        .await
        .unwrap();
    assert_eq!(topics, vec!["Array".to_string(), "Hash Table".to_string()]);

    match extract_elements(&navigator, &page, "li", non_empty_text, 3).await {
        Err(ScrapeError::InsufficientElements { expected, found, .. }) => {
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let none = extract_elements(&navigator, &page, "ol li", non_empty_text, 0)
        .await
        .unwrap();
    assert!(none.is_empty());

    match extract_elements(&navigator, &page, "ol li", non_empty_text, 1).await {
        Err(ScrapeError::InsufficientElements { found, .. }) => assert_eq!(found, 0),
        other => panic!("unexpected result: {:?}", other),
    }

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_wait_for_navigation_accepts_loaded_page() {
    let (mut session, page, navigator) = open_page(PROBLEM_HTML).await;

    // 没有进行中的导航：要么原生信号直接返回，要么超时后按已就绪页面接受
    navigator
        .wait_for_navigation(&page, Duration::from_millis(500), WaitUntil::DomContentLoaded)
        .await
        .expect("已加载的页面应被接受");

    session.close().await;
}
