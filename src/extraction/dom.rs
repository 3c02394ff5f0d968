//! 页面侧的提取工具
//!
//! 元素的文本、HTML 和链接在一次脚本调用中取出（`NodeSnapshot`），
//! 之后的映射都是纯函数，不再访问页面

use chromiumoxide::Page;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::infrastructure::js_executor::{js_string_literal, JsExecutor};
use crate::infrastructure::navigator::Navigator;
use crate::utils::logging::truncate_text;

/// 单个匹配节点的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NodeSnapshot {
    pub text: String,
    pub html: String,
    /// 链接的绝对地址（非链接为 None）
    pub href: Option<String>,
}

fn snapshot_script(selector: &str) -> String {
    format!(
        r#"Array.from(document.querySelectorAll({})).map(el => ({{
            text: (el.innerText || el.textContent || '').trim(),
            html: el.innerHTML || '',
            href: el.href || el.getAttribute('href') || null
        }}))"#,
        js_string_literal(selector)
    )
}

/// 读取所有匹配节点的快照
pub async fn snapshot_all(page: &Page, selector: &str) -> Result<Vec<NodeSnapshot>> {
    JsExecutor::new(page).eval_as(snapshot_script(selector)).await
}

/// 短暂等待第一个匹配节点并读取快照，不存在时返回 None
async fn first_snapshot(
    navigator: &Navigator,
    page: &Page,
    selector: &str,
) -> Result<Option<NodeSnapshot>> {
    let brief = navigator.options().brief_timeout;
    match navigator.wait_for_element(page, selector, brief, 1).await {
        Ok(_) => Ok(snapshot_all(page, selector).await?.into_iter().next()),
        Err(ScrapeError::ElementNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// 提取元素文本（已去除首尾空白）
///
/// 元素不存在或文本为空时：`required` 为真则返回 `RequiredTextMissing`，否则返回空字符串
pub async fn extract_text(
    navigator: &Navigator,
    page: &Page,
    selector: &str,
    required: bool,
) -> Result<String> {
    let text = first_snapshot(navigator, page, selector)
        .await?
        .map(|node| node.text.trim().to_string())
        .unwrap_or_default();

    if required && text.is_empty() {
        return Err(ScrapeError::RequiredTextMissing {
            selector: selector.to_string(),
        });
    }
    debug!("`{}` -> {}", selector, truncate_text(&text, 60));
    Ok(text)
}

/// 提取元素内部 HTML，规则同 [`extract_text`]
pub async fn extract_html(
    navigator: &Navigator,
    page: &Page,
    selector: &str,
    required: bool,
) -> Result<String> {
    let html = first_snapshot(navigator, page, selector)
        .await?
        .map(|node| node.html)
        .unwrap_or_default();

    if required && html.trim().is_empty() {
        return Err(ScrapeError::RequiredTextMissing {
            selector: selector.to_string(),
        });
    }
    Ok(html)
}

/// 对每个匹配节点执行映射，丢弃映射结果为 None 的节点
///
/// `min_count > 0` 时先等待至少一个节点出现；结果数量少于 `min_count` 返回 `InsufficientElements`
pub async fn extract_elements<T, F>(
    navigator: &Navigator,
    page: &Page,
    selector: &str,
    mapper: F,
    min_count: usize,
) -> Result<Vec<T>>
where
    F: FnMut(&NodeSnapshot) -> Option<T>,
{
    if min_count > 0 {
        let limit = navigator.options().element_timeout;
        match navigator.wait_for_element(page, selector, limit, 1).await {
            Ok(_) => {}
            Err(ScrapeError::ElementNotFound { .. }) => {
                return Err(ScrapeError::InsufficientElements {
                    selector: selector.to_string(),
                    expected: min_count,
                    found: 0,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let nodes = snapshot_all(page, selector).await?;
    let results = map_nodes(&nodes, mapper);
    debug!("`{}` 匹配 {} 个节点，保留 {} 个", selector, nodes.len(), results.len());
    ensure_min_count(selector, results, min_count)
}

fn map_nodes<T, F>(nodes: &[NodeSnapshot], mapper: F) -> Vec<T>
where
    F: FnMut(&NodeSnapshot) -> Option<T>,
{
    nodes.iter().filter_map(mapper).collect()
}

fn ensure_min_count<T>(selector: &str, results: Vec<T>, min_count: usize) -> Result<Vec<T>> {
    if results.len() < min_count {
        return Err(ScrapeError::InsufficientElements {
            selector: selector.to_string(),
            expected: min_count,
            found: results.len(),
        });
    }
    Ok(results)
}

/// 常用映射：非空文本
pub fn non_empty_text(node: &NodeSnapshot) -> Option<String> {
    let text = node.text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(text: &str, href: Option<&str>) -> NodeSnapshot {
        NodeSnapshot {
            text: text.to_string(),
            html: format!("<span>{}</span>", text),
            href: href.map(str::to_string),
        }
    }

    #[test]
    fn test_mapper_drops_none_results() {
        let nodes = vec![node("Array", None), node("  ", None), node("Hash Table", None)];
        let topics = map_nodes(&nodes, non_empty_text);
        assert_eq!(topics, vec!["Array".to_string(), "Hash Table".to_string()]);
    }

    #[test]
    fn test_min_count_enforced() {
        let err = ensure_min_count("a.tag", vec!["x"], 2).unwrap_err();
        match err {
            ScrapeError::InsufficientElements {
                selector,
                expected,
                found,
            } => {
                assert_eq!(selector, "a.tag");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(ensure_min_count::<String>("a.tag", vec![], 0).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_deserializes_from_script_result() {
        let value = serde_json::json!([
            {"text": "Two Sum", "html": "<b>Two Sum</b>", "href": "https://leetcode.com/problems/two-sum/"},
            {"text": "Easy", "html": "Easy", "href": null}
        ]);
        let nodes: Vec<NodeSnapshot> = serde_json::from_value(value).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].href.as_deref(), Some("https://leetcode.com/problems/two-sum/"));
        assert!(nodes[1].href.is_none());
    }

    #[test]
    fn test_snapshot_script_embeds_escaped_selector() {
        let script = snapshot_script(r#"a[href*="/problems/"]"#);
        assert!(script.contains(r#"querySelectorAll("a[href*=\"/problems/\"]")"#));
    }
}
