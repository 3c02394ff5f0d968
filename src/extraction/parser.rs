//! 文本解析 - 与平台无关
//!
//! 把题面的纯文本（或保留了 `<img>` 标签的文本）切分成示例、约束与描述三部分

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::{ProblemConstraint, ProblemExample};

static EXAMPLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bexample\s*(\d+)\s*:").expect("valid example header regex"));
static INPUT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\binput\s*:").expect("valid input regex"));
static OUTPUT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\boutput\s*:").expect("valid output regex"));
static EXPLANATION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bexplanation\s*:").expect("valid explanation regex"));
static CONSTRAINTS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bconstraints\s*:").expect("valid constraints regex"));
/// 示例区域的终点：约束章节或复杂度说明
static EXAMPLES_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bconstraints\s*:|\bexpected\s+(time|auxiliary)\b")
        .expect("valid section end regex")
});
/// 约束章节之后可能出现的其他章节
static CONSTRAINTS_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(follow[- ]?up\b|expected\s+(time|auxiliary)\b|note\s*:)")
        .expect("valid constraints end regex")
});
/// 标签/值格式的示例章节标题，如 "Examples:" 或 "Example 1:"
static EXAMPLES_SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*examples?\s*(\d+\s*)?:").expect("valid examples section regex")
});
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid img regex"));
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid img src regex")
});
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<!--.*?-->")
        .expect("valid script regex")
});
static LINE_BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|pre|h[1-6]|tr|ul|ol)\s*>")
        .expect("valid line break regex")
});
static SUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<sup\b[^>]*>").expect("valid sup regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?([a-z][a-z0-9]*)\b[^>]*>").expect("valid tag regex")
});
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?[0-9a-fA-F]+);").expect("valid entity regex"));
static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid space regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank lines regex"));

/// 一个 "Example N:" 块在原文中的位置
struct ExampleBlock {
    index: Option<u32>,
    /// 含标题的整个块
    span: Range<usize>,
    /// 标题之后的内容
    body: Range<usize>,
}

/// 示例区域的终点（约束章节开始处或文本末尾）
fn examples_region_end(text: &str) -> usize {
    EXAMPLES_END.find(text).map(|m| m.start()).unwrap_or(text.len())
}

/// 扫描所有 "Example N:" 块
///
/// 每次匹配都必须向前推进，否则立即终止，避免死循环
fn scan_example_blocks(text: &str) -> Vec<ExampleBlock> {
    let region_end = examples_region_end(text);
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < region_end {
        let Some(caps) = EXAMPLE_HEADER.captures_at(text, pos) else {
            break;
        };
        let Some(header) = caps.get(0) else {
            break;
        };
        if header.start() >= region_end {
            break;
        }
        if header.end() <= pos {
            warn!("示例匹配未能前进 (位置 {})，停止解析", pos);
            break;
        }

        let body_end = EXAMPLE_HEADER
            .find_at(text, header.end())
            .map(|m| m.start())
            .filter(|&start| start < region_end)
            .unwrap_or(region_end);

        blocks.push(ExampleBlock {
            index: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            span: header.start()..body_end,
            body: header.end()..body_end,
        });

        pos = body_end;
    }

    blocks
}

/// 去掉字段中的图片标签并修剪空白
fn clean_field(raw: &str) -> String {
    let without_images = IMG_TAG.replace_all(raw, "");
    collapse_whitespace(&without_images)
}

/// 块内出现的第一张图片
fn first_image(block: &str) -> Option<String> {
    IMG_SRC
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 在一段文本中按 Input / Output / Explanation 标签切分字段
///
/// 无效示例（缺少输入或输出）返回 None
fn parse_fields(block: &str, index: u32) -> Option<ProblemExample> {
    let input_label = INPUT_LABEL.find(block)?;
    let output_label = OUTPUT_LABEL.find_at(block, input_label.end())?;
    let explanation_label = EXPLANATION_LABEL.find_at(block, output_label.end());

    let input = clean_field(&block[input_label.end()..output_label.start()]);
    let output_end = explanation_label.map(|m| m.start()).unwrap_or(block.len());
    let output = clean_field(&block[output_label.end()..output_end]);
    let explanation = explanation_label
        .map(|m| clean_field(&block[m.end()..]))
        .filter(|e| !e.is_empty());

    let example = ProblemExample {
        index,
        input,
        output,
        explanation,
        image: first_image(block),
    };

    if example.is_valid() {
        Some(example)
    } else {
        debug!("丢弃不完整的示例 #{}", index);
        None
    }
}

/// 解析 "Example N: / Input: / Output: / Explanation:" 格式的示例
///
/// 序号非正、输入或输出为空的块会被整体丢弃
pub fn parse_examples(text: &str) -> Vec<ProblemExample> {
    scan_example_blocks(text)
        .into_iter()
        .filter_map(|block| {
            let index = block.index.filter(|&i| i >= 1)?;
            parse_fields(&text[block.body.clone()], index)
        })
        .collect()
}

/// 解析没有 "Example N:" 编号、只有 "Input:/Output:" 标签对的示例
///
/// 每个 "Input:" 开启一个新示例，序号按有效示例依次递增
pub fn parse_labeled_examples(text: &str) -> Vec<ProblemExample> {
    let region_end = examples_region_end(text);
    let starts: Vec<usize> = INPUT_LABEL
        .find_iter(&text[..region_end])
        .map(|m| m.start())
        .collect();

    let mut examples = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(region_end);
        let mut segment = &text[start..end];
        // 下一个示例的编号标题不属于当前示例
        if let Some(next_header) = EXAMPLE_HEADER.find(segment) {
            segment = &segment[..next_header.start()];
        }
        let next_index = examples.len() as u32 + 1;
        if let Some(example) = parse_fields(segment, next_index) {
            examples.push(example);
        }
    }

    examples
}

/// 解析 "Constraints:" 章节，每个非空、长度合理的行对应一条约束
pub fn parse_constraints(text: &str) -> Vec<ProblemConstraint> {
    let Some(header) = CONSTRAINTS_HEADER.find(text) else {
        return Vec::new();
    };

    let body = &text[header.end()..];
    let body = match CONSTRAINTS_END.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    };

    body.lines()
        .map(|line| {
            let line = IMG_TAG.replace_all(line, "");
            let line = line.trim();
            let line = line
                .strip_prefix('•')
                .or_else(|| line.strip_prefix("- "))
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line);
            collapse_whitespace(line)
        })
        .filter_map(|line| {
            let constraint = ProblemConstraint::new(&line);
            if constraint.is_none() && !line.is_empty() {
                debug!("丢弃超长的约束行 ({} 字符)", line.chars().count());
            }
            constraint
        })
        .collect()
}

/// 去掉示例块和约束章节，只保留题目描述
pub fn extract_clean_description(text: &str) -> String {
    let mut description = String::with_capacity(text.len());
    let mut cursor = 0;
    for block in scan_example_blocks(text) {
        description.push_str(&text[cursor..block.span.start]);
        cursor = block.span.end;
    }
    description.push_str(&text[cursor..]);

    if let Some(header) = CONSTRAINTS_HEADER.find(&description) {
        description.truncate(header.start());
    }

    collapse_whitespace(&description)
}

/// 去掉标签/值格式的示例（以及约束章节），只保留题目描述
///
/// 从第一个 "Input:" 之前最近的示例标题（没有标题时从 "Input:" 本身）一直删到示例区域结束
pub fn extract_clean_labeled_description(text: &str) -> String {
    let region_end = examples_region_end(text);
    let Some(first_input) = INPUT_LABEL.find(&text[..region_end]) else {
        return extract_clean_description(text);
    };

    let cut_start = EXAMPLES_SECTION_HEADER
        .find_iter(&text[..first_input.start()])
        .last()
        .map(|m| m.start())
        .unwrap_or(first_input.start());

    let mut remaining = String::with_capacity(text.len());
    remaining.push_str(&text[..cut_start]);
    remaining.push('\n');
    remaining.push_str(&text[region_end..]);
    extract_clean_description(&remaining)
}

/// 合并行内多余空白、压缩连续空行
pub fn collapse_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .replace("\r\n", "\n")
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// 将 HTML 转为纯文本
///
/// - 块级结束标签与 `<br>` 转为换行
/// - `<sup>` 转为 `^`（如 `10<sup>4</sup>` → `10^4`）
/// - 保留 `<img>` 标签，供示例解析提取图片
/// - 解码常见 HTML 实体
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = LINE_BREAK_TAG.replace_all(&text, "\n");
    let text = SUP_TAG.replace_all(&text, "^");
    let text = ANY_TAG.replace_all(&text, |caps: &regex::Captures| {
        if caps[1].eq_ignore_ascii_case("img") {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    collapse_whitespace(&decode_entities(&text))
}

/// 解码 HTML 实体
fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&le;", "≤")
        .replace("&ge;", "≥");

    let numeric = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // &amp; 最后处理，避免 "&amp;lt;" 被二次解码
    numeric.replace("&amp;", "&")
}
