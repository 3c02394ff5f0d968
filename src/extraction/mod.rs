//! 提取工具
//!
//! - `dom`: 从页面读取文本、HTML 和节点快照
//! - `parser`: 与平台无关的纯文本解析（示例、约束、描述）

pub mod dom;
pub mod parser;

pub use dom::NodeSnapshot;
pub use parser::{
    extract_clean_description, extract_clean_labeled_description, html_to_text,
    parse_constraints, parse_examples, parse_labeled_examples,
};
