//! # Daily Problem Scraper
//!
//! 驱动无头浏览器抓取各题目平台的每日一题，并转换为统一的题目记录
//!
//! ## 架构设计
//!
//! ### ① 浏览器层（Browser）
//! - `browser/executable` - 按部署环境解析浏览器可执行文件
//! - `browser/session` - 单浏览器单页面的生命周期管理
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/retry` - 指数退避 + 抖动的重试
//! - `infrastructure/navigator` - 带超时的导航、元素等待
//! - `infrastructure/driver` - `PageDriver`，组合会话、导航和提取能力
//!
//! ### ③ 提取层（Extraction）
//! - `extraction/dom` - 从页面读取文本和节点快照
//! - `extraction/parser` - 示例、约束、描述的纯文本解析
//!
//! ### ④ 平台层（Providers）
//! - `providers/leetcode`、`providers/geeksforgeeks` - 各平台的登录和抓取流程
//! - `providers/factory` - 平台标识 → 适配器
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod extraction;
pub mod infrastructure;
pub mod models;
pub mod providers;
pub mod utils;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use config::Config;
pub use error::{Result, ScrapeError};
pub use infrastructure::PageDriver;
pub use models::{Credentials, Difficulty, Problem, ProblemConstraint, ProblemExample, ProviderKind};
pub use providers::{ProblemProvider, ProviderAdapter, ProviderFactory};
