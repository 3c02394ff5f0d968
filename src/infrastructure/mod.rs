//! 基础设施层
//!
//! 持有页面资源，只暴露导航、等待、重试和脚本执行的能力

pub mod driver;
pub mod js_executor;
pub mod navigator;
pub mod retry;

pub use driver::PageDriver;
pub use js_executor::JsExecutor;
pub use navigator::{accept_after_timeout, resolve_url, NavigationOptions, Navigator, WaitUntil};
pub use retry::retry_operation;
