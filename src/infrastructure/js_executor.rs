//! JS 执行器 - 基础设施层
//!
//! 借用当前页面，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// JS 执行器
///
/// 不认识任何题目平台，只负责把脚本结果反序列化为 Rust 类型
pub struct JsExecutor<'a> {
    page: &'a Page,
}

impl<'a> JsExecutor<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}

/// 把字符串编码为 JS 字面量（带引号和转义）
pub fn js_string_literal(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}
