/// 题目平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// leetcode.com
    LeetCode,
    /// geeksforgeeks.org
    GeeksForGeeks,
}

impl ProviderKind {
    /// 全部已注册平台
    pub const ALL: [ProviderKind; 2] = [ProviderKind::LeetCode, ProviderKind::GeeksForGeeks];

    /// 平台标识符
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::LeetCode => "leetcode",
            ProviderKind::GeeksForGeeks => "geeksforgeeks",
        }
    }

    /// 展示名称
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::LeetCode => "LeetCode",
            ProviderKind::GeeksForGeeks => "GeeksforGeeks",
        }
    }

    /// 从标识符解析（忽略大小写，支持 `gfg` 别名）
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "leetcode" => Some(ProviderKind::LeetCode),
            "geeksforgeeks" | "gfg" => Some(ProviderKind::GeeksForGeeks),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
