use phf::phf_map;

/// 难度枚举（各平台难度标签的并集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Difficulty {
    /// GeeksforGeeks 入门
    School,
    /// GeeksforGeeks 基础
    Basic,
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
}

/// 小写别名 → 难度
static DIFFICULTY_ALIASES: phf::Map<&'static str, Difficulty> = phf_map! {
    "school" => Difficulty::School,
    "basic" => Difficulty::Basic,
    "easy" => Difficulty::Easy,
    "e" => Difficulty::Easy,
    "medium" => Difficulty::Medium,
    "med." => Difficulty::Medium,
    "med" => Difficulty::Medium,
    "m" => Difficulty::Medium,
    "hard" => Difficulty::Hard,
    "h" => Difficulty::Hard,
};

impl Difficulty {
    /// 获取标准名称
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::School => "School",
            Difficulty::Basic => "Basic",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// 精确匹配（忽略大小写和首尾空白）
    pub fn from_str(s: &str) -> Option<Self> {
        DIFFICULTY_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
    }

    /// 模糊查找，支持 "Difficulty: Medium" 之类的带前缀文本
    pub fn find(s: &str) -> Option<Self> {
        if let Some(difficulty) = Self::from_str(s) {
            return Some(difficulty);
        }

        s.split(|c: char| !c.is_alphanumeric() && c != '.')
            .filter(|token| token.len() > 1)
            .find_map(Self::from_str)
    }

    /// 将页面上的难度文本规范化为标准标签，无法识别时保留原文
    pub fn normalize_label(raw: &str) -> String {
        match Self::find(raw) {
            Some(difficulty) => difficulty.label().to_string(),
            None => raw.trim().to_string(),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str(" Medium "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("Med."), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("unknown"), None);
    }

    #[test]
    fn test_find_with_prefix() {
        assert_eq!(Difficulty::find("Difficulty: Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::find("Basic Accuracy: 45%"), Some(Difficulty::Basic));
        assert_eq!(Difficulty::find("Accuracy: 45%"), None);
    }

    #[test]
    fn test_normalize_label_keeps_unknown_text() {
        assert_eq!(Difficulty::normalize_label("school"), "School");
        assert_eq!(Difficulty::normalize_label("  Expert  "), "Expert");
    }
}
