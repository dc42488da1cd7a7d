use std::fmt::Display;

/// 向导当前所处的顶层页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardPhase {
    /// 欢迎页
    #[default]
    Welcome,
    /// 答题中
    Answering,
    /// 完成页（无论提交是否成功）
    Complete,
}

impl WizardPhase {
    /// 持久化使用的字符串
    pub fn as_storage_str(self) -> &'static str {
        match self {
            WizardPhase::Welcome => "welcome",
            WizardPhase::Answering => "questions",
            WizardPhase::Complete => "complete",
        }
    }

    /// 从持久化字符串解析
    pub fn from_storage_str(raw: &str) -> Option<Self> {
        match raw {
            "welcome" => Some(WizardPhase::Welcome),
            "questions" => Some(WizardPhase::Answering),
            "complete" => Some(WizardPhase::Complete),
            _ => None,
        }
    }
}

impl Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_storage_str())
    }
}

/// 翻页方向，只用于选择切换动画
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_storage_strings() {
        for phase in [
            WizardPhase::Welcome,
            WizardPhase::Answering,
            WizardPhase::Complete,
        ] {
            assert_eq!(
                WizardPhase::from_storage_str(phase.as_storage_str()),
                Some(phase)
            );
        }
        assert_eq!(WizardPhase::from_storage_str("answering"), None);
    }
}
