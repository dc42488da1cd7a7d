//! 向导流程中的结果类型

use crate::services::SubmissionReceipt;
use std::fmt::Display;

/// 最近一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// 还没有提交过
    #[default]
    NotSubmitted,
    /// 收集端确认成功
    Succeeded(SubmissionReceipt),
    /// 网络或服务端失败，保存可展示的错误信息
    Failed(String),
}

impl SubmissionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded(_))
    }
}

/// `next()` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// 前进到了新的题目索引
    Advanced(usize),
    /// 最后一题已完成，并执行了提交
    Completed(SubmissionStatus),
    /// 当前不在答题阶段，什么也没做
    Ignored,
}

/// 答题进度（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub number: usize,
    pub total: usize,
}

impl Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.number, self.total)
    }
}
