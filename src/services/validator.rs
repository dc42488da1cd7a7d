//! 答案校验 - 业务能力层
//!
//! `is_answer_present` / `validate_step` 决定能否翻页；
//! `FormatRules` 是展示层使用的格式校验，不参与翻页判断

use crate::error::{WizardError, WizardResult};
use crate::models::{AnswerValue, FileHandle, QuestionDefinition, QuestionKind};
use chrono::NaiveDate;
use regex::Regex;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const REQUIRED_FILE_MESSAGE: &str = "Please upload at least one file";

/// 单步校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidation {
    pub valid: bool,
    pub message: Option<String>,
}

impl StepValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            message: Some(message.to_string()),
        }
    }

    /// 转换为 Result，无效时返回必填项错误
    pub fn into_result(self, question_id: &str) -> WizardResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(WizardError::validation(
                question_id,
                self.message.unwrap_or_else(|| REQUIRED_MESSAGE.to_string()),
            ))
        }
    }
}

/// 判断答案是否"已填写"
pub fn is_answer_present(question: &QuestionDefinition, answer: Option<&AnswerValue>) -> bool {
    match (question.kind, answer) {
        (_, None) => false,
        (QuestionKind::FileUpload, Some(AnswerValue::Files(files))) => !files.is_empty(),
        (QuestionKind::FileUpload, Some(_)) => false,
        (_, Some(AnswerValue::Text(s))) => !s.trim().is_empty(),
        (_, Some(AnswerValue::MultiSelect(set))) => !set.is_empty(),
        (_, Some(AnswerValue::Files(_))) => false,
    }
}

/// 校验当前这一步是否允许前进
///
/// 只检查必填项是否存在；选填题无论内容如何都通过
pub fn validate_step(question: &QuestionDefinition, answer: Option<&AnswerValue>) -> StepValidation {
    if !question.required || is_answer_present(question, answer) {
        return StepValidation::ok();
    }

    if question.kind == QuestionKind::FileUpload {
        StepValidation::invalid(REQUIRED_FILE_MESSAGE)
    } else {
        StepValidation::invalid(REQUIRED_MESSAGE)
    }
}

/// 输入层的文件数量限制
///
/// - 单次选择超过上限：整体拒绝
/// - 多文件题：追加到已有文件后，截断到上限
/// - 单文件题：用第一个文件替换
pub fn check_file_selection(
    question: &QuestionDefinition,
    current: &[FileHandle],
    incoming: Vec<FileHandle>,
) -> WizardResult<Vec<FileHandle>> {
    let max = question.file_limit();

    if incoming.len() > max {
        return Err(WizardError::TooManyFiles {
            question_id: question.id.clone(),
            max,
            got: incoming.len(),
        });
    }

    if incoming.is_empty() {
        return Ok(current.to_vec());
    }

    if question.allow_multiple_files {
        let mut merged = current.to_vec();
        merged.extend(incoming);
        merged.truncate(max);
        Ok(merged)
    } else {
        Ok(incoming.into_iter().take(1).collect())
    }
}

/// 移除第 `index` 个已选文件（从 0 开始），其余文件保持原有顺序
///
/// 单文件题移除后答案为空；越界时不做改动
pub fn remove_file(
    question: &QuestionDefinition,
    current: &[FileHandle],
    index: usize,
) -> Vec<FileHandle> {
    if index >= current.len() {
        return current.to_vec();
    }
    if !question.allow_multiple_files {
        return Vec::new();
    }

    let mut remaining = current.to_vec();
    remaining.remove(index);
    remaining
}

/// 字段格式规则
pub struct FormatRules {
    email: Regex,
    phone: Regex,
}

impl FormatRules {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
            phone: Regex::new(r"^\+?[0-9]{10,15}$")?,
        })
    }

    /// 检查答案格式，返回可直接展示的错误信息
    ///
    /// 未填写的答案交给 `validate_step` 处理，这里直接通过
    pub fn check(&self, question: &QuestionDefinition, answer: Option<&AnswerValue>) -> Result<(), String> {
        if !is_answer_present(question, answer) {
            return Ok(());
        }
        let Some(answer) = answer else {
            return Ok(());
        };

        match (question.kind, answer) {
            (QuestionKind::ShortText, AnswerValue::Text(s)) => {
                if s.trim().chars().count() < 2 {
                    return Err("Must be at least 2 characters".to_string());
                }
            }
            (QuestionKind::Email, AnswerValue::Text(s)) => {
                if !self.email.is_match(s.trim()) {
                    return Err("Please enter a valid email address".to_string());
                }
            }
            (QuestionKind::Phone, AnswerValue::Text(s)) => {
                let compact: String = s
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '-')
                    .collect();
                if !self.phone.is_match(&compact) {
                    return Err("Please enter a valid mobile number".to_string());
                }
            }
            (QuestionKind::Date, AnswerValue::Text(s)) => {
                if NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_err() {
                    return Err("Please enter a date as YYYY-MM-DD".to_string());
                }
            }
            (QuestionKind::SingleSelect, AnswerValue::Text(s)) => {
                if !question.options.iter().any(|o| o == s) {
                    return Err(format!("'{}' is not one of the options", s));
                }
            }
            (QuestionKind::MultiSelect, AnswerValue::MultiSelect(set)) => {
                if let Some(bad) = set.iter().find(|v| !question.options.contains(v)) {
                    return Err(format!("'{}' is not one of the options", bad));
                }
            }
            (QuestionKind::FileUpload, AnswerValue::Files(files)) => {
                if files.len() > question.file_limit() {
                    return Err(format!(
                        "You can only select up to {} files.",
                        question.file_limit()
                    ));
                }
            }
            (QuestionKind::LongText, AnswerValue::Text(_)) => {}
            _ => return Err("Unexpected answer type".to_string()),
        }

        Ok(())
    }
}
