use crate::error::{WizardError, WizardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 默认最多上传文件数
pub const DEFAULT_MAX_FILES: usize = 5;

/// 提交请求体里已占用、又不是答案 id 的字段名，题目不能使用
pub const RESERVED_QUESTION_IDS: [&str; 2] = ["offlineAvailability", "files"];

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// 单行文本
    #[serde(rename = "text")]
    ShortText,
    /// 邮箱
    #[serde(rename = "email")]
    Email,
    /// 手机号
    #[serde(rename = "tel")]
    Phone,
    /// 多行文本
    #[serde(rename = "textarea")]
    LongText,
    /// 单选
    #[serde(rename = "select")]
    SingleSelect,
    /// 日期 (YYYY-MM-DD)
    #[serde(rename = "date")]
    Date,
    /// 文件上传
    #[serde(rename = "file")]
    FileUpload,
    /// 多选
    #[serde(rename = "checkbox")]
    MultiSelect,
}

impl QuestionKind {
    /// 是否为文本类题目（答案为字符串）
    pub fn is_text(self) -> bool {
        matches!(
            self,
            QuestionKind::ShortText
                | QuestionKind::Email
                | QuestionKind::Phone
                | QuestionKind::LongText
                | QuestionKind::Date
        )
    }

    /// 是否需要选项列表
    pub fn has_options(self) -> bool {
        matches!(self, QuestionKind::SingleSelect | QuestionKind::MultiSelect)
    }
}

/// 题目定义
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// 仅文件题：是否允许多选文件
    #[serde(default, alias = "multiple")]
    pub allow_multiple_files: bool,
    /// 仅文件题：文件数量上限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl QuestionDefinition {
    pub fn new(id: &str, kind: QuestionKind, title: &str, required: bool) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            subtitle: None,
            placeholder: None,
            required,
            options: Vec::new(),
            allow_multiple_files: false,
            max_files: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_files(mut self, multiple: bool, max_files: usize) -> Self {
        self.allow_multiple_files = multiple;
        self.max_files = Some(max_files);
        self
    }

    /// 文件数量上限（未设置时为 5）
    pub fn file_limit(&self) -> usize {
        self.max_files.unwrap_or(DEFAULT_MAX_FILES)
    }
}

/// 有序题目列表
///
/// 顺序即翻页顺序，id 全局唯一
#[derive(Debug, Clone)]
pub struct QuestionRegistry {
    questions: Vec<QuestionDefinition>,
}

impl QuestionRegistry {
    /// 创建并校验题目列表
    pub fn new(questions: Vec<QuestionDefinition>) -> WizardResult<Self> {
        if questions.is_empty() {
            return Err(WizardError::Registry("题目列表不能为空".to_string()));
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(WizardError::Registry(format!("题目 id 重复: {}", q.id)));
            }
            if RESERVED_QUESTION_IDS.contains(&q.id.as_str()) {
                return Err(WizardError::Registry(format!("题目 id 与提交字段冲突: {}", q.id)));
            }
            if q.kind.has_options() && q.options.is_empty() {
                return Err(WizardError::Registry(format!("选择题缺少选项: {}", q.id)));
            }
            if q.kind == QuestionKind::FileUpload && q.max_files == Some(0) {
                return Err(WizardError::Registry(format!(
                    "文件题的 maxFiles 必须大于 0: {}",
                    q.id
                )));
            }
        }

        Ok(Self { questions })
    }

    /// 内置的课堂反馈问卷
    pub fn builtin() -> Self {
        let mut class_options: Vec<String> = (1..=10).map(|i| format!("B{}", i)).collect();
        class_options.extend((1..=10).map(|i| format!("INT {}", i)));

        let questions = vec![
            QuestionDefinition::new("name", QuestionKind::ShortText, "1. Name", true)
                .with_placeholder("Enter your full name"),
            QuestionDefinition::new("email", QuestionKind::Email, "2. Email Address", true)
                .with_placeholder("Enter your email address"),
            QuestionDefinition::new("mobile", QuestionKind::Phone, "3. Mobile No", true)
                .with_placeholder("Enter your mobile number"),
            QuestionDefinition::new("classDate", QuestionKind::Date, "4. Class Attended Date", true),
            QuestionDefinition::new(
                "classAttended",
                QuestionKind::SingleSelect,
                "5. Class Attended",
                true,
            )
            .with_options(class_options),
            QuestionDefinition::new("mentor", QuestionKind::SingleSelect, "6. Mentor", true)
                .with_options(["Edwin", "Ashwin", "Rafath", "Sriram", "Nihal", "Mathson"]),
            QuestionDefinition::new(
                "classFeedback",
                QuestionKind::SingleSelect,
                "7. How was the class?",
                true,
            )
            .with_options(["Excellent", "Average", "Poor"]),
            QuestionDefinition::new(
                "assignmentUpload",
                QuestionKind::FileUpload,
                "8. Upload Your Assignment",
                true,
            )
            .with_subtitle("You can upload multiple files (PDF, images, or documents)")
            .with_files(true, DEFAULT_MAX_FILES),
            QuestionDefinition::new(
                "offlineClassAvailability",
                QuestionKind::MultiSelect,
                "9. If we are planning extra offline classes, when will you be free?",
                false,
            )
            .with_options(["Sunday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]),
        ];

        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 按索引获取题目
    pub fn get(&self, index: usize) -> Option<&QuestionDefinition> {
        self.questions.get(index)
    }

    /// 按 id 查找题目
    pub fn find(&self, id: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionDefinition> {
        self.questions.iter()
    }
}
