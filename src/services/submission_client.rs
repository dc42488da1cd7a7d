//! 提交客户端 - 业务能力层
//!
//! 把答案组装成收集端需要的 JSON，并解释收集端的响应

use crate::error::{WizardError, WizardResult};
use crate::models::{AnswerValue, QuestionKind, QuestionRegistry};
use crate::services::file_encoder::{encode_files, EncodedFile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use tracing::{debug, info, warn};

/// 答案 id → 提交字段名
const PAYLOAD_FIELDS: [(&str, &str); 8] = [
    ("name", "name"),
    ("email", "email"),
    ("mobile", "mobile"),
    ("classDate", "classDate"),
    ("classAttended", "classAttended"),
    ("mentor", "mentor"),
    ("classFeedback", "classFeedback"),
    ("offlineClassAvailability", "offlineAvailability"),
];

/// 提交给收集端的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub class_date: String,
    pub class_attended: String,
    pub mentor: String,
    pub class_feedback: String,
    pub offline_availability: String,
    /// 不在固定字段里的其它文本答案
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    pub files: Vec<EncodedFile>,
}

/// 收集端响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_urls: Vec<String>,
    #[serde(default)]
    pub file_count: Option<usize>,
}

impl CollectorResponse {
    pub fn success(file_urls: Vec<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some("Added successfully".to_string()),
            file_count: Some(file_urls.len()),
            file_urls,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            file_urls: Vec::new(),
            file_count: None,
        }
    }
}

/// 提交成功后的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub message: Option<String>,
    pub file_urls: Vec<String>,
    pub file_count: usize,
}

/// 收集端传输能力
///
/// 只发一次请求，不重试
pub trait Collector {
    fn post(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = WizardResult<CollectorResponse>>;
}

/// 基于 HTTP POST 的收集端
pub struct HttpCollector {
    client: reqwest::Client,
    url: String,
}

impl HttpCollector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Collector for HttpCollector {
    async fn post(&self, payload: &SubmissionPayload) -> WizardResult<CollectorResponse> {
        debug!("POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let body: CollectorResponse = response.json().await?;
        Ok(body)
    }
}

/// 组装请求体
///
/// 文件按题目顺序、选择顺序编码；缺失的文本字段发送空字符串
pub async fn build_payload(
    registry: &QuestionRegistry,
    answers: &HashMap<String, AnswerValue>,
) -> SubmissionPayload {
    let text_of = |id: &str| -> String {
        answers
            .get(id)
            .and_then(AnswerValue::to_wire_string)
            .unwrap_or_default()
    };

    let mut fixed: HashMap<&str, String> = PAYLOAD_FIELDS
        .iter()
        .map(|(answer_id, field)| (*field, text_of(*answer_id)))
        .collect();
    let mut take = |field: &str| fixed.remove(field).unwrap_or_default();

    let extra = registry
        .iter()
        .filter(|q| q.kind != QuestionKind::FileUpload)
        .filter(|q| !PAYLOAD_FIELDS.iter().any(|(answer_id, _)| *answer_id == q.id))
        .filter_map(|q| {
            answers
                .get(&q.id)
                .and_then(AnswerValue::to_wire_string)
                .map(|v| (q.id.clone(), v))
        })
        .collect();

    let mut files = Vec::new();
    for question in registry.iter().filter(|q| q.kind == QuestionKind::FileUpload) {
        if let Some(handles) = answers.get(&question.id).and_then(AnswerValue::as_files) {
            files.extend(encode_files(handles).await);
        }
    }

    SubmissionPayload {
        name: take("name"),
        email: take("email"),
        mobile: take("mobile"),
        class_date: take("classDate"),
        class_attended: take("classAttended"),
        mentor: take("mentor"),
        class_feedback: take("classFeedback"),
        offline_availability: take("offlineAvailability"),
        extra,
        files,
    }
}

/// 解释收集端响应
///
/// 不核对文件数量，原样返回服务端给出的结果
pub fn interpret_response(response: CollectorResponse) -> WizardResult<SubmissionReceipt> {
    if response.status != "success" {
        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Submission failed".to_string());
        return Err(WizardError::server(message));
    }

    let file_count = response.file_count.unwrap_or(response.file_urls.len());
    Ok(SubmissionReceipt {
        success: true,
        message: response.message,
        file_urls: response.file_urls,
        file_count,
    })
}

/// 提交客户端
pub struct SubmissionClient<C: Collector> {
    collector: C,
}

impl<C: Collector> SubmissionClient<C> {
    pub fn new(collector: C) -> Self {
        Self { collector }
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// 提交全部答案
    pub async fn submit(
        &self,
        registry: &QuestionRegistry,
        answers: &HashMap<String, AnswerValue>,
    ) -> WizardResult<SubmissionReceipt> {
        let payload = build_payload(registry, answers).await;
        info!("📤 正在提交问卷 (附带 {} 个文件)...", payload.files.len());

        let response = self.collector.post(&payload).await.map_err(|e| {
            warn!("提交请求失败: {}", e);
            e
        })?;

        let receipt = interpret_response(response)?;
        info!("✓ 提交成功，收集端保存了 {} 个文件", receipt.file_count);
        debug!("文件地址: {:?}", receipt.file_urls);
        Ok(receipt)
    }
}
