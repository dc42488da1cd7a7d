//! 答案存储 - 业务能力层
//!
//! 持有当前答案，并把 {页面, 题号, 答案} 快照写入本地存储

use crate::error::WizardResult;
use crate::infrastructure::Storage;
use crate::models::{AnswerValue, QuestionRegistry, WizardPhase};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

pub const KEY_CURRENT_STEP: &str = "currentStep";
pub const KEY_CURRENT_INDEX: &str = "currentQuestionIndex";
pub const KEY_ANSWERS: &str = "answers";

/// 从快照恢复出的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredPosition {
    pub phase: WizardPhase,
    pub index: usize,
}

/// 答案存储
///
/// 职责：
/// - 按题目 id 保存答案
/// - 每次修改后写入快照（文件答案不写入）
/// - 快照损坏时回到空状态，不向调用方抛错
pub struct AnswerStore<S: Storage> {
    storage: S,
    answers: HashMap<String, AnswerValue>,
    phase: WizardPhase,
    index: usize,
}

impl<S: Storage> AnswerStore<S> {
    /// 从本地存储加载
    pub fn load(storage: S, registry: &QuestionRegistry) -> (Self, RestoredPosition) {
        let mut phase = storage
            .get(KEY_CURRENT_STEP)
            .and_then(|raw| WizardPhase::from_storage_str(&raw))
            .unwrap_or_default();

        let mut index = storage
            .get(KEY_CURRENT_INDEX)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|i| *i < registry.len())
            .unwrap_or(0);

        let answers = match storage.get(KEY_ANSWERS) {
            Some(raw) => match parse_answers(&raw, registry) {
                Ok(answers) => answers,
                Err(e) => {
                    warn!("⚠️ 已丢弃损坏的快照: {}", e);
                    phase = WizardPhase::Welcome;
                    index = 0;
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        debug!(
            "快照已加载: 页面={} 题号={} 答案数={}",
            phase,
            index,
            answers.len()
        );

        let store = Self {
            storage,
            answers,
            phase,
            index,
        };
        (store, RestoredPosition { phase, index })
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// 替换答案并写入快照
    pub fn set(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.answers.insert(question_id.into(), value);
        self.write_snapshot();
    }

    /// 记录新的位置并写入快照
    pub fn persist(&mut self, phase: WizardPhase, index: usize) {
        self.phase = phase;
        self.index = index;
        self.write_snapshot();
    }

    /// 清空所有答案，并删除本地快照
    pub fn clear_all(&mut self) {
        self.answers.clear();
        self.storage.remove(KEY_CURRENT_STEP);
        self.storage.remove(KEY_CURRENT_INDEX);
        self.storage.remove(KEY_ANSWERS);
        debug!("答案与快照已清空");
    }

    pub fn answers(&self) -> &HashMap<String, AnswerValue> {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn write_snapshot(&mut self) {
        // 文件内容只保留在内存中
        let persisted: BTreeMap<&str, String> = self
            .answers
            .iter()
            .filter_map(|(id, value)| value.to_wire_string().map(|s| (id.as_str(), s)))
            .collect();

        let answers_json = match serde_json::to_string(&persisted) {
            Ok(json) => json,
            Err(e) => {
                warn!("⚠️ 快照序列化失败: {}", e);
                return;
            }
        };

        self.storage
            .set(KEY_CURRENT_STEP, self.phase.as_storage_str().to_string());
        self.storage.set(KEY_CURRENT_INDEX, self.index.to_string());
        self.storage.set(KEY_ANSWERS, answers_json);
    }
}

/// 按题目类型解析快照中的答案
///
/// 未知 id、文件题、非字符串值一律丢弃
fn parse_answers(
    raw: &str,
    registry: &QuestionRegistry,
) -> WizardResult<HashMap<String, AnswerValue>> {
    let map: Map<String, JsonValue> = serde_json::from_str(raw)?;

    let answers = map
        .into_iter()
        .filter_map(|(id, value)| {
            let question = registry.find(&id)?;
            let text = value.as_str()?;
            AnswerValue::from_wire_string(question.kind, text).map(|answer| (id, answer))
        })
        .collect();

    Ok(answers)
}
