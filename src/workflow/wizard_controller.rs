//! 问卷向导控制器 - 流程层
//!
//! 核心职责：定义"整份问卷"的状态流转
//!
//! ```text
//! welcome → answering(0) → … → answering(N-1) → complete
//!              ↑ previous ↓ next                   │ restart
//! welcome ←────────────────────────────────────────┘
//! ```

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{WizardError, WizardResult};
use crate::infrastructure::Storage;
use crate::models::{AnswerValue, Direction, QuestionDefinition, QuestionKind, QuestionRegistry, WizardPhase};
use crate::services::{is_answer_present, validate_step, AnswerStore, Collector, SubmissionClient};
use crate::workflow::auto_advance::AutoAdvance;
use crate::workflow::wizard_state::{Progress, StepOutcome, SubmissionStatus};

/// 问卷向导控制器
///
/// - 持有答案存储、提交客户端和自动翻页定时器
/// - 每次页面或题号变化后写入快照
/// - 提交失败不回退到答题阶段
pub struct WizardController<S: Storage, C: Collector> {
    registry: QuestionRegistry,
    store: AnswerStore<S>,
    client: SubmissionClient<C>,
    phase: WizardPhase,
    current_index: usize,
    direction: Direction,
    auto_advance: AutoAdvance,
    submission: SubmissionStatus,
}

impl<S: Storage, C: Collector> WizardController<S, C> {
    /// 创建控制器，并从本地快照恢复位置和答案
    pub fn new(
        registry: QuestionRegistry,
        storage: S,
        client: SubmissionClient<C>,
        auto_advance_delay: Duration,
    ) -> Self {
        let (store, restored) = AnswerStore::load(storage, &registry);

        info!(
            "📋 问卷已就绪: 共 {} 题, 恢复到 {} (第 {} 题), 已有 {} 个答案",
            registry.len(),
            restored.phase,
            restored.index + 1,
            store.len()
        );

        Self {
            registry,
            store,
            client,
            phase: restored.phase,
            current_index: restored.index,
            direction: Direction::Forward,
            auto_advance: AutoAdvance::new(auto_advance_delay),
            submission: SubmissionStatus::NotSubmitted,
        }
    }

    // ========== 状态查询 ==========

    pub fn registry(&self) -> &QuestionRegistry {
        &self.registry
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        self.registry.get(self.current_index)
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.store.get(question_id)
    }

    pub fn answers(&self) -> &AnswerStore<S> {
        &self.store
    }

    pub fn submission_status(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub fn submission_client(&self) -> &SubmissionClient<C> {
        &self.client
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.registry.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            number: self.current_index + 1,
            total: self.registry.len(),
        }
    }

    /// 当前题目是否可以前进
    pub fn can_go_next(&self) -> bool {
        self.current_question()
            .map(|q| validate_step(q, self.store.get(&q.id)).valid)
            .unwrap_or(false)
    }

    pub fn is_auto_advance_pending(&self) -> bool {
        self.auto_advance.is_pending()
    }

    // ========== 状态流转 ==========

    /// 从欢迎页进入第一题
    pub fn start(&mut self) -> bool {
        if self.phase != WizardPhase::Welcome {
            debug!("当前页面为 {}，忽略开始操作", self.phase);
            return false;
        }

        self.phase = WizardPhase::Answering;
        self.current_index = 0;
        self.direction = Direction::Forward;
        self.persist();
        info!("🚀 开始答题 [{}]", self.progress());
        true
    }

    /// 记录答案
    ///
    /// 不改变页面和题号；当前为单选题且已作答时安排自动翻页
    pub fn on_answer_change(&mut self, question_id: &str, value: AnswerValue) -> WizardResult<()> {
        if self.registry.find(question_id).is_none() {
            return Err(WizardError::Registry(format!("未知题目: {}", question_id)));
        }

        self.auto_advance.cancel();
        self.store.set(question_id, value);
        debug!("答案已更新: {}", question_id);

        if self.phase != WizardPhase::Answering {
            return Ok(());
        }

        if let Some(question) = self.registry.get(self.current_index) {
            if question.kind == QuestionKind::SingleSelect
                && is_answer_present(question, self.store.get(&question.id))
            {
                self.auto_advance.schedule(self.current_index);
            }
        }

        Ok(())
    }

    /// 前进一题；最后一题时进入完成页并提交
    ///
    /// 必填项未作答时返回 `WizardError::Validation`，状态不变
    pub async fn next(&mut self) -> WizardResult<StepOutcome> {
        if self.phase != WizardPhase::Answering {
            return Ok(StepOutcome::Ignored);
        }
        self.auto_advance.cancel();

        let Some(question) = self.registry.get(self.current_index) else {
            return Ok(StepOutcome::Ignored);
        };

        if let Err(e) = validate_step(question, self.store.get(&question.id)).into_result(&question.id) {
            debug!("[{}] 校验未通过: {}", self.progress(), e);
            return Err(e);
        }

        if !self.is_last() {
            self.direction = Direction::Forward;
            self.current_index += 1;
            self.persist();
            info!("➡️  下一题 [{}]", self.progress());
            return Ok(StepOutcome::Advanced(self.current_index));
        }

        self.phase = WizardPhase::Complete;
        self.persist();
        info!("🏁 已完成全部题目，开始提交");

        let status = self.submit().await;
        Ok(StepOutcome::Completed(status))
    }

    /// 后退一题；第一题时不做任何事
    pub fn previous(&mut self) -> bool {
        if self.phase != WizardPhase::Answering || self.current_index == 0 {
            return false;
        }

        self.auto_advance.cancel();
        self.direction = Direction::Backward;
        self.current_index -= 1;
        self.persist();
        info!("⬅️  上一题 [{}]", self.progress());
        true
    }

    /// 提交全部答案
    ///
    /// 成功时清空答案和快照；失败时保留答案，页面仍停留在完成页
    pub async fn submit(&mut self) -> SubmissionStatus {
        // 结果已记录在 self.submission 中
        let _ = self.try_submit().await;
        self.submission.clone()
    }

    /// 重新开始
    ///
    /// 上一次提交未成功时先重新提交；提交失败则保持在完成页并返回错误
    pub async fn restart(&mut self) -> WizardResult<()> {
        if self.phase != WizardPhase::Complete {
            debug!("当前页面为 {}，忽略重新开始", self.phase);
            return Ok(());
        }
        self.auto_advance.cancel();

        if !self.submission.is_success() {
            info!("🔁 上次提交未成功，重新提交后再重置");
            self.try_submit().await?;
        }

        self.store.clear_all();
        self.phase = WizardPhase::Welcome;
        self.current_index = 0;
        self.direction = Direction::Forward;
        self.submission = SubmissionStatus::NotSubmitted;
        self.persist();
        info!("🔄 问卷已重置，回到欢迎页");
        Ok(())
    }

    /// 等待自动翻页到期，返回到期的题目索引
    ///
    /// 只消费定时器，不改变状态，可以放进 `tokio::select!` 中与其他输入竞争。
    /// 没有待触发的任务，或触发时已不在同一题，返回 None
    pub async fn auto_advance_due(&mut self) -> Option<usize> {
        let index = self.auto_advance.fired().await?;

        if self.phase != WizardPhase::Answering || self.current_index != index {
            debug!("自动翻页已过期: 题目 {}", index + 1);
            return None;
        }

        debug!("自动翻页触发: 题目 {}", index + 1);
        Some(index)
    }

    /// 等待自动翻页到期并执行 `next()`
    ///
    /// 最后一题时会发起提交，不要把这个 future 放进 `select!`
    pub async fn wait_auto_advance(&mut self) -> Option<WizardResult<StepOutcome>> {
        self.auto_advance_due().await?;
        Some(self.next().await)
    }

    // ========== 内部方法 ==========

    async fn try_submit(&mut self) -> WizardResult<()> {
        match self.client.submit(&self.registry, self.store.answers()).await {
            Ok(receipt) => {
                info!("🎉 问卷提交成功 ({} 个文件)", receipt.file_count);
                self.store.clear_all();
                self.submission = SubmissionStatus::Succeeded(receipt);
                Ok(())
            }
            Err(e) => {
                if e.is_submission_error() {
                    error!("❌ 问卷提交失败: {}", e);
                } else {
                    warn!("⚠️ 问卷提交失败: {}", e);
                }
                self.submission = SubmissionStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn persist(&mut self) {
        self.store.persist(self.phase, self.current_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStorage;
    use crate::models::FileHandle;
    use crate::services::{CollectorResponse, SubmissionPayload};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// 按脚本返回响应的收集端
    #[derive(Clone, Default)]
    struct ScriptedCollector {
        responses: Arc<Mutex<VecDeque<CollectorResponse>>>,
        received: Arc<Mutex<Vec<SubmissionPayload>>>,
    }

    impl ScriptedCollector {
        fn push(&self, response: CollectorResponse) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn received(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    impl Collector for ScriptedCollector {
        async fn post(&self, payload: &SubmissionPayload) -> WizardResult<CollectorResponse> {
            self.received.lock().unwrap().push(payload.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| CollectorResponse::success(vec![])))
        }
    }

    type TestController = WizardController<MemoryStorage, ScriptedCollector>;

    fn controller() -> (TestController, ScriptedCollector) {
        let collector = ScriptedCollector::default();
        let controller = WizardController::new(
            QuestionRegistry::builtin(),
            MemoryStorage::new(),
            SubmissionClient::new(collector.clone()),
            Duration::from_millis(300),
        );
        (controller, collector)
    }

    fn pdf() -> AnswerValue {
        AnswerValue::Files(vec![FileHandle::from_bytes(
            "hw.pdf",
            "application/pdf",
            vec![7; 16],
        )])
    }

    /// 填写所有必填项
    fn fill_required(c: &mut TestController) {
        for (id, value) in [
            ("name", AnswerValue::text("Asha")),
            ("email", AnswerValue::text("asha@example.com")),
            ("mobile", AnswerValue::text("9876543210")),
            ("classDate", AnswerValue::text("2024-03-09")),
            ("classAttended", AnswerValue::text("B3")),
            ("mentor", AnswerValue::text("Edwin")),
            ("classFeedback", AnswerValue::text("Excellent")),
            ("assignmentUpload", pdf()),
        ] {
            c.on_answer_change(id, value).unwrap();
        }
    }

    #[tokio::test]
    async fn test_required_question_blocks_next() {
        let (mut c, _) = controller();
        c.start();

        let err = c.next().await.unwrap_err();
        assert!(matches!(err, WizardError::Validation { ref question_id, .. } if question_id == "name"));
        assert_eq!(c.current_index(), 0);

        c.on_answer_change("name", AnswerValue::text("   ")).unwrap();
        assert!(c.next().await.is_err());
        assert!(!c.can_go_next());

        c.on_answer_change("name", AnswerValue::text("Asha")).unwrap();
        assert_eq!(c.next().await.unwrap(), StepOutcome::Advanced(1));
        assert_eq!(c.direction(), Direction::Forward);
    }

    #[tokio::test]
    async fn test_previous_at_first_is_noop() {
        let (mut c, _) = controller();
        c.start();
        assert!(!c.previous());
        assert_eq!(c.current_index(), 0);

        c.on_answer_change("name", AnswerValue::text("Asha")).unwrap();
        c.next().await.unwrap();
        assert!(c.previous());
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.direction(), Direction::Backward);
    }

    #[tokio::test]
    async fn test_file_question_requires_files() {
        let (mut c, _) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..7 {
            c.next().await.unwrap();
        }
        assert_eq!(c.current_question().unwrap().id, "assignmentUpload");

        c.on_answer_change("assignmentUpload", AnswerValue::Files(vec![])).unwrap();
        assert!(c.next().await.is_err());

        c.on_answer_change("assignmentUpload", pdf()).unwrap();
        assert_eq!(c.next().await.unwrap(), StepOutcome::Advanced(8));
    }

    #[tokio::test]
    async fn test_last_question_completes_and_clears_on_success() {
        let (mut c, collector) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..8 {
            c.next().await.unwrap();
        }
        assert!(c.is_last());

        // 选填题可以直接跳过
        let outcome = c.next().await.unwrap();
        assert!(matches!(outcome, StepOutcome::Completed(SubmissionStatus::Succeeded(_))));
        assert_eq!(c.phase(), WizardPhase::Complete);
        assert_eq!(c.current_index(), 8);
        assert!(c.answers().is_empty());
        assert!(c.answers().storage().is_empty());
        assert_eq!(collector.received(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_answers_and_phase() {
        let (mut c, collector) = controller();
        collector.push(CollectorResponse::error("quota exceeded"));
        fill_required(&mut c);
        c.start();
        for _ in 0..8 {
            c.next().await.unwrap();
        }

        let outcome = c.next().await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Completed(SubmissionStatus::Failed("quota exceeded".to_string()))
        );
        assert_eq!(c.phase(), WizardPhase::Complete);
        assert_eq!(c.answers().len(), 8);
    }

    #[tokio::test]
    async fn test_restart_resubmits_after_failure_then_resets() {
        let (mut c, collector) = controller();
        collector.push(CollectorResponse::error("quota exceeded"));
        collector.push(CollectorResponse::error("still down"));
        fill_required(&mut c);
        c.start();
        for _ in 0..9 {
            let _ = c.next().await;
        }
        assert_eq!(c.phase(), WizardPhase::Complete);

        // 重新提交仍失败：停留在完成页
        let err = c.restart().await.unwrap_err();
        assert_eq!(err.to_string(), "still down");
        assert_eq!(c.phase(), WizardPhase::Complete);
        assert_eq!(c.answers().len(), 8);

        // 第三次成功：重置
        c.restart().await.unwrap();
        assert_eq!(c.phase(), WizardPhase::Welcome);
        assert_eq!(c.current_index(), 0);
        assert!(c.answers().is_empty());
        assert_eq!(collector.received(), 3);
    }

    #[tokio::test]
    async fn test_restart_after_success_does_not_resubmit() {
        let (mut c, collector) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..9 {
            c.next().await.unwrap();
        }
        assert!(c.submission_status().is_success());

        c.restart().await.unwrap();
        assert_eq!(collector.received(), 1);
        assert_eq!(c.phase(), WizardPhase::Welcome);
        assert_eq!(*c.submission_status(), SubmissionStatus::NotSubmitted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_answer_auto_advances() {
        let (mut c, _) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..4 {
            c.next().await.unwrap();
        }
        assert_eq!(c.current_question().unwrap().id, "classAttended");

        c.on_answer_change("classAttended", AnswerValue::text("B5")).unwrap();
        assert!(c.is_auto_advance_pending());

        let outcome = c.wait_auto_advance().await.unwrap().unwrap();
        assert_eq!(outcome, StepOutcome::Advanced(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_due_only_consumes_timer() {
        let (mut c, _) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..4 {
            c.next().await.unwrap();
        }

        c.on_answer_change("classAttended", AnswerValue::text("B5")).unwrap();
        assert_eq!(c.auto_advance_due().await, Some(4));
        assert_eq!(c.current_index(), 4);
        assert!(!c.is_auto_advance_pending());
        assert_eq!(c.auto_advance_due().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_navigation_cancels_auto_advance() {
        let (mut c, _) = controller();
        fill_required(&mut c);
        c.start();
        for _ in 0..4 {
            c.next().await.unwrap();
        }

        c.on_answer_change("classAttended", AnswerValue::text("B5")).unwrap();
        assert!(c.previous());
        assert!(!c.is_auto_advance_pending());
        assert!(c.wait_auto_advance().await.is_none());
        assert_eq!(c.current_index(), 3);
    }

    #[tokio::test]
    async fn test_text_answer_does_not_schedule() {
        let (mut c, _) = controller();
        c.start();
        c.on_answer_change("name", AnswerValue::text("Asha")).unwrap();
        assert!(!c.is_auto_advance_pending());
    }

    #[tokio::test]
    async fn test_unknown_question_rejected() {
        let (mut c, _) = controller();
        assert!(matches!(
            c.on_answer_change("nope", AnswerValue::text("x")),
            Err(WizardError::Registry(_))
        ));
    }

    #[tokio::test]
    async fn test_position_restored_from_snapshot() {
        let (mut c, _) = controller();
        c.start();
        c.on_answer_change("name", AnswerValue::text("Asha")).unwrap();
        c.next().await.unwrap();

        let storage = c.answers().storage().clone();
        let restored: TestController = WizardController::new(
            QuestionRegistry::builtin(),
            storage,
            SubmissionClient::new(ScriptedCollector::default()),
            Duration::from_millis(300),
        );
        assert_eq!(restored.phase(), WizardPhase::Answering);
        assert_eq!(restored.current_index(), 1);
        assert_eq!(restored.answer("name"), Some(&AnswerValue::text("Asha")));
    }
}
