//! 终端问卷 - 编排层
//!
//! 逐行读取标准输入，把用户输入翻译成控制器操作

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::WizardError;
use crate::infrastructure::{FileStorage, Storage};
use crate::models::{
    load_registry_from_toml, AnswerValue, FileHandle, QuestionDefinition, QuestionKind,
    QuestionRegistry, WizardPhase,
};
use crate::services::{
    check_file_selection, remove_file, Collector, FormatRules, HttpCollector, SubmissionClient,
};
use crate::utils::logging::{log_startup, log_submission_result};
use crate::workflow::{StepOutcome, SubmissionStatus, WizardController};

const CMD_QUIT: &str = ":quit";
const CMD_BACK: &str = ":back";
const CMD_CLEAR: &str = ":clear";
const CMD_REMOVE: &str = ":remove";

/// 应用主结构
pub struct App {
    controller: WizardController<FileStorage, HttpCollector>,
    rules: FormatRules,
    screen: Screen,
}

/// 记录已经显示过的题目，同一题不重复输出
#[derive(Debug, Default)]
struct Screen {
    shown: Option<usize>,
}

impl Screen {
    fn should_render(&mut self, index: usize) -> bool {
        if self.shown == Some(index) {
            return false;
        }
        self.shown = Some(index);
        true
    }

    fn reset(&mut self) {
        self.shown = None;
    }
}

/// 答题阶段等到的下一个事件
#[derive(Debug)]
enum Input {
    AutoAdvance,
    Line(Option<String>),
}

/// 一行输入处理后的去向
enum Flow {
    Continue,
    Quit,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let registry = match &config.questions_file {
            Some(path) => load_registry_from_toml(Path::new(path)).await?,
            None => QuestionRegistry::builtin(),
        };

        let storage = FileStorage::open(&config.storage_path);
        let client = SubmissionClient::new(HttpCollector::new(config.collector_url.clone()));
        let controller =
            WizardController::new(registry, storage, client, config.auto_advance_delay());

        Ok(Self {
            controller,
            rules: FormatRules::new()?,
            screen: Screen::default(),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let flow = match self.controller.phase() {
                WizardPhase::Welcome => self.welcome(&mut lines).await?,
                WizardPhase::Answering => self.answering(&mut lines).await?,
                WizardPhase::Complete => self.complete(&mut lines).await?,
            };

            if let Flow::Quit = flow {
                info!("👋 已退出，进度已保存");
                return Ok(());
            }
        }
    }

    async fn welcome(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<Flow> {
        self.screen.reset();
        println!();
        println!("Class Feedback & Assignment Submission");
        println!("Press Enter to start, or type {} to exit.", CMD_QUIT);
        prompt();

        match lines.next_line().await? {
            Some(line) if line.trim() != CMD_QUIT => {
                self.controller.start();
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Quit),
        }
    }

    async fn answering(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<Flow> {
        if self.screen.should_render(self.controller.current_index()) {
            self.render_question();
        } else if !self.controller.is_auto_advance_pending() {
            prompt();
        }

        let line = match next_input(&mut self.controller, lines).await? {
            Input::AutoAdvance => {
                // 最后一题会在这里提交，不能再与输入竞争
                let result = self.controller.next().await;
                self.report_step(result);
                return Ok(Flow::Continue);
            }
            Input::Line(line) => line,
        };

        let Some(line) = line else {
            return Ok(Flow::Quit);
        };
        let input = line.trim();

        match input {
            CMD_QUIT => return Ok(Flow::Quit),
            CMD_BACK => {
                if !self.controller.previous() {
                    println!("Already at the first question.");
                }
                return Ok(Flow::Continue);
            }
            "" => {
                let result = self.controller.next().await;
                self.report_step(result);
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let Some(question) = self.controller.current_question().cloned() else {
            return Ok(Flow::Continue);
        };

        let value = match self.parse_answer(&question, input).await {
            Ok(value) => value,
            Err(message) => {
                println!("⚠️  {}", message);
                return Ok(Flow::Continue);
            }
        };

        if let Err(message) = self.rules.check(&question, Some(&value)) {
            println!("⚠️  {}", message);
            return Ok(Flow::Continue);
        }

        self.controller.on_answer_change(&question.id, value)?;

        if question.kind == QuestionKind::FileUpload {
            self.screen.reset();
        }

        // 文本题和多选题输入即确认；单选题交给自动翻页；文件题需回车确认
        if question.kind.is_text() || question.kind == QuestionKind::MultiSelect {
            let result = self.controller.next().await;
            self.report_step(result);
        }

        Ok(Flow::Continue)
    }

    async fn complete(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<Flow> {
        self.screen.reset();
        println!();
        match self.controller.submission_status() {
            SubmissionStatus::Succeeded(receipt) => {
                println!("Success 🎉 Form submitted with {} file(s)", receipt.file_count);
            }
            SubmissionStatus::Failed(message) => {
                println!("Submission Error: {}", message);
            }
            SubmissionStatus::NotSubmitted => {
                println!("Your answers have not been submitted yet.");
            }
        }
        println!("Press Enter to restart, or type {} to exit.", CMD_QUIT);
        prompt();

        match lines.next_line().await? {
            Some(line) if line.trim() != CMD_QUIT => {
                if let Err(e) = self.controller.restart().await {
                    println!("Submission Error: {}", e);
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Quit),
        }
    }

    fn render_question(&self) {
        let Some(question) = self.controller.current_question() else {
            return;
        };

        println!();
        println!("[{}] {}", self.controller.progress(), question.title);
        if let Some(subtitle) = &question.subtitle {
            println!("    {}", subtitle);
        }

        match question.kind {
            QuestionKind::SingleSelect | QuestionKind::MultiSelect => {
                for (i, option) in question.options.iter().enumerate() {
                    println!("    {}. {}", option_letter(i), option);
                }
                if question.kind == QuestionKind::MultiSelect {
                    println!("    (comma separated, e.g. A,C)");
                }
            }
            QuestionKind::FileUpload => {
                println!(
                    "    Enter file paths separated by commas (max {} files), {} N to drop one, {} to remove all, Enter to continue",
                    question.file_limit(),
                    CMD_REMOVE,
                    CMD_CLEAR
                );
            }
            QuestionKind::Date => println!("    (YYYY-MM-DD)"),
            _ => {
                if let Some(placeholder) = &question.placeholder {
                    println!("    ({})", placeholder);
                }
            }
        }

        if let Some(answer) = self.controller.answer(&question.id) {
            match answer {
                AnswerValue::Files(files) => {
                    for (i, file) in files.iter().enumerate() {
                        println!("    {}. 📄 {} ({} bytes)", i + 1, file.name, file.size);
                    }
                }
                other => {
                    if let Some(text) = other.to_wire_string() {
                        println!("    current: {}", text);
                    }
                }
            }
        }

        if !self.controller.is_first() {
            println!("    ({} to go back)", CMD_BACK);
        }
        prompt();
    }

    /// 把一行输入解析成答案
    async fn parse_answer(&self, question: &QuestionDefinition, input: &str) -> Result<AnswerValue, String> {
        match question.kind {
            QuestionKind::SingleSelect => resolve_option(question, input).map(AnswerValue::Text),
            QuestionKind::MultiSelect => {
                let picked = input
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| resolve_option(question, s))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AnswerValue::multi(picked))
            }
            QuestionKind::FileUpload => {
                if input == CMD_CLEAR {
                    return Ok(AnswerValue::Files(Vec::new()));
                }

                let current = self
                    .controller
                    .answer(&question.id)
                    .and_then(AnswerValue::as_files)
                    .unwrap_or_default();

                if let Some(rest) = input.strip_prefix(CMD_REMOVE) {
                    let position = parse_position(rest)?;
                    if position > current.len() {
                        return Err(format!("No file at position {}", position));
                    }
                    return Ok(AnswerValue::Files(remove_file(question, current, position - 1)));
                }

                let mut incoming = Vec::new();
                for path in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    match FileHandle::from_path(path).await {
                        Ok(handle) => incoming.push(handle),
                        Err(e) => {
                            warn!("无法读取文件 {}: {}", path, e);
                            return Err(format!("Cannot read file '{}': {}", path, e));
                        }
                    }
                }

                check_file_selection(question, current, incoming)
                    .map(AnswerValue::Files)
                    .map_err(|e| match e {
                        WizardError::TooManyFiles { max, .. } => {
                            format!("You can only select up to {} files.", max)
                        }
                        other => other.to_string(),
                    })
            }
            _ => Ok(AnswerValue::text(input)),
        }
    }

    fn report_step(&self, result: crate::error::WizardResult<StepOutcome>) {
        match result {
            Ok(StepOutcome::Completed(status)) => log_submission_result(&status),
            Ok(_) => {}
            Err(WizardError::Validation { message, .. }) => println!("⚠️  Required Field: {}", message),
            Err(e) => println!("⚠️  {}", e),
        }
    }
}

/// 等待下一行输入或自动翻页到期
///
/// 这里只消费定时器；真正的翻页（可能包含提交）由调用方在 `select!` 之外执行
async fn next_input<S, C, R>(
    controller: &mut WizardController<S, C>,
    lines: &mut Lines<R>,
) -> std::io::Result<Input>
where
    S: Storage,
    C: Collector,
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        Some(_) = controller.auto_advance_due(), if controller.is_auto_advance_pending() => {
            Ok(Input::AutoAdvance)
        }
        line = lines.next_line() => line.map(Input::Line),
    }
}

/// 解析 `:remove N` 中从 1 开始的序号
fn parse_position(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| format!("Usage: {} N (N starts at 1)", CMD_REMOVE))
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// 选项序号：A, B, C ...
fn option_letter(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// 支持字母、从 1 开始的序号或选项原文（不区分大小写）
fn resolve_option(question: &QuestionDefinition, input: &str) -> Result<String, String> {
    let input = input.trim();

    if let Some(option) = question
        .options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
    {
        return Ok(option.clone());
    }

    let index = if let Ok(n) = input.parse::<usize>() {
        n.checked_sub(1)
    } else {
        (0..question.options.len()).find(|i| option_letter(*i).eq_ignore_ascii_case(input))
    };

    index
        .and_then(|i| question.options.get(i))
        .cloned()
        .ok_or_else(|| format!("'{}' is not one of the options", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WizardResult;
    use crate::infrastructure::MemoryStorage;
    use crate::services::{CollectorResponse, SubmissionPayload};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// 每次提交耗时 2 秒的收集端
    #[derive(Clone, Default)]
    struct SlowCollector {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    impl Collector for SlowCollector {
        async fn post(&self, _payload: &SubmissionPayload) -> WizardResult<CollectorResponse> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(2)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(CollectorResponse::success(vec![]))
        }
    }

    /// 两道题，最后一题是单选
    fn controller_on_last_select(
        collector: SlowCollector,
    ) -> WizardController<MemoryStorage, SlowCollector> {
        let registry = QuestionRegistry::new(vec![
            QuestionDefinition::new("name", QuestionKind::ShortText, "Name", true),
            QuestionDefinition::new("slot", QuestionKind::SingleSelect, "Slot", true)
                .with_options(["Morning", "Evening"]),
        ])
        .unwrap();

        let mut c = WizardController::new(
            registry,
            MemoryStorage::new(),
            SubmissionClient::new(collector),
            Duration::from_millis(300),
        );
        c.start();
        c.on_answer_change("name", AnswerValue::text("Asha")).unwrap();
        c
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_submission_not_cut_by_incoming_line() {
        let collector = SlowCollector::default();
        let mut c = controller_on_last_select(collector.clone());
        c.next().await.unwrap();
        c.on_answer_change("slot", AnswerValue::text("Evening")).unwrap();

        // 一行输入在提交进行中（1 秒时）到达
        let stdin = tokio_test::io::Builder::new()
            .wait(Duration::from_secs(1))
            .read(b":back\n")
            .build();
        let mut lines = BufReader::new(stdin).lines();

        let input = next_input(&mut c, &mut lines).await.unwrap();
        assert!(matches!(input, Input::AutoAdvance));

        let outcome = c.next().await.unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Completed(SubmissionStatus::Succeeded(_))
        ));
        assert_eq!(c.phase(), WizardPhase::Complete);
        assert_eq!(collector.started.load(Ordering::SeqCst), 1);
        assert_eq!(collector.finished.load(Ordering::SeqCst), 1);

        // 提交期间到达的输入留到下一轮读取
        let line = lines.next_line().await.unwrap();
        assert_eq!(line.as_deref(), Some(":back"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_line_before_timer_keeps_auto_advance_pending() {
        let mut c = controller_on_last_select(SlowCollector::default());
        c.next().await.unwrap();
        c.on_answer_change("slot", AnswerValue::text("Morning")).unwrap();

        let stdin = tokio_test::io::Builder::new().read(b"B\n").build();
        let mut lines = BufReader::new(stdin).lines();

        match next_input(&mut c, &mut lines).await.unwrap() {
            Input::Line(line) => assert_eq!(line.as_deref(), Some("B")),
            other => panic!("unexpected input: {:?}", other),
        }
        assert!(c.is_auto_advance_pending());
        assert_eq!(c.phase(), WizardPhase::Answering);
    }

    #[test]
    fn test_screen_renders_each_question_once() {
        let mut screen = Screen::default();
        assert!(screen.should_render(2));
        assert!(!screen.should_render(2));
        assert!(screen.should_render(3));

        screen.reset();
        assert!(screen.should_render(3));
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position(" 2"), Ok(2));
        assert!(parse_position(" 0").is_err());
        assert!(parse_position("").is_err());
        assert!(parse_position("x").is_err());
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), "A");
        assert_eq!(option_letter(25), "Z");
        assert_eq!(option_letter(26), "27");
    }

    #[test]
    fn test_resolve_option_by_letter_number_and_text() {
        let registry = QuestionRegistry::builtin();
        let mentor = registry.find("mentor").unwrap();

        assert_eq!(resolve_option(mentor, "a").unwrap(), "Edwin");
        assert_eq!(resolve_option(mentor, "2").unwrap(), "Ashwin");
        assert_eq!(resolve_option(mentor, "nihal").unwrap(), "Nihal");
        assert!(resolve_option(mentor, "Z").is_err());
        assert!(resolve_option(mentor, "0").is_err());
    }

    #[test]
    fn test_resolve_option_prefers_exact_text() {
        let registry = QuestionRegistry::builtin();
        let class = registry.find("classAttended").unwrap();
        // "B1" 是选项原文，不是字母 B
        assert_eq!(resolve_option(class, "B1").unwrap(), "B1");
        assert_eq!(resolve_option(class, "INT 3").unwrap(), "INT 3");
    }
}
