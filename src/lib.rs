//! # Feedback Wizard
//!
//! 一个分步填写的课堂反馈问卷：逐题作答、上传作业文件，最后一次性提交到表格收集端
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只暴露键值存储能力
//! - `Storage` - get / set / remove；`MemoryStorage` 与 `FileStorage`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `AnswerStore` - 保存答案并写入快照（不含文件内容）
//! - `validator` - 必填校验、文件数量限制、格式规则
//! - `SubmissionClient` - base64 编码文件并 POST 到收集端
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"整份问卷"的状态流转
//! - `WizardController` - welcome → answering → complete
//! - `AutoAdvance` - 单选题的可取消自动翻页
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/console_app` - 终端界面
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{WizardError, WizardResult};
pub use infrastructure::{FileStorage, MemoryStorage, Storage};
pub use models::{AnswerValue, FileHandle, QuestionDefinition, QuestionKind, QuestionRegistry};
pub use orchestrator::App;
pub use services::{Collector, HttpCollector, SubmissionClient};
pub use workflow::{StepOutcome, SubmissionStatus, WizardController};
