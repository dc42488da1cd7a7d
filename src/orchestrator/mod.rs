//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层把终端输入输出接到向导控制器上，是唯一知道"界面"的地方。
//!
//! ### `console_app` - 终端问卷
//! - 加载配置与题目（内置或 TOML）
//! - 打开本地快照、创建 HTTP 收集端
//! - 渲染当前题目，解析输入并做格式校验
//! - 在输入与自动翻页之间 `select!`
//!
//! ## 层次关系
//!
//! ```text
//! console_app (一行输入)
//!     ↓
//! workflow::WizardController (状态流转)
//!     ↓
//! services (能力层：answer_store / validator / submission_client)
//!     ↓
//! infrastructure (基础设施：Storage)
//! ```

pub mod console_app;

pub use console_app::App;
