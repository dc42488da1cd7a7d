use crate::models::question::{QuestionDefinition, QuestionRegistry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// TOML 文件结构：若干个 `[[questions]]`
#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<QuestionDefinition>,
}

/// 解析 TOML 文本为题目列表
pub fn parse_registry_toml(content: &str) -> Result<QuestionRegistry> {
    let file: QuestionFile = toml::from_str(content).context("无法解析题目 TOML")?;
    let registry = QuestionRegistry::new(file.questions)?;
    Ok(registry)
}

/// 从 TOML 文件加载题目列表
pub async fn load_registry_from_toml(toml_file_path: &Path) -> Result<QuestionRegistry> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let registry = parse_registry_toml(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "成功加载 {} 个题目: {}",
        registry.len(),
        toml_file_path.display()
    );

    Ok(registry)
}
