//! 本地存储 - 基础设施层
//!
//! 只暴露 get / set / remove 三种能力，不认识题目和答案

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 键值存储能力
///
/// 职责：
/// - 保存向导的持久化快照（字符串键 → 字符串值）
/// - 写入失败不向调用方抛出
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// 纯内存存储（测试用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// 文件存储
///
/// 整个存储是磁盘上的一个 JSON 对象，每次写操作都会整体重写
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    /// 打开存储文件
    ///
    /// 文件不存在或内容损坏时从空存储开始
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("⚠️ 存储文件已损坏，将从空状态开始 ({}): {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("⚠️ 无法读取存储文件 ({}): {}", path.display(), e);
                HashMap::new()
            }
        };

        debug!("存储已打开: {} ({} 项)", path.display(), entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(&self.path, json));

        if let Err(e) = result {
            warn!("⚠️ 写入存储文件失败 ({}): {}", self.path.display(), e);
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_basic_ops() {
        let mut storage = MemoryStorage::new();
        assert!(storage.get("k").is_none());

        storage.set("k", "v".to_string());
        assert_eq!(storage.get("k").as_deref(), Some("v"));

        storage.remove("k");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let mut storage = FileStorage::open(&path);
            storage.set("currentStep", "questions".to_string());
            storage.set("currentQuestionIndex", "3".to_string());
            storage.remove("currentQuestionIndex");
        }

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("currentStep").as_deref(), Some("questions"));
        assert!(storage.get("currentQuestionIndex").is_none());
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get("answers").is_none());
    }
}
