use crate::models::question::QuestionKind;
use phf::phf_map;
use std::path::{Path, PathBuf};

/// 扩展名 → MIME 类型
static MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "pdf" => "application/pdf",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "doc" => "application/msword",
    "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "txt" => "text/plain",
};

const FALLBACK_MIME: &str = "application/octet-stream";

/// 根据文件扩展名推断 MIME 类型
pub fn guess_mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or(FALLBACK_MIME)
}

/// 文件内容来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// 已在内存中
    Bytes(Vec<u8>),
    /// 磁盘文件，提交时才读取
    Path(PathBuf),
}

/// 用户选择的一个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    content: FileContent,
}

impl FileHandle {
    /// 由内存中的字节创建
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            content: FileContent::Bytes(bytes),
        }
    }

    /// 由磁盘路径创建（只读取元数据）
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("不是文件: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: guess_mime_type(path).to_string(),
            content: FileContent::Path(path.to_path_buf()),
        })
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// 读取文件的全部字节
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Bytes(bytes) => Ok(bytes.clone()),
            FileContent::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// 单个答案
///
/// 形状由题目类型决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// 文本类与单选
    Text(String),
    /// 多选，按选择顺序保存且不重复
    MultiSelect(Vec<String>),
    /// 文件上传
    Files(Vec<FileHandle>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    /// 由多个选项构造多选答案
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::MultiSelect(dedup_in_order(values.into_iter().map(Into::into)))
    }

    /// 解析逗号拼接的多选值（忽略空项）
    pub fn parse_multi(joined: &str) -> Self {
        AnswerValue::MultiSelect(dedup_in_order(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        ))
    }

    pub fn is_files(&self) -> bool {
        matches!(self, AnswerValue::Files(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileHandle]> {
        match self {
            AnswerValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// 转换为可存储、可提交的字符串
    ///
    /// 文件答案返回 None
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            AnswerValue::Text(s) => Some(s.clone()),
            AnswerValue::MultiSelect(values) => Some(values.join(",")),
            AnswerValue::Files(_) => None,
        }
    }

    /// 按题目类型从字符串还原答案
    pub fn from_wire_string(kind: QuestionKind, raw: &str) -> Option<Self> {
        match kind {
            QuestionKind::FileUpload => None,
            QuestionKind::MultiSelect => Some(Self::parse_multi(raw)),
            _ => Some(AnswerValue::Text(raw.to_string())),
        }
    }
}

/// 去重并保留首次出现的顺序
fn dedup_in_order(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("hw.pdf")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("archive")), FALLBACK_MIME);
        assert_eq!(guess_mime_type(Path::new("a.xyz")), FALLBACK_MIME);
    }

    #[test]
    fn test_multi_select_wire_format() {
        let value = AnswerValue::parse_multi("Sunday,,Friday, Sunday");
        assert_eq!(value, AnswerValue::multi(["Sunday", "Friday"]));
        assert_eq!(value.to_wire_string().as_deref(), Some("Sunday,Friday"));
    }

    #[test]
    fn test_files_have_no_wire_string() {
        let value = AnswerValue::Files(vec![FileHandle::from_bytes(
            "hw.pdf",
            "application/pdf",
            vec![1, 2, 3],
        )]);
        assert!(value.to_wire_string().is_none());
        assert!(AnswerValue::from_wire_string(QuestionKind::FileUpload, "x").is_none());
    }

    #[tokio::test]
    async fn test_from_path_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let handle = FileHandle::from_path(&path).await.unwrap();
        assert_eq!(handle.name, "notes.txt");
        assert_eq!(handle.size, 5);
        assert_eq!(handle.mime_type, "text/plain");
        assert_eq!(handle.read_bytes().await.unwrap(), b"hello");
    }
}
