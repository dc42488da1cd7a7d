//! 文件编码服务 - 业务能力层
//!
//! 只负责"把文件转成 base64"能力

use crate::error::{WizardError, WizardResult};
use crate::models::FileHandle;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 提交给收集端的单个文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFile {
    pub name: String,
    /// base64 内容（不带 data URL 前缀）
    pub data: String,
    pub mime_type: String,
    pub size: u64,
}

/// 编码单个文件
pub async fn encode_file(handle: &FileHandle) -> WizardResult<EncodedFile> {
    let bytes = handle
        .read_bytes()
        .await
        .map_err(|e| WizardError::file_read(&handle.name, e))?;

    debug!("文件已编码: {} ({} 字节)", handle.name, bytes.len());

    Ok(EncodedFile {
        name: handle.name.clone(),
        data: STANDARD.encode(&bytes),
        mime_type: handle.mime_type.clone(),
        size: handle.size,
    })
}

/// 并发编码多个文件，保持选择顺序
///
/// 读取失败的文件记录日志后跳过
pub async fn encode_files(handles: &[FileHandle]) -> Vec<EncodedFile> {
    let results = join_all(handles.iter().map(encode_file)).await;

    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("⚠️ 跳过无法读取的文件: {}", e);
                None
            }
        })
        .collect()
}
