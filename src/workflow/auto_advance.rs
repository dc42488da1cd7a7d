//! 单选题自动翻页
//!
//! 一个可以取消的延时任务：到时后通过 channel 通知控制器

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// 自动翻页定时器
///
/// 每次 `schedule` / `cancel` 都会让代数加一，旧代数的通知被丢弃
pub struct AutoAdvance {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, usize)>,
    rx: mpsc::UnboundedReceiver<(u64, usize)>,
}

impl AutoAdvance {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 安排在延迟后翻过第 `index` 题，会先取消尚未触发的任务
    pub fn schedule(&mut self, index: usize) {
        self.cancel();

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send((generation, index));
        }));

        debug!("已安排自动翻页: 题目 {} ({:?} 后)", index + 1, delay);
    }

    /// 取消尚未触发的任务
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!("已取消自动翻页");
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 等待当前任务触发，返回题目索引
    ///
    /// 没有待触发任务时立即返回 None
    pub async fn fired(&mut self) -> Option<usize> {
        self.pending.as_ref()?;

        while let Some((generation, index)) = self.rx.recv().await {
            if generation == self.generation {
                self.pending = None;
                return Some(index);
            }
        }
        None
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
