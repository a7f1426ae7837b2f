use serde::{Deserialize, Serialize};

/// 一次采样：时间戳（秒）+ 与参考图集的最高相似度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub timestamp: u64,
    pub score: f64,
}

/// 检测到的有效片段 `[start_time, stop_time]`（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cut {
    pub start_time: u64,
    pub stop_time: u64,
}

impl Cut {
    pub fn new(start_time: u64, stop_time: u64) -> Self {
        Self {
            start_time,
            stop_time,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.stop_time.saturating_sub(self.start_time)
    }
}

impl std::fmt::Display for Cut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s - {}s", self.start_time, self.stop_time)
    }
}
