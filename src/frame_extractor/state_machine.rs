use crate::api::models::Cut;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Idle,
    Open { start_time: u64 },
}

impl SegmentState {
    pub fn new() -> Self {
        SegmentState::Idle
    }

    /// One step of the scan at `index`. Returns the next state and the cut
    /// closed by this step, if any.
    pub fn transition(
        &self,
        index: usize,
        matches: &[bool],
        timestamps: &[u64],
        config: &GraceConfig,
    ) -> (SegmentState, Option<Cut>) {
        match *self {
            SegmentState::Idle => {
                if all_within(matches, index, config.start_grace, true) {
                    (
                        SegmentState::Open {
                            start_time: timestamps[index],
                        },
                        None,
                    )
                } else {
                    (SegmentState::Idle, None)
                }
            }

            SegmentState::Open { start_time } => {
                if !all_within(matches, index, config.end_grace, false) {
                    return (*self, None);
                }

                // stop stays inside the non-match run so the next open cannot precede it
                let offset = config.stop_offset.min(config.end_grace.saturating_sub(1));
                let stop_index = (index + offset).min(timestamps.len() - 1);
                let stop_time = timestamps[stop_index];
                if stop_time <= start_time {
                    warn!(
                        "⚠️ Dropping empty cut {}s - {}s (repeated timestamps)",
                        start_time, stop_time
                    );
                    return (SegmentState::Idle, None);
                }
                (SegmentState::Idle, Some(Cut::new(start_time, stop_time)))
            }
        }
    }
}

impl Default for SegmentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Every sample in `[index, index + len)` (clipped at the end) equals `value`.
fn all_within(matches: &[bool], index: usize, len: usize, value: bool) -> bool {
    let end = (index + len).min(matches.len());
    matches[index..end].iter().all(|&m| m == value)
}

#[derive(Debug, Clone)]
pub struct GraceConfig {
    /// 进入片段所需的连续匹配采样数
    pub start_grace: usize,
    /// 退出片段所需的连续不匹配采样数
    pub end_grace: usize,
    /// Samples into the end-grace window taken as the stop time; the real
    /// drop-off usually lags the first miss by about two samples. Capped at
    /// `end_grace - 1`.
    pub stop_offset: usize,
}

impl Default for GraceConfig {
    fn default() -> Self {
        Self {
            start_grace: 5,
            end_grace: 5,
            stop_offset: 2,
        }
    }
}

/// Converts a match series into cuts.
///
/// The scan stops `end_grace` samples before the end so every close check
/// sees a full window; a cut still open at that point is dropped.
pub struct SegmentExtractor {
    config: GraceConfig,
}

impl SegmentExtractor {
    pub fn new() -> Self {
        Self::with_config(GraceConfig::default())
    }

    pub fn with_config(config: GraceConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, matches: &[bool], timestamps: &[u64]) -> Vec<Cut> {
        assert_eq!(
            matches.len(),
            timestamps.len(),
            "match series and timestamps must align"
        );

        let mut cuts = Vec::new();
        let mut state = SegmentState::new();
        let scan_end = matches.len().saturating_sub(self.config.end_grace);

        for index in 0..scan_end {
            let (next, closed) = state.transition(index, matches, timestamps, &self.config);
            if next != state {
                debug!("   [{}] {:?} -> {:?}", index, state, next);
            }
            if let Some(cut) = closed {
                cuts.push(cut);
            }
            state = next;
        }

        if let SegmentState::Open { start_time } = state {
            debug!("Discarding unterminated cut starting at {}s", start_time);
        }

        cuts
    }
}

impl Default for SegmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
