//! 스케줄러 통계

use std::time::{Duration, Instant};

/// 스케줄러 통계 스냅샷
#[derive(Debug, Clone)]
pub struct SchedulerStats {
    /// 시작 시간
    pub start_time: Instant,

    /// 수락된 논리 요청 수
    pub submitted: u64,

    /// 중복으로 버려진 요청 수 (내부 재진입 포함)
    pub coalesced: u64,

    /// 전송 어댑터 호출 수
    pub dispatched: u64,

    /// 재시도로 다시 큐에 들어간 수
    pub retries: u64,

    /// 다음 청크로 진행한 수
    pub chunks: u64,

    /// 성공으로 끝난 논리 요청 수
    pub completed: u64,

    /// 에러로 끝난 논리 요청 수
    pub failed: u64,

    /// 전송 중이라 미뤄진 틱 수
    pub deferred_ticks: u64,

    /// 현재 대기 큐 길이
    pub queue_depth: usize,

    /// 마지막 전송 실패 시간
    pub last_error_time: Option<Instant>,
}

impl SchedulerStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            submitted: 0,
            coalesced: 0,
            dispatched: 0,
            retries: 0,
            chunks: 0,
            completed: 0,
            failed: 0,
            deferred_ticks: 0,
            queue_depth: 0,
            last_error_time: None,
        }
    }

    /// 경과 시간
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 초당 전송 수
    pub fn dispatch_rate(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed == 0.0 {
            return 0.0;
        }
        self.dispatched as f64 / elapsed
    }

    /// 끝난 논리 요청 중 실패 비율
    pub fn failure_rate(&self) -> f64 {
        let finished = self.completed + self.failed;
        if finished == 0 {
            return 0.0;
        }
        self.failed as f64 / finished as f64
    }

    /// 아직 끝나지 않은 논리 요청 수
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.completed + self.failed)
    }

    /// 통계 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "Elapsed: {:.2}s | Requests: {}/{} ok, {} failed, {} coalesced | Dispatched: {} ({:.1}/s) | Retries: {} | Chunks: {} | Deferred ticks: {} | Queue: {}",
            self.elapsed().as_secs_f64(),
            self.completed,
            self.submitted,
            self.failed,
            self.coalesced,
            self.dispatched,
            self.dispatch_rate(),
            self.retries,
            self.chunks,
            self.deferred_ticks,
            self.queue_depth,
        )
    }
}

impl Default for SchedulerStats {
    fn default() -> Self {
        Self::new()
    }
}
