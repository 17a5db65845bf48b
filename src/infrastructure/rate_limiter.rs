//! 滑动窗口限流器 - 基础设施层

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::PoolError;

/// 任意连续 `window` 时间内最多放行 `max_requests` 次
pub struct SlidingWindowRateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// 立即尝试占用一个名额
    pub async fn try_acquire(&self) -> Result<(), PoolError> {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        while hits.front().is_some_and(|t| *t + self.window <= now) {
            hits.pop_front();
        }
        if hits.len() < self.max_requests {
            hits.push_back(now);
            return Ok(());
        }
        let retry_after = hits
            .front()
            .map(|t| (*t + self.window).saturating_duration_since(now))
            .unwrap_or(self.window);
        Err(PoolError::RateLimited { retry_after })
    }

    /// 最多等待 `max_wait` 获取名额
    pub async fn acquire(&self, max_wait: Duration) -> Result<(), PoolError> {
        let deadline = Instant::now() + max_wait;
        loop {
            match self.try_acquire().await {
                Ok(()) => return Ok(()),
                Err(PoolError::RateLimited { retry_after }) => {
                    let now = Instant::now();
                    if now + retry_after > deadline {
                        return Err(PoolError::RateLimited { retry_after });
                    }
                    debug!("触发限流，等待 {:?}", retry_after);
                    sleep(retry_after).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 当前窗口内已用名额
    pub async fn in_flight(&self) -> usize {
        let now = Instant::now();
        let hits = self.hits.lock().await;
        hits.iter().filter(|t| **t + self.window > now).count()
    }
}
