//! 会话资源池 - 基础设施层
//!
//! 限制同时存在的会话数量，并在进入会话前做限流。
//! 由 `App` 创建并显式传递，不使用全局状态。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::config::Config;
use crate::error::PoolError;
use crate::infrastructure::rate_limiter::SlidingWindowRateLimiter;

/// 会话许可，释放时归还名额
#[derive(Debug)]
pub struct SessionPermit {
    _permit: OwnedSemaphorePermit,
}

pub struct SessionPool {
    semaphore: Arc<Semaphore>,
    max_sessions: usize,
    limiter: SlidingWindowRateLimiter,
    acquire_wait: Duration,
}

impl SessionPool {
    pub fn new(max_sessions: usize, limiter: SlidingWindowRateLimiter, acquire_wait: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
            limiter,
            acquire_wait,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_concurrent_sessions,
            SlidingWindowRateLimiter::new(config.rate_limit_max, config.rate_limit_window()),
            config.element_wait(),
        )
    }

    /// 先限流，再占用一个会话名额
    pub async fn acquire(&self) -> Result<SessionPermit, PoolError> {
        self.limiter.acquire(self.acquire_wait).await?;

        let permit = tokio::time::timeout(self.acquire_wait, self.semaphore.clone().acquire_owned())
            .await
            .map_err(|_| PoolError::Busy {
                limit: self.max_sessions,
            })?
            .map_err(|_| PoolError::Closed)?;
        debug!("获取会话名额，剩余 {}", self.semaphore.available_permits());
        Ok(SessionPermit { _permit: permit })
    }

    /// 当前空闲的会话名额
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 关闭资源池，之后的获取都会失败
    pub fn close(&self) {
        self.semaphore.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(max_sessions: usize, rate: usize) -> SessionPool {
        SessionPool::new(
            max_sessions,
            SlidingWindowRateLimiter::new(rate, Duration::from_secs(60)),
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_cap() {
        let pool = pool(2, 10);
        let a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert_eq!(pool.available(), 0);

        assert_eq!(pool.acquire().await.unwrap_err(), PoolError::Busy { limit: 2 });

        drop(a);
        assert_eq!(pool.available(), 1);
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_gates_entry() {
        let pool = pool(5, 1);
        drop(pool.acquire().await.unwrap());
        assert!(matches!(
            pool.acquire().await,
            Err(PoolError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_closed_pool() {
        let pool = pool(1, 10);
        pool.close();
        assert_eq!(pool.acquire().await.unwrap_err(), PoolError::Closed);
    }
}
