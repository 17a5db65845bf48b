//! 重试策略
//!
//! 纯状态机：记录尝试次数和最后一次错误，给出"成功 / 重试 / 失败"的决定。
//! 不执行等待，也不关心界面。

use std::time::Duration;

use crate::config::Config;
use crate::error::DriverFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次尝试之外最多再试几次
    pub max_retries: usize,
    /// 两次尝试之间的固定间隔
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    pub fn start(&self) -> RetryState {
        RetryState {
            policy: *self,
            attempts: 0,
            last_error: None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(5))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Succeed,
    Retry { delay: Duration },
    Fail,
}

#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: usize,
    last_error: Option<DriverFailure>,
}

impl RetryState {
    /// 已完成的尝试次数
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// 下一次尝试的序号（从 1 开始）
    pub fn next_attempt(&self) -> usize {
        self.attempts + 1
    }

    pub fn last_error(&self) -> Option<&DriverFailure> {
        self.last_error.as_ref()
    }

    /// 记录一次尝试的结果
    pub fn record<T, E: AsRef<DriverFailure>>(&mut self, outcome: &Result<T, E>) -> RetryDecision {
        self.attempts += 1;
        match outcome {
            Ok(_) => RetryDecision::Succeed,
            Err(e) => {
                let e = e.as_ref();
                self.last_error = Some(e.clone());
                if e.is_transient() && self.attempts <= self.policy.max_retries {
                    RetryDecision::Retry {
                        delay: self.policy.delay,
                    }
                } else {
                    RetryDecision::Fail
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> Result<(), DriverFailure> {
        Err(DriverFailure::timeout(Duration::from_secs(60)))
    }

    #[test]
    fn test_succeeds_on_third_attempt() {
        let policy = RetryPolicy::new(2, Duration::from_secs(5));
        let mut state = policy.start();
        let retry = RetryDecision::Retry {
            delay: Duration::from_secs(5),
        };

        assert_eq!(state.record(&timeout()), retry);
        assert_eq!(state.record(&timeout()), retry);
        assert_eq!(state.record(&Ok::<(), DriverFailure>(())), RetryDecision::Succeed);
        assert_eq!(state.attempts(), 3);
    }

    #[test]
    fn test_fails_when_fourth_attempt_needed() {
        let mut state = RetryPolicy::default().start();
        assert!(matches!(state.record(&timeout()), RetryDecision::Retry { .. }));
        assert!(matches!(state.record(&timeout()), RetryDecision::Retry { .. }));
        assert_eq!(state.record(&timeout()), RetryDecision::Fail);
        assert_eq!(
            state.last_error(),
            Some(&DriverFailure::Timeout { secs: 60 })
        );
    }

    #[test]
    fn test_cancel_not_retried() {
        let mut state = RetryPolicy::default().start();
        let outcome: Result<(), DriverFailure> = Err(DriverFailure::Cancelled);
        assert_eq!(state.record(&outcome), RetryDecision::Fail);
        assert_eq!(state.attempts(), 1);
    }

    #[test]
    fn test_zero_retries() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        let mut state = policy.start();
        let outcome: Result<(), DriverFailure> = Err(DriverFailure::element_unavailable("btnlogin"));
        assert_eq!(state.record(&outcome), RetryDecision::Fail);
    }
}
