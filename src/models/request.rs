use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;
use crate::models::program::{GradecardCategory, ProgramCode};
use crate::services::validator;

/// 已校验的学号（9 或 10 位数字）
///
/// 只能通过 [`validator::validate`] 构造
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Enrollment(String);

impl Enrollment {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次成绩单查询请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    pub enrollment: Enrollment,
    pub category: GradecardCategory,
    pub program: ProgramCode,
}

impl SubmissionRequest {
    /// 校验学号并构建请求
    pub fn new(
        enrollment: &str,
        category: GradecardCategory,
        program: ProgramCode,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            enrollment: validator::validate(enrollment)?,
            category,
            program,
        })
    }
}

impl fmt::Display for SubmissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[学号 {}]", self.enrollment)
    }
}
