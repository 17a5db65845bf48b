use serde::Serialize;

use crate::models::record::{CourseRecord, ScoredCourseRecord, TotalsRow};

/// 成绩汇总，供报表输出使用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    /// 计入百分比的课程
    pub scored_records: Vec<ScoredCourseRecord>,
    /// 合计行
    pub totals: TotalsRow,
    /// 计入的科目数（不含合计行）
    pub subject_count: usize,
    /// 满分 = 科目数 × 100
    pub total_possible_marks: f64,
    /// 实得总分
    pub total_obtained_marks: f64,
    /// 最终百分比（保留两位小数）
    pub final_percentage: f64,
    /// 未完成的课程（不计分）
    pub incomplete: Vec<CourseRecord>,
}
