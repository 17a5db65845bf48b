use serde::Serialize;

/// 成绩表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    /// 课程代码
    pub course: String,
    /// 状态（COMPLETED 或其他）
    pub status: String,
    /// 作业成绩 (Asgn1)
    pub assignment_mark: f64,
    /// 期末理论成绩 (TERM END THEORY)
    pub theory_mark: f64,
    /// 期末实践成绩 (TERM END PRACTICAL)
    pub practical_mark: f64,
}

/// 计入百分比的课程及其加权成绩
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCourseRecord {
    #[serde(flatten)]
    pub record: CourseRecord,
    /// 30% 作业
    pub assignment_weighted: f64,
    /// 70% 理论（MCSL 课程取实践）
    pub theory_or_practical_weighted: f64,
    /// 合计 (A+B)
    pub total: f64,
}

/// 合计行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsRow {
    pub label: String,
    pub assignment_mark: f64,
    pub theory_mark: f64,
    pub practical_mark: f64,
    pub assignment_weighted: f64,
    pub theory_or_practical_weighted: f64,
    pub total: f64,
}

impl TotalsRow {
    pub const LABEL: &'static str = "Total";

    pub fn sum(records: &[ScoredCourseRecord]) -> Self {
        let mut totals = Self {
            label: Self::LABEL.to_string(),
            assignment_mark: 0.0,
            theory_mark: 0.0,
            practical_mark: 0.0,
            assignment_weighted: 0.0,
            theory_or_practical_weighted: 0.0,
            total: 0.0,
        };
        for scored in records {
            totals.assignment_mark += scored.record.assignment_mark;
            totals.theory_mark += scored.record.theory_mark;
            totals.practical_mark += scored.record.practical_mark;
            totals.assignment_weighted += scored.assignment_weighted;
            totals.theory_or_practical_weighted += scored.theory_or_practical_weighted;
            totals.total += scored.total;
        }
        totals
    }
}
