//! 成绩计算 - 业务能力层
//!
//! 每门已完成课程：30% 作业 + 70% 理论（MCSL 实验课取实践成绩）

use crate::models::{CourseRecord, GradeSummary, ScoredCourseRecord, TotalsRow};

/// 实验课前缀
pub const LAB_PREFIX: &str = "MCSL";
/// 已完成状态
pub const COMPLETED: &str = "COMPLETED";
pub const ASSIGNMENT_WEIGHT: f64 = 0.30;
pub const EXAM_WEIGHT: f64 = 0.70;
/// 每科满分
pub const MARKS_PER_SUBJECT: f64 = 100.0;

/// MCSL 开头的实验课按实践成绩计分
pub fn is_lab_course(course: &str) -> bool {
    course.starts_with(LAB_PREFIX)
}

/// MCSL 课程始终计入，其余名称里含 "lab"（不区分大小写）的课程不计入
pub fn counts_towards_percentage(course: &str) -> bool {
    is_lab_course(course) || !course.to_lowercase().contains("lab")
}

/// 保留两位小数
///
/// 按浮点数的精确值舍入：48.525 实际存储为 48.52499...，结果是 48.52。
/// 先乘 100 再 `round()` 会因乘法误差得到 48.53。
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

fn score_record(record: &CourseRecord) -> ScoredCourseRecord {
    let assignment_weighted = record.assignment_mark * ASSIGNMENT_WEIGHT;
    let exam_mark = if is_lab_course(&record.course) {
        record.practical_mark
    } else {
        record.theory_mark
    };
    let theory_or_practical_weighted = exam_mark * EXAM_WEIGHT;
    ScoredCourseRecord {
        record: record.clone(),
        assignment_weighted,
        theory_or_practical_weighted,
        total: assignment_weighted + theory_or_practical_weighted,
    }
}

/// 计算成绩汇总
pub fn score(records: &[CourseRecord]) -> GradeSummary {
    let (completed, incomplete): (Vec<&CourseRecord>, Vec<&CourseRecord>) =
        records.iter().partition(|r| r.status == COMPLETED);

    let scored_records: Vec<ScoredCourseRecord> = completed
        .into_iter()
        .filter(|r| counts_towards_percentage(&r.course))
        .map(score_record)
        .collect();

    let totals = TotalsRow::sum(&scored_records);
    let subject_count = scored_records.len();
    let total_possible_marks = subject_count as f64 * MARKS_PER_SUBJECT;
    let total_obtained_marks = totals.total;
    let final_percentage = if total_possible_marks > 0.0 {
        round2(total_obtained_marks / total_possible_marks * 100.0)
    } else {
        0.0
    };

    GradeSummary {
        scored_records,
        totals,
        subject_count,
        total_possible_marks,
        total_obtained_marks,
        final_percentage,
        incomplete: incomplete.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(course: &str, status: &str, asgn: f64, theory: f64, practical: f64) -> CourseRecord {
        CourseRecord {
            course: course.to_string(),
            status: status.to_string(),
            assignment_mark: asgn,
            theory_mark: theory,
            practical_mark: practical,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lab_course_uses_practical() {
        let summary = score(&[record("MCSL001LAB", COMPLETED, 60.0, 95.0, 80.0)]);
        assert_eq!(summary.subject_count, 1);
        let scored = &summary.scored_records[0];
        assert!(approx(scored.theory_or_practical_weighted, 0.70 * 80.0));
        assert!(approx(scored.total, 0.30 * 60.0 + 0.70 * 80.0));
    }

    #[test]
    fn test_non_mcsl_lab_courses_excluded() {
        let summary = score(&[
            record("BCSL012LAB", COMPLETED, 90.0, 0.0, 90.0),
            record("MCS012 Lab", COMPLETED, 90.0, 90.0, 0.0),
            record("BCSL012", COMPLETED, 50.0, 50.0, 0.0),
        ]);
        let courses: Vec<&str> = summary
            .scored_records
            .iter()
            .map(|s| s.record.course.as_str())
            .collect();
        assert_eq!(courses, vec!["BCSL012"]);
        assert_eq!(summary.subject_count, 1);
    }

    #[test]
    fn test_percentage_two_subjects() {
        // 27 + 45.5 = 72.5, 18 + 63 = 81.0
        let summary = score(&[
            record("MCS011", COMPLETED, 90.0, 65.0, 0.0),
            record("MCS012", COMPLETED, 60.0, 90.0, 0.0),
        ]);
        assert_eq!(summary.subject_count, 2);
        assert_eq!(summary.total_possible_marks, 200.0);
        assert!(approx(summary.total_obtained_marks, 153.5));
        assert_eq!(summary.final_percentage, 76.75);
        assert!(approx(summary.totals.total, 153.5));
        assert_eq!(summary.totals.label, "Total");
        assert!(approx(summary.totals.assignment_mark, 150.0));
        assert!(approx(summary.totals.theory_mark, 155.0));
    }

    #[test]
    fn test_zero_subjects() {
        let summary = score(&[record("MCS011", "NOT COMPLETED", 90.0, 0.0, 0.0)]);
        assert_eq!(summary.subject_count, 0);
        assert_eq!(summary.total_possible_marks, 0.0);
        assert_eq!(summary.final_percentage, 0.0);

        let empty = score(&[]);
        assert_eq!(empty.final_percentage, 0.0);
        assert!(empty.incomplete.is_empty());
    }

    #[test]
    fn test_incomplete_view_is_unfiltered() {
        let summary = score(&[
            record("MCS011", COMPLETED, 90.0, 65.0, 0.0),
            record("BCSL013LAB", "NOT COMPLETED", 0.0, 0.0, 0.0),
            record("MCS014", "", 0.0, 0.0, 0.0),
        ]);
        let incomplete: Vec<&str> = summary.incomplete.iter().map(|r| r.course.as_str()).collect();
        assert_eq!(incomplete, vec!["BCSL013LAB", "MCS014"]);
        assert_eq!(summary.subject_count, 1);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(76.754), 76.75);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(0.0), 0.0);
        // 精确值略小于 .xx5
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(48.525), 48.52);
    }

    #[test]
    fn test_percentage_rounds_on_stored_value() {
        // 36.3 + 53.4 + 48.0 + 56.4 = 194.1，194.1 / 400 = 48.525
        let summary = score(&[
            record("MCS011", COMPLETED, 65.0, 24.0, 0.0),
            record("MCS012", COMPLETED, 52.0, 54.0, 0.0),
            record("MCS013", COMPLETED, 76.0, 36.0, 0.0),
            record("MCS014", COMPLETED, 55.0, 57.0, 0.0),
        ]);
        assert_eq!(summary.subject_count, 4);
        assert!(approx(summary.total_obtained_marks, 194.1));
        assert_eq!(summary.final_percentage, 48.52);
    }
}
