//! 成绩表解析 - 业务能力层
//!
//! 表头决定列结构，按列名而不是位置取值

use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::models::CourseRecord;
use crate::services::classifier::RESULT_TABLE_ID;

/// 成绩表列名
pub mod columns {
    pub const COURSE: &str = "COURSE";
    pub const STATUS: &str = "STATUS";
    pub const ASSIGNMENT: &str = "Asgn1";
    pub const THEORY: &str = "TERM END THEORY";
    pub const PRACTICAL: &str = "TERM END PRACTICAL";
}

static RESULT_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!("table#{}", RESULT_TABLE_ID)).expect("静态选择器"));
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("静态选择器"));
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("静态选择器"));
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("静态选择器"));
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("静态选择器"));

/// 缺失的成绩列（按 0 处理，不中断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWarning {
    pub column: &'static str,
}

impl fmt::Display for ColumnWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "列 {} 缺失，全部按 0 处理", self.column)
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<CourseRecord>,
    pub warnings: Vec<ColumnWarning>,
}

/// 由表头得到的列结构
struct ColumnSchema {
    headers: Vec<String>,
}

impl ColumnSchema {
    fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
        }
    }

    fn width(&self) -> usize {
        self.headers.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| h == &wanted)
    }
}

fn normalize_header(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// 成绩文本转数字："-"、"N/A"、空串以及无法解析的内容都按 0
pub fn parse_mark(raw: &str) -> f64 {
    match raw.trim() {
        "" | "-" | "N/A" => 0.0,
        token => token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
    }
}

/// 解析成绩表 HTML
pub fn extract(markup: &str) -> Result<Extraction, ExtractionError> {
    let doc = Html::parse_document(markup);
    let table = doc
        .select(&RESULT_TABLE_SEL)
        .next()
        .or_else(|| doc.select(&TABLE_SEL).next())
        .ok_or(ExtractionError::NoRows)?;

    let schema = ColumnSchema::new(table.select(&TH_SEL).map(cell_text).collect());

    // 第一行是表头，单元格数与表头不一致的行直接丢弃
    let rows: Vec<Vec<String>> = table
        .select(&TR_SEL)
        .skip(1)
        .map(|tr| tr.select(&TD_SEL).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty() && cells.len() == schema.width())
        .collect();

    if rows.is_empty() {
        return Err(ExtractionError::NoRows);
    }

    let course_idx = schema
        .position(columns::COURSE)
        .ok_or_else(|| ExtractionError::MissingColumn(columns::COURSE.to_string()))?;
    let status_idx = schema
        .position(columns::STATUS)
        .ok_or_else(|| ExtractionError::MissingColumn(columns::STATUS.to_string()))?;

    let mut warnings = Vec::new();
    let mut numeric = |column: &'static str| {
        let idx = schema.position(column);
        if idx.is_none() {
            warnings.push(ColumnWarning { column });
        }
        idx
    };
    let assignment_idx = numeric(columns::ASSIGNMENT);
    let theory_idx = numeric(columns::THEORY);
    let practical_idx = numeric(columns::PRACTICAL);

    let mark = |cells: &[String], idx: Option<usize>| idx.map_or(0.0, |i| parse_mark(&cells[i]));

    let records = rows
        .iter()
        .map(|cells| CourseRecord {
            course: cells[course_idx].clone(),
            status: cells[status_idx].clone(),
            assignment_mark: mark(cells, assignment_idx),
            theory_mark: mark(cells, theory_idx),
            practical_mark: mark(cells, practical_idx),
        })
        .collect();

    Ok(Extraction { records, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr><th>COURSE</th><th>Asgn1</th><th>TERM END THEORY</th>\
                          <th>TERM END PRACTICAL</th><th>STATUS</th></tr>";

    fn table(rows: &str) -> String {
        format!(
            r#"<table id="ctl00_ContentPlaceHolder1_gvDetail">{}{}</table>"#,
            HEADER, rows
        )
    }

    #[test]
    fn test_parse_mark_tokens() {
        assert_eq!(parse_mark("-"), 0.0);
        assert_eq!(parse_mark("N/A"), 0.0);
        assert_eq!(parse_mark(""), 0.0);
        assert_eq!(parse_mark("87"), 87.0);
        assert_eq!(parse_mark(" 42.5 "), 42.5);
        assert_eq!(parse_mark("AB"), 0.0);
        assert_eq!(parse_mark("NaN"), 0.0);
    }

    #[test]
    fn test_extract_rows_by_column_name() {
        let html = table(
            "<tr><td>MCS011</td><td>80</td><td>65</td><td>-</td><td>COMPLETED</td></tr>\
             <tr><td>MCSL016</td><td>N/A</td><td></td><td>90</td><td>NOT COMPLETED</td></tr>",
        );
        let extraction = extract(&html).unwrap();
        assert!(extraction.warnings.is_empty());
        assert_eq!(extraction.records.len(), 2);

        let first = &extraction.records[0];
        assert_eq!(first.course, "MCS011");
        assert_eq!(first.status, "COMPLETED");
        assert_eq!(first.assignment_mark, 80.0);
        assert_eq!(first.theory_mark, 65.0);
        assert_eq!(first.practical_mark, 0.0);

        let second = &extraction.records[1];
        assert_eq!(second.assignment_mark, 0.0);
        assert_eq!(second.practical_mark, 90.0);
        assert_eq!(second.status, "NOT COMPLETED");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let html = r#"<table>
            <tr><th>STATUS</th><th>TERM END PRACTICAL</th><th>COURSE</th>
                <th>TERM END THEORY</th><th>Asgn1</th></tr>
            <tr><td>COMPLETED</td><td>70</td><td>MCSL054</td><td>0</td><td>88</td></tr>
        </table>"#;
        let record = &extract(html).unwrap().records[0];
        assert_eq!(record.course, "MCSL054");
        assert_eq!(record.practical_mark, 70.0);
        assert_eq!(record.assignment_mark, 88.0);
    }

    #[test]
    fn test_short_rows_dropped() {
        let html = table(
            "<tr><td>MCS011</td><td>80</td><td>65</td><td>-</td><td>COMPLETED</td></tr>\
             <tr><td>MCS012</td><td>80</td><td>65</td><td>COMPLETED</td></tr>",
        );
        let extraction = extract(&html).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].course, "MCS011");
    }

    #[test]
    fn test_no_rows_after_filtering() {
        let html = table("<tr><td>MCS012</td><td>80</td><td>65</td><td>COMPLETED</td></tr>");
        assert_eq!(extract(&html), Err(ExtractionError::NoRows));
        assert_eq!(extract(&table("")), Err(ExtractionError::NoRows));
    }

    #[test]
    fn test_missing_course_column() {
        let html = r#"<table>
            <tr><th>SUBJECT</th><th>STATUS</th></tr>
            <tr><td>MCS011</td><td>COMPLETED</td></tr>
        </table>"#;
        assert_eq!(
            extract(html),
            Err(ExtractionError::MissingColumn("COURSE".into()))
        );
    }

    #[test]
    fn test_missing_status_column() {
        let html = r#"<table>
            <tr><th>COURSE</th><th>Asgn1</th><th>TERM END THEORY</th></tr>
            <tr><td>MCS011</td><td>80</td><td>65</td></tr>
        </table>"#;
        assert_eq!(
            extract(html),
            Err(ExtractionError::MissingColumn("STATUS".into()))
        );
    }

    #[test]
    fn test_missing_numeric_column_warns() {
        let html = r#"<table>
            <tr><th>COURSE</th><th>Asgn1</th><th>TERM END THEORY</th><th>STATUS</th></tr>
            <tr><td>MCS011</td><td>80</td><td>65</td><td>COMPLETED</td></tr>
        </table>"#;
        let extraction = extract(html).unwrap();
        assert_eq!(
            extraction.warnings,
            vec![ColumnWarning {
                column: columns::PRACTICAL
            }]
        );
        assert_eq!(extraction.records[0].practical_mark, 0.0);
        assert_eq!(extraction.records[0].theory_mark, 65.0);
    }
}
