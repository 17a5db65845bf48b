use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;

/// 成绩单类别（对应页面下拉框 ddlGradecardfor）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum GradecardCategory {
    /// BCA/MCA/MP/PGDCA etc.
    #[default]
    Professional = 1,
    /// BDP/BA/B.COM/B.Sc./ASSO Programmes
    Bachelor = 2,
    /// CBCS Programmes
    Cbcs = 3,
    /// Other Programmes
    Other = 4,
}

impl GradecardCategory {
    pub const ALL: [GradecardCategory; 4] = [
        GradecardCategory::Professional,
        GradecardCategory::Bachelor,
        GradecardCategory::Cbcs,
        GradecardCategory::Other,
    ];

    /// 提交给页面的值
    pub fn value(self) -> &'static str {
        match self {
            GradecardCategory::Professional => "1",
            GradecardCategory::Bachelor => "2",
            GradecardCategory::Cbcs => "3",
            GradecardCategory::Other => "4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradecardCategory::Professional => "BCA/MCA/MP/PGDCA etc.",
            GradecardCategory::Bachelor => "BDP/BA/B.COM/B.Sc./ASSO Programmes",
            GradecardCategory::Cbcs => "CBCS Programmes",
            GradecardCategory::Other => "Other Programmes",
        }
    }
}

impl FromStr for GradecardCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.value() == s.trim())
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for GradecardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

/// 专业代码（对应页面下拉框 ddlProgram）
///
/// 只接受允许列表中的代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ProgramCode {
    Bca,
    BcaOl,
    BcaNew,
    BcaNewOl,
    Mbf,
    Mca,
    #[default]
    McaOl,
    McaNew,
    McaNewOl,
    Mp,
    Mpb,
    Pgdca,
    PgdcaNew,
    Pgdhrm,
    Pgdfm,
    Pgdom,
    Pgdmm,
    Pgdfmp,
}

impl ProgramCode {
    pub const ALL: [ProgramCode; 18] = [
        ProgramCode::Bca,
        ProgramCode::BcaOl,
        ProgramCode::BcaNew,
        ProgramCode::BcaNewOl,
        ProgramCode::Mbf,
        ProgramCode::Mca,
        ProgramCode::McaOl,
        ProgramCode::McaNew,
        ProgramCode::McaNewOl,
        ProgramCode::Mp,
        ProgramCode::Mpb,
        ProgramCode::Pgdca,
        ProgramCode::PgdcaNew,
        ProgramCode::Pgdhrm,
        ProgramCode::Pgdfm,
        ProgramCode::Pgdom,
        ProgramCode::Pgdmm,
        ProgramCode::Pgdfmp,
    ];

    /// 获取页面使用的代码
    pub fn code(self) -> &'static str {
        match self {
            ProgramCode::Bca => "BCA",
            ProgramCode::BcaOl => "BCAOL",
            ProgramCode::BcaNew => "BCA_NEW",
            ProgramCode::BcaNewOl => "BCA_NEWOL",
            ProgramCode::Mbf => "MBF",
            ProgramCode::Mca => "MCA",
            ProgramCode::McaOl => "MCAOL",
            ProgramCode::McaNew => "MCA_NEW",
            ProgramCode::McaNewOl => "MCA_NEWOL",
            ProgramCode::Mp => "MP",
            ProgramCode::Mpb => "MPB",
            ProgramCode::Pgdca => "PGDCA",
            ProgramCode::PgdcaNew => "PGDCA_NEW",
            ProgramCode::Pgdhrm => "PGDHRM",
            ProgramCode::Pgdfm => "PGDFM",
            ProgramCode::Pgdom => "PGDOM",
            ProgramCode::Pgdmm => "PGDMM",
            ProgramCode::Pgdfmp => "PGDFMP",
        }
    }

    /// 从代码解析（忽略大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
    }
}

impl FromStr for ProgramCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ValidationError::UnknownProgram(s.to_string()))
    }
}

impl fmt::Display for ProgramCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
