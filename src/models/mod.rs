pub mod page;
pub mod program;
pub mod record;
pub mod request;
pub mod summary;

pub use page::{ArtifactReason, ClassifiedResponse, DiagnosticArtifact, RawResultPage};
pub use program::{GradecardCategory, ProgramCode};
pub use record::{CourseRecord, ScoredCourseRecord, TotalsRow};
pub use request::{Enrollment, SubmissionRequest};
pub use summary::GradeSummary;
