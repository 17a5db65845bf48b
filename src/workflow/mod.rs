pub mod grade_flow;
pub mod retry;

pub use grade_flow::{FlowFailure, GradeFlow, GradeReport};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
