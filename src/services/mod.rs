pub mod artifact_writer;
pub mod classifier;
pub mod score_calculator;
pub mod session_driver;
pub mod table_extractor;
pub mod validator;

pub use artifact_writer::ArtifactWriter;
pub use classifier::classify;
pub use score_calculator::score;
pub use session_driver::{AttemptFailure, SessionDriver};
pub use table_extractor::{extract, ColumnWarning, Extraction};
pub use validator::validate;
