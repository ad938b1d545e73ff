pub mod exam;
pub mod machine;
pub mod result;
pub mod timer;

pub use exam::ExamSession;
pub use machine::{AnswerOutcome, ExamMachine, ExamPhase, ExamSettings};
pub use result::{AttemptOverview, AttemptSummary, ExamReport, FinishReason, ReviewEntry};
pub use timer::{Countdown, TickOutcome, Urgency};
