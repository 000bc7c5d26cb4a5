pub mod exam_session;

pub use exam_session::{BatchReport, ExamSession, TemplateApplication};
