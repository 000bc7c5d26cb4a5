pub mod exam;
mod id;
pub mod loaders;
pub mod result;
pub mod sheet;
pub mod staging;
pub mod template;

pub use exam::ExamStatus;
pub use loaders::{load_all_sheets, load_sheet};
pub use result::{name_key, ResultPayload, ResultRecord};
pub use sheet::{ResultSheet, SheetValue};
pub use staging::{StagingEntry, StagingField, StagingMode};
pub use template::{ExamType, ParameterDefinition, Template, TemplateDetail};
