pub mod lab_client;
pub mod store;

pub use lab_client::LabClient;
pub use store::{ParameterStore, TemplateCatalog};
