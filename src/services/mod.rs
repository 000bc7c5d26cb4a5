pub mod batch_coordinator;
pub mod completion_gate;
pub mod reconciler;
pub mod selection;
pub mod staging_ledger;
pub mod template_resolver;

pub use batch_coordinator::{BatchCoordinator, BatchOutcome};
pub use completion_gate::{can_complete, CompletionGate, CompletionOutcome};
pub use reconciler::{reconcile, ReconcileStatus, Reconciliation};
pub use selection::SelectionSet;
pub use staging_ledger::{LedgerCommit, StagingLedger};
pub use template_resolver::TemplateResolver;
