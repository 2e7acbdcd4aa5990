//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod dispatcher;
pub mod facade;
pub mod outbox;
pub mod policy_rule;
pub mod workflow;

pub use dispatcher::{DispatchReport, Dispatcher, EventSink, LoggingSink, MemorySink};
pub use facade::{
    Facade, NewDocumentObligation, NewDocumentVersion, NewLedgerEntry, SideEffects, WriteOutcome,
};
pub use outbox::OutboxRepository;
pub use policy_rule::{CreatePolicyRuleInput, PolicyRuleRepository, SupersedeRuleInput};
pub use workflow::{
    AddTaskInput, InitialTaskInput, StartInstanceInput, StartedInstance, WorkflowRepository,
};
