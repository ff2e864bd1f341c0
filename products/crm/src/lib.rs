//! CRM vertical slice: funnels, pipeline customers, SLA evaluation, tasks and
//! the customer activity trail.
//!
//! Everything in this crate is synchronous and side-effect free. Callers load
//! records, hand them in, and persist whatever comes back (updated customers,
//! [`ActivityEntry`] audit rows).

pub mod advisor;
pub mod error;
pub mod format;
pub mod funnel;
pub mod goal;
pub mod interaction;
pub mod note;
pub mod pipeline;
pub mod proposal;
pub mod report;
pub mod scoring;
pub mod sla;
pub mod tag;
pub mod task;
pub mod tax_id;
pub mod transition;

pub use advisor::{Advice, Priority, SuggestedAction, advise};
pub use error::{CrmError, CrmResult};
pub use funnel::Funnel;
pub use interaction::{ActivityResult, InteractionKind, NewInteraction, log_interaction};
pub use note::Note;
pub use pipeline::{Customer, NewCustomer};
pub use scoring::{ScoreBreakdown, score};
pub use sla::{SlaStatus, evaluate};
pub use tag::Tag;
pub use task::{Task, TaskKind, TaskPriority, TaskStatus};
pub use transition::{ActivityEntry, ActivityKind, StageTransition, move_stage};
