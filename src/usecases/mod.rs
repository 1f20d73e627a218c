//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! collector's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `SourceRouter`: Adapter selection by `AdapterKind`
//! - `VenueRegistry`: Validation-gated venue registration
//! - `Orchestrator`: One fetch-all-venues-and-store run
//! - `scheduler`: Periodic trigger of the orchestrator

pub mod orchestrator;
pub mod registry;
pub mod scheduler;
pub mod sources;

pub use orchestrator::{Orchestrator, RunError, RunOutcome, RunReport};
pub use registry::{Registration, VenueRegistry};
pub use sources::SourceRouter;
