//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod catalog;
pub mod clock;
pub mod executor;
pub mod execution_store;
pub mod suggestion;

pub use catalog::{ActionRepository, RuleRepository, TriggerRepository};
pub use clock::{Clock, SharedClock, SystemClock};
pub use execution_store::ExecutionStore;
pub use executor::ActionExecutor;
pub use suggestion::SuggestionGenerator;
