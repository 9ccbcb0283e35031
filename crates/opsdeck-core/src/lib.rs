//! opsdeck-core: pure console-core state machines.
//! Time-window context, alert subscription routing, per-kind filtering,
//! and the typed in-process event bus. No IO, no async — all clock values
//! are passed in as parameters.

pub mod bus;
pub mod kinds;
pub mod subscription;
pub mod time_window;
pub mod types;

pub use bus::{ConsoleEvent, EventBus, ListenerHandle};
pub use subscription::{DispatchOutcome, SubscriptionRouter};
pub use time_window::{TimeWindowContext, WindowSnapshot};
pub use types::{Alert, AlertQuery, AlertQueryResult, AlertStatus, ConsoleError, Persona};
