//! stagehand - hierarchical lifecycle runtime for activatable components
//!
//! Manages trees of long-lived stateful units ("screens"): panels, session
//! handlers, plugin instances, wizard steps. A conductor owns an ordered
//! collection of screens and drives their activation, deactivation, and
//! guarded close negotiation.
//!
//! ## Architecture
//!
//! ```text
//! Conductor (OneActive or AllActive policy)
//! ├── Screen          lifecycle state machine + hooks
//! ├── Screen
//! └── Conductor       conductors are screens, so trees nest
//!     └── Screen
//! ```
//!
//! Closing is negotiated: before a screen transitions to `Closed`, a
//! [`CloseGuard`] polls every affected screen's `can_close` exactly once and
//! combines the answers with logical AND. Answers may resolve immediately or
//! be deferred (a screen awaiting a confirmation decision); no conductor
//! state is mutated until the aggregate verdict is in.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stagehand::{OneActive, Screen, ScreenHandle};
//!
//! let shell = OneActive::new();
//! shell.lock().await.activate().await?;
//! shell.lock().await.activate_item(editor.clone()).await?;
//! ```

pub mod close_guard;
pub mod conductor;
pub mod error;
pub mod events;
pub mod screen;

pub use close_guard::{CloseGuard, CloseVerdict, PollEachGuard};
pub use conductor::{AllActive, Conductor, ConductorHandle, OneActive, ParentRef};
pub use error::LifecycleError;
pub use events::{ActivationProcessed, LifecycleEvent};
pub use screen::{same_screen, try_close, LifecycleNode, Screen, ScreenHandle, ScreenState};
