//! Plugin instance lifecycle state machine
//!
//! ```text
//! BOUND --create(ok)--> ACTIVE --destroy--> DESTROYED
//!   \----create(fail)--> FAILED --destroy--> DESTROYED
//! BOUND --destroy--> DESTROYED
//! ```
//!
//! There is no unbound state: an instance only exists once it has been
//! constructed with its peer context.

use strum_macros::{Display, EnumIter};

/// State of one plugin instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LifecycleState {
    /// Constructed with its peer context, not started
    Bound,
    /// Started successfully; receives messages
    Active,
    /// Start hook reported failure; receives nothing
    Failed,
    /// Torn down; the instance is discarded
    Destroyed,
}

/// Lifecycle calls that change state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleEvent {
    #[strum(serialize = "create")]
    Create { success: bool },
    #[strum(serialize = "destroy")]
    Destroy,
}

impl LifecycleState {
    /// Next state for `event`, or `None` when the transition is not allowed
    pub fn transition(self, event: LifecycleEvent) -> Option<LifecycleState> {
        match (self, event) {
            (LifecycleState::Bound, LifecycleEvent::Create { success: true }) => {
                Some(LifecycleState::Active)
            }
            (LifecycleState::Bound, LifecycleEvent::Create { success: false }) => {
                Some(LifecycleState::Failed)
            }
            (LifecycleState::Destroyed, LifecycleEvent::Destroy) => None,
            (_, LifecycleEvent::Destroy) => Some(LifecycleState::Destroyed),
            (_, LifecycleEvent::Create { .. }) => None,
        }
    }

    /// The start hook may only run from `Bound`
    pub fn can_create(self) -> bool {
        self == LifecycleState::Bound
    }

    /// Trusted-peer messages are delivered only while active
    pub fn can_receive_packets(self) -> bool {
        self == LifecycleState::Active
    }

    /// The unbound-peer channel is open before and after a successful start
    pub fn can_receive_unbound_packets(self) -> bool {
        matches!(self, LifecycleState::Bound | LifecycleState::Active)
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Destroyed
    }
}
