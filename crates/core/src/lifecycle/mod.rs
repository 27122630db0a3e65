//! The project lifecycle state machine.

pub mod engine;
pub mod flow;
pub mod guards;
pub mod states;
pub mod transitions;

pub use engine::{ensure_transition, transition, transition_to_error};
pub use flow::TextEdit;
pub use guards::Guard;
pub use states::ProjectState;
pub use transitions::{ai_action_for, can_transition, valid_transitions};
