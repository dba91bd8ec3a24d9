//! Interactive preview of the action tree being configured.
//!
//! Split into the node vocabulary ([`node`]) and the session state machine
//! ([`session`]) that walks one line at a time against an
//! [`crate::provider::ActionProvider`].

pub mod node;
pub mod session;

pub use node::{ActionLabel, ActionNode, CandidateCard, LegalAction, Side, Street};
pub use session::{ChoiceReply, PreviewError, PreviewSession, StagedChoice};
