//! Dispatch & reveal engine
//!
//! A pure transition function over [`EngineState`], plus the controller
//! that executes the resulting effects: appending messages, dispatching the
//! request, and running the cancellable reveal.

mod controller;
mod effect;
mod event;
mod reveal;
mod state;
mod transition;


pub use controller::{ChatController, SubmitRejected};
pub use effect::Effect;
pub use event::Event;
pub use reveal::{Reveal, RevealOutcome};
pub use state::EngineState;
pub use transition::{transition, TransitionError, TransitionResult, IMAGE_PLACEHOLDER};
