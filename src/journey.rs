//! Transit journey state machine
//!
//! Pure transitions in the Elm Architecture style: `transition` takes a
//! session and an event and returns the next session plus the effects the
//! runtime should execute. No I/O happens here.

mod effect;
pub mod event;
mod intent;
pub mod replies;
mod scene;
mod state;
mod transition;


pub use effect::Effect;
pub use event::{Event, Notice};
pub use intent::Intent;
pub use scene::Scene;
pub use state::{JourneyContext, NoticeDelays, Session, Step};
pub use transition::{transition, TransitionResult};
