//! Run-time services shared by every scene
//!
//! Everything here is single-threaded and driven by the one per-frame tick:
//! - No background work, no cross-thread delivery
//! - Pointer events mutate input state immediately when they arrive
//! - Every service is owned by a `Game` session, never global

pub mod events;
pub mod feedback;
pub mod input;
pub mod scene_manager;
pub mod stage;
pub mod state_machine;
pub mod timer;

pub use events::{EventBus, EventLog, GameEvent, HandlerResult, SubscriptionId, Topic};
pub use feedback::FeedbackManager;
pub use input::{Bounds, InputEvent, InputManager, InputState, KeyInput, Modifiers};
pub use scene_manager::{SceneHost, SceneLifecycle, SceneManager};
pub use stage::{Flash, Ghost, Stage, StaticOverlay};
pub use state_machine::{GameMode, StateMachine};
pub use timer::Timer;
