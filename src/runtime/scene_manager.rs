//! Scene registry and lifecycle driver
//!
//! Owns the single current-scene slot. A switch runs to completion before it
//! returns: exit old → detach → `scene:exited` → init once → attach → enter →
//! `scene:entered`. Scenes never hold the manager, so they cannot switch from
//! inside their own hooks; they queue requests on the context instead.

use std::collections::HashMap;

use super::events::{EventBus, GameEvent};
use super::stage::Stage;
use crate::error::SceneError;

/// Services the manager needs from whatever context scenes run in
pub trait SceneHost {
    fn bus(&self) -> &EventBus;
    fn stage_mut(&mut self) -> &mut Stage;
}

/// Lifecycle hooks every scene provides
pub trait SceneLifecycle {
    type Context: SceneHost;
    /// Scene-defined switch payload
    type Data;

    /// Called once, on first activation
    fn init(&mut self, ctx: &mut Self::Context);
    fn enter(&mut self, data: Self::Data, ctx: &mut Self::Context);
    fn update(&mut self, dt: f32, ctx: &mut Self::Context);
    fn exit(&mut self, ctx: &mut Self::Context);
}

struct SceneSlot<S> {
    scene: S,
    initialized: bool,
}

pub struct SceneManager<S: SceneLifecycle> {
    scenes: HashMap<String, SceneSlot<S>>,
    current: Option<String>,
}

impl<S: SceneLifecycle> Default for SceneManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SceneLifecycle> SceneManager<S> {
    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            current: None,
        }
    }

    /// Bind a scene to a name. Replaces any scene already under that name.
    pub fn register(&mut self, name: &str, scene: S) {
        self.scenes.insert(
            name.to_string(),
            SceneSlot {
                scene,
                initialized: false,
            },
        );
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.scenes.get(name).is_some_and(|s| s.initialized)
    }

    pub fn get(&self, name: &str) -> Option<&S> {
        self.scenes.get(name).map(|s| &s.scene)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut S> {
        self.scenes.get_mut(name).map(|s| &mut s.scene)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&S> {
        self.current.as_deref().and_then(|name| self.get(name))
    }

    pub fn current_mut(&mut self) -> Option<&mut S> {
        let name = self.current.clone()?;
        self.get_mut(&name)
    }

    /// Make `name` the current scene. An unknown name is logged and leaves
    /// every scene untouched.
    pub fn switch_to(
        &mut self,
        name: &str,
        data: S::Data,
        ctx: &mut S::Context,
    ) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            log::error!("Scene \"{}\" not found", name);
            return Err(SceneError::Unregistered(name.to_string()));
        }

        if let Some(previous) = self.current.take() {
            if let Some(slot) = self.scenes.get_mut(&previous) {
                slot.scene.exit(ctx);
            }
            ctx.stage_mut().detach(&previous);
            ctx.bus().publish(GameEvent::SceneExited(previous));
        }

        self.current = Some(name.to_string());
        // Presence checked above; exiting the previous scene never unregisters
        if let Some(slot) = self.scenes.get_mut(name) {
            if !slot.initialized {
                slot.scene.init(ctx);
                slot.initialized = true;
            }
            ctx.stage_mut().attach(name);
            slot.scene.enter(data, ctx);
        }
        log::info!("Entered scene {}", name);
        ctx.bus().publish(GameEvent::SceneEntered(name.to_string()));
        Ok(())
    }

    /// Forward a frame to the current scene only
    pub fn update(&mut self, dt: f32, ctx: &mut S::Context) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        if let Some(slot) = self.scenes.get_mut(name) {
            slot.scene.update(dt, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::events::{EventLog, Topic};
    use std::rc::Rc;

    struct TestHost {
        bus: Rc<EventBus>,
        stage: Stage,
        calls: Vec<String>,
    }

    impl SceneHost for TestHost {
        fn bus(&self) -> &EventBus {
            &self.bus
        }
        fn stage_mut(&mut self) -> &mut Stage {
            &mut self.stage
        }
    }

    struct Recorder(&'static str);

    impl SceneLifecycle for Recorder {
        type Context = TestHost;
        type Data = u32;

        fn init(&mut self, ctx: &mut TestHost) {
            ctx.calls.push(format!("{}:init", self.0));
        }
        fn enter(&mut self, data: u32, ctx: &mut TestHost) {
            ctx.calls.push(format!("{}:enter:{}", self.0, data));
        }
        fn update(&mut self, _dt: f32, ctx: &mut TestHost) {
            ctx.calls.push(format!("{}:update", self.0));
        }
        fn exit(&mut self, ctx: &mut TestHost) {
            ctx.calls.push(format!("{}:exit", self.0));
        }
    }

    fn setup() -> (SceneManager<Recorder>, TestHost) {
        let mut manager = SceneManager::new();
        manager.register("a", Recorder("a"));
        manager.register("b", Recorder("b"));
        let host = TestHost {
            bus: Rc::new(EventBus::new()),
            stage: Stage::new(),
            calls: Vec::new(),
        };
        (manager, host)
    }

    #[test]
    fn test_switch_runs_lifecycle_in_order() {
        let (mut manager, mut host) = setup();
        let log = EventLog::new();
        log.attach(&host.bus, &[Topic::SceneEntered, Topic::SceneExited]);

        manager.switch_to("a", 1, &mut host).unwrap();
        manager.switch_to("b", 2, &mut host).unwrap();
        manager.switch_to("a", 3, &mut host).unwrap();

        assert_eq!(
            host.calls,
            vec!["a:init", "a:enter:1", "a:exit", "b:init", "b:enter:2", "b:exit", "a:enter:3"]
        );
        assert_eq!(
            log.events(),
            vec![
                GameEvent::SceneEntered("a".into()),
                GameEvent::SceneExited("a".into()),
                GameEvent::SceneEntered("b".into()),
                GameEvent::SceneExited("b".into()),
                GameEvent::SceneEntered("a".into()),
            ]
        );
        assert_eq!(host.stage.layers(), &["a".to_string()]);
    }

    #[test]
    fn test_switch_to_unregistered_is_noop() {
        let (mut manager, mut host) = setup();
        manager.switch_to("a", 1, &mut host).unwrap();
        host.calls.clear();

        let result = manager.switch_to("nonexistent", 0, &mut host);
        assert_eq!(result, Err(SceneError::Unregistered("nonexistent".into())));
        assert_eq!(manager.current_name(), Some("a"));
        assert!(host.calls.is_empty());
        assert!(host.stage.is_attached("a"));
    }

    #[test]
    fn test_switch_to_current_scene_reenters_it() {
        let (mut manager, mut host) = setup();
        manager.switch_to("a", 1, &mut host).unwrap();
        manager.switch_to("a", 2, &mut host).unwrap();
        assert_eq!(host.calls, vec!["a:init", "a:enter:1", "a:exit", "a:enter:2"]);
        assert_eq!(manager.current_name(), Some("a"));
        assert_eq!(host.stage.layers(), &["a".to_string()]);
    }

    #[test]
    fn test_update_reaches_current_scene_only() {
        let (mut manager, mut host) = setup();
        manager.update(1.0, &mut host);
        assert!(host.calls.is_empty());

        manager.switch_to("b", 0, &mut host).unwrap();
        host.calls.clear();
        manager.update(1.0, &mut host);
        assert_eq!(host.calls, vec!["b:update"]);
        assert!(manager.is_initialized("b"));
        assert!(!manager.is_initialized("a"));
    }
}
