//! Logical presentation state
//!
//! Scenes, levels, chaos effects and feedback write here; a renderer reads it.
//! Nothing in this module draws anything.

use glam::Vec2;

/// Sparse noise overlay drawn over the whole screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticOverlay {
    pub alpha: f32,
    /// Fraction of cells lit
    pub density: f32,
    pub pixel_size: f32,
    /// Per-frame noise seed
    pub seed: u64,
}

/// Delayed copy of the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ghost {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Full-screen color flash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub color: u32,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Attached presentation roots, bottom to top
    layers: Vec<String>,
    /// Translation applied by chaos effects (shake, zoom anchoring)
    pub chaos_offset: Vec2,
    /// Translation applied by feedback shakes
    pub feedback_offset: Vec2,
    pub scale: f32,
    /// Extra scale from feedback pulses (1.0 = none)
    pub feedback_scale: f32,
    pub color_inverted: bool,
    pub static_overlay: Option<StaticOverlay>,
    pub ghosts: Vec<Ghost>,
    pub flash: Option<Flash>,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            chaos_offset: Vec2::ZERO,
            feedback_offset: Vec2::ZERO,
            scale: 1.0,
            feedback_scale: 1.0,
            color_inverted: false,
            static_overlay: None,
            ghosts: Vec::new(),
            flash: None,
        }
    }
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a presentation root on top. Re-attaching moves it to the top.
    pub fn attach(&mut self, root: &str) {
        self.detach(root);
        self.layers.push(root.to_string());
    }

    pub fn detach(&mut self, root: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l != root);
        before != self.layers.len()
    }

    pub fn is_attached(&self, root: &str) -> bool {
        self.layers.iter().any(|l| l == root)
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Combined translation of the whole stage
    pub fn offset(&self) -> Vec2 {
        self.chaos_offset + self.feedback_offset
    }

    /// Clear everything chaos effects may have left behind
    pub fn reset_chaos_visuals(&mut self) {
        self.chaos_offset = Vec2::ZERO;
        self.scale = 1.0;
        self.color_inverted = false;
        self.static_overlay = None;
        self.ghosts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_detach() {
        let mut stage = Stage::new();
        stage.attach("splash");
        stage.attach("gameplay");
        stage.attach("splash");
        assert_eq!(stage.layers(), &["gameplay".to_string(), "splash".to_string()]);
        assert!(stage.detach("gameplay"));
        assert!(!stage.detach("gameplay"));
        assert!(!stage.is_attached("gameplay"));
    }
}
