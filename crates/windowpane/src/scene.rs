//! Scene/session context: owns the group registry, the windows and the host
//! layer lists, and exposes the host lifecycle callbacks and frame phases.

use pane_config::{CompositorConfig, EntityData, LayerData, LevelData};
use pane_core::{Color, RenderTargets, SpriteBatch};

use crate::error::{PaneError, Result};
use crate::layer::{self, FrameContext, Layer, SolidLayer};
use crate::params::{Placement, WindowpaneParams};
use crate::registry::{GroupRegistry, Leave};
use crate::visibility::{FlagSource, SessionFlags};
use crate::window::{RenderTurn, WindowId, Windowpane};

/// Windows queued during this frame's render turns for the below/above anchors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeferredPasses {
    below: Vec<WindowId>,
    above: Vec<WindowId>,
}

impl DeferredPasses {
    pub fn push(&mut self, placement: Placement, id: WindowId) {
        match placement {
            Placement::Below => self.below.push(id),
            Placement::Above => self.above.push(id),
            Placement::Inline => tracing::warn!(?id, "inline window queued for a deferred pass"),
        }
    }

    pub fn below(&self) -> &[WindowId] {
        &self.below
    }

    pub fn above(&self) -> &[WindowId] {
        &self.above
    }

    /// Drain one queue; each queued window is drawn at most once per frame.
    pub fn take(&mut self, placement: Placement) -> Vec<WindowId> {
        match placement {
            Placement::Below => std::mem::take(&mut self.below),
            Placement::Above => std::mem::take(&mut self.above),
            Placement::Inline => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.below.clear();
        self.above.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.below.is_empty() && self.above.is_empty()
    }
}

pub struct PaneScene<F: FlagSource = SessionFlags> {
    config: CompositorConfig,
    registry: GroupRegistry,
    /// Indexed by `WindowId`; removed windows leave a hole so ids stay stable
    windows: Vec<Option<Windowpane>>,
    background: Vec<Box<dyn Layer>>,
    foreground: Vec<Box<dyn Layer>>,
    flags: F,
    camera: [f32; 2],
    fade: f32,
    fade_color: Color,
    frame: u64,
    deferred: DeferredPasses,
}

impl PaneScene<SessionFlags> {
    pub fn new(config: CompositorConfig) -> Self {
        Self::with_flags(config, SessionFlags::new())
    }

    /// Build a scene from level data: flags, camera, solid layers, windowpanes.
    pub fn from_level<G: RenderTargets>(
        config: CompositorConfig,
        level: &LevelData,
        gfx: &mut G,
    ) -> Self {
        let mut scene = Self::new(config);
        for (name, value) in &level.flags {
            scene.flags.set(name, *value);
        }
        scene.set_camera(level.camera);
        let solid = |l: &LayerData| Box::new(SolidLayer::from_data(l)) as Box<dyn Layer>;
        scene.set_layers(
            level.background.iter().map(solid).collect(),
            level.foreground.iter().map(solid).collect(),
        );
        for entity in &level.entities {
            scene.add_window(entity, gfx);
        }
        tracing::info!(
            room = level.room.as_deref().unwrap_or(""),
            windows = level.entities.len(),
            groups = scene.registry.len(),
            "level loaded"
        );
        scene
    }
}

impl<F: FlagSource> PaneScene<F> {
    pub fn with_flags(config: CompositorConfig, flags: F) -> Self {
        let registry = GroupRegistry::new(&config);
        Self {
            config,
            registry,
            windows: Vec::new(),
            background: Vec::new(),
            foreground: Vec::new(),
            flags,
            camera: [0.0, 0.0],
            fade: 0.0,
            fade_color: Color::BLACK,
            frame: 0,
            deferred: DeferredPasses::default(),
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut F {
        &mut self.flags
    }

    pub fn camera(&self) -> [f32; 2] {
        self.camera
    }

    /// Camera position; snapped down to whole pixels.
    pub fn set_camera(&mut self, camera: [f32; 2]) {
        self.camera = [camera[0].floor(), camera[1].floor()];
    }

    /// Fade every group composite towards `color`; `amount` is clamped to `0..=1`.
    /// Windows added later pick up the same fade.
    pub fn set_fade(&mut self, amount: f32, color: Color) {
        self.fade = amount.clamp(0.0, 1.0);
        self.fade_color = color;
        for w in self.windows.iter_mut().flatten() {
            w.set_fade(self.fade, self.fade_color);
        }
    }

    pub fn fade(&self) -> (f32, Color) {
        (self.fade, self.fade_color)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn deferred(&self) -> &DeferredPasses {
        &self.deferred
    }

    pub fn background(&self) -> &[Box<dyn Layer>] {
        &self.background
    }

    pub fn foreground(&self) -> &[Box<dyn Layer>] {
        &self.foreground
    }

    /// Replace the host layer lists and rebuild every window's layer subset.
    pub fn set_layers(&mut self, background: Vec<Box<dyn Layer>>, foreground: Vec<Box<dyn Layer>>) {
        self.background = background;
        self.foreground = foreground;
        for w in self.windows.iter_mut().flatten() {
            w.refresh_layers(&self.background, &self.foreground);
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Windowpane> {
        self.windows.get(id.0 as usize)?.as_ref()
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Windowpane> {
        self.windows.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn windows(&self) -> impl Iterator<Item = &Windowpane> {
        self.windows.iter().flatten()
    }

    /// Host "added" callback for a windowpane placed from level data.
    pub fn add_window<G: RenderTargets>(&mut self, data: &EntityData, gfx: &mut G) -> WindowId {
        let params = WindowpaneParams::from_entity(data, &self.config);
        self.add_window_with(&params, gfx)
    }

    pub fn add_window_with<G: RenderTargets>(
        &mut self,
        params: &WindowpaneParams,
        gfx: &mut G,
    ) -> WindowId {
        let id = WindowId(self.windows.len() as u32);
        let mut window = Windowpane::new(id, params, &mut self.flags);
        self.registry.join(window.group_key(), id, false, gfx);
        window.refresh_layers(&self.background, &self.foreground);
        window.set_fade(self.fade, self.fade_color);
        tracing::debug!(
            ?id,
            group = window.group_key(),
            background = window.background().layers().len(),
            foreground = window.foreground().layers().len(),
            "windowpane added"
        );
        self.windows.push(Some(window));
        id
    }

    /// Host "removed" callback. Leadership moves to the next member, or the group goes away.
    pub fn remove_window<G: RenderTargets>(&mut self, id: WindowId, gfx: &mut G) -> Result<Leave> {
        let window = self
            .windows
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(PaneError::UnknownWindow(id))?;
        Ok(self.registry.leave(window.group_key(), id, gfx))
    }

    /// Host "scene end" callback: leaders dispose their targets, then every window goes.
    pub fn end_scene<G: RenderTargets>(&mut self, gfx: &mut G) {
        for w in self.windows.iter().flatten() {
            self.registry.scene_end(w.group_key(), w.id(), gfx);
        }
        self.windows.clear();
        self.deferred.clear();
        tracing::debug!(remaining_groups = self.registry.len(), "scene ended");
    }

    /// Host graphics-device-reset callback. Leaders recreate lost targets.
    pub fn graphics_device_reset<G: RenderTargets>(&mut self, gfx: &mut G) -> usize {
        let mut recreated = 0;
        for w in self.windows.iter().flatten() {
            if self.registry.on_target_lost(w.group_key(), w.id(), gfx) {
                recreated += 1;
            }
        }
        recreated
    }

    /// Camera moved into `room`: its windows take over leadership from
    /// leaders placed in other rooms. Targets are kept.
    pub fn transition_in(&mut self, room: &str) -> usize {
        let mut promoted = 0;
        for w in self.windows.iter().flatten() {
            if w.room() != Some(room) {
                continue;
            }
            let leader_room = self
                .registry
                .leader(w.group_key())
                .and_then(|leader| self.windows.get(leader.0 as usize))
                .and_then(Option::as_ref)
                .and_then(Windowpane::room);
            if leader_room != Some(room) && self.registry.force_leader(w.group_key(), w.id()) {
                promoted += 1;
            }
        }
        promoted
    }

    /// Layers reserved for windowpanes are left out of the host's own layer pass.
    pub fn host_should_draw(&self, layer: &dyn Layer) -> bool {
        layer::host_should_draw(layer, &self.config.exclusive_tag)
    }

    /// Whether the host must keep `layer` visible (un-culled) so groups can draw it.
    pub fn host_keeps_visible(&self, layer: &dyn Layer) -> bool {
        layer::host_keeps_visible(layer, &self.config.exclusive_tag, self.registry.keys())
    }

    fn frame_context(&self) -> FrameContext {
        FrameContext {
            camera: self.camera,
            frame: self.frame,
            surface_size: self.registry.target_size(),
        }
    }

    /// Update phase: start a new frame and fold every window's visibility into its group.
    pub fn update(&mut self) {
        self.frame += 1;
        self.deferred.clear();
        self.registry.begin_frame();
        for w in self.windows.iter_mut().flatten() {
            w.update(&self.flags, &mut self.registry);
        }
    }

    /// Before-render phase: every group leader redraws its target. Returns how many did.
    pub fn before_render<G: RenderTargets + SpriteBatch>(&mut self, gfx: &mut G) -> usize {
        let ctx = self.frame_context();
        let mut composed = 0;
        for w in self.windows.iter().flatten() {
            if w.before_render(
                &mut self.registry,
                &mut self.background,
                &mut self.foreground,
                &ctx,
                gfx,
            ) {
                composed += 1;
            }
        }
        composed
    }

    /// Ids in render order: larger depth first, ties in insertion order.
    pub fn render_order(&self) -> Vec<WindowId> {
        let mut order: Vec<&Windowpane> = self.windows().collect();
        order.sort_by_key(|w| std::cmp::Reverse(w.depth()));
        order.into_iter().map(Windowpane::id).collect()
    }

    /// Render phase: each window's own turn, in render order.
    pub fn render<G: RenderTargets + SpriteBatch>(
        &mut self,
        gfx: &mut G,
    ) -> Vec<(WindowId, RenderTurn)> {
        let mut turns = Vec::new();
        for id in self.render_order() {
            let Some(w) = self.windows.get(id.0 as usize).and_then(Option::as_ref) else {
                continue;
            };
            let turn = w.render(&self.registry, self.camera, &mut self.deferred, gfx);
            turns.push((id, turn));
        }
        turns
    }

    /// "Below main content" injection point.
    pub fn render_below<G: RenderTargets + SpriteBatch>(&mut self, gfx: &mut G) -> usize {
        let ids = self.deferred.take(Placement::Below);
        self.draw_deferred(&ids, gfx)
    }

    /// "Above main content" injection point.
    pub fn render_above<G: RenderTargets + SpriteBatch>(&mut self, gfx: &mut G) -> usize {
        let ids = self.deferred.take(Placement::Above);
        self.draw_deferred(&ids, gfx)
    }

    fn draw_deferred<G: RenderTargets + SpriteBatch>(
        &self,
        ids: &[WindowId],
        gfx: &mut G,
    ) -> usize {
        let mut drawn = 0;
        for &id in ids {
            let Some(w) = self.window(id) else {
                continue;
            };
            let Some(target) = self
                .registry
                .target(w.group_key())
                .filter(|t| gfx.is_target_live(*t))
            else {
                continue;
            };
            w.draw_interior(target, self.camera, gfx);
            drawn += 1;
        }
        drawn
    }
}
