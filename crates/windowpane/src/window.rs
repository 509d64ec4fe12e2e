//! The windowpane element: a screen rectangle that shows its group's shared target.

use pane_core::{BlendMode, Color, Rect, RenderTargets, SpriteBatch, TargetId};

use crate::forceful::ForcefulRenderer;
use crate::layer::{FrameContext, Layer, TagSet};
use crate::params::{Placement, WindowpaneParams};
use crate::registry::GroupRegistry;
use crate::scene::DeferredPasses;
use crate::visibility::{FlagPredicate, FlagSource};

/// Stable handle of a window within its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

/// What a window did on its render turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTurn {
    /// Predicate false this frame.
    Hidden,
    /// Group target absent or lost; retried next frame.
    NoTarget,
    /// Interior composite drawn immediately.
    Inline,
    /// Queued for the below/above pass.
    Deferred(Placement),
}

pub struct Windowpane {
    id: WindowId,
    bounds: Rect,
    node: Option<[f32; 2]>,
    depth: i32,
    pub wipe_color: Color,
    pub overlay_color: Color,
    pub blend: BlendMode,
    pub placement: Placement,
    pub punch_through: bool,
    predicate: FlagPredicate,
    group_key: String,
    room: Option<String>,
    background: ForcefulRenderer,
    foreground: ForcefulRenderer,
    visible_this_frame: bool,
}

impl Windowpane {
    pub fn new(id: WindowId, params: &WindowpaneParams, flags: &mut impl FlagSource) -> Self {
        Self {
            id,
            bounds: params.bounds,
            node: params.node,
            depth: params.depth,
            wipe_color: params.wipe_color,
            overlay_color: params.overlay_color,
            blend: params.blend,
            placement: params.placement,
            punch_through: params.punch_through,
            predicate: FlagPredicate::compile(&params.visibility_flags, flags),
            group_key: params.group_key.clone(),
            room: params.room.clone(),
            background: ForcefulRenderer::default(),
            foreground: ForcefulRenderer::default(),
            visible_this_frame: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_position(&mut self, position: [f32; 2]) {
        self.bounds.x = position[0];
        self.bounds.y = position[1];
    }

    pub fn set_node(&mut self, node: Option<[f32; 2]>) {
        self.node = node;
    }

    pub fn visible_this_frame(&self) -> bool {
        self.visible_this_frame
    }

    pub fn background(&self) -> &ForcefulRenderer {
        &self.background
    }

    pub fn foreground(&self) -> &ForcefulRenderer {
        &self.foreground
    }

    /// Fade the group composite towards `color` after the background layers.
    pub fn set_fade(&mut self, amount: f32, color: Color) {
        self.background.set_fade(amount, color);
    }

    /// Rebuild both layer subsets: layers tagged with this window's group key.
    pub fn refresh_layers(&mut self, background: &[Box<dyn Layer>], foreground: &[Box<dyn Layer>]) {
        let required: TagSet = [self.group_key.as_str()].into_iter().collect();
        self.background.refresh(background, &required);
        self.foreground.refresh(foreground, &required);
    }

    /// Where the shared target is sampled: node (or position) relative to the camera.
    pub fn source_rect(&self, camera: [f32; 2]) -> Rect {
        let [x, y] = self.node.unwrap_or(self.bounds.origin());
        Rect::new(x, y, self.bounds.w, self.bounds.h).relative_to(camera)
    }

    /// Evaluate the predicate and fold it into the group aggregate.
    pub fn update(&mut self, flags: &impl FlagSource, registry: &mut GroupRegistry) {
        self.visible_this_frame = self.predicate.evaluate(flags);
        registry.fold_visibility(&self.group_key, self.visible_this_frame);
    }

    /// Leader-only: redraw the group target from the tagged layers.
    ///
    /// Returns whether the target was redrawn.
    pub fn before_render<G: RenderTargets + SpriteBatch>(
        &self,
        registry: &mut GroupRegistry,
        background: &mut [Box<dyn Layer>],
        foreground: &mut [Box<dyn Layer>],
        ctx: &FrameContext,
        gfx: &mut G,
    ) -> bool {
        if !registry.is_leader(&self.group_key, self.id) {
            return false;
        }

        self.background.before_render(background, ctx);
        self.foreground.before_render(foreground, ctx);

        if !registry.any_visible(&self.group_key) {
            return false;
        }
        let Some(target) = registry.ensure_target(&self.group_key, gfx) else {
            return false;
        };

        let ambient = gfx.batch_blend();
        if ambient.is_some() {
            gfx.end();
        }

        gfx.bind_target(Some(target));
        gfx.clear(Color::TRANSPARENT);
        let target_ctx = FrameContext {
            surface_size: registry.target_size(),
            ..*ctx
        };
        self.background.render(background, &target_ctx, gfx, true);
        self.foreground.render(foreground, &target_ctx, gfx, true);
        gfx.bind_target(None);

        if let Some(blend) = ambient {
            gfx.begin(blend);
        }
        true
    }

    /// The window's own render turn.
    pub fn render<G: RenderTargets + SpriteBatch>(
        &self,
        registry: &GroupRegistry,
        camera: [f32; 2],
        deferred: &mut DeferredPasses,
        gfx: &mut G,
    ) -> RenderTurn {
        if !self.visible_this_frame {
            return RenderTurn::Hidden;
        }
        let Some(target) = registry
            .target(&self.group_key)
            .filter(|t| gfx.is_target_live(*t))
        else {
            return RenderTurn::NoTarget;
        };

        if self.punch_through {
            self.punch(gfx);
        }

        match self.placement {
            Placement::Inline => {
                self.draw_interior(target, camera, gfx);
                RenderTurn::Inline
            }
            placement => {
                deferred.push(placement, self.id);
                RenderTurn::Deferred(placement)
            }
        }
    }

    /// Clear whatever was drawn underneath the window rectangle.
    fn punch<G: SpriteBatch>(&self, gfx: &mut G) {
        let ambient = gfx.batch_blend();
        if ambient.is_some() {
            gfx.end();
        }
        gfx.begin(BlendMode::Opaque);
        gfx.fill_rect(self.bounds, Color::TRANSPARENT);
        gfx.end();
        if let Some(blend) = ambient {
            gfx.begin(blend);
        }
    }

    /// Wipe fill plus the tinted shared target, in this window's blend state.
    pub fn draw_interior<G: SpriteBatch>(&self, target: TargetId, camera: [f32; 2], gfx: &mut G) {
        let ambient = gfx.batch_blend();
        let switched = ambient != Some(self.blend);
        if switched {
            if ambient.is_some() {
                gfx.end();
            }
            gfx.begin(self.blend);
        }

        gfx.fill_rect(self.bounds, self.wipe_color);
        gfx.draw_target(target, self.bounds.origin(), self.source_rect(camera), self.overlay_color);

        if switched {
            gfx.end();
            if let Some(blend) = ambient {
                gfx.begin(blend);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pane_config::CompositorConfig;
    use pane_core::{Command, Painter};

    use super::*;
    use crate::layer::SolidLayer;
    use crate::visibility::SessionFlags;

    fn pane(id: u32, params: WindowpaneParams, flags: &mut SessionFlags) -> Windowpane {
        Windowpane::new(WindowId(id), &params, flags)
    }

    fn params(key: &str) -> WindowpaneParams {
        WindowpaneParams {
            bounds: Rect::new(40.0, 20.0, 16.0, 24.0),
            group_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn source_rect_uses_node_or_position() {
        let mut flags = SessionFlags::new();
        let mut w = pane(1, params("sky"), &mut flags);
        assert_eq!(w.source_rect([10.0, 5.0]), Rect::new(30.0, 15.0, 16.0, 24.0));
        w.set_node(Some([100.0, 60.0]));
        assert_eq!(w.source_rect([10.0, 5.0]), Rect::new(90.0, 55.0, 16.0, 24.0));
    }

    #[test]
    fn refresh_layers_filters_by_group_key() {
        let mut flags = SessionFlags::new();
        let mut w = pane(1, params("sky"), &mut flags);
        let bg: Vec<Box<dyn Layer>> = vec![
            Box::new(SolidLayer::new("a", "sky", Color::WHITE, Rect::default())),
            Box::new(SolidLayer::new("b", "sea", Color::WHITE, Rect::default())),
        ];
        let fg: Vec<Box<dyn Layer>> = vec![Box::new(SolidLayer::new(
            "c",
            "sea,sky",
            Color::WHITE,
            Rect::default(),
        ))];
        w.refresh_layers(&bg, &fg);
        assert_eq!(w.background().layers(), &[0]);
        assert_eq!(w.foreground().layers(), &[0]);
    }

    #[test]
    fn empty_group_key_matches_no_layer() {
        let mut flags = SessionFlags::new();
        let mut w = pane(1, params(""), &mut flags);
        let bg: Vec<Box<dyn Layer>> = vec![
            Box::new(SolidLayer::new("a", "", Color::WHITE, Rect::default())),
            Box::new(SolidLayer::new("b", "sky", Color::WHITE, Rect::default())),
        ];
        w.refresh_layers(&bg, &[]);
        assert!(w.background().is_empty());
        assert!(w.foreground().is_empty());
    }

    #[test]
    fn inline_render_draws_interior_once() {
        let mut flags = SessionFlags::new();
        let mut reg = GroupRegistry::new(&CompositorConfig::default());
        let mut gfx = Painter::begin_frame(BlendMode::AlphaBlend);
        let mut w = pane(1, params("sky"), &mut flags);
        reg.join("sky", w.id(), false, &mut gfx);
        let target = reg.target("sky").unwrap();

        reg.begin_frame();
        w.update(&flags, &mut reg);
        let mut deferred = DeferredPasses::default();
        let turn = w.render(&reg, [8.0, 4.0], &mut deferred, &mut gfx);

        assert_eq!(turn, RenderTurn::Inline);
        assert!(deferred.is_empty());
        let blits = gfx.display_list().blits_of(target);
        assert_eq!(blits.len(), 1);
        match blits[0] {
            Command::DrawTarget { dest, src, tint, blend, .. } => {
                assert_eq!(*dest, [40.0, 20.0]);
                assert_eq!(*src, Rect::new(32.0, 16.0, 16.0, 24.0));
                assert_eq!(*tint, Color::WHITE);
                assert_eq!(*blend, Some(BlendMode::AlphaBlend));
            }
            _ => unreachable!(),
        }
        // same blend as ambient: no batch restart
        assert_eq!(gfx.display_list().begins(), 1);
    }

    #[test]
    fn interior_switches_and_restores_blend() {
        let mut flags = SessionFlags::new();
        let w = pane(
            1,
            WindowpaneParams {
                blend: BlendMode::Additive,
                ..params("sky")
            },
            &mut flags,
        );
        let mut gfx = Painter::begin_frame(BlendMode::AlphaBlend);
        let target = gfx.create_target("t", 320, 180);
        w.draw_interior(target, [0.0, 0.0], &mut gfx);

        let cmds = &gfx.display_list().commands;
        let tail: Vec<&Command> = cmds.iter().skip_while(|c| !matches!(c, Command::End)).collect();
        assert!(matches!(tail[0], Command::End));
        assert!(matches!(tail[1], Command::Begin(BlendMode::Additive)));
        assert!(matches!(tail[2], Command::FillRect { color, .. } if *color == Color::BLACK));
        assert!(matches!(tail[3], Command::DrawTarget { .. }));
        assert!(matches!(tail[4], Command::End));
        assert!(matches!(tail[5], Command::Begin(BlendMode::AlphaBlend)));
        assert_eq!(gfx.batch_blend(), Some(BlendMode::AlphaBlend));
    }

    #[test]
    fn punch_through_clears_at_opaque_then_defers() {
        let mut flags = SessionFlags::new();
        let mut reg = GroupRegistry::new(&CompositorConfig::default());
        let mut gfx = Painter::begin_frame(BlendMode::AlphaBlend);
        let mut w = pane(
            1,
            WindowpaneParams {
                punch_through: true,
                placement: Placement::Below,
                ..params("sky")
            },
            &mut flags,
        );
        reg.join("sky", w.id(), false, &mut gfx);
        let target = reg.target("sky").unwrap();
        w.update(&flags, &mut reg);

        let mut deferred = DeferredPasses::default();
        let turn = w.render(&reg, [0.0, 0.0], &mut deferred, &mut gfx);
        assert_eq!(turn, RenderTurn::Deferred(Placement::Below));
        assert_eq!(deferred.below(), &[WindowId(1)]);
        assert!(gfx.display_list().blits_of(target).is_empty());

        let fills = gfx.display_list().fills_on(None);
        assert_eq!(fills.len(), 1);
        assert!(matches!(
            fills[0],
            Command::FillRect { color, blend: Some(BlendMode::Opaque), .. }
                if *color == Color::TRANSPARENT
        ));
        assert_eq!(gfx.batch_blend(), Some(BlendMode::AlphaBlend));
    }

    #[test]
    fn hidden_or_targetless_windows_draw_nothing() {
        let mut flags = SessionFlags::new();
        let mut reg = GroupRegistry::new(&CompositorConfig::default());
        let mut gfx = Painter::new();
        let mut w = pane(
            1,
            WindowpaneParams {
                visibility_flags: "on".into(),
                ..params("sky")
            },
            &mut flags,
        );
        reg.join("sky", w.id(), false, &mut gfx);
        let mut deferred = DeferredPasses::default();

        w.update(&flags, &mut reg);
        assert_eq!(w.render(&reg, [0.0, 0.0], &mut deferred, &mut gfx), RenderTurn::Hidden);

        flags.set("on", true);
        w.update(&flags, &mut reg);
        gfx.lose_device();
        let before = gfx.display_list().len();
        assert_eq!(w.render(&reg, [0.0, 0.0], &mut deferred, &mut gfx), RenderTurn::NoTarget);
        assert_eq!(gfx.display_list().len(), before);
    }

    #[test]
    fn only_leader_composes_and_only_when_visible() {
        let mut flags = SessionFlags::new();
        let mut reg = GroupRegistry::new(&CompositorConfig::default());
        let mut gfx = Painter::new();
        let hidden = SolidLayer::new("a", "sky", Color::WHITE, Rect::new(0.0, 0.0, 8.0, 8.0));
        let hidden = hidden.hidden();
        let mut bg: Vec<Box<dyn Layer>> = vec![Box::new(hidden)];
        let mut fg: Vec<Box<dyn Layer>> = Vec::new();

        let gated = || WindowpaneParams {
            visibility_flags: "on".into(),
            ..params("sky")
        };
        let mut leader = pane(1, gated(), &mut flags);
        let mut member = pane(2, gated(), &mut flags);
        for w in [&mut leader, &mut member] {
            reg.join("sky", w.id(), false, &mut gfx);
            w.refresh_layers(&bg, &fg);
        }
        let target = reg.target("sky").unwrap();
        let ctx = FrameContext::default();

        // nobody visible: pre-pass only
        reg.begin_frame();
        leader.update(&flags, &mut reg);
        member.update(&flags, &mut reg);
        assert!(!leader.before_render(&mut reg, &mut bg, &mut fg, &ctx, &mut gfx));
        assert_eq!(gfx.display_list().clears_of(target), 0);

        flags.set("on", true);
        reg.begin_frame();
        leader.update(&flags, &mut reg);
        member.update(&flags, &mut reg);
        assert!(!member.before_render(&mut reg, &mut bg, &mut fg, &ctx, &mut gfx));
        assert!(leader.before_render(&mut reg, &mut bg, &mut fg, &ctx, &mut gfx));

        let list = gfx.display_list();
        assert_eq!(list.clears_of(target), 1);
        assert_eq!(list.fills_on(Some(target)).len(), 1);
        assert_eq!(gfx.bound_target(), None);
        assert!(!bg[0].visible());
    }
}
