//! Layer rendering that ignores each layer's own visibility.
//!
//! A group leader uses this to draw its tagged layers into the shared target
//! even when the host has hidden or culled them for the main view. Each layer's
//! visibility flag is forced on for the duration of its calls and restored
//! afterwards, so the host's own pass over the same layers is unaffected.

use std::cell::Cell;

use pane_core::{BlendMode, Color, Rect, SpriteBatch};

use crate::layer::{FrameContext, Layer, TagSet};

thread_local! {
    static FORCEFUL_RENDERING: Cell<bool> = const { Cell::new(false) };
}

/// True while a [`ForcefulRenderer`] pass is running on this render thread.
///
/// Layers that would normally skip themselves can check this to tell a
/// windowpane draw apart from the host's own pass.
pub fn is_forceful_rendering() -> bool {
    FORCEFUL_RENDERING.with(Cell::get)
}

struct RenderingGuard;

impl RenderingGuard {
    fn acquire() -> Option<Self> {
        FORCEFUL_RENDERING.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(RenderingGuard)
            }
        })
    }
}

impl Drop for RenderingGuard {
    fn drop(&mut self) {
        FORCEFUL_RENDERING.with(|flag| flag.set(false));
    }
}

fn with_forced_visible<R>(layer: &mut dyn Layer, f: impl FnOnce(&mut dyn Layer) -> R) -> R {
    let was_visible = layer.visible();
    layer.set_visible(true);
    let out = f(layer);
    layer.set_visible(was_visible);
    out
}

/// Draws a fixed subset of a layer list, by index, in list order.
#[derive(Clone, Debug)]
pub struct ForcefulRenderer {
    layers: Vec<usize>,
    /// Fade overlay strength, 0 disables it
    pub fade: f32,
    pub fade_color: Color,
}

impl Default for ForcefulRenderer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ForcefulRenderer {
    pub fn new(layers: Vec<usize>) -> Self {
        Self {
            layers,
            fade: 0.0,
            fade_color: Color::BLACK,
        }
    }

    /// Fade the composite towards `color`; `amount` is clamped to `0..=1`.
    pub fn set_fade(&mut self, amount: f32, color: Color) {
        self.fade = amount.clamp(0.0, 1.0);
        self.fade_color = color;
    }

    /// Keep the layers whose tag set contains every tag in `required`.
    /// Fade settings are left alone.
    pub fn refresh(&mut self, layers: &[Box<dyn Layer>], required: &TagSet) {
        self.layers = layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.tags().is_superset(required))
            .map(|(index, _)| index)
            .collect();
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Let every layer prepare before anything is drawn this frame.
    pub fn before_render(&self, layers: &mut [Box<dyn Layer>], ctx: &FrameContext) {
        let Some(_guard) = RenderingGuard::acquire() else {
            tracing::warn!("nested forceful pre-pass refused");
            return;
        };
        for &index in &self.layers {
            let Some(layer) = layers.get_mut(index) else {
                continue;
            };
            with_forced_visible(layer.as_mut(), |layer| layer.before_render(ctx));
        }
    }

    /// Draw every layer into whatever surface is bound, closing the batch at the end.
    ///
    /// The batch is only restarted when a layer's blend preference or its
    /// shared/immediate mode differs from the current one.
    pub fn render(
        &self,
        layers: &mut [Box<dyn Layer>],
        ctx: &FrameContext,
        batch: &mut dyn SpriteBatch,
        draw_fade: bool,
    ) {
        let Some(_guard) = RenderingGuard::acquire() else {
            tracing::warn!("nested forceful render refused");
            return;
        };

        let mut blend = BlendMode::AlphaBlend;
        let mut in_batch = false;

        for &index in &self.layers {
            let Some(layer) = layers.get_mut(index) else {
                continue;
            };
            with_forced_visible(layer.as_mut(), |layer| {
                if let Some(wanted) = layer.blend_preference() {
                    if wanted != blend {
                        if in_batch {
                            batch.end();
                            in_batch = false;
                        }
                        blend = wanted;
                    }
                }
                if layer.uses_shared_batch() && !in_batch {
                    batch.begin(blend);
                    in_batch = true;
                } else if !layer.uses_shared_batch() && in_batch {
                    batch.end();
                    in_batch = false;
                }
                layer.render(ctx, batch);
            });
        }

        if draw_fade && self.fade > 0.0 {
            if !in_batch {
                batch.begin(blend);
                in_batch = true;
            }
            let [w, h] = ctx.surface_size;
            let cover = Rect::new(0.0, 0.0, w as f32, h as f32).inflate(10.0);
            batch.fill_rect(cover, self.fade_color.scaled(self.fade));
        }

        if in_batch {
            batch.end();
        }
    }
}
