//! Host layer model as seen by the compositor.
//!
//! Layers belong to the host scene. The compositor only reads their tags and
//! batching preferences and, while drawing them into a group target, overrides
//! their visibility for the duration of the call.

use std::collections::BTreeSet;

use pane_config::LayerData;
use pane_core::{BlendMode, Color, Rect, SpriteBatch};

/// Tags a layer answers to. Level data authors them as one comma-separated string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a comma-separated tag list. Blank entries are dropped.
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_superset(&self, other: &TagSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Per-frame values layers may need while preparing or drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    /// Camera position, already snapped to whole pixels
    pub camera: [f32; 2],
    pub frame: u64,
    /// Logical size of the surface being drawn into
    pub surface_size: [u32; 2],
}

/// A host background/foreground layer.
pub trait Layer {
    fn name(&self) -> &str {
        ""
    }

    fn tags(&self) -> &TagSet;

    fn visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Blend state the layer wants its batch opened with, `None` for "any".
    fn blend_preference(&self) -> Option<BlendMode> {
        None
    }

    /// Shared-batch layers draw through the open batch; others draw immediately
    /// and need it closed.
    fn uses_shared_batch(&self) -> bool {
        true
    }

    /// Chance to prepare state (e.g. render to a private target) before drawing.
    fn before_render(&mut self, _ctx: &FrameContext) {}

    fn render(&mut self, ctx: &FrameContext, batch: &mut dyn SpriteBatch);
}

/// The host's own layer pass must not draw layers reserved for windowpanes.
pub fn host_should_draw(layer: &dyn Layer, exclusive_tag: &str) -> bool {
    layer.visible() && !layer.tags().contains(exclusive_tag)
}

/// Layers feeding a live group, or reserved for windowpanes, must survive the
/// host's own culling so they keep updating while off-screen.
pub fn host_keeps_visible<'a>(
    layer: &dyn Layer,
    exclusive_tag: &str,
    mut group_keys: impl Iterator<Item = &'a str>,
) -> bool {
    let tags = layer.tags();
    tags.contains(exclusive_tag) || group_keys.any(|key| tags.contains(key))
}

/// A flat color rectangle. Skips itself when hidden, like most host layers do.
#[derive(Clone, Debug)]
pub struct SolidLayer {
    pub name: String,
    pub tags: TagSet,
    pub visible: bool,
    pub color: Color,
    pub rect: Rect,
    pub blend: Option<BlendMode>,
    pub shared_batch: bool,
    /// How many times `before_render` ran
    pub prepared: u32,
}

impl SolidLayer {
    pub fn new(name: &str, tags: &str, color: Color, rect: Rect) -> Self {
        Self {
            name: name.to_string(),
            tags: TagSet::parse(tags),
            visible: true,
            color,
            rect,
            blend: None,
            shared_batch: true,
            prepared: 0,
        }
    }

    pub fn from_data(data: &LayerData) -> Self {
        let [x, y, w, h] = data.rect;
        Self {
            name: data.name.clone(),
            tags: TagSet::parse(&data.tags),
            visible: data.visible,
            color: Color::from_hex_or(&data.color, Color::WHITE),
            rect: Rect::new(x, y, w, h),
            blend: data.blend.as_deref().and_then(BlendMode::from_name),
            shared_batch: data.shared_batch,
            prepared: 0,
        }
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn immediate(mut self) -> Self {
        self.shared_batch = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl Layer for SolidLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn blend_preference(&self) -> Option<BlendMode> {
        self.blend
    }

    fn uses_shared_batch(&self) -> bool {
        self.shared_batch
    }

    fn before_render(&mut self, _ctx: &FrameContext) {
        self.prepared += 1;
    }

    fn render(&mut self, _ctx: &FrameContext, batch: &mut dyn SpriteBatch) {
        if !self.visible {
            return;
        }
        if self.shared_batch {
            batch.fill_rect(self.rect, self.color);
        } else {
            batch.begin(self.blend.unwrap_or_default());
            batch.fill_rect(self.rect, self.color);
            batch.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_and_trims() {
        let tags = TagSet::parse("pane, stars,,pane ");
        assert!(tags.contains("pane"));
        assert!(tags.contains("stars"));
        assert_eq!(tags.iter().count(), 2);
        assert!(TagSet::parse("").is_empty());
    }

    #[test]
    fn superset_check() {
        let tags = TagSet::parse("a,b,c");
        assert!(tags.is_superset(&TagSet::parse("a,c")));
        assert!(tags.is_superset(&TagSet::new()));
        assert!(!tags.is_superset(&TagSet::parse("a,d")));
    }

    #[test]
    fn exclusive_layers_are_hidden_from_host_but_kept_alive() {
        let reserved = SolidLayer::new("r", "windowpanehelperonly", Color::WHITE, Rect::default());
        let grouped = SolidLayer::new("g", "pane", Color::WHITE, Rect::default());
        let plain = SolidLayer::new("p", "other", Color::WHITE, Rect::default());

        assert!(!host_should_draw(&reserved, "windowpanehelperonly"));
        assert!(host_should_draw(&grouped, "windowpanehelperonly"));

        let keys = ["pane"];
        assert!(host_keeps_visible(&reserved, "windowpanehelperonly", keys.iter().copied()));
        assert!(host_keeps_visible(&grouped, "windowpanehelperonly", keys.iter().copied()));
        assert!(!host_keeps_visible(&plain, "windowpanehelperonly", keys.iter().copied()));
    }

    #[test]
    fn from_data_decodes_color_and_blend() {
        let data = LayerData {
            name: "glow".into(),
            tags: "pane".into(),
            color: "ff000080".into(),
            blend: Some("additive".into()),
            shared_batch: false,
            ..Default::default()
        };
        let layer = SolidLayer::from_data(&data);
        assert_eq!(layer.color.to_srgba_u8(), [255, 0, 0, 128]);
        assert_eq!(layer.blend, Some(BlendMode::Additive));
        assert!(!layer.shared_batch);
        assert_eq!(layer.rect, Rect::new(0.0, 0.0, 320.0, 180.0));
    }
}
