//! Windowpane construction parameters, decoded from level [`EntityData`].

use pane_config::{CompositorConfig, EntityData};
use pane_core::{BlendMode, Color, Rect};

/// Where a window's interior composite is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    /// During the window's own render turn
    #[default]
    Inline,
    /// At the host's "below main content" anchor
    Below,
    /// At the host's "above main content" anchor
    Above,
}

impl Placement {
    /// `below`/`behind` and `above` are recognised; everything else draws inline.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "below" | "behind" => Self::Below,
            "above" => Self::Above,
            _ => Self::Inline,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowpaneParams {
    pub bounds: Rect,
    /// Alternate sampling origin; the window position when unset
    pub node: Option<[f32; 2]>,
    pub depth: i32,
    pub wipe_color: Color,
    pub overlay_color: Color,
    pub group_key: String,
    pub blend: BlendMode,
    pub placement: Placement,
    pub punch_through: bool,
    /// Comma-separated flag names, `!` negates
    pub visibility_flags: String,
    pub room: Option<String>,
}

impl Default for WindowpaneParams {
    fn default() -> Self {
        Self {
            bounds: Rect::default(),
            node: None,
            depth: 11000,
            wipe_color: Color::BLACK,
            overlay_color: Color::WHITE,
            group_key: String::new(),
            blend: BlendMode::AlphaBlend,
            placement: Placement::Inline,
            punch_through: false,
            visibility_flags: String::new(),
            room: None,
        }
    }
}

impl WindowpaneParams {
    pub fn from_entity(data: &EntityData, config: &CompositorConfig) -> Self {
        let overlay = data
            .attr("overlayColor")
            .map(|_| data.attr_str("overlayColor", ""))
            .unwrap_or_else(|| data.attr_str("drawColor", ""));

        Self {
            bounds: Rect::new(data.x, data.y, data.width, data.height),
            node: data.nodes.first().copied(),
            depth: i32::try_from(data.attr_int("depth", i64::from(config.default_depth)))
                .unwrap_or(config.default_depth),
            wipe_color: Color::from_hex_or(&data.attr_str("wipeColor", ""), Color::BLACK),
            overlay_color: Color::from_hex_or(&overlay, Color::WHITE),
            group_key: data.attr_str("stylegroundTag", ""),
            blend: BlendMode::from_name(&data.attr_str("blendMode", "alphablend"))
                .unwrap_or_default(),
            placement: Placement::from_name(&data.attr_str("placement", "inlevel")),
            punch_through: data.attr_bool("punchThrough", false),
            visibility_flags: data.attr_str("visibilityFlags", ""),
            room: data.room.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_attributes_missing() {
        let data = EntityData::new(8.0, 16.0, 24.0, 32.0);
        let p = WindowpaneParams::from_entity(&data, &CompositorConfig::default());
        assert_eq!(p.bounds, Rect::new(8.0, 16.0, 24.0, 32.0));
        assert_eq!(p.depth, 11000);
        assert_eq!(p.wipe_color, Color::BLACK);
        assert_eq!(p.overlay_color, Color::WHITE);
        assert_eq!(p.group_key, "");
        assert_eq!(p.blend, BlendMode::AlphaBlend);
        assert_eq!(p.placement, Placement::Inline);
        assert!(!p.punch_through);
        assert_eq!(p.node, None);
    }

    #[test]
    fn decodes_every_attribute() {
        let data = EntityData::new(0.0, 0.0, 10.0, 10.0)
            .with_node([40.0, 50.0])
            .with_room("b-02")
            .with_attr("depth", -100)
            .with_attr("wipeColor", "00000000")
            .with_attr("overlayColor", "ffffff80")
            .with_attr("stylegroundTag", "sky")
            .with_attr("blendMode", "additive")
            .with_attr("placement", "behind")
            .with_attr("punchThrough", true)
            .with_attr("visibilityFlags", "a,!b");
        let p = WindowpaneParams::from_entity(&data, &CompositorConfig::default());
        assert_eq!(p.node, Some([40.0, 50.0]));
        assert_eq!(p.room.as_deref(), Some("b-02"));
        assert_eq!(p.depth, -100);
        assert_eq!(p.wipe_color, Color::TRANSPARENT);
        assert_eq!(p.overlay_color.to_srgba_u8(), [255, 255, 255, 128]);
        assert_eq!(p.group_key, "sky");
        assert_eq!(p.blend, BlendMode::Additive);
        assert_eq!(p.placement, Placement::Below);
        assert!(p.punch_through);
        assert_eq!(p.visibility_flags, "a,!b");
    }

    #[test]
    fn bad_values_fall_back() {
        let data = EntityData::new(0.0, 0.0, 1.0, 1.0)
            .with_attr("wipeColor", "zz0000")
            .with_attr("drawColor", "nothex")
            .with_attr("blendMode", "multiply")
            .with_attr("placement", "sideways");
        let p = WindowpaneParams::from_entity(&data, &CompositorConfig::default());
        assert_eq!(p.wipe_color, Color::BLACK);
        assert_eq!(p.overlay_color, Color::WHITE);
        assert_eq!(p.blend, BlendMode::AlphaBlend);
        assert_eq!(p.placement, Placement::Inline);
    }

    #[test]
    fn out_of_range_depth_uses_default() {
        let config = CompositorConfig::default();
        let depth_of = |depth: i64| {
            let data = EntityData::new(0.0, 0.0, 1.0, 1.0).with_attr("depth", depth);
            WindowpaneParams::from_entity(&data, &config).depth
        };
        assert_eq!(depth_of(i64::from(i32::MAX) + 1), config.default_depth);
        assert_eq!(depth_of(i64::MIN), config.default_depth);
        assert_eq!(depth_of(i64::from(i32::MIN)), i32::MIN);
    }

    #[test]
    fn legacy_draw_color_is_honoured() {
        let data = EntityData::new(0.0, 0.0, 1.0, 1.0).with_attr("drawColor", "ff0000");
        let p = WindowpaneParams::from_entity(&data, &CompositorConfig::default());
        assert_eq!(p.overlay_color.to_srgba_u8(), [255, 0, 0, 255]);
    }

    #[test]
    fn placement_names() {
        assert_eq!(Placement::from_name("below"), Placement::Below);
        assert_eq!(Placement::from_name("Above"), Placement::Above);
        assert_eq!(Placement::from_name("inlevel"), Placement::Inline);
    }
}
