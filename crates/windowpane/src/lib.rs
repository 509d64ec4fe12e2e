//! windowpane: several on-screen windows showing "through" to one shared,
//! off-screen composited image of tagged background/foreground layers.
//!
//! Per frame the host drives a [`PaneScene`] through fixed phases:
//!
//! 1. [`PaneScene::update`] evaluates every window's visibility predicate and
//!    folds it into its group.
//! 2. [`PaneScene::before_render`] lets each group leader redraw the shared
//!    target from its tagged layers.
//! 3. [`PaneScene::render`] blits inline windows and queues below/above ones.
//! 4. [`PaneScene::render_below`] / [`PaneScene::render_above`] run at the host's
//!    below/above anchors and drain those queues.

pub mod error;
pub mod forceful;
pub mod layer;
pub mod params;
pub mod registry;
pub mod scene;
pub mod visibility;
pub mod window;

pub use error::{PaneError, Result};
pub use forceful::{ForcefulRenderer, is_forceful_rendering};
pub use layer::{FrameContext, Layer, SolidLayer, TagSet};
pub use params::{Placement, WindowpaneParams};
pub use registry::{Group, GroupRegistry, Leave};
pub use scene::{DeferredPasses, PaneScene};
pub use visibility::{FlagId, FlagPredicate, FlagSource, SessionFlags};
pub use window::{RenderTurn, WindowId, Windowpane};

pub use pane_config::{CompositorConfig, EntityData, PaneConfig};
pub use pane_core::{BlendMode, Color, Painter, Rect, RenderTargets, SpriteBatch, TargetId};
