use crate::blend::BlendMode;
use crate::device::{RenderTargets, SpriteBatch, TargetId};
use crate::display_list::{Command, DisplayList};
use crate::scene::*;

#[derive(Clone, Debug)]
struct TargetSlot {
    label: String,
    size: [u32; 2],
    live: bool,
}

/// Recording backend: implements the host seams by appending to a [`DisplayList`].
///
/// Keeps just enough state (open batch, bound surface, target liveness) for the
/// compositor to observe the same answers a real host would give.
pub struct Painter {
    list: DisplayList,
    targets: Vec<TargetSlot>,
    batch: Option<BlendMode>,
    bound: Option<TargetId>,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

impl Painter {
    pub fn new() -> Self {
        Self {
            list: DisplayList::default(),
            targets: Vec::new(),
            batch: None,
            bound: None,
        }
    }

    /// Start a host-side frame with an open batch at `blend`, as an entity render pass would.
    pub fn begin_frame(blend: BlendMode) -> Self {
        let mut painter = Self::new();
        painter.begin(blend);
        painter
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Hand over everything recorded so far, keeping batch and target state.
    pub fn take_display_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }

    pub fn bound_target(&self) -> Option<TargetId> {
        self.bound
    }

    pub fn target_label(&self, target: TargetId) -> Option<&str> {
        self.targets.get(target.index()).map(|t| t.label.as_str())
    }

    pub fn target_size(&self, target: TargetId) -> Option<[u32; 2]> {
        self.targets.get(target.index()).map(|t| t.size)
    }

    pub fn live_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.live).count()
    }

    /// Simulate a graphics device reset: every target loses its contents and handle.
    pub fn lose_device(&mut self) {
        for slot in &mut self.targets {
            slot.live = false;
        }
        self.bound = None;
    }
}

impl RenderTargets for Painter {
    fn create_target(&mut self, label: &str, width: u32, height: u32) -> TargetId {
        let target = TargetId(self.targets.len() as u32);
        self.targets.push(TargetSlot {
            label: label.to_string(),
            size: [width, height],
            live: true,
        });
        self.list.commands.push(Command::CreateTarget {
            target,
            label: label.to_string(),
            width,
            height,
        });
        target
    }

    fn dispose_target(&mut self, target: TargetId) {
        let Some(slot) = self.targets.get_mut(target.index()) else {
            return;
        };
        if !slot.live {
            return;
        }
        slot.live = false;
        if self.bound == Some(target) {
            self.bound = None;
        }
        self.list.commands.push(Command::DisposeTarget(target));
    }

    fn is_target_live(&self, target: TargetId) -> bool {
        self.targets.get(target.index()).is_some_and(|t| t.live)
    }

    fn bind_target(&mut self, target: Option<TargetId>) {
        if let Some(t) = target {
            if !self.is_target_live(t) {
                tracing::warn!(target_id = t.0, "binding a dead render target");
            }
        }
        self.bound = target;
        self.list.commands.push(Command::BindTarget(target));
    }

    fn clear(&mut self, color: ColorLinPremul) {
        self.list.commands.push(Command::Clear {
            surface: self.bound,
            color,
        });
    }
}

impl SpriteBatch for Painter {
    fn batch_blend(&self) -> Option<BlendMode> {
        self.batch
    }

    fn begin(&mut self, blend: BlendMode) {
        if let Some(open) = self.batch {
            tracing::warn!(?open, ?blend, "begin called while a batch is already open");
        }
        self.batch = Some(blend);
        self.list.commands.push(Command::Begin(blend));
    }

    fn end(&mut self) {
        if self.batch.take().is_none() {
            tracing::warn!("end called without an open batch");
        }
        self.list.commands.push(Command::End);
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorLinPremul) {
        self.list.commands.push(Command::FillRect {
            surface: self.bound,
            rect,
            color,
            blend: self.batch,
        });
    }

    fn draw_target(&mut self, target: TargetId, dest: [f32; 2], src: Rect, tint: ColorLinPremul) {
        self.list.commands.push(Command::DrawTarget {
            surface: self.bound,
            target,
            dest,
            src,
            tint,
            blend: self.batch,
        });
    }
}
