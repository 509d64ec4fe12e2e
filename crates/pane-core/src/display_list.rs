use crate::blend::BlendMode;
use crate::device::TargetId;
use crate::scene::*;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateTarget { target: TargetId, label: String, width: u32, height: u32 },
    DisposeTarget(TargetId),
    /// `None` is the host's main surface.
    BindTarget(Option<TargetId>),
    Clear { surface: Option<TargetId>, color: ColorLinPremul },
    Begin(BlendMode),
    End,
    /// `blend` is the open batch state, `None` if drawn outside a batch.
    FillRect {
        surface: Option<TargetId>,
        rect: Rect,
        color: ColorLinPremul,
        blend: Option<BlendMode>,
    },
    DrawTarget {
        surface: Option<TargetId>,
        target: TargetId,
        dest: [f32; 2],
        src: Rect,
        tint: ColorLinPremul,
        blend: Option<BlendMode>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    pub commands: Vec<Command>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clears_of(&self, target: TargetId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Clear { surface: Some(t), .. } if *t == target))
            .count()
    }

    /// Every `DrawTarget` that samples `target`, in recording order.
    pub fn blits_of(&self, target: TargetId) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawTarget { target: t, .. } if *t == target))
            .collect()
    }

    /// Fills recorded while `surface` was bound.
    pub fn fills_on(&self, surface: Option<TargetId>) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::FillRect { surface: s, .. } if *s == surface))
            .collect()
    }

    pub fn begins(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, Command::Begin(_))).count()
    }
}
