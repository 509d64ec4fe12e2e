use crate::blend::BlendMode;
use crate::scene::{Color, Rect};

/// Handle to an off-screen render target owned by a [`RenderTargets`] device.
///
/// Handles stay valid as values after disposal or device loss; ask the device
/// with [`RenderTargets::is_target_live`] before sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

impl TargetId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Off-screen render target lifetime and binding.
pub trait RenderTargets {
    fn create_target(&mut self, label: &str, width: u32, height: u32) -> TargetId;

    /// Release the target. Disposing a dead or unknown target is a no-op.
    fn dispose_target(&mut self, target: TargetId);

    /// False once the target was disposed or its backing resource was lost.
    fn is_target_live(&self, target: TargetId) -> bool;

    /// Redirect subsequent drawing. `None` restores the host's main surface.
    fn bind_target(&mut self, target: Option<TargetId>);

    /// Clear the currently bound surface.
    fn clear(&mut self, color: Color);
}

/// The host's immediate-mode batched drawing API.
///
/// Drawing calls are only meaningful between [`begin`](Self::begin) and
/// [`end`](Self::end).
pub trait SpriteBatch {
    /// Blend state of the open batch, `None` when no batch is open.
    fn batch_blend(&self) -> Option<BlendMode>;

    fn begin(&mut self, blend: BlendMode);

    fn end(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `src` of `target` with its top-left at `dest`, multiplied by `tint`.
    fn draw_target(&mut self, target: TargetId, dest: [f32; 2], src: Rect, tint: Color);
}
