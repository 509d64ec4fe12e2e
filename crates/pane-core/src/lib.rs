//! pane-core: geometry, color and the host drawing seams shared by the compositor.
//!
//! The compositor never talks to a GPU directly. Hosts hand it something that
//! implements [`SpriteBatch`] (immediate-mode batched drawing) and
//! [`RenderTargets`] (off-screen target lifetime and binding). [`Painter`] is a
//! recording implementation of both, used headless and in tests.

mod blend;
mod color;
mod device;
mod display_list;
mod painter;
mod scene;

#[cfg(feature = "wgpu")]
mod gpu;

pub use blend::*;
pub use color::*;
pub use device::*;
pub use display_list::*;
pub use painter::*;
pub use scene::*;

#[cfg(feature = "wgpu")]
pub use gpu::GpuTargets;
#[cfg(feature = "wgpu")]
pub use wgpu;
