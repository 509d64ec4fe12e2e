use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{RenderTargets, TargetId};
use crate::scene::ColorLinPremul;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct TexKey {
    width: u32,
    height: u32,
}

/// Released resources, reused by exact size.
#[derive(Debug)]
struct Pool<T> {
    free: HashMap<TexKey, Vec<T>>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { free: HashMap::new() }
    }
}

impl<T> Pool<T> {
    fn take(&mut self, key: TexKey) -> Option<T> {
        self.free.get_mut(&key)?.pop()
    }

    fn put(&mut self, key: TexKey, item: T) {
        self.free.entry(key).or_default().push(item);
    }

    fn clear(&mut self) {
        self.free.clear();
    }

    fn len(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }
}

#[derive(Debug)]
struct OwnedTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    key: TexKey,
}

/// [`RenderTargets`] over a wgpu device, with basic pooling of released textures.
///
/// Hosts sample a target through [`view`](Self::view) from their own sprite pipeline.
pub struct GpuTargets {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    slots: Vec<Option<OwnedTexture>>,
    texture_pool: Pool<wgpu::Texture>,
    bound: Option<TargetId>,
}

impl GpuTargets {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            format,
            slots: Vec::new(),
            texture_pool: Pool::default(),
            bound: None,
        }
    }

    pub fn view(&self, target: TargetId) -> Option<&wgpu::TextureView> {
        self.slots.get(target.index())?.as_ref().map(|t| &t.view)
    }

    /// Currently bound target view, `None` when drawing to the host surface.
    pub fn bound_view(&self) -> Option<&wgpu::TextureView> {
        self.view(self.bound?)
    }

    /// Drop every texture, pooled ones included. Call after the device was lost.
    pub fn lose_all(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.texture_pool.clear();
        self.bound = None;
    }

    fn allocate_texture(&mut self, label: &str, key: TexKey) -> OwnedTexture {
        let texture = self.texture_pool.take(key).unwrap_or_else(|| {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: key.width,
                    height: key.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: self.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OwnedTexture { texture, view, key }
    }
}

impl RenderTargets for GpuTargets {
    fn create_target(&mut self, label: &str, width: u32, height: u32) -> TargetId {
        let tex = self.allocate_texture(label, TexKey { width, height });
        let id = TargetId(self.slots.len() as u32);
        self.slots.push(Some(tex));
        id
    }

    fn dispose_target(&mut self, target: TargetId) {
        let Some(tex) = self.slots.get_mut(target.index()).and_then(Option::take) else {
            return;
        };
        if self.bound == Some(target) {
            self.bound = None;
        }
        self.texture_pool.put(tex.key, tex.texture);
        tracing::debug!(
            target_id = target.0,
            pooled = self.texture_pool.len(),
            "render target released"
        );
    }

    fn is_target_live(&self, target: TargetId) -> bool {
        self.slots.get(target.index()).is_some_and(Option::is_some)
    }

    fn bind_target(&mut self, target: Option<TargetId>) {
        self.bound = target;
    }

    fn clear(&mut self, color: ColorLinPremul) {
        let Some(view) = self.bound_view() else {
            return;
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("windowpane:clear"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("windowpane:clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: color.r as f64,
                            g: color.g as f64,
                            b: color.b as f64,
                            a: color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: TexKey = TexKey { width: 320, height: 180 };
    const LARGE: TexKey = TexKey { width: 640, height: 360 };

    #[test]
    fn pool_reuses_only_matching_sizes() {
        let mut pool = Pool::default();
        pool.put(SMALL, "a");
        pool.put(SMALL, "b");

        assert_eq!(pool.take(LARGE), None);
        assert_eq!(pool.take(SMALL), Some("b"));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.take(SMALL), Some("a"));
        assert_eq!(pool.take(SMALL), None);
    }

    #[test]
    fn clearing_the_pool_drops_everything() {
        let mut pool = Pool::default();
        pool.put(SMALL, 1u32);
        pool.put(LARGE, 2u32);
        pool.clear();
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.take(LARGE), None);
    }
}
