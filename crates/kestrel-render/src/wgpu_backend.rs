use std::collections::BTreeMap;

use kestrel_core::alloc::HashMap;
use kestrel_core::geometry::{Rect, Size};
use kestrel_core::profiling::{profile_function, profile_scope};
use kestrel_winit::{NativeWindow, WindowId};

use crate::backend::{ClearFlags, ClearPolicy, FramebufferHandle, GpuBackend, GpuError, ViewId};

/// Options for [`WgpuBackend::new`].
#[derive(Debug, Clone)]
pub struct WgpuBackendDescriptor {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub force_fallback_adapter: bool,
    pub max_views: u16,
    /// Present mode for every surface. Uses the surface default if `None`.
    pub present_mode: Option<wgpu::PresentMode>,
}

impl Default for WgpuBackendDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            max_views: 256,
            present_mode: None,
        }
    }
}

struct SurfaceSlot {
    window: WindowId,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceSlot {
    /// Zero-sized surfaces (minimized windows) stay unconfigured.
    fn configure(&self, device: &wgpu::Device) {
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(device, &self.config);
        }
    }

    fn resize(&mut self, device: &wgpu::Device, size: Size<u32>) {
        self.config.width = size.width;
        self.config.height = size.height;
        self.configure(device);
    }

    fn acquire(&self, device: &wgpu::Device) -> Option<(wgpu::SurfaceTexture, wgpu::TextureView)> {
        if self.config.width == 0 || self.config.height == 0 {
            return None;
        }
        match self.surface.get_current_texture() {
            Ok(frame) => {
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Some((frame, view))
            }
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                tracing::debug!("Surface of window {:?} is stale, reconfiguring", self.window);
                self.configure(device);
                None
            }
            Err(err) => {
                tracing::warn!("Failed to acquire surface of window {:?}: {}", self.window, err);
                None
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ViewState {
    framebuffer: Option<FramebufferHandle>,
    rect: Rect<u32>,
    clear: ClearPolicy,
    touched: bool,
}

/// [`GpuBackend`] on wgpu.
///
/// Every framebuffer is a `wgpu::Surface` of its window. At submission each
/// touched view, in ascending view order, records one render pass that clears
/// its target; the first view on a target clears it, later ones load it.
pub struct WgpuBackend {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    present_mode: Option<wgpu::PresentMode>,
    max_views: u16,
    framebuffers: HashMap<FramebufferHandle, SurfaceSlot>,
    next_framebuffer: u32,
    backbuffer: Option<SurfaceSlot>,
    views: BTreeMap<ViewId, ViewState>,
    frame: u64,
}

impl WgpuBackend {
    /// Creates the backend synchronously, blocking on adapter and device requests.
    pub fn new(descriptor: WgpuBackendDescriptor) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(descriptor))
    }

    pub async fn new_async(descriptor: WgpuBackendDescriptor) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await
            .map_err(|e| GpuError::AdapterUnavailable(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Kestrel Device"),
                ..Default::default()
            })
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        let info = adapter.get_info();
        tracing::info!("Using GPU adapter '{}' ({:?})", info.name, info.backend);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            present_mode: descriptor.present_mode,
            max_views: descriptor.max_views,
            framebuffers: HashMap::new(),
            next_framebuffer: 0,
            backbuffer: None,
            views: BTreeMap::new(),
            frame: 0,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    fn create_slot(&self, window: &NativeWindow, size: Size<u32>) -> Result<SurfaceSlot, GpuError> {
        let handle = window
            .winit_window()
            .ok_or(GpuError::MissingNativeHandle(window.id()))?;
        let surface = self
            .instance
            .create_surface(handle.clone())
            .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let mut config = surface
            .get_default_config(&self.adapter, size.width.max(1), size.height.max(1))
            .ok_or(GpuError::UnsupportedSurface)?;
        config.width = size.width;
        config.height = size.height;
        if let Some(present_mode) = self.present_mode {
            config.present_mode = present_mode;
        }

        let slot = SurfaceSlot {
            window: window.id(),
            surface,
            config,
        };
        slot.configure(&self.device);
        Ok(slot)
    }

    fn target(&self, framebuffer: Option<FramebufferHandle>) -> Option<&SurfaceSlot> {
        match framebuffer {
            Some(handle) => self.framebuffers.get(&handle),
            None => self.backbuffer.as_ref(),
        }
    }

    fn view_mut(&mut self, view: ViewId) -> &mut ViewState {
        kestrel_core::validate!(
            view < self.max_views,
            "view {} is out of range (max {})",
            view,
            self.max_views
        );
        self.views.entry(view).or_default()
    }
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn supports_multiple_surfaces(&self) -> bool {
        true
    }

    fn max_views(&self) -> u16 {
        self.max_views
    }

    fn create_framebuffer(
        &mut self,
        window: &NativeWindow,
        size: Size<u32>,
    ) -> Result<FramebufferHandle, GpuError> {
        profile_function!();
        let slot = self.create_slot(window, size)?;
        let handle = FramebufferHandle(self.next_framebuffer);
        self.next_framebuffer += 1;
        self.framebuffers.insert(handle, slot);
        tracing::trace!(
            "Framebuffer {:?} for window {:?} at {}x{}",
            handle,
            window.id(),
            size.width,
            size.height
        );
        Ok(handle)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        kestrel_core::validate!(
            self.framebuffers.remove(&framebuffer).is_some(),
            "destroying unknown framebuffer {:?}",
            framebuffer
        );
    }

    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: Option<FramebufferHandle>) {
        if let Some(handle) = framebuffer {
            kestrel_core::validate!(
                self.framebuffers.contains_key(&handle),
                "binding unknown framebuffer {:?} to view {}",
                handle,
                view
            );
        }
        self.view_mut(view).framebuffer = framebuffer;
    }

    fn set_view_rect(&mut self, view: ViewId, rect: Rect<u32>) {
        self.view_mut(view).rect = rect;
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ClearPolicy) {
        self.view_mut(view).clear = clear;
    }

    fn reset_view(&mut self, view: ViewId) {
        self.views.remove(&view);
    }

    fn touch(&mut self, view: ViewId) {
        self.view_mut(view).touched = true;
    }

    fn submit_frame(&mut self) -> u64 {
        profile_function!();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Kestrel Frame Encoder"),
            });

        let mut acquired: Vec<(Option<FramebufferHandle>, wgpu::SurfaceTexture, wgpu::TextureView)> =
            Vec::new();
        for (view, state) in self.views.iter().filter(|(_, state)| state.touched) {
            profile_scope!("view_pass");
            let (index, first) = match acquired.iter().position(|(fb, ..)| *fb == state.framebuffer) {
                Some(index) => (index, false),
                None => {
                    let Some((texture, texture_view)) = self
                        .target(state.framebuffer)
                        .and_then(|slot| slot.acquire(&self.device))
                    else {
                        continue;
                    };
                    acquired.push((state.framebuffer, texture, texture_view));
                    (acquired.len() - 1, true)
                }
            };

            let load = if first && state.clear.flags.contains(ClearFlags::COLOR) {
                let [r, g, b, a] = state.clear.rgba_f64();
                wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a })
            } else {
                wgpu::LoadOp::Load
            };

            tracing::trace!("View {} clears {:?} with {:?}", view, state.rect, load);
            let label = format!("View {}", view);
            // The clear happens on load; nothing is drawn inside the pass.
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &acquired[index].2,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        for (_, texture, _) in acquired {
            texture.present();
        }

        for state in self.views.values_mut() {
            state.touched = false;
        }
        self.frame += 1;
        self.frame
    }

    fn reset_backbuffer(&mut self, size: Size<u32>) {
        match self.backbuffer.as_mut() {
            Some(slot) => slot.resize(&self.device, size),
            None => tracing::warn!("Resetting backbuffer before any window was attached"),
        }
    }

    fn reinitialize(&mut self, window: &NativeWindow, size: Size<u32>) -> Result<(), GpuError> {
        self.backbuffer = Some(self.create_slot(window, size)?);
        Ok(())
    }

    fn release_backbuffer(&mut self) {
        self.backbuffer = None;
    }
}
