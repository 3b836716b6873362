use foundation::math::{Mat4, Vec3};
use runtime::config::MaterialConfig;
use scene::{Globe, Lighting, PerspectiveCamera, SphereVertex};

/// Per-frame shader inputs. Every field is 16-byte aligned so the layout
/// matches the WGSL uniform block without padding rules getting involved.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub point_radiance: [f32; 4],
    /// rgb: specular color, w: shininess.
    pub specular: [f32; 4],
    /// x: bump scale.
    pub params: [f32; 4],
}

impl Globals {
    pub fn new(
        camera: &PerspectiveCamera,
        globe: &Globe,
        lighting: &Lighting,
        material: &MaterialConfig,
    ) -> Self {
        let [ar, ag, ab] = lighting.ambient_radiance();
        let [pr, pg, pb] = lighting.point_radiance();
        let [sr, sg, sb] = material.specular_color;
        Self {
            view_proj: camera.view_proj_matrix(),
            model: globe.model_matrix(),
            camera_pos: point4(camera.position),
            light_pos: point4(lighting.point.position),
            ambient: [ar, ag, ab, 0.0],
            point_radiance: [pr, pg, pb, 0.0],
            specular: [sr, sg, sb, material.shininess],
            params: [material.bump_scale, 0.0, 0.0, 0.0],
        }
    }
}

fn point4(p: Vec3) -> [f32; 4] {
    let [x, y, z] = p.to_f32();
    [x, y, z, 1.0]
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl From<&SphereVertex> for GpuVertex {
    fn from(v: &SphereVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use wasm_bindgen::prelude::*;

    use super::{Globals, GpuVertex};
    use crate::textures::{RgbaImage, TextureKind};
    use scene::SphereMesh;

    #[derive(Debug)]
    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub pipeline: ::wgpu::RenderPipeline,
        pub uniform_buffer: ::wgpu::Buffer,
        pub uniform_bind_group: ::wgpu::BindGroup,
        pub material_layout: ::wgpu::BindGroupLayout,
        pub material_bind_group: ::wgpu::BindGroup,
        pub sampler: ::wgpu::Sampler,
        /// Views indexed like `TextureKind::ALL`.
        pub texture_views: [::wgpu::TextureView; 3],
        pub depth_view: ::wgpu::TextureView,
        pub vertex_buffer: ::wgpu::Buffer,
        pub index_buffer: ::wgpu::Buffer,
        pub index_count: u32,
    }

    const GLOBE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_pos: vec4<f32>,
    ambient: vec4<f32>,
    point_radiance: vec4<f32>,
    specular: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0) var t_color: texture_2d<f32>;
@group(1) @binding(1) var t_bump: texture_2d<f32>;
@group(1) @binding(2) var t_specular: texture_2d<f32>;
@group(1) @binding(3) var s_material: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = globals.model * vec4<f32>(position, 1.0);
    // Model is rotation times uniform scale, so it also carries normals.
    let n = (globals.model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, world.xyz, n, uv);
}

// Screen-space bump mapping from a height map (no tangents needed).
fn bumped_normal(world_pos: vec3<f32>, n: vec3<f32>, uv: vec2<f32>) -> vec3<f32> {
    let scale = globals.params.x;
    let duv_dx = dpdx(uv);
    let duv_dy = dpdy(uv);
    let h = scale * textureSample(t_bump, s_material, uv).x;
    let dh_dx = scale * textureSample(t_bump, s_material, uv + duv_dx).x - h;
    let dh_dy = scale * textureSample(t_bump, s_material, uv + duv_dy).x - h;

    let sigma_x = dpdx(world_pos);
    let sigma_y = dpdy(world_pos);
    let r1 = cross(sigma_y, n);
    let r2 = cross(n, sigma_x);
    let det = dot(sigma_x, r1);
    let grad = sign(det) * (dh_dx * r1 + dh_dy * r2);
    return normalize(abs(det) * n - grad);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let albedo = textureSample(t_color, s_material, fs_in.uv).rgb;
    let spec_mask = textureSample(t_specular, s_material, fs_in.uv).r;
    let n = bumped_normal(fs_in.world_pos, normalize(fs_in.normal), fs_in.uv);

    let l = normalize(globals.light_pos.xyz - fs_in.world_pos);
    let v = normalize(globals.camera_pos.xyz - fs_in.world_pos);
    let h = normalize(l + v);

    let ndotl = max(dot(n, l), 0.0);
    let diffuse = albedo * (globals.ambient.rgb + globals.point_radiance.rgb * ndotl);
    let shininess = max(globals.specular.w, 1.0);
    let spec = pow(max(dot(n, h), 0.0), shininess) * step(0.0, ndotl);
    let specular = globals.specular.rgb * spec_mask * spec * globals.point_radiance.rgb;

    return vec4<f32>(diffuse + specular, 1.0);
}
"#;

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_material_texture(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        kind: TextureKind,
        image: &RgbaImage,
    ) -> ::wgpu::TextureView {
        let format = if kind.is_srgb() {
            ::wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            ::wgpu::TextureFormat::Rgba8Unorm
        };
        let size = ::wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let label = format!("globe-{}-map", kind.label());
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some(&label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            &image.pixels,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        texture.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_material_bind_group(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        views: &[::wgpu::TextureView; 3],
        sampler: &::wgpu::Sampler,
    ) -> ::wgpu::BindGroup {
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-material-bg"),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(&views[0]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::TextureView(&views[1]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 2,
                    resource: ::wgpu::BindingResource::TextureView(&views[2]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 3,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn texture_layout_entry(binding: u32) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::FRAGMENT,
            ty: ::wgpu::BindingType::Texture {
                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: ::wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }

    fn slot(kind: TextureKind) -> usize {
        match kind {
            TextureKind::Color => 0,
            TextureKind::Bump => 1,
            TextureKind::Specular => 2,
        }
    }

    pub async fn init_wgpu(
        canvas: web_sys::HtmlCanvasElement,
        mesh: &SphereMesh,
    ) -> Result<WgpuContext, JsValue> {
        let width = canvas.width();
        let height = canvas.height();

        // `wgpu::Surface` must not outlive its `wgpu::Instance`; the instance
        // is leaked for the lifetime of the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("globe-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(GLOBE_SHADER)),
        });

        // WebGL2 has no storage buffers; globals go through a uniform block.
        let uniform_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("globe-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-globals-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-globals-bg"),
            layout: &uniform_bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let material_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-material-bgl"),
            entries: &[
                texture_layout_entry(0),
                texture_layout_entry(1),
                texture_layout_entry(2),
                ::wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Longitude wraps, latitude does not.
        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-material-sampler"),
            address_mode_u: ::wgpu::AddressMode::Repeat,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            address_mode_w: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_views = TextureKind::ALL.map(|kind| {
            create_material_texture(&device, &queue, kind, &RgbaImage::placeholder(kind))
        });
        let material_bind_group =
            create_material_bind_group(&device, &material_layout, &texture_views, &sampler);

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("globe-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &material_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("globe-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuVertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 12,
                            shader_location: 1,
                        },
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x2,
                            offset: 24,
                            shader_location: 2,
                        },
                    ],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(::wgpu::BlendState::REPLACE),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                // The depth test hides the far side; culling stays off so a
                // winding mismatch cannot make the globe vanish.
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: ::wgpu::CompareFunction::Less,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: ::wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: ::wgpu::BufferUsages::INDEX,
        });

        queue.write_buffer(
            &uniform_buffer,
            0,
            bytemuck::bytes_of(&<Globals as bytemuck::Zeroable>::zeroed()),
        );

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            material_layout,
            material_bind_group,
            sampler,
            texture_views,
            depth_view,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    /// Replace one material map and rebuild the material bind group.
    pub fn set_texture(ctx: &mut WgpuContext, kind: TextureKind, image: &RgbaImage) {
        ctx.texture_views[slot(kind)] =
            create_material_texture(&ctx.device, &ctx.queue, kind, image);
        ctx.material_bind_group = create_material_bind_group(
            &ctx.device,
            &ctx.material_layout,
            &ctx.texture_views,
            &ctx.sampler,
        );
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    pub fn render_globe(ctx: &WgpuContext, globals: &Globals) -> Result<(), JsValue> {
        let frame = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
        let view = frame
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        ctx.queue
            .write_buffer(&ctx.uniform_buffer, 0, bytemuck::bytes_of(globals));

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("globe-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("globe-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color::BLACK),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&ctx.pipeline);
            rpass.set_bind_group(0, &ctx.uniform_bind_group, &[]);
            rpass.set_bind_group(1, &ctx.material_bind_group, &[]);
            rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
            rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use wasm_bindgen::prelude::JsValue;

    use super::Globals;
    use crate::textures::{RgbaImage, TextureKind};
    use scene::SphereMesh;

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu(
        _canvas: web_sys::HtmlCanvasElement,
        _mesh: &SphereMesh,
    ) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn set_texture(_ctx: &mut WgpuContext, _kind: TextureKind, _image: &RgbaImage) {}

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_globe(_ctx: &WgpuContext, _globals: &Globals) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{WgpuContext, init_wgpu, render_globe, resize_wgpu, set_texture};
