use wgpu::*;

use crate::model::arena::{
    Arena, GROUND_COLOR, GROUND_SIZE, OBSTACLE_COLOR, PLAYER_COLORS, PLAYER_HALF_EXTENT,
    PROJECTILE_COLOR, PROJECTILE_RADIUS,
};
use crate::model::{Camera, SceneSnapshot};
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::GpuContext;
use glam::Vec3;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

/// Render collaborator contract: one fire-and-forget draw per frame, last
/// in the frame sequence.
pub trait Renderer {
    fn draw(&mut self, snapshot: &SceneSnapshot, camera: &Camera);
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: 64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting_buffer"),
        size: 32,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lighting_buffer.as_entire_binding(),
            },
        ],
    });

    CameraResources {
        camera_buffer,
        lighting_buffer,
        bind_group_layout,
        camera_bind_group,
    }
}

fn create_arena_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    depth_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader_src = include_str!("shaders/arena.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("arena_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("render_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 24,
                        shader_location: 2,
                        format: wgpu::VertexFormat::Float32x4,
                    },
                    wgpu::VertexAttribute {
                        offset: 40,
                        shader_location: 3,
                        format: wgpu::VertexFormat::Float32x2,
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

/// Wgpu-backed scene renderer with the egui HUD overlay pass.
pub struct RenderState {
    gpu: GpuContext,
    pub width: u32,
    pub height: u32,

    pipeline: RenderPipeline,
    arena_mesh: MeshBuffer,
    depth_view: TextureView,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,

    // UI overlay
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    pub fn new(gpu: GpuContext, arena: &Arena) -> Self {
        let width = gpu.config.width;
        let height = gpu.config.height;
        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (_, depth_view) = create_depth_texture(&gpu.device, width, height);

        let camera_resources = create_camera_resources(&gpu.device);
        let pipeline = create_arena_pipeline(
            &gpu.device,
            gpu.format,
            &camera_resources.bind_group_layout,
            depth_format,
        );

        // Static sun, written once.
        let lighting = LightingUniform {
            sun_dir: [0.4, 1.0, 0.3],
            sun_intensity: 0.6,
            ambient: 0.5,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        };
        gpu.queue.write_buffer(
            &camera_resources.lighting_buffer,
            0,
            bytemuck::bytes_of(&lighting),
        );

        // Ground and obstacles never move; their mesh is built once.
        let mut mesh = Mesh::empty();
        mesh.push_ground_plane(GROUND_SIZE, 0.0, GROUND_COLOR);
        for obstacle in &arena.obstacles {
            mesh.push_cuboid(obstacle.position, obstacle.half_extents, OBSTACLE_COLOR);
        }
        let arena_mesh = mesh.upload(&gpu.device);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            gpu,
            width,
            height,
            pipeline,
            arena_mesh,
            depth_view,
            camera_buffer: camera_resources.camera_buffer,
            camera_bind_group: camera_resources.camera_bind_group,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.gpu.config.width = width;
        self.gpu.config.height = height;
        self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
        let (_, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self.depth_view = depth_view;
    }

    /// Players and projectiles move every frame, so their geometry is
    /// rebuilt from the snapshot and uploaded fresh.
    fn build_dynamic_mesh(snapshot: &SceneSnapshot) -> Mesh {
        let mut mesh = Mesh::empty();
        for (position, color) in snapshot.players.iter().zip(PLAYER_COLORS) {
            mesh.push_cuboid(*position, Vec3::splat(PLAYER_HALF_EXTENT), color);
        }
        for position in &snapshot.projectiles {
            mesh.push_sphere(*position, PROJECTILE_RADIUS, 8, 16, PROJECTILE_COLOR);
        }
        mesh
    }
}

impl Renderer for RenderState {
    fn draw(&mut self, snapshot: &SceneSnapshot, camera: &Camera) {
        let camera_uniform = CameraUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
        };
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        let dynamic_mesh = Self::build_dynamic_mesh(snapshot).upload(&self.gpu.device);

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost) => {
                self.gpu
                    .surface
                    .configure(&self.gpu.device, &self.gpu.config);
                self.gpu
                    .surface
                    .get_current_texture()
                    .expect("Failed to acquire frame after reconfigure")
            }
            Err(e) => panic!("Surface error: {e:?}"),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: 0.5,
                            g: 0.8,
                            b: 1.0,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera_bind_group, &[]);

            rp.set_vertex_buffer(0, self.arena_mesh.vertex_buffer.slice(..));
            rp.set_index_buffer(self.arena_mesh.index_buffer.slice(..), IndexFormat::Uint32);
            rp.draw_indexed(0..self.arena_mesh.index_count, 0, 0..1);

            rp.set_vertex_buffer(0, dynamic_mesh.vertex_buffer.slice(..));
            rp.set_index_buffer(dynamic_mesh.index_buffer.slice(..), IndexFormat::Uint32);
            rp.draw_indexed(0..dynamic_mesh.index_count, 0, 0..1);
        }

        // HUD overlay, when the frame produced one.
        if let (Some(primitives), Some(full_output)) =
            (self.egui_primitives.take(), self.egui_full_output.take())
        {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: self.egui_dpr,
            };

            for (id, image_delta) in &full_output.textures_delta.set {
                self.egui_renderer
                    .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
            }
            self.egui_renderer.update_buffers(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                &primitives,
                &screen_descriptor,
            );

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer.render(
                    &mut egui_pass.forget_lifetime(),
                    &primitives,
                    &screen_descriptor,
                );
            }

            for id in &full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
