//! Shader programs: stages, vertex layout and per-draw uniforms
//!
//! A program is assembled step by step (`add_shader`, `add_layout`,
//! `add_buffer`) and then drawn with [`ShaderProgram::render`]. wgpu bakes
//! fixed-function state into the pipeline object, so the program keeps one
//! pipeline per [`RenderState`] it has been drawn with.

use std::{
    collections::{hash_map::Entry, HashMap},
    path::Path,
};

use cgmath::Matrix4;

use crate::{
    error::{EngineError, EngineResult},
    gfx::{
        camera::MatrixUniform,
        device::{Frame, RenderState},
        scene::vertex::ColorVertex,
    },
    wgpu_utils::{scoped, validation_message, vertex_uniform_entry, DynamicUniformBuffer},
};

use super::shader_stage::{compile_module, BoundStages, ShaderStage, StageKind, LAYOUT_ENTRY};

/// Formats every program renders into, fixed for the life of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub line_mode_supported: bool,
}

struct ProgramUniforms {
    buffer: DynamicUniformBuffer<MatrixUniform>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
}

impl ProgramUniforms {
    fn bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicUniformBuffer<MatrixUniform>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Matrix Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.binding_resource(),
            }],
        })
    }
}

pub struct ShaderProgram {
    label: String,
    targets: RenderTargets,
    stages: Vec<ShaderStage>,
    layout_checked: bool,
    uniforms: Option<ProgramUniforms>,
    pipelines: HashMap<RenderState, wgpu::RenderPipeline>,
}

impl ShaderProgram {
    pub fn new(label: impl Into<String>, targets: RenderTargets) -> Self {
        Self {
            label: label.into(),
            targets,
            stages: Vec::new(),
            layout_checked: false,
            uniforms: None,
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a stage from `path` and appends it to the program
    pub fn add_shader(
        &mut self,
        device: &wgpu::Device,
        kind: StageKind,
        path: &Path,
        diagnostic_file: &Path,
    ) -> EngineResult<()> {
        let stage = ShaderStage::compile(device, kind, path, diagnostic_file)?;
        log::debug!(
            "'{}' gained a {:?} stage from '{}'",
            self.label,
            stage.kind(),
            stage.path().display()
        );
        self.stages.push(stage);
        self.pipelines.clear();
        Ok(())
    }

    /// Checks the [`ColorVertex`] layout against the `vs_layout` entry in `path`
    ///
    /// A throwaway pipeline is built from that entry; wgpu rejects it when
    /// the shader's inputs disagree with the buffer layout.
    pub fn add_layout(
        &mut self,
        device: &wgpu::Device,
        path: &Path,
        diagnostic_file: &Path,
    ) -> EngineResult<()> {
        let module = compile_module(device, path, diagnostic_file)?;

        let (_probe, rejected) = validation_message(device, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Layout Probe"),
                layout: None,
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(LAYOUT_ENTRY),
                    buffers: &[ColorVertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });

        if let Some(message) = rejected {
            return Err(EngineError::ShaderLayout {
                path: path.to_path_buf(),
                message,
            });
        }

        self.layout_checked = true;
        Ok(())
    }

    /// Allocates the per-draw matrix buffer with room for `slots` draws
    pub fn add_buffer(&mut self, device: &wgpu::Device, slots: usize) -> EngineResult<()> {
        let label = format!("{} uniforms", self.label);
        let uniforms = scoped(device, &label, || {
            let buffer = DynamicUniformBuffer::<MatrixUniform>::new(device, slots);
            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Matrix Bind Group Layout"),
                    entries: &[vertex_uniform_entry::<MatrixUniform>(0)],
                });
            let bind_group = ProgramUniforms::bind_group(device, &bind_group_layout, &buffer);
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", self.label)),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            ProgramUniforms {
                buffer,
                bind_group_layout,
                bind_group,
                pipeline_layout,
            }
        })?;

        self.uniforms = Some(uniforms);
        self.pipelines.clear();
        Ok(())
    }

    /// Prepares the uniform buffer for a frame of up to `draws` renders
    pub fn begin_frame(&mut self, device: &wgpu::Device, draws: usize) {
        let Some(uniforms) = self.uniforms.as_mut() else {
            return;
        };

        if uniforms.buffer.begin_frame(device, draws) {
            uniforms.bind_group =
                ProgramUniforms::bind_group(device, &uniforms.bind_group_layout, &uniforms.buffer);
        }
    }

    /// Records one indexed draw of the mesh bound on `frame`
    ///
    /// Writes the three matrices into the next uniform slot, then selects
    /// the pipeline matching the context's current render state.
    ///
    /// # Errors
    /// `UniformSlotsExhausted` when the frame draws more often than
    /// [`begin_frame`](Self::begin_frame) made room for.
    ///
    /// # Panics
    /// Panics if the program has no vertex stage or no uniform buffer.
    pub fn render(
        &mut self,
        frame: &mut Frame<'_>,
        world: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        index_count: u32,
    ) -> EngineResult<()> {
        let context = frame.context();
        let state = context.render_state();

        let Self {
            label,
            targets,
            stages,
            uniforms,
            pipelines,
            ..
        } = self;
        let Some(uniforms) = uniforms.as_mut() else {
            panic!("shader program '{label}' rendered without a uniform buffer");
        };
        let offset = uniforms
            .buffer
            .push(context.queue(), &MatrixUniform::new(world, view, projection))?;

        let pipeline = match pipelines.entry(state) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let pipeline =
                    create_pipeline(context.device(), label, *targets, stages, uniforms, state)?;
                log::debug!("built '{label}' pipeline for {state:?}");
                entry.insert(pipeline)
            }
        };

        let pass = frame.pass();
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &uniforms.bind_group, &[offset]);
        pass.draw_indexed(0..index_count, 0, 0..1);
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    pub fn layout_checked(&self) -> bool {
        self.layout_checked
    }

    /// Number of per-state pipelines built so far
    pub fn cached_pipelines(&self) -> usize {
        self.pipelines.len()
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    targets: RenderTargets,
    stages: &[ShaderStage],
    uniforms: &ProgramUniforms,
    state: RenderState,
) -> EngineResult<wgpu::RenderPipeline> {
    let buffers = [ColorVertex::desc()];
    let color_targets = [Some(wgpu::ColorTargetState {
        format: targets.color_format,
        blend: state.blend_state(),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    let mut bound = BoundStages::default();
    for stage in stages {
        stage.bind(&mut bound, &buffers, &color_targets);
    }
    let Some(vertex) = bound.vertex else {
        panic!("shader program '{label}' has no vertex stage");
    };

    let label = format!("{label} Pipeline");
    scoped(device, &label, || {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&uniforms.pipeline_layout),
            vertex,
            fragment: bound.fragment,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // left-handed: clockwise triangles face the camera
                front_face: wgpu::FrontFace::Cw,
                cull_mode: state.cull_mode(),
                polygon_mode: state.polygon_mode(targets.line_mode_supported),
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(state.depth_stencil(targets.depth_format)),
            multisample: state.multisample(1),
            multiview: None,
            cache: None,
        })
    })
}
