//! Fixed render state variants
//!
//! wgpu bakes depth, raster and blend state into the render pipeline, so the
//! device context tracks the current selection as a small [`RenderState`] key.
//! The pipeline manager builds (and caches) one pipeline per key it meets.

use wgpu::{
    BlendState, CompareFunction, DepthBiasState, DepthStencilState, Face, MultisampleState,
    PolygonMode, StencilState, TextureFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthTest {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RasterMode {
    /// Solid fill, back faces culled
    #[default]
    Solid,
    /// Solid fill, nothing culled
    SolidNoCull,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Disabled,
    Enabled,
    AlphaToCoverage,
}

/// Complete fixed-function state for one draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderState {
    pub depth: DepthTest,
    pub raster: RasterMode,
    pub blend: BlendMode,
}

impl RenderState {
    pub fn with_depth(mut self, depth: DepthTest) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_raster(mut self, raster: RasterMode) -> Self {
        self.raster = raster;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Depth-stencil state for the given depth format
    ///
    /// A disabled depth test still attaches the depth buffer (the render pass
    /// always binds it) but passes every fragment and leaves depth untouched.
    pub fn depth_stencil(&self, format: TextureFormat) -> DepthStencilState {
        let (depth_write_enabled, depth_compare) = match self.depth {
            DepthTest::Enabled => (true, CompareFunction::Less),
            DepthTest::Disabled => (false, CompareFunction::Always),
        };

        DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }
    }

    pub fn cull_mode(&self) -> Option<Face> {
        match self.raster {
            RasterMode::Solid => Some(Face::Back),
            RasterMode::SolidNoCull | RasterMode::Wireframe => None,
        }
    }

    /// Polygon mode, falling back to fill when line rasterization is unavailable
    pub fn polygon_mode(&self, line_mode_supported: bool) -> PolygonMode {
        match self.raster {
            RasterMode::Wireframe if line_mode_supported => PolygonMode::Line,
            _ => PolygonMode::Fill,
        }
    }

    pub fn blend_state(&self) -> Option<BlendState> {
        match self.blend {
            BlendMode::Disabled => Some(BlendState::REPLACE),
            BlendMode::Enabled | BlendMode::AlphaToCoverage => Some(BlendState::ALPHA_BLENDING),
        }
    }

    /// Multisample state; alpha-to-coverage needs more than one sample
    pub fn multisample(&self, sample_count: u32) -> MultisampleState {
        MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: self.blend == BlendMode::AlphaToCoverage
                && sample_count > 1,
        }
    }
}
