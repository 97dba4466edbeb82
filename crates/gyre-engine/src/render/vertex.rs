use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::device::VertexAttribute;

/// Interleaved vertex record uploaded verbatim into a vertex buffer.
pub trait Vertex: Pod {
    /// Attribute layout, one entry per shader input.
    const ATTRIBUTES: &'static [VertexAttribute];

    fn stride() -> i32 {
        size_of::<Self>() as i32
    }
}

/// Position + RGB color (triangle renderer).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColoredVertex {
    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

impl Vertex for ColoredVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            location: 0,
            components: 3,
            offset: 0,
        },
        VertexAttribute {
            location: 1,
            components: 3,
            offset: offset_of!(ColoredVertex, color) as i32,
        },
    ];
}

/// Position + texture coordinate (quad renderer).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl TexturedVertex {
    #[inline]
    pub const fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

impl Vertex for TexturedVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            location: 0,
            components: 3,
            offset: 0,
        },
        VertexAttribute {
            location: 1,
            components: 2,
            offset: offset_of!(TexturedVertex, tex_coord) as i32,
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_layout_is_tightly_packed() {
        assert_eq!(ColoredVertex::stride(), 24);
        assert_eq!(ColoredVertex::ATTRIBUTES[1].offset, 12);
    }

    #[test]
    fn textured_layout_is_tightly_packed() {
        assert_eq!(TexturedVertex::stride(), 20);
        assert_eq!(TexturedVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(TexturedVertex::ATTRIBUTES[1].components, 2);
    }
}
