use std::fmt;

use super::GeometryError;

/// Scalar type of one attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    F32,
    I32,
    U32,
}

impl ComponentType {
    /// Size of one component in bytes.
    #[inline]
    pub const fn size(self) -> u64 {
        4
    }
}

/// Component count + component type of a vertex attribute or shader varying.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeFormat {
    pub components: u8,
    pub ty: ComponentType,
}

impl AttributeFormat {
    pub const FLOAT32X2: Self = Self::new(2, ComponentType::F32);
    pub const FLOAT32X3: Self = Self::new(3, ComponentType::F32);
    pub const FLOAT32X4: Self = Self::new(4, ComponentType::F32);

    #[inline]
    pub const fn new(components: u8, ty: ComponentType) -> Self {
        Self { components, ty }
    }

    /// Size of one attribute value in bytes.
    #[inline]
    pub const fn size(self) -> u64 {
        self.components as u64 * self.ty.size()
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        (1..=4).contains(&self.components)
    }

    /// Matching wgpu vertex format, `None` for unsupported component counts.
    pub fn to_wgpu(self) -> Option<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;

        let format = match (self.ty, self.components) {
            (ComponentType::F32, 1) => F::Float32,
            (ComponentType::F32, 2) => F::Float32x2,
            (ComponentType::F32, 3) => F::Float32x3,
            (ComponentType::F32, 4) => F::Float32x4,
            (ComponentType::I32, 1) => F::Sint32,
            (ComponentType::I32, 2) => F::Sint32x2,
            (ComponentType::I32, 3) => F::Sint32x3,
            (ComponentType::I32, 4) => F::Sint32x4,
            (ComponentType::U32, 1) => F::Uint32,
            (ComponentType::U32, 2) => F::Uint32x2,
            (ComponentType::U32, 3) => F::Uint32x3,
            (ComponentType::U32, 4) => F::Uint32x4,
            _ => return None,
        };
        Some(format)
    }
}

impl fmt::Display for AttributeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.ty {
            ComponentType::F32 => "f32",
            ComponentType::I32 => "i32",
            ComponentType::U32 => "u32",
        };
        if self.components == 1 {
            f.write_str(scalar)
        } else {
            write!(f, "vec{}<{}>", self.components, scalar)
        }
    }
}

/// One attribute inside an interleaved vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Shader input location the attribute feeds.
    pub slot: u32,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
    pub format: AttributeFormat,
}

impl VertexAttribute {
    /// First byte past the attribute, `None` on overflow.
    #[inline]
    pub fn end(self) -> Option<u64> {
        self.offset.checked_add(self.format.size())
    }

    /// Whether the attribute is readable from a vertex of `stride` bytes.
    pub fn fits(self, stride: u64) -> bool {
        self.offset % AttributeLayout::ALIGNMENT == 0 && self.end().is_some_and(|end| end <= stride)
    }
}

/// Describes how raw vertex bytes map to shader inputs.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLayout {
    stride: u64,
    attributes: Vec<VertexAttribute>,
}

impl AttributeLayout {
    /// Highest attribute slot accepted by the layout.
    pub const MAX_SLOT: u32 = 15;
    /// Largest vertex stride every backend accepts.
    pub const MAX_STRIDE: u64 = 2048;
    /// Required alignment of strides and attribute offsets.
    pub const ALIGNMENT: u64 = 4;

    /// Whether `stride` is non-zero, aligned and within [`Self::MAX_STRIDE`].
    #[inline]
    pub fn is_valid_stride(stride: u64) -> bool {
        stride > 0 && stride % Self::ALIGNMENT == 0 && stride <= Self::MAX_STRIDE
    }

    /// Builds a layout, validating every attribute against `stride`.
    pub fn new(stride: u64, attributes: Vec<VertexAttribute>) -> Result<Self, GeometryError> {
        if stride == 0 {
            return Err(GeometryError::ZeroStride);
        }
        if !Self::is_valid_stride(stride) {
            return Err(GeometryError::InvalidStride(stride));
        }

        for (i, attr) in attributes.iter().enumerate() {
            if !attr.format.is_valid() {
                return Err(GeometryError::InvalidComponentCount(attr.format.components));
            }
            if attr.slot > Self::MAX_SLOT {
                return Err(GeometryError::SlotOutOfRange(attr.slot));
            }
            if attr.offset % Self::ALIGNMENT != 0 {
                return Err(GeometryError::MisalignedAttribute { slot: attr.slot, offset: attr.offset });
            }
            if !attr.fits(stride) {
                return Err(GeometryError::AttributeOutOfBounds { slot: attr.slot, stride });
            }
            if attributes[..i].iter().any(|a| a.slot == attr.slot) {
                return Err(GeometryError::DuplicateSlot(attr.slot));
            }
        }

        Ok(Self { stride, attributes })
    }

    /// Attributes laid out back to back in declaration order, no padding.
    pub fn tightly_packed(attrs: &[(u32, AttributeFormat)]) -> Result<Self, GeometryError> {
        let mut offset = 0;
        let mut attributes = Vec::with_capacity(attrs.len());
        for &(slot, format) in attrs {
            attributes.push(VertexAttribute { slot, offset, format });
            offset += format.size();
        }
        Self::new(offset, attributes)
    }

    /// One `vec3<f32>` position at slot 0; stride 12, offset 0.
    pub fn position3f() -> Self {
        Self {
            stride: AttributeFormat::FLOAT32X3.size(),
            attributes: vec![VertexAttribute {
                slot: 0,
                offset: 0,
                format: AttributeFormat::FLOAT32X3,
            }],
        }
    }

    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Number of whole vertices in `byte_len` bytes.
    pub fn vertex_count(&self, byte_len: usize) -> Result<u32, GeometryError> {
        let len = byte_len as u64;
        if len % self.stride != 0 {
            return Err(GeometryError::MisalignedVertexData { len: byte_len, stride: self.stride });
        }
        let count = len / self.stride;
        u32::try_from(count).map_err(|_| GeometryError::TooManyVertices(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position3f_is_tightly_packed() {
        let layout = AttributeLayout::position3f();
        assert_eq!(layout.stride(), 12);
        assert_eq!(layout.attributes().len(), 1);
        assert_eq!(layout.attributes()[0].offset, 0);
        assert_eq!(layout.attributes()[0].format, AttributeFormat::FLOAT32X3);
        assert_eq!(layout, AttributeLayout::tightly_packed(&[(0, AttributeFormat::FLOAT32X3)]).unwrap());
    }

    #[test]
    fn vertex_count_requires_whole_vertices() {
        let layout = AttributeLayout::position3f();
        assert_eq!(layout.vertex_count(36), Ok(3));
        assert_eq!(layout.vertex_count(0), Ok(0));
        assert_eq!(
            layout.vertex_count(13),
            Err(GeometryError::MisalignedVertexData { len: 13, stride: 12 })
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn vertex_count_beyond_u32_is_distinct_from_misalignment() {
        let layout = AttributeLayout::position3f();
        let len = 12 * (u32::MAX as usize + 1);
        assert_eq!(
            layout.vertex_count(len),
            Err(GeometryError::TooManyVertices(u32::MAX as u64 + 1))
        );
    }

    #[test]
    fn huge_offset_is_out_of_bounds_not_overflow() {
        let attr = VertexAttribute { slot: 0, offset: u64::MAX - 3, format: AttributeFormat::FLOAT32X3 };
        assert_eq!(attr.end(), None);
        assert!(!attr.fits(12));
        assert_eq!(
            AttributeLayout::new(12, vec![attr]).unwrap_err(),
            GeometryError::AttributeOutOfBounds { slot: 0, stride: 12 }
        );
    }

    #[test]
    fn rejects_unaligned_or_oversized_stride() {
        let attr = VertexAttribute { slot: 0, offset: 0, format: AttributeFormat::FLOAT32X3 };
        assert_eq!(AttributeLayout::new(14, vec![attr]).unwrap_err(), GeometryError::InvalidStride(14));
        assert_eq!(
            AttributeLayout::new(4096, vec![attr]).unwrap_err(),
            GeometryError::InvalidStride(4096)
        );
        assert!(AttributeLayout::new(2048, vec![attr]).is_ok());
    }

    #[test]
    fn rejects_unaligned_offset() {
        let attr = VertexAttribute { slot: 1, offset: 2, format: AttributeFormat::FLOAT32X2 };
        assert_eq!(
            AttributeLayout::new(16, vec![attr]).unwrap_err(),
            GeometryError::MisalignedAttribute { slot: 1, offset: 2 }
        );
    }

    #[test]
    fn tightly_packed_accumulates_offsets() {
        let layout = AttributeLayout::tightly_packed(&[
            (0, AttributeFormat::FLOAT32X3),
            (1, AttributeFormat::FLOAT32X4),
        ])
        .unwrap();
        assert_eq!(layout.stride(), 28);
        assert_eq!(layout.attributes()[1].offset, 12);
    }

    #[test]
    fn rejects_attribute_past_stride() {
        let err = AttributeLayout::new(
            8,
            vec![VertexAttribute { slot: 0, offset: 0, format: AttributeFormat::FLOAT32X3 }],
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::AttributeOutOfBounds { slot: 0, stride: 8 });
    }

    #[test]
    fn rejects_duplicate_slots_and_zero_stride() {
        let attr = VertexAttribute { slot: 2, offset: 0, format: AttributeFormat::FLOAT32X2 };
        assert_eq!(
            AttributeLayout::new(16, vec![attr, VertexAttribute { offset: 8, ..attr }]).unwrap_err(),
            GeometryError::DuplicateSlot(2)
        );
        assert_eq!(AttributeLayout::new(0, vec![]).unwrap_err(), GeometryError::ZeroStride);
    }

    #[test]
    fn wgpu_format_mapping() {
        assert_eq!(AttributeFormat::FLOAT32X3.to_wgpu(), Some(wgpu::VertexFormat::Float32x3));
        assert_eq!(
            AttributeFormat::new(2, ComponentType::U32).to_wgpu(),
            Some(wgpu::VertexFormat::Uint32x2)
        );
        assert_eq!(AttributeFormat::new(5, ComponentType::F32).to_wgpu(), None);
    }

    #[test]
    fn display_uses_wgsl_spelling() {
        assert_eq!(AttributeFormat::FLOAT32X3.to_string(), "vec3<f32>");
        assert_eq!(AttributeFormat::new(1, ComponentType::I32).to_string(), "i32");
    }
}
