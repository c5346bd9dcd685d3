use std::fmt;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

resource_id!(
    /// Handle to a GPU vertex buffer registered in a graphics context.
    BufferId,
    "buffer"
);
resource_id!(
    /// Handle to a vertex-array record (attribute layout + source buffers).
    VertexArrayId,
    "vertex-array"
);
resource_id!(
    /// Handle to a shader program registered in a graphics context.
    ProgramId,
    "program"
);
resource_id!(
    /// Handle to a realised render pipeline owned by the backend.
    PipelineId,
    "pipeline"
);

/// Hands out ids from one counter; `0` is never issued.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}
