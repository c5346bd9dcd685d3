use naga::{Binding, ScalarKind, TypeInner};

use crate::geometry::{AttributeFormat, ComponentType};

/// Built-in values a stage may read or write.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Builtin {
    Position,
    FrontFacing,
    FragDepth,
    VertexIndex,
    InstanceIndex,
    SampleIndex,
    SampleMask,
    Other,
}

/// One entry of a stage's input or output interface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InterfaceSlot {
    /// User-defined location. `format` is `None` for types that have no
    /// vertex-attribute equivalent (f16, bool, matrices).
    Location {
        location: u32,
        format: Option<AttributeFormat>,
    },
    BuiltIn(Builtin),
}

/// Reflected entry-point interface of a compiled stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInterface {
    pub inputs: Vec<InterfaceSlot>,
    pub outputs: Vec<InterfaceSlot>,
}

impl StageInterface {
    pub(crate) fn reflect(module: &naga::Module, entry: &naga::EntryPoint) -> Self {
        let mut iface = Self::default();

        for arg in &entry.function.arguments {
            collect(module, arg.ty, arg.binding.as_ref(), &mut iface.inputs);
        }
        if let Some(result) = &entry.function.result {
            collect(module, result.ty, result.binding.as_ref(), &mut iface.outputs);
        }

        iface
    }

    /// User-location inputs in declaration order.
    pub fn location_inputs(&self) -> impl Iterator<Item = (u32, Option<AttributeFormat>)> + '_ {
        self.inputs.iter().filter_map(|slot| match *slot {
            InterfaceSlot::Location { location, format } => Some((location, format)),
            InterfaceSlot::BuiltIn(_) => None,
        })
    }

    /// Format written at `location`, or `None` when the stage writes nothing there.
    pub fn output_at(&self, location: u32) -> Option<Option<AttributeFormat>> {
        self.outputs.iter().find_map(|slot| match *slot {
            InterfaceSlot::Location { location: l, format } if l == location => Some(format),
            _ => None,
        })
    }

    pub fn writes_builtin(&self, builtin: Builtin) -> bool {
        self.outputs.contains(&InterfaceSlot::BuiltIn(builtin))
    }
}

fn collect(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceSlot>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceSlot::Location {
            location: *location,
            format: attribute_format(&module.types[ty].inner),
        }),
        Some(Binding::BuiltIn(b)) => out.push(InterfaceSlot::BuiltIn(map_builtin(b))),
        // Unbound arguments/results are structs whose members carry the bindings.
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn attribute_format(inner: &TypeInner) -> Option<AttributeFormat> {
    let (components, scalar) = match *inner {
        TypeInner::Scalar(scalar) => (1, scalar),
        TypeInner::Vector { size, scalar } => (size as u8, scalar),
        _ => return None,
    };

    if scalar.width != 4 {
        return None;
    }

    let ty = match scalar.kind {
        ScalarKind::Float => ComponentType::F32,
        ScalarKind::Sint => ComponentType::I32,
        ScalarKind::Uint => ComponentType::U32,
        _ => return None,
    };

    Some(AttributeFormat::new(components, ty))
}

fn map_builtin(b: &naga::BuiltIn) -> Builtin {
    match b {
        naga::BuiltIn::Position { .. } => Builtin::Position,
        naga::BuiltIn::FrontFacing => Builtin::FrontFacing,
        naga::BuiltIn::FragDepth => Builtin::FragDepth,
        naga::BuiltIn::VertexIndex => Builtin::VertexIndex,
        naga::BuiltIn::InstanceIndex => Builtin::InstanceIndex,
        naga::BuiltIn::SampleIndex => Builtin::SampleIndex,
        naga::BuiltIn::SampleMask => Builtin::SampleMask,
        _ => Builtin::Other,
    }
}
