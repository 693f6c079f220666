//! Stage interface reflection over a validated `naga::Module`.

use std::fmt;

use naga::{Binding, Handle, Module, Type, TypeInner};

/// Scalar category of a varying or vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
    Bool,
}

/// Scalar or vector type crossing a stage boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VaryingType {
    pub kind: ScalarKind,
    /// Scalar width in bytes.
    pub width: u8,
    /// 1 for scalars, 2..=4 for vectors.
    pub components: u8,
}

impl VaryingType {
    pub const fn new(kind: ScalarKind, width: u8, components: u8) -> Self {
        Self { kind, width, components }
    }

    pub const fn f32(components: u8) -> Self {
        Self::new(ScalarKind::Float, 4, components)
    }

    pub(crate) fn from_inner(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(scalar) => Some(Self::new(map_kind(scalar.kind)?, scalar.width, 1)),
            TypeInner::Vector { size, scalar } => {
                Some(Self::new(map_kind(scalar.kind)?, scalar.width, size as u8))
            }
            _ => None,
        }
    }

    /// Shader-side type a vertex attribute of `format` is read as.
    ///
    /// Returns `None` for formats not covered here; callers skip the check.
    pub fn from_vertex_format(format: wgpu::VertexFormat) -> Option<Self> {
        use wgpu::VertexFormat as F;

        let ty = match format {
            F::Float32 => Self::f32(1),
            F::Float32x2 => Self::f32(2),
            F::Float32x3 => Self::f32(3),
            F::Float32x4 => Self::f32(4),

            F::Float16x2 | F::Unorm8x2 | F::Snorm8x2 | F::Unorm16x2 | F::Snorm16x2 => Self::f32(2),
            F::Float16x4 | F::Unorm8x4 | F::Snorm8x4 | F::Unorm16x4 | F::Snorm16x4 => Self::f32(4),

            F::Sint32 => Self::new(ScalarKind::Sint, 4, 1),
            F::Sint32x2 => Self::new(ScalarKind::Sint, 4, 2),
            F::Sint32x3 => Self::new(ScalarKind::Sint, 4, 3),
            F::Sint32x4 => Self::new(ScalarKind::Sint, 4, 4),

            F::Uint32 => Self::new(ScalarKind::Uint, 4, 1),
            F::Uint32x2 => Self::new(ScalarKind::Uint, 4, 2),
            F::Uint32x3 => Self::new(ScalarKind::Uint, 4, 3),
            F::Uint32x4 => Self::new(ScalarKind::Uint, 4, 4),

            _ => return None,
        };
        Some(ty)
    }
}

fn map_kind(kind: naga::ScalarKind) -> Option<ScalarKind> {
    match kind {
        naga::ScalarKind::Float => Some(ScalarKind::Float),
        naga::ScalarKind::Sint => Some(ScalarKind::Sint),
        naga::ScalarKind::Uint => Some(ScalarKind::Uint),
        naga::ScalarKind::Bool => Some(ScalarKind::Bool),
        _ => None,
    }
}

impl fmt::Display for VaryingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.kind {
            ScalarKind::Float => format!("f{}", u32::from(self.width) * 8),
            ScalarKind::Sint => format!("i{}", u32::from(self.width) * 8),
            ScalarKind::Uint => format!("u{}", u32::from(self.width) * 8),
            ScalarKind::Bool => "bool".to_string(),
        };
        if self.components == 1 {
            f.write_str(&scalar)
        } else {
            write!(f, "vec{}<{scalar}>", self.components)
        }
    }
}

/// How a varying is interpolated across a primitive.
///
/// WGSL defaults are filled in: float values without `@interpolate` are
/// `perspective, center`, integer values are `flat`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Interpolant {
    pub interpolation: Option<naga::Interpolation>,
    pub sampling: Option<naga::Sampling>,
}

impl Interpolant {
    pub const PERSPECTIVE: Self = Self {
        interpolation: Some(naga::Interpolation::Perspective),
        sampling: Some(naga::Sampling::Center),
    };

    pub const FLAT: Self = Self {
        interpolation: Some(naga::Interpolation::Flat),
        sampling: None,
    };

    pub(crate) fn resolve(
        ty: VaryingType,
        interpolation: Option<naga::Interpolation>,
        sampling: Option<naga::Sampling>,
    ) -> Self {
        let interpolation = interpolation.or(Some(if ty.kind == ScalarKind::Float {
            naga::Interpolation::Perspective
        } else {
            naga::Interpolation::Flat
        }));
        let sampling = match interpolation {
            Some(naga::Interpolation::Perspective | naga::Interpolation::Linear) => {
                sampling.or(Some(naga::Sampling::Center))
            }
            _ => sampling,
        };
        Self { interpolation, sampling }
    }
}

impl fmt::Display for Interpolant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.interpolation, self.sampling) {
            (Some(i), Some(s)) => write!(f, "@interpolate({i:?}, {s:?})"),
            (Some(i), None) => write!(f, "@interpolate({i:?})"),
            (None, _) => f.write_str("no interpolation"),
        }
    }
}

/// A user-defined value bound to `@location(n)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Varying {
    pub location: u32,
    pub name: Option<String>,
    pub ty: VaryingType,
    pub interpolant: Interpolant,
}

/// User-defined values on one side of an entry point (its inputs or its
/// outputs). Builtins are not tracked.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StageInterface {
    pub varyings: Vec<Varying>,
}

impl StageInterface {
    pub fn find(&self, location: u32) -> Option<&Varying> {
        self.varyings.iter().find(|v| v.location == location)
    }

    /// Flattens a binding (or a struct of bindings) into the interface.
    pub fn collect(
        &mut self,
        module: &Module,
        ty: Handle<Type>,
        binding: Option<&Binding>,
        name: Option<&str>,
    ) {
        match binding {
            Some(Binding::BuiltIn(_)) => {}
            Some(Binding::Location {
                location,
                interpolation,
                sampling,
                ..
            }) => {
                match VaryingType::from_inner(&module.types[ty].inner) {
                    Some(vty) => self.varyings.push(Varying {
                        location: *location,
                        name: name.map(str::to_string),
                        ty: vty,
                        interpolant: Interpolant::resolve(vty, *interpolation, *sampling),
                    }),
                    None => log::debug!(
                        "skipping @location({location}) with non scalar/vector type"
                    ),
                }
            }
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                    for m in members {
                        self.collect(module, m.ty, m.binding.as_ref(), m.name.as_deref());
                    }
                }
            }
        }
    }
}

/// A `var<uniform>` declared by a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    pub group: u32,
    pub binding: u32,
    pub name: Option<String>,
    /// Size of the uniform type in bytes.
    pub size: u64,
    pub visibility: wgpu::ShaderStages,
}

pub(crate) fn uniform_bindings(module: &Module, visibility: wgpu::ShaderStages) -> Vec<UniformBinding> {
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            Some(UniformBinding {
                group: rb.group,
                binding: rb.binding,
                name: var.name.clone(),
                size: u64::from(module.types[var.ty].inner.size(module.to_ctx())),
                visibility,
            })
        })
        .collect()
}
