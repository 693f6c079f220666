use std::borrow::Cow;
use std::fmt;

/// Programmable pipeline stage a shader source targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Stage-tagged WGSL source.
///
/// Usually built from a `&'static str` literal or `include_str!`; never mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: Cow<'static, str>,
    label: Option<Cow<'static, str>>,
    entry_point: Option<Cow<'static, str>>,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            stage,
            text: text.into(),
            label: None,
            entry_point: None,
        }
    }

    #[inline]
    pub fn vertex(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderStage::Vertex, text)
    }

    #[inline]
    pub fn fragment(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderStage::Fragment, text)
    }

    /// Debug label used in diagnostics and GPU object names.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Selects a specific entry point.
    ///
    /// Without one, the first entry point of the declared stage is used.
    pub fn with_entry_point(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// Label, falling back to `"<stage> shader"`.
    pub fn label(&self) -> Cow<'_, str> {
        match &self.label {
            Some(l) => Cow::Borrowed(l.as_ref()),
            None => Cow::Owned(format!("{} shader", self.stage)),
        }
    }
}
