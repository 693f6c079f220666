/// What the GPU context did about a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated surface; it was configured again for the current size.
    Reconfigured,
    /// Timeout or other transient failure; this frame is dropped.
    SkipFrame,
    /// Out of memory; the runtime should stop.
    Fatal,
}

impl SurfaceErrorAction {
    pub fn is_fatal(self) -> bool {
        self == SurfaceErrorAction::Fatal
    }
}
