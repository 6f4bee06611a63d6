/// Errors raised by a [`GlDevice`](crate::GlDevice) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create {what}: {message}")]
    Create { what: &'static str, message: String },
}

impl GpuError {
    pub fn create(what: &'static str, message: impl Into<String>) -> Self {
        GpuError::Create {
            what,
            message: message.into(),
        }
    }
}
