use crate::{BindTarget, GlDevice, GpuError, RawHandle, ResourceKind};
use std::rc::Rc;

/// Sole owner of one device allocation.
///
/// Move-only: there is no `Clone`, so two owners of the same name cannot
/// exist. [`release`](GpuResource::release) frees the allocation at most once
/// and `Drop` calls it for you.
pub struct GpuResource<D: GlDevice + ?Sized> {
    device: Rc<D>,
    kind: ResourceKind,
    handle: Option<RawHandle>,
}

impl<D: GlDevice + ?Sized> GpuResource<D> {
    pub fn acquire(device: &Rc<D>, kind: ResourceKind) -> Result<Self, GpuError> {
        let handle = device.create_object(kind)?;
        tracing::trace!("acquired {kind} {handle}");
        Ok(Self {
            device: Rc::clone(device),
            kind,
            handle: Some(handle),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn target(&self) -> BindTarget {
        self.kind.target()
    }

    /// `None` once released.
    pub fn handle(&self) -> Option<RawHandle> {
        self.handle
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    pub fn device(&self) -> &Rc<D> {
        &self.device
    }

    /// Make this the current object for its target. No-op once released.
    pub fn bind(&self) {
        match self.handle {
            Some(handle) => self.device.bind_object(self.target(), Some(handle)),
            None => tracing::warn!("bind of released {}", self.kind),
        }
    }

    /// Clear the binding for this resource's target.
    pub fn unbind(&self) {
        self.device.bind_object(self.target(), None);
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.delete_object(self.kind, handle);
            tracing::trace!("released {} {handle}", self.kind);
        }
    }
}

impl<D: GlDevice + ?Sized> Drop for GpuResource<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: GlDevice + ?Sized> std::fmt::Debug for GpuResource<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuResource")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlCall, RecordingDevice};

    #[test]
    fn release_twice_frees_once() {
        let device = Rc::new(RecordingDevice::new());
        let mut res = GpuResource::acquire(&device, ResourceKind::VertexBuffer).unwrap();
        assert_eq!(device.live_objects(), 1);

        res.release();
        res.release();
        drop(res);

        assert_eq!(device.live_objects(), 0);
        assert_eq!(device.invalid_deletes(), 0);
        assert_eq!(device.count(|c| matches!(c, GlCall::DeleteObject { .. })), 1);
    }

    #[test]
    fn drop_releases() {
        let device = Rc::new(RecordingDevice::new());
        {
            let _res = GpuResource::acquire(&device, ResourceKind::Texture2d).unwrap();
            assert_eq!(device.live_objects(), 1);
        }
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn move_transfers_ownership() {
        let device = Rc::new(RecordingDevice::new());
        let a = GpuResource::acquire(&device, ResourceKind::IndexBuffer).unwrap();
        let handle = a.handle();
        let b = a;
        assert_eq!(b.handle(), handle);
        drop(b);
        assert_eq!(device.live_objects(), 0);
        assert_eq!(device.invalid_deletes(), 0);
    }

    #[test]
    fn bind_and_unbind_track_target() {
        let device = Rc::new(RecordingDevice::new());
        let res = GpuResource::acquire(&device, ResourceKind::VertexArray).unwrap();
        res.bind();
        assert_eq!(device.bound(BindTarget::VertexArray), res.handle());
        res.unbind();
        assert_eq!(device.bound(BindTarget::VertexArray), None);
    }

    #[test]
    fn bind_after_release_is_noop() {
        let device = Rc::new(RecordingDevice::new());
        let mut res = GpuResource::acquire(&device, ResourceKind::VertexBuffer).unwrap();
        res.release();
        res.bind();
        assert_eq!(device.bound(BindTarget::ArrayBuffer), None);
    }

    #[test]
    fn acquire_failure_surfaces() {
        let device = Rc::new(RecordingDevice::new());
        device.set_allocation_failure(true);
        let err = GpuResource::acquire(&device, ResourceKind::VertexBuffer).unwrap_err();
        assert!(err.to_string().contains("vertex buffer"));
    }
}
