use crate::{BufferUsage, GlDevice, GpuError, GpuResource, RawHandle, ResourceKind, VertexAttrib};
use bytemuck::Pod;
use std::rc::Rc;

/// Vertex data store. [`VertexBuffer::with_data`] leaves the buffer bound.
pub struct VertexBuffer<D: GlDevice + ?Sized> {
    resource: GpuResource<D>,
    size_bytes: usize,
}

impl<D: GlDevice + ?Sized> VertexBuffer<D> {
    /// Allocate an empty buffer name.
    pub fn new(device: &Rc<D>) -> Result<Self, GpuError> {
        Ok(Self {
            resource: GpuResource::acquire(device, ResourceKind::VertexBuffer)?,
            size_bytes: 0,
        })
    }

    pub fn with_data<T: Pod>(device: &Rc<D>, vertices: &[T]) -> Result<Self, GpuError> {
        let mut buffer = Self::new(device)?;
        buffer.load_data(vertices);
        Ok(buffer)
    }

    /// Bind and replace the whole store; the size may change.
    pub fn load_data<T: Pod>(&mut self, vertices: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        self.resource.bind();
        self.resource
            .device()
            .buffer_data(self.resource.target(), bytes, BufferUsage::StaticDraw);
        self.size_bytes = bytes.len();
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn handle(&self) -> Option<RawHandle> {
        self.resource.handle()
    }

    pub fn bind(&self) {
        self.resource.bind();
    }

    pub fn unbind(&self) {
        self.resource.unbind();
    }

    pub fn release(&mut self) {
        self.resource.release();
    }
}

/// `u32` index store. Constructors leave the buffer bound.
pub struct IndexBuffer<D: GlDevice + ?Sized> {
    resource: GpuResource<D>,
    count: usize,
}

impl<D: GlDevice + ?Sized> IndexBuffer<D> {
    pub fn new(device: &Rc<D>) -> Result<Self, GpuError> {
        let resource = GpuResource::acquire(device, ResourceKind::IndexBuffer)?;
        resource.bind();
        Ok(Self { resource, count: 0 })
    }

    pub fn with_data(device: &Rc<D>, indices: &[u32]) -> Result<Self, GpuError> {
        let mut buffer = Self::new(device)?;
        buffer.load_data(indices);
        Ok(buffer)
    }

    pub fn load_data(&mut self, indices: &[u32]) {
        self.resource.bind();
        self.resource.device().buffer_data(
            self.resource.target(),
            bytemuck::cast_slice(indices),
            BufferUsage::StaticDraw,
        );
        self.count = indices.len();
    }

    /// Number of indices in the store.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn handle(&self) -> Option<RawHandle> {
        self.resource.handle()
    }

    pub fn bind(&self) {
        self.resource.bind();
    }

    pub fn unbind(&self) {
        self.resource.unbind();
    }

    pub fn release(&mut self) {
        self.resource.release();
    }
}

/// Vertex attribute layout. Created bound.
pub struct VertexArray<D: GlDevice + ?Sized> {
    resource: GpuResource<D>,
    attribs: Vec<VertexAttrib>,
}

impl<D: GlDevice + ?Sized> VertexArray<D> {
    pub fn new(device: &Rc<D>) -> Result<Self, GpuError> {
        let resource = GpuResource::acquire(device, ResourceKind::VertexArray)?;
        resource.bind();
        Ok(Self {
            resource,
            attribs: Vec::new(),
        })
    }

    /// Describe one attribute sourced from the bound vertex buffer.
    ///
    /// Does not bind the array; it must already be bound.
    pub fn link_attrib(&mut self, attrib: VertexAttrib) {
        self.resource.device().vertex_attrib(attrib);
        self.attribs.push(attrib);
    }

    pub fn attribs(&self) -> &[VertexAttrib] {
        &self.attribs
    }

    pub fn handle(&self) -> Option<RawHandle> {
        self.resource.handle()
    }

    pub fn bind(&self) {
        self.resource.bind();
    }

    pub fn unbind(&self) {
        self.resource.unbind();
    }

    pub fn release(&mut self) {
        self.resource.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindTarget, GlCall, RecordingDevice};

    #[test]
    fn vertex_buffer_upload() {
        let device = Rc::new(RecordingDevice::new());
        let data = [0.0f32; 8];
        let vbo = VertexBuffer::with_data(&device, &data).unwrap();
        assert_eq!(vbo.size_bytes(), 32);
        assert_eq!(device.bound(BindTarget::ArrayBuffer), vbo.handle());
        assert_eq!(
            device.count(|c| matches!(c, GlCall::BufferData { len: 32, .. })),
            1
        );
    }

    #[test]
    fn load_data_replaces_store_with_new_size() {
        let device = Rc::new(RecordingDevice::new());
        let mut ebo = IndexBuffer::with_data(&device, &[0, 1, 2]).unwrap();
        ebo.unbind();
        ebo.load_data(&[0, 1, 2, 2, 3, 0]);

        assert_eq!(ebo.len(), 6);
        assert_eq!(device.bound(BindTarget::ElementArrayBuffer), ebo.handle());
        let sizes: Vec<usize> = device
            .calls()
            .iter()
            .filter_map(|c| match c {
                GlCall::BufferData { len, .. } => Some(*len),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![12, 24]);
        assert_eq!(device.live_objects(), 1);
    }

    #[test]
    fn link_attrib_does_not_bind() {
        let device = Rc::new(RecordingDevice::new());
        let mut vao = VertexArray::new(&device).unwrap();
        device.clear_calls();
        let attrib = VertexAttrib {
            location: 0,
            components: 2,
            stride: 16,
            offset: 0,
        };
        vao.link_attrib(attrib);
        assert_eq!(device.calls(), vec![GlCall::VertexAttrib(attrib)]);
        assert_eq!(vao.attribs(), &[attrib]);
    }

    #[test]
    fn buffers_release_once() {
        let device = Rc::new(RecordingDevice::new());
        let mut vbo = VertexBuffer::new(&device).unwrap();
        let mut vao = VertexArray::new(&device).unwrap();
        vbo.release();
        vbo.release();
        vao.release();
        drop(vbo);
        drop(vao);
        assert_eq!(device.live_objects(), 0);
        assert_eq!(device.invalid_deletes(), 0);
    }
}
