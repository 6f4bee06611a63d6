use crate::{
    CubeFace, Filter, GlDevice, GpuError, GpuResource, PixelFormat, RawHandle,
    ResourceKind, ShaderProgram, TexImageTarget, TextureParam, Wrap,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Errors from decoding or uploading texture images.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u8),
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelLength { expected: usize, actual: usize },
    #[error("cube face {face} is {width}x{height}, expected {expected}x{expected}")]
    FaceSize {
        face: CubeFace,
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error(transparent)]
    Device(#[from] GpuError),
}

/// What a texture represents to the material using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureRole {
    #[default]
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureRole {
    pub fn name(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "diffuse",
            TextureRole::Specular => "specular",
            TextureRole::Normal => "normal",
            TextureRole::Height => "height",
        }
    }
}

/// 8-bit interleaved pixels plus their channel count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Decode an image file, optionally flipping it so the first row is the bottom.
    ///
    /// Grey, RGB and RGBA images keep their channel count; anything else
    /// (e.g. grey+alpha) is rejected.
    pub fn open(path: impl AsRef<Path>, flip_vertically: bool) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let mut img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        if flip_vertically {
            img = img.flipv();
        }
        let channels = img.color().channel_count();
        let ((width, height), pixels) = match channels {
            1 => {
                let buf = img.to_luma8();
                (buf.dimensions(), buf.into_raw())
            }
            3 => {
                let buf = img.to_rgb8();
                (buf.dimensions(), buf.into_raw())
            }
            4 => {
                let buf = img.to_rgba8();
                (buf.dimensions(), buf.into_raw())
            }
            other => return Err(TextureError::UnsupportedChannels(other)),
        };
        tracing::debug!("decoded {} ({width}x{height}, {channels} channels)", path.display());
        Self::from_raw(width, height, channels, pixels)
    }

    pub fn format(&self) -> Result<PixelFormat, TextureError> {
        PixelFormat::from_channels(self.channels)
            .ok_or(TextureError::UnsupportedChannels(self.channels))
    }
}

/// 2D texture bound to a fixed texture unit.
///
/// Nearest filtering, repeat wrapping, mipmapped.
pub struct Texture2d<D: GlDevice + ?Sized> {
    resource: GpuResource<D>,
    unit: u32,
    role: TextureRole,
    size: (u32, u32),
    path: Option<PathBuf>,
}

impl<D: GlDevice + ?Sized> Texture2d<D> {
    /// Upload a decoded image. The format is checked before anything is allocated.
    pub fn from_image(
        device: &Rc<D>,
        image: &DecodedImage,
        unit: u32,
        role: TextureRole,
    ) -> Result<Self, TextureError> {
        let format = image.format()?;
        let resource = GpuResource::acquire(device, ResourceKind::Texture2d)?;
        let target = resource.target();

        device.active_texture(unit);
        resource.bind();
        device.texture_parameter(target, TextureParam::MinFilter(Filter::Nearest));
        device.texture_parameter(target, TextureParam::MagFilter(Filter::Nearest));
        device.texture_parameter(target, TextureParam::WrapS(Wrap::Repeat));
        device.texture_parameter(target, TextureParam::WrapT(Wrap::Repeat));
        device.tex_image_2d(
            TexImageTarget::Texture2d,
            image.width,
            image.height,
            format,
            &image.pixels,
        );
        device.generate_mipmap(target);
        resource.unbind();

        Ok(Self {
            resource,
            unit,
            role,
            size: (image.width, image.height),
            path: None,
        })
    }

    /// Decode (flipped) and upload an image file.
    pub fn from_path(
        device: &Rc<D>,
        path: impl AsRef<Path>,
        unit: u32,
        role: TextureRole,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = DecodedImage::open(path, true)?;
        let mut texture = Self::from_image(device, &image, unit, role)?;
        texture.path = Some(path.to_path_buf());
        Ok(texture)
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn set_unit(&mut self, unit: u32) {
        self.unit = unit;
    }

    pub fn role(&self) -> TextureRole {
        self.role
    }

    pub fn set_role(&mut self, role: TextureRole) {
        self.role = role;
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Source file, when loaded from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn handle(&self) -> Option<RawHandle> {
        self.resource.handle()
    }

    /// Point the sampler uniform `uniform` of `shader` at this texture's unit.
    pub fn assign(&self, shader: &ShaderProgram<D>, uniform: &str) {
        shader.activate();
        shader.set_uniform(uniform, self.unit as i32);
    }

    /// Select this texture's unit and bind to it.
    pub fn bind(&self) {
        self.resource.device().active_texture(self.unit);
        self.resource.bind();
    }

    pub fn unbind(&self) {
        self.resource.unbind();
    }

    pub fn release(&mut self) {
        self.resource.release();
    }
}

/// Six-faced cube texture. Nearest filtering, clamped on all three axes.
pub struct CubeTexture<D: GlDevice + ?Sized> {
    resource: GpuResource<D>,
    unit: u32,
    role: TextureRole,
    edge: u32,
}

impl<D: GlDevice + ?Sized> CubeTexture<D> {
    /// Upload six faces given in [`CubeFace::ALL`] order.
    ///
    /// Faces must be square, equally sized and in a supported format; all of
    /// this is checked before anything is allocated.
    pub fn from_images(
        device: &Rc<D>,
        faces: &[DecodedImage; 6],
        unit: u32,
        role: TextureRole,
    ) -> Result<Self, TextureError> {
        let edge = faces[0].width;
        let mut formats = Vec::with_capacity(6);
        for (face, image) in CubeFace::ALL.iter().zip(faces) {
            if image.width != edge || image.height != edge {
                return Err(TextureError::FaceSize {
                    face: *face,
                    width: image.width,
                    height: image.height,
                    expected: edge,
                });
            }
            formats.push(image.format()?);
        }

        let resource = GpuResource::acquire(device, ResourceKind::TextureCube)?;
        let target = resource.target();

        device.active_texture(unit);
        resource.bind();
        device.texture_parameter(target, TextureParam::MinFilter(Filter::Nearest));
        device.texture_parameter(target, TextureParam::MagFilter(Filter::Nearest));
        device.texture_parameter(target, TextureParam::WrapS(Wrap::ClampToEdge));
        device.texture_parameter(target, TextureParam::WrapT(Wrap::ClampToEdge));
        device.texture_parameter(target, TextureParam::WrapR(Wrap::ClampToEdge));
        for ((face, image), format) in CubeFace::ALL.iter().zip(faces).zip(formats) {
            device.tex_image_2d(
                TexImageTarget::CubeFace(*face),
                image.width,
                image.height,
                format,
                &image.pixels,
            );
        }
        resource.unbind();

        Ok(Self {
            resource,
            unit,
            role,
            edge,
        })
    }

    /// Decode six face files (unflipped) in [`CubeFace::ALL`] order and upload them.
    pub fn from_paths<P: AsRef<Path>>(
        device: &Rc<D>,
        paths: &[P; 6],
        unit: u32,
        role: TextureRole,
    ) -> Result<Self, TextureError> {
        let open = |path: &P| DecodedImage::open(path, false);
        let faces = [
            open(&paths[0])?,
            open(&paths[1])?,
            open(&paths[2])?,
            open(&paths[3])?,
            open(&paths[4])?,
            open(&paths[5])?,
        ];
        Self::from_images(device, &faces, unit, role)
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn set_unit(&mut self, unit: u32) {
        self.unit = unit;
    }

    pub fn role(&self) -> TextureRole {
        self.role
    }

    pub fn set_role(&mut self, role: TextureRole) {
        self.role = role;
    }

    /// Face edge length in pixels.
    pub fn edge(&self) -> u32 {
        self.edge
    }

    pub fn handle(&self) -> Option<RawHandle> {
        self.resource.handle()
    }

    pub fn assign(&self, shader: &ShaderProgram<D>, uniform: &str) {
        shader.activate();
        shader.set_uniform(uniform, self.unit as i32);
    }

    pub fn bind(&self) {
        self.resource.device().active_texture(self.unit);
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
    use crate::{BindTarget, GlCall, RecordingDevice, UniformValue};

    fn solid(width: u32, height: u32, channels: u8) -> DecodedImage {
        let len = (width * height) as usize * channels as usize;
        DecodedImage::from_raw(width, height, channels, vec![200; len]).unwrap()
    }

    fn sampler_program(
        device: &Rc<RecordingDevice>,
    ) -> (tempfile::TempDir, ShaderProgram<RecordingDevice>) {
        let dir = tempfile::tempdir().unwrap();
        let vert = dir.path().join("t.vert");
        let frag = dir.path().join("t.frag");
        std::fs::write(&vert, "void main() {}").unwrap();
        std::fs::write(&frag, "uniform sampler2D u_texture;\nvoid main() {}").unwrap();
        let program = ShaderProgram::from_files(device, vert, frag).unwrap();
        (dir, program)
    }

    fn uploads(device: &RecordingDevice) -> Vec<(TexImageTarget, PixelFormat)> {
        device
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::TexImage2d { target, format, .. } => Some((target, format)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn channel_count_selects_source_format() {
        let device = Rc::new(RecordingDevice::new());
        for (channels, format) in [
            (1, PixelFormat::Red),
            (3, PixelFormat::Rgb),
            (4, PixelFormat::Rgba),
        ] {
            device.clear_calls();
            let tex =
                Texture2d::from_image(&device, &solid(2, 2, channels), 0, TextureRole::Diffuse)
                    .unwrap();
            assert_eq!(uploads(&device), vec![(TexImageTarget::Texture2d, format)]);
            assert_eq!(tex.size(), (2, 2));
        }
    }

    #[test]
    fn unsupported_channels_fail_before_allocation() {
        let device = Rc::new(RecordingDevice::new());
        let err = Texture2d::from_image(&device, &solid(2, 2, 2), 0, TextureRole::Diffuse)
            .err()
            .unwrap();
        assert!(matches!(err, TextureError::UnsupportedChannels(2)));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn pixel_length_is_validated() {
        let err = DecodedImage::from_raw(4, 4, 3, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            TextureError::PixelLength {
                expected: 48,
                actual: 10
            }
        ));
    }

    #[test]
    fn texture_2d_parameters() {
        let device = Rc::new(RecordingDevice::new());
        let tex = Texture2d::from_image(&device, &solid(4, 4, 4), 3, TextureRole::Specular).unwrap();
        let calls = device.calls();
        assert!(calls.contains(&GlCall::ActiveTexture(3)));
        assert!(calls.contains(&GlCall::TextureParameter {
            target: BindTarget::Texture2d,
            param: TextureParam::WrapS(Wrap::Repeat),
        }));
        assert!(calls.contains(&GlCall::GenerateMipmap(BindTarget::Texture2d)));
        assert_eq!(device.bound(BindTarget::Texture2d), None);
        assert_eq!(tex.unit(), 3);
        assert_eq!(tex.role(), TextureRole::Specular);
    }

    #[test]
    fn cube_uploads_six_faces_in_order() {
        let device = Rc::new(RecordingDevice::new());
        let faces = std::array::from_fn(|_| solid(8, 8, 3));
        let cube = CubeTexture::from_images(&device, &faces, 1, TextureRole::Diffuse).unwrap();

        let targets: Vec<_> = uploads(&device).into_iter().map(|(t, _)| t).collect();
        let expected: Vec<_> = CubeFace::ALL
            .iter()
            .map(|f| TexImageTarget::CubeFace(*f))
            .collect();
        assert_eq!(targets, expected);
        assert!(device.calls().contains(&GlCall::TextureParameter {
            target: BindTarget::TextureCubeMap,
            param: TextureParam::WrapR(Wrap::ClampToEdge),
        }));
        assert_eq!(device.count(|c| matches!(c, GlCall::GenerateMipmap(_))), 0);
        assert_eq!(cube.edge(), 8);
    }

    #[test]
    fn assign_points_sampler_at_unit() {
        let device = Rc::new(RecordingDevice::new());
        let (_dir, shader) = sampler_program(&device);
        let mut tex =
            Texture2d::from_image(&device, &solid(2, 2, 4), 2, TextureRole::Diffuse).unwrap();
        device.use_program(None);

        tex.assign(&shader, "u_texture");
        assert_eq!(device.active_program(), shader.program_id());
        assert_eq!(device.active_uniform("u_texture"), Some(UniformValue::I32(2)));

        tex.set_unit(5);
        tex.assign(&shader, "u_texture");
        assert_eq!(device.active_uniform("u_texture"), Some(UniformValue::I32(5)));
    }

    #[test]
    fn cube_assign_points_sampler_at_unit() {
        let device = Rc::new(RecordingDevice::new());
        let (_dir, shader) = sampler_program(&device);
        let faces = std::array::from_fn(|_| solid(4, 4, 3));
        let cube = CubeTexture::from_images(&device, &faces, 7, TextureRole::Diffuse).unwrap();
        device.use_program(None);

        cube.assign(&shader, "u_skybox");
        assert_eq!(device.active_program(), shader.program_id());
        assert_eq!(device.active_uniform("u_skybox"), Some(UniformValue::I32(7)));
    }

    #[test]
    fn cube_rejects_mismatched_faces() {
        let device = Rc::new(RecordingDevice::new());
        let mut faces: [DecodedImage; 6] = std::array::from_fn(|_| solid(8, 8, 4));
        faces[4] = solid(4, 4, 4);
        let err = CubeTexture::from_images(&device, &faces, 0, TextureRole::Diffuse)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TextureError::FaceSize {
                face: CubeFace::PositiveZ,
                ..
            }
        ));
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn open_flips_and_keeps_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grad.png");
        let mut img = image::RgbImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.save(&path).unwrap();

        let flipped = DecodedImage::open(&path, true).unwrap();
        assert_eq!(flipped.channels, 3);
        assert_eq!(&flipped.pixels[..3], &[0, 0, 255]);

        let upright = DecodedImage::open(&path, false).unwrap();
        assert_eq!(&upright.pixels[..3], &[255, 0, 0]);
    }

    #[test]
    fn open_rejects_grey_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("la.png");
        image::GrayAlphaImage::new(2, 2).save(&path).unwrap();
        let err = DecodedImage::open(&path, false).unwrap_err();
        assert!(matches!(err, TextureError::UnsupportedChannels(2)));
    }

    #[test]
    fn missing_file_is_decode_error() {
        let device = Rc::new(RecordingDevice::new());
        let err = Texture2d::from_path(&device, "/nonexistent/tex.png", 0, TextureRole::Diffuse)
            .err()
            .unwrap();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn from_path_remembers_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        image::GrayImage::new(4, 4).save(&path).unwrap();
        let device = Rc::new(RecordingDevice::new());
        let tex = Texture2d::from_path(&device, &path, 0, TextureRole::Height).unwrap();
        assert_eq!(tex.path(), Some(path.as_path()));
        assert_eq!(uploads(&device)[0].1, PixelFormat::Red);
    }
}
