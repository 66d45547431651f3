//! Draw command consumers.
//!
//! The compositor never rasterizes anything itself. Each frame it calls
//! [`DrawSink::begin_frame`], then [`DrawSink::draw`] once per visible
//! particle in back-to-front order, then [`DrawSink::end_frame`].
//!
//! Provided sinks:
//!
//! - `Vec<DrawCommand>` collects commands as-is;
//! - [`SpriteBuffer`] packs them into a GPU-ready instance array;
//! - [`ImageSink`] rasterizes squares into an RGBA image that can be saved
//!   as PNG;
//! - [`CountingSink`] only counts.

use crate::camera::Viewport;
use crate::error::ExportError;
use crate::particle::Rgb;
use bytemuck::{Pod, Zeroable};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;

/// One square sprite to draw, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Top-left corner, snapped to the pixel grid.
    pub x: f32,
    pub y: f32,
    pub rgb: (u8, u8, u8),
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Side length.
    pub size: f32,
}

/// Receiver of a frame's draw commands.
pub trait DrawSink {
    /// Called before the first command of a frame.
    fn begin_frame(&mut self, _viewport: Viewport) {}

    /// Draw one sprite.
    fn draw(&mut self, command: &DrawCommand);

    /// Called after the last command of a frame.
    fn end_frame(&mut self) {}
}

impl DrawSink for Vec<DrawCommand> {
    fn begin_frame(&mut self, _viewport: Viewport) {
        self.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.push(*command);
    }
}

/// Counts commands and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingSink {
    pub frames: u64,
    /// Commands in the current (or last finished) frame.
    pub commands: usize,
    /// Commands over every frame.
    pub total: u64,
}

impl DrawSink for CountingSink {
    fn begin_frame(&mut self, _viewport: Viewport) {
        self.frames += 1;
        self.commands = 0;
    }

    fn draw(&mut self, _command: &DrawCommand) {
        self.commands += 1;
        self.total += 1;
    }
}

// ============================================================================
// GPU instances
// ============================================================================

/// GPU-compatible sprite instance (20 bytes, no padding).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub alpha: f32,
    /// RGB plus a constant 255 fourth byte.
    pub color: [u8; 4],
}

impl From<&DrawCommand> for SpriteInstance {
    fn from(c: &DrawCommand) -> Self {
        let (r, g, b) = c.rgb;
        Self {
            position: [c.x, c.y],
            size: c.size,
            alpha: c.alpha,
            color: [r, g, b, 255],
        }
    }
}

/// Collects a frame as [`SpriteInstance`]s for upload by a host renderer.
#[derive(Debug, Clone, Default)]
pub struct SpriteBuffer {
    instances: Vec<SpriteInstance>,
    viewport: Option<Viewport>,
}

impl SpriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    /// Raw bytes of the instance array.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Viewport of the last frame, if any frame began.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

impl DrawSink for SpriteBuffer {
    fn begin_frame(&mut self, viewport: Viewport) {
        self.instances.clear();
        self.viewport = Some(viewport);
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.instances.push(SpriteInstance::from(command));
    }
}

// ============================================================================
// Raster
// ============================================================================

/// Software rasterizer: each command becomes an alpha-blended square.
#[derive(Debug, Clone)]
pub struct ImageSink {
    image: RgbaImage,
    background: Rgb,
}

impl ImageSink {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let mut sink = Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
            background,
        };
        sink.clear();
        sink
    }

    /// Sized to `viewport` (rounded up to whole pixels).
    pub fn for_viewport(viewport: Viewport, background: Rgb) -> Self {
        Self::new(
            viewport.width.max(1.0).ceil() as u32,
            viewport.height.max(1.0).ceil() as u32,
            background,
        )
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Fill with the background color.
    pub fn clear(&mut self) {
        let Rgb { r, g, b } = self.background;
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([r, g, b, 255]);
        }
    }

    /// Encode the current image as PNG, creating parent directories.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn blend(&mut self, x: u32, y: u32, rgb: (u8, u8, u8), alpha: f32) {
        let dst = self.image.get_pixel_mut(x, y);
        let mix = |d: u8, s: u8| (d as f32 + (s as f32 - d as f32) * alpha).round() as u8;
        dst.0 = [mix(dst.0[0], rgb.0), mix(dst.0[1], rgb.1), mix(dst.0[2], rgb.2), 255];
    }
}

impl DrawSink for ImageSink {
    fn begin_frame(&mut self, _viewport: Viewport) {
        self.clear();
    }

    fn draw(&mut self, c: &DrawCommand) {
        let alpha = crate::math::clamp01(c.alpha);
        if alpha <= 0.0 || !(c.size > 0.0) {
            return;
        }
        let (w, h) = self.image.dimensions();
        let x0 = c.x.floor().max(0.0);
        let y0 = c.y.floor().max(0.0);
        let x1 = (c.x + c.size).ceil().min(w as f32);
        let y1 = (c.y + c.size).ceil().min(h as f32);
        if !(x0 < x1 && y0 < y1) {
            return;
        }
        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                self.blend(x, y, c.rgb, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(x: f32, y: f32, alpha: f32) -> DrawCommand {
        DrawCommand {
            x,
            y,
            rgb: (255, 0, 0),
            alpha,
            size: 2.0,
        }
    }

    #[test]
    fn test_vec_sink_collects_per_frame() {
        let mut sink: Vec<DrawCommand> = Vec::new();
        sink.begin_frame(Viewport::default());
        sink.draw(&command(0.0, 0.0, 1.0));
        sink.draw(&command(2.0, 0.0, 1.0));
        assert_eq!(sink.len(), 2);
        sink.begin_frame(Viewport::default());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sprite_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 20);
        let mut buffer = SpriteBuffer::new();
        buffer.begin_frame(Viewport::default());
        buffer.draw(&command(4.0, 6.0, 0.5));
        assert_eq!(buffer.as_bytes().len(), 20);
        assert_eq!(buffer.instances()[0].color, [255, 0, 0, 255]);
        assert_eq!(buffer.instances()[0].position, [4.0, 6.0]);
    }

    #[test]
    fn test_counting_sink() {
        let mut sink = CountingSink::default();
        for _ in 0..2 {
            sink.begin_frame(Viewport::default());
            sink.draw(&command(0.0, 0.0, 1.0));
        }
        assert_eq!(sink.frames, 2);
        assert_eq!(sink.commands, 1);
        assert_eq!(sink.total, 2);
    }

    #[test]
    fn test_image_sink_blends_and_clips() {
        let mut sink = ImageSink::new(8, 8, Rgb::BLACK);
        sink.begin_frame(Viewport::new(8.0, 8.0));
        sink.draw(&command(2.0, 2.0, 1.0));
        sink.draw(&command(6.0, 6.0, 0.5));
        // Partly outside
        sink.draw(&command(-1.0, 7.0, 1.0));
        // Fully outside
        sink.draw(&command(20.0, 20.0, 1.0));

        let image = sink.image();
        assert_eq!(image.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(7, 7).0, [128, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 7).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames").join("f.png");
        let mut sink = ImageSink::new(4, 3, Rgb::new(10, 20, 30));
        sink.draw(&command(0.0, 0.0, 1.0));
        sink.save_png(&path).unwrap();
        let loaded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(loaded.dimensions(), (4, 3));
        assert_eq!(loaded.get_pixel(3, 2).0, [10, 20, 30, 255]);
    }
}
