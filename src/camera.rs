//! Camera-substitute image source
//!
//! Feeds the machine core a resized, RGB565 frame on demand from whatever
//! still image the front-end last supplied. The derived frame is cached and
//! lazily recomputed, and handed out by shared ownership so it stays valid
//! until the consumer is done with it, however late the next image arrives.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

/// Pixel format of frames handed to the machine core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Rgb565,
}

/// Capture lifecycle of the image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    CaptureRequested,
    Active,
    TeardownRequested,
}

/// Errors from loading a source image from disk.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("failed to load camera image: {0}")]
    Image(#[from] image::ImageError),
}

/// One derived RGB565 image, scaled to cover the requested dimensions.
#[derive(Debug)]
struct Rgb565Image {
    data: Vec<u16>,
    width: u32,
}

/// A frame served to the machine core.
///
/// `pixels()[y * stride() + x]` addresses the visible region; the stride can
/// exceed the width when the cached image is wider than requested.
#[derive(Clone)]
pub struct CamFrame {
    image: Arc<Rgb565Image>,
    offset: usize,
    width: u32,
    height: u32,
}

impl CamFrame {
    /// Pixel data starting at the top-left of the visible region.
    pub fn pixels(&self) -> &[u16] {
        &self.image.data[self.offset..]
    }

    /// Row stride in pixels.
    pub fn stride(&self) -> usize {
        self.image.width as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ColorFormat {
        ColorFormat::Rgb565
    }
}

#[derive(Default)]
struct ImageBuffer {
    source: Option<RgbaImage>,
    width: u32,
    height: u32,
    cache: Option<Arc<Rgb565Image>>,
    out_of_date: bool,
}

/// Thread-safe double-buffered image provider (camera substitute).
pub struct ImageSource {
    buffer: Mutex<ImageBuffer>,
    state: Mutex<CaptureState>,
}

impl ImageSource {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(ImageBuffer::default()),
            state: Mutex::new(CaptureState::Idle),
        }
    }

    /// Begins serving frames at the given dimensions.
    ///
    /// Installs a flat placeholder when no source image has been supplied
    /// yet. Restarting while already active just adopts the new dimensions.
    pub fn start_capture(&self, width: u32, height: u32) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = CaptureState::CaptureRequested;
        }
        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            if buffer.width != width || buffer.height != height {
                buffer.width = width;
                buffer.height = height;
                buffer.out_of_date = true;
            }
            if buffer.source.is_none() {
                buffer.source = Some(placeholder_image());
                buffer.out_of_date = true;
            }
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = CaptureState::Active;
    }

    /// Stops serving frames. A no-op while idle.
    pub fn stop_capture(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == CaptureState::Idle {
            return;
        }
        *state = CaptureState::TeardownRequested;
        *state = CaptureState::Idle;
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the source image. Empty images are ignored.
    pub fn set_image(&self, image: RgbaImage) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.source = Some(image);
        buffer.cache = None;
        buffer.out_of_date = true;
    }

    /// Loads a source image from disk.
    pub fn load_image(&self, path: &Path) -> Result<(), CameraError> {
        let image = image::open(path)?.to_rgba8();
        self.set_image(image);
        Ok(())
    }

    /// Returns the current frame, recomputing the cache only when the source
    /// or requested dimensions changed since the last call.
    pub fn request_image(&self) -> CamFrame {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);

        if buffer.source.is_none() {
            buffer.source = Some(placeholder_image());
            buffer.out_of_date = true;
        }
        let (width, height) = match (buffer.width, buffer.height) {
            (0, _) | (_, 0) => buffer
                .source
                .as_ref()
                .map(|s| s.dimensions())
                .unwrap_or((1, 1)),
            dims => dims,
        };

        let cache = match (buffer.cache.clone(), buffer.out_of_date) {
            (Some(cache), false) => cache,
            _ => {
                let rebuilt = Arc::new(match buffer.source.as_ref() {
                    Some(source) => resize_to_cover(source, width, height),
                    None => blank(width, height),
                });
                buffer.cache = Some(Arc::clone(&rebuilt));
                buffer.out_of_date = false;
                rebuilt
            }
        };

        let cache_width = cache.width;
        let cache_height = (cache.data.len() / cache_width.max(1) as usize) as u32;
        let dx = cache_width.saturating_sub(width) / 2;
        let dy = cache_height.saturating_sub(height) / 2;
        CamFrame {
            image: cache,
            offset: (dy * cache_width + dx) as usize,
            width,
            height,
        }
    }
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat frame shown before the front-end supplies an image.
fn placeholder_image() -> RgbaImage {
    RgbaImage::from_pixel(256, 192, Rgba([0x30, 0x30, 0x30, 0xFF]))
}

fn rgb565(pixel: &Rgba<u8>) -> u16 {
    let [r, g, b, _] = pixel.0;
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

fn blank(width: u32, height: u32) -> Rgb565Image {
    Rgb565Image {
        data: vec![0; (width * height) as usize],
        width,
    }
}

/// Scales so both dimensions cover the request, preserving aspect ratio, and
/// converts to RGB565. The consumer crops to the center via the frame offset.
fn resize_to_cover(source: &RgbaImage, width: u32, height: u32) -> Rgb565Image {
    let (sw, sh) = source.dimensions();
    let scale = f64::max(width as f64 / sw as f64, height as f64 / sh as f64);
    let tw = ((sw as f64 * scale).round() as u32).max(width);
    let th = ((sh as f64 * scale).round() as u32).max(height);
    let resized = if (tw, th) == (sw, sh) {
        source.clone()
    } else {
        image::imageops::resize(source, tw, th, FilterType::Triangle)
    };
    Rgb565Image {
        data: resized.pixels().map(rgb565).collect(),
        width: tw,
    }
}
