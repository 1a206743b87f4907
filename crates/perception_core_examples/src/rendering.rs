use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::Vec2;
use image::{Rgb, RgbImage};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,perception_core=debug"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// How points of one category are drawn.
#[derive(Debug, Clone, Copy)]
pub enum PointStyle {
    Circle { color: [u8; 3], radius: u32 },
    Square { color: [u8; 3], half_size: u32 },
}

impl Default for PointStyle {
    fn default() -> Self {
        PointStyle::Circle {
            color: [40, 40, 40],
            radius: 3,
        }
    }
}

/// Maps a world-space rectangle onto an image.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// Lower-left corner of the rendered area.
    pub origin: Vec2,
    pub extent: Vec2,
    pub background: [u8; 3],
    styles: HashMap<String, PointStyle>,
}

impl RenderConfig {
    /// Renders `extent`, centered on the origin.
    pub fn new(image_size: (u32, u32), extent: Vec2) -> Self {
        Self {
            image_size,
            origin: -extent * 0.5,
            extent,
            background: [255, 255, 255],
            styles: HashMap::new(),
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn set_style(&mut self, category: impl Into<String>, style: PointStyle) -> &mut Self {
        self.styles.insert(category.into(), style);
        self
    }

    fn style(&self, category: &str) -> PointStyle {
        self.styles.get(category).copied().unwrap_or_default()
    }

    fn to_pixel(&self, point: Vec2) -> Option<(i64, i64)> {
        let local = (point - self.origin) / self.extent;
        if !local.is_finite() || local.min_element() < 0.0 || local.max_element() > 1.0 {
            return None;
        }
        let (w, h) = self.image_size;
        let x = (local.x * (w.saturating_sub(1)) as f32).round() as i64;
        // Image rows grow downwards.
        let y = ((1.0 - local.y) * (h.saturating_sub(1)) as f32).round() as i64;
        Some((x, y))
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, Rgb(color));
}

fn draw(img: &mut RgbImage, (cx, cy): (i64, i64), style: PointStyle) {
    match style {
        PointStyle::Circle { color, radius } => {
            let r = radius as i64;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        put(img, cx + dx, cy + dy, color);
                    }
                }
            }
        }
        PointStyle::Square { color, half_size } => {
            let s = half_size as i64;
            for dy in -s..=s {
                for dx in -s..=s {
                    put(img, cx + dx, cy + dy, color);
                }
            }
        }
    }
}

/// Draws categorized points and writes the image as PNG.
///
/// Points outside the configured area are skipped.
pub fn render_points_to_png<'a>(
    points: impl IntoIterator<Item = (&'a str, Vec2)>,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    anyhow::ensure!(w > 0 && h > 0, "image size must be non-zero");
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    let mut drawn = 0usize;
    for (category, point) in points {
        if let Some(pixel) = config.to_pixel(point) {
            draw(&mut img, pixel, config.style(category));
            drawn += 1;
        }
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), points = drawn, "rendered image");
    Ok(())
}
