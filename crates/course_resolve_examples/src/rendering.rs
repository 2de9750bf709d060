use std::path::Path;

use course_resolve::prelude::ChainResult;
use image::{Rgb, RgbImage};
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// One polyline in a side-view profile.
#[derive(Debug, Clone)]
pub struct ProfileLine {
    pub label: String,
    pub color: [u8; 3],
    /// `(distance, height)` points.
    pub points: Vec<(f32, f32)>,
}

impl ProfileLine {
    /// Side view of a resolved chain: distance from the head against knot height.
    pub fn from_chain(label: impl Into<String>, color: [u8; 3], chain: &ChainResult) -> Self {
        let mut points = Vec::new();
        let mut distance = 0.0;
        for result in &chain.segments {
            let segment = &result.segment;
            if points.is_empty() {
                points.push((distance, chain.traversal.entry(segment).y));
            }
            distance += segment.length;
            points.push((distance, chain.traversal.exit(segment).y));
        }
        Self {
            label: label.into(),
            color,
            points,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub image_size: (u32, u32),
    pub background: [u8; 3],
    pub margin: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            image_size: (800, 400),
            background: [245, 245, 240],
            margin: 20,
        }
    }
}

impl ProfileConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }
}

/// Renders profile lines into a PNG, scaled to fit the image.
pub fn render_profile_to_png(
    lines: &[ProfileLine],
    config: &ProfileConfig,
    out_path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (width, height) = config.image_size;
    anyhow::ensure!(
        width > 2 * config.margin && height > 2 * config.margin,
        "image is smaller than its margins"
    );
    let mut img = RgbImage::from_pixel(width, height, Rgb(config.background));

    let all = lines.iter().flat_map(|l| l.points.iter().copied());
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f32::MAX, f32::MIN, f32::MAX, f32::MIN);
    for (x, y) in all {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_x > max_x {
        img.save(out_path.as_ref())?;
        return Ok(());
    }

    let span_x = (max_x - min_x).max(f32::EPSILON);
    let span_y = (max_y - min_y).max(1.0);
    let inner_w = (width - 2 * config.margin) as f32;
    let inner_h = (height - 2 * config.margin) as f32;
    let to_px = |(x, y): (f32, f32)| {
        let px = config.margin as f32 + (x - min_x) / span_x * inner_w;
        let py = (height - config.margin) as f32 - (y - min_y) / span_y * inner_h;
        (px, py)
    };

    for line in lines {
        let color = Rgb(line.color);
        for pair in line.points.windows(2) {
            draw_line(&mut img, to_px(pair[0]), to_px(pair[1]), color);
        }
        for &point in &line.points {
            let (px, py) = to_px(point);
            draw_dot(&mut img, px, py, 3, color);
        }
    }

    img.save(out_path.as_ref())?;
    tracing::info!("Wrote {}.", out_path.as_ref().display());
    Ok(())
}

fn draw_line(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        put(img, x, y, color);
    }
}

fn draw_dot(img: &mut RgbImage, cx: f32, cy: f32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, cx + dx as f32, cy + dy as f32, color);
            }
        }
    }
}

fn put(img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x.round() as u32, y.round() as u32);
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}
