//! Sample-point generation
//!
//! Points are generated inside an image's annotation area, or over the whole
//! image when no area is set. Regeneration replaces any existing points.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Point;

#[derive(Debug, Error)]
pub enum PointGenError {
    #[error("Point count must be positive")]
    ZeroPoints,

    #[error("Too many points: {count} (max {max})")]
    TooManyPoints { count: u64, max: u64 },

    #[error("Annotation area exceeds image bounds")]
    AreaOutOfBounds,
}

/// Rectangular pixel region, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    /// The whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), PointGenError> {
        if self.left >= self.right
            || self.top >= self.bottom
            || self.right > image_width
            || self.bottom > image_height
        {
            return Err(PointGenError::AreaOutOfBounds);
        }
        Ok(())
    }
}

/// Requested generation pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerateSpec {
    /// Row-major grid with one point at each cell center
    Grid { rows: u32, columns: u32 },
    /// Uniformly random positions
    Random { count: u32 },
}

impl GenerateSpec {
    pub fn point_count(&self) -> u64 {
        match self {
            Self::Grid { rows, columns } => *rows as u64 * *columns as u64,
            Self::Random { count } => *count as u64,
        }
    }
}

/// Generate sample points for an image.
///
/// `area` defaults to the whole image. Point numbering starts at 1; grid
/// points are numbered row-major.
pub fn generate_points(
    image_width: u32,
    image_height: u32,
    area: Option<PixelRect>,
    spec: GenerateSpec,
    max_points: u64,
    rng: &mut impl Rng,
) -> Result<Vec<Point>, PointGenError> {
    let count = spec.point_count();
    if count == 0 {
        return Err(PointGenError::ZeroPoints);
    }
    if count > max_points {
        return Err(PointGenError::TooManyPoints {
            count,
            max: max_points,
        });
    }

    let area = area.unwrap_or_else(|| PixelRect::full(image_width, image_height));
    area.validate(image_width, image_height)?;

    let mut points = Vec::with_capacity(count as usize);
    match spec {
        GenerateSpec::Grid { rows, columns } => {
            let (w, h) = (area.width() as u64, area.height() as u64);
            for r in 0..rows as u64 {
                for c in 0..columns as u64 {
                    let row = area.top as u64 + (2 * r + 1) * h / (2 * rows as u64);
                    let column = area.left as u64 + (2 * c + 1) * w / (2 * columns as u64);
                    points.push(Point {
                        number: points.len() as u32 + 1,
                        row: row as u32,
                        column: column as u32,
                        display_label: None,
                    });
                }
            }
        }
        GenerateSpec::Random { count } => {
            for _ in 0..count {
                points.push(Point {
                    number: points.len() as u32 + 1,
                    row: rng.random_range(area.top..area.bottom),
                    column: rng.random_range(area.left..area.right),
                    display_label: None,
                });
            }
        }
    }
    Ok(points)
}
