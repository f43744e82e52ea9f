use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::{
    annotate::{Artist, Axes, VAlign, BLACK, WHITE},
    errors::{GeoprepError, Result},
};

/// Segmented scale bar for axes in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBar {
    /// Left end, axes fraction.
    pub x: f64,
    /// Bottom edge, axes fraction.
    pub y: f64,
    pub length_m: f64,
    pub segments: usize,
    /// Bar height, axes fraction.
    pub height: f64,
    pub font_size: f64,
    /// Gap between bar and labels, axes fraction.
    pub label_offset: f64,
}

impl Default for ScaleBar {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.05,
            length_m: 5000.,
            segments: 2,
            height: 0.01,
            font_size: 10.,
            label_offset: 0.01,
        }
    }
}

impl ScaleBar {
    fn validate(&self) -> Result<()> {
        if !(self.length_m.is_finite() && self.length_m > 0.) {
            return Err(GeoprepError::InvalidParameter {
                name: "length_m",
                reason: format!("must be positive, got {}", self.length_m),
            });
        }
        if self.segments == 0 {
            return Err(GeoprepError::InvalidParameter {
                name: "segments",
                reason: "at least one segment is needed".to_string(),
            });
        }
        Ok(())
    }

    /// Labels at every segment boundary, the last one carrying the unit.
    pub fn labels(&self) -> Vec<String> {
        let (scale, unit) = if self.length_m % 1000. == 0. {
            (1000., "km")
        } else {
            (1., "m")
        };
        let step = self.length_m / self.segments as f64;
        (0..=self.segments)
            .map(|boundary| {
                let value = format_distance(boundary as f64 * step / scale);
                if boundary == self.segments {
                    format!("{value} {unit}")
                } else {
                    value
                }
            })
            .collect()
    }

    pub fn draw<'a, A: Axes>(&self, axes: &'a mut A) -> Result<&'a mut A> {
        self.validate()?;
        let extent_height = axes.extent().height();
        let origin = axes.fraction_to_data(Coord {
            x: self.x,
            y: self.y,
        });
        let bar_height = self.height * extent_height;
        let step = self.length_m / self.segments as f64;

        for segment in 0..self.segments {
            let left = origin.x + segment as f64 * step;
            axes.add_artist(Artist::Rectangle {
                rect: Rect::new((left, origin.y), (left + step, origin.y + bar_height)),
                face: if segment % 2 == 0 { BLACK } else { WHITE },
                edge: Some(BLACK),
                line_width: 1.,
            });
        }

        let label_y = origin.y + bar_height + self.label_offset * extent_height;
        for (boundary, text) in self.labels().into_iter().enumerate() {
            axes.add_artist(Artist::Text {
                position: Coord {
                    x: origin.x + boundary as f64 * step,
                    y: label_y,
                },
                text,
                font_size: self.font_size,
                color: BLACK,
                valign: VAlign::Bottom,
            });
        }
        Ok(axes)
    }
}

/// Shortest decimal form, at most three decimals.
fn format_distance(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
