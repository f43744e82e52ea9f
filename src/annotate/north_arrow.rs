use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{
    annotate::{Artist, Axes, VAlign, BLACK},
    errors::{GeoprepError, Result},
};

/// Arrow pointing up the axes to `(x, y)`, labelled at its tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NorthArrow {
    /// Arrow tip, axes fraction.
    pub x: f64,
    pub y: f64,
    /// Axes fraction.
    pub length: f64,
    pub width: f64,
    pub head_width: f64,
    pub head_length: f64,
    pub font_size: f64,
    pub label: String,
}

impl Default for NorthArrow {
    fn default() -> Self {
        Self {
            x: 0.9,
            y: 0.95,
            length: 0.1,
            width: 5.,
            head_width: 15.,
            head_length: 12.,
            font_size: 20.,
            label: "N".to_string(),
        }
    }
}

impl NorthArrow {
    pub fn draw<'a, A: Axes>(&self, axes: &'a mut A) -> Result<&'a mut A> {
        if !(self.length.is_finite() && self.length > 0.) {
            return Err(GeoprepError::InvalidParameter {
                name: "length",
                reason: format!("must be positive, got {}", self.length),
            });
        }
        let head = axes.fraction_to_data(Coord {
            x: self.x,
            y: self.y,
        });
        let tail = axes.fraction_to_data(Coord {
            x: self.x,
            y: self.y - self.length,
        });
        axes.add_artist(Artist::Arrow {
            tail,
            head,
            width: self.width,
            head_width: self.head_width,
            head_length: self.head_length,
            color: BLACK,
        });
        axes.add_artist(Artist::Text {
            position: tail,
            text: self.label.clone(),
            font_size: self.font_size,
            color: BLACK,
            valign: VAlign::Center,
        });
        Ok(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{MapAxes, ScaleBar};
    use geo::Rect;
    use rstest::rstest;

    #[rstest]
    fn arrow_and_label() {
        let mut axes = MapAxes::new(Rect::new((0., 0.), (1000., 2000.)));
        NorthArrow::default().draw(&mut axes).unwrap();
        let [Artist::Arrow { tail, head, width, .. }, Artist::Text { position, text, .. }] =
            axes.artists()
        else {
            panic!("unexpected artists {:?}", axes.artists());
        };
        assert!((head.x - 900.).abs() < 1e-9 && (head.y - 1900.).abs() < 1e-9);
        assert!((tail.x - 900.).abs() < 1e-9 && (tail.y - 1700.).abs() < 1e-9);
        assert_eq!(*width, 5.);
        assert_eq!(position, tail);
        assert_eq!(text, "N");
    }

    #[rstest]
    fn chains_with_scale_bar() {
        let mut axes = MapAxes::new(Rect::new((0., 0.), (20_000., 20_000.)));
        NorthArrow::default()
            .draw(ScaleBar::default().draw(&mut axes).unwrap())
            .unwrap();
        assert_eq!(axes.artists().len(), 5 + 2);
    }

    #[rstest]
    fn zero_length() {
        let mut axes = MapAxes::new(Rect::new((0., 0.), (1., 1.)));
        let arrow = NorthArrow {
            length: 0.,
            ..Default::default()
        };
        assert!(matches!(
            arrow.draw(&mut axes),
            Err(GeoprepError::InvalidParameter { name: "length", .. })
        ));
    }
}
