use geo::{CoordNum, Rect};

use crate::errors::{GeoprepError, Result};

pub trait Intersection {
    type Output;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output>;
}

impl<T: CoordNum> Intersection for Rect<T> {
    type Output = Rect<T>;
    fn intersection(&self, rhs: &Self) -> Result<Rect<T>> {
        let lhs_max = self.max();
        let rhs_min = rhs.min();
        if (lhs_max.x < rhs_min.x) | (lhs_max.y < rhs_min.y) {
            return Err(GeoprepError::NoIntersection);
        }

        let lhs_min = self.min();
        let rhs_max = rhs.max();
        if (lhs_min.x > rhs_max.x) | (lhs_min.y > rhs_max.y) {
            return Err(GeoprepError::NoIntersection);
        }

        let min = (
            if lhs_min.x > rhs_min.x { lhs_min.x } else { rhs_min.x },
            if lhs_min.y > rhs_min.y { lhs_min.y } else { rhs_min.y },
        );
        let max = (
            if lhs_max.x < rhs_max.x { lhs_max.x } else { rhs_max.x },
            if lhs_max.y < rhs_max.y { lhs_max.y } else { rhs_max.y },
        );

        Ok(Self::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn overlapping_rects() {
        let lhs = Rect::new((0, 0), (10, 10));
        let rhs = Rect::new((5, -5), (20, 8));
        assert_eq!(lhs.intersection(&rhs).unwrap(), Rect::new((5, 0), (10, 8)));
    }

    #[rstest]
    fn contained_rect() {
        let outer = Rect::new((0., 0.), (100., 100.));
        let inner = Rect::new((10., 20.), (30., 40.));
        assert_eq!(outer.intersection(&inner).unwrap(), inner);
        assert_eq!(inner.intersection(&outer).unwrap(), inner);
    }

    #[rstest]
    #[case(Rect::new((11, 0), (20, 10)))]
    #[case(Rect::new((0, -20), (10, -1)))]
    #[case(Rect::new((-9, -9), (-1, -1)))]
    fn disjoint_rects(#[case] rhs: Rect<isize>) {
        let lhs = Rect::new((0, 0), (10, 10));
        assert!(matches!(
            lhs.intersection(&rhs),
            Err(GeoprepError::NoIntersection)
        ));
    }
}
