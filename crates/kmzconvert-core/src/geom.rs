use crate::model::Coordinate;
use serde::{Deserialize, Serialize};

/// Lon/lat bounding box. `min.lon`/`max.lon` span x, `min.lat`/`max.lat` span y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox2 {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BBox2 {
    pub fn empty() -> Self {
        Self {
            min: Coordinate::new(f64::INFINITY, f64::INFINITY),
            max: Coordinate::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_coords(coords: &[Coordinate]) -> Option<Self> {
        let mut bbox = Self::empty();
        for c in coords {
            bbox.include_point(*c);
        }
        if bbox.is_empty() { None } else { Some(bbox) }
    }

    pub fn is_empty(&self) -> bool {
        self.min.lon > self.max.lon || self.min.lat > self.max.lat
    }

    pub fn include_point(&mut self, point: Coordinate) {
        self.min.lon = self.min.lon.min(point.lon);
        self.min.lat = self.min.lat.min(point.lat);
        self.max.lon = self.max.lon.max(point.lon);
        self.max.lat = self.max.lat.max(point.lat);
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min.lon + self.max.lon) * 0.5,
            (self.min.lat + self.max.lat) * 0.5,
        )
    }

    pub fn width(&self) -> f64 {
        (self.max.lon - self.min.lon).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.lat - self.min.lat).max(0.0)
    }
}

/// Shortest round-trip representation that always keeps a fractional part,
/// so whole numbers read `2.0` rather than `2`. Magnitudes below `1e-4` or at
/// or above `1e16` switch to exponent form with a signed two-digit exponent
/// (`1e-05`, `1.5e+16`).
pub fn format_float(value: f64) -> String {
    let abs = value.abs();
    if value.is_finite() && abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{value:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            None => s,
        };
    }
    let s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_float_keeps_fraction() {
        assert_eq!("0.5", format_float(0.5));
        assert_eq!("1.0", format_float(1.0));
        assert_eq!("-58.0", format_float(-58.0));
        assert_eq!("-34.612345", format_float(-34.612345));
        assert_eq!("NaN", format_float(f64::NAN));
        assert_eq!("0.0", format_float(0.0));
    }

    #[test]
    fn format_float_uses_exponent_outside_plain_range() {
        assert_eq!("1e-05", format_float(0.00001));
        assert_eq!("-2.5e-07", format_float(-0.00000025));
        assert_eq!("0.0001", format_float(0.0001));
        assert_eq!("1e+16", format_float(1e16));
        assert_eq!("1.5e+16", format_float(1.5e16));
        assert_eq!("9999999999999998.0", format_float(9_999_999_999_999_998.0));
    }

    #[test]
    fn bbox_from_coords() {
        let bbox = BBox2::from_coords(&[
            Coordinate::new(-58.5, -34.0),
            Coordinate::new(-58.0, -34.5),
        ])
        .expect("non-empty");
        assert_eq!(Coordinate::new(-58.5, -34.5), bbox.min);
        assert_eq!(Coordinate::new(-58.0, -34.0), bbox.max);
        assert_eq!(0.5, bbox.width());
        assert!(BBox2::from_coords(&[]).is_none());
    }
}
