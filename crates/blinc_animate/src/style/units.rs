//! Per-unit converters between numeric values and style fragments

use crate::property::Unit;
use crate::value::PropertyValue;

use super::parse::{parse_angle, parse_color, parse_length, parse_number};

/// Shortest decimal form of a number; non-finite values and `-0` print as `0`
pub(crate) fn format_number(n: f32) -> String {
    if !n.is_finite() || n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

pub(crate) fn format_px(n: f32) -> String {
    format!("{}px", format_number(n))
}

pub(crate) fn format_deg(n: f32) -> String {
    format!("{}deg", format_number(n))
}

fn color_channel(c: f32) -> String {
    if !c.is_finite() {
        return "0".to_string();
    }
    format_number(c.round().clamp(0.0, 255.0))
}

fn alpha_channel(a: f32) -> String {
    if !a.is_finite() {
        return "0".to_string();
    }
    format_number(a.clamp(0.0, 1.0))
}

/// `rgba(r, g, b, a)`; alpha defaults to 1 for three-channel colors
pub(crate) fn format_color(channels: &[f32]) -> Option<String> {
    let (r, g, b, a) = match *channels {
        [r, g, b] => (r, g, b, 1.0),
        [r, g, b, a] => (r, g, b, a),
        _ => return None,
    };
    Some(format!(
        "rgba({}, {}, {}, {})",
        color_channel(r),
        color_channel(g),
        color_channel(b),
        alpha_channel(a)
    ))
}

impl Unit {
    /// Encode a value as a style fragment
    ///
    /// Returns `None` when the value's shape does not fit the unit.
    pub fn encode(self, value: &PropertyValue) -> Option<String> {
        match (self, value) {
            (Unit::Px, PropertyValue::Scalar(v)) => Some(format_px(*v)),
            (Unit::Deg, PropertyValue::Scalar(v)) => Some(format_deg(*v)),
            (Unit::Ratio, PropertyValue::Scalar(v)) => Some(format_number(*v)),
            (Unit::Alpha, PropertyValue::Scalar(v)) => Some(alpha_channel(*v)),
            (Unit::Color, PropertyValue::Vector(channels)) => format_color(channels),
            _ => None,
        }
    }

    /// Decode a style fragment written in this unit
    pub fn decode(self, fragment: &str) -> Option<PropertyValue> {
        match self {
            Unit::Px => parse_length(fragment).map(PropertyValue::Scalar),
            Unit::Deg => parse_angle(fragment).map(PropertyValue::Scalar),
            Unit::Ratio | Unit::Alpha => parse_number(fragment).map(PropertyValue::Scalar),
            Unit::Color => parse_color(fragment).map(PropertyValue::from),
        }
    }

    /// Value used when a fragment cannot be decoded
    pub fn fallback(self) -> PropertyValue {
        match self {
            Unit::Color => PropertyValue::rgba(0.0, 0.0, 0.0, 0.0),
            _ => PropertyValue::Scalar(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(200.0), "200");
        assert_eq!(format_number(1.4), "1.4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f32::NAN), "0");
        assert_eq!(format_number(f32::INFINITY), "0");
        assert_eq!(format_px(-12.5), "-12.5px");
        assert_eq!(format_deg(45.0), "45deg");
    }

    #[test]
    fn test_color_encoding_rounds_and_clamps() {
        let color = PropertyValue::rgba(300.0, -10.0, 127.6, 2.0);
        assert_eq!(
            Unit::Color.encode(&color).as_deref(),
            Some("rgba(255, 0, 128, 1)")
        );
        let rgb = PropertyValue::rgb(0.4, 10.0, 20.0);
        assert_eq!(Unit::Color.encode(&rgb).as_deref(), Some("rgba(0, 10, 20, 1)"));
    }

    #[test]
    fn test_alpha_clamps() {
        assert_eq!(Unit::Alpha.encode(&PropertyValue::Scalar(1.3)).as_deref(), Some("1"));
        assert_eq!(Unit::Alpha.encode(&PropertyValue::Scalar(-0.2)).as_deref(), Some("0"));
        assert_eq!(Unit::Alpha.encode(&PropertyValue::Scalar(0.25)).as_deref(), Some("0.25"));
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(Unit::Px.encode(&PropertyValue::rgb(1.0, 2.0, 3.0)), None);
        assert_eq!(Unit::Color.encode(&PropertyValue::Scalar(1.0)), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(Unit::Px.decode("40px"), Some(PropertyValue::Scalar(40.0)));
        assert_eq!(Unit::Alpha.decode("0.3"), Some(PropertyValue::Scalar(0.3)));
        assert_eq!(
            Unit::Color.decode("rgb(255, 0, 128)"),
            Some(PropertyValue::rgba(255.0, 0.0, 128.0, 1.0))
        );
        assert_eq!(Unit::Px.decode("auto"), None);
        assert_eq!(Unit::Color.fallback(), PropertyValue::rgba(0.0, 0.0, 0.0, 0.0));
    }
}
