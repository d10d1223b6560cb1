//! Composition and decomposition of the `transform` style key
//!
//! All ten transform-class properties share one key. Terms are always
//! written in the same order:
//!
//! ```text
//! translate(x, y) | translate3d(x, y, z)
//! scale(x, y)
//! rotate(x, y)      rotateX / rotateY
//! rotateZ(z)
//! skew(x, y)
//! ```
//!
//! A term appears when at least one of its components is known. Missing
//! components of a present term use their identity value.

use crate::property::AnimatableProperty;

use super::parse::{parse_transform, TransformTerm};
use super::units::{format_deg, format_number, format_px};

/// The transform-class properties, in composition order
pub const TRANSFORM_PROPERTIES: [AnimatableProperty; 10] = [
    AnimatableProperty::TranslateX,
    AnimatableProperty::TranslateY,
    AnimatableProperty::TranslateZ,
    AnimatableProperty::ScaleX,
    AnimatableProperty::ScaleY,
    AnimatableProperty::RotateX,
    AnimatableProperty::RotateY,
    AnimatableProperty::RotateZ,
    AnimatableProperty::SkewX,
    AnimatableProperty::SkewY,
];

/// Compose a `transform` value from whatever components are known
///
/// `value_of` returns `None` for components that were never declared.
pub fn compose_transform<F>(value_of: F) -> String
where
    F: Fn(AnimatableProperty) -> Option<f32>,
{
    use AnimatableProperty as P;

    let known = |p: P| value_of(p).is_some();
    let get = |p: P| value_of(p).or(p.transform_default()).unwrap_or(0.0);

    let mut terms: Vec<String> = Vec::new();

    if known(P::TranslateZ) {
        terms.push(format!(
            "translate3d({}, {}, {})",
            format_px(get(P::TranslateX)),
            format_px(get(P::TranslateY)),
            format_px(get(P::TranslateZ))
        ));
    } else if known(P::TranslateX) || known(P::TranslateY) {
        terms.push(format!(
            "translate({}, {})",
            format_px(get(P::TranslateX)),
            format_px(get(P::TranslateY))
        ));
    }

    if known(P::ScaleX) || known(P::ScaleY) {
        terms.push(format!(
            "scale({}, {})",
            format_number(get(P::ScaleX)),
            format_number(get(P::ScaleY))
        ));
    }

    if known(P::RotateX) || known(P::RotateY) {
        terms.push(format!(
            "rotate({}, {})",
            format_deg(get(P::RotateX)),
            format_deg(get(P::RotateY))
        ));
    }

    if known(P::RotateZ) {
        terms.push(format!("rotateZ({})", format_deg(get(P::RotateZ))));
    }

    if known(P::SkewX) || known(P::SkewY) {
        terms.push(format!(
            "skew({}, {})",
            format_deg(get(P::SkewX)),
            format_deg(get(P::SkewY))
        ));
    }

    if terms.is_empty() {
        "none".to_string()
    } else {
        terms.join(" ")
    }
}

/// Component values read back out of a `transform` value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedTransform {
    values: [f32; 10],
}

impl Default for DecodedTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DecodedTransform {
    pub fn identity() -> Self {
        let mut values = [0.0; 10];
        for (slot, property) in values.iter_mut().zip(TRANSFORM_PROPERTIES) {
            *slot = property.transform_default().unwrap_or(0.0);
        }
        Self { values }
    }

    fn index(property: AnimatableProperty) -> Option<usize> {
        TRANSFORM_PROPERTIES.iter().position(|p| *p == property)
    }

    /// The component for a transform-class property; `None` for other properties
    pub fn get(&self, property: AnimatableProperty) -> Option<f32> {
        Self::index(property).map(|i| self.values[i])
    }

    fn set(&mut self, property: AnimatableProperty, value: f32) {
        if let Some(i) = Self::index(property) {
            self.values[i] = value;
        }
    }

    fn apply(&mut self, term: &TransformTerm) {
        use AnimatableProperty as P;
        match *term {
            TransformTerm::Translate(x, y) => {
                self.set(P::TranslateX, x);
                self.set(P::TranslateY, y);
            }
            TransformTerm::Translate3d(x, y, z) => {
                self.set(P::TranslateX, x);
                self.set(P::TranslateY, y);
                self.set(P::TranslateZ, z);
            }
            TransformTerm::TranslateX(v) => self.set(P::TranslateX, v),
            TransformTerm::TranslateY(v) => self.set(P::TranslateY, v),
            TransformTerm::TranslateZ(v) => self.set(P::TranslateZ, v),
            TransformTerm::Scale(x, y) => {
                self.set(P::ScaleX, x);
                self.set(P::ScaleY, y);
            }
            TransformTerm::ScaleX(v) => self.set(P::ScaleX, v),
            TransformTerm::ScaleY(v) => self.set(P::ScaleY, v),
            TransformTerm::RotateXY(x, y) => {
                self.set(P::RotateX, x);
                self.set(P::RotateY, y);
            }
            TransformTerm::RotateX(v) => self.set(P::RotateX, v),
            TransformTerm::RotateY(v) => self.set(P::RotateY, v),
            TransformTerm::RotateZ(v) => self.set(P::RotateZ, v),
            TransformTerm::Skew(x, y) => {
                self.set(P::SkewX, x);
                self.set(P::SkewY, y);
            }
            TransformTerm::SkewX(v) => self.set(P::SkewX, v),
            TransformTerm::SkewY(v) => self.set(P::SkewY, v),
            TransformTerm::Matrix(m) => self.apply_matrix(m),
        }
    }

    /// Decompose a 2D affine matrix into translate, scale, rotateZ and skewX
    ///
    /// The decomposition is unique only up to the order it assumes
    /// (translate, rotate, skew, scale), so values read from a matrix are a
    /// starting point rather than an exact inverse of [`compose_transform`].
    fn apply_matrix(&mut self, [a, b, c, d, e, f]: [f32; 6]) {
        use AnimatableProperty as P;

        self.set(P::TranslateX, e);
        self.set(P::TranslateY, f);

        let mut scale_x = (a * a + b * b).sqrt();
        if scale_x == 0.0 {
            return;
        }
        let (mut a, mut b) = (a / scale_x, b / scale_x);

        let mut shear = a * c + b * d;
        let (c, d) = (c - a * shear, d - b * shear);

        let scale_y = (c * c + d * d).sqrt();
        if scale_y != 0.0 {
            shear /= scale_y;
        }

        if a * d - b * c < 0.0 {
            a = -a;
            b = -b;
            scale_x = -scale_x;
            shear = -shear;
        }

        self.set(P::ScaleX, scale_x);
        self.set(P::ScaleY, scale_y);
        self.set(P::RotateZ, b.atan2(a).to_degrees());
        self.set(P::SkewX, shear.atan().to_degrees());
    }
}

/// Decode a `transform` value
///
/// Components not mentioned keep their identity value. Returns `None` when
/// the value does not parse.
pub fn decode_transform(value: &str) -> Option<DecodedTransform> {
    let terms = parse_transform(value)?;
    let mut decoded = DecodedTransform::identity();
    for term in &terms {
        decoded.apply(term);
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use AnimatableProperty as P;

    fn compose(values: &[(P, f32)]) -> String {
        compose_transform(|p| values.iter().find(|(q, _)| *q == p).map(|(_, v)| *v))
    }

    #[test]
    fn test_compose_translate_and_scale() {
        assert_eq!(
            compose(&[(P::TranslateX, 200.0), (P::ScaleX, 1.4), (P::ScaleY, 1.4)]),
            "translate(200px, 0px) scale(1.4, 1.4)"
        );
    }

    #[test]
    fn test_compose_order_and_3d() {
        assert_eq!(
            compose(&[
                (P::SkewY, 5.0),
                (P::RotateZ, 90.0),
                (P::TranslateZ, 3.0),
                (P::RotateX, 10.0),
            ]),
            "translate3d(0px, 0px, 3px) rotate(10deg, 0deg) rotateZ(90deg) skew(0deg, 5deg)"
        );
    }

    #[test]
    fn test_compose_empty() {
        assert_eq!(compose(&[]), "none");
    }

    #[test]
    fn test_decode_own_output() {
        let decoded = decode_transform(&compose(&[
            (P::TranslateX, -20.0),
            (P::TranslateY, 4.5),
            (P::ScaleY, 0.5),
            (P::RotateZ, 30.0),
        ]))
        .unwrap();
        assert_eq!(decoded.get(P::TranslateX), Some(-20.0));
        assert_eq!(decoded.get(P::TranslateY), Some(4.5));
        assert_eq!(decoded.get(P::ScaleX), Some(1.0));
        assert_eq!(decoded.get(P::ScaleY), Some(0.5));
        assert_eq!(decoded.get(P::RotateZ), Some(30.0));
        assert_eq!(decoded.get(P::Opacity), None);
    }

    #[test]
    fn test_decode_none() {
        assert_eq!(decode_transform("none"), Some(DecodedTransform::identity()));
        assert_eq!(decode_transform("spin(3)"), None);
    }

    #[test]
    fn test_decode_matrix() {
        // rotate(90deg) translate(10px, 20px) scale(2)
        let decoded = decode_transform("matrix(0, 2, -2, 0, 10, 20)").unwrap();
        let close = |p: P, want: f32| {
            let got = decoded.get(p).unwrap();
            assert!((got - want).abs() < 1e-4, "{p}: {got} != {want}");
        };
        close(P::TranslateX, 10.0);
        close(P::TranslateY, 20.0);
        close(P::ScaleX, 2.0);
        close(P::ScaleY, 2.0);
        close(P::RotateZ, 90.0);
        close(P::SkewX, 0.0);
    }
}
