//! The animatable property vocabulary
//!
//! Every property an element can animate is a variant of
//! [`AnimatableProperty`]. Each carries its value kind, its unit converter
//! and the style key it writes to, so nothing downstream looks behavior up by
//! string at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimateError;

/// Shape of a property's value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// A single number
    Scalar,
    /// Color channels: `[r, g, b]` or `[r, g, b, a]`
    Color,
}

impl PropertyKind {
    /// Check whether a value with `len` components fits this kind
    pub fn accepts_len(self, len: usize) -> bool {
        match self {
            PropertyKind::Scalar => len == 1,
            PropertyKind::Color => len == 3 || len == 4,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PropertyKind::Scalar => "a number",
            PropertyKind::Color => "3 or 4 color channels",
        }
    }
}

/// Unit a property is written in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// Pixel length: `12px`
    Px,
    /// Opacity clamped to `[0, 1]`
    Alpha,
    /// Angle in degrees: `45deg`
    Deg,
    /// Unitless ratio: `1.5`
    Ratio,
    /// `rgba(r, g, b, a)`
    Color,
}

macro_rules! animatable_properties {
    ($(
        $(#[$meta:meta])*
        $variant:ident => $name:literal, $css:literal, $unit:ident;
    )*) => {
        /// A property that can be animated on an element
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum AnimatableProperty {
            $($(#[$meta])* $variant,)*
        }

        impl AnimatableProperty {
            /// Every property, in declaration order
            pub const ALL: &'static [AnimatableProperty] = &[$(AnimatableProperty::$variant,)*];

            /// The camelCase property name, e.g. `translateX`
            pub fn name(self) -> &'static str {
                match self {
                    $(AnimatableProperty::$variant => $name,)*
                }
            }

            /// The style key this property is written to, e.g. `background-color`
            ///
            /// Transform-class properties all share the `transform` key.
            pub fn css_name(self) -> &'static str {
                match self {
                    $(AnimatableProperty::$variant => $css,)*
                }
            }

            pub fn unit(self) -> Unit {
                match self {
                    $(AnimatableProperty::$variant => Unit::$unit,)*
                }
            }
        }
    };
}

animatable_properties! {
    TranslateX => "translateX", "transform", Px;
    TranslateY => "translateY", "transform", Px;
    TranslateZ => "translateZ", "transform", Px;
    ScaleX => "scaleX", "transform", Ratio;
    ScaleY => "scaleY", "transform", Ratio;
    RotateX => "rotateX", "transform", Deg;
    RotateY => "rotateY", "transform", Deg;
    RotateZ => "rotateZ", "transform", Deg;
    SkewX => "skewX", "transform", Deg;
    SkewY => "skewY", "transform", Deg;
    Top => "top", "top", Px;
    Left => "left", "left", Px;
    Right => "right", "right", Px;
    Bottom => "bottom", "bottom", Px;
    Width => "width", "width", Px;
    Height => "height", "height", Px;
    LetterSpacing => "letterSpacing", "letter-spacing", Px;
    LineHeight => "lineHeight", "line-height", Px;
    Opacity => "opacity", "opacity", Alpha;
    Background => "background", "background", Color;
    BackgroundColor => "backgroundColor", "background-color", Color;
    BorderColor => "borderColor", "border-color", Color;
    BorderTopColor => "borderTopColor", "border-top-color", Color;
    BorderRightColor => "borderRightColor", "border-right-color", Color;
    BorderBottomColor => "borderBottomColor", "border-bottom-color", Color;
    BorderLeftColor => "borderLeftColor", "border-left-color", Color;
    Color => "color", "color", Color;
    OutlineColor => "outlineColor", "outline-color", Color;
    TextDecorationColor => "textDecorationColor", "text-decoration-color", Color;
}

impl AnimatableProperty {
    pub fn kind(self) -> PropertyKind {
        match self.unit() {
            Unit::Color => PropertyKind::Color,
            _ => PropertyKind::Scalar,
        }
    }

    /// Whether this property is composed into the `transform` key
    pub fn is_transform(self) -> bool {
        self.transform_default().is_some()
    }

    /// Identity value of a transform-class property, `None` for the rest
    pub fn transform_default(self) -> Option<f32> {
        use AnimatableProperty::*;
        match self {
            TranslateX | TranslateY | TranslateZ => Some(0.0),
            ScaleX | ScaleY => Some(1.0),
            RotateX | RotateY | RotateZ => Some(0.0),
            SkewX | SkewY => Some(0.0),
            _ => None,
        }
    }

    /// Look a property up by camelCase name or, for non-transform
    /// properties, by its kebab-case style key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name || (!p.is_transform() && p.css_name() == name))
    }
}

impl FromStr for AnimatableProperty {
    type Err = AnimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| AnimateError::UnsupportedProperty(s.to_string()))
    }
}

impl fmt::Display for AnimatableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
