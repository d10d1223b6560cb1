//! nom parsers for style fragments
//!
//! Grammar covered:
//! - numbers with an optional unit: `12px`, `45deg`, `0.5turn`, `1.4`
//! - colors: `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rgb`, `#rgba`, `#rrggbb`,
//!   `#rrggbbaa`, `transparent`
//! - transform lists: `translate3d(1px, 2px, 3px) scale(1.2) rotateZ(45deg)`,
//!   `none`, and 2D `matrix(a, b, c, d, e, f)`

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1, take_while_m_n},
    character::complete::{alpha1, char, multispace0},
    combinator::{all_consuming, map_res, opt, value, verify},
    multi::{many1, separated_list1},
    number::complete::float,
    sequence::{delimited, pair, preceded},
    IResult,
};

pub(crate) type ParseResult<'a, O> = IResult<&'a str, O>;

/// Wrap a parser so it skips surrounding whitespace
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// A number followed by an optional alphabetic unit or `%`
fn dimension(input: &str) -> ParseResult<(f32, Option<&str>)> {
    pair(float, opt(alt((alpha1, tag("%")))))(input)
}

/// A length in pixels; unitless numbers count as pixels
fn length(input: &str) -> ParseResult<f32> {
    map_res(dimension, |(v, unit)| match unit {
        None => Ok(v),
        Some(u) if u.eq_ignore_ascii_case("px") => Ok(v),
        Some(_) => Err(()),
    })(input)
}

/// An angle in degrees; unitless numbers count as degrees
fn angle(input: &str) -> ParseResult<f32> {
    map_res(dimension, |(v, unit)| match unit.map(str::to_ascii_lowercase).as_deref() {
        None | Some("deg") => Ok(v),
        Some("rad") => Ok(v.to_degrees()),
        Some("turn") => Ok(v * 360.0),
        Some("grad") => Ok(v * 0.9),
        Some(_) => Err(()),
    })(input)
}

/// A bare number
fn number(input: &str) -> ParseResult<f32> {
    float(input)
}

fn complete<'a, O, F>(parser: F, input: &'a str) -> Option<O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    all_consuming(ws(parser))(input).ok().map(|(_, v)| v)
}

pub(crate) fn parse_length(input: &str) -> Option<f32> {
    complete(length, input)
}

pub(crate) fn parse_angle(input: &str) -> Option<f32> {
    complete(angle, input)
}

pub(crate) fn parse_number(input: &str) -> Option<f32> {
    complete(number, input)
}

// ============================================================================
// Colors
// ============================================================================

/// `(a, b, c)` with `item` parsing each element
fn arguments<'a, O, F>(item: F) -> impl FnMut(&'a str) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), ws(item)),
        ws(char(')')),
    )
}

/// `rgb(r, g, b)` or `rgba(r, g, b, a)`; channels stay in 0..=255
fn rgb_function(input: &str) -> ParseResult<[f32; 4]> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, channels) = verify(arguments(number), |c: &Vec<f32>| {
        c.len() == 3 || c.len() == 4
    })(input)?;
    let alpha = channels.get(3).copied().unwrap_or(1.0);
    Ok((input, [channels[0], channels[1], channels[2], alpha]))
}

fn hex_digits(input: &str) -> ParseResult<&str> {
    take_while_m_n(3, 8, |c: char| c.is_ascii_hexdigit())(input)
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
fn hex_color(input: &str) -> ParseResult<[f32; 4]> {
    map_res(preceded(char('#'), hex_digits), |hex: &str| {
        let channel = |s: &str| u8::from_str_radix(s, 16).map(f32::from).map_err(|_| ());
        let short = |i: usize| channel(&hex[i..i + 1].repeat(2));
        let long = |i: usize| channel(&hex[2 * i..2 * i + 2]);
        match hex.len() {
            3 => Ok([short(0)?, short(1)?, short(2)?, 1.0]),
            4 => Ok([short(0)?, short(1)?, short(2)?, short(3)? / 255.0]),
            6 => Ok([long(0)?, long(1)?, long(2)?, 1.0]),
            8 => Ok([long(0)?, long(1)?, long(2)?, long(3)? / 255.0]),
            _ => Err(()),
        }
    })(input)
}

fn color(input: &str) -> ParseResult<[f32; 4]> {
    alt((
        rgb_function,
        hex_color,
        value([0.0, 0.0, 0.0, 0.0], tag_no_case("transparent")),
    ))(input)
}

pub(crate) fn parse_color(input: &str) -> Option<[f32; 4]> {
    complete(color, input)
}

// ============================================================================
// Transforms
// ============================================================================

/// One term of a transform list
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TransformTerm {
    Translate(f32, f32),
    Translate3d(f32, f32, f32),
    TranslateX(f32),
    TranslateY(f32),
    TranslateZ(f32),
    Scale(f32, f32),
    ScaleX(f32),
    ScaleY(f32),
    /// Two-argument `rotate(x, y)` as written by the composer
    RotateXY(f32, f32),
    RotateX(f32),
    RotateY(f32),
    /// One-argument `rotate(a)` and `rotateZ(a)`
    RotateZ(f32),
    Skew(f32, f32),
    SkewX(f32),
    SkewY(f32),
    Matrix([f32; 6]),
}

fn function_name(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

/// `name(args)` where each argument is parsed as lengths, angles or numbers
/// depending on the function
fn transform_term(input: &str) -> ParseResult<TransformTerm> {
    let (rest, name) = function_name(input)?;
    let fail = || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify));

    let lower = name.to_ascii_lowercase();
    let (rest, args) = match lower.as_str() {
        "translate" | "translate3d" | "translatex" | "translatey" | "translatez" => {
            arguments(length)(rest)?
        }
        "rotate" | "rotatex" | "rotatey" | "rotatez" | "skew" | "skewx" | "skewy" => {
            arguments(angle)(rest)?
        }
        "scale" | "scalex" | "scaley" | "matrix" => arguments(number)(rest)?,
        _ => return Err(fail()),
    };

    let term = match (lower.as_str(), args.as_slice()) {
        ("translate", [x]) => TransformTerm::Translate(*x, 0.0),
        ("translate", [x, y]) => TransformTerm::Translate(*x, *y),
        ("translate3d", [x, y, z]) => TransformTerm::Translate3d(*x, *y, *z),
        ("translatex", [x]) => TransformTerm::TranslateX(*x),
        ("translatey", [y]) => TransformTerm::TranslateY(*y),
        ("translatez", [z]) => TransformTerm::TranslateZ(*z),
        ("scale", [s]) => TransformTerm::Scale(*s, *s),
        ("scale", [x, y]) => TransformTerm::Scale(*x, *y),
        ("scalex", [x]) => TransformTerm::ScaleX(*x),
        ("scaley", [y]) => TransformTerm::ScaleY(*y),
        ("rotate", [a]) => TransformTerm::RotateZ(*a),
        ("rotate", [x, y]) => TransformTerm::RotateXY(*x, *y),
        ("rotatex", [x]) => TransformTerm::RotateX(*x),
        ("rotatey", [y]) => TransformTerm::RotateY(*y),
        ("rotatez", [z]) => TransformTerm::RotateZ(*z),
        ("skew", [x]) => TransformTerm::Skew(*x, 0.0),
        ("skew", [x, y]) => TransformTerm::Skew(*x, *y),
        ("skewx", [x]) => TransformTerm::SkewX(*x),
        ("skewy", [y]) => TransformTerm::SkewY(*y),
        ("matrix", [a, b, c, d, e, f]) => TransformTerm::Matrix([*a, *b, *c, *d, *e, *f]),
        _ => return Err(fail()),
    };
    Ok((rest, term))
}

fn transform_list(input: &str) -> ParseResult<Vec<TransformTerm>> {
    alt((
        value(Vec::new(), tag_no_case("none")),
        many1(ws(transform_term)),
    ))(input)
}

/// Parse a whole transform value; `none` yields an empty list
pub(crate) fn parse_transform(input: &str) -> Option<Vec<TransformTerm>> {
    complete(transform_list, input)
}
