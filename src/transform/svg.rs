//! SVG optimization as a single streaming pass.
//!
//! Mirrors the publish options of a typical SVG scrubber:
//! comment stripping, removal of descriptive elements, no line breaks and
//! viewboxing of the root element. Every other attribute is passed through
//! untouched, so translation keys and ids survive for the page scripts.

use super::TransformError;
use quick_xml::{
    Reader, Writer,
    events::{BytesStart, BytesText, Event},
};
use std::io::Cursor;

/// Elements that only describe the drawing.
const DESCRIPTIVE_ELEMENTS: &[&[u8]] = &[b"title", b"desc", b"metadata"];

/// Elements whose whitespace is rendered as a space.
const TEXT_ELEMENTS: &[&[u8]] = &[b"text", b"tspan", b"textPath"];

/// `optimize-svg` transform.
pub fn optimize_svg(input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(input.len())));
    let mut root_done = false;
    let mut scopes: Vec<Scope> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|source| TransformError::Markup {
            position: reader.error_position() as u64,
            source,
        })?;

        match event {
            Event::Eof => break,
            Event::Comment(_) => {}
            Event::Text(text) if is_line_break(&text) => match scopes.last() {
                Some(scope) if scope.preserve => writer.write_event(Event::Text(text))?,
                Some(scope) if scope.text => writer.write_event(Event::Text(BytesText::new(" ")))?,
                _ => {}
            },
            Event::Start(elem) if is_descriptive(&elem) => {
                let end = elem.to_end().into_owned();
                reader
                    .read_to_end(end.name())
                    .map_err(|source| TransformError::Markup {
                        position: reader.error_position() as u64,
                        source,
                    })?;
            }
            Event::Empty(elem) if is_descriptive(&elem) => {}
            Event::Start(elem) => {
                let scope = Scope::enter(scopes.last().copied(), &elem);
                scopes.push(scope);
                if !root_done && elem.local_name().as_ref() == b"svg" {
                    root_done = true;
                    writer.write_event(Event::Start(enable_viewbox(&elem)))?;
                } else {
                    writer.write_event(Event::Start(elem))?;
                }
            }
            Event::Empty(elem) if !root_done && elem.local_name().as_ref() == b"svg" => {
                root_done = true;
                writer.write_event(Event::Empty(enable_viewbox(&elem)))?;
            }
            Event::End(elem) => {
                scopes.pop();
                writer.write_event(Event::End(elem))?;
            }
            event => writer.write_event(event)?,
        }
    }

    Ok(writer.into_inner().into_inner())
}

/// Whitespace rules of an open element.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Inside a text content element; whitespace between children renders.
    text: bool,
    /// Under `xml:space="preserve"`.
    preserve: bool,
}

impl Scope {
    fn enter(parent: Option<Self>, elem: &BytesStart<'_>) -> Self {
        let parent = parent.unwrap_or_default();
        let preserve = match elem.try_get_attribute("xml:space").ok().flatten() {
            Some(attr) => attr.value.as_ref() == b"preserve",
            None => parent.preserve,
        };
        Self {
            text: parent.text || is_text_element(elem),
            preserve,
        }
    }
}

/// Whitespace-only text spanning a line break, i.e. indentation.
#[inline]
fn is_line_break(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace) && text.iter().any(|b| matches!(b, b'\n' | b'\r'))
}

#[inline]
fn is_text_element(elem: &BytesStart<'_>) -> bool {
    let name = elem.local_name();
    TEXT_ELEMENTS.iter().any(|t| *t == name.as_ref())
}

#[inline]
fn is_descriptive(elem: &BytesStart<'_>) -> bool {
    let name = elem.local_name();
    DESCRIPTIVE_ELEMENTS.iter().any(|d| *d == name.as_ref())
}

// ============================================================================
// Viewboxing
// ============================================================================

/// Make the root element scale with its container.
///
/// With numeric `width`/`height`, adds `viewBox="0 0 w h"` when absent and
/// sets both sizes to `100%`. Elements whose sizes carry units, or whose
/// existing viewBox differs from the sizes, are returned unchanged.
fn enable_viewbox(elem: &BytesStart<'_>) -> BytesStart<'static> {
    let attr = |key: &str| {
        elem.try_get_attribute(key)
            .ok()
            .flatten()
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
    };

    let (Some(width), Some(height)) = (
        attr("width").as_deref().and_then(parse_length),
        attr("height").as_deref().and_then(parse_length),
    ) else {
        return elem.clone().into_owned();
    };

    let existing = attr("viewBox");
    if let Some(viewbox) = &existing
        && !viewbox_matches(viewbox, width, height)
    {
        return elem.clone().into_owned();
    }

    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(tag);
    for a in elem.attributes().flatten() {
        match a.key.as_ref() {
            b"width" | b"height" => rebuilt.push_attribute((a.key.as_ref(), b"100%".as_slice())),
            key => rebuilt.push_attribute((key, a.value.as_ref())),
        }
    }
    if existing.is_none() {
        let viewbox = format!("0 0 {width} {height}");
        rebuilt.push_attribute((b"viewBox".as_slice(), viewbox.as_bytes()));
    }
    rebuilt
}

/// Parse a unitless or `px` length.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

/// Check that `viewbox` is exactly `0 0 width height`.
fn viewbox_matches(viewbox: &str, width: f64, height: f64) -> bool {
    let numbers: Vec<f64> = viewbox
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let expected = [0.0, 0.0, width, height];
    numbers.len() == 4
        && numbers
            .iter()
            .zip(expected)
            .all(|(a, b)| (a - b).abs() < 1e-6)
}
