//! Reference locale generation.
//!
//! Scans the source SVG for elements carrying the translation-key attribute
//! and writes the authoring language file that translators start from:
//!
//! ```json
//! {
//!     "title": "Pitch Circles",
//!     "note-c": "C",
//!     "label-fifths": "Circle of fifths"
//! }
//! ```

use crate::{config::PublishConfig, log};
use anyhow::{Context, Result, anyhow};
use quick_xml::{
    Reader,
    escape::resolve_predefined_entity,
    events::{BytesRef, BytesStart, Event},
};
use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};
use std::{collections::HashMap, fs, path::PathBuf};

/// Collect `{ title, key: text, ... }` from `svg`.
///
/// Keys follow document order. The value is the element's leading text (the
/// text before its first child element), or `null` if it has none. A key that
/// appears twice keeps its first position and takes the later value. The
/// document element itself is not scanned.
pub fn collect_keys(svg: &[u8], attribute: &str, title: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_reader(svg);
    reader.config_mut().trim_text(false);

    let mut keys = Map::new();
    keys.insert("title".into(), Value::String(title.into()));

    let mut entities = HashMap::new();
    let mut depth = 0usize;
    // Key whose leading text is being collected
    let mut pending: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| anyhow!("invalid SVG at byte {}: {e}", reader.error_position()))?;

        match event {
            Event::Eof => break,
            Event::DocType(doctype) => {
                entities = internal_entities(&String::from_utf8_lossy(&doctype));
            }
            Event::Start(elem) => {
                flush(&mut keys, pending.take());
                if depth > 0 {
                    pending = key_of(&elem, attribute).map(|key| (key, String::new()));
                }
                depth += 1;
            }
            Event::Empty(elem) => {
                flush(&mut keys, pending.take());
                if depth > 0
                    && let Some(key) = key_of(&elem, attribute)
                {
                    keys.insert(key, Value::Null);
                }
            }
            Event::End(_) => {
                flush(&mut keys, pending.take());
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some((_, value)) = &mut pending {
                    value.push_str(std::str::from_utf8(&text)?);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = &mut pending {
                    value.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::GeneralRef(entity) => {
                if let Some((_, value)) = &mut pending {
                    push_entity(value, &entity, &entities)?;
                }
            }
            _ => {}
        }
    }

    Ok(keys)
}

fn key_of(elem: &BytesStart<'_>, attribute: &str) -> Option<String> {
    elem.try_get_attribute(attribute)
        .ok()
        .flatten()
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn flush(keys: &mut Map<String, Value>, pending: Option<(String, String)>) {
    if let Some((key, text)) = pending {
        let value = if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.replace("\r\n", "\n"))
        };
        keys.insert(key, value);
    }
}

/// Append the text an entity reference stands for.
fn push_entity(
    value: &mut String,
    entity: &BytesRef<'_>,
    entities: &HashMap<String, String>,
) -> Result<()> {
    if let Some(ch) = entity.resolve_char_ref()? {
        value.push(ch);
        return Ok(());
    }
    let name = std::str::from_utf8(entity)?;
    let text = resolve_predefined_entity(name)
        .or_else(|| entities.get(name).map(String::as_str))
        .ok_or_else(|| {
            anyhow!(
                "undefined entity `&{name};`: only predefined, character and \
                 internal DTD entities are expanded"
            )
        })?;
    value.push_str(text);
    Ok(())
}

/// General entities declared with a literal value in the DOCTYPE's internal
/// subset, e.g. `<!ENTITY ns_svg "http://www.w3.org/2000/svg">`.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are skipped.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();

    for decl in doctype.split("<!ENTITY").skip(1) {
        let decl = decl.trim_start();
        if decl.starts_with('%') {
            continue;
        }
        let Some((name, rest)) = decl.split_once(|c: char| c.is_ascii_whitespace()) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(quote) = rest.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            continue;
        };
        if let Some((literal, _)) = rest[1..].split_once(quote) {
            entities
                .entry(name.to_owned())
                .or_insert_with(|| literal.to_owned());
        }
    }

    entities
}

/// Render keys as JSON with 4-space indentation and no trailing newline.
pub fn to_json(keys: &Map<String, Value>) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    keys.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Regenerate the authoring locale file from the configured SVG.
pub fn write_reference(config: &PublishConfig) -> Result<PathBuf> {
    let svg_path = config.build.source.join(&config.locale.svg);
    let target = config.authoring_locale();

    let svg = fs::read(&svg_path)
        .with_context(|| format!("Failed to read {}", svg_path.display()))?;
    let keys = collect_keys(&svg, &config.locale.attribute, &config.locale.title)
        .with_context(|| format!("in `{}`", svg_path.display()))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&target, to_json(&keys)?)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    log!("locale"; "{} keys -> {}", keys.len(), target.display());
    Ok(target)
}
