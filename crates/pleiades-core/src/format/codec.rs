//! Generic fixed-width record codec driven by the column registry.
//!
//! Decoding slices a raw line into per-field text slots that keep the
//! original spacing; encoding places those slots back into an 80-column
//! buffer, so an untouched decode/encode cycle reproduces the input
//! byte-for-byte.

use super::{Justify, MAX_LINE_WIDTH, fields, total_width};
use crate::domain::{ParError, ParResult, RecordKind};

/// Ordered field-name to raw-text mapping for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(&'static str, String)>,
}

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Raw slot text, or the empty string for an unset field.
    pub fn slot(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }
}

/// Slices `line` into the registered fields of `kind`.
///
/// Lines shorter than the registered width are padded with blanks first,
/// tolerating editors that strip trailing spaces.
pub fn decode(kind: RecordKind, line: &str) -> ParResult<FieldMap> {
    if line.trim().is_empty() {
        return Err(ParError::MalformedRecord { kind });
    }

    let width = total_width(kind);
    let mut chars: Vec<char> = line.chars().collect();
    if chars.len() < width {
        chars.resize(width, ' ');
    }

    let mut map = FieldMap::default();
    for spec in fields(kind) {
        let slot: String = chars[spec.span.start..spec.span.end].iter().collect();
        map.set(spec.name, slot);
    }
    Ok(map)
}

/// Renders the registered fields of `kind` into a full 80-column line.
///
/// A slot that already fills its span is copied verbatim (round-trip
/// fidelity); shorter values are justified per field type. A rendered
/// value wider than its span is never truncated.
pub fn encode(kind: RecordKind, map: &FieldMap) -> ParResult<String> {
    let mut buffer = vec![' '; MAX_LINE_WIDTH];
    for spec in fields(kind) {
        let value = map.slot(spec.name);
        let rendered = justify(&value, spec.span.width(), spec.justify).ok_or_else(|| {
            ParError::FieldWidth {
                kind,
                field: spec.name,
                value: value.clone(),
                width: spec.span.width(),
            }
        })?;
        buffer.splice(spec.span.start..spec.span.end, rendered.chars());
    }
    Ok(buffer.into_iter().collect())
}

fn justify(value: &str, width: usize, justify: Justify) -> Option<String> {
    let len = value.chars().count();
    if len > width {
        return None;
    }
    if len == width {
        return Some(value.to_string());
    }
    let padding = " ".repeat(width - len);
    Some(match justify {
        Justify::Left => format!("{value}{padding}"),
        Justify::Right => format!("{padding}{value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{FieldMap, decode, encode};
    use crate::domain::{ParError, RecordKind};

    fn pad80(line: &str) -> String {
        format!("{line:<80}")
    }

    #[test]
    fn spin_group_line_survives_a_decode_encode_cycle() {
        let line = pad80(&format!(
            "{:>3} {:<1}  {:>3}  {:>3}{:>5}{:>10}",
            1, "", 1, 0, "1.0", "1.0000000"
        ));
        let map = decode(RecordKind::SpinGroup, &line).unwrap();
        assert_eq!(map.get("group_number"), Some("  1"));
        assert_eq!(map.get("n_entrance_channel"), Some("  1"));
        assert_eq!(map.get("n_exit_channel"), Some("  0"));
        assert_eq!(map.get("spin"), Some("  1.0"));
        assert_eq!(map.get("isotopic_abundance"), Some(" 1.0000000"));
        assert_eq!(encode(RecordKind::SpinGroup, &map).unwrap(), line);
    }

    #[test]
    fn short_lines_are_padded_before_slicing() {
        let map = decode(RecordKind::SpinGroup, "  2    1  0").unwrap();
        assert_eq!(map.get("spin"), Some("     "));
        assert_eq!(map.get("isotopic_abundance"), Some("          "));
    }

    #[test]
    fn empty_line_is_a_malformed_record() {
        let error = decode(RecordKind::Resonance, "   ").unwrap_err();
        assert!(matches!(
            error,
            ParError::MalformedRecord {
                kind: RecordKind::Resonance
            }
        ));
    }

    #[test]
    fn fresh_values_are_justified_per_field_type() {
        let mut map = FieldMap::default();
        map.set("group_number", "3");
        map.set("exclude", "");
        map.set("n_entrance_channel", "2");
        map.set("n_exit_channel", "0");
        map.set("spin", "1.5");
        map.set("isotopic_abundance", "0.6000000");
        let line = encode(RecordKind::SpinGroup, &map).unwrap();
        assert_eq!(&line[0..3], "  3");
        assert_eq!(&line[7..10], "  2");
        assert_eq!(&line[20..30], " 0.6000000");
        assert_eq!(line.len(), 80);
    }

    #[test]
    fn oversize_numeric_value_is_rejected_not_truncated() {
        let mut map = FieldMap::default();
        map.set("group_number", "1234");
        let error = encode(RecordKind::SpinGroup, &map).unwrap_err();
        assert!(matches!(
            error,
            ParError::FieldWidth {
                field: "group_number",
                width: 3,
                ..
            }
        ));
    }

    #[test]
    fn resonance_energy_text_is_preserved_verbatim() {
        let line = pad80(&format!(
            "{:>11}{:>11}{:>11}{:>11}{:>11}{:>2}{:>2}{:>2}{:>2}{:>2}{:>2}",
            "-3.6700-5", "1.5877+3", "3.6985+1", "", "", "0", "1", "1", "0", "0", "1"
        ));
        let map = decode(RecordKind::Resonance, &line).unwrap();
        assert_eq!(map.get("resonance_energy"), Some("  -3.6700-5"));
        assert_eq!(map.get("fission1_width"), Some("           "));
        assert_eq!(map.get("igroup"), Some(" 1"));
        assert_eq!(encode(RecordKind::Resonance, &map).unwrap(), line);
    }
}
