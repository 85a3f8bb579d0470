//! Legacy `.smd` metadata scanning.
//!
//! SMD files are `Key=Value;` text grouped into `[SECTION] { ... }` blocks.
//! Sections carry no information the keys do not, so the scanner flattens
//! the file into one dictionary: later duplicates win, and the per-team
//! `StartPosX`/`StartPosZ` pairs are coalesced, in file order, into a
//! `startPositions` list of `{x, z}` tables.

use std::collections::BTreeMap;

use crate::Value;

/// Scan an `.smd` byte buffer into a [`Value::Table`].
///
/// Scanning never fails; unreadable stretches simply contribute nothing.
pub fn parse_smd(input: &[u8]) -> Value {
    let text = String::from_utf8_lossy(input);

    let mut table: BTreeMap<String, Value> = BTreeMap::new();
    let mut xs: Vec<f64> = Vec::new();
    let mut zs: Vec<f64> = Vec::new();

    for (key, raw) in KeyValues::new(&text) {
        let value = raw.trim();
        if key.eq_ignore_ascii_case("StartPosX") {
            if let Ok(n) = value.parse() {
                xs.push(n);
            }
        } else if key.eq_ignore_ascii_case("StartPosZ") {
            if let Ok(n) = value.parse() {
                zs.push(n);
            }
        } else {
            table.insert(key.to_string(), coerce(value));
        }
    }

    let positions: Vec<Value> = xs
        .into_iter()
        .zip(zs)
        .map(|(x, z)| {
            let mut pos = BTreeMap::new();
            pos.insert("x".to_string(), Value::Number(x));
            pos.insert("z".to_string(), Value::Number(z));
            Value::Table(pos)
        })
        .collect();
    if !positions.is_empty() {
        table.insert("startPositions".to_string(), Value::List(positions));
    }

    Value::Table(table)
}

/// Numeric coercion: values that parse as f64 become numbers.
fn coerce(value: &str) -> Value {
    match value.parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(value.to_string()),
    }
}

/// Iterator over `Key=Value;` pairs, skipping `//` comments.
struct KeyValues<'a> {
    rest: &'a str,
}

impl<'a> KeyValues<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for KeyValues<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let eq = self.rest.find('=')?;
            let (head, tail) = self.rest.split_at(eq);

            // The key is the identifier run ending right before '='.
            let key_start = head
                .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .map(|i| i + 1)
                .unwrap_or(0);
            let key = head[key_start..].trim();

            // A '=' with no ';' afterwards ends the scan.
            let semi = match tail.find(';') {
                Some(i) => i,
                None => {
                    self.rest = "";
                    return None;
                }
            };
            let value = &tail[1..semi];
            self.rest = &tail[semi + 1..];

            if key.is_empty() || key_is_commented(head, key_start) {
                continue;
            }
            return Some((key, value));
        }
    }
}

/// Check whether the key sits on a `//`-commented line.
fn key_is_commented(head: &str, key_start: usize) -> bool {
    let line_start = head[..key_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    head[line_start..key_start].contains("//")
}
