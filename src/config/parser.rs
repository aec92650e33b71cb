use std::collections::HashMap;

use crate::error::{Error, Result};

/// Minimal TOML subset reader: flat `key = value` lines with string,
/// boolean, integer and string-array values, `#` comments. That is all
/// the config file uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    Array(Vec<String>),
}

pub fn parse(input: &str) -> Result<HashMap<String, Value>> {
    let mut map = HashMap::new();

    for (lineno, raw) in input.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        // Table headers are tolerated and ignored; all recognized keys
        // are top-level.
        if line.starts_with('[') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            Error::Config(format!("line {}: expected key = value", lineno + 1))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!("line {}: empty key", lineno + 1)));
        }
        let value = parse_value(value.trim())
            .ok_or_else(|| Error::Config(format!("line {}: bad value", lineno + 1)))?;
        map.insert(key.to_string(), value);
    }

    Ok(map)
}

fn strip_comment(line: &str) -> &str {
    // Only strip a # outside of quotes.
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_value(raw: &str) -> Option<Value> {
    if raw == "true" {
        return Some(Value::Boolean(true));
    }
    if raw == "false" {
        return Some(Value::Boolean(false));
    }
    if let Some(s) = parse_quoted(raw) {
        return Some(Value::String(s));
    }
    if raw.starts_with('[') && raw.ends_with(']') {
        let inner = &raw[1..raw.len() - 1];
        let mut items = Vec::new();
        for piece in split_array_items(inner) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            items.push(parse_quoted(piece)?);
        }
        return Some(Value::Array(items));
    }
    raw.parse::<i64>().ok().map(Value::Integer)
}

fn parse_quoted(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(raw[1..raw.len() - 1].to_string())
    } else {
        None
    }
}

fn split_array_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ',' if !in_string => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);
    items
}
