use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::CmdError;

/// One `name[0][1]` piece of a dotted access path.
static PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<key>[^\[\]]*)(?P<indices>(?:\[\d+\])*)$").expect("valid regex"));
static INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));

/// A step of a config access path such as `servers[0].host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSegment {
    Key(String),
    Index(usize),
}

/// Split an access path into keys and indices. The empty path addresses the root.
pub(super) fn parse_access_path(path: &str) -> Result<Vec<AccessSegment>, CmdError> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let caps = PART_RE.captures(part).ok_or_else(|| bad_path(path, part))?;
        let key = caps.name("key").map_or("", |m| m.as_str());
        let indices = caps.name("indices").map_or("", |m| m.as_str());

        if key.is_empty() && indices.is_empty() {
            return Err(bad_path(path, part));
        }
        if !key.is_empty() {
            segments.push(AccessSegment::Key(key.to_string()));
        }
        for index in INDEX_RE.captures_iter(indices) {
            let n = index[1].parse::<usize>().map_err(|_| bad_path(path, part))?;
            segments.push(AccessSegment::Index(n));
        }
    }
    Ok(segments)
}

fn bad_path(path: &str, part: &str) -> CmdError {
    CmdError::ValidationError {
        message: format!("invalid access path segment '{}'", part),
        path: path.to_string(),
        hint: Some("Use dotted keys with bracketed indices, e.g. servers[0].host".into()),
        code: Some(401),
    }
}

pub(super) fn lookup<'v>(root: &'v Value, segments: &[AccessSegment]) -> Option<&'v Value> {
    segments.iter().try_fold(root, |current, segment| match segment {
        AccessSegment::Key(key) => current.as_object()?.get(key),
        AccessSegment::Index(index) => current.as_array()?.get(*index),
    })
}

/// `foo_bar`, `foo-bar`: the spellings tried for a key segment.
pub(super) fn key_variants(key: &str) -> Vec<String> {
    let mut out = vec![key.to_string()];

    let snake = key.replace('-', "_");
    if snake != key {
        out.push(snake);
    }
    let kebab = key.replace('_', "-");
    if kebab != key {
        out.push(kebab);
    }

    out.dedup();
    out
}

/// Find a value trying every snake/kebab spelling of each key segment.
pub(super) fn lookup_flexible<'v>(root: &'v Value, segments: &[AccessSegment]) -> Option<&'v Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(root);
    };

    match first {
        AccessSegment::Index(index) => lookup_flexible(root.as_array()?.get(*index)?, rest),
        AccessSegment::Key(key) => {
            let table = root.as_object()?;
            key_variants(key)
                .iter()
                .filter_map(|variant| table.get(variant))
                .find_map(|child| lookup_flexible(child, rest))
        }
    }
}
