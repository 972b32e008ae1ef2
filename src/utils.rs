use serde_json::{Number, Value};

const PREVIEW_LIMIT: usize = 64;

/// Short name of a value's kind, for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

/// Compact JSON text of a value, cut short for log lines.
pub fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= PREVIEW_LIMIT {
        text
    } else {
        let mut cut: String = text.chars().take(PREVIEW_LIMIT).collect();
        cut.push_str("...");
        cut
    }
}

/// Structural equality where numbers compare by value, so `1` matches `1.0`.
/// Table comparison ignores key order.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

/// Combine an include name with the directory of the including file and drop
/// `.`/`..` segments. Rooted names (`/...`, `~/...`, `C:/...`) are kept as written
/// apart from simplification.
pub fn combine_and_simplify(base_file: &str, include: &str) -> String {
    let base_file = base_file.replace('\\', "/");
    let include = include.replace('\\', "/");

    let joined = if is_rooted(&include) {
        include
    } else {
        match base_file.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => format!("{}/{}", dir, include),
            Some(_) => format!("/{}", include),
            None => include,
        }
    };

    let (root, rest) = if let Some(drive) = drive_prefix(&joined) {
        (format!("{}/", drive), &joined[drive.len() + 1..])
    } else if let Some(rest) = joined.strip_prefix('/') {
        ("/".to_string(), rest)
    } else {
        (String::new(), joined.as_str())
    };
    let absolute = !root.is_empty();

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." && last != "~" => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    format!("{}{}", root, parts.join("/"))
}

fn is_rooted(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("~/") || drive_prefix(path).is_some()
}

/// `C:` of a drive-rooted path such as `C:/x.json`.
fn drive_prefix(path: &str) -> Option<&str> {
    let bytes = path.as_bytes();
    let rooted = bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/';
    rooted.then(|| &path[..2])
}
