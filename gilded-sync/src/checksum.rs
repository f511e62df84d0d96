//! Content checksums for change detection.
//!
//! A value is flattened into a canonical string and hashed with MD5. The
//! digest is only compared against digests this client produced earlier, so
//! collision resistance is not a concern.
//!
//! Flattening rules:
//! - null → empty string
//! - string → itself
//! - number → shortest decimal form (`1`, `1.5`, `NaN`, `Infinity`)
//! - date → RFC 1123 GMT form, e.g. `Tue, 19 Oct 2021 04:27:00 GMT`
//! - array → flattened items joined with `,`
//! - map → `key:value` pairs, keys ascending, joined with `;`
//! - bool → `true` / `false`

use md5::{Digest, Md5};

use gilded_core::ContentValue;

/// `strftime` pattern for the canonical date form.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Hex MD5 digest of the flattened form of `value`.
pub fn checksum(value: &ContentValue) -> String {
    checksum_bytes(flatten(value).as_bytes())
}

/// Hex MD5 digest of raw bytes (resource files).
pub fn checksum_bytes(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Canonical string form of `value`.
pub fn flatten(value: &ContentValue) -> String {
    let mut out = String::new();
    flatten_into(value, &mut out);
    out
}

fn flatten_into(value: &ContentValue, out: &mut String) {
    match value {
        ContentValue::Null => {}
        ContentValue::String(s) => out.push_str(s),
        ContentValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ContentValue::Int(n) => out.push_str(&n.to_string()),
        ContentValue::Float(n) => out.push_str(&format_float(*n)),
        ContentValue::Date(d) => out.push_str(&d.format(DATE_FORMAT).to_string()),
        ContentValue::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                flatten_into(item, out);
            }
        }
        ContentValue::Map(map) => {
            // BTreeMap iteration is already ascending by key.
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(key);
                out.push(':');
                flatten_into(item, out);
            }
        }
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // -0 prints as 0.
        "0".to_string()
    } else {
        n.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
