use std::io::Read;

use axum::http::{HeaderMap, Method, Uri, Version, header};
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::state::response::Headers;

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

fn read_all(mut reader: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).ok().map(|_| out)
}

/// Undoes `Content-Encoding`. Anything that fails to decode is shown as
/// received.
fn decode_body(headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let encoding = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let decoded = if encoding.contains("gzip") {
        read_all(GzDecoder::new(body))
    } else if encoding.contains("deflate") {
        read_all(ZlibDecoder::new(body)).or_else(|| read_all(DeflateDecoder::new(body)))
    } else {
        None
    };
    decoded.unwrap_or_else(|| body.to_vec())
}

fn pretty_json(body: &[u8]) -> Option<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    serde_json::to_vec_pretty(&value).ok()
}

/// Plain-text rendering of an inbound request: the request line, one
/// `Key: value` line per header in sorted order, then a blank line and the
/// body when there is one.
pub fn dump_request(method: &Method, uri: &Uri, version: Version, headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let mut out = format!("{method} {uri} {}\n", version_str(version)).into_bytes();

    let mut sorted = Headers::new();
    for (name, value) in headers {
        if !sorted.contains(name.as_str()) {
            sorted.set(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
    }
    for (key, value) in sorted.iter() {
        out.extend_from_slice(format!("{key}: {value}\n").as_bytes());
    }

    let body = decode_body(headers, body);
    if body.is_empty() {
        return out;
    }
    out.push(b'\n');

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    match is_json.then(|| pretty_json(&body)).flatten() {
        Some(pretty) => out.extend_from_slice(&pretty),
        None => out.extend_from_slice(&body),
    }
    out
}
