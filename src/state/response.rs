use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, Metadata};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    #[default]
    Input,
    File,
}

impl BodyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyMode::Input => "Input",
            BodyMode::File => "File",
        }
    }

    pub fn next(&self) -> BodyMode {
        match self {
            BodyMode::Input => BodyMode::File,
            BodyMode::File => BodyMode::Input,
        }
    }
}

impl fmt::Display for BodyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opened body file. Clones share the handle, which is rewound before
/// every read rather than reopened.
#[derive(Debug, Clone)]
pub struct BodyFile {
    path: PathBuf,
    handle: Arc<Mutex<File>>,
}

impl BodyFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| AppError::file_access(&path, e))?;
        Ok(Self { path, handle: Arc::new(Mutex::new(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        let mut file = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(bytes)
    }

    fn metadata(&self) -> std::io::Result<Metadata> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner).metadata()
    }
}

/// Response payload. Switching `mode` never drops the other source, so
/// toggling back restores what was there.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub mode: BodyMode,
    pub input: Vec<u8>,
    pub file: Option<BodyFile>,
}

impl Body {
    pub fn input(bytes: impl Into<Vec<u8>>) -> Self {
        Self { mode: BodyMode::Input, input: bytes.into(), file: None }
    }

    /// Bytes to send. A file that cannot be read yields a message instead.
    pub fn payload(&self) -> Vec<u8> {
        match self.mode {
            BodyMode::Input => self.input.clone(),
            BodyMode::File => match &self.file {
                None => Vec::new(),
                Some(file) => file.read_all().unwrap_or_else(|err| {
                    tracing::warn!(path = %file.path().display(), error = %err, "body file read failed");
                    format!("File could not be read: {} \n", file.path().display()).into_bytes()
                }),
            },
        }
    }

    /// What the body panel shows: the text itself, or a summary of the file.
    pub fn info(&self) -> Vec<u8> {
        match self.mode {
            BodyMode::Input => self.input.clone(),
            BodyMode::File => match &self.file {
                None => Vec::new(),
                Some(file) => match file.metadata() {
                    Ok(meta) => format!(
                        "file: {}\nsize: {} bytes\nperm: {}\n",
                        file.path().display(),
                        meta.len(),
                        permissions(&meta),
                    )
                    .into_bytes(),
                    Err(_) => {
                        format!("File could not be read: {} \n", file.path().display()).into_bytes()
                    }
                },
            },
        }
    }

    /// Opens `path` (after `~` and `$VAR` expansion) and switches to file
    /// mode. On failure the body is left exactly as it was.
    pub fn set_file(&mut self, path: &str) -> Result<(), AppError> {
        let file = BodyFile::open(expand_path(path))?;
        self.file = Some(file);
        self.mode = BodyMode::File;
        Ok(())
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().map(BodyFile::path)
    }
}

#[cfg(unix)]
fn permissions(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(if meta.is_dir() { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn permissions(meta: &Metadata) -> String {
    if meta.permissions().readonly() { "read-only".into() } else { "read-write".into() }
}

/// Expands a leading `~` to `$HOME`, then `$VAR` / `${VAR}` references.
/// Undefined variables expand to nothing.
pub fn expand_path(path: &str) -> String {
    shellexpand::full_with_context_no_errors(
        path,
        || std::env::var("HOME").ok(),
        |var| Some(std::env::var(var).unwrap_or_default()),
    )
    .into_owned()
}

/// Canonical MIME header form: `content-type` becomes `Content-Type`.
/// Keys holding characters that are not valid in a header token are
/// returned untouched.
pub fn canonical_header_key(key: &str) -> String {
    let is_token = |b: u8| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b);
    if key.is_empty() || !key.bytes().all(is_token) {
        return key.to_string();
    }

    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            out
        })
        .collect()
}

/// Single-valued header map keyed by canonical names, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(canonical_header_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&canonical_header_key(key)).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&canonical_header_key(key))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// One `Key: Value` line per header, as shown in the headers panel.
    pub fn to_text(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Sink for a rendered response. Headers go first, then the status, then
/// the payload.
pub trait ResponseWriter {
    fn header(&mut self, key: &str, value: &str) -> Result<(), AppError>;
    fn status(&mut self, status: u16) -> Result<(), AppError>;
    fn body(&mut self, payload: &[u8]) -> Result<(), AppError>;
}

/// The response served to every client.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Body,
    pub delay: Duration,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: Body::default(),
            delay: Duration::ZERO,
        }
    }
}

impl Response {
    /// Builds a response from the three free-form panels. An empty status
    /// means `200`.
    pub fn parse(status: &str, headers: &str, body: &str) -> Result<Self, AppError> {
        Ok(Self {
            status: parse_status(status)?,
            headers: parse_headers(headers),
            body: Body::input(body),
            delay: Duration::ZERO,
        })
    }

    /// Writes headers, status and payload in that order. The first error is
    /// returned; whatever was already written stays written.
    pub fn write<W: ResponseWriter>(&self, w: &mut W) -> Result<(), AppError> {
        for (key, value) in self.headers.iter() {
            w.header(key, value)?;
        }
        w.status(self.status)?;
        w.body(&self.body.payload())
    }
}

pub fn parse_status(text: &str) -> Result<u16, AppError> {
    let text = text.trim();
    let text = if text.is_empty() { "200" } else { text };
    text.parse::<i64>()
        .ok()
        .and_then(status_in_range)
        .ok_or_else(|| AppError::InvalidStatus(text.to_string()))
}

fn status_in_range(code: i64) -> Option<u16> {
    (100..=599).contains(&code).then_some(code as u16)
}

/// Splits each line on its first colon. Lines without one are dropped and
/// later duplicates win.
pub fn parse_headers(text: &str) -> Headers {
    let mut headers = Headers::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        headers.set(key.trim(), value.trim());
    }
    headers
}

pub fn parse_delay(text: &str) -> Result<Duration, AppError> {
    let text = text.trim();
    text.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| AppError::InvalidDelay(text.to_string()))
}

/// On-disk form of a response: the body is either inline text or a file
/// path, with the delay in whole milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResponseDocument {
    pub status: u16,
    pub body: String,
    pub file: String,
    pub headers: BTreeMap<String, String>,
    pub delay: u64,
}

impl From<&Response> for ResponseDocument {
    fn from(resp: &Response) -> Self {
        let (body, file) = match (resp.body.mode, resp.body.file_path()) {
            (BodyMode::File, Some(path)) => (String::new(), path.display().to_string()),
            _ => (String::from_utf8_lossy(&resp.body.input).into_owned(), String::new()),
        };
        Self {
            status: resp.status,
            body,
            file,
            headers: resp
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            delay: resp.delay.as_millis() as u64,
        }
    }
}

impl TryFrom<ResponseDocument> for Response {
    type Error = AppError;

    fn try_from(doc: ResponseDocument) -> Result<Self, Self::Error> {
        let status = status_in_range(i64::from(doc.status))
            .ok_or_else(|| AppError::InvalidStatus(doc.status.to_string()))?;
        let mut body = Body::input(doc.body);
        if !doc.file.is_empty() {
            body.set_file(&doc.file)?;
        }
        let mut headers = Headers::new();
        for (key, value) in doc.headers {
            headers.set(&key, value);
        }
        Ok(Self {
            status,
            headers,
            body,
            delay: Duration::from_millis(doc.delay),
        })
    }
}
