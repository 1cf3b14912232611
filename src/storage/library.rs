use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::response::ResponseDocument;

/// The persisted library: `{"Responses": {name: response}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryDocument {
    #[serde(rename = "Responses", default)]
    responses: Option<BTreeMap<String, ResponseDocument>>,
}

/// `./.httplab` when present in the working directory, `~/.httplab` otherwise.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(".httplab");
    if local.exists() {
        return local;
    }
    dirs::home_dir().map(|home| home.join(".httplab")).unwrap_or(local)
}

fn open_config_file(path: &Path) -> Result<File, AppError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| AppError::file_access(path, e))
}

/// Reads every saved response, creating an empty file when none exists.
/// Empty content is an empty library, not an error.
pub fn load(path: &Path) -> Result<BTreeMap<String, ResponseDocument>, AppError> {
    let mut file = open_config_file(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| AppError::file_access(path, e))?;

    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let doc: LibraryDocument =
        serde_json::from_str(&content).map_err(AppError::MalformedDocument)?;
    Ok(doc.responses.unwrap_or_default())
}

/// Replaces the whole document with `responses`.
pub fn save(path: &Path, responses: BTreeMap<String, ResponseDocument>) -> Result<(), AppError> {
    let mut file = open_config_file(path)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;

    let doc = LibraryDocument { responses: Some(responses) };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| AppError::Other(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let responses = load(&path).unwrap();
        assert!(responses.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{\"Responses\": [").unwrap();

        assert!(matches!(load(&path), Err(AppError::MalformedDocument(_))));
    }

    #[test]
    fn test_load_tolerates_missing_responses_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(load(&path).unwrap().is_empty());

        std::fs::write(&path, "{\"Responses\": null}").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_longer_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut many = BTreeMap::new();
        for i in 0..20 {
            many.insert(format!("r{i}"), ResponseDocument { status: 200, ..Default::default() });
        }
        save(&path, many).unwrap();

        let mut one = BTreeMap::new();
        one.insert("only".to_string(), ResponseDocument { status: 418, ..Default::default() });
        save(&path, one).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["only"].status, 418);
    }

    #[test]
    fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut map = BTreeMap::new();
        map.insert(
            "t1".to_string(),
            ResponseDocument {
                status: 200,
                body: "xxx".into(),
                file: String::new(),
                headers: BTreeMap::from([("X-Myheader".to_string(), "value".to_string())]),
                delay: 1000,
            },
        );
        save(&path, map).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let t1 = &raw["Responses"]["t1"];
        assert_eq!(t1["Status"], 200);
        assert_eq!(t1["Body"], "xxx");
        assert_eq!(t1["File"], "");
        assert_eq!(t1["Delay"], 1000);
        assert_eq!(t1["Headers"]["X-Myheader"], "value");
    }
}
