//! Input and output helpers
//!
//! Reads ID lists from the command line or from `.txt` / `.json` files,
//! loads JSON request specs and writes results to stdout or a file.

use crate::error::{OaitError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Split command-line ID arguments on whitespace and commas
pub fn split_ids<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| {
            arg.as_ref()
                .split(|c: char| c.is_whitespace() || c == ',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Read IDs from a `.txt` file (one per line) or a `.json` file.
///
/// JSON may be an array of strings or an array of objects carrying an
/// `id` or `thread_id` field, which is what `get --output` writes.
pub fn read_id_file(path: &Path) -> Result<Vec<String>> {
    match extension(path).as_str() {
        "txt" => {
            let data = std::fs::read_to_string(path)?;
            Ok(split_ids(&data.lines().collect::<Vec<_>>()))
        }
        "json" => {
            let value: Value = read_json(path)?;
            ids_from_json(&value)
        }
        other => Err(OaitError::Input(format!(
            "unsupported ID file type '{}' for {}: use .txt or .json",
            other,
            path.display()
        ))),
    }
}

fn ids_from_json(value: &Value) -> Result<Vec<String>> {
    let Some(entries) = value.as_array() else {
        return Err(OaitError::Input("JSON ID file must hold an array".to_string()));
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Object(map) => map
                .get("id")
                .or_else(|| map.get("thread_id"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| OaitError::Input("JSON entry without an 'id' field".to_string())),
            other => Err(OaitError::Input(format!("unexpected JSON entry: {}", other))),
        })
        .filter(|r| !matches!(r, Ok(s) if s.is_empty()))
        .collect()
}

/// Deserialize a `.json` file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if extension(path) != "json" {
        return Err(OaitError::Input(format!(
            "invalid file name '{}': only JSON is accepted",
            path.display()
        )));
    }

    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|e| OaitError::Input(format!("cannot parse {}: {}", path.display(), e)))
}

/// Serialize results, indented when `pretty` is set
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    encoded.map_err(|e| OaitError::Input(format!("cannot serialize output: {}", e)))
}

/// Write to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, data)?;
            tracing::info!("Wrote {} bytes to {}", data.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(ext: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("oait-{}.{}", uuid::Uuid::new_v4(), ext));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn splits_on_spaces_and_commas() {
        let ids = split_ids(&["thread_a thread_b", "thread_c,thread_d", "  "]);
        assert_eq!(ids, vec!["thread_a", "thread_b", "thread_c", "thread_d"]);
    }

    #[test]
    fn reads_txt_ids_skipping_blank_lines() {
        let path = temp_file("txt", "file-1\n\n  file-2  \nfile-3\n");
        assert_eq!(read_id_file(&path).unwrap(), vec!["file-1", "file-2", "file-3"]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn reads_json_strings_and_objects() {
        let path = temp_file(
            "json",
            r#"["asst_1", {"id": "asst_2"}, {"thread_id": "thread_3", "messages": []}]"#,
        );
        assert_eq!(
            read_id_file(&path).unwrap(),
            vec!["asst_1", "asst_2", "thread_3"]
        );
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = temp_file("csv", "a,b");
        assert!(matches!(read_id_file(&path), Err(OaitError::Input(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_object_without_id() {
        let value: Value = serde_json::json!([{"name": "x"}]);
        assert!(ids_from_json(&value).is_err());
    }

    #[test]
    fn json_spec_must_have_json_extension() {
        let path = temp_file("txt", "{}");
        assert!(read_json::<Value>(&path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn output_goes_to_file() {
        let path = std::env::temp_dir().join(format!("oait-out-{}.json", uuid::Uuid::new_v4()));
        let data = to_json(&vec!["a", "b"], false).unwrap();
        write_output(Some(&path), &data).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["a","b"]"#);
        std::fs::remove_file(path).ok();
    }
}
