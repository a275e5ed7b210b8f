use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::common::ArticleRecord;
use crate::crossref::article_from_value;
use crate::error::MatchError;

const DOI_PREFIXES: [&str; 4] = ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "doi:"];

fn is_input_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    name.ends_with(".json") || name.ends_with(".json.gz")
}

/// Expands directories into their `*.json` / `*.json.gz` files, sorted by name.
/// Explicit file arguments are kept in the order given.
pub fn collect_input_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("Failed to read directory: {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_input_file(path))
                .collect();
            found.sort();
            debug!("Found {} input files in {}", found.len(), input.display());
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            bail!("Input path does not exist: {}", input.display());
        }
    }
    Ok(files)
}

/// Output name stem: `works.json.gz` -> `works`
pub fn input_stem(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("input");
    let name = name.strip_suffix(".gz").unwrap_or(name);
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

/// One distinct output stem per input file, in order.
///
/// Files sharing a stem (`works.json` next to `works.json.gz`, or equal names
/// in different directories) get `-2`, `-3`, ... appended.
pub fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    files
        .iter()
        .map(|path| {
            let stem = input_stem(path);
            let mut unique = stem.clone();
            let mut n = 1;
            while !taken.insert(unique.clone()) {
                n += 1;
                unique = format!("{}-{}", stem, n);
            }
            if n > 1 {
                warn!(
                    "Output name '{}' already taken, writing {} as '{}'",
                    stem,
                    path.display(),
                    unique
                );
            }
            unique
        })
        .collect()
}

/// Reads the `items` array of an input file, decompressing `.gz` files
pub fn load_items(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let mut content = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file)
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to decompress: {}", path.display()))?;
    } else {
        BufReader::new(file)
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
    }

    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in input file: {}", path.display()))?;
    match root {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => bail!("'items' must be an array in {}", path.display()),
            None => bail!("Input file {} has no 'items' array at the root", path.display()),
        },
        _ => bail!("Input file {} must contain a JSON object", path.display()),
    }
}

/// Strips resolver and `doi:` prefixes
pub fn clean_doi(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    for prefix in DOI_PREFIXES {
        if lower.starts_with(prefix) {
            return trimmed[prefix.len()..].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// DOI of an item, if one can be found, for labelling failures
pub fn item_doi(item: &Value) -> Option<String> {
    let input = item.get("input")?;
    let doi = match input {
        Value::String(raw) => serde_json::from_str::<Value>(raw)
            .ok()?
            .get("DOI")?
            .as_str()?
            .to_string(),
        Value::Object(map) => map.get("DOI")?.as_str()?.to_string(),
        _ => return None,
    };
    Some(clean_doi(&doi)).filter(|d| !d.is_empty())
}

/// Turns one `{"input": ...}` item into an article record
pub fn parse_item(item: &Value) -> Result<ArticleRecord, MatchError> {
    let input = match item {
        Value::Object(map) => map
            .get("input")
            .filter(|v| !v.is_null())
            .ok_or_else(|| MatchError::InvalidRecord("missing 'input' field".to_string()))?,
        _ => {
            return Err(MatchError::InvalidRecord(
                "item is not a JSON object".to_string(),
            ))
        }
    };
    let mut article = article_from_value(input)?;
    article.doi = article.doi.map(|d| clean_doi(&d)).filter(|d| !d.is_empty());
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_plain_and_gzipped() {
        let dir = TempDir::new().unwrap();
        let body = json!({"items": [{"input": "{}"}, {"input": "{}"}]}).to_string();

        let plain = dir.path().join("a.json");
        fs::write(&plain, &body).unwrap();
        assert_eq!(load_items(&plain).unwrap().len(), 2);

        let gz = dir.path().join("b.json.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        encoder.finish().unwrap();
        assert_eq!(load_items(&gz).unwrap().len(), 2);
    }

    #[test]
    fn test_load_rejects_missing_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"records": []}"#).unwrap();
        assert!(load_items(&path).is_err());
        fs::write(&path, "not json").unwrap();
        assert!(load_items(&path).is_err());
    }

    #[test]
    fn test_collect_expands_directories_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json.gz", "notes.txt", "c.JSON"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let files = collect_input_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json.gz", "b.json", "c.JSON"]);

        assert!(collect_input_files(&[dir.path().join("missing.json")]).is_err());
    }

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem(Path::new("/data/works.json")), "works");
        assert_eq!(input_stem(Path::new("works.json.gz")), "works");
        assert_eq!(input_stem(Path::new("batch.2024.json")), "batch.2024");
    }

    #[test]
    fn test_output_stems_are_distinct() {
        let files = vec![
            PathBuf::from("a/works.json"),
            PathBuf::from("a/works.json.gz"),
            PathBuf::from("b/works.json"),
            PathBuf::from("b/works-2.json"),
            PathBuf::from("b/other.json"),
        ];
        assert_eq!(
            output_stems(&files),
            vec!["works", "works-2", "works-3", "works-2-2", "other"]
        );
    }

    #[test]
    fn test_clean_doi() {
        assert_eq!(clean_doi("https://doi.org/10.1000/ABC"), "10.1000/ABC");
        assert_eq!(clean_doi("doi:10.1000/abc "), "10.1000/abc");
        assert_eq!(clean_doi("10.1000/abc"), "10.1000/abc");
    }

    #[test]
    fn test_parse_item_variants() {
        let inline = json!({"input": {"DOI": "doi:10.1000/x", "title": ["T"]}});
        assert_eq!(parse_item(&inline).unwrap().doi.as_deref(), Some("10.1000/x"));

        let as_string = json!({"input": json!({"DOI": "10.1000/y"}).to_string()});
        assert_eq!(item_doi(&as_string).as_deref(), Some("10.1000/y"));

        assert!(matches!(parse_item(&json!({"other": 1})), Err(MatchError::InvalidRecord(_))));
        assert!(matches!(parse_item(&json!([1, 2])), Err(MatchError::InvalidRecord(_))));
        assert_eq!(item_doi(&json!({"input": "{broken"})), None);
    }
}
