use anyhow::{Context, Result};
use ngcli_options::{OptionModel, parse_json_schema_to_options};
use std::fs;
use std::path::Path;

/// Read a JSON Schema file and project it into an option list.
pub fn load_options(path: &Path) -> Result<Vec<OptionModel>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read options schema: {}", path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse options schema JSON: {}", path.display()))?;
    let options = parse_json_schema_to_options(&schema)
        .with_context(|| format!("invalid options schema: {}", path.display()))?;

    tracing::debug!(path = %path.display(), options = options.len(), "loaded options schema");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("ngcli-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_options_from_file() {
        let dir = make_temp_dir("options-load");
        let path = dir.join("schema.json");
        fs::write(
            &path,
            r#"{ "properties": { "name": { "type": "string", "$default": { "$source": "argv", "index": 0 } } } }"#,
        )
        .unwrap();

        let options = load_options(&path).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].positional, Some(0));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reports_invalid_schema_with_path() {
        let dir = make_temp_dir("options-invalid");
        let path = dir.join("schema.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = load_options(&path).unwrap_err();
        assert!(err.to_string().contains("invalid options schema"));
        assert!(format!("{err:#}").contains("must be a JSON object"));

        let _ = fs::remove_dir_all(&dir);
    }
}
