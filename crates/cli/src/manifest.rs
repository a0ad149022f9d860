use anyhow::{Context, Result, bail};
use ngcli_argparse::help::CommandInfo;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST_NAME: &str = "ngcli.json";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEntry {
    /// Command name (e.g. `generate`).
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Options schema, relative to the manifest directory.
    ///
    /// Commands without a schema accept free-form arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,

    #[serde(default)]
    pub hidden: bool,
}

impl CommandInfo for CommandEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Manifest {
    /// Detect invalid alias configuration (duplicate aliases or an alias
    /// colliding with a command name).
    pub fn validate_aliases(&self) -> Result<()> {
        let names: HashSet<&str> = self
            .commands
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| !n.trim().is_empty())
            .collect();

        let mut alias_map: HashMap<&str, &str> = HashMap::new();
        for cmd in &self.commands {
            for alias in &cmd.aliases {
                let alias = alias.trim();
                if alias.is_empty() || alias == cmd.name {
                    continue;
                }
                if names.contains(alias) {
                    bail!(
                        "alias conflict: '{alias}' is both a command name and an alias (command: {})",
                        cmd.name
                    );
                }
                if let Some(prev) = alias_map.insert(alias, cmd.name.as_str()) {
                    if prev != cmd.name {
                        bail!(
                            "alias conflict: '{alias}' refers to both '{prev}' and '{}'",
                            cmd.name
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Return the command whose name, or failing that one of whose aliases,
    /// equals `raw`.
    pub fn resolve_command(&self, raw: &str) -> Option<&CommandEntry> {
        self.commands
            .iter()
            .find(|c| c.name == raw)
            .or_else(|| {
                self.commands
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| a == raw))
            })
    }
}

#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub base_dir: PathBuf,
    pub manifest: Manifest,
}

impl LoadedManifest {
    /// Absolute path of the command's options schema, if it declares one.
    pub fn schema_path(&self, command: &CommandEntry) -> Option<PathBuf> {
        command
            .schema
            .as_deref()
            .map(|p| resolve_against(&self.base_dir, p))
    }
}

pub fn load_manifest(manifest_path: Option<&Path>) -> Result<Option<LoadedManifest>> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let (path, explicit) = match manifest_path {
        Some(p) => (resolve_against(&cwd, p), true),
        None => (cwd.join(DEFAULT_MANIFEST_NAME), false),
    };

    if !path.exists() {
        if explicit {
            bail!("manifest not found: {}", path.display());
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))?;

    if let Some(version) = manifest.schema_version {
        if version > MANIFEST_SCHEMA_VERSION {
            bail!(
                "unsupported manifest schemaVersion {version} in {} (expected <= {MANIFEST_SCHEMA_VERSION})",
                path.display()
            );
        }
    }
    manifest
        .validate_aliases()
        .with_context(|| format!("invalid manifest: {}", path.display()))?;

    let base_dir = path.parent().map(|p| p.to_path_buf()).unwrap_or(cwd);
    tracing::debug!(path = %path.display(), commands = manifest.commands.len(), "loaded manifest");

    Ok(Some(LoadedManifest { base_dir, manifest }))
}

pub fn write_default_manifest(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MANIFEST_NAME);
    if dest.exists() && !overwrite {
        bail!("{DEFAULT_MANIFEST_NAME} already exists in {}", project_dir.display());
    }

    let manifest = Manifest {
        schema_version: Some(MANIFEST_SCHEMA_VERSION),
        commands: Vec::new(),
    };

    let bytes = serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;
    let mut out = String::from_utf8(bytes).context("manifest is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
