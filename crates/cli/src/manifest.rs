use anyhow::{Context, Result, bail};
use cliroute_argparse::ParserSettings;
use cliroute_metadata::{
    CommandDef, DesignType, GroupDef, OptionDefinition, OptionsContainer, ParameterDefinition,
    RouteDef, TreeManifest,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST_NAME: &str = "cliroute.json";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub settings: ParserSettings,

    pub tree: TreeManifest,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))?;

        if manifest.schema_version != SCHEMA_VERSION {
            bail!(
                "unsupported schema-version {} in {} (expected {SCHEMA_VERSION})",
                manifest.schema_version,
                path.display()
            );
        }
        tracing::debug!(
            path = %path.display(),
            commands = manifest.tree.commands.len(),
            groups = manifest.tree.groups.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }
}

/// A small tree that shows each kind of declaration once.
fn sample_tree() -> TreeManifest {
    TreeManifest {
        root: "app".to_string(),
        containers: vec![
            OptionsContainer::new("global").option(
                OptionDefinition::new("verbose")
                    .alias("v")
                    .description("Print more output")
                    .of_type(DesignType::Boolean),
            ),
            OptionsContainer::new("greet").option(
                OptionDefinition::new("times")
                    .alias("n")
                    .description("How often to repeat the greeting")
                    .of_type(DesignType::Integer),
            ),
        ],
        commands: vec![
            CommandDef::new("greet")
                .description("Greet someone")
                .options("greet")
                .parameter(ParameterDefinition::new(1, "name").of_type(DesignType::String)),
            CommandDef::new("help").parameter(
                ParameterDefinition::new(1, "topic")
                    .optional()
                    .array(),
            ),
        ],
        groups: vec![
            GroupDef::new("app")
                .options("global")
                .route(RouteDef::new("greet", "greet").alias("g"))
                .route(RouteDef::star("help")),
        ],
    }
}

pub fn write_default_manifest(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MANIFEST_NAME);
    if dest.exists() && !overwrite {
        bail!(
            "{DEFAULT_MANIFEST_NAME} already exists in {} (use --force to replace it)",
            project_dir.display()
        );
    }

    let manifest = Manifest {
        schema_version: SCHEMA_VERSION,
        settings: ParserSettings::default(),
        tree: sample_tree(),
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
