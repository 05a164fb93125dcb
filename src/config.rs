/*!
 * Configuration handling for snapfs
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::{ResultExt, SnapFsError};
use crate::types::Environment;

/// Name of the configuration file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "snapfs.toml";

/// Default redaction marker
pub const DEFAULT_REDACTION: &str = "***REDACTED***";

/// Command-line arguments for snapfs
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "snapfs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export a project snapshot (tree + code bundle) into a single markdown file",
    long_about = "Collects the configured source roots of a project, scrubs secret-looking values from their contents and writes the directory tree plus every file into one markdown document."
)]
pub struct Args {
    /// Project root directory
    #[clap(default_value = ".")]
    pub project_root: PathBuf,

    /// Output file path override
    #[clap(long)]
    pub out: Option<String>,

    /// Path to a snapfs.toml configuration file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Environment name; production refuses to run
    #[clap(long = "env", env = "APP_ENV", default_value = "local")]
    pub environment: String,
}

/// `[scrub]` table of the configuration file
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ScrubFileConfig {
    pub enabled: Option<bool>,
    pub redaction: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub key_allowlist: Option<Vec<String>>,
}

/// `[metadata]` table of the configuration file
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MetadataFileConfig {
    pub enabled: Option<bool>,
    pub generator: Option<String>,
    pub project_name: Option<String>,
}

/// Raw contents of a configuration file; every option is an override
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output: Option<String>,
    pub include: Option<Vec<String>>,
    #[serde(alias = "exclude_paths")]
    pub exclude: Option<Vec<String>>,
    #[serde(alias = "exclude_files")]
    pub never_include: Option<Vec<String>>,
    pub allowed_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub scrub: ScrubFileConfig,
    #[serde(default)]
    pub metadata: MetadataFileConfig,
}

impl FileConfig {
    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        Self::parse(&text)
    }
}

/// Secret scrubbing settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubSettings {
    /// Whether included content is scrubbed
    pub enabled: bool,
    /// Replacement text for detected secrets
    pub redaction: String,
    /// Ordered regex rules, applied before key rules
    pub patterns: Vec<String>,
    /// Ordered key names redacted in `KEY=VALUE` and `"KEY": "VALUE"` shapes
    pub key_allowlist: Vec<String>,
}

impl Default for ScrubSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            redaction: DEFAULT_REDACTION.to_string(),
            patterns: crate::scrub::builtin_patterns(),
            key_allowlist: strings(&[
                "APP_KEY",
                "STRIPE_SECRET",
                "MAIL_PASSWORD",
                "AWS_ACCESS_KEY_ID",
                "AWS_SECRET_ACCESS_KEY",
                "JWT_SECRET",
                "API_KEY",
                "SECRET",
                "TOKEN",
                "PASSWORD",
                "PRIVATE_KEY",
            ]),
        }
    }
}

/// Display-only metadata settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSettings {
    /// Whether the metadata block is emitted
    pub enabled: bool,
    /// Generator identifier shown in the metadata block
    pub generator: String,
    /// Project name override; defaults to the root directory name
    pub project_name: Option<String>,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            generator: env!("CARGO_PKG_NAME").to_string(),
            project_name: None,
        }
    }
}

/// Effective snapshot configuration
///
/// Built once from defaults plus overrides and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Destination file; relative paths resolve against the project root
    pub output: PathBuf,
    /// Roots (directories or files) scanned for candidates, in order
    pub include_roots: Vec<String>,
    /// Path prefixes that exclude everything beneath them
    pub exclude_prefixes: Vec<String>,
    /// Exact names or `*` globs that are always rejected
    pub never_include: Vec<String>,
    /// Lowercase extensions without a dot
    pub allowed_extensions: Vec<String>,
    /// Secret scrubbing settings
    pub scrub: ScrubSettings,
    /// Metadata block settings
    pub metadata: MetadataSettings,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("project.snapshot.md"),
            include_roots: strings(&[
                "app",
                "routes",
                "config",
                "database",
                "resources/views",
                "resources/js",
                "resources/css",
            ]),
            exclude_prefixes: strings(&[
                "vendor",
                "node_modules",
                "storage",
                "bootstrap/cache",
                ".git",
                ".idea",
                ".vscode",
            ]),
            never_include: strings(&[
                ".env*",
                "oauth-*.key",
                "*.pem",
                "*.pfx",
                "*.p12",
                "*id_rsa*",
                "*id_ed25519*",
            ]),
            allowed_extensions: strings(&[
                "php", "js", "ts", "css", "scss", "json", "md", "yml", "yaml",
            ]),
            scrub: ScrubSettings::default(),
            metadata: MetadataSettings::default(),
        }
    }
}

impl SnapshotConfig {
    /// Apply file overrides on top of the defaults
    pub fn from_file_config(file: FileConfig) -> Self {
        let defaults = Self::default();
        let scrub = file.scrub;
        let metadata = file.metadata;

        Self {
            output: file.output.map(PathBuf::from).unwrap_or(defaults.output),
            include_roots: file.include.unwrap_or(defaults.include_roots),
            exclude_prefixes: file.exclude.unwrap_or(defaults.exclude_prefixes),
            never_include: file.never_include.unwrap_or(defaults.never_include),
            allowed_extensions: normalize_extensions(
                file.allowed_extensions
                    .unwrap_or(defaults.allowed_extensions),
            ),
            scrub: ScrubSettings {
                enabled: scrub.enabled.unwrap_or(defaults.scrub.enabled),
                redaction: scrub.redaction.unwrap_or(defaults.scrub.redaction),
                patterns: scrub.patterns.unwrap_or(defaults.scrub.patterns),
                key_allowlist: scrub.key_allowlist.unwrap_or(defaults.scrub.key_allowlist),
            },
            metadata: MetadataSettings {
                enabled: metadata.enabled.unwrap_or(defaults.metadata.enabled),
                generator: metadata.generator.unwrap_or(defaults.metadata.generator),
                project_name: metadata.project_name.or(defaults.metadata.project_name),
            },
        }
    }

    /// Replace the output path
    pub fn with_output(self, output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ..self
        }
    }

    /// Resolve the output path against the project root
    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            project_root.join(&self.output)
        }
    }

    /// Validate values that cannot be checked by the type system
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::ensure!(
            !self.output.as_os_str().is_empty(),
            Config,
            "output path must not be empty"
        );
        crate::ensure!(
            !self.scrub.enabled || !self.scrub.redaction.is_empty(),
            Config,
            "scrub.redaction must not be empty while scrubbing is enabled"
        );
        Ok(())
    }
}

/// Application configuration assembled from the command line
#[derive(Clone, Debug)]
pub struct Config {
    /// Project root directory
    pub project_root: PathBuf,
    /// Environment the run happens in
    pub environment: Environment,
    /// Effective snapshot configuration
    pub snapshot: SnapshotConfig,
}

impl Config {
    /// Create configuration from command-line arguments
    ///
    /// Production environments are refused before any configuration is
    /// read. An explicit `--config` must exist; otherwise `snapfs.toml` in
    /// the project root is used when present.
    pub fn from_args(args: Args) -> crate::error::Result<Self> {
        let environment = Environment::new(args.environment);
        environment.ensure_allowed()?;

        if !args.project_root.is_dir() {
            return Err(SnapFsError::Config(format!(
                "Project root not found: {}",
                args.project_root.display()
            )));
        }

        let file_config = match &args.config {
            Some(path) => {
                crate::ensure!(
                    path.is_file(),
                    Config,
                    "Configuration file not found: {}",
                    path.display()
                );
                FileConfig::load(path)?
            }
            None => {
                let default_path = args.project_root.join(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    FileConfig::load(&default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let mut snapshot = SnapshotConfig::from_file_config(file_config);
        if let Some(out) = args.out {
            snapshot = snapshot.with_output(out);
        }
        snapshot.validate()?;

        Ok(Self {
            project_root: args.project_root,
            environment,
            snapshot,
        })
    }
}

/// Lowercase, strip leading dots and drop duplicates while keeping order
fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.output, PathBuf::from("project.snapshot.md"));
        assert!(config.include_roots.contains(&"app".to_string()));
        assert!(config.never_include.contains(&".env*".to_string()));
        assert!(config.scrub.enabled);
        assert_eq!(config.scrub.redaction, DEFAULT_REDACTION);
        assert_eq!(config.scrub.patterns.len(), 5);
        assert!(config.metadata.enabled);
    }

    #[test]
    fn test_aliases_and_overrides() {
        let text = r#"
output = "out/snap.md"
include = ["src"]
exclude_paths = ["target"]
exclude_files = ["*.key"]
allowed_extensions = [".RS", "toml", "rs"]

[scrub]
enabled = false
redaction = "[gone]"

[metadata]
project_name = "demo"
"#;
        let config = SnapshotConfig::from_file_config(FileConfig::parse(text).unwrap());

        assert_eq!(config.output, PathBuf::from("out/snap.md"));
        assert_eq!(config.include_roots, vec!["src"]);
        assert_eq!(config.exclude_prefixes, vec!["target"]);
        assert_eq!(config.never_include, vec!["*.key"]);
        assert_eq!(config.allowed_extensions, vec!["rs", "toml"]);
        assert!(!config.scrub.enabled);
        assert_eq!(config.scrub.redaction, "[gone]");
        // Untouched options keep their defaults
        assert_eq!(config.scrub.key_allowlist, ScrubSettings::default().key_allowlist);
        assert_eq!(config.metadata.project_name.as_deref(), Some("demo"));
        assert_eq!(config.metadata.generator, "snapfs");
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = FileConfig::parse("exclud = [\"vendor\"]").unwrap_err();
        assert!(matches!(err, SnapFsError::ConfigParse(_)));
    }

    #[test]
    fn test_output_path_resolution() {
        let root = Path::new("/srv/project");
        let config = SnapshotConfig::default();
        assert_eq!(
            config.output_path(root),
            PathBuf::from("/srv/project/project.snapshot.md")
        );

        let config = config.with_output("/tmp/snap.md");
        assert_eq!(config.output_path(root), PathBuf::from("/tmp/snap.md"));
    }

    #[test]
    fn test_validate_rejects_empty_redaction() {
        let mut config = SnapshotConfig::default();
        config.scrub.redaction = String::new();
        assert!(matches!(config.validate(), Err(SnapFsError::Config(_))));

        config.scrub.enabled = false;
        assert!(config.validate().is_ok());
    }
}
