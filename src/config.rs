//! Generator configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! [source]
//! trim_chars = ['"']
//!
//! [data_tables]
//! source_dir = "data_tables"
//! output_dir = "data_tables"
//! manifest = "data_tables/collection.json"
//!
//! [data_tables.layout]
//! id_column = 1
//!
//! [code]
//! code_dir = "src/data_rows"
//! namespace = "tablegen::runtime"
//! class_prefix = "DR"
//! ```

use crate::codegen::{CodegenOptions, DEFAULT_CLASS_PREFIX, DEFAULT_NAMESPACE};
use crate::data_table::DataTableLayout;
use crate::dictionary::DictionaryLayout;
use crate::error::TableError;
use crate::processor::SourceFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tablegen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub source: SourceFormat,
    pub data_tables: DataTableSettings,
    pub dictionaries: DictionarySettings,
    pub configs: ConfigTableSettings,
    pub code: CodeSettings,
}

/// Declares the settings of one batch: where sources are found, where artifacts go, the
/// manifest listing table names, and the header layout. Omitted keys take the batch's defaults.
macro_rules! batch_settings {
    ($name:ident, $layout:ty, $dir:literal, $default_layout:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            pub source_dir: PathBuf,
            pub output_dir: PathBuf,
            /// JSON list of table names.
            pub manifest: PathBuf,
            pub source_extension: String,
            pub data_extension: String,
            pub layout: $layout,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    source_dir: PathBuf::from($dir),
                    output_dir: PathBuf::from($dir),
                    manifest: Path::new($dir).join("collection.json"),
                    source_extension: "txt".to_string(),
                    data_extension: "bytes".to_string(),
                    layout: $default_layout,
                }
            }
        }

        impl $name {
            pub fn source_path(&self, name: &str) -> PathBuf {
                self.source_dir.join(format!("{}.{}", name, self.source_extension))
            }

            pub fn data_path(&self, name: &str) -> PathBuf {
                self.output_dir.join(format!("{}.{}", name, self.data_extension))
            }

            fn overwrites_sources(&self) -> bool {
                self.source_dir == self.output_dir && self.source_extension == self.data_extension
            }
        }
    };
}

batch_settings!(DataTableSettings, DataTableLayout, "data_tables", DataTableLayout::default());
batch_settings!(DictionarySettings, DictionaryLayout, "dictionaries", DictionaryLayout::default());
// Config tables carry a title row above the name row.
batch_settings!(
    ConfigTableSettings,
    DictionaryLayout,
    "configs",
    DictionaryLayout {
        name_row: 1,
        content_start_row: 2,
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeSettings {
    pub code_dir: PathBuf,
    /// Template file; the built-in template when absent.
    pub template: Option<PathBuf>,
    pub namespace: String,
    pub class_prefix: String,
}

impl Default for CodeSettings {
    fn default() -> Self {
        CodeSettings {
            code_dir: PathBuf::from("src/data_rows"),
            template: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] in `dir` when present, or defaults.
    pub fn load(dir: &Path, path: Option<&Path>) -> Result<Self, TableError> {
        let (path, text) = match path {
            Some(p) => (p.to_path_buf(), std::fs::read_to_string(p).map_err(|e| TableError::io(p, e))?),
            None => {
                let p = dir.join(DEFAULT_CONFIG_FILE);
                match std::fs::read_to_string(&p) {
                    Ok(text) => (p, text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
                    Err(e) => return Err(TableError::io(&p, e)),
                }
            }
        };
        let config: Self = toml::from_str(&text).map_err(|e| {
            TableError::Configuration(format!("parsing configuration file '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, TableError> {
        toml::to_string_pretty(self).map_err(|e| TableError::Configuration(e.to_string()))
    }

    fn validate(&self) -> Result<(), TableError> {
        if self.code.namespace.trim().is_empty() {
            return Err(TableError::Configuration("code.namespace must not be empty".to_string()));
        }
        for (label, overwrites) in [
            ("data_tables", self.data_tables.overwrites_sources()),
            ("dictionaries", self.dictionaries.overwrites_sources()),
            ("configs", self.configs.overwrites_sources()),
        ] {
            if overwrites {
                return Err(TableError::Configuration(format!(
                    "{}: data files would overwrite their sources",
                    label
                )));
            }
        }
        Ok(())
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            namespace: self.code.namespace.clone(),
            class_prefix: self.code.class_prefix.clone(),
            trim_chars: self.source.trim_chars.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = GeneratorConfig::load(dir.path(), None).expect("load");
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.data_tables.layout.content_start_row, 4);
        assert_eq!(config.dictionaries.layout.name_row, 0);
        assert_eq!(config.configs.layout.name_row, 1);
        assert_eq!(config.configs.source_path("audio"), PathBuf::from("configs/audio.txt"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[data_tables]\nsource_dir = \"in\"\n\n[data_tables.layout]\nid_column = 2\n\n[code]\nclass_prefix = \"Row\"\n",
        )
        .expect("write");
        let config = GeneratorConfig::load(dir.path(), None).expect("load");
        assert_eq!(config.data_tables.source_dir, PathBuf::from("in"));
        assert_eq!(config.data_tables.output_dir, PathBuf::from("data_tables"));
        assert_eq!(config.data_tables.layout.id_column, 2);
        assert_eq!(config.data_tables.layout.type_row, 2);
        assert_eq!(config.codegen_options().class_prefix, "Row");
        assert_eq!(config.data_tables.data_path("hero"), PathBuf::from("data_tables/hero.bytes"));
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[code]\nnamspace = \"x\"\n").expect("write");
        assert!(matches!(
            GeneratorConfig::load(dir.path(), Some(&path)),
            Err(TableError::Configuration(_))
        ));
        std::fs::write(&path, "[dictionaries]\ndata_extension = \"txt\"\n").expect("write");
        assert!(GeneratorConfig::load(dir.path(), Some(&path)).is_err());
    }

    #[test]
    fn explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = GeneratorConfig::load(dir.path(), Some(&dir.path().join("nope.toml"))).expect_err("missing");
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn serialized_defaults_load_back() {
        let text = GeneratorConfig::default().to_toml().expect("toml");
        let back: GeneratorConfig = toml::from_str(&text).expect("parse");
        assert_eq!(back, GeneratorConfig::default());
    }
}
