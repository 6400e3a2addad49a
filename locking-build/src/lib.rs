// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

// Pre-build code for the locking crate.

// This module makes the values from a Kconfig-style configuration available as conditional
// compilation.  Note that cfgs only apply to the crate whose build.rs emits them; an application
// that wants to see the same settings must call `export_bool_kconfig_over` from its own build.rs,
// naming the locking crate's `prj.conf`.

// The configuration is layered.  Any base file comes first, then the crate's own `prj.conf`, then
// the file named by `DOTCONFIG`, when set.  Later assignments win.

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

/// The name of the default configuration file, relative to the crate being built.
pub const DEFAULT_CONFIG: &str = "prj.conf";

/// A single value assigned in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// `CONFIG_FOO=y`, `CONFIG_FOO=n` or `# CONFIG_FOO is not set`.
    Bool(bool),
    /// `CONFIG_FOO=0x40`.  Hex values are assumed to be unsigned.
    Hex(u64),
    /// `CONFIG_FOO=-3`.  Decimal values are assumed to be signed.
    Int(i64),
    /// `CONFIG_FOO="text"`, kept with its quotes so it can be emitted as a Rust literal.
    Str(String),
}

/// The parsed contents of one or more configuration files.
#[derive(Debug, Default)]
pub struct DotConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl DotConfig {
    /// Parse configuration lines, adding them on top of the values already present.
    pub fn merge<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let config_bool = Regex::new(r"^(CONFIG_\w+)=([yn])$").unwrap();
        let config_unset = Regex::new(r"^# (CONFIG_\w+) is not set$").unwrap();
        let config_hex = Regex::new(r"^(CONFIG_\w+)=0x([0-9a-fA-F]+)$").unwrap();
        let config_int = Regex::new(r"^(CONFIG_\w+)=(-?[0-9]+)$").unwrap();
        // It is unclear what quoting might be used, so only plain double quotes are accepted.
        let config_str = Regex::new(r#"^(CONFIG_\w+)=(".*")$"#).unwrap();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
            let line = line.trim();

            if let Some(caps) = config_bool.captures(line) {
                self.values.insert(caps[1].to_string(), ConfigValue::Bool(&caps[2] == "y"));
            } else if let Some(caps) = config_unset.captures(line) {
                self.values.insert(caps[1].to_string(), ConfigValue::Bool(false));
            } else if let Some(caps) = config_hex.captures(line) {
                let value = u64::from_str_radix(&caps[2], 16)
                    .with_context(|| format!("line {}: bad hex value for {}", lineno + 1, &caps[1]))?;
                self.values.insert(caps[1].to_string(), ConfigValue::Hex(value));
            } else if let Some(caps) = config_int.captures(line) {
                let value = caps[2]
                    .parse()
                    .with_context(|| format!("line {}: bad value for {}", lineno + 1, &caps[1]))?;
                self.values.insert(caps[1].to_string(), ConfigValue::Int(value));
            } else if let Some(caps) = config_str.captures(line) {
                self.values.insert(caps[1].to_string(), ConfigValue::Str(caps[2].to_string()));
            } else if line.is_empty() || line.starts_with('#') {
                continue;
            } else {
                anyhow::bail!("line {}: unrecognized setting {:?}", lineno + 1, line);
            }
        }

        Ok(())
    }

    /// Load a single file on top of the current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("Unable to open config {}", path.display()))?;
        self.merge(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name)
    }

    /// All of the boolean entries that are set to `y`.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|(name, value)| match value {
            ConfigValue::Bool(true) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Write the numeric and string values as Rust constants.
    ///
    /// This is a little simplistic, and will make the entries numeric if they look like numbers.
    pub fn write_mod<W: Write>(&self, mut out: W) -> Result<()> {
        for (name, value) in &self.values {
            match value {
                ConfigValue::Bool(_) => continue,
                ConfigValue::Hex(value) => {
                    writeln!(out, "#[allow(dead_code)]")?;
                    writeln!(out, "pub const {}: usize = {:#x};", name, value)?;
                }
                ConfigValue::Int(value) => {
                    writeln!(out, "#[allow(dead_code)]")?;
                    writeln!(out, "pub const {}: isize = {};", name, value)?;
                }
                ConfigValue::Str(value) => {
                    writeln!(out, "#[allow(dead_code)]")?;
                    writeln!(out, "pub const {}: &'static str = {};", name, value)?;
                }
            }
        }
        Ok(())
    }
}

/// Order the configuration layers: `base` files first, then the crate's own `prj.conf`, then
/// `dotconfig` if given.
fn layer_paths(base: &[&Path], manifest_dir: &Path, dotconfig: Option<PathBuf>) -> Vec<PathBuf> {
    let mut layers: Vec<PathBuf> = base.iter().map(|path| path.to_path_buf()).collect();
    layers.push(manifest_dir.join(DEFAULT_CONFIG));
    layers.extend(dotconfig);
    layers
}

/// The configuration files that apply to the crate being built, in the order they are applied.
fn config_layers(base: &[&Path]) -> Vec<PathBuf> {
    let manifest = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");

    println!("cargo:rerun-if-env-changed=DOTCONFIG");
    let dotconfig = env::var("DOTCONFIG").ok().map(PathBuf::from);

    layer_paths(base, Path::new(&manifest), dotconfig)
}

fn load_layers(base: &[&Path]) -> DotConfig {
    let mut config = DotConfig::default();
    for layer in config_layers(base) {
        println!("cargo:rerun-if-changed={}", layer.display());
        config.merge_file(&layer).expect("Unable to load configuration");
    }
    config
}

/// Load the layered configuration for the crate being built.
///
/// Makes sure the build script is rerun when any of the files change.
pub fn load_dotconfig() -> DotConfig {
    load_layers(&[])
}

/// Load the layered configuration for the crate being built, on top of another crate's
/// configuration file.
///
/// An application uses this to see the same settings the `locking` crate was built with, while
/// still being able to add its own.
pub fn load_dotconfig_over(base: &Path) -> DotConfig {
    load_layers(&[base])
}

fn export_enabled(config: &DotConfig) {
    for name in config.enabled() {
        println!("cargo:rustc-cfg={}", name);
    }
}

/// Export boolean Kconfig entries.  This must happen in any crate that wishes to access the
/// configuration settings.
pub fn export_bool_kconfig() {
    export_enabled(&load_dotconfig());
}

/// Export boolean Kconfig entries, starting from another crate's configuration file.
pub fn export_bool_kconfig_over(base: &Path) {
    export_enabled(&load_dotconfig_over(base));
}

/// Capture numeric and string kconfig values in a 'kconfig' module, written to
/// `$OUT_DIR/kconfig.rs`.
pub fn build_kconfig_mod() {
    let outdir = env::var("OUT_DIR").expect("OUT_DIR must be set");
    let gen_path = Path::new(&outdir).join("kconfig.rs");

    let config = load_dotconfig();
    let f = File::create(&gen_path).expect("Unable to create kconfig.rs");
    config.write_mod(f).expect("Unable to write kconfig.rs");
}
