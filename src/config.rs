use gbc_trace_core::TraceOptions;
use gbc_trace_core::region::{Region, RegionMask};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trace options as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TraceConfig {
    pub print_instructions: bool,
    pub print_mapper_changes: bool,
    /// Region names, e.g. `["oam", "io"]`, or `["all"]`.
    pub mem_regions: Vec<String>,
    /// Raw region bits (ROM=0x01 ... BOOT=0x200), merged with `mem_regions`.
    pub mem_mask: u16,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            print_instructions: true,
            print_mapper_changes: false,
            mem_regions: Vec::new(),
            mem_mask: 0,
        }
    }
}

impl TraceConfig {
    /// Unknown region names are skipped with a warning.
    pub fn to_options(&self) -> TraceOptions {
        let mut mem_regions = RegionMask::from_bits(self.mem_mask);
        for name in &self.mem_regions {
            if name.trim().eq_ignore_ascii_case("all") {
                mem_regions = RegionMask::ALL;
                continue;
            }
            match name.parse::<Region>() {
                Ok(region) => mem_regions |= region,
                Err(e) => warn!("Ignoring trace config entry: {e}"),
            }
        }
        TraceOptions {
            print_instructions: self.print_instructions,
            print_mapper_changes: self.print_mapper_changes,
            mem_regions,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("gbctrace").join("trace.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("gbctrace")
            .join("trace.toml");
    }

    PathBuf::from("trace.toml")
}

pub fn load_from_file(path: &Path) -> TraceConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return TraceConfig::default(),
    };

    match toml::from_str::<TraceConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse trace config {}: {e}; using defaults",
                path.display()
            );
            TraceConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_from_file(&dir.path().join("nope.toml"));
        assert_eq!(cfg, TraceConfig::default());
        assert!(cfg.to_options().print_instructions);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.toml");
        fs::write(&path, "print-mapper-changes = true\nmem-regions = [\"oam\", \"hram\"]\n").unwrap();

        let options = load_from_file(&path).to_options();
        assert!(options.print_instructions);
        assert!(options.print_mapper_changes);
        assert!(options.mem_regions.contains(Region::Oam));
        assert!(options.mem_regions.contains(Region::HighRam));
        assert!(!options.mem_regions.contains(Region::Io));
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.toml");
        fs::write(&path, "print-instructions = \"maybe\"").unwrap();
        assert_eq!(load_from_file(&path), TraceConfig::default());
    }

    #[test]
    fn integer_mask_selects_regions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.toml");
        fs::write(&path, "mem-mask = 0x10\n").unwrap();

        let options = load_from_file(&path).to_options();
        assert_eq!(options.mem_regions, RegionMask::from(Region::Oam));
        assert_eq!(options.mem_regions.regions().collect::<Vec<_>>(), vec![Region::Oam]);

        let cfg = TraceConfig {
            mem_mask: 0x40,
            mem_regions: vec!["hram".into()],
            ..TraceConfig::default()
        };
        let mask = cfg.to_options().mem_regions;
        assert!(mask.contains(Region::Io) && mask.contains(Region::HighRam));
        assert!(!mask.contains(Region::Oam));
    }

    #[test]
    fn unknown_regions_are_skipped() {
        let cfg = TraceConfig {
            mem_regions: vec!["io".into(), "banana".into()],
            ..TraceConfig::default()
        };
        assert_eq!(cfg.to_options().mem_regions, RegionMask::from(Region::Io));

        let cfg = TraceConfig {
            mem_regions: vec!["ALL".into()],
            ..TraceConfig::default()
        };
        assert_eq!(cfg.to_options().mem_regions, RegionMask::ALL);
    }
}
