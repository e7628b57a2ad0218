use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tally_classifier::DecisionRule;
use tally_learning::LearningConfig;

use crate::state::{default_assets_dir, ensure_tally_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assets: AssetsSection,
    pub classifier: DecisionRule,
    pub learning: LearningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Directory holding vocab.json, labels.json and the model (default: ~/.tally/assets)
    pub dir: Option<PathBuf>,
    /// Model file name inside `dir`; `.json` dense weights or `.onnx`
    pub model: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            dir: None,
            model: "model.json".to_string(),
        }
    }
}

impl Config {
    pub fn assets_dir(&self, home: &Path) -> PathBuf {
        self.assets
            .dir
            .clone()
            .unwrap_or_else(|| default_assets_dir(home))
    }

    pub fn model_path(&self, home: &Path) -> PathBuf {
        self.assets_dir(home).join(&self.assets.model)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.assets.model, "model.json");
        assert_eq!(cfg.classifier, DecisionRule::default());
        assert_eq!(cfg.learning.capacity, 500);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            "[assets]\ndir = \"/opt/tally\"\nmodel = \"model.onnx\"\n\n[classifier]\nmin_confidence = 0.6\n",
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(
            cfg.model_path(Path::new("/home/u/.tally")),
            PathBuf::from("/opt/tally/model.onnx")
        );
        assert_eq!(cfg.classifier.min_confidence, 0.6);
        assert_eq!(cfg.classifier.min_gap, DecisionRule::default().min_gap);
        assert_eq!(cfg.learning, LearningConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.learning.min_partial_len = 3;
        save_config_to(&cfg, &p).unwrap();

        let loaded = load_config_from(&p).unwrap();
        assert_eq!(loaded.learning.min_partial_len, 3);
        assert_eq!(loaded.assets.dir, None);
        assert_eq!(
            loaded.assets_dir(Path::new("/home/u/.tally")),
            PathBuf::from("/home/u/.tally/assets")
        );
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[assets\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
