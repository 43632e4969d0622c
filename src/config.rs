use crate::entries::EntryList;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use serde::Deserialize;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub const DEFAULT_FPS: u32 = 60;
pub const MAX_FPS: u32 = 240;
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const LOG_FILE_PREFIX: &str = "prize-wheel.log";

/// On-disk settings. Every field is optional; CLI flags win over the file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WheelFile {
    #[serde(default)]
    pub entries: Option<Vec<String>>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl WheelFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&data)
            .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(WheelFile::default());
        }
        let file = serde_json::from_slice::<WheelFile>(data)
            .wrap_err("Config is not valid wheel JSON")?;
        Ok(file)
    }
}

/// Values collected from the command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CliOverrides {
    pub config_path: Option<String>,
    pub entries: Vec<String>,
    pub seed: Option<u64>,
    pub fps: Option<u32>,
    pub log_dir: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub entries: EntryList,
    pub seed: Option<u64>,
    pub fps: u32,
    pub frame_interval: Duration,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Reads the config file named by `--config` (if any) and layers the CLI
    /// values on top.
    pub fn resolve(cli: CliOverrides) -> Result<Self> {
        let file = match cli.config_path.as_deref() {
            Some(path) => WheelFile::load(expand_path(path))?,
            None => WheelFile::default(),
        };
        Self::merge(file, cli)
    }

    pub fn merge(file: WheelFile, cli: CliOverrides) -> Result<Self> {
        let entries = if !cli.entries.is_empty() {
            Some(cli.entries)
        } else {
            file.entries
        };
        let entries = match entries {
            Some(list) => EntryList::new(&list)
                .map_err(|e| eyre!("Invalid initial entries: {e}"))?,
            None => EntryList::default(),
        };

        let fps = cli.fps.or(file.fps).unwrap_or(DEFAULT_FPS);
        if !(1..=MAX_FPS).contains(&fps) {
            return Err(eyre!("fps must be between 1 and {MAX_FPS}, got {fps}"));
        }

        let log_dir = cli
            .log_dir
            .or(file.log_dir)
            .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

        Ok(AppConfig {
            entries,
            seed: cli.seed.or(file.seed),
            fps,
            frame_interval: Duration::from_secs_f64(1.0 / fps as f64),
            log_dir: expand_path(&log_dir),
        })
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_all_fields() {
        let json = br#"{"entries": ["Tea", "Coffee"], "seed": 42, "fps": 30, "log_dir": "/tmp/wheel"}"#;
        let file = WheelFile::parse(json).unwrap();
        assert_eq!(
            file,
            WheelFile {
                entries: Some(vec!["Tea".to_string(), "Coffee".to_string()]),
                seed: Some(42),
                fps: Some(30),
                log_dir: Some("/tmp/wheel".to_string()),
            }
        );
    }

    #[test]
    fn parse_blank_file_is_default() {
        assert_eq!(WheelFile::parse(b"  \n").unwrap(), WheelFile::default());
        assert_eq!(WheelFile::parse(b"{}").unwrap(), WheelFile::default());
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        assert!(WheelFile::parse(br#"{"damping": 0.5}"#).is_err());
    }

    fn write_temp_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("prize-wheel-{}-{name}.json", std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn expand_path_replaces_tilde() {
        let expanded = expand_path("~/x");
        assert!(!expanded.starts_with("~"), "{}", expanded.display());
        assert!(expanded.ends_with("x"));
        assert_eq!(expand_path("/var/log/wheel"), PathBuf::from("/var/log/wheel"));
    }

    #[test]
    fn resolve_reads_file_and_cli_wins() {
        let path = write_temp_config(
            "resolve",
            r#"{"entries": ["x", "y"], "seed": 1, "fps": 30, "log_dir": "~/wheel-logs"}"#,
        );
        let cli = CliOverrides {
            config_path: Some(path.display().to_string()),
            entries: vec!["a".into(), "b".into(), "c".into()],
            seed: Some(2),
            ..CliOverrides::default()
        };

        let config = AppConfig::resolve(cli);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.entries.as_slice(), &["a", "b", "c"]);
        assert_eq!(config.seed, Some(2));
        assert_eq!(config.fps, 30);
        assert!(!config.log_dir.starts_with("~"));
        assert!(config.log_dir.ends_with("wheel-logs"));
    }

    #[test]
    fn resolve_missing_file_names_the_path() {
        let path = std::env::temp_dir().join("prize-wheel-no-such-config.json");
        let cli = CliOverrides {
            config_path: Some(path.display().to_string()),
            ..CliOverrides::default()
        };

        let err = AppConfig::resolve(cli).unwrap_err();

        assert!(
            err.to_string().contains(&path.display().to_string()),
            "{err}"
        );
    }

    #[test]
    fn resolve_bad_json_names_the_path() {
        let path = write_temp_config("bad", "{ not json");
        let cli = CliOverrides {
            config_path: Some(path.display().to_string()),
            ..CliOverrides::default()
        };

        let res = AppConfig::resolve(cli);
        fs::remove_file(&path).unwrap();

        let err = res.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"), "{err}");
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn merge_defaults() {
        let config = AppConfig::merge(WheelFile::default(), CliOverrides::default()).unwrap();
        assert_eq!(config.entries, EntryList::default());
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.seed, None);
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
    }

    #[test]
    fn merge_prefers_cli_values() {
        let file = WheelFile {
            entries: Some(vec!["x".into(), "y".into()]),
            seed: Some(1),
            fps: Some(30),
            log_dir: None,
        };
        let cli = CliOverrides {
            entries: vec!["a".into(), "b".into(), "c".into()],
            seed: Some(2),
            ..CliOverrides::default()
        };
        let config = AppConfig::merge(file, cli).unwrap();
        assert_eq!(config.entries.as_slice(), &["a", "b", "c"]);
        assert_eq!(config.seed, Some(2));
        assert_eq!(config.fps, 30);
        assert_eq!(config.frame_interval, Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn merge_rejects_bad_values() {
        let one_entry = CliOverrides {
            entries: vec!["solo".into()],
            ..CliOverrides::default()
        };
        assert!(AppConfig::merge(WheelFile::default(), one_entry).is_err());

        let zero_fps = CliOverrides {
            fps: Some(0),
            ..CliOverrides::default()
        };
        assert!(AppConfig::merge(WheelFile::default(), zero_fps).is_err());
    }
}
