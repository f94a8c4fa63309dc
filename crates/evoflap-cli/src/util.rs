use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use evoflap_engine::WorldConfig;

use crate::schema::report::TrainingReport;

/// Loads a world configuration from a JSON file.
pub fn load_world_config(path: &Path) -> anyhow::Result<WorldConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open world config: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse world config: {}", path.display()))
}

/// Writes the report as pretty JSON to `path`, or to stdout without one.
pub fn save_report(report: &TrainingReport, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            write_pretty(BufWriter::new(file), report)
                .with_context(|| format!("Failed to write report to {}", path.display()))
        }
        None => write_pretty(io::stdout().lock(), report).context("Failed to write report to stdout"),
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_world_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        let mut config = WorldConfig::default();
        config.obstacle.gap_height = 150.0;
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(load_world_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_or_malformed_world_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_world_config(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to open world config"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"width\": ").unwrap();
        let err = load_world_config(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse world config"));
    }

    #[test]
    fn test_write_pretty_ends_with_newline() {
        let mut buf = Vec::new();
        write_pretty(&mut buf, &WorldConfig::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"width\""));
    }
}
