use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

// Include default patterns at compile time
const DEFAULT_PATTERNS_BYTES: &[u8] = include_bytes!("../default_path_patterns.txt");

pub const DEFAULT_PATTERNS_FILE: &str = "path_patterns.txt";

/// One pattern per line; blank lines and `#` comments are skipped.
pub fn parse_path_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn embedded_patterns() -> Result<Vec<String>> {
    let default_content = std::str::from_utf8(DEFAULT_PATTERNS_BYTES)
        .context("Failed to decode embedded default patterns")?;
    Ok(parse_path_patterns(default_content))
}

/// Loads path patterns from `pattern_file_path`, else `path_patterns.txt` in the
/// working directory, else the embedded defaults.
pub fn load_path_patterns(pattern_file_path: Option<&Path>) -> Result<Vec<String>> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "pattern_loading",
        "Starting path pattern loading"
    );

    let patterns = if let Some(path) = pattern_file_path {
        if !path.exists() {
            anyhow::bail!("Pattern file not found: {:?}", path);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {:?}", path))?;
        let patterns = parse_path_patterns(&content);
        info!(action = "loaded", component = "pattern_file", pattern_count = patterns.len(), file_path = ?path, "Loaded patterns from file");
        patterns
    } else {
        let default_file = Path::new(DEFAULT_PATTERNS_FILE);
        let from_file = if default_file.exists() {
            let content = fs::read_to_string(default_file)?;
            parse_path_patterns(&content)
        } else {
            Vec::new()
        };

        if from_file.is_empty() {
            let patterns = embedded_patterns()?;
            info!(
                action = "loaded",
                component = "embedded_patterns",
                pattern_count = patterns.len(),
                "Loaded patterns from embedded defaults"
            );
            patterns
        } else {
            info!(action = "loaded", component = "default_pattern_file", pattern_count = from_file.len(), file_path = ?default_file, "Loaded patterns from default file");
            from_file
        }
    };

    info!(
        action = "complete",
        component = "pattern_loading",
        pattern_count = patterns.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Path patterns ready"
    );
    Ok(patterns)
}

/// Writes the embedded defaults to `target`, refusing to overwrite.
pub fn init_default_patterns(target: &Path) -> Result<()> {
    if target.exists() {
        anyhow::bail!(
            "{:?} already exists. Remove it first if you want to reinitialize.",
            target
        );
    }

    let default_content = std::str::from_utf8(DEFAULT_PATTERNS_BYTES)
        .context("Failed to decode embedded default patterns")?;

    fs::write(target, default_content)?;
    println!("Created {} with default patterns", target.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks_are_skipped() {
        let patterns = parse_path_patterns("# tools\n\n  /sizing  \n/advisor/\n#/old/\n");
        assert_eq!(patterns, vec!["/sizing", "/advisor/"]);
    }

    #[test]
    fn embedded_defaults_cover_engineering_tools() {
        let patterns = embedded_patterns().unwrap();
        assert_eq!(patterns.len(), 37);
        assert_eq!(patterns.first().map(String::as_str), Some("/proof-test-estimator/"));
        assert_eq!(patterns.last().map(String::as_str), Some("/sizing"));
    }

    #[test]
    fn explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.txt");
        fs::write(&path, "/only-this\n").unwrap();
        assert_eq!(load_path_patterns(Some(&path)).unwrap(), vec!["/only-this"]);
    }

    #[test]
    fn missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_path_patterns(Some(&dir.path().join("nope.txt"))).is_err());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(DEFAULT_PATTERNS_FILE);
        init_default_patterns(&target).unwrap();
        assert_eq!(
            parse_path_patterns(&fs::read_to_string(&target).unwrap()).len(),
            37
        );
        assert!(init_default_patterns(&target).is_err());
    }
}
