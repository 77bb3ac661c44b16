use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where Markdown is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read(&self) -> Result<String> {
        match self {
            Input::Stdin => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin"),
            Input::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Output file name for this input's payload inside `dir`.
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        let stem = match self {
            Input::Stdin => "stdin".into(),
            Input::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".into()),
        };
        dir.join(format!("{stem}.json"))
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolve command-line arguments into inputs.
///
/// No arguments, or a lone `-`, means stdin. Arguments containing glob
/// characters (*, ?, [) are expanded; anything else must be an existing
/// file.
pub fn resolve_inputs(patterns: &[String]) -> Result<Vec<Input>> {
    if patterns.is_empty() || patterns == ["-"] {
        return Ok(vec![Input::Stdin]);
    }

    let mut inputs = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let paths =
                glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

            let mut match_count = 0;
            for path in paths {
                let path =
                    path.with_context(|| format!("Failed to read glob match for: {pattern}"))?;
                inputs.push(Input::File(path));
                match_count += 1;
            }

            if match_count == 0 {
                log::warn!("No files matched pattern: {pattern}");
            }
        } else {
            let path = PathBuf::from(pattern);
            if !path.exists() {
                anyhow::bail!("File not found: {pattern}");
            }
            inputs.push(Input::File(path));
        }
    }

    Ok(inputs)
}
