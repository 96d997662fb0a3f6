use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the application home directory.
///
/// - `None` (or blank) => `<user home>/<default_subdir>`
/// - `~` or `~/...` => expanded against the user home
/// - relative paths => joined with the current working directory
///
/// The returned path is absolute. When `create` is set the directory is created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = configured
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let path = match raw {
        None => user_home()?.join(default_subdir),
        Some(p) => expand_tilde(&p)?,
    };

    let path = if path.is_relative() {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    } else {
        path
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }

    Ok(path)
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine the user home directory"))
}

fn expand_tilde(p: &str) -> Result<PathBuf> {
    if p == "~" {
        return user_home();
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(p).to_path_buf())
}
