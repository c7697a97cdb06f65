//! Store path handling shared by the server and the CLI.

use std::path::{Path, PathBuf};

/// Resolve a leading `~` component against `$HOME`.
///
/// Paths without one, or with `$HOME` unset, come back unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_paths_are_untouched() {
    for p in ["/var/lib/magister.db", "magister.db", "~user/magister.db", ":memory:"] {
      assert_eq!(expand_tilde(Path::new(p)), PathBuf::from(p));
    }
  }

  #[test]
  fn leading_tilde_uses_home() {
    let Some(home) = std::env::var_os("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/.local/magister.db")),
      PathBuf::from(home).join(".local/magister.db"),
    );
  }
}
