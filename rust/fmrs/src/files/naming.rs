use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use tracing::warn;

use crate::errors::{
    FmrsError,
    Result,
};

pub const CORRELATIONS_SUFFIX: &str = "_correlations";
pub const P_VALUES_SUFFIX: &str = "_pvalues";

/// File stem of an input, used as the base name of every output.
pub fn input_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FmrsError::InputFormat {
            msg: "cannot derive an output name from this path".to_string(),
            path: Some(path.to_path_buf()),
        })
}

/// `<dir>/<stem><suffix>.csv`, or `<dir>/<stem><suffix>_<tag>.csv` when the
/// former already exists.
///
/// `collision_tag` is only consulted on a collision.
///
/// ```
/// use fmrs::files::output_path;
///
/// let dir = tempfile::tempdir().unwrap();
/// let first = output_path(dir.path(), "run1", "_pvalues", || "20240101120000123".into());
/// assert_eq!(first, dir.path().join("run1_pvalues.csv"));
///
/// std::fs::write(&first, "x").unwrap();
/// let second = output_path(dir.path(), "run1", "_pvalues", || "20240101120000123".into());
/// assert_eq!(second, dir.path().join("run1_pvalues_20240101120000123.csv"));
/// ```
pub fn output_path(
    dir: &Path,
    stem: &str,
    suffix: &str,
    collision_tag: impl FnOnce() -> String,
) -> PathBuf {
    let [path] = output_paths(dir, stem, [suffix], collision_tag);
    path
}

/// Paths for a set of outputs that belong together.
///
/// If any of the plain names is taken, every path gets the same `_<tag>`,
/// so the files of one run can always be matched by name.
pub fn output_paths<const N: usize>(
    dir: &Path,
    stem: &str,
    suffixes: [&str; N],
    collision_tag: impl FnOnce() -> String,
) -> [PathBuf; N] {
    let plain = suffixes.map(|suffix| dir.join(format!("{}{}.csv", stem, suffix)));
    let Some(taken) = plain.iter().position(|p| p.exists()) else {
        return plain;
    };
    let tag = collision_tag();
    warn!(
        "{} already exists, writing outputs with suffix _{} instead",
        plain[taken].display(),
        tag
    );
    suffixes.map(|suffix| dir.join(format!("{}{}_{}.csv", stem, suffix, tag)))
}

/// Writes every `(path, contents)` pair or none of them.
///
/// Contents go to temporary files next to their targets first and are only
/// renamed into place once all of them are written. A failed rename removes
/// the outputs already moved.
pub fn write_outputs(outputs: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());
    for (path, contents) in outputs {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| FmrsError::io(e, parent))?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".fmrs_out")
            .tempfile_in(parent)
            .map_err(|e| FmrsError::io(e, parent))?;
        tmp.write_all(contents)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| FmrsError::io(e, tmp.path()))?;
        staged.push((tmp, *path));
    }

    let mut placed: Vec<&Path> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        if let Err(e) = tmp.persist(path) {
            for done in placed {
                if let Err(rm) = std::fs::remove_file(done) {
                    warn!("Unable to remove partial output {}: {}", done.display(), rm);
                }
            }
            return Err(FmrsError::io(e.error, path));
        }
        placed.push(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem(Path::new("/data/run1.SDAT")).unwrap(), "run1");
        assert_eq!(input_stem(Path::new("XX_0001")).unwrap(), "XX_0001");
        assert!(input_stem(Path::new("/")).is_err());
    }

    #[test]
    fn test_tag_only_built_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path(), "a", "", || panic!("not needed"));
        assert_eq!(path, dir.path().join("a.csv"));
    }

    #[test]
    fn test_write_outputs_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_outputs(&[(path.as_path(), b"a,b\n".as_slice())]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_pair_shares_tag_when_only_second_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run1_pvalues.csv"), "old").unwrap();
        let paths = output_paths(
            dir.path(),
            "run1",
            [CORRELATIONS_SUFFIX, P_VALUES_SUFFIX],
            || "20240101120000123".into(),
        );
        assert_eq!(
            paths,
            [
                dir.path().join("run1_correlations_20240101120000123.csv"),
                dir.path().join("run1_pvalues_20240101120000123.csv"),
            ]
        );
    }

    #[test]
    fn test_pair_untagged_without_collision() {
        let dir = tempfile::tempdir().unwrap();
        let paths = output_paths(
            dir.path(),
            "run1",
            [CORRELATIONS_SUFFIX, P_VALUES_SUFFIX],
            || panic!("not needed"),
        );
        assert_eq!(paths[0], dir.path().join("run1_correlations.csv"));
        assert_eq!(paths[1], dir.path().join("run1_pvalues.csv"));
    }

    #[test]
    fn test_failed_write_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("run1_correlations.csv");
        // A directory in the way makes the second rename fail.
        let second = dir.path().join("run1_pvalues.csv");
        std::fs::create_dir(&second).unwrap();

        let res = write_outputs(&[
            (first.as_path(), b"corr".as_slice()),
            (second.as_path(), b"p".as_slice()),
        ]);
        assert!(res.is_err());
        assert!(!first.exists());
        assert!(second.is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".fmrs_out"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
