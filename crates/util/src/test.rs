//! Helpers for integration tests that run binaries.

use std::path::PathBuf;

use predicates::function::{function, FnPredicate};
use tempfile::TempDir;

/// Returns the full path and the file name of a file in `temp_dir`, the file is not created.
pub fn build_temp_file(temp_dir: &TempDir, prefix: &str, extension: &str) -> (PathBuf, PathBuf) {
    let file_name = PathBuf::from(format!("{}.{}", prefix, extension));

    let mut path = PathBuf::from(temp_dir.path());
    path.push(&file_name);

    (path, file_name)
}

/// Splits each argument on whitespace, so that `"--trace trace.log"` can be given as one item.
pub fn prepare_args(args: Vec<&str>) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split_whitespace())
        .map(str::to_string)
        .collect()
}

/// A predicate that always passes, printing the content it was given.
///
/// Used with `assert_cmd` to show stdout/stderr of the command under test.
pub fn print(label: &str) -> FnPredicate<impl Fn(&str) -> bool, str> {
    let label = label.to_string();
    function(move |content: &str| {
        println!("{}:\n{}", label, content);
        true
    })
}

#[cfg(test)]
mod tests {
    use predicates::Predicate;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn args_are_split() {
        // when
        let args = prepare_args(vec!["--trace trace.log", "-vvv", "compile"]);

        // then
        assert_eq!(args, vec!["--trace", "trace.log", "-vvv", "compile"]);
    }

    #[test]
    fn temp_file_is_in_temp_dir() {
        // given
        let temp_dir = tempdir().unwrap();

        // when
        let (path, file_name) = build_temp_file(&temp_dir, "trace", "log");

        // then
        assert_eq!(path.parent(), Some(temp_dir.path()));
        assert_eq!(file_name, PathBuf::from("trace.log"));
        assert!(!path.exists());
    }

    #[test]
    fn print_always_passes() {
        assert!(print("stdout").eval("anything"));
    }
}
