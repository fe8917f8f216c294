use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Case-insensitive comparison of trimmed names.
pub fn same_name(a: impl AsRef<str>, b: impl AsRef<str>) -> bool {
    a.as_ref().trim().to_lowercase() == b.as_ref().trim().to_lowercase()
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: impl AsRef<str>, needle: impl AsRef<str>) -> bool {
    haystack
        .as_ref()
        .to_lowercase()
        .contains(&needle.as_ref().to_lowercase())
}
