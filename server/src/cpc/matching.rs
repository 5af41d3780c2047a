//! Fuzzy matching of CPC image paths against registered image names
//!
//! A CPC file carries the Windows-side absolute path of its image. Image
//! names on our side are free text, often a partial or full relative path
//! with either slash style. Matching favors the candidate needing the
//! fewest path components dropped from the CPC path, and a failure to match
//! is a normal "skip this file" outcome, never an error.

/// Find the best-matching candidate for a CPC's image filepath.
///
/// Returns the index into `names` of the first candidate whose full
/// component list equals the longest possible suffix of the CPC path, or
/// `None` when nothing matches at any suffix length.
///
/// Forward and back slashes are equivalent separators and a leading slash
/// is ignored on both sides. Components must match exactly:
/// `Site A Transect 1` never matches `Site A\Transect 1`, and `sect 1`
/// never matches `Transect 1`.
pub fn find_matching_image<T: AsRef<str>>(image_filepath: &str, names: &[T]) -> Option<usize> {
    let search = path_components(image_filepath);
    let filename = *search.last()?;

    // Pre-filter: exact filename suffix at a separator boundary (or the
    // whole name). `IMG_0001.JPG` must not match `Quadrant_5_IMG_0001.JPG`.
    let candidates: Vec<(usize, Vec<&str>)> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| ends_with_filename(name.as_ref(), filename))
        .map(|(i, name)| (i, path_components(name.as_ref())))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    // Longest suffix first: full path, then minus the leading component,
    // down to the filename alone.
    for drop in 0..search.len() {
        let suffix = &search[drop..];
        for (index, components) in &candidates {
            if components == suffix {
                return Some(*index);
            }
        }
    }
    None
}

/// Split a path on either slash style, discarding empty components (so a
/// leading slash is treated as not present).
fn path_components(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|c| !c.is_empty()).collect()
}

/// True when `name` ends with `filename` immediately preceded by a path
/// separator or by nothing at all.
fn ends_with_filename(name: &str, filename: &str) -> bool {
    let Some(prefix) = name.strip_suffix(filename) else {
        return false;
    };
    match prefix.chars().next_back() {
        None => true,
        Some(c) => c == '/' || c == '\\',
    }
}
