//! Executable name matching.
//!
//! Process and module names are matched against a shell-style glob the same way
//! Explorer matches file specs: `*` matches any run of characters, `?` matches
//! exactly one, and comparison ignores case.

/// A case-insensitive glob over file names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePattern {
    source: String,
    folded: Vec<char>,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            folded: fold(pattern),
        }
    }

    /// Match a bare file name (no directory part).
    pub fn matches(&self, name: &str) -> bool {
        glob_match(&self.folded, &fold(name))
    }

    /// Match the final component of a path. Both `\` and `/` separate components,
    /// so NT device paths such as `\Device\HarddiskVolume3\...\pico8.exe` work.
    pub fn matches_path(&self, path: &str) -> bool {
        self.matches(file_name(path))
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Final component of a `\`- or `/`-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

fn fold(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Iterative wildcard match with single-star backtracking.
fn glob_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some('?') => {
                p += 1;
                n += 1;
            }
            Some(&c) if c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    p = sp + 1;
                    n = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
