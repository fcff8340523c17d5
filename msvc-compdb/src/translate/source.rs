// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

/// The source file extensions compiled by `cl.exe` as C or C++.
const SOURCE_EXTENSIONS: [&str; 4] = ["c", "cpp", "cxx", "cc"];

/// The flags which set the language of the following source file (`/Tc`, `/Tp`).
const SOURCE_TYPE_QUALIFIERS: [&str; 4] = ["/Tc", "/Tp", "-Tc", "-Tp"];

/// The language of a source file, which selects the compiler frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cxx,
}

/// Returns the lower-cased extension of the argument, if it has one.
fn extension(argument: &str) -> Option<String> {
    let file_name = argument.rsplit(['/', '\\']).next()?;
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Checks the argument has one of the recognized source file extensions.
pub fn has_source_extension(argument: &str) -> bool {
    extension(argument).is_some_and(|extension| SOURCE_EXTENSIONS.contains(&extension.as_str()))
}

/// Select the language by the file extension: `.c` is C, everything else C++.
pub fn language_of(argument: &str) -> Language {
    match extension(argument).as_deref() {
        Some("c") => Language::C,
        _ => Language::Cxx,
    }
}

/// Checks the argument is an absolute path.
///
/// Captured command lines use Windows paths, while the tool might run on any
/// host. Beside the native notion of absolute paths, drive-letter paths
/// (`C:\dir`, `C:/dir`) and UNC paths (`\\server\share`) are accepted.
pub fn is_absolute_path(argument: &str) -> bool {
    if Path::new(argument).is_absolute() {
        return true;
    }
    let bytes = argument.as_bytes();
    let drive_letter = bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    let unc = argument.starts_with(r"\\") || argument.starts_with("//");

    drive_letter || unc
}

pub fn is_source_type_qualifier(argument: &str) -> bool {
    SOURCE_TYPE_QUALIFIERS.contains(&argument)
}

/// Checks the argument names an existing source file.
///
/// The file existence is checked by the given function at the time of the call.
pub fn is_source_file(argument: &str, exists: &dyn Fn(&str) -> bool) -> bool {
    !argument.trim().is_empty()
        && is_absolute_path(argument)
        && has_source_extension(argument)
        && exists(argument)
}

/// Replace the Windows path separators with forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_extensions() {
        assert!(has_source_extension("main.c"));
        assert!(has_source_extension(r"C:\src\main.cpp"));
        assert!(has_source_extension("C:/src/main.cxx"));
        assert!(has_source_extension("main.cc"));
        assert!(has_source_extension("MAIN.CPP"));

        assert!(!has_source_extension("main.h"));
        assert!(!has_source_extension("main.obj"));
        assert!(!has_source_extension("/c"));
        assert!(!has_source_extension(r"C:\dir.cpp\main"));
        assert!(!has_source_extension(".cpp"));
    }

    #[test]
    fn test_language_selection() {
        assert_eq!(language_of("main.c"), Language::C);
        assert_eq!(language_of(r"C:\src\MAIN.C"), Language::C);
        assert_eq!(language_of("main.cpp"), Language::Cxx);
        assert_eq!(language_of("main.cxx"), Language::Cxx);
        assert_eq!(language_of("main.cc"), Language::Cxx);
    }

    #[test]
    fn test_absolute_paths() {
        assert!(is_absolute_path(r"C:\src\main.cpp"));
        assert!(is_absolute_path("c:/src/main.cpp"));
        assert!(is_absolute_path(r"\\server\share\main.cpp"));

        assert!(!is_absolute_path("main.cpp"));
        assert!(!is_absolute_path(r"src\main.cpp"));
        assert!(!is_absolute_path("C:main.cpp"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_native_paths() {
        assert!(is_absolute_path("/home/user/main.cpp"));
    }

    #[test]
    fn test_source_file_requires_existence() {
        let exists = |path: &str| path == "C:/a/x.cpp";

        assert!(is_source_file("C:/a/x.cpp", &exists));
        assert!(!is_source_file("C:/a/y.cpp", &exists));
        assert!(!is_source_file("x.cpp", &|_| true));
        assert!(!is_source_file("C:/a/x.h", &|_| true));
        assert!(!is_source_file("", &|_| true));
    }

    #[test]
    fn test_source_type_qualifiers() {
        assert!(is_source_type_qualifier("/Tp"));
        assert!(is_source_type_qualifier("/Tc"));
        assert!(is_source_type_qualifier("-Tp"));
        assert!(!is_source_type_qualifier("/TP"));
        assert!(!is_source_type_qualifier("/Tpmain.cpp"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(r"C:\foo\bar"), "C:/foo/bar");
        assert_eq!(normalize_path("C:/foo/bar"), "C:/foo/bar");
    }
}
