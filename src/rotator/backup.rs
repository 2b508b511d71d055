// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Error;
use crate::ErrorKind;

/// Returns the path of backup slot `index` for `path`, i.e. `path.index`.
pub(crate) fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Lists the indexes of the backup slots of `path` that exist on disk, in ascending order.
///
/// Only regular files named `<filename>.<n>` with `n >= 1` in canonical decimal form are slots;
/// `app.log.01` or `app.log.1.gz` are not.
pub(crate) fn list_slots(path: &Path) -> Result<Vec<usize>, Error> {
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        return Err(Error::new(ErrorKind::RotationIo, "log filename is not valid UTF-8")
            .with_context("path", path.display()));
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let read_dir = fs::read_dir(dir).map_err(|err| {
        Error::new(ErrorKind::RotationIo, "failed to read log dir")
            .with_context("dir", dir.display())
            .with_source(err)
    })?;

    let mut slots = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;

            // the rotator only creates files, not directories or symlinks
            if !entry.file_type().ok()?.is_file() {
                return None;
            }

            let name = entry.file_name();
            // if the filename is not a UTF-8 string, skip it.
            let name = name.to_str()?;
            let suffix = name.strip_prefix(filename)?.strip_prefix('.')?;
            parse_slot(suffix)
        })
        .collect::<Vec<_>>();

    slots.sort_unstable();
    Ok(slots)
}

fn parse_slot(suffix: &str) -> Option<usize> {
    let index = usize::from_str(suffix).ok()?;
    (index >= 1 && index.to_string() == suffix).then_some(index)
}

/// Shifts every existing slot up by one, from the highest to the lowest.
///
/// `slots` must be sorted ascending. Walking them in reverse guarantees `path.(i+1)` is either
/// absent or already moved when `path.i` is renamed onto it.
pub(crate) fn shift_slots(path: &Path, slots: &[usize]) -> Result<(), Error> {
    for &index in slots.iter().rev() {
        let old = backup_path(path, index);
        let new = backup_path(path, index + 1);
        fs::rename(&old, &new).map_err(|err| {
            Error::new(ErrorKind::RotationIo, "failed to shift backup")
                .with_context("from", old.display())
                .with_context("to", new.display())
                .with_source(err)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::backup_path;
    use super::list_slots;
    use super::parse_slot;
    use super::shift_slots;

    #[test]
    fn test_backup_path() {
        let base = PathBuf::from("/var/log/app.log");
        assert_eq!(backup_path(&base, 1), PathBuf::from("/var/log/app.log.1"));
        assert_eq!(backup_path(&base, 12), PathBuf::from("/var/log/app.log.12"));
        assert_eq!(
            backup_path(&PathBuf::from("app.log"), 3),
            PathBuf::from("app.log.3")
        );
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("1"), Some(1));
        assert_eq!(parse_slot("42"), Some(42));
        assert_eq!(parse_slot("0"), None);
        assert_eq!(parse_slot("01"), None);
        assert_eq!(parse_slot("+1"), None);
        assert_eq!(parse_slot("1.gz"), None);
        assert_eq!(parse_slot(""), None);
    }

    #[test]
    fn test_list_slots_skips_unrelated_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        for name in [
            "app.log",
            "app.log.3",
            "app.log.1",
            "app.log.01",
            "app.log.2.gz",
            "app.logx.4",
            "other.log.5",
        ] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }
        fs::create_dir(temp_dir.path().join("app.log.7")).unwrap();

        assert_eq!(list_slots(&path).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_shift_slots_with_gap() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(backup_path(&path, 1), "A").unwrap();
        fs::write(backup_path(&path, 3), "C").unwrap();

        let slots = list_slots(&path).unwrap();
        shift_slots(&path, &slots).unwrap();

        assert!(!backup_path(&path, 1).exists());
        assert_eq!(fs::read_to_string(backup_path(&path, 2)).unwrap(), "A");
        assert!(!backup_path(&path, 3).exists());
        assert_eq!(fs::read_to_string(backup_path(&path, 4)).unwrap(), "C");
    }
}
