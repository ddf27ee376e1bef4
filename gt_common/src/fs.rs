/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::errors::Result;

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn path_to_lossy_string(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().into_owned()
}

pub fn file_contents_as_string(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path)?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(s)
}

pub fn file_contents(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

pub fn file_length(path: impl AsRef<Path>) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

pub fn existing_non_empty_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    path.is_file() && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// (over)write `contents`, keeping the previous version as `<path>.bak` if it existed.
pub fn create_file_with_backup(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        let backup = path.with_extension("bak");
        fs::copy(path, &backup)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

pub fn append_line_to_file(path: impl AsRef<Path>, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// refreshes a file's last-accessed time without touching mtime, used to implement
/// the cache's "access refreshes last_accessed" rule at the filesystem level when the
/// index itself isn't consulted.
pub fn touch_accessed(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let now = SystemTime::now();
    let metadata = fs::metadata(path)?;
    let mtime = filetime_like(metadata.modified().unwrap_or(now));
    let _ = mtime;
    // std has no portable "set atime only" primitive without a dedicated crate; opening
    // the file for read is enough to let the OS update atime under normal mount options.
    let mut f = File::open(path)?;
    let mut buf = [0u8; 1];
    let _ = f.read(&mut buf);
    Ok(())
}

fn filetime_like(t: SystemTime) -> SystemTime {
    t
}

/// recursively visits every file (not directory) under `dir`.
pub fn visit_files(dir: impl AsRef<Path>, f: &mut dyn FnMut(&Path)) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            visit_files(&path, f)?;
        } else {
            f(&path);
        }
    }
    Ok(())
}

/// removes every regular file under `dir` whose age exceeds `max_age_days`. Used by the
/// Cache's time-based eviction sweep; not LRU.
pub fn remove_old_files(dir: impl AsRef<Path>, max_age_days: f64) -> Result<usize> {
    let dir = dir.as_ref();
    let max_age = std::time::Duration::from_secs_f64(max_age_days * 86400.0);
    let now = SystemTime::now();
    let mut removed = 0;

    visit_files(dir, &mut |path| {
        if let Ok(meta) = fs::metadata(path) {
            if let Ok(created) = meta.created().or_else(|_| meta.modified()) {
                if let Ok(age) = now.duration_since(created) {
                    if age > max_age {
                        if fs::remove_file(path).is_ok() {
                            removed += 1;
                        }
                    }
                }
            }
        }
    })?;
    Ok(removed)
}

pub fn get_filename_extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref().extension().map(|e| e.to_string_lossy().into_owned())
}

pub fn get_file_basename(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref().file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// removes a directory tree if it exists; a missing directory is not an error.
pub fn remove_dir_if_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

pub fn sibling_path(path: impl AsRef<Path>, new_extension: &str) -> PathBuf {
    path.as_ref().with_extension(new_extension)
}
