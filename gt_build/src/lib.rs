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

//! `gt_build` carries the ambient bits every other crate in this workspace depends on:
//! the root-directory / cache-directory convention, the per-binary context used to
//! resolve resource lookups, and the `define_load_config!` macro that gives each crate
//! a `load_config::<C>(filename)` entry point backed by `.ron` files on disk.

use std::{env, fs, path::{Path, PathBuf}, sync::OnceLock};

pub mod errors;
use errors::Result;

pub const ROOT_ENV_VAR: &str = "GT_ROOT";

/// identifies which binary of which crate is running, so resource lookup can prefer
/// a binary-specific config/asset directory over the crate-wide default.
#[derive(Debug, Clone)]
pub struct BinContext {
    pub bin_crate: String,
    pub bin_name: String,
}

static BIN_CONTEXT: OnceLock<BinContext> = OnceLock::new();

/// called once from `main()` of a binary to record its identity for resource lookup.
#[macro_export]
macro_rules! set_bin_context {
    () => {
        $crate::init_bin_context(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"))
    };
}

pub fn init_bin_context(bin_crate: &str, bin_name: &str) {
    let _ = BIN_CONTEXT.set(BinContext { bin_crate: bin_crate.to_string(), bin_name: bin_name.to_string() });
}

pub fn bin_context() -> Option<&'static BinContext> {
    BIN_CONTEXT.get()
}

/// root directory for all on-disk state this workspace's binaries own (cache, region
/// store output, downloaded configs). Resolution order:
/// 1. `$GT_ROOT` if set
/// 2. the workspace parent directory, if it already has a `cache/`, `data/`, or `configs/` child
/// 3. `$HOME/.gt`
pub fn root_dir() -> PathBuf {
    let path = if let Ok(root) = env::var(ROOT_ENV_VAR) {
        PathBuf::from(root)
    } else if let Some(ws) = workspace_parent_with_state_dirs() {
        ws
    } else {
        default_root()
    };
    ensure_dir(&path);
    path
}

fn default_root() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".gt")
}

fn workspace_parent_with_state_dirs() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    while !dir.join("Cargo.toml").is_file() {
        if !dir.pop() {
            return None;
        }
    }
    let parent = dir.parent()?.to_path_buf();
    for child in ["cache", "data", "configs"] {
        if parent.join(child).is_dir() {
            return Some(parent);
        }
    }
    None
}

fn ensure_dir(path: &Path) {
    if !path.is_dir() {
        let _ = fs::create_dir_all(path);
    }
}

pub fn cache_dir() -> PathBuf {
    let p = root_dir().join("cache");
    ensure_dir(&p);
    p
}

pub fn data_dir() -> PathBuf {
    let p = root_dir().join("data");
    ensure_dir(&p);
    p
}

pub fn config_dir() -> PathBuf {
    let p = root_dir().join("configs");
    ensure_dir(&p);
    p
}

pub fn is_env_enabled(key: &str) -> bool {
    matches!(env::var(key).as_deref(), Ok("1") | Ok("true") | Ok("on"))
}

pub fn file_contents_as_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// locates a named config file, preferring `configs/<bin_crate>/<bin_name>/<filename>`,
/// then `configs/<bin_crate>/<filename>`, then `configs/<filename>`.
pub fn find_config_file(filename: &str) -> Option<PathBuf> {
    let base = config_dir();
    if let Some(ctx) = bin_context() {
        let per_bin = base.join(&ctx.bin_crate).join(&ctx.bin_name).join(filename);
        if per_bin.is_file() {
            return Some(per_bin);
        }
        let per_crate = base.join(&ctx.bin_crate).join(filename);
        if per_crate.is_file() {
            return Some(per_crate);
        }
    }
    let flat = base.join(filename);
    if flat.is_file() {
        return Some(flat);
    }
    None
}

/// main macro expanded at the top of crates that load `.ron` configs. Generates a
/// crate-private `load_config::<C>(filename)` that looks the file up via
/// [`find_config_file`] and deserializes it with `ron`.
#[macro_export]
macro_rules! define_load_config {
    () => {
        mod configs {
            /// load a `.ron`-encoded config struct by filename, searching the GT_ROOT
            /// configs directory (see `gt_build::find_config_file`).
            pub fn load_config<C>(filename: &str) -> gt_build::errors::Result<C>
            where
                C: for<'a> serde::Deserialize<'a>,
            {
                match gt_build::find_config_file(filename) {
                    Some(path) => {
                        let data = gt_build::file_contents_as_bytes(&path)?;
                        Ok(ron::de::from_bytes(data.as_slice())?)
                    }
                    None => Err(gt_build::errors::GtBuildError::ResourceNotFoundError(filename.to_string())),
                }
            }
        }
        pub use configs::*;
    };
}
