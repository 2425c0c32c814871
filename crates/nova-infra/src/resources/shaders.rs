// Copyright 2025 eraflo
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

use super::AssetError;
use nova_core::renderer::{
    GraphicsDevice, ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct ShaderEntry {
    module: ShaderModuleId,
    path: Option<PathBuf>,
}

/// Shader modules looked up by name.
///
/// Loading under a name that is already taken replaces the module and
/// destroys the previous one.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, ShaderEntry>,
}

impl ShaderLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source` and stores it under `name`.
    pub fn load_wgsl(
        &mut self,
        device: &dyn GraphicsDevice,
        name: &str,
        source: &str,
    ) -> Result<ShaderModuleId, AssetError> {
        let module = compile(device, name, source)?;
        self.insert(device, name, ShaderEntry { module, path: None });
        Ok(module)
    }

    /// Reads a WGSL file, compiles it and stores it under `name`.
    ///
    /// The path is remembered for [`reload_all`](Self::reload_all).
    pub fn load_file(
        &mut self,
        device: &dyn GraphicsDevice,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<ShaderModuleId, AssetError> {
        let path = path.as_ref();
        let source = read_source(path)?;
        let module = compile(device, name, &source)?;
        self.insert(
            device,
            name,
            ShaderEntry {
                module,
                path: Some(path.to_path_buf()),
            },
        );
        log::info!("ShaderLibrary: loaded '{name}' from {}", path.display());
        Ok(module)
    }

    /// The module stored under `name`.
    pub fn get(&self, name: &str) -> Option<ShaderModuleId> {
        match self.shaders.get(name) {
            Some(entry) => Some(entry.module),
            None => {
                log::warn!("ShaderLibrary: no shader named '{name}'");
                None
            }
        }
    }

    /// `true` when a module is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.shaders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of stored modules.
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Recompiles every module that was loaded from a file.
    ///
    /// A shader that fails to read or compile keeps its previous module and
    /// is logged. Returns the number of modules replaced.
    pub fn reload_all(&mut self, device: &dyn GraphicsDevice) -> usize {
        let mut reloaded = 0;
        for (name, entry) in self.shaders.iter_mut() {
            let Some(path) = entry.path.as_deref() else {
                continue;
            };
            let module = match read_source(path).and_then(|src| compile(device, name, &src)) {
                Ok(module) => module,
                Err(e) => {
                    log::error!("ShaderLibrary: keeping previous '{name}': {e}");
                    continue;
                }
            };
            release(device, name, entry.module);
            entry.module = module;
            reloaded += 1;
        }
        log::info!("ShaderLibrary: reloaded {reloaded} shader(s)");
        reloaded
    }

    /// Destroys the module stored under `name`. Returns `false` if there was none.
    pub fn remove(&mut self, device: &dyn GraphicsDevice, name: &str) -> bool {
        match self.shaders.remove(name) {
            Some(entry) => {
                release(device, name, entry.module);
                true
            }
            None => false,
        }
    }

    /// Destroys every stored module.
    pub fn clear(&mut self, device: &dyn GraphicsDevice) {
        for (name, entry) in self.shaders.drain() {
            release(device, &name, entry.module);
        }
    }

    fn insert(&mut self, device: &dyn GraphicsDevice, name: &str, entry: ShaderEntry) {
        if let Some(old) = self.shaders.insert(name.to_owned(), entry) {
            log::debug!("ShaderLibrary: replacing '{name}'");
            release(device, name, old.module);
        }
    }
}

fn read_source(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(
    device: &dyn GraphicsDevice,
    name: &str,
    source: &str,
) -> Result<ShaderModuleId, AssetError> {
    let module = device.create_shader_module(&ShaderModuleDescriptor {
        label: Some(name),
        source: ShaderSourceData::Wgsl(Cow::Borrowed(source)),
    })?;
    Ok(module)
}

fn release(device: &dyn GraphicsDevice, name: &str, module: ShaderModuleId) {
    if let Err(e) = device.destroy_shader_module(module) {
        log::warn!("ShaderLibrary: failed to destroy '{name}' ({module:?}): {e}");
    }
}
