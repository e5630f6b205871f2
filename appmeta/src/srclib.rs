//! Reusable source libraries that build recipes pull in by name.
//!
//! Each library is a small `Key:Value` document in a registry directory,
//! named `<Library>.txt`. Recipes reference them as `Library@revision`.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{error::Location, package::Package, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Srclib {
    pub repo_type: String,
    pub repo: String,
    pub subdir: Option<Vec<String>>,
    pub prepare: Option<String>,
    /// Keys with no dedicated slot, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

/// Parse one source-library document. A missing file yields the defaults.
pub fn parse_srclib(path: &Path) -> Result<Srclib> {
    let mut srclib = Srclib::default();
    if !path.exists() {
        return Ok(srclib);
    }

    let content = fs::read_to_string(path)?;
    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| Error::grammar(Location::new(line, index + 1), "Invalid metadata"))?;

        match key {
            "Repo Type" => srclib.repo_type = value.to_string(),
            "Repo" => srclib.repo = value.to_string(),
            "Subdir" => srclib.subdir = Some(value.split(',').map(String::from).collect()),
            "Prepare" => srclib.prepare = Some(value.to_string()),
            other => {
                srclib.extra.insert(other.to_string(), value.to_string());
            }
        }
    }
    Ok(srclib)
}

/// All source libraries of one registry directory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SrclibRegistry {
    dir: PathBuf,
    libs: BTreeMap<String, Srclib>,
}

impl SrclibRegistry {
    /// Read every `*.txt` document in `dir`, creating the directory first
    /// when it does not exist yet.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            debug!("Created source library directory {}", dir.display());
        }

        let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("*.txt");
        let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();

        let mut libs = BTreeMap::new();
        for path in paths {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            libs.insert(name, parse_srclib(&path)?);
        }

        info!(
            "Loaded {} source librar{} from {}",
            libs.len(),
            if libs.len() == 1 { "y" } else { "ies" },
            dir.display()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            libs,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, name: &str) -> Option<&Srclib> {
        self.libs.get(name)
    }

    /// Look up a recipe reference of the form `Library@revision`, returning
    /// the library together with the requested revision.
    pub fn resolve<'a>(&self, reference: &'a str) -> Option<(&Srclib, &'a str)> {
        let (name, rev) = reference.split_once('@')?;
        self.get(name).map(|lib| (lib, rev))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.libs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }

    /// Source-library references in `package` that this registry cannot
    /// satisfy: `srclibs` entries of every recipe, plus the repository
    /// itself when its type is `srclib`.
    pub fn missing_references<'p>(&self, package: &'p Package) -> Vec<&'p str> {
        let mut missing: Vec<&str> = package
            .builds
            .iter()
            .flat_map(|build| build.srclibs.iter())
            .map(String::as_str)
            .filter(|reference| self.resolve(reference).is_none())
            .collect();
        if package.repo_type == "srclib" && self.get(&package.repo).is_none() {
            missing.push(&package.repo);
        }
        let mut seen = HashSet::new();
        missing.retain(|reference| seen.insert(*reference));
        missing
    }
}
