//! Build recipes: one buildable version of a package.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    normalize,
    taxonomy::Flag,
    value::{Toggle, Value},
    Result,
};

/// NDK label used when a recipe does not pin one.
pub const DEFAULT_NDK: &str = "r10e";

/// Build system a recipe is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Maven,
    Gradle,
    Kivy,
    Raw,
    Ant,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Maven => "maven",
            Method::Gradle => "gradle",
            Method::Kivy => "kivy",
            Method::Raw => "raw",
            Method::Ant => "ant",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) enum Slot<'a> {
    Text(&'a String),
    List(&'a Vec<String>),
    Toggle(&'a Toggle),
}

pub(crate) enum SlotMut<'a> {
    Text(&'a mut String),
    List(&'a mut Vec<String>),
    Toggle(&'a mut Toggle),
}

impl Slot<'_> {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Slot::Text(s) => Value::Text((*s).clone()),
            Slot::List(items) => Value::List((*items).clone()),
            Slot::Toggle(t) => Value::Toggle((*t).clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Build {
    pub version: String,
    pub vercode: String,
    /// Reason the recipe is disabled; empty when it is buildable.
    pub disable: String,
    pub commit: String,
    pub subdir: String,
    pub submodules: Toggle,
    pub init: String,
    pub patch: Vec<String>,
    pub gradle: Vec<String>,
    pub maven: String,
    pub kivy: String,
    pub output: String,
    pub srclibs: Vec<String>,
    pub oldsdkloc: Toggle,
    pub encoding: String,
    pub forceversion: Toggle,
    pub forcevercode: Toggle,
    pub rm: Vec<String>,
    pub extlibs: Vec<String>,
    pub prebuild: String,
    pub update: Vec<String>,
    pub target: String,
    pub scanignore: Vec<String>,
    pub scandelete: Vec<String>,
    pub build: String,
    pub buildjni: Vec<String>,
    pub ndk: String,
    pub preassemble: Vec<String>,
    pub gradleprops: Vec<String>,
    pub antcommands: Vec<String>,
    pub novcheck: Toggle,
}

impl Build {
    pub fn new(version: impl Into<String>, vercode: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            vercode: vercode.into(),
            ..Default::default()
        }
    }

    pub(crate) fn slot(&self, flag: Flag) -> Slot<'_> {
        match flag {
            Flag::Version => Slot::Text(&self.version),
            Flag::Vercode => Slot::Text(&self.vercode),
            Flag::Disable => Slot::Text(&self.disable),
            Flag::Commit => Slot::Text(&self.commit),
            Flag::Subdir => Slot::Text(&self.subdir),
            Flag::Submodules => Slot::Toggle(&self.submodules),
            Flag::Init => Slot::Text(&self.init),
            Flag::Patch => Slot::List(&self.patch),
            Flag::Gradle => Slot::List(&self.gradle),
            Flag::Maven => Slot::Text(&self.maven),
            Flag::Kivy => Slot::Text(&self.kivy),
            Flag::Output => Slot::Text(&self.output),
            Flag::Srclibs => Slot::List(&self.srclibs),
            Flag::Oldsdkloc => Slot::Toggle(&self.oldsdkloc),
            Flag::Encoding => Slot::Text(&self.encoding),
            Flag::Forceversion => Slot::Toggle(&self.forceversion),
            Flag::Forcevercode => Slot::Toggle(&self.forcevercode),
            Flag::Rm => Slot::List(&self.rm),
            Flag::Extlibs => Slot::List(&self.extlibs),
            Flag::Prebuild => Slot::Text(&self.prebuild),
            Flag::Update => Slot::List(&self.update),
            Flag::Target => Slot::Text(&self.target),
            Flag::Scanignore => Slot::List(&self.scanignore),
            Flag::Scandelete => Slot::List(&self.scandelete),
            Flag::Build => Slot::Text(&self.build),
            Flag::Buildjni => Slot::List(&self.buildjni),
            Flag::Ndk => Slot::Text(&self.ndk),
            Flag::Preassemble => Slot::List(&self.preassemble),
            Flag::Gradleprops => Slot::List(&self.gradleprops),
            Flag::Antcommands => Slot::List(&self.antcommands),
            Flag::Novcheck => Slot::Toggle(&self.novcheck),
        }
    }

    pub(crate) fn slot_mut(&mut self, flag: Flag) -> SlotMut<'_> {
        match flag {
            Flag::Version => SlotMut::Text(&mut self.version),
            Flag::Vercode => SlotMut::Text(&mut self.vercode),
            Flag::Disable => SlotMut::Text(&mut self.disable),
            Flag::Commit => SlotMut::Text(&mut self.commit),
            Flag::Subdir => SlotMut::Text(&mut self.subdir),
            Flag::Submodules => SlotMut::Toggle(&mut self.submodules),
            Flag::Init => SlotMut::Text(&mut self.init),
            Flag::Patch => SlotMut::List(&mut self.patch),
            Flag::Gradle => SlotMut::List(&mut self.gradle),
            Flag::Maven => SlotMut::Text(&mut self.maven),
            Flag::Kivy => SlotMut::Text(&mut self.kivy),
            Flag::Output => SlotMut::Text(&mut self.output),
            Flag::Srclibs => SlotMut::List(&mut self.srclibs),
            Flag::Oldsdkloc => SlotMut::Toggle(&mut self.oldsdkloc),
            Flag::Encoding => SlotMut::Text(&mut self.encoding),
            Flag::Forceversion => SlotMut::Toggle(&mut self.forceversion),
            Flag::Forcevercode => SlotMut::Toggle(&mut self.forcevercode),
            Flag::Rm => SlotMut::List(&mut self.rm),
            Flag::Extlibs => SlotMut::List(&mut self.extlibs),
            Flag::Prebuild => SlotMut::Text(&mut self.prebuild),
            Flag::Update => SlotMut::List(&mut self.update),
            Flag::Target => SlotMut::Text(&mut self.target),
            Flag::Scanignore => SlotMut::List(&mut self.scanignore),
            Flag::Scandelete => SlotMut::List(&mut self.scandelete),
            Flag::Build => SlotMut::Text(&mut self.build),
            Flag::Buildjni => SlotMut::List(&mut self.buildjni),
            Flag::Ndk => SlotMut::Text(&mut self.ndk),
            Flag::Preassemble => SlotMut::List(&mut self.preassemble),
            Flag::Gradleprops => SlotMut::List(&mut self.gradleprops),
            Flag::Antcommands => SlotMut::List(&mut self.antcommands),
            Flag::Novcheck => SlotMut::Toggle(&mut self.novcheck),
        }
    }

    pub fn get_flag(&self, flag: Flag) -> Value {
        self.slot(flag).to_value()
    }

    /// Set a flag, coercing the value to the flag's type.
    pub fn set_flag(&mut self, flag: Flag, value: Value) -> Result<()> {
        let name = flag.name();
        match self.slot_mut(flag) {
            SlotMut::Text(slot) => *slot = normalize::text_value(name, value)?,
            SlotMut::List(slot) => *slot = normalize::list_value(name, value)?,
            SlotMut::Toggle(slot) => *slot = normalize::toggle_value(name, value)?,
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        Ok(self.get_flag(Flag::lookup(name)?))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.set_flag(Flag::lookup_with_aliases(name)?, value)
    }

    pub fn is_disabled(&self) -> bool {
        !self.disable.is_empty()
    }

    /// First of maven, gradle, kivy that is set; otherwise `raw` when an
    /// output override exists, else `ant`.
    pub fn method(&self) -> Method {
        if !self.maven.is_empty() {
            Method::Maven
        } else if !self.gradle.is_empty() {
            Method::Gradle
        } else if !self.kivy.is_empty() {
            Method::Kivy
        } else if !self.output.is_empty() {
            Method::Raw
        } else {
            Method::Ant
        }
    }

    /// Path of the NDK this recipe needs, from a label -> path table.
    pub fn ndk_path<'a>(&self, ndk_paths: &'a BTreeMap<String, PathBuf>) -> Option<&'a Path> {
        let label = if self.ndk.is_empty() {
            DEFAULT_NDK
        } else {
            self.ndk.as_str()
        };
        ndk_paths.get(label).map(PathBuf::as_path)
    }
}

/// Sort key for version codes. Codes that are not numbers sort last and are
/// left for validation to report.
fn vercode_key(build: &Build) -> (u8, u64) {
    match build.vercode.parse::<u64>() {
        Ok(code) => (0, code),
        Err(_) => (1, 0),
    }
}

pub fn sort_builds(builds: &mut [Build]) {
    builds.sort_by_key(vercode_key);
}

pub fn sorted_builds(builds: &[Build]) -> Vec<&Build> {
    let mut sorted: Vec<&Build> = builds.iter().collect();
    sorted.sort_by_key(|b| vercode_key(b));
    sorted
}
