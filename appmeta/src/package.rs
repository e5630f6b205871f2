//! The package entity: one application's metadata.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{
    comments::Comments,
    format::get_extension,
    normalize,
    recipe::{Build, Slot, SlotMut},
    taxonomy::{Field, FieldType},
    value::{Toggle, Value},
    Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    id: String,
    metadata_path: Option<PathBuf>,

    pub disabled: String,
    pub anti_features: Vec<String>,
    pub provides: String,
    pub categories: Vec<String>,
    pub license: String,
    pub web_site: String,
    pub source_code: String,
    pub issue_tracker: String,
    pub changelog: String,
    pub donate: String,
    pub flattr_id: String,
    pub bitcoin: String,
    pub litecoin: String,
    pub name: String,
    pub auto_name: String,
    pub summary: String,
    pub description: Vec<String>,
    pub requires_root: Toggle,
    pub repo_type: String,
    pub repo: String,
    pub binaries: String,
    pub maintainer_notes: Vec<String>,
    pub archive_policy: String,
    pub auto_update_mode: String,
    pub update_check_mode: String,
    pub update_check_ignore: String,
    pub vercode_operation: String,
    pub update_check_name: String,
    pub update_check_data: String,
    pub current_version: String,
    pub current_version_code: String,
    pub no_source_since: String,

    pub builds: Vec<Build>,
    pub comments: Comments,
}

impl Package {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata_path: None,
            disabled: String::new(),
            anti_features: Vec::new(),
            provides: String::new(),
            categories: vec!["None".to_string()],
            license: "Unknown".to_string(),
            web_site: String::new(),
            source_code: String::new(),
            issue_tracker: String::new(),
            changelog: String::new(),
            donate: String::new(),
            flattr_id: String::new(),
            bitcoin: String::new(),
            litecoin: String::new(),
            name: String::new(),
            auto_name: String::new(),
            summary: String::new(),
            description: Vec::new(),
            requires_root: Toggle::Unset,
            repo_type: String::new(),
            repo: String::new(),
            binaries: String::new(),
            maintainer_notes: Vec::new(),
            archive_policy: String::new(),
            auto_update_mode: "None".to_string(),
            update_check_mode: "None".to_string(),
            update_check_ignore: String::new(),
            vercode_operation: String::new(),
            update_check_name: String::new(),
            update_check_data: String::new(),
            current_version: String::new(),
            current_version_code: "0".to_string(),
            no_source_since: String::new(),
            builds: Vec::new(),
            comments: Comments::new(),
        }
    }

    /// Blank package whose id is the file name of `path` without its
    /// extension.
    pub fn from_path(path: &Path) -> Self {
        let (id, _) = get_extension(path);
        let mut package = Package::new(id);
        package.metadata_path = Some(path.to_path_buf());
        package
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata_path(&self) -> Option<&Path> {
        self.metadata_path.as_deref()
    }

    fn slot(&self, field: Field) -> Slot<'_> {
        match field {
            Field::Disabled => Slot::Text(&self.disabled),
            Field::AntiFeatures => Slot::List(&self.anti_features),
            Field::Provides => Slot::Text(&self.provides),
            Field::Categories => Slot::List(&self.categories),
            Field::License => Slot::Text(&self.license),
            Field::WebSite => Slot::Text(&self.web_site),
            Field::SourceCode => Slot::Text(&self.source_code),
            Field::IssueTracker => Slot::Text(&self.issue_tracker),
            Field::Changelog => Slot::Text(&self.changelog),
            Field::Donate => Slot::Text(&self.donate),
            Field::FlattrId => Slot::Text(&self.flattr_id),
            Field::Bitcoin => Slot::Text(&self.bitcoin),
            Field::Litecoin => Slot::Text(&self.litecoin),
            Field::Name => Slot::Text(&self.name),
            Field::AutoName => Slot::Text(&self.auto_name),
            Field::Summary => Slot::Text(&self.summary),
            Field::Description => Slot::List(&self.description),
            Field::RequiresRoot => Slot::Toggle(&self.requires_root),
            Field::RepoType => Slot::Text(&self.repo_type),
            Field::Repo => Slot::Text(&self.repo),
            Field::Binaries => Slot::Text(&self.binaries),
            Field::MaintainerNotes => Slot::List(&self.maintainer_notes),
            Field::ArchivePolicy => Slot::Text(&self.archive_policy),
            Field::AutoUpdateMode => Slot::Text(&self.auto_update_mode),
            Field::UpdateCheckMode => Slot::Text(&self.update_check_mode),
            Field::UpdateCheckIgnore => Slot::Text(&self.update_check_ignore),
            Field::VercodeOperation => Slot::Text(&self.vercode_operation),
            Field::UpdateCheckName => Slot::Text(&self.update_check_name),
            Field::UpdateCheckData => Slot::Text(&self.update_check_data),
            Field::CurrentVersion => Slot::Text(&self.current_version),
            Field::CurrentVersionCode => Slot::Text(&self.current_version_code),
            Field::NoSourceSince => Slot::Text(&self.no_source_since),
        }
    }

    fn slot_mut(&mut self, field: Field) -> SlotMut<'_> {
        match field {
            Field::Disabled => SlotMut::Text(&mut self.disabled),
            Field::AntiFeatures => SlotMut::List(&mut self.anti_features),
            Field::Provides => SlotMut::Text(&mut self.provides),
            Field::Categories => SlotMut::List(&mut self.categories),
            Field::License => SlotMut::Text(&mut self.license),
            Field::WebSite => SlotMut::Text(&mut self.web_site),
            Field::SourceCode => SlotMut::Text(&mut self.source_code),
            Field::IssueTracker => SlotMut::Text(&mut self.issue_tracker),
            Field::Changelog => SlotMut::Text(&mut self.changelog),
            Field::Donate => SlotMut::Text(&mut self.donate),
            Field::FlattrId => SlotMut::Text(&mut self.flattr_id),
            Field::Bitcoin => SlotMut::Text(&mut self.bitcoin),
            Field::Litecoin => SlotMut::Text(&mut self.litecoin),
            Field::Name => SlotMut::Text(&mut self.name),
            Field::AutoName => SlotMut::Text(&mut self.auto_name),
            Field::Summary => SlotMut::Text(&mut self.summary),
            Field::Description => SlotMut::List(&mut self.description),
            Field::RequiresRoot => SlotMut::Toggle(&mut self.requires_root),
            Field::RepoType => SlotMut::Text(&mut self.repo_type),
            Field::Repo => SlotMut::Text(&mut self.repo),
            Field::Binaries => SlotMut::Text(&mut self.binaries),
            Field::MaintainerNotes => SlotMut::List(&mut self.maintainer_notes),
            Field::ArchivePolicy => SlotMut::Text(&mut self.archive_policy),
            Field::AutoUpdateMode => SlotMut::Text(&mut self.auto_update_mode),
            Field::UpdateCheckMode => SlotMut::Text(&mut self.update_check_mode),
            Field::UpdateCheckIgnore => SlotMut::Text(&mut self.update_check_ignore),
            Field::VercodeOperation => SlotMut::Text(&mut self.vercode_operation),
            Field::UpdateCheckName => SlotMut::Text(&mut self.update_check_name),
            Field::UpdateCheckData => SlotMut::Text(&mut self.update_check_data),
            Field::CurrentVersion => SlotMut::Text(&mut self.current_version),
            Field::CurrentVersionCode => SlotMut::Text(&mut self.current_version_code),
            Field::NoSourceSince => SlotMut::Text(&mut self.no_source_since),
        }
    }

    pub fn get_field(&self, field: Field) -> Value {
        self.slot(field).to_value()
    }

    /// Set a field, coercing the value to the field's type.
    pub fn set_field(&mut self, field: Field, value: Value) -> Result<()> {
        let name = field.name();
        let multiline = field.field_type() == FieldType::Multiline;
        match self.slot_mut(field) {
            SlotMut::Text(slot) => *slot = normalize::text_value(name, value)?,
            SlotMut::List(slot) if multiline => *slot = normalize::lines_value(name, value)?,
            SlotMut::List(slot) => *slot = normalize::list_value(name, value)?,
            SlotMut::Toggle(slot) => *slot = normalize::toggle_value(name, value)?,
        }
        Ok(())
    }

    /// Append one element to a list or multi-line field.
    pub fn append_field(&mut self, field: Field, item: impl Into<String>) -> Result<()> {
        match self.slot_mut(field) {
            SlotMut::List(slot) => {
                slot.push(item.into());
                Ok(())
            }
            _ => Err(crate::Error::invalid_value(
                field.name(),
                "cannot append to a single-valued field",
            )),
        }
    }

    /// Value of a field by its human-readable name, e.g. `Auto Name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        Ok(self.get_field(Field::lookup(name)?))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.set_field(Field::lookup(name)?, value)
    }

    /// Every field under its human-readable name, in taxonomy order.
    pub fn field_dict(&self) -> IndexMap<&'static str, Value> {
        Field::ALL
            .into_iter()
            .map(|field| (field.name(), self.get_field(field)))
            .collect()
    }
}
