//! Loading a set of metadata documents as one unit.

use std::{collections::BTreeMap, path::Path};

use tracing::{debug, info};

use crate::{
    config::Config,
    description::description_html,
    format::select_format,
    package::Package,
    parser::parse_metadata,
    validator::check_metadata,
    Error, Result,
};

/// Packages keyed by id.
pub type PackageSet = BTreeMap<String, Package>;

/// Placeholder display text for `[[id]]` links checked at load time.
pub const LINK_PLACEHOLDER: &str = "Dummy name - don't know yet";

/// Key packages by id. Two documents describing the same id are an error.
pub fn index_packages(packages: Vec<Package>) -> Result<PackageSet> {
    let mut set = PackageSet::new();
    for package in packages {
        let id = package.id().to_string();
        if set.contains_key(&id) {
            return Err(Error::DuplicatePackage(id));
        }
        set.insert(id, package);
    }
    Ok(set)
}

/// Resolve a `[[id]]` link against a loaded set.
pub fn resolve_link(packages: &PackageSet, id: &str) -> Result<(String, String)> {
    if packages.contains_key(id) {
        Ok((format!("fdroid.app:{}", id), LINK_PLACEHOLDER.to_string()))
    } else {
        Err(Error::UnresolvedLink(id.to_string()))
    }
}

/// Render the description of `package` against `packages` so broken
/// `[[id]]` links surface.
pub fn check_links(packages: &PackageSet, package: &Package) -> Result<()> {
    let resolve = |id: &str| resolve_link(packages, id);
    description_html(&package.description, Some(&resolve)).map_err(|e| Error::CrossReference {
        app_id: package.id().to_string(),
        source: Box::new(e),
    })?;
    Ok(())
}

pub fn check_cross_references(packages: &PackageSet) -> Result<()> {
    for package in packages.values() {
        check_links(packages, package)?;
    }
    debug!("Cross-references resolved for {} package(s)", packages.len());
    Ok(())
}

/// Parse, index, validate and optionally cross-check the given documents.
///
/// Every path is checked against the accepted formats before anything is
/// read, and duplicate ids are reported before any validation runs.
pub fn load_packages<P: AsRef<Path>>(paths: &[P], config: &Config, xref: bool) -> Result<PackageSet> {
    for path in paths {
        select_format(path.as_ref(), &config.accepted_formats)?;
    }

    let packages = paths
        .iter()
        .map(|path| parse_metadata(path.as_ref(), &config.accepted_formats))
        .collect::<Result<Vec<_>>>()?;
    let packages = index_packages(packages)?;

    for package in packages.values() {
        check_metadata(package)?;
    }

    if xref {
        check_cross_references(&packages)?;
    }

    info!("Loaded {} package(s)", packages.len());
    Ok(packages)
}
