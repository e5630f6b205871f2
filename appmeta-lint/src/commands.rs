use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use appmeta::{
    description::render,
    format::{get_extension, select_format},
    loader::check_links,
    parser::parse_metadata,
    validator::check_metadata,
    writer::write_to_string,
    Config, Error, Format, Package, Result, SrclibRegistry,
};
use clap::ValueEnum;
use colored::Colorize;
use tracing::{debug, info, warn};

use crate::highlight::highlight_error_line;

static CHECK_MARK: LazyLock<colored::ColoredString> = LazyLock::new(|| "✔".bright_green().bold());
static CROSS_MARK: LazyLock<colored::ColoredString> = LazyLock::new(|| "〤".bright_red().bold());
static WARN: LazyLock<colored::ColoredString> = LazyLock::new(|| "⚠️".bright_yellow().bold());

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub success: usize,
    pub fail: usize,
}

impl Summary {
    pub fn print(&self, action: &str, total: usize) {
        println!();
        println!(
            "[{}] {} files {} successfully",
            "+".bright_blue().bold(),
            self.success,
            action
        );
        println!(
            "[{}] {} files failed",
            "+".bright_blue().bold(),
            self.fail
        );
        println!(
            "[{}] Evaluated {}/{} file(s)",
            "+".bright_blue().bold(),
            self.success + self.fail,
            total
        );
    }
}

/// Where rewritten documents go.
#[derive(Debug, Clone)]
pub enum Target {
    Stdout,
    InPlace,
    Dir(PathBuf),
}

/// Rendering of a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    Plain,
    Html,
    Wiki,
}

fn report_failure(path: &Path, err: &Error) {
    match err.location() {
        Some(location) => {
            eprintln!("[{}] {}", &*CROSS_MARK, err);
            if let (Some(line), Ok(source)) = (location.line, fs::read_to_string(path)) {
                for line in highlight_error_line(&source, line) {
                    eprintln!("{}", line);
                }
            }
        }
        None => eprintln!("[{}] {}: {}", &*CROSS_MARK, path.display(), err),
    }
}

fn check_accepted(files: &[PathBuf], config: &Config) -> Result<()> {
    for file in files {
        select_format(file, &config.accepted_formats)?;
    }
    Ok(())
}

/// Parse and validate every file, then check duplicate ids, description
/// links and, given a registry, source-library references across the set.
///
/// Only an unaccepted format is returned as an error; everything else is
/// reported and counted.
pub fn lint_files(
    files: &[PathBuf],
    config: &Config,
    xref: bool,
    srclibs: Option<&SrclibRegistry>,
) -> Result<Summary> {
    check_accepted(files, config)?;

    let mut summary = Summary::default();
    let mut packages: BTreeMap<String, Package> = BTreeMap::new();
    let mut paths: BTreeMap<String, &Path> = BTreeMap::new();

    for file in files {
        let package = match parse_metadata(file, &config.accepted_formats)
            .and_then(|package| check_metadata(&package).map(|_| package))
        {
            Ok(package) => package,
            Err(err) => {
                report_failure(file, &err);
                summary.fail += 1;
                continue;
            }
        };

        let id = package.id().to_string();
        if packages.contains_key(&id) {
            report_failure(file, &Error::DuplicatePackage(id));
            summary.fail += 1;
            continue;
        }
        paths.insert(id.clone(), file);
        packages.insert(id, package);
    }

    for (id, package) in &packages {
        let path = paths.get(id).copied().unwrap_or_else(|| Path::new(id));
        if xref {
            if let Err(err) = check_links(&packages, package) {
                report_failure(path, &err);
                summary.fail += 1;
                continue;
            }
        }
        if let Some(registry) = srclibs {
            for reference in registry.missing_references(package) {
                eprintln!(
                    "[{}] {}: unknown source library {}",
                    &*WARN,
                    path.display(),
                    reference
                );
            }
        }
        println!("[{}] {}", &*CHECK_MARK, path.display());
        summary.success += 1;
    }

    info!("Linted {} file(s)", files.len());
    Ok(summary)
}

fn rewrite_one(file: &Path, config: &Config, to: Option<Format>, target: &Target) -> Result<()> {
    let source_format = select_format(file, &config.accepted_formats)?;
    let format = to.unwrap_or(source_format);
    let package = parse_metadata(file, &config.accepted_formats)?;
    let document = write_to_string(format, &package)?;

    let file_name = format!("{}.{}", package.id(), format);
    match target {
        Target::Stdout => print!("{}", document),
        Target::InPlace => {
            let dest = file.with_file_name(&file_name);
            fs::write(&dest, document)?;
            if dest != file {
                fs::remove_file(file)?;
                debug!("Replaced {} with {}", file.display(), dest.display());
            }
        }
        Target::Dir(dir) => {
            fs::create_dir_all(dir)?;
            fs::write(dir.join(&file_name), document)?;
        }
    }
    Ok(())
}

/// Re-serialise every file, optionally converting it to `to`.
pub fn rewrite_files(
    files: &[PathBuf],
    config: &Config,
    to: Option<Format>,
    target: &Target,
) -> Result<Summary> {
    check_accepted(files, config)?;

    let mut summary = Summary::default();
    for file in files {
        match rewrite_one(file, config, to, target) {
            Ok(()) => {
                if !matches!(target, Target::Stdout) {
                    println!("[{}] {}", &*CHECK_MARK, file.display());
                }
                summary.success += 1;
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                report_failure(file, &err);
                summary.fail += 1;
            }
        }
    }
    Ok(summary)
}

/// Render the description of one document.
pub fn describe(file: &Path, config: &Config, style: Style) -> Result<String> {
    let package = parse_metadata(file, &config.accepted_formats)?;
    let rendered = render(&package.description, None)?;
    let (stem, _) = get_extension(file);
    if stem != package.id() {
        warn!("{} does not match package id {}", stem, package.id());
    }
    Ok(match style {
        Style::Plain => rendered.plain,
        Style::Html => rendered.html,
        Style::Wiki => rendered.wiki,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_lint_counts_failures_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "org.example.good.txt", "License:MIT\nRepo Type:git\n"),
            write(dir.path(), "org.example.bad.txt", "Repo Type:cvs\n"),
            write(dir.path(), "org.example.broken.txt", "Summary:\nno colon here\n"),
            write(dir.path(), "org.example.good.yaml", "License: MIT\n"),
        ];

        let summary = lint_files(&files, &Config::default(), true, None).unwrap();
        assert_eq!(summary, Summary { success: 1, fail: 3 });
    }

    #[test]
    fn test_lint_unresolved_link() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "org.example.a.txt", "Description:\nSee [[org.example.b]].\n.\n"),
            write(dir.path(), "org.example.c.txt", "Description:\nSee [[org.example.a]].\n.\n"),
        ];

        let summary = lint_files(&files, &Config::default(), true, None).unwrap();
        assert_eq!(summary, Summary { success: 1, fail: 1 });

        let summary = lint_files(&files, &Config::default(), false, None).unwrap();
        assert_eq!(summary, Summary { success: 2, fail: 0 });
    }

    #[test]
    fn test_lint_unaccepted_format_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write(dir.path(), "org.example.a.toml", "")];
        let err = lint_files(&files, &Config::default(), false, None).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_rewrite_in_place_converts() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            "org.example.a.json",
            r#"{"License": "MIT", "Summary": "An app"}"#,
        );

        let summary =
            rewrite_files(&[file.clone()], &Config::default(), Some(Format::Yaml), &Target::InPlace)
                .unwrap();
        assert_eq!(summary.success, 1);
        assert!(!file.exists());

        let written = fs::read_to_string(dir.path().join("org.example.a.yaml")).unwrap();
        assert!(written.contains("License: MIT\n"));
        assert!(written.contains("Summary: An app\n"));
    }

    #[test]
    fn test_rewrite_to_unwritable_format_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "org.example.a.txt", "License:MIT\n");
        let out = dir.path().join("out");

        let err = rewrite_files(&[file], &Config::default(), Some(Format::Xml), &Target::Dir(out))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_rewrite_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "org.example.a.txt", "License:MIT\nSummary:An app\n");
        let out = dir.path().join("out");

        rewrite_files(&[file.clone()], &Config::default(), None, &Target::Dir(out.clone())).unwrap();
        assert!(file.exists());
        let written = fs::read_to_string(out.join("org.example.a.txt")).unwrap();
        assert!(written.contains("License:MIT\n"));
    }

    #[test]
    fn test_describe_styles() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            "org.example.a.txt",
            "Description:\nAn '''app'''.\n\n* one\n.\n",
        );

        let html = describe(&file, &Config::default(), Style::Html).unwrap();
        assert!(html.starts_with("<p>An <b>app</b>.</p>"));
        assert!(html.contains("<li>one</li>"));
        let wiki = describe(&file, &Config::default(), Style::Wiki).unwrap();
        assert!(wiki.starts_with("An '''app'''."));
    }
}
