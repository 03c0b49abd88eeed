//! Command implementations.
//!
//! Each command is thin glue over the engine: collect a file set with the
//! [`Walker`], map every path onto its destination, and push the pairs
//! through a [`CopierPool`].

use crate::project::{Project, ProjectConfig, TemplateStore, validate_name};
use crate::{CliError, CliResult};
use bro_engine::{CopierPool, CopyReport, FileSet, Options, Walker, is_within, rebase};
use indicatif::ProgressBar;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Everything a command needs from the command line and the environment.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub options: Options,
    pub quiet: bool,
    /// Canonical current directory
    pub cwd: PathBuf,
    /// Template store override
    pub home: Option<PathBuf>,
}

impl Context {
    fn store(&self) -> CliResult<TemplateStore> {
        TemplateStore::locate(self.home.as_deref())
    }

    fn walker(&self) -> Walker {
        Walker::with_options(self.options.clone())
    }

    fn collect(&self, root: &Path) -> CliResult<FileSet> {
        let (files, _) = self
            .walker()
            .collect(root)
            .map_err(|source| CliError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
        Ok(files)
    }

    /// Copy every pair through one pool run, showing progress unless quiet.
    fn copy_all(&self, pairs: Vec<(PathBuf, PathBuf)>, message: &str) -> CliResult<CopyReport> {
        let pb: Option<ProgressBar> = (!self.quiet && !pairs.is_empty()).then(|| {
            let pb = bro_engine::create_progress_bar(pairs.len() as u64);
            pb.set_message(message.to_string());
            pb
        });

        let pool = CopierPool::with_options(&self.options)
            .start()
            .map_err(|source| CliError::Copy { source })?;
        for (src, dst) in pairs {
            pool.copy(src, dst)
                .map_err(|source| CliError::Copy { source })?;
            if let Some(pb) = &pb {
                pb.set_position(pool.progress().0);
            }
        }
        let report = pool.wait().map_err(|source| CliError::Copy { source })?;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        Ok(report)
    }
}

/// Fail if any copy of the run was abandoned.
fn ensure_copied(report: &CopyReport, dest: &Path) -> CliResult<()> {
    if report.is_success() {
        return Ok(());
    }
    Err(CliError::PartialCopy {
        failed: report.failures.len(),
        total: report.total(),
        dest: dest.to_path_buf(),
    })
}

/// Map each collected path from `from` onto `to`.
fn mirror_pairs(files: Vec<PathBuf>, from: &Path, to: &Path) -> Vec<(PathBuf, PathBuf)> {
    files
        .into_iter()
        .filter_map(|src| rebase(&src, from, to).map(|dst| (src, dst)))
        .collect()
}

pub(crate) fn init(ctx: &Context) -> CliResult<()> {
    let project = Project::init(&ctx.cwd)?;
    println!(
        "Initialized bro project in {}",
        project.bro_dir().display()
    );
    Ok(())
}

pub(crate) fn create(ctx: &Context, name: &str) -> CliResult<()> {
    let template = ctx.store()?.create(name)?;
    tracing::debug!(template = %template.display(), "template created");
    println!("Successfully created template {:?}.", name.trim());
    track(ctx, name)
}

pub(crate) fn track(ctx: &Context, name: &str) -> CliResult<()> {
    let name = validate_name(name)?;
    ctx.store()?.existing(name)?;

    // Always the current directory, even inside an enclosing project
    let project = Project::init(&ctx.cwd)?;
    project.save_config(&ProjectConfig::tracking(name))?;
    println!("Tracking against {name:?}.");
    Ok(())
}

pub(crate) fn add(ctx: &Context, paths: &[PathBuf]) -> CliResult<()> {
    let project = Project::discover(&ctx.cwd)?;
    let root = project.root();
    let bro_dir = project.bro_dir();
    let stage = project.stage_dir();

    let files = FileSet::new();
    let walker = ctx.walker();
    for path in paths {
        let path = match fs::canonicalize(ctx.cwd.join(path)) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CliError::PathNotFound { path: path.clone() });
            }
            Err(source) => {
                return Err(CliError::Io {
                    action: "resolve",
                    path: path.clone(),
                    source,
                });
            }
        };
        if !is_within(&path, root) {
            return Err(CliError::OutsideProject {
                path,
                root: root.to_path_buf(),
            });
        }

        if path.is_dir() {
            walker
                .walk_and_collect(&path, &files)
                .map_err(|source| CliError::Walk {
                    path: path.clone(),
                    source,
                })?;
        } else {
            files.insert(path);
        }
    }

    let staged: Vec<PathBuf> = files
        .into_sorted_vec()
        .into_iter()
        .filter(|p| !is_within(p, &bro_dir))
        .collect();
    let report = ctx.copy_all(mirror_pairs(staged, root, &stage), "Staging")?;
    ensure_copied(&report, &stage)?;

    println!("Staged {} files.", report.files_copied);
    Ok(())
}

pub(crate) fn reset(ctx: &Context) -> CliResult<()> {
    let project = Project::discover(&ctx.cwd)?;
    let stage = project.stage_dir();
    match fs::remove_dir_all(&stage) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(CliError::Io {
                action: "remove",
                path: stage,
                source,
            });
        }
    }
    println!("Staged files removed.");
    Ok(())
}

pub(crate) fn commit(ctx: &Context) -> CliResult<()> {
    let project = Project::discover(&ctx.cwd)?;
    let config = project.load_config()?;
    let name = config.tracked().ok_or(CliError::NotTracked)?;
    let template = ctx.store()?.existing(name)?;

    let stage = project.stage_dir();
    if !stage.is_dir() {
        println!("Nothing to commit.");
        return Ok(());
    }

    let files = ctx.collect(&stage)?;
    if files.is_empty() {
        println!("Nothing to commit.");
        return Ok(());
    }

    let pairs = mirror_pairs(files.into_sorted_vec(), &stage, &template);
    let report = ctx.copy_all(pairs, "Committing")?;
    // The stage is only dropped once every file has landed in the template
    ensure_copied(&report, &template)?;

    fs::remove_dir_all(&stage).map_err(|source| CliError::Io {
        action: "remove",
        path: stage.clone(),
        source,
    })?;

    println!("Committed {} files to {name:?}.", report.files_copied);
    Ok(())
}

pub(crate) fn status(ctx: &Context) -> CliResult<()> {
    let project = Project::discover(&ctx.cwd)?;
    let config = project.load_config()?;

    match config.tracked() {
        Some(name) => println!("Tracked against {name:?}:"),
        None => println!("Currently untracked:"),
    }
    println!("  (use \"bro track <template>\" to track against another template)");
    println!();

    let stage = project.stage_dir();
    if !stage.is_dir() {
        println!("No files to be committed.");
        return Ok(());
    }

    let files = ctx.collect(&stage)?;
    if files.is_empty() {
        println!("No files to be committed.");
        return Ok(());
    }

    println!("Files to commit to template:");
    println!("  (use \"bro reset\" to remove all files from staging)");
    println!();
    for staged in files.into_sorted_vec() {
        if let Some(worktree_path) = rebase(&staged, &stage, project.root()) {
            println!("        {}", display_relative(&worktree_path, &ctx.cwd).display());
        }
    }
    Ok(())
}

pub(crate) fn clone(ctx: &Context, name: &str, dir: Option<&Path>) -> CliResult<()> {
    let name = validate_name(name)?;
    let template = ctx.store()?.existing(name)?;
    let template = canonicalize(&template)?;
    let dest = ctx.cwd.join(dir.unwrap_or_else(|| Path::new(name)));

    let existed = dest.exists();
    fs::create_dir_all(&dest).map_err(|source| CliError::Io {
        action: "create",
        path: dest.clone(),
        source,
    })?;
    let dest = canonicalize(&dest)?;

    // Copying a template into itself would truncate every file it holds
    if is_within(&dest, &template) || is_within(&template, &dest) {
        if !existed {
            let _ = fs::remove_dir(&dest);
        }
        return Err(CliError::CloneIntoTemplate {
            name: name.to_string(),
            dest,
        });
    }

    let files = ctx.collect(&template)?;
    let pairs = mirror_pairs(files.into_sorted_vec(), &template, &dest);
    let report = ctx.copy_all(pairs, "Cloning")?;
    ensure_copied(&report, &dest)?;

    println!("Successfully cloned {name:?} into {}.", dest.display());
    Ok(())
}

fn canonicalize(path: &Path) -> CliResult<PathBuf> {
    fs::canonicalize(path).map_err(|source| CliError::Io {
        action: "resolve",
        path: path.to_path_buf(),
        source,
    })
}

/// `path` relative to `base`, prefixed with `./` when it does not already
/// start with a dot.
fn display_relative(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }

    if rel.as_os_str().to_string_lossy().starts_with('.') {
        rel
    } else {
        Path::new(".").join(rel)
    }
}
