//! Metadata-driven rename engine.
//!
//! A run has two phases:
//! - `plan` walks the root, reads each PDF's title and decides a destination.
//!   It never touches the filesystem beyond reads, so a dry run is `plan` alone.
//! - `apply` re-validates every planned move and performs it, then writes the
//!   audit log if anything was renamed.
//!
//! Planning keeps track of names it has already handed out and of files it
//! has already scheduled to move away, so the preview matches what a live run
//! would do.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::RenameConfig;
use crate::fs_ops::{
    FileEntry, MAX_BASE_LEN, OnDuplicate, PdfWalker, entry_exists, is_numbered_variant, is_symlink,
    is_within_root, resolve_destination, sanitize_title, try_atomic_move,
};
use crate::pdf::MetadataReader;
use crate::report::{Outcome, RenameOperation, RunSummary, SkipReason, file_name_lossy, write_audit_log};
use crate::shutdown;

/// Decisions made by `Renamer::plan`.
#[derive(Debug, Clone, Serialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub dry_run: bool,
    /// Accepted renames in encounter order
    pub operations: Vec<RenameOperation>,
    pub summary: RunSummary,
    pub interrupted: bool,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Final state of a rename run.
#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub summary: RunSummary,
    /// Renames performed (live) or proposed (dry run)
    pub operations: Vec<RenameOperation>,
    pub log_file: Option<PathBuf>,
    /// Set when renames happened but the audit log could not be written
    pub log_error: Option<String>,
    pub interrupted: bool,
}

impl From<RenamePlan> for RenameReport {
    fn from(plan: RenamePlan) -> Self {
        Self {
            root: plan.root,
            dry_run: plan.dry_run,
            summary: plan.summary,
            operations: plan.operations,
            log_file: None,
            log_error: None,
            interrupted: plan.interrupted,
        }
    }
}

/// Names claimed and vacated so far in a planning pass.
#[derive(Default)]
struct Claims {
    claimed: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl Claims {
    /// `current` is the file being planned; its own path is always available to it.
    fn is_free(&self, candidate: &Path, current: &Path) -> bool {
        if candidate == current {
            return true;
        }
        if self.claimed.contains(candidate) {
            return false;
        }
        !entry_exists(candidate) || self.vacated.contains(candidate)
    }

    fn claim(&mut self, op: &RenameOperation) {
        self.claimed.insert(op.new.clone());
        self.vacated.insert(op.original.clone());
    }
}

pub struct Renamer<R> {
    config: RenameConfig,
    reader: R,
    started_at: DateTime<Local>,
}

impl<R: MetadataReader> Renamer<R> {
    /// `config` must already be normalized (canonical root).
    pub fn new(config: RenameConfig, reader: R) -> Self {
        Self {
            config,
            reader,
            started_at: Local::now(),
        }
    }

    pub fn config(&self) -> &RenameConfig {
        &self.config
    }

    /// Plan and, for live runs, apply.
    pub fn run(&self, mut on_file: impl FnMut(&Path, &Outcome)) -> RenameReport {
        let plan = self.plan(&mut on_file);
        self.apply(plan, on_file)
    }

    /// Walk the root and decide every rename without changing anything.
    pub fn plan(&self, mut on_file: impl FnMut(&Path, &Outcome)) -> RenamePlan {
        let root = self.config.root.as_path();
        let mut plan = RenamePlan {
            root: root.to_path_buf(),
            dry_run: self.config.dry_run,
            operations: Vec::new(),
            summary: RunSummary::default(),
            interrupted: false,
        };
        let mut claims = Claims::default();

        let mut walker = PdfWalker::new(root);
        loop {
            if shutdown::is_requested() {
                warn!("shutdown requested; stopping before the next file");
                plan.interrupted = true;
                break;
            }
            let Some(item) = walker.next() else { break };
            let entry = match item {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    let outcome = Outcome::Failed(format!("cannot read directory entry: {e}"));
                    plan.summary.record(&outcome);
                    on_file(&path, &outcome);
                    continue;
                }
            };

            plan.summary.files_seen += 1;
            let outcome = match self.plan_one(&entry, &claims) {
                Ok(op) => {
                    claims.claim(&op);
                    let outcome = Outcome::Planned { dest: op.new.clone() };
                    plan.operations.push(op);
                    outcome
                }
                Err(outcome) => outcome,
            };
            plan.summary.record(&outcome);
            on_file(&entry.path, &outcome);
        }

        debug!(
            root = %root.display(),
            files = plan.summary.files_seen,
            planned = plan.operations.len(),
            "rename plan complete"
        );
        plan
    }

    fn plan_one(&self, entry: &FileEntry, claims: &Claims) -> Result<RenameOperation, Outcome> {
        let root = self.config.root.as_path();
        if !is_within_root(root, &entry.path) {
            warn!(path = %entry.path.display(), "file resolves outside the root; skipping");
            return Err(Outcome::Skipped(SkipReason::OutsideRoot));
        }
        if entry.is_symlink {
            debug!(path = %entry.path.display(), "skipping symbolic link");
            return Err(Outcome::Skipped(SkipReason::Symlink));
        }

        let info = match self.reader.read_info(&entry.path) {
            Ok(Some(info)) => info,
            Ok(None) => return Err(Outcome::Skipped(SkipReason::NoMetadata)),
            Err(e) => {
                debug!(path = %entry.path.display(), error = %e, "metadata read failed");
                return Err(Outcome::Failed(e.to_string()));
            }
        };
        let title = match info.title().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Outcome::Skipped(SkipReason::NoTitle)),
        };
        let base = sanitize_title(title, MAX_BASE_LEN).map_err(Outcome::Skipped)?;

        let policy = self.config.on_duplicate;
        // a numbered copy of its own title stays put, even once the plain name frees up
        if policy == OnDuplicate::RenameWithSuffix
            && entry.name.to_str().is_some_and(|name| is_numbered_variant(name, &base))
        {
            return Err(Outcome::Skipped(SkipReason::AlreadyNamed));
        }
        let dest = resolve_destination(&entry.dir, &base, policy, |p| claims.is_free(p, &entry.path))
            .map_err(Outcome::Skipped)?;

        if dest == entry.path {
            return Err(Outcome::Skipped(SkipReason::AlreadyNamed));
        }
        if policy == OnDuplicate::Skip && !claims.is_free(&dest, &entry.path) {
            return Err(Outcome::Skipped(SkipReason::TargetExists(file_name_lossy(&dest))));
        }

        Ok(RenameOperation {
            original: entry.path.clone(),
            new: dest,
            title: title.to_string(),
        })
    }

    /// Carry out `plan`. Dry runs come back unchanged.
    pub fn apply(&self, plan: RenamePlan, mut on_file: impl FnMut(&Path, &Outcome)) -> RenameReport {
        if self.config.dry_run {
            return plan.into();
        }

        let mut summary = plan.summary;
        // planned files are re-counted by what actually happens to them
        summary.succeeded -= plan.operations.len() as u64;

        let mut report = RenameReport {
            root: plan.root,
            dry_run: false,
            summary,
            operations: Vec::with_capacity(plan.operations.len()),
            log_file: None,
            log_error: None,
            interrupted: plan.interrupted,
        };

        let mut pending = plan.operations.into_iter();
        while let Some(op) = pending.next() {
            if shutdown::is_requested() {
                let not_done = 1 + pending.len() as u64;
                warn!(not_done, "shutdown requested; remaining renames were not performed");
                report.summary.skipped += not_done;
                report.interrupted = true;
                break;
            }
            let outcome = self.apply_one(&op);
            report.summary.record(&outcome);
            on_file(&op.original, &outcome);
            if matches!(outcome, Outcome::Renamed { .. }) {
                report.operations.push(op);
            }
        }

        if !report.operations.is_empty() {
            match write_audit_log(&report.root, &self.started_at, &report.operations) {
                Ok(path) => report.log_file = Some(path),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "could not write audit log");
                    report.log_error = Some(format!("{e:#}"));
                }
            }
        }

        info!(
            root = %report.root.display(),
            renamed = report.summary.succeeded,
            skipped = report.summary.skipped,
            errors = report.summary.errored,
            "rename finished"
        );
        report
    }

    fn apply_one(&self, op: &RenameOperation) -> Outcome {
        if !is_within_root(&self.config.root, &op.new) {
            warn!(dest = %op.new.display(), "destination resolves outside the root; skipping");
            return Outcome::Skipped(SkipReason::DestinationOutsideRoot);
        }
        match fs::symlink_metadata(&op.original) {
            Ok(m) if m.file_type().is_file() => {}
            Ok(_) => return Outcome::Skipped(SkipReason::SourceChanged),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Outcome::Skipped(SkipReason::SourceChanged);
            }
            Err(e) => return Outcome::Failed(format!("cannot inspect {}: {e}", op.original.display())),
        }
        if entry_exists(&op.new) {
            return Outcome::Skipped(if is_symlink(&op.new) {
                SkipReason::DestinationSymlink
            } else {
                SkipReason::TargetExists(op.new_name())
            });
        }

        match try_atomic_move(&op.original, &op.new) {
            Ok(()) => {
                info!(src = %op.original.display(), dest = %op.new.display(), "renamed");
                Outcome::Renamed { dest: op.new.clone() }
            }
            Err(e) => {
                warn!(src = %op.original.display(), error = %format!("{e:#}"), "rename failed");
                Outcome::Failed(format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{DocumentInfo, MetadataError};
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Titles keyed by original file name; unknown names have no metadata.
    struct FakeReader(HashMap<String, String>);

    impl FakeReader {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        }
    }

    impl MetadataReader for FakeReader {
        fn read_info(&self, path: &Path) -> Result<Option<DocumentInfo>, MetadataError> {
            let name = file_name_lossy(path);
            if name == "broken.pdf" {
                return Err(MetadataError::Other { path: path.to_path_buf(), message: "bad xref".into() });
            }
            Ok(self.0.get(&name).map(DocumentInfo::with_title))
        }
    }

    fn setup(files: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let td = tempdir().unwrap();
        let root = dunce::canonicalize(td.path()).unwrap();
        for f in files {
            let p = root.join(f);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, f.as_bytes()).unwrap();
        }
        (td, root)
    }

    fn names(root: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| !n.starts_with("pdf_rename_log_"))
            .collect();
        v.sort();
        v
    }

    #[test]
    #[serial]
    fn dry_run_plans_without_touching_disk() {
        let (_td, root) = setup(&["a.pdf", "b.pdf", "c.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "Report 2024"), ("b.pdf", "Report 2024")]);
        let renamer = Renamer::new(RenameConfig::new(&root), reader);

        let report = renamer.run(|_, _| {});
        assert!(report.dry_run);
        assert_eq!(report.summary.files_seen, 3);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.operations[0].new, root.join("Report 2024.pdf"));
        assert_eq!(report.operations[1].new, root.join("Report 2024 (1).pdf"));
        assert!(report.log_file.is_none());
        assert_eq!(names(&root), ["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    #[serial]
    fn live_run_renames_and_logs() {
        let (_td, root) = setup(&["a.pdf", "b.pdf", "c.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "Report 2024"), ("b.pdf", "Report 2024")]);
        let renamer = Renamer::new(RenameConfig::new(&root).live(), reader);

        let mut outcomes = Vec::new();
        let report = renamer.run(|p, o| outcomes.push((file_name_lossy(p), o.clone())));

        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(names(&root), ["Report 2024 (1).pdf", "Report 2024.pdf", "c.pdf"]);
        let log = report.log_file.expect("audit log");
        assert!(log.starts_with(&root));
        assert!(
            outcomes
                .iter()
                .any(|(n, o)| n == "c.pdf" && *o == Outcome::Skipped(SkipReason::NoMetadata))
        );
    }

    #[test]
    #[serial]
    fn second_live_run_is_a_no_op() {
        let (_td, root) = setup(&["a.pdf", "b.pdf"]);
        let titles = [("a.pdf", "Same"), ("b.pdf", "Same")];
        Renamer::new(RenameConfig::new(&root).live(), FakeReader::new(&titles)).run(|_, _| {});
        let after_first = names(&root);

        // the files now carry their new names; metadata still says "Same"
        let reader = FakeReader::new(&[("Same.pdf", "Same"), ("Same (1).pdf", "Same")]);
        let report = Renamer::new(RenameConfig::new(&root).live(), reader).run(|_, _| {});

        assert_eq!(report.summary.succeeded, 0);
        assert_eq!(report.summary.skipped, 2);
        assert!(report.log_file.is_none());
        assert_eq!(names(&root), after_first);
    }

    #[test]
    #[serial]
    fn skip_policy_reports_existing_target() {
        let (_td, root) = setup(&["Taken.pdf", "x.pdf"]);
        let reader = FakeReader::new(&[("x.pdf", "Taken")]);
        let cfg = RenameConfig::new(&root).with_duplicates(OnDuplicate::Skip);
        let mut seen = Vec::new();
        Renamer::new(cfg, reader).plan(|_, o| seen.push(o.clone()));
        assert!(seen.contains(&Outcome::Skipped(SkipReason::TargetExists("Taken.pdf".into()))));
    }

    #[test]
    #[serial]
    fn occupied_names_are_not_reused_before_vacated() {
        // a.pdf is planned first, while b.pdf still occupies "b.pdf"
        let (_td, root) = setup(&["a.pdf", "b.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "b"), ("b.pdf", "c")]);
        let plan = Renamer::new(RenameConfig::new(&root), reader).plan(|_, _| {});
        assert_eq!(plan.operations[0].new, root.join("b (1).pdf"));
        assert_eq!(plan.operations[1].new, root.join("c.pdf"));
    }

    #[test]
    #[serial]
    fn vacated_names_can_be_reused() {
        let (_td, root) = setup(&["a.pdf", "b.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "z"), ("b.pdf", "a")]);
        let renamer = Renamer::new(RenameConfig::new(&root).live(), reader);
        let report = renamer.run(|_, _| {});
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(names(&root), ["a.pdf", "z.pdf"]);
    }

    #[test]
    #[serial]
    fn unreadable_metadata_counts_as_error() {
        let (_td, root) = setup(&["broken.pdf"]);
        let report = Renamer::new(RenameConfig::new(&root), FakeReader::new(&[])).run(|_, _| {});
        assert_eq!(report.summary.errored, 1);
        assert_eq!(report.summary.succeeded, 0);
    }

    #[test]
    #[serial]
    fn blank_and_unusable_titles_are_skipped() {
        let (_td, root) = setup(&["a.pdf", "b.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "   "), ("b.pdf", "///")]);
        let mut seen = Vec::new();
        Renamer::new(RenameConfig::new(&root), reader).plan(|_, o| seen.push(o.clone()));
        assert_eq!(
            seen,
            [
                Outcome::Skipped(SkipReason::NoTitle),
                Outcome::Skipped(SkipReason::EmptyAfterSanitize)
            ]
        );
    }

    #[test]
    #[serial]
    fn renames_stay_in_their_own_directory() {
        let (_td, root) = setup(&["sub/deep/a.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "Title")]);
        Renamer::new(RenameConfig::new(&root).live(), reader).run(|_, _| {});
        assert!(root.join("sub/deep/Title.pdf").is_file());
    }

    #[test]
    #[serial]
    fn apply_revalidates_destination() {
        let (_td, root) = setup(&["a.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "New")]);
        let renamer = Renamer::new(RenameConfig::new(&root).live(), reader);
        let plan = renamer.plan(|_, _| {});
        fs::write(root.join("New.pdf"), b"late arrival").unwrap();

        let report = renamer.apply(plan, |_, _| {});
        assert_eq!(report.summary.succeeded, 0);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(fs::read(root.join("New.pdf")).unwrap(), b"late arrival");
        assert!(root.join("a.pdf").exists());
        assert!(report.log_file.is_none());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn symlinked_pdfs_are_never_renamed() {
        let (_td, root) = setup(&["real.pdf"]);
        std::os::unix::fs::symlink(root.join("real.pdf"), root.join("link.pdf")).unwrap();
        let reader = FakeReader::new(&[("link.pdf", "Evil"), ("real.pdf", "Real")]);
        let mut seen = Vec::new();
        Renamer::new(RenameConfig::new(&root).live(), reader)
            .run(|p, o| seen.push((file_name_lossy(p), o.clone())));
        assert!(seen.contains(&("link.pdf".into(), Outcome::Skipped(SkipReason::Symlink))));
        assert!(root.join("link.pdf").symlink_metadata().is_ok());
        assert!(!root.join("Evil.pdf").exists());
    }

    #[test]
    #[serial]
    fn interrupt_during_plan_stops_early() {
        let (_td, root) = setup(&["a.pdf", "b.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "A"), ("b.pdf", "B")]);
        let plan = Renamer::new(RenameConfig::new(&root), reader).plan(|_, _| shutdown::request());
        shutdown::reset();
        assert!(plan.interrupted);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    #[serial]
    fn interrupted_apply_counts_unperformed_renames_as_skipped() {
        let (_td, root) = setup(&["a.pdf", "b.pdf", "c.pdf"]);
        let reader = FakeReader::new(&[("a.pdf", "A"), ("b.pdf", "B"), ("c.pdf", "C")]);
        let renamer = Renamer::new(RenameConfig::new(&root).live(), reader);
        let plan = renamer.plan(|_, _| {});
        assert_eq!(plan.len(), 3);

        let report = renamer.apply(plan, |_, _| shutdown::request());
        shutdown::reset();

        let s = report.summary;
        assert!(report.interrupted);
        assert_eq!(s.succeeded, 1);
        assert_eq!(s.skipped, 2);
        assert_eq!(s.files_seen, s.succeeded + s.skipped + s.errored);
        assert_eq!(names(&root), ["A.pdf", "b.pdf", "c.pdf"]);
        assert!(report.log_file.is_some());
    }
}
