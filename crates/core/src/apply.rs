use crate::file_times::set_file_times_local;
use crate::planner::{RenameCandidate, RenamePlan};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("リネーム元が見つかりません: {0}")]
    MissingSource(PathBuf),
    #[error("重複した元ファイルが含まれています: {0}")]
    DuplicateSource(PathBuf),
    #[error("重複したリネーム先が含まれています: {0}")]
    DuplicateTarget(PathBuf),
    #[error("リネーム先が既に存在します: {0}")]
    TargetOccupied(PathBuf),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApplyOptions {
    pub update_file_times: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            update_file_times: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub applied: usize,
    pub unchanged: usize,
}

pub fn apply_plan(plan: &RenamePlan) -> Result<ApplyResult> {
    apply_plan_with_options(plan, &ApplyOptions::default())
}

pub fn apply_plan_with_options(plan: &RenamePlan, options: &ApplyOptions) -> Result<ApplyResult> {
    let candidates: Vec<&RenameCandidate> = plan.candidates.iter().filter(|c| c.changed).collect();
    if candidates.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            unchanged: plan.candidates.len(),
        });
    }

    validate_candidates(&candidates)?;

    let mut applied = 0usize;
    for candidate in candidates {
        fs::rename(&candidate.original_path, &candidate.target_path).with_context(|| {
            format!(
                "リネームに失敗しました: {} -> {}",
                candidate.original_path.display(),
                candidate.target_path.display()
            )
        })?;

        if options.update_file_times {
            set_file_times_local(&candidate.target_path, candidate.timestamp)?;
        }

        log::info!(
            "リネーム: {} -> {}",
            candidate.original_path.display(),
            candidate.target_path.display()
        );
        applied += 1;
    }

    Ok(ApplyResult {
        applied,
        unchanged: plan.candidates.len().saturating_sub(applied),
    })
}

fn validate_candidates(candidates: &[&RenameCandidate]) -> Result<(), ApplyError> {
    let mut seen_sources = HashSet::<&PathBuf>::new();
    let mut seen_targets = HashSet::<&PathBuf>::new();

    for candidate in candidates {
        if !candidate.original_path.exists() {
            return Err(ApplyError::MissingSource(candidate.original_path.clone()));
        }
        if !seen_sources.insert(&candidate.original_path) {
            return Err(ApplyError::DuplicateSource(candidate.original_path.clone()));
        }
        if !seen_targets.insert(&candidate.target_path) {
            return Err(ApplyError::DuplicateTarget(candidate.target_path.clone()));
        }
        if candidate.target_path.exists() {
            return Err(ApplyError::TargetOccupied(candidate.target_path.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_plan, apply_plan_with_options, ApplyOptions};
    use crate::planner::{generate_plan, PlanOptions, RenameCandidate, RenamePlan, RenameStats};
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn sample_timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 28)
            .expect("valid date")
            .and_hms_opt(17, 47, 3)
            .expect("valid time")
    }

    fn plan_for(dir: &Path) -> RenamePlan {
        generate_plan(&PlanOptions {
            input: dir.to_path_buf(),
            include_hidden: false,
        })
        .expect("plan should succeed")
    }

    fn modified_local(path: &Path) -> NaiveDateTime {
        let modified = fs::metadata(path)
            .expect("metadata")
            .modified()
            .expect("modified time");
        DateTime::<Local>::from(modified).naive_local()
    }

    #[test]
    fn renames_and_stamps_single_file() {
        let temp = tempdir().expect("tempdir");
        let original = temp.path().join("IMG_20230528_174703.jpg");
        let target = temp.path().join("2023-05-28 17-47-03.jpg");
        fs::write(&original, b"x").expect("write source");

        let plan = plan_for(temp.path());
        let result = apply_plan(&plan).expect("apply should succeed");

        assert_eq!(result.applied, 1);
        assert!(!original.exists(), "original name should be gone");
        assert!(target.exists(), "canonical name should exist");
        assert_eq!(modified_local(&target), sample_timestamp());
    }

    #[test]
    fn second_run_changes_nothing() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_20230528_174703.jpg"), b"x").expect("write source");

        let plan = plan_for(temp.path());
        apply_plan(&plan).expect("first apply should succeed");

        let plan = plan_for(temp.path());
        let result = apply_plan(&plan).expect("second apply should succeed");
        assert_eq!(result.applied, 0);
        assert_eq!(result.unchanged, 1);
        assert!(temp.path().join("2023-05-28 17-47-03.jpg").exists());
    }

    #[test]
    fn conflicting_timestamp_keeps_both_files() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("2023-05-28 17-47-03.jpg"), b"a").expect("write existing");
        fs::write(temp.path().join("IMG_20230528_174703.jpg"), b"b").expect("write source");

        let plan = plan_for(temp.path());
        apply_plan(&plan).expect("apply should succeed");

        let base = temp.path().join("2023-05-28 17-47-03.jpg");
        let suffixed = temp.path().join("2023-05-28 17-47-03_0001.jpg");
        assert!(base.exists());
        assert!(suffixed.exists());
        assert_eq!(fs::read(&base).expect("read base"), b"a");
        assert_eq!(fs::read(&suffixed).expect("read suffixed"), b"b");
    }

    #[test]
    fn skipping_file_times_leaves_mtime_alone() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_20230528_174703.jpg"), b"x").expect("write source");

        let plan = plan_for(temp.path());
        let options = ApplyOptions {
            update_file_times: false,
        };
        apply_plan_with_options(&plan, &options).expect("apply should succeed");

        let target = temp.path().join("2023-05-28 17-47-03.jpg");
        assert!(target.exists());
        assert_ne!(modified_local(&target), sample_timestamp());
    }

    #[test]
    fn unchanged_plan_applies_nothing() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("2023-05-28 17-47-03.jpg");
        fs::write(&path, b"x").expect("write file");

        let plan = RenamePlan {
            root: temp.path().to_path_buf(),
            candidates: vec![RenameCandidate {
                original_path: path.clone(),
                target_path: path.clone(),
                timestamp: sample_timestamp(),
                changed: false,
            }],
            stats: RenameStats::default(),
        };

        let result = apply_plan(&plan).expect("unchanged plan should be accepted");
        assert_eq!(result.applied, 0);
        assert_eq!(result.unchanged, 1);
        assert!(path.exists());
    }

    #[test]
    fn duplicate_targets_are_rejected_before_any_rename() {
        let temp = tempdir().expect("tempdir");
        let original_a = temp.path().join("IMG_20230528_174703.jpg");
        let original_b = temp.path().join("PXL_20230528_174703.jpg");
        fs::write(&original_a, b"a").expect("write A");
        fs::write(&original_b, b"b").expect("write B");

        let duplicate_target = temp.path().join("2023-05-28 17-47-03.jpg");
        let plan = RenamePlan {
            root: temp.path().to_path_buf(),
            candidates: vec![
                RenameCandidate {
                    original_path: original_a.clone(),
                    target_path: duplicate_target.clone(),
                    timestamp: sample_timestamp(),
                    changed: true,
                },
                RenameCandidate {
                    original_path: original_b.clone(),
                    target_path: duplicate_target,
                    timestamp: sample_timestamp(),
                    changed: true,
                },
            ],
            stats: RenameStats::default(),
        };

        let err = apply_plan(&plan).expect_err("duplicate targets must be rejected");
        assert!(err.to_string().contains("重複したリネーム先が含まれています"));
        assert!(original_a.exists());
        assert!(original_b.exists());
    }

    #[test]
    fn occupied_target_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let original = temp.path().join("IMG_20230528_174703.jpg");
        let occupied = temp.path().join("2023-05-28 17-47-03.jpg");
        fs::write(&original, b"a").expect("write source");
        fs::write(&occupied, b"b").expect("write occupant");

        let plan = RenamePlan {
            root: temp.path().to_path_buf(),
            candidates: vec![RenameCandidate {
                original_path: original.clone(),
                target_path: occupied.clone(),
                timestamp: sample_timestamp(),
                changed: true,
            }],
            stats: RenameStats::default(),
        };

        let err = apply_plan(&plan).expect_err("occupied target must be rejected");
        assert!(err.to_string().contains("リネーム先が既に存在します"));
        assert!(original.exists(), "source should stay untouched");
        assert_eq!(fs::read(&occupied).expect("read occupant"), b"b");
    }

    #[test]
    fn missing_source_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let plan = RenamePlan {
            root: temp.path().to_path_buf(),
            candidates: vec![RenameCandidate {
                original_path: temp.path().join("IMG_20230528_174703.jpg"),
                target_path: temp.path().join("2023-05-28 17-47-03.jpg"),
                timestamp: sample_timestamp(),
                changed: true,
            }],
            stats: RenameStats::default(),
        };

        let err = apply_plan(&plan).expect_err("missing source must be rejected");
        assert!(err.to_string().contains("リネーム元が見つかりません"));
    }
}
