use crate::extractor::extract_timestamp;
use crate::naming::{format_target_base, suffixed_target_base};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub input: PathBuf,
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub timestamp: NaiveDateTime,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    pub scanned_files: usize,
    pub matched_files: usize,
    pub skipped_no_timestamp: usize,
    pub skipped_hidden: usize,
    pub planned: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub candidates: Vec<RenameCandidate>,
    pub stats: RenameStats,
}

pub fn generate_plan(options: &PlanOptions) -> Result<RenamePlan> {
    if !options.input.exists() {
        anyhow::bail!("対象フォルダが存在しません: {}", options.input.display());
    }

    let mut stats = RenameStats::default();
    let files = collect_files(&options.input, options.include_hidden, &mut stats)?;

    let mut candidates = Vec::with_capacity(files.len());
    let mut planned_paths = HashSet::<PathBuf>::new();

    for path in files {
        let file_name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(timestamp) = extract_timestamp(&file_name) else {
            stats.skipped_no_timestamp += 1;
            continue;
        };
        stats.matched_files += 1;

        let extension = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();
        let base = format_target_base(&timestamp);
        let target = resolve_collision(&path, &base, &extension, &mut planned_paths)?;

        let changed = target != path;
        if !changed {
            stats.unchanged += 1;
        }

        stats.planned += 1;
        candidates.push(RenameCandidate {
            original_path: path,
            target_path: target,
            timestamp,
            changed,
        });
    }

    log::debug!(
        "計画作成: 対象 {}件 (うち変更なし {}件)",
        stats.planned,
        stats.unchanged
    );

    Ok(RenamePlan {
        root: options.input.clone(),
        candidates,
        stats,
    })
}

fn collect_files(root: &Path, include_hidden: bool, stats: &mut RenameStats) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    for entry in
        fs::read_dir(root).with_context(|| format!("フォルダを読めませんでした: {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("エントリ読み取り失敗: {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        stats.scanned_files += 1;
        if is_hidden(&path) && !include_hidden {
            stats.skipped_hidden += 1;
            continue;
        }
        out.push(path);
    }
    out.sort();

    Ok(out)
}

fn resolve_collision(
    original_path: &Path,
    base: &str,
    extension: &str,
    planned_paths: &mut HashSet<PathBuf>,
) -> Result<PathBuf> {
    let parent = original_path
        .parent()
        .context("親ディレクトリを取得できませんでした")?;

    let candidate = parent.join(format!("{}{}", base, extension));
    if is_available(&candidate, original_path, planned_paths) {
        planned_paths.insert(candidate.clone());
        return Ok(candidate);
    }

    let mut n = 1usize;
    loop {
        let candidate = parent.join(format!("{}{}", suffixed_target_base(base, n), extension));
        if is_available(&candidate, original_path, planned_paths) {
            planned_paths.insert(candidate.clone());
            return Ok(candidate);
        }
        n += 1;
    }
}

fn is_available(candidate: &Path, original_path: &Path, planned_paths: &HashSet<PathBuf>) -> bool {
    if planned_paths.contains(candidate) {
        return false;
    }
    if candidate == original_path {
        return true;
    }
    !candidate.exists()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
