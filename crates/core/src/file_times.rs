use anyhow::{Context, Result};
use chrono::{Local, LocalResult, NaiveDateTime, TimeZone};
use filetime::FileTime;
use std::path::Path;
use std::time::SystemTime;

pub fn set_file_times_local(path: &Path, timestamp: NaiveDateTime) -> Result<()> {
    let stamp = local_system_time(timestamp);
    let file_time = FileTime::from_system_time(stamp);
    filetime::set_file_times(path, file_time, file_time)
        .with_context(|| format!("タイムスタンプ更新に失敗しました: {}", path.display()))?;
    set_creation_time(path, stamp)?;
    Ok(())
}

fn local_system_time(timestamp: NaiveDateTime) -> SystemTime {
    match Local.from_local_datetime(&timestamp) {
        LocalResult::Single(datetime) => datetime.into(),
        LocalResult::Ambiguous(earliest, _) => earliest.into(),
        LocalResult::None => Local.from_utc_datetime(&timestamp).into(),
    }
}

#[cfg(windows)]
fn set_creation_time(path: &Path, stamp: SystemTime) -> Result<()> {
    use std::fs::{File, FileTimes};
    use std::os::windows::fs::FileTimesExt;

    let file = File::options()
        .write(true)
        .open(path)
        .with_context(|| format!("作成日時の更新対象を開けませんでした: {}", path.display()))?;
    file.set_times(FileTimes::new().set_created(stamp))
        .with_context(|| format!("作成日時の更新に失敗しました: {}", path.display()))?;
    Ok(())
}

#[cfg(not(windows))]
fn set_creation_time(_path: &Path, _stamp: SystemTime) -> Result<()> {
    Ok(())
}
