mod apply;
mod config;
mod extractor;
mod file_times;
mod naming;
mod planner;

pub use apply::{
    apply_plan, apply_plan_with_options, ApplyError, ApplyOptions, ApplyResult,
};
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use extractor::extract_timestamp;
pub use file_times::set_file_times_local;
pub use naming::{format_target_base, suffixed_target_base};
pub use planner::{generate_plan, PlanOptions, RenameCandidate, RenamePlan, RenameStats};
