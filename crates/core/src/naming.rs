use chrono::NaiveDateTime;

pub fn format_target_base(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H-%M-%S").to_string()
}

pub fn suffixed_target_base(base: &str, counter: usize) -> String {
    format!("{}_{:04}", base, counter)
}
