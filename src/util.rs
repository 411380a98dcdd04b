use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const DEFAULT_TITLE: &str = "Untitled";

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn is_default_title(title: &str) -> bool {
    let title = title.trim();
    title.is_empty() || title == DEFAULT_TITLE
}

pub fn export_file_name(title: &str, fallback_stem: &str) -> String {
    if is_default_title(title) {
        format!("{fallback_stem}.json")
    } else {
        format!("{}.json", title.trim())
    }
}

/// File name without a trailing `.json`, matched case-insensitively.
pub fn title_from_file_name(file_name: &str) -> String {
    let stem_len = file_name.len().saturating_sub(".json".len());
    match file_name.get(stem_len..) {
        Some(extension) if extension.eq_ignore_ascii_case(".json") => file_name[..stem_len].to_owned(),
        _ => file_name.to_owned(),
    }
}
