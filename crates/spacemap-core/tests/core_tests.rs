use spacemap_core::{
    Completion, Entry, ProgressMode, ScanConfig, ScanResult, ScanWarning, SortOrder, WarningKind,
    format_size, normalize_path,
};
use std::path::{Path, PathBuf};

#[test]
fn test_entry_properties() {
    let file = Entry::from_path("/data/report.pdf", 2048, false);
    assert_eq!(file.name.as_str(), "report.pdf");
    assert_eq!(file.path, PathBuf::from("/data/report.pdf"));
    assert!(!file.is_dir);
    assert!(!file.is_hidden());

    let dir = Entry::directory("photos", "/data/photos", 10 * 1024 * 1024);
    assert!(dir.is_dir);
    assert_eq!(format_size(dir.size), "10.0 MB");
}

#[test]
fn test_sort_orders() {
    let base = vec![
        Entry::file("zeta", "/r/zeta", 10),
        Entry::directory("alpha", "/r/alpha", 300),
        Entry::file("mid", "/r/mid", 20),
    ];

    let mut by_size = base.clone();
    SortOrder::SizeDescending.apply(&mut by_size);
    assert_eq!(by_size[0].name.as_str(), "alpha");
    assert_eq!(by_size[2].name.as_str(), "zeta");

    let mut by_name = base.clone();
    SortOrder::Name.apply(&mut by_name);
    let names: Vec<_> = by_name.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["alpha", "mid", "zeta"]);

    let mut listing = base.clone();
    SortOrder::Listing.apply(&mut listing);
    assert_eq!(listing, base);
}

#[test]
fn test_result_lazy_queries() {
    let mut result = ScanResult::new("/r");
    result.record_children(
        "/r",
        vec![
            Entry::directory("listed", "/r/listed", 100),
            Entry::directory("locked", "/r/locked", 0),
        ],
    );
    result.record_children("/r/listed", vec![Entry::file("f", "/r/listed/f", 100)]);
    result.warnings.push(ScanWarning::new(
        "/r/locked",
        "Permission denied: /r/locked",
        WarningKind::PermissionDenied,
    ));
    result.complete(Completion::Drained);

    assert!(result.is_complete());
    assert!(result.has_warnings());
    assert_eq!(result.children(Path::new("/r/listed")).unwrap().len(), 1);
    // Failed listing: entry exists in the parent, key does not.
    assert!(result.children(Path::new("/r/locked")).is_none());
    assert_eq!(result.total_size(), 100);
}

#[test]
fn test_result_json_shape() {
    let mut result = ScanResult::new("/r");
    result.record_children("/r", vec![Entry::file("a", "/r/a", 1)]);
    result.complete(Completion::ForcedAtFullProgress);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["completion"], "forced-at-full-progress");
    assert_eq!(json["directories"]["/r"][0]["name"], "a");
    assert_eq!(json["directories"]["/r"][0]["is_dir"], false);

    let back: ScanResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.directories, result.directories);
}

#[test]
fn test_scan_config_builder() {
    let config = ScanConfig::builder()
        .root("/test/path")
        .include_hidden(true)
        .deny_user_cache(false)
        .sort(SortOrder::Name)
        .size_workers(8usize)
        .progress(ProgressMode::Exact)
        .build()
        .unwrap();

    assert_eq!(config.root.to_str().unwrap(), "/test/path");
    assert!(config.include_hidden);
    assert!(!config.deny_user_cache);
    assert_eq!(config.sort, SortOrder::Name);
    assert_eq!(config.size_workers, 8);

    let default_config = ScanConfig::default();
    assert_eq!(default_config.root, PathBuf::from("."));
    assert!(!default_config.include_hidden);
}

#[test]
fn test_scan_config_serde_defaults() {
    let config: ScanConfig = serde_json::from_str(r#"{"root": "/srv"}"#).unwrap();
    assert_eq!(config.root, PathBuf::from("/srv"));
    assert!(config.deny_user_cache);
    assert!(config.denylist.is_empty());
    assert_eq!(config.size_workers, 4);
    assert_eq!(config.sort, SortOrder::SizeDescending);
}

#[test]
fn test_warning_kind_display() {
    assert_eq!(WarningKind::PermissionDenied.to_string(), "permission-denied");
    assert_eq!(WarningKind::BrokenSymlink.to_string(), "broken-symlink");
}

#[test]
fn test_format_size_examples() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(1536), "1.5 KB");
    assert_eq!(format_size(2048), "2.0 KB");
}

#[cfg(unix)]
#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("/home/./user/../other"), PathBuf::from("/home/other"));
}
