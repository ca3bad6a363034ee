use log::{debug, info, trace};

// Runs as its own test binary: the global logger can only be installed once.
#[test]
fn log_file_receives_dated_lines() {
    std::env::remove_var("RUST_LOG");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.log");

    spin_capture::initialize(1, path.to_str()).unwrap();
    info!("opened camera 0");
    debug!("exposure set");
    trace!("below the debug level");
    log::logger().flush();

    let contents = std::fs::read_to_string(&path).unwrap();
    let opened = contents
        .lines()
        .find(|line| line.ends_with("opened camera 0"))
        .expect("info line in log file");
    // [YYYY-MM-DD][HH:MM:SS][target][LEVEL] message
    assert_eq!(opened.as_bytes()[0], b'[');
    assert_eq!(opened.as_bytes()[11], b']');
    assert!(opened.contains("[INFO] "));
    assert!(contents.contains("Starting spin-capture v"));
    assert!(contents.contains("[DEBUG] exposure set"));
    assert!(!contents.contains("below the debug level"));

    assert!(spin_capture::initialize(0, None).is_err());
}
