use super::*;
use std::time::Duration;

#[test]
fn test_runtime_drives_tasks_from_outside() {
    let rt = build_runtime().unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    rt.spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _ = tx.send(std::thread::current().name().map(str::to_string));
    });
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name.as_deref(), Some("rgpick-io"));
}
