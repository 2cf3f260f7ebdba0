use super::*;
use crate::kernel::services::ports::SearchError;
use std::path::Path;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

/// 假的 rg：按 pattern 输出两行结果，之后可选地挂住
#[cfg(unix)]
fn fake_rg(dir: &Path, lines: usize, hang: bool) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mut body = String::from(
        "#!/bin/sh\npat=\"\"\nseen=0\nfor a in \"$@\"; do\n  if [ \"$seen\" = 1 ]; then pat=\"$a\"; break; fi\n  if [ \"$a\" = \"--\" ]; then seen=1; fi\ndone\n",
    );
    for n in 1..=lines {
        body.push_str(&format!("printf '%s.txt:{n}:match %s\\n' \"$pat\" \"$pat\"\n"));
    }
    if hang {
        body.push_str("sleep 30\n");
    }
    let path = dir.join("fake-rg");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn settings(program: &str, debounce_ms: u64, max_results: usize) -> SearchSettings {
    SearchSettings {
        max_results,
        debounce_ms,
        rg_path: program.to_string(),
        ..SearchSettings::default()
    }
}

fn controller(rt: &tokio::runtime::Runtime, root: &Path, settings: SearchSettings) -> SearchController {
    SearchController::with_strategy(
        rt.handle().clone(),
        root.to_path_buf(),
        settings,
        ReadStrategy::Streaming,
    )
}

fn wait_for(ctrl: &mut SearchController, cond: impl Fn(&SearchController) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        ctrl.pump();
        if cond(ctrl) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_empty_query_spawns_nothing() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let mut ctrl = controller(&rt, dir.path(), settings("/nonexistent/rgpick-missing", 50, 100));

    ctrl.set_query("").unwrap();
    assert!(ctrl.results().is_empty());
    assert_eq!(ctrl.gate(), GateState::Idle);
    assert!(ctrl.live.is_none());
    assert!(ctrl.last_error().is_none());
}

#[test]
fn test_missing_program_is_flagged_failure() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let mut ctrl = controller(&rt, dir.path(), settings("/nonexistent/rgpick-missing", 50, 100));

    let err = ctrl.set_query("foo").unwrap_err();
    assert!(matches!(err, SearchError::Spawn(_)));
    assert_eq!(ctrl.gate(), GateState::Idle);
    assert!(ctrl.results().is_empty());
    assert!(ctrl.last_error().is_some_and(|f| f.flagged));
    assert!(ctrl.live.is_none());
}

#[cfg(unix)]
#[test]
fn test_search_settles_with_ordered_results() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 4, false);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 50, 100));

    ctrl.set_query("foo").unwrap();
    assert!(ctrl.wait_settled(Duration::from_secs(10)).unwrap());

    let lines: Vec<usize> = ctrl.results().iter().map(|r| r.line_number).collect();
    assert_eq!(lines, vec![1, 2, 3, 4]);
    assert!(ctrl.results().iter().all(|r| r.file_path == "foo.txt"));
    assert!(!ctrl.state().is_capped());
    assert!(ctrl.live.is_none());
}

#[cfg(unix)]
#[test]
fn test_cap_stops_session() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 5, true);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 50, 2));

    ctrl.set_query("foo").unwrap();
    assert!(ctrl.wait_settled(Duration::from_secs(10)).unwrap());
    assert_eq!(ctrl.results().len(), 2);
    assert_eq!(ctrl.results()[1].line_number, 2);
    assert!(ctrl.state().is_capped());
}

#[cfg(unix)]
#[test]
fn test_superseding_query_discards_previous_results() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 2, true);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 20, 100));

    let t0 = Instant::now();
    ctrl.set_query_at("one", t0).unwrap();
    let GateState::Searching(first) = ctrl.gate() else {
        panic!("expected a live session");
    };
    assert!(wait_for(&mut ctrl, |c| c.results().len() == 2));

    // 会话还在跑：新查询先等 debounce
    let t1 = Instant::now();
    ctrl.set_query_at("two", t1).unwrap();
    assert_eq!(ctrl.gate(), GateState::Searching(first));
    assert_eq!(ctrl.results().len(), 2);

    ctrl.tick_at(t1 + Duration::from_millis(20)).unwrap();
    let GateState::Searching(second) = ctrl.gate() else {
        panic!("expected the new session to be live");
    };
    assert_ne!(first, second);
    assert!(ctrl.results().iter().all(|r| r.file_path == "two.txt"));

    assert!(wait_for(&mut ctrl, |c| c.results().len() == 2));
    assert!(ctrl.results().iter().all(|r| r.file_path == "two.txt"));
}

#[cfg(unix)]
#[test]
fn test_wait_settled_fires_pending_query() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 1, true);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 20, 1));

    ctrl.set_query("a").unwrap();
    ctrl.set_query("ab").unwrap();
    assert!(ctrl.state().pending_deadline().is_some());

    // 每个会话都在第一条结果处达到上限，所以最终一定会空闲
    assert!(ctrl.wait_settled(Duration::from_secs(10)).unwrap());
    assert_eq!(ctrl.state().query(), "ab");
    assert_eq!(ctrl.results().len(), 1);
    assert_eq!(ctrl.results()[0].file_path, "ab.txt");
}

#[cfg(unix)]
#[test]
fn test_clearing_query_cancels_live_session() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 1, true);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 50, 100));

    ctrl.set_query("foo").unwrap();
    assert!(wait_for(&mut ctrl, |c| c.results().len() == 1));

    ctrl.set_query("").unwrap();
    assert!(ctrl.results().is_empty());
    assert!(ctrl.live.is_none());
    assert!(ctrl.wait_settled(Duration::from_secs(10)).unwrap());
    assert!(ctrl.results().is_empty());
    assert_eq!(ctrl.gate(), GateState::Idle);
}

#[cfg(unix)]
#[test]
fn test_explicit_cancel_keeps_partial_results() {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let program = fake_rg(dir.path(), 2, true);
    let mut ctrl = controller(&rt, dir.path(), settings(&program, 50, 100));

    ctrl.set_query("foo").unwrap();
    assert!(wait_for(&mut ctrl, |c| c.results().len() == 2));

    ctrl.cancel();
    assert_eq!(ctrl.gate(), GateState::Idle);
    assert!(ctrl.live.is_none());
    assert_eq!(ctrl.results().len(), 2);
}
