use code_grader::assessment::store::{delete_result, load_result};
use code_grader::assessment::{assess, compare_results, AssessmentInput, ResultStore};
use tempfile::TempDir;

fn result(correctness: f64) -> code_grader::AssessmentResult {
    assess(&AssessmentInput::new(correctness).with_tests(3, 4).with_readability(75.0))
}

#[test]
fn save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    let original = result(82.0);
    let path = store.save(&original, None).unwrap();

    assert!(path.starts_with(dir.path()));
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("result_"));
    assert_eq!(load_result(&path).unwrap(), original);
}

#[test]
fn back_to_back_saves_get_distinct_files() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    let first = store.save(&result(61.0), None).unwrap();
    let second = store.save(&result(62.0), None).unwrap();

    assert_ne!(first, second);
    assert_eq!(store.list().unwrap(), vec![first, second]);
}

#[test]
fn saved_scores_reload_bit_for_bit() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    for correctness in [33.33, 66.67, 71.11, 84.37] {
        let original = assess(
            &AssessmentInput::new(correctness)
                .with_tests(2, 3)
                .with_readability(77.7)
                .with_efficiency(61.3),
        );
        let path = store.save(&original, Some(&dir.path().join("scored.json"))).unwrap();
        let loaded = load_result(&path).unwrap();
        assert_eq!(loaded.normalized_score.to_bits(), original.normalized_score.to_bits());
        assert_eq!(loaded, original);
    }
}

#[test]
fn save_to_explicit_path_creates_parents() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("unused"));
    let target = dir.path().join("nested/deeper/out.json");

    let path = store.save(&result(50.0), Some(&target)).unwrap();
    assert_eq!(path, target);
    assert!(target.exists());
    assert!(!store.dir().exists());
}

#[test]
fn list_only_returns_json_sorted() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    store.save(&result(40.0), Some(&dir.path().join("result_b.json"))).unwrap();
    store.save(&result(60.0), Some(&dir.path().join("result_a.json"))).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let listed = store.list().unwrap();
    let names: Vec<String> = listed
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["result_a.json", "result_b.json"]);
    assert_eq!(store.latest().unwrap(), Some(dir.path().join("result_b.json")));
}

#[test]
fn list_on_missing_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("missing"));
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.latest().unwrap(), None);
}

#[test]
fn load_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"normalizedScore\": ").unwrap();
    assert!(load_result(&path).is_err());
}

#[test]
fn delete_ignores_missing_files() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let path = store.save(&result(70.0), None).unwrap();

    delete_result(&path).unwrap();
    assert!(!path.exists());
    delete_result(&path).unwrap();
}

#[test]
fn compare_saved_results() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let before_path = store.save(&result(60.0), Some(&dir.path().join("before.json"))).unwrap();
    let after_path = store.save(&result(90.0), Some(&dir.path().join("after.json"))).unwrap();

    let comparison = compare_results(
        load_result(&before_path).unwrap(),
        load_result(&after_path).unwrap(),
    );

    assert!(comparison.score_delta > 0.0);
    assert_eq!(comparison.improvements, vec!["correctness: +30.0".to_string()]);
    assert!(comparison.regressions.is_empty());
    assert_eq!(comparison.metric_deltas["readability"], 0.0);
}
