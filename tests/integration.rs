use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn csearch_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("csearch");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Create test files
    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.txt"),
        "Machine learning improves classification of documents.",
    )
    .unwrap();
    fs::write(
        files_dir.join("beta.html"),
        "<html><body><h1>Cuisine</h1><p>Recettes de cuisine italienne</p>\
         <script>var machine = 1;</script></body></html>",
    )
    .unwrap();
    fs::write(
        files_dir.join("gamma.txt"),
        "Intelligence artificielle et réseaux de neurones.",
    )
    .unwrap();
    fs::write(files_dir.join("sunset.jpg"), [0xFFu8, 0xD8, 0xFF, 0xE0]).unwrap();
    fs::write(files_dir.join("clip.mp4"), [0u8; 16]).unwrap();
    fs::write(files_dir.join("notes.xyz"), "unsupported").unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/csearch.sqlite"

[search]
default_limit = 20
snippet_chars = 200
suggest_limit = 5

[corpus]
root = "{root}/files"
exclude_globs = []
follow_symlinks = false

[logging]
filter = "corpus_search=warn"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("csearch.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_csearch(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = csearch_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run csearch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn indexed_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_csearch(&config_path, &["init"]);
    assert!(success, "init failed: {}", stderr);
    let (_, stderr, success) = run_csearch(&config_path, &["index-folder"]);
    assert!(success, "index-folder failed: {}", stderr);
    (tmp, config_path)
}

fn search_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["search"];
    full.extend_from_slice(args);
    full.push("--json");
    let (stdout, stderr, success) = run_csearch(config_path, &full);
    assert!(success, "search failed: {}", stderr);
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_csearch(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/csearch.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_csearch(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_csearch(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_csearch(&tmp.path().join("nope.toml"), &["stats"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_index_folder_counts() {
    let (_tmp, config_path) = setup_test_env();
    run_csearch(&config_path, &["init"]);

    let (stdout, stderr, success) = run_csearch(&config_path, &["index-folder"]);
    assert!(success, "index-folder failed: {}", stderr);
    assert!(stdout.contains("documents: 3"), "stdout: {}", stdout);
    assert!(stdout.contains("images:    1"));
    assert!(stdout.contains("videos:    1"));
    assert!(stdout.contains("skipped:   1"));
    assert!(stdout.contains("errors:    0"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_reindex_does_not_duplicate() {
    let (_tmp, config_path) = indexed_env();
    run_csearch(&config_path, &["index-folder"]);

    let (stdout, _, success) = run_csearch(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Documents:   3"), "stdout: {}", stdout);
    assert!(stdout.contains("Images:      1"));
    assert!(stdout.contains("Videos:      1"));
}

#[test]
fn test_search_machine_learning() {
    let (_tmp, config_path) = indexed_env();

    let (stdout, stderr, success) = run_csearch(&config_path, &["search", "machine learning"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("document / alpha"), "stdout: {}", stdout);
    assert!(stdout.contains("excerpt:"));
    // "machine" only appears inside beta.html's <script>.
    assert!(!stdout.contains("beta"));
}

#[test]
fn test_search_json_shape() {
    let (_tmp, config_path) = indexed_env();

    let json = search_json(&config_path, &["machine learning"]);
    assert_eq!(json["total_count"], 1);
    let hit = &json["results"][0];
    assert_eq!(hit["kind"], "document");
    assert_eq!(hit["title"], "alpha");
    assert!(hit["match_count"].as_i64().unwrap() >= 2);
    assert!(hit["snippet"].as_str().unwrap().contains("Machine"));
    assert!(json["processed_terms"].as_array().unwrap().len() >= 2);
}

#[test]
fn test_search_acronym_expands() {
    let (_tmp, config_path) = indexed_env();

    let by_acronym = search_json(&config_path, &["IA"]);
    let by_phrase = search_json(&config_path, &["intelligence artificielle"]);
    assert_eq!(by_acronym["total_count"], 1);
    assert_eq!(by_acronym["results"][0]["title"], "gamma");
    assert_eq!(by_acronym["results"], by_phrase["results"]);
}

#[test]
fn test_search_empty_query() {
    let (_tmp, config_path) = indexed_env();

    let (stdout, _, success) = run_csearch(&config_path, &["search", "   "]);
    assert!(success);
    assert!(stdout.contains("No results."));

    let (stdout, _, _) = run_csearch(&config_path, &["popular"]);
    assert!(stdout.contains("No queries logged yet."));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = indexed_env();

    let (stdout, _, success) = run_csearch(&config_path, &["search", "xylophone"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_type_filter() {
    let (_tmp, config_path) = indexed_env();

    let json = search_json(&config_path, &["sunset", "--type", "images"]);
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["results"][0]["kind"], "image");

    let json = search_json(&config_path, &["sunset", "--type", "videos"]);
    assert_eq!(json["total_count"], 0);

    let (_, _, success) = run_csearch(&config_path, &["search", "sunset", "--type", "audio"]);
    assert!(!success);
}

#[test]
fn test_index_image_with_metadata() {
    let (tmp, config_path) = indexed_env();
    let image = tmp.path().join("files/sunset.jpg");

    let (stdout, stderr, success) = run_csearch(
        &config_path,
        &[
            "index-image",
            image.to_str().unwrap(),
            "--description",
            "orange horizon",
            "--alt-text",
            "beach photo",
        ],
    );
    assert!(success, "index-image failed: {}", stderr);
    assert!(stdout.contains("indexed image"));

    let json = search_json(&config_path, &["beach"]);
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["results"][0]["snippet"], "orange horizon");
    assert_eq!(json["results"][0]["alt_text"], "beach photo");

    // Re-indexed in place: still one image.
    let (stdout, _, _) = run_csearch(&config_path, &["stats"]);
    assert!(stdout.contains("Images:      1"));
}

#[test]
fn test_index_video_with_duration() {
    let (tmp, config_path) = indexed_env();
    let clip = tmp.path().join("files/clip.mp4");

    let (_, stderr, success) = run_csearch(
        &config_path,
        &[
            "index-video",
            clip.to_str().unwrap(),
            "--title",
            "Surfing",
            "--description",
            "waves at dusk",
            "--duration",
            "95",
        ],
    );
    assert!(success, "index-video failed: {}", stderr);

    let json = search_json(&config_path, &["surfing", "--type", "video"]);
    assert_eq!(json["results"][0]["duration_seconds"], 95);
    assert_eq!(json["results"][0]["title"], "Surfing");
}

#[test]
fn test_index_missing_file_fails() {
    let (tmp, config_path) = indexed_env();
    let missing = tmp.path().join("files/missing.txt");

    let (_, stderr, success) = run_csearch(&config_path, &["index", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("file not found"), "stderr: {}", stderr);
}

#[test]
fn test_get_document() {
    let (_tmp, config_path) = indexed_env();

    // Files are walked in name order: alpha.txt is the first document.
    let (stdout, stderr, success) = run_csearch(&config_path, &["get", "document", "1"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("title:        alpha"));
    assert!(stdout.contains("--- Keywords (5) ---"), "stdout: {}", stdout);
    assert!(stdout.contains("classification"));
}

#[test]
fn test_get_missing_document() {
    let (_tmp, config_path) = indexed_env();

    let (_, stderr, success) = run_csearch(&config_path, &["get", "document", "999"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_remove_drops_item_from_results() {
    let (tmp, config_path) = indexed_env();
    let alpha = tmp.path().join("files/alpha.txt");

    let (stdout, _, success) = run_csearch(&config_path, &["remove", alpha.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("removed"));

    let (stdout, _, _) = run_csearch(&config_path, &["search", "machine"]);
    assert!(stdout.contains("No results."));

    let (stdout, _, success) = run_csearch(&config_path, &["remove", alpha.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("not indexed"));
}

#[test]
fn test_suggest() {
    let (_tmp, config_path) = indexed_env();

    let (stdout, _, success) = run_csearch(&config_path, &["suggest", "ma"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["machine"]);

    let (stdout, _, success) = run_csearch(&config_path, &["suggest", "m"]);
    assert!(success);
    assert!(stdout.trim().is_empty());
}

#[test]
fn test_popular_queries() {
    let (_tmp, config_path) = indexed_env();

    run_csearch(&config_path, &["search", "machine"]);
    run_csearch(&config_path, &["search", "machine"]);
    run_csearch(&config_path, &["search", "cuisine"]);

    let (stdout, _, success) = run_csearch(&config_path, &["popular"]);
    assert!(success);
    let machine = stdout.find("machine").unwrap();
    let cuisine = stdout.find("cuisine").unwrap();
    assert!(machine < cuisine, "stdout: {}", stdout);
}

#[test]
fn test_reset_empties_database() {
    let (_tmp, config_path) = indexed_env();
    run_csearch(&config_path, &["search", "machine"]);

    let (stdout, stderr, success) = run_csearch(&config_path, &["reset"]);
    assert!(success, "reset failed: {}", stderr);
    assert!(stdout.contains("Database reset."));

    let (stdout, _, _) = run_csearch(&config_path, &["stats"]);
    assert!(stdout.contains("Documents:   0"), "stdout: {}", stdout);
    let (stdout, _, _) = run_csearch(&config_path, &["popular"]);
    assert!(stdout.contains("No queries logged yet."));
}

#[test]
fn test_index_folder_rebuild() {
    let (tmp, config_path) = indexed_env();
    fs::remove_file(tmp.path().join("files/gamma.txt")).unwrap();

    let (stdout, stderr, success) = run_csearch(&config_path, &["index-folder", "--rebuild"]);
    assert!(success, "rebuild failed: {}", stderr);
    assert!(stdout.contains("documents: 2"), "stdout: {}", stdout);

    let json = search_json(&config_path, &["intelligence"]);
    assert_eq!(json["total_count"], 0);
}
