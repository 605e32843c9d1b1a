//! Behavioural tests for the `pz-extract` binary.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp path");
    (temp, root)
}

fn write(path: &Utf8Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    fs::write(path, contents).expect("write file");
}

fn game_tree(root: &Utf8Path) -> Utf8PathBuf {
    let source = root.join("ProjectZomboid");
    for path in [
        "zombie/Lua/LuaManager.class",
        "stdlib.lbc",
        "serialize.lua",
        "media/lua/shared/defines.lua",
        "media/lua/shared/Sandbox/Apocalypse.lua",
        "commons-compress.jar",
    ] {
        write(&source.join(path), path.as_bytes());
    }
    source
}

fn pz_extract(work: &Utf8Path, args: &[&str]) -> Output {
    fs::create_dir_all(work).expect("create working dir");
    Command::new(env!("CARGO_BIN_EXE_pz-extract"))
        .args(args)
        .current_dir(work)
        .output()
        .expect("run pz-extract")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn missing_source_is_a_config_error_without_side_effects() {
    let (_temp, root) = temp_root();
    let work = root.join("work");
    write(&work.join("lib/keep.jar"), b"keep");

    let output = pz_extract(&work, &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Project Zomboid directory is not set"));
    assert!(work.join("lib/keep.jar").is_file());
}

#[test]
fn zip_run_prints_progress_and_timing() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let work = root.join("work");

    let output = pz_extract(&work, &["--archiver", "zip", source.as_str()]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines = stdout_lines(&output);
    assert_eq!(
        lines[..6],
        [
            "Start packaging b42.jar",
            "Copying *.class",
            "Package the file into the b42.jar",
            "Removing temporary files",
            "Complete b42.jar packaging",
            "Copying jar files",
        ]
    );
    let last = lines.last().expect("timing line");
    assert!(last.starts_with("Used time: ") && last.ends_with("ms"));
    assert!(work.join("lib/b42.jar").is_file());
    assert!(work.join("lib/commons-compress.jar").is_file());
    assert!(work.join("media/lua/shared/defines.lua").is_file());
}

#[test]
fn json_run_prints_only_the_summary() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let work = root.join("work");

    let output = pz_extract(&work, &["--archiver", "zip", "--json", "--source", source.as_str()]);

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(summary["class_files"], 1);
    assert_eq!(summary["aux_files"]["staged"], 1);
    assert_eq!(summary["prebuilt_archives"], 1);
    assert!(
        summary["archive_path"]
            .as_str()
            .is_some_and(|p| p.ends_with("lib/b42.jar"))
    );
}

#[test]
fn quiet_run_prints_nothing() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let work = root.join("work");

    let output = pz_extract(&work, &["-q", "--archiver", "zip", source.as_str()]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn dry_run_leaves_the_filesystem_alone() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let work = root.join("work");

    let output = pz_extract(&work, &["--dry-run", source.as_str()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dry run"));
    assert!(stdout.contains("b42.jar"));
    assert!(!work.join("lib").exists());
}

#[test]
fn working_dir_flag_redirects_outputs() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let work = root.join("work");

    let output = pz_extract(
        &work,
        &["-q", "--archiver", "zip", "-C", "mod", source.as_str()],
    );

    assert!(output.status.success());
    assert!(work.join("mod/lib/b42.jar").is_file());
    assert!(work.join("mod/serialize.lua").is_file());
    assert!(!work.join("lib").exists());
}

#[test]
fn working_dir_inside_the_game_is_a_config_error() {
    let (_temp, root) = temp_root();
    let source = game_tree(&root);
    let before = fs::read(source.join("serialize.lua")).expect("read serialize.lua");

    let output = pz_extract(&source, &["--archiver", "zip", "."]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read(source.join("serialize.lua")).expect("read serialize.lua"), before);
    assert!(!source.join("lib").exists());
}
