use crate::common::{fixture, write_project};
use std::process::Command;
use tempfile::tempdir;

fn minipack() -> Command {
    Command::new(env!("CARGO_BIN_EXE_minipack"))
}

#[test]
fn test_build_with_flags() {
    let outdir = tempdir().unwrap();

    let output = minipack()
        .arg("build")
        .arg("--entry")
        .arg(fixture("scenario").join("main.js"))
        .arg("--outdir")
        .arg(outdir.path())
        .arg("--filename")
        .arg("app.js")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(outdir.path().join("app.js").is_file());
}

#[test]
fn test_build_with_config_file() {
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("src/main.js", "import { x } from './x.js';\nconsole.log(x);\n"),
            ("src/x.js", "export const x = 1;\n"),
            (
                "minipack.config.json",
                r#"{ "entry": "src/main.js", "output": { "path": "out", "filename": "site.js" } }"#,
            ),
        ],
    );

    let output = minipack()
        .arg("build")
        .current_dir(project.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(project.path().join("out/site.js").is_file());
}

#[test]
fn test_failed_build_exits_with_one() {
    let project = tempdir().unwrap();

    let output = minipack()
        .arg("build")
        .arg("--entry")
        .arg(project.path().join("missing.js"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Entry module not found"));
}
