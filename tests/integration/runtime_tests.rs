use crate::common::{build, fixture, run_node, skip_if_no_node, stdout, write_project};
use tempfile::tempdir;

#[tokio::test]
async fn test_scenario_computes_sum() {
    skip_if_no_node!();
    let outdir = tempdir().unwrap();

    let result = build(&fixture("scenario").join("main.js"), outdir.path(), false)
        .await
        .unwrap();
    let output = run_node(&result.output.path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "5");
}

#[tokio::test]
async fn test_shared_module_executes_once() {
    skip_if_no_node!();
    let outdir = tempdir().unwrap();

    let result = build(&fixture("singleton").join("main.js"), outdir.path(), false)
        .await
        .unwrap();
    assert_eq!(result.modules, 4);

    let output = run_node(&result.output.path);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "1 1 1 1");
}

#[tokio::test]
async fn test_cycle_partner_sees_assigned_export() {
    skip_if_no_node!();
    let outdir = tempdir().unwrap();

    let result = build(&fixture("cycle").join("a.js"), outdir.path(), false)
        .await
        .unwrap();
    let output = run_node(&result.output.path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "a-value");
}

#[tokio::test]
async fn test_reexports_and_index_resolution() {
    skip_if_no_node!();
    let outdir = tempdir().unwrap();

    let result = build(&fixture("reexports").join("main.js"), outdir.path(), false)
        .await
        .unwrap();
    let output = run_node(&result.output.path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "1.0 42 hello node HI VERSION,double,greet");
}

#[tokio::test]
async fn test_strict_cycles_reports_empty_exports() {
    skip_if_no_node!();
    let entry = fixture("strict-cycle").join("a.js");

    let relaxed_dir = tempdir().unwrap();
    let relaxed = build(&entry, relaxed_dir.path(), false).await.unwrap();
    let output = run_node(&relaxed.output.path);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "undefined");

    let strict_dir = tempdir().unwrap();
    let strict = build(&entry, strict_dir.path(), true).await.unwrap();
    let output = run_node(&strict.output.path);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("CyclicExecutionError"));
}

#[tokio::test]
async fn test_explicit_reexport_wins_over_star_export() {
    skip_if_no_node!();
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("main.js", "import { x, y } from './barrel.js';\nconsole.log(x, y);\n"),
            ("barrel.js", "export * from './a.js';\nexport { x } from './b.js';\n"),
            ("a.js", "export const x = 'a';\nexport const y = 'y';\n"),
            ("b.js", "export const x = 'b';\n"),
        ],
    );

    let result = build(&project.path().join("main.js"), &project.path().join("dist"), false)
        .await
        .unwrap();
    let output = run_node(&result.output.path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "b y");
}

#[tokio::test]
async fn test_anonymous_default_function_is_hoisted_for_cycles() {
    skip_if_no_node!();
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("a.js", "import './b.js';\nexport default function () { return 'hoisted'; }\n"),
            ("b.js", "import fn from './a.js';\nconsole.log(fn());\n"),
        ],
    );

    let result = build(&project.path().join("a.js"), &project.path().join("dist"), false)
        .await
        .unwrap();
    let output = run_node(&result.output.path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "hoisted");
}
