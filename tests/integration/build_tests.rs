use crate::common::{build, fixture, write_project};
use minipack::utils::BundlerError;
use tempfile::tempdir;

#[tokio::test]
async fn test_scenario_project_build() {
    let outdir = tempdir().unwrap();
    let entry = fixture("scenario").join("main.js");

    let result = build(&entry, outdir.path(), false).await.unwrap();

    assert_eq!(result.modules, 2);
    assert!(result.entry.ends_with("tests/fixtures/scenario/main.js"));
    assert_eq!(result.output.path, outdir.path().join("bundle.js"));

    let bundle = std::fs::read_to_string(&result.output.path).unwrap();
    assert_eq!(bundle.len(), result.output.size);
    assert!(bundle.contains("scenario/main.js"));
    assert!(bundle.contains("scenario/util.js"));
    assert!(bundle.contains("requireModule(entry)"));
}

#[tokio::test]
async fn test_failure_in_leaf_writes_nothing() {
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("a.js", "import './b.js';\n"),
            ("b.js", "import './c.js';\n"),
            ("c.js", "export const broken = ;\n"),
        ],
    );
    let outdir = project.path().join("dist");

    let err = build(&project.path().join("a.js"), &outdir, false)
        .await
        .unwrap_err();

    assert!(matches!(err, BundlerError::Transform { .. }));
    assert!(err.module_id().unwrap().ends_with("/c.js"));
    assert!(err.format_detailed().contains("→   1 │ export const broken = ;"));
    assert!(!outdir.exists());
}

#[tokio::test]
async fn test_top_level_await_names_the_module() {
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("main.js", "import { value } from './lazy.js';\nconsole.log(value);\n"),
            ("lazy.js", "export const value = await Promise.resolve(5);\n"),
        ],
    );
    let outdir = project.path().join("dist");

    let err = build(&project.path().join("main.js"), &outdir, false)
        .await
        .unwrap_err();

    assert!(matches!(err, BundlerError::Transform { .. }));
    assert!(err.module_id().unwrap().ends_with("/lazy.js"));
    assert!(err.to_string().contains("top-level await"));
    assert!(!outdir.exists());
}

#[tokio::test]
async fn test_unresolved_import_writes_nothing() {
    let project = tempdir().unwrap();
    write_project(project.path(), &[("main.js", "import _ from 'lodash';\n_();\n")]);
    let outdir = project.path().join("dist");

    let err = build(&project.path().join("main.js"), &outdir, false)
        .await
        .unwrap_err();

    match err {
        BundlerError::UnresolvedSpecifier { specifier, referrer, .. } => {
            assert_eq!(specifier, "lodash");
            assert!(referrer.ends_with("/main.js"));
        }
        other => panic!("expected unresolved specifier, got {:?}", other),
    }
    assert!(!outdir.exists());
}

#[tokio::test]
async fn test_missing_entry() {
    let project = tempdir().unwrap();

    let err = build(&project.path().join("main.js"), &project.path().join("dist"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, BundlerError::EntryNotFound { .. }));
}

#[tokio::test]
async fn test_rebuild_overwrites_bundle() {
    let project = tempdir().unwrap();
    write_project(
        project.path(),
        &[
            ("main.js", "import { value } from './value.js';\nconsole.log(value);\n"),
            ("value.js", "export const value = 'first';\n"),
        ],
    );
    let outdir = project.path().join("dist");
    let entry = project.path().join("main.js");

    let first = build(&entry, &outdir, false).await.unwrap();
    assert!(std::fs::read_to_string(&first.output.path).unwrap().contains("first"));

    write_project(project.path(), &[("value.js", "export const value = 'second';\n")]);
    let second = build(&entry, &outdir, false).await.unwrap();

    let bundle = std::fs::read_to_string(&second.output.path).unwrap();
    assert!(!bundle.contains("first"));
    assert!(bundle.contains("second"));
}

#[tokio::test]
async fn test_cyclic_graph_builds() {
    let outdir = tempdir().unwrap();

    let result = build(&fixture("cycle").join("a.js"), outdir.path(), false)
        .await
        .unwrap();

    assert_eq!(result.modules, 2);
}
