// ABOUTME: Integration tests for task document resolution
// ABOUTME: Tests group inclusion, naming rules, ordering, and error reporting across files

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ecfgen::parser::{ParserError, ResolverRules, WorkflowResolver};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn task(nnodes: u32, ppn: u32) -> String {
    format!("  nnodes: {}\n  ppn: {}\n  walltime: \"00:10:00\"\n", nnodes, ppn)
}

#[test]
fn test_nested_taskgroups_keep_document_order() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write(dir, "groups/prep.yaml", &format!("task_make_ics:\n{}", task(1, 1)));
    write(
        dir,
        "groups/emission.yaml",
        &format!("task_nexus_gfs_sfc:\n{}task_fire_emission:\n{}", task(1, 2), task(1, 4)),
    );
    write(
        dir,
        "groups/pre.yaml",
        "taskgroups:\n  - groups/prep.yaml\n  - groups/emission.yaml\n",
    );
    let top = write(
        dir,
        "workflow.yaml",
        &format!(
            "rocoto:\n  tasks:\n    taskgroups:\n      - groups/pre.yaml\n    task_run_fcst:\n{}",
            task(8, 128)
                .lines()
                .map(|l| format!("    {}\n", l))
                .collect::<String>()
        ),
    );

    let workflow = WorkflowResolver::new(ResolverRules::default())
        .with_base_dir(Some(dir))
        .resolve(&[top])
        .unwrap();

    assert_eq!(
        workflow.task_ids(),
        vec!["make_ics", "nexus_gfs_sfc", "fire_emission", "run_fcst"]
    );
    assert_eq!(workflow.group_of("fire_emission"), Some("emission"));
    assert_eq!(workflow.group_of("run_fcst"), Some("workflow"));
    assert_eq!(
        workflow.groups().keys().collect::<Vec<_>>(),
        vec!["prep", "emission", "workflow"]
    );
}

#[test]
fn test_relative_includes_without_base_dir() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write(dir, "sub/post.yaml", &format!("task_post:\n{}", task(1, 1)));
    let top = write(dir, "sub/top.yaml", "taskgroups:\n  - post.yaml\n");

    let workflow = WorkflowResolver::new(ResolverRules::default())
        .resolve(&[top])
        .unwrap();

    assert_eq!(workflow.task_ids(), vec!["post"]);
}

#[test]
fn test_string_taskgroups_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let top = write(
        temp_dir.path(),
        "top.yaml",
        "taskgroups: '{{ [\"prep.yaml\"] }}'\n",
    );

    let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[top]);
    assert!(matches!(result, Err(ParserError::InvalidFormat(_))));
}

#[test]
fn test_include_cycle_detected() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write(dir, "a.yaml", "taskgroups:\n  - b.yaml\n");
    write(dir, "b.yaml", "taskgroups:\n  - a.yaml\n");

    let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[dir.join("a.yaml")]);
    assert!(matches!(result, Err(ParserError::GroupCycle { .. })));
}

#[test]
fn test_same_group_included_twice_is_not_a_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write(dir, "prep.yaml", &format!("task_make_ics:\n{}", task(1, 1)));
    let top = write(dir, "top.yaml", "taskgroups:\n  - prep.yaml\n  - prep.yaml\n");

    let workflow = WorkflowResolver::new(ResolverRules::default())
        .resolve(&[top])
        .unwrap();

    assert_eq!(workflow.len(), 1);
}

#[test]
fn test_missing_include_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let top = write(temp_dir.path(), "top.yaml", "taskgroups:\n  - nowhere.yaml\n");

    match WorkflowResolver::new(ResolverRules::default()).resolve(&[top]) {
        Err(ParserError::IoError { path, .. }) => assert!(path.ends_with("nowhere.yaml")),
        other => panic!("expected IoError, got {:?}", other),
    }
}

#[test]
fn test_missing_resource_field_names_task() {
    let temp_dir = TempDir::new().unwrap();
    let top = write(
        temp_dir.path(),
        "prep.yaml",
        "task_make_lbcs:\n  nnodes: 1\n  walltime: \"00:10:00\"\n",
    );

    match WorkflowResolver::new(ResolverRules::default()).resolve(&[top]) {
        Err(ParserError::MissingField { task, field }) => {
            assert_eq!(task, "make_lbcs");
            assert_eq!(field, "ppn");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_yaml_anchors_are_merged() {
    let temp_dir = TempDir::new().unwrap();
    let top = write(
        temp_dir.path(),
        "post.yaml",
        "default_task: &default_task\n  nnodes: 1\n  ppn: 2\n  walltime: \"00:05:00\"\n\
task_post_a:\n  <<: *default_task\ntask_post_b:\n  <<: *default_task\n  ppn: 8\n",
    );

    let workflow = WorkflowResolver::new(ResolverRules::default())
        .resolve(&[top])
        .unwrap();

    assert_eq!(workflow.get_task("post_a").unwrap().descriptor.ppn, 2);
    assert_eq!(workflow.get_task("post_b").unwrap().descriptor.ppn, 8);
}

#[test]
fn test_empty_documents_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let top = write(temp_dir.path(), "empty.yaml", "comment: nothing here\n");

    let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[top]);
    assert!(matches!(result, Err(ParserError::EmptyWorkflow)));
}
