// ABOUTME: Task group resolution over workflow-manager task documents
// ABOUTME: Builds the ordered group -> task map and per-task descriptors from YAML files

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{ParserError, Result};
use super::task::{task_name, TaskDescriptor, TaskKey, DEFAULT_MEMORY};

/// Schema-specific rules applied while walking task documents.
#[derive(Debug, Clone)]
pub struct ResolverRules {
    /// Initial-condition task dropped for cold-start coupled air-quality runs.
    pub ics_task: String,
    /// Metatask label of the ensemble post-processing fan-out.
    pub ens_post_metatask: String,
    /// Single task the ensemble post metatask collapses into.
    pub ens_post_task: String,
    pub default_memory: String,
}

impl Default for ResolverRules {
    fn default() -> Self {
        Self {
            ics_task: "aqm_ics".to_string(),
            ens_post_metatask: "run_ens_post".to_string(),
            ens_post_task: "run_post".to_string(),
            default_memory: DEFAULT_MEMORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTask {
    pub name: String,
    pub group: String,
    pub descriptor: TaskDescriptor,
}

/// Ordered result of task resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskWorkflow {
    groups: IndexMap<String, Vec<String>>,
    tasks: IndexMap<String, ResolvedTask>,
}

impl TaskWorkflow {
    /// Task identifiers in resolution order.
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &ResolvedTask> {
        self.tasks.values()
    }

    pub fn get_task(&self, name: &str) -> Option<&ResolvedTask> {
        self.tasks.get(name)
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn group_of(&self, task: &str) -> Option<&str> {
        self.tasks.get(task).map(|t| t.group.as_str())
    }

    /// Group name to ordered task identifiers.
    pub fn groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns false when the task was already present; the first occurrence wins.
    fn insert(&mut self, task: ResolvedTask) -> bool {
        if self.tasks.contains_key(&task.name) {
            return false;
        }
        self.groups
            .entry(task.group.clone())
            .or_default()
            .push(task.name.clone());
        self.tasks.insert(task.name.clone(), task);
        true
    }
}

pub struct WorkflowResolver {
    rules: ResolverRules,
    base_dir: Option<PathBuf>,
    remove_ics: bool,
}

impl WorkflowResolver {
    pub fn new(rules: ResolverRules) -> Self {
        Self {
            rules,
            base_dir: None,
            remove_ics: false,
        }
    }

    /// Directory that relative `taskgroups` entries resolve against. When unset
    /// they resolve against the directory of the including document.
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: Option<P>) -> Self {
        self.base_dir = base_dir.map(Into::into);
        self
    }

    /// The initial-condition task is removed only when both flags are set.
    pub fn with_flags(mut self, cpl_aqm: bool, coldstart: bool) -> Self {
        self.remove_ics = cpl_aqm && coldstart;
        self
    }

    pub fn resolve<P: AsRef<Path>>(&self, documents: &[P]) -> Result<TaskWorkflow> {
        let mut workflow = TaskWorkflow::default();
        let mut stack = Vec::new();

        for document in documents {
            self.read_document(document.as_ref(), &mut stack, &mut workflow)?;
        }

        if workflow.is_empty() {
            return Err(ParserError::EmptyWorkflow);
        }

        info!(
            "Resolved {} tasks in {} groups",
            workflow.len(),
            workflow.groups.len()
        );
        Ok(workflow)
    }

    fn read_document(
        &self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        workflow: &mut TaskWorkflow,
    ) -> Result<()> {
        let identity = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&identity) {
            return Err(ParserError::GroupCycle {
                path: path.to_path_buf(),
            });
        }

        debug!("Reading task document {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ParserError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document: Value =
            serde_yaml::from_str(&content).map_err(|source| ParserError::YamlError {
                path: path.to_path_buf(),
                source,
            })?;
        document
            .apply_merge()
            .map_err(|source| ParserError::YamlError {
                path: path.to_path_buf(),
                source,
            })?;

        let container = task_container(&document).ok_or_else(|| {
            ParserError::InvalidFormat(format!("{} is not a YAML mapping", path.display()))
        })?;

        stack.push(identity);

        if let Some(entries) = container.get("taskgroups") {
            for include in group_paths(entries, path)? {
                let include = self.resolve_path(&include, path);
                self.read_document(&include, stack, workflow)?;
            }
        }

        let group = group_name(path)?;
        self.collect_entries(container, &group, workflow)?;

        stack.pop();
        Ok(())
    }

    fn collect_entries(
        &self,
        mapping: &Mapping,
        group: &str,
        workflow: &mut TaskWorkflow,
    ) -> Result<()> {
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };

            match task_name(key) {
                Some(TaskKey::Task(name)) => self.add_task(name, value, group, workflow)?,
                Some(TaskKey::Metatask(label)) if label == self.rules.ens_post_metatask => {
                    let first = first_task_entry(value).ok_or_else(|| {
                        ParserError::InvalidFormat(format!(
                            "metatask '{}' contains no tasks",
                            label
                        ))
                    })?;
                    self.add_task(self.rules.ens_post_task.clone(), first, group, workflow)?;
                }
                Some(TaskKey::Metatask(label)) => {
                    let nested = value.as_mapping().ok_or_else(|| {
                        ParserError::InvalidFormat(format!(
                            "metatask '{}' must be a mapping",
                            label
                        ))
                    })?;
                    self.collect_entries(nested, group, workflow)?;
                }
                None => {}
            }
        }
        Ok(())
    }

    fn add_task(
        &self,
        name: String,
        value: &Value,
        group: &str,
        workflow: &mut TaskWorkflow,
    ) -> Result<()> {
        if self.remove_ics && name == self.rules.ics_task {
            info!("Skipping task '{}' for cold-start coupled run", name);
            return Ok(());
        }

        let descriptor = TaskDescriptor::from_yaml(&name, value, &self.rules.default_memory)?;
        let task = ResolvedTask {
            name: name.clone(),
            group: group.to_string(),
            descriptor,
        };

        if !workflow.insert(task) {
            debug!("Task '{}' already resolved; keeping first definition", name);
        }
        Ok(())
    }

    fn resolve_path(&self, include: &Path, including: &Path) -> PathBuf {
        if include.is_absolute() {
            return include.to_path_buf();
        }
        match &self.base_dir {
            Some(base) => base.join(include),
            None => including
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(include),
        }
    }
}

/// Tasks live under `rocoto.tasks` in full workflow documents and at the root
/// of group files.
fn task_container(document: &Value) -> Option<&Mapping> {
    document
        .get("rocoto")
        .and_then(|rocoto| rocoto.get("tasks"))
        .and_then(Value::as_mapping)
        .or_else(|| document.as_mapping())
}

fn group_paths(entries: &Value, document: &Path) -> Result<Vec<PathBuf>> {
    let items = entries.as_sequence().ok_or_else(|| {
        ParserError::InvalidFormat(format!(
            "taskgroups in {} must be a YAML list of file paths",
            document.display()
        ))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(PathBuf::from).ok_or_else(|| {
                ParserError::InvalidFormat(format!(
                    "taskgroups entry in {} is not a path string",
                    document.display()
                ))
            })
        })
        .collect()
}

fn group_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ParserError::InvalidFormat(format!("cannot derive group name from {}", path.display()))
        })
}

/// Depth-first search for the first `task_`/`enstask_` entry under a metatask.
fn first_task_entry(value: &Value) -> Option<&Value> {
    let mapping = value.as_mapping()?;
    for (key, nested) in mapping {
        match key.as_str().and_then(task_name) {
            Some(TaskKey::Task(_)) => return Some(nested),
            Some(TaskKey::Metatask(_)) => {
                if let Some(found) = first_task_entry(nested) {
                    return Some(found);
                }
            }
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TASK: &str = "nnodes: 1\n    ppn: 1\n    walltime: 00:10:00";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_single_group_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            temp_dir.path(),
            "prep.yaml",
            &format!("task_make_ics:\n    {TASK}\ntask_make_lbcs:\n    {TASK}\n"),
        );

        let workflow = WorkflowResolver::new(ResolverRules::default())
            .resolve(&[path])
            .unwrap();

        assert_eq!(workflow.task_ids(), vec!["make_ics", "make_lbcs"]);
        assert_eq!(workflow.group_of("make_ics"), Some("prep"));
    }

    #[test]
    fn test_metatask_and_member_substitution() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            temp_dir.path(),
            "forecast.yaml",
            &format!(
                "metatask_run_ensemble:\n  var:\n    mem: '001 002'\n  task_run_fcst_mem#mem#:\n    {TASK}\n"
            ),
        );

        let workflow = WorkflowResolver::new(ResolverRules::default())
            .resolve(&[path])
            .unwrap();

        assert_eq!(workflow.task_ids(), vec!["run_fcst_mem%mem%"]);
    }

    #[test]
    fn test_ens_post_metatask_collapses() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            temp_dir.path(),
            "post.yaml",
            "metatask_run_ens_post:\n  metatask_run_post_mem#mem#_all_fhrs:\n    task_run_post_mem#mem#_f#fhr#:\n      nnodes: 2\n      ppn: 24\n      walltime: 00:15:00\n",
        );

        let workflow = WorkflowResolver::new(ResolverRules::default())
            .resolve(&[path])
            .unwrap();

        assert_eq!(workflow.task_ids(), vec!["run_post"]);
        assert_eq!(workflow.get_task("run_post").unwrap().descriptor.ppn, 24);
    }

    #[test]
    fn test_taskgroups_list_and_merge_keys() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "prep.yaml",
            "default_task: &default_task\n  nnodes: 1\n  ppn: 1\n  walltime: 00:10:00\ntask_make_ics:\n  <<: *default_task\n  memory: 8G\n",
        );
        write(
            temp_dir.path(),
            "post.yaml",
            &format!("task_post_stat:\n    {TASK}\n"),
        );
        let top = write(
            temp_dir.path(),
            "workflow.yaml",
            "rocoto:\n  tasks:\n    taskgroups:\n      - prep.yaml\n      - post.yaml\n",
        );

        let workflow = WorkflowResolver::new(ResolverRules::default())
            .resolve(&[top])
            .unwrap();

        let groups: Vec<_> = workflow.groups().keys().cloned().collect();
        assert_eq!(groups, vec!["prep", "post"]);
        assert_eq!(workflow.get_task("make_ics").unwrap().descriptor.memory, "8G");
    }

    #[test]
    fn test_taskgroups_string_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let top = write(
            temp_dir.path(),
            "workflow.yaml",
            "taskgroups: '{{ [\"prep.yaml\"]|include }}'\n",
        );

        let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[top]);
        assert!(matches!(result, Err(ParserError::InvalidFormat(_))));
    }

    #[test]
    fn test_group_cycle_detected() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.yaml", "taskgroups: [b.yaml]\n");
        let b = write(temp_dir.path(), "b.yaml", "taskgroups: [a.yaml]\n");

        let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[b]);
        assert!(matches!(result, Err(ParserError::GroupCycle { .. })));
    }

    #[test]
    fn test_duplicate_task_first_wins() {
        let temp_dir = TempDir::new().unwrap();
        let first = write(
            temp_dir.path(),
            "prep.yaml",
            "task_make_ics:\n  nnodes: 1\n  ppn: 1\n  walltime: 00:10:00\n",
        );
        let second = write(
            temp_dir.path(),
            "extra.yaml",
            "task_make_ics:\n  nnodes: 9\n  ppn: 9\n  walltime: 00:10:00\n",
        );

        let workflow = WorkflowResolver::new(ResolverRules::default())
            .resolve(&[first, second])
            .unwrap();

        assert_eq!(workflow.len(), 1);
        assert_eq!(workflow.get_task("make_ics").unwrap().descriptor.nnodes, 1);
        assert!(!workflow.groups().contains_key("extra"));
    }

    #[test]
    fn test_empty_documents() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(temp_dir.path(), "empty.yaml", "var: 1\n");

        let result = WorkflowResolver::new(ResolverRules::default()).resolve(&[path]);
        assert!(matches!(result, Err(ParserError::EmptyWorkflow)));
    }
}
