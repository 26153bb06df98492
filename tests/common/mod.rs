// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds a throwaway experiment with a parm tree, task documents, and var_defns in a temp dir

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ecfgen::vars::{load_config, FlatConfig};

pub const JOB_CARD_TEMPLATE: &str = "#PBS -N {{ net }}_{{ task }}_{{ envir }}\n\
#PBS -l walltime={{ walltime }}\n\
#PBS -l select={{ select }}\n\
export EXPTDIR={{ exptdir }}\n\
%include <head.h>\n";

pub const DEFINITION_TEMPLATE: &str = "suite {{ net }}_{{ model_ver }}\n\
  edit ECF_INCLUDE {{ exptdir }}/ecf/include\n\
{{#each groups}}  family {{ this.name }}\n\
{{#each this.tasks}}    task {{ this }}\n\
{{/each}}  endfamily\n\
{{/each}}endsuite\n";

pub const ENV_TEMPLATE: &str = "export ECF_HOME={{ ecf_home }}\n\
export ECF_OUTPUTDIR={{ ecf_outputdir }}\n\
export PDY={{ pdy }}\n";

pub const PREP_TASKS: &str = r#"
task_aqm_ics:
  nnodes: 1
  ppn: 1
  walltime: "00:30:00"
task_make_lbcs:
  nnodes: 1
  ppn: 4
  walltime: "00:30:00"
  memory: 8G
"#;

pub const FORECAST_TASKS: &str = r#"
task_run_fcst:
  nnodes: 8
  ppn: 128
  walltime: "04:00:00"
  envars:
    OMP_NUM_THREADS: 2
"#;

pub const POST_TASKS: &str = r#"
task_jpost:
  nnodes: 1
  ppn: 8
  walltime: "00:20:00"
metatask_run_ens_post:
  metatask_run_post_mem#mem#:
    task_run_post_mem#mem#_f#fhr#:
      nnodes: 2
      ppn: 16
      walltime: "00:15:00"
"#;

pub const NEXUS_TASKS: &str = r#"
task_jnexus_emission:
  nnodes: 1
  ppn: 64
  walltime: "01:00:00"
  threads: 4
"#;

/// A complete experiment layout under a temp dir.
pub struct TestExperiment {
    pub temp_dir: TempDir,
    pub parmdir: PathBuf,
    pub exptdir: PathBuf,
    vars: Vec<(String, String)>,
}

impl TestExperiment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let parmdir = temp_dir.path().join("parm");
        let exptdir = temp_dir.path().join("expt");

        let vars = vec![
            ("EXPTDIR", exptdir.display().to_string()),
            ("PARMdir", parmdir.display().to_string()),
            ("NET", "aqm".to_string()),
            ("RUN", "aqm".to_string()),
            ("envir", "prod".to_string()),
            ("model_ver", "v7.0.0".to_string()),
            ("OPSROOT", temp_dir.path().join("ops").display().to_string()),
            ("DATE_FIRST_CYCL", "2023060112".to_string()),
            ("CPL_AQM", "TRUE".to_string()),
            ("COLDSTART", "FALSE".to_string()),
            ("FCST_LEN_CYCL", "( 6 72 24 )".to_string()),
            ("NUM_SPLIT_NEXUS", "6".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let experiment = Self {
            temp_dir,
            parmdir,
            exptdir,
            vars,
        };
        experiment.write_parm_tree();
        experiment
    }

    fn write_parm_tree(&self) {
        let ecflow = self.parmdir.join("ecflow");
        self.write(&ecflow.join("include").join("head.h"), "# head\n");
        self.write(&ecflow.join("include").join("tail.h"), "# tail\n");
        self.write(&ecflow.join("defs").join("ecf_defn_template.def"), DEFINITION_TEMPLATE);
        self.write(&ecflow.join("env").join("env_template.sh"), ENV_TEMPLATE);

        self.write(&ecflow.join("prep.yaml"), PREP_TASKS);
        self.write(&ecflow.join("forecast.yaml"), FORECAST_TASKS);
        self.write(&ecflow.join("post.yaml"), POST_TASKS);
        self.write(&ecflow.join("nexus.yaml"), NEXUS_TASKS);
        self.write(
            &ecflow.join("tasks.yaml"),
            "taskgroups:\n  - prep.yaml\n  - forecast.yaml\n  - post.yaml\n  - nexus.yaml\n",
        );

        for (group, task) in [
            ("prep", "aqm_ics"),
            ("prep", "make_lbcs"),
            ("forecast", "run_fcst"),
            ("post", "jpost"),
            ("post", "run_post"),
            ("nexus", "jnexus_emission"),
        ] {
            self.write_script_template(group, task, JOB_CARD_TEMPLATE);
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        match self.vars.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.vars.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn without_var(mut self, key: &str) -> Self {
        self.vars.retain(|(k, _)| k != key);
        self
    }

    pub fn write(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn write_script_template(&self, group: &str, task: &str, content: &str) {
        let path = self
            .parmdir
            .join("ecflow")
            .join("scripts")
            .join(group)
            .join(format!("{}.ecf", task));
        self.write(&path, content);
    }

    /// Write var_defns.sh the way the experiment generator does.
    pub fn var_defns(&self) -> PathBuf {
        let path = self.temp_dir.path().join("var_defns.sh");
        let content: String = self
            .vars
            .iter()
            .map(|(k, v)| {
                if v.starts_with('(') {
                    format!("{}={}\n", k, v)
                } else {
                    format!("{}='{}'\n", k, v)
                }
            })
            .collect();
        self.write(&path, &content);
        path
    }

    pub fn flat_config(&self) -> FlatConfig {
        load_config(self.var_defns()).expect("Failed to load var_defns")
    }

    pub fn ecf_dir(&self) -> PathBuf {
        self.exptdir.join("ecf")
    }

    pub fn script_output(&self, group: &str, task: &str) -> PathBuf {
        self.ecf_dir()
            .join("scripts")
            .join(group)
            .join(format!("{}.ecf", task))
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }
}

impl Default for TestExperiment {
    fn default() -> Self {
        Self::new()
    }
}
