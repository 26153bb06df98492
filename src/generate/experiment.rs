// ABOUTME: Experiment variables needed by the generator and the paths derived from them
// ABOUTME: Extracts required keys from the flat configuration and lays out the ecf/ tree

use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::vars::{FlatConfig, Result};

/// Variables the generation run reads, pulled out of the flat configuration once.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub exptdir: PathBuf,
    pub parmdir: PathBuf,
    pub homedir: Option<PathBuf>,
    pub net: String,
    pub run: String,
    pub envir: String,
    pub model_ver: String,
    pub opsroot: String,
    pub date_first_cycl: NaiveDateTime,
    pub cpl_aqm: bool,
    pub coldstart: bool,
}

impl Experiment {
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        Ok(Self {
            exptdir: PathBuf::from(config.get_str("EXPTDIR")?),
            parmdir: PathBuf::from(config.get_str("PARMdir")?),
            homedir: config
                .get_opt_str("HOMEdir")?
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            net: config.get_str("NET")?.to_string(),
            run: config.get_str("RUN")?.to_string(),
            envir: config.get_str("envir")?.to_string(),
            model_ver: config.get_str("model_ver")?.to_string(),
            opsroot: config.get_str("OPSROOT")?.to_string(),
            date_first_cycl: config.get_datetime("DATE_FIRST_CYCL")?,
            cpl_aqm: config.flag("CPL_AQM")?,
            coldstart: config.flag("COLDSTART")?,
        })
    }

    /// `<EXPTDIR>/ecf`
    pub fn ecf_dir(&self) -> PathBuf {
        self.exptdir.join("ecf")
    }

    pub fn include_source(&self) -> PathBuf {
        self.parmdir.join("ecflow").join("include")
    }

    pub fn include_dest(&self) -> PathBuf {
        self.ecf_dir().join("include")
    }

    pub fn script_template(&self, group: &str, task: &str) -> PathBuf {
        self.parmdir
            .join("ecflow")
            .join("scripts")
            .join(group)
            .join(script_file_name(task))
    }

    pub fn script_output(&self, group: &str, task: &str) -> PathBuf {
        self.scripts_dir(group).join(script_file_name(task))
    }

    pub fn scripts_dir(&self, group: &str) -> PathBuf {
        self.ecf_dir().join("scripts").join(group)
    }

    pub fn definition_template(&self) -> PathBuf {
        self.parmdir
            .join("ecflow")
            .join("defs")
            .join("ecf_defn_template.def")
    }

    /// `<EXPTDIR>/ecf/defs/<NET>_cycled.def`
    pub fn definition_output(&self) -> PathBuf {
        self.ecf_dir()
            .join("defs")
            .join(format!("{}_cycled.def", self.net))
    }

    pub fn env_template(&self) -> PathBuf {
        self.parmdir.join("ecflow").join("env").join("env_template.sh")
    }

    pub fn env_output(&self) -> PathBuf {
        self.ecf_dir().join("ecf_env.def")
    }

    /// Task document read when none is given on the command line.
    pub fn default_task_document(&self) -> PathBuf {
        self.parmdir.join("ecflow").join("tasks.yaml")
    }

    /// `<OPSROOT>/ecflow`
    pub fn ecf_home(&self) -> String {
        format!("{}/ecflow", self.opsroot)
    }

    /// First cycle day as `YYYYMMDD`
    pub fn pdy(&self) -> String {
        self.date_first_cycl.format("%Y%m%d").to_string()
    }
}

pub fn script_file_name(task: &str) -> String {
    format!("{}.ecf", task)
}
