// ABOUTME: Per-task scheduler resources derived from a task descriptor
// ABOUTME: Applies the thread default, computes ncpus, and builds the PBS select string

use serde::Serialize;

use super::error::{GenerateError, Result};
use crate::parser::TaskDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResources {
    pub nnodes: u32,
    pub ppn: u32,
    pub threads: u32,
    /// Always `threads * ppn`.
    pub ncpus: u32,
    pub walltime: String,
    pub memory: String,
    pub select: String,
}

impl TaskResources {
    pub fn compute(task: &str, descriptor: &TaskDescriptor, default_threads: u32) -> Result<Self> {
        let threads = descriptor.threads.unwrap_or(default_threads);
        let ncpus = threads
            .checked_mul(descriptor.ppn)
            .ok_or_else(|| GenerateError::ResourceOverflow {
                task: task.to_string(),
                ppn: descriptor.ppn,
                threads,
            })?;
        let select = format!(
            "{}:mpiprocs={}:ompthreads={}:ncpus={}:mem={}",
            descriptor.nnodes, descriptor.ppn, threads, ncpus, descriptor.memory
        );

        Ok(Self {
            nnodes: descriptor.nnodes,
            ppn: descriptor.ppn,
            threads,
            ncpus,
            walltime: descriptor.walltime.clone(),
            memory: descriptor.memory.clone(),
            select,
        })
    }
}
