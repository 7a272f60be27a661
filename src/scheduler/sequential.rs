// src/scheduler/sequential.rs

use tracing::debug;

use crate::dag::{Job, Pipeline};
use crate::errors::Result;
use crate::scheduler::Scheduler;
use crate::scheduler::render::{
    self, Script, exit_status_line, job_banner, shell_word, status_capture_lines, step_banner,
};

/// Renders a bash script that runs every job, in pipeline order, on the
/// current host.
///
/// There is no queue to order jobs, so the pipeline order must already be
/// topological; a failing job stops the whole script.
#[derive(Debug, Clone, Default)]
pub struct SequentialScheduler;

impl SequentialScheduler {
    pub fn new() -> Self {
        Self
    }

    fn job_block(job: &Job) -> Script {
        let mut script = job_banner(&job.name);
        script
            .line(format!("JOB_NAME={}", shell_word(&job.name)))
            .line(format!("JOB_DONE={}", shell_word(&job.done)))
            .line(r#"printf "\n$SEPARATOR_LINE\n""#)
            .line(r#"echo "Begin MUGQIC Job $JOB_NAME at `date +%FT%H:%M:%S`""#)
            .line("rm -f $JOB_DONE")
            // The command runs in a subshell that stops at its first failing
            // statement; the outer script must survive long enough to echo
            // the status.
            .line("set +e")
            .line("(")
            .line("set -eu -o pipefail")
            .line(job.command.trim_end_matches('\n'))
            .line(")");
        for line in status_capture_lines() {
            script.line(line);
        }
        script
            .line("set -e")
            .line(r#"echo "End MUGQIC Job $JOB_NAME at `date +%FT%H:%M:%S`""#)
            .line(exit_status_line())
            .line("if [ $MUGQIC_STATE -eq 0 ] ; then touch $JOB_DONE ; else exit $MUGQIC_STATE ; fi");
        script
    }
}

impl Scheduler for SequentialScheduler {
    fn name(&self) -> &'static str {
        "SequentialScheduler"
    }

    fn submit(&self, pipeline: &Pipeline) -> Result<String> {
        let mut script = render::header(pipeline, self.name());
        if pipeline.has_jobs() {
            script.line("SEPARATOR_LINE=`seq -s - 80 | sed 's/[0-9]//g'`");
        }
        for step in pipeline.steps().iter().filter(|s| !s.is_skipped()) {
            script.append(step_banner(step));
            for job in &step.jobs {
                debug!(job = %job.name, "rendering sequential job");
                script.append(Self::job_block(job));
            }
        }
        Ok(script.finish())
    }
}
