// src/scheduler/cluster.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ClusterOptions, ConfigLookup, max_jobs};
use crate::dag::{Job, Pipeline, Step};
use crate::errors::{PipesubmitError, Result};
use crate::scheduler::Scheduler;
use crate::scheduler::render::{
    self, EchoBody, Script, command_heredoc, dependency_assignments, escape_double_quoted,
    exit_status_line, job_banner, shell_word, status_capture_lines, step_banner,
};

/// Location of the metadata exporter, expanded on the compute node.
const JOB2JSON: &str = "$MUGQIC_PIPELINES_HOME/utils/job2json.py";

/// Renders a script that submits every job to a batch queue (PBS-style).
///
/// Each job is echoed into the family's submit command; dependencies travel
/// as `cluster_dependency_arg$JOB_DEPENDENCIES`, and the id each submission
/// yields is kept in a shell variable named after the job id so later jobs
/// can refer to it.
#[derive(Debug, Clone)]
pub struct ClusterScheduler {
    config: Arc<dyn ConfigLookup>,
}

impl ClusterScheduler {
    pub fn new(config: Arc<dyn ConfigLookup>) -> Self {
        Self { config }
    }

    /// Resolve cluster options once per family used by the pipeline.
    fn resolve_families<'p>(
        &self,
        pipeline: &'p Pipeline,
    ) -> Result<BTreeMap<&'p str, ClusterOptions>> {
        let mut options = BTreeMap::new();
        for job in pipeline.jobs() {
            let family = job.family();
            if !options.contains_key(family) {
                options.insert(family, ClusterOptions::resolve(self.config.as_ref(), family)?);
            }
        }
        Ok(options)
    }

    /// Jobs whose family does not print a queue id are referenced by name;
    /// two such jobs with one name would make their dependents ambiguous.
    fn check_name_identifiers(
        pipeline: &Pipeline,
        options: &BTreeMap<&str, ClusterOptions>,
    ) -> Result<()> {
        let mut seen: HashMap<&str, &Job> = HashMap::new();
        for job in pipeline.jobs() {
            if options[job.family()].produces_job_id {
                continue;
            }
            if let Some(first) = seen.insert(job.name.as_str(), job) {
                return Err(PipesubmitError::NameCollision(format!(
                    "jobs {} and {} are both named '{}' and their family does not produce queue job ids",
                    first.id, job.id, job.name
                )));
            }
        }
        Ok(())
    }

    fn job_block(&self, pipeline: &Pipeline, step: &Step, job: &Job, opts: &ClusterOptions) -> Script {
        let mut script = job_banner(&format!("{}: {}", job.id, job.name));
        script.line(format!("JOB_NAME={}", shell_word(&job.name)));
        for assignment in dependency_assignments(&job.dependencies) {
            script.line(assignment);
        }
        script
            .line(format!("JOB_DONE={}", shell_word(&job.done)))
            .line("JOB_OUTPUT_RELATIVE_PATH=$STEP/${JOB_NAME}_$TIMESTAMP.o")
            .line("JOB_OUTPUT=$JOB_OUTPUT_DIR/$JOB_OUTPUT_RELATIVE_PATH")
            .append(command_heredoc(&job.done, &job.command));

        let body = wrapped_command(pipeline, step, job);
        let submission = format!("echo \"{}\" | \\\n{}", body.render(), submit_line(job, opts));

        if opts.produces_job_id {
            script.line(format!("{}=$({})", job.id, submission));
        } else {
            script
                .line(submission)
                .line(format!("{}={}", job.id, shell_word(&job.name)));
        }

        script.line(format!(
            "echo \"${}\t$JOB_NAME\t$JOB_DEPENDENCIES\t$JOB_OUTPUT_RELATIVE_PATH\" >> $JOB_LIST",
            job.id
        ));
        script
    }
}

/// The script the queue runs for `job`: clear the sentinel, run, record
/// status, export metadata, recreate the sentinel on success.
fn wrapped_command(pipeline: &Pipeline, step: &Step, job: &Job) -> EchoBody {
    let mut body = EchoBody::new();
    body.text("rm -f ").var("JOB_DONE").text(" && ").var("COMMAND").text("\n");
    for line in status_capture_lines() {
        body.text(line).text("\n");
    }
    body.text(exit_status_line()).text("\n");

    if !job.samples.is_empty() {
        push_metadata_export(&mut body, pipeline, step, job);
    }

    body.text("if [ $MUGQIC_STATE -eq 0 ] ; then\n  touch ")
        .var("JOB_DONE")
        .text(" ;\nfi\nexit $MUGQIC_STATE");
    body
}

/// job2json invocation for jobs that report on samples.
fn push_metadata_export(body: &mut EchoBody, pipeline: &Pipeline, step: &Step, job: &Job) {
    let json_files = job
        .samples
        .iter()
        .filter_map(|name| pipeline.sample(name))
        .map(|sample| {
            format!(
                "{}/json/{}/{}",
                pipeline.output_dir().trim_end_matches('/'),
                sample.name,
                sample.json_file()
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    let quoted = |s: &str| format!("\"{}\"", escape_double_quoted(s));

    body.text(format!("{JOB2JSON} \\\n"))
        .text(format!("  -s {} \\\n", quoted(&step.name)))
        .text("  -n \"")
        .var("JOB_NAME")
        .text("\" \\\n")
        .text(format!("  -i {} \\\n", quoted(job.id.as_str())))
        .text(format!("  -c {} \\\n", quoted(&job.command)))
        .text(format!("  -f {} \\\n", quoted(&job.input_files.join(","))))
        .text(format!("  -o {} \\\n", quoted(&job.output_files.join(","))))
        .text("  -b \"")
        .var("JOB_DONE")
        .text("\" \\\n")
        .text("  -l \"")
        .var("JOB_OUTPUT")
        .text("\" \\\n")
        .text(format!("  -j {} \\\n", quoted(&json_files)))
        .text("  -g \"$MUGQIC_STATE\"");
    if !job.dependencies.is_empty() {
        let ids = job
            .dependencies
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        body.text(format!(" \\\n  -d {ids}"));
    }
    body.text(" ;\n");
}

/// Submit command for one job, from its family's options.
fn submit_line(job: &Job, opts: &ClusterOptions) -> String {
    let mut parts: Vec<String> = vec![
        opts.submit_cmd.clone(),
        opts.other_arg.clone(),
        format!("{} $OUTPUT_DIR", opts.work_dir_arg),
        format!("{} $JOB_OUTPUT", opts.output_dir_arg),
        format!("{} $JOB_NAME", opts.job_name_arg),
        opts.walltime.clone(),
        opts.queue.clone(),
        opts.cpu.clone(),
    ];
    if !job.dependencies.is_empty() {
        parts.push(format!("{}$JOB_DEPENDENCIES", opts.dependency_arg));
    }
    parts.push(opts.submit_cmd_suffix.clone());

    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Scheduler for ClusterScheduler {
    fn name(&self) -> &'static str {
        "ClusterScheduler"
    }

    fn submit(&self, pipeline: &Pipeline) -> Result<String> {
        let options = self.resolve_families(pipeline)?;
        Self::check_name_identifiers(pipeline, &options)?;
        let max_jobs = max_jobs(self.config.as_ref())?;

        let mut script = render::header(pipeline, self.name());
        for step in pipeline.steps().iter().filter(|s| !s.is_skipped()) {
            script.append(step_banner(step));
            for job in &step.jobs {
                debug!(job = %job.name, id = %job.id, deps = job.dependencies.len(), "rendering cluster job");
                script.append(self.job_block(pipeline, step, job, &options[job.family()]));
            }
        }

        if let Some(max) = max_jobs {
            let count = pipeline.job_count() as u64;
            if count > max {
                warn!(
                    "Number of jobs: {} > Cluster maximum number of jobs: {}!",
                    count, max
                );
            }
        }

        Ok(script.finish())
    }
}
