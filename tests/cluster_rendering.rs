mod common;

use pipesubmit::config::{DEFAULT_SECTION, max_jobs};
use pipesubmit::dag::Pipeline;
use pipesubmit::errors::PipesubmitError;
use pipesubmit::scheduler::{ClusterScheduler, Scheduler};
use pipesubmit_test_utils::LogCapture;
use pipesubmit_test_utils::builders::{
    ClusterConfigBuilder, JobBuilder, PipelineBuilder, StepBuilder,
};

use common::{init_tracing, lines_starting_with, two_sample_pipeline};

fn render(config: ClusterConfigBuilder, pipeline: &Pipeline) -> Result<String, PipesubmitError> {
    ClusterScheduler::new(config.build_lookup()).submit(pipeline)
}

fn single_align_job() -> Pipeline {
    PipelineBuilder::new("DnaSeq")
        .step(
            StepBuilder::new("align")
                .job(JobBuilder::new("align.sample1", "bwa mem ref r1.fq").done("/out/align/sample1.done")),
        )
        .build()
}

#[test]
fn test_single_job_without_dependencies() {
    init_tracing();
    let script = render(ClusterConfigBuilder::new(), &single_align_job()).unwrap();

    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("COMMAND=$(cat << 'sample1.done'\nbwa mem ref r1.fq\nsample1.done\n)\n"));
    assert_eq!(lines_starting_with(&script, "JOB_DEPENDENCIES"), vec!["JOB_DEPENDENCIES="]);
    assert_eq!(script.matches(">> $JOB_LIST").count(), 1);
    assert!(script.contains("JOB_DONE=/out/align/sample1.done\n"));
    // no dependency argument without dependencies
    assert!(!script.contains("depend=afterok"));
}

#[test]
fn test_submission_wraps_the_command() {
    let script = render(ClusterConfigBuilder::new(), &single_align_job()).unwrap();

    assert!(script.contains("align_1_JOB_ID=$(echo \"rm -f $JOB_DONE && $COMMAND\n"));
    assert!(script.contains("MUGQIC_PIPE_STATES=(\\${PIPESTATUS[@]})\n"));
    assert!(script.contains("echo MUGQICexitStatus:\\$MUGQIC_STATE\n"));
    assert!(script.contains("if [ \\$MUGQIC_STATE -eq 0 ] ; then\n  touch $JOB_DONE ;\nfi\nexit \\$MUGQIC_STATE\" | \\\n"));
    assert!(script.contains(
        "qsub -m ae -M $JOB_MAIL -d $OUTPUT_DIR -j oe -o $JOB_OUTPUT -N $JOB_NAME -l walltime=24:00:00 -q sw -l nodes=1:ppn=1 | grep \"[0-9]\")"
    ));
    assert!(script.contains("echo \"$align_1_JOB_ID\t$JOB_NAME\t$JOB_DEPENDENCIES\t$JOB_OUTPUT_RELATIVE_PATH\" >> $JOB_LIST"));
}

#[test]
fn test_dependencies_are_chunked_fifty_per_line() {
    let mut upstream = StepBuilder::new("split");
    let mut merge = JobBuilder::new("merge.all", "cat parts/* > all");
    for i in 1..=150 {
        upstream = upstream.job(JobBuilder::new(&format!("split.part{i}"), &format!("split {i}")));
        merge = merge.after(&format!("split_{i}_JOB_ID"));
    }
    let pipeline = PipelineBuilder::new("Big")
        .step(upstream)
        .step(StepBuilder::new("merge").job(merge))
        .build();

    let script = render(ClusterConfigBuilder::new(), &pipeline).unwrap();
    let merge_block = script.split("# JOB: merge_1_JOB_ID").nth(1).unwrap();
    let assignments = lines_starting_with(merge_block, "JOB_DEPENDENCIES=");

    assert_eq!(assignments.len(), 3);
    assert!(assignments[0].starts_with("JOB_DEPENDENCIES=$split_1_JOB_ID:"));
    assert!(assignments[0].ends_with(":$split_50_JOB_ID"));
    assert!(assignments[1].starts_with("JOB_DEPENDENCIES=$JOB_DEPENDENCIES:$split_51_JOB_ID:"));
    assert!(assignments[2].ends_with(":$split_150_JOB_ID"));
    assert!(merge_block.contains(" -W depend=afterok:$JOB_DEPENDENCIES | grep"));
}

#[test]
fn test_job_id_capture_follows_config() {
    let pipeline = single_align_job();

    let captured = render(ClusterConfigBuilder::new(), &pipeline).unwrap();
    assert!(captured.contains("align_1_JOB_ID=$(echo "));

    let named = render(
        ClusterConfigBuilder::new().set(DEFAULT_SECTION, "cluster_cmd_produces_job_id", false),
        &pipeline,
    )
    .unwrap();
    assert!(!named.contains("align_1_JOB_ID=$("));
    assert!(named.contains("\nalign_1_JOB_ID=align.sample1\n"));
}

#[test]
fn test_name_collision_is_rejected_when_ids_are_names() {
    let pipeline = PipelineBuilder::new("Dup")
        .step(StepBuilder::new("a").job(JobBuilder::new("tool.s1", "run 1")))
        .step(StepBuilder::new("b").job(JobBuilder::new("tool.s1", "run 2")))
        .build();

    let err = render(
        ClusterConfigBuilder::new().set("tool", "cluster_cmd_produces_job_id", "no"),
        &pipeline,
    )
    .unwrap_err();
    assert!(matches!(err, PipesubmitError::NameCollision(_)), "got {err:?}");

    // queue ids keep duplicate names apart
    assert!(render(ClusterConfigBuilder::new(), &pipeline).is_ok());
}

#[test]
fn test_family_sections_override_default() {
    let config = ClusterConfigBuilder::new()
        .set("bwa", "cluster_cpu", "-l nodes=1:ppn=12")
        .set("bwa", "cluster_queue", "-q lm");
    let script = render(config, &two_sample_pipeline()).unwrap();

    let bwa_block = script.split("# JOB: align_1_JOB_ID").nth(1).unwrap();
    assert!(bwa_block.contains("-q lm -l nodes=1:ppn=12"));
    let trim_block = script
        .split("# JOB: trim_1_JOB_ID")
        .nth(1)
        .and_then(|b| b.split("# JOB: trim_2_JOB_ID").next())
        .unwrap();
    assert!(trim_block.contains("-q sw -l nodes=1:ppn=1"));
}

#[test]
fn test_missing_parameter_aborts_rendering() {
    let err = render(ClusterConfigBuilder::empty(), &single_align_job()).unwrap_err();
    match err {
        PipesubmitError::MissingParam { section, key } => {
            assert_eq!(section, "align");
            assert_eq!(key, "cluster_submit_cmd");
        }
        other => panic!("Expected MissingParam, got: {other:?}"),
    }
}

#[test]
fn test_metadata_export_for_jobs_with_samples() {
    let script = render(ClusterConfigBuilder::new(), &two_sample_pipeline()).unwrap();
    let block = script.split("# JOB: align_2_JOB_ID").nth(1).unwrap();

    // line continuations are escaped once more for the echo
    assert!(block.contains("\\$MUGQIC_PIPELINES_HOME/utils/job2json.py \\\\\n"));
    assert!(block.contains("  -s \\\"align\\\" \\\\\n"));
    assert!(block.contains("  -n \\\"$JOB_NAME\\\" \\\\\n"));
    assert!(block.contains("  -j \\\"/out/json/s2/s2.json\\\" \\\\\n"));
    assert!(block.contains("  -g \\\"\\$MUGQIC_STATE\\\" \\\\\n  -d trim_2_JOB_ID ;\n"));

    // jobs without samples export nothing
    let plain = render(ClusterConfigBuilder::new(), &single_align_job()).unwrap();
    assert!(!plain.contains("job2json"));
}

#[test]
fn test_max_jobs_only_warns() {
    let pipeline = two_sample_pipeline();
    let unlimited = render(ClusterConfigBuilder::new(), &pipeline).unwrap();

    let config = ClusterConfigBuilder::new().set(DEFAULT_SECTION, "cluster_max_jobs", 1i64);
    let lookup = config.build_lookup();
    assert_eq!(max_jobs(lookup.as_ref()).unwrap(), Some(1));

    let logs = LogCapture::new();
    let limited = logs
        .capture(|| ClusterScheduler::new(lookup).submit(&pipeline))
        .unwrap();

    assert_eq!(unlimited, limited);
    let logged = logs.contents();
    assert!(logged.contains("WARN"), "logs: {logged}");
    assert!(logged.contains("Number of jobs: 4 > Cluster maximum number of jobs: 1!"));

    // no warning under the ceiling
    let quiet = LogCapture::new();
    quiet
        .capture(|| render(ClusterConfigBuilder::new(), &pipeline))
        .unwrap();
    assert!(!quiet.contents().contains("Cluster maximum number of jobs"));
}

#[test]
fn test_rendering_is_deterministic() {
    let pipeline = two_sample_pipeline();
    let scheduler = ClusterScheduler::new(ClusterConfigBuilder::new().build_lookup());
    assert_eq!(scheduler.submit(&pipeline).unwrap(), scheduler.submit(&pipeline).unwrap());
}
