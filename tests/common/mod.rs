#![allow(dead_code)]

use pipesubmit::dag::Pipeline;
use pipesubmit_test_utils::builders::{JobBuilder, PipelineBuilder, StepBuilder};

pub use pipesubmit_test_utils::init_tracing;

/// Two samples, one readset each, a trim step and an align step that
/// depends on it.
pub fn two_sample_pipeline() -> Pipeline {
    PipelineBuilder::new("DnaSeq")
        .sample("s1")
        .sample("s2")
        .readset("rs1", "s1")
        .readset("rs2", "s2")
        .step(
            StepBuilder::new("trim")
                .job(
                    JobBuilder::new("trimmomatic.rs1", "java -jar trimmomatic.jar rs1")
                        .input("raw/rs1.pair1.fastq.gz")
                        .output("trim/rs1.fastq.gz")
                        .sample("s1"),
                )
                .job(
                    JobBuilder::new("trimmomatic.rs2", "java -jar trimmomatic.jar rs2")
                        .input("raw/rs2.pair1.fastq.gz")
                        .output("trim/rs2.fastq.gz")
                        .sample("s2"),
                ),
        )
        .step(
            StepBuilder::new("align")
                .job(
                    JobBuilder::new("bwa.s1", "bwa mem ref trim/rs1.fastq.gz > s1.sam")
                        .input("trim/rs1.fastq.gz")
                        .output("s1.sam")
                        .after("trim_1_JOB_ID")
                        .sample("s1"),
                )
                .job(
                    JobBuilder::new("bwa.s2", "bwa mem ref trim/rs2.fastq.gz > s2.sam")
                        .input("trim/rs2.fastq.gz")
                        .output("s2.sam")
                        .after("trim_2_JOB_ID")
                        .sample("s2"),
                ),
        )
        .build()
}

/// Lines of `script` that begin with `prefix`.
pub fn lines_starting_with<'a>(script: &'a str, prefix: &str) -> Vec<&'a str> {
    script.lines().filter(|l| l.starts_with(prefix)).collect()
}
