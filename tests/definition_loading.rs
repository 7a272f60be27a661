// tests/definition_loading.rs

use std::time::{Duration, SystemTime};

use pipesubmit::definition::{BuildOptions, build_pipeline, load_definition};
use pipesubmit::errors::PipesubmitError;
use pipesubmit::fs::RealFileSystem;
use pipesubmit::fs::mock::MockFileSystem;
use pipesubmit_test_utils::write_file;
use tempfile::TempDir;

const DNASEQ: &str = r#"
[pipeline]
name = "DnaSeq"
version = "2.1"
output_dir = "/scratch/dnaseq"

[[sample]]
name = "s1"

[[readset]]
name = "rs1"
sample = "s1"
run_type = "PAIRED_END"
fastq1 = "raw/rs1.pair1.fastq.gz"
fastq2 = "raw/rs1.pair2.fastq.gz"

[[step]]
name = "trimmomatic"

[[step.job]]
name = "trimmomatic.rs1"
command = "java -jar trimmomatic.jar raw/rs1.pair1.fastq.gz trim/rs1.fastq.gz"
modules = ["mugqic/java/openjdk-jdk1.7.0_60", "mugqic/trimmomatic/0.32"]
input_files = ["raw/rs1.pair1.fastq.gz"]
output_files = ["trim/rs1.fastq.gz"]
samples = ["s1"]

[[step]]
name = "bwa_mem"

[[step.job]]
name = "bwa_mem.rs1"
command = "bwa mem ref trim/rs1.fastq.gz > align/rs1.sam"
input_files = ["trim/rs1.fastq.gz"]
output_files = ["align/rs1.sam"]
samples = ["s1"]

[[step]]
name = "metrics"

[[step.job]]
name = "metrics.s1"
command = "samtools flagstat align/rs1.sam"
after = ["bwa_mem.rs1"]
done = "job_output/metrics/metrics.s1.done"
"#;

fn dnaseq(dir: &TempDir) -> std::path::PathBuf {
    write_file(dir.path(), "dnaseq.toml", DNASEQ)
}

#[test]
fn test_definition_builds_a_pipeline() {
    let dir = TempDir::new().unwrap();
    let def = load_definition(dnaseq(&dir)).unwrap();
    let pipeline = build_pipeline(def, &BuildOptions::default(), &MockFileSystem::new()).unwrap();

    assert_eq!(pipeline.name(), "DnaSeq");
    assert_eq!(pipeline.meta().version, "2.1");
    assert_eq!(pipeline.readsets_of("s1").count(), 1);

    let jobs: Vec<_> = pipeline.jobs().collect();
    assert_eq!(jobs.len(), 3);
    assert!(jobs[0].command.starts_with(
        "module load mugqic/java/openjdk-jdk1.7.0_60 mugqic/trimmomatic/0.32 && \\\njava -jar"
    ));
    assert!(jobs[0].done.starts_with("job_output/trimmomatic/trimmomatic.rs1."));
    assert_eq!(jobs[1].dependencies[0].as_str(), "trimmomatic_1_JOB_ID");
    assert_eq!(jobs[2].dependencies[0].as_str(), "bwa_mem_1_JOB_ID");
    assert_eq!(jobs[2].done, "job_output/metrics/metrics.s1.done");
}

#[test]
fn test_dependency_cycle_returns_structured_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "cycle.toml",
        r#"
[pipeline]
name = "Cycle"
output_dir = "/out"

[[step]]
name = "s"

[[step.job]]
name = "a.x"
command = "echo a"
after = ["b.x"]

[[step.job]]
name = "b.x"
command = "echo b"
after = ["a.x"]
"#,
    );
    let def = load_definition(path).unwrap();
    match build_pipeline(def, &BuildOptions::default(), &MockFileSystem::new()) {
        Err(PipesubmitError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("a.x") || msg.contains("b.x"));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_job_not_found() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "unknown.toml",
        r#"
[pipeline]
name = "Unknown"
output_dir = "/out"

[[step]]
name = "s"

[[step.job]]
name = "a.x"
command = "echo a"
after = ["ghost"]
"#,
    );
    let def = load_definition(path).unwrap();
    let err = build_pipeline(def, &BuildOptions::default(), &MockFileSystem::new()).unwrap_err();
    assert!(matches!(err, PipesubmitError::JobNotFound(ref m) if m.contains("ghost")), "got {err:?}");
}

#[test]
fn test_composite_jobs_are_expanded() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "composite.toml",
        r#"
[pipeline]
name = "Composite"
output_dir = "/out"

[[sample]]
name = "s1"

[[step]]
name = "trim"

[[step.job]]
name = "trim.s1"
command = "trim r1.fq > t1.fq"
input_files = ["r1.fq"]
output_files = ["t1.fq"]

[[step]]
name = "bwa_mem_sort"

[[step.job]]
name = "bwa_mem_sort.s1"
samples = ["s1"]

[[step.job.pipe]]
command = "bwa mem ref t1.fq"
modules = ["mugqic/bwa/0.7.10"]
input_files = ["t1.fq"]

[[step.job.pipe]]
command = "samtools sort -o s1.bam -"
modules = ["mugqic/samtools/1.3"]
output_files = ["s1.bam"]
"#,
    );
    let def = load_definition(path).unwrap();
    let pipeline = build_pipeline(def, &BuildOptions::default(), &MockFileSystem::new()).unwrap();

    let job = &pipeline.steps()[1].jobs[0];
    assert_eq!(job.name, "bwa_mem_sort.s1");
    assert_eq!(
        job.command,
        "module load mugqic/bwa/0.7.10 mugqic/samtools/1.3 && \\\nbwa mem ref t1.fq | \\\nsamtools sort -o s1.bam -"
    );
    assert_eq!(job.input_files, vec!["t1.fq"]);
    assert_eq!(job.output_files, vec!["s1.bam"]);
    assert_eq!(job.samples, vec!["s1"]);
    // the first part's input is produced by trim.s1
    assert_eq!(job.dependencies[0].as_str(), "trim_1_JOB_ID");
}

#[test]
fn test_job_without_command_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "empty.toml",
        "[pipeline]\nname = \"x\"\noutput_dir = \"/o\"\n\n[[step]]\nname = \"s\"\n\n[[step.job]]\nname = \"a.x\"\n",
    );
    let def = load_definition(path).unwrap();
    assert!(matches!(
        build_pipeline(def, &BuildOptions::default(), &MockFileSystem::new()),
        Err(PipesubmitError::InvalidPipeline(ref m)) if m.contains("no command")
    ));
}

#[test]
fn test_unknown_run_type_is_a_toml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "bad.toml",
        "[pipeline]\nname = \"x\"\noutput_dir = \"/o\"\n\n[[readset]]\nname = \"r\"\nsample = \"s\"\nrun_type = \"MATE_PAIR\"\n",
    );
    assert!(matches!(load_definition(path), Err(PipesubmitError::TomlError(_))));
}

#[test]
fn test_step_range_selects_steps() {
    let dir = TempDir::new().unwrap();
    let def = load_definition(dnaseq(&dir)).unwrap();
    let opts = BuildOptions {
        step_range: Some("2,3".to_string()),
        ..BuildOptions::default()
    };
    let pipeline = build_pipeline(def, &opts, &MockFileSystem::new()).unwrap();

    let steps: Vec<&str> = pipeline.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(steps, vec!["bwa_mem", "metrics"]);
    // trimmomatic is not part of this run, so bwa_mem waits for nothing
    assert!(pipeline.steps()[0].jobs[0].dependencies.is_empty());

    let def = load_definition(dnaseq(&dir)).unwrap();
    let bad = BuildOptions {
        step_range: Some("4".to_string()),
        ..BuildOptions::default()
    };
    assert!(matches!(
        build_pipeline(def, &bad, &MockFileSystem::new()),
        Err(PipesubmitError::StepRange(_))
    ));
}

#[test]
fn test_up_to_date_jobs_are_skipped_on_disk() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("raw")).unwrap();
    std::fs::create_dir_all(out.join("trim")).unwrap();
    std::fs::create_dir_all(out.join("job_output/trimmomatic")).unwrap();

    let def = load_definition(dnaseq(&dir)).unwrap();
    let done = pipesubmit::definition::default_done_path("trimmomatic", &def.steps[0].jobs[0]);

    let input = write_file(&out, "raw/rs1.pair1.fastq.gz", "reads");
    write_file(&out, "trim/rs1.fastq.gz", "trimmed");
    let done_file = write_file(&out, &done, "");
    // done strictly after the input
    let earlier = SystemTime::now() - Duration::from_secs(60);
    std::fs::File::options()
        .write(true)
        .open(&input)
        .unwrap()
        .set_modified(earlier)
        .unwrap();
    assert!(done_file.exists());

    let opts = BuildOptions {
        output_dir: Some(out.to_str().unwrap().to_string()),
        ..BuildOptions::default()
    };
    let pipeline = build_pipeline(def, &opts, &RealFileSystem).unwrap();
    assert!(pipeline.steps()[0].is_skipped());
    assert_eq!(pipeline.job_count(), 2);

    // touching the input invalidates the done file
    std::fs::File::options()
        .write(true)
        .open(&input)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
    let def = load_definition(dnaseq(&dir)).unwrap();
    let pipeline = build_pipeline(def, &opts, &RealFileSystem).unwrap();
    assert_eq!(pipeline.job_count(), 3);
}
