// src/scheduler/render.rs

//! Text fragments shared by the script backends.
//!
//! Every rule about how shell text is produced lives here: banners,
//! pluralization, quoting, dependency chunking, heredoc boundaries, exit
//! status capture and escaping of text echoed into a submit command.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::dag::{JobId, Pipeline, Step};

/// `#` followed by 79 dashes.
pub const SEPARATOR_LINE: &str =
    "#-------------------------------------------------------------------------------";

/// Prefix of the machine-readable status line every job wrapper echoes.
pub const EXIT_STATUS_PREFIX: &str = "MUGQICexitStatus:";

/// Dependency ids per `JOB_DEPENDENCIES` assignment; queue clients reject
/// very long argument lines.
pub const MAX_DEPENDENCIES_PER_LINE: usize = 50;

/// Separator between dependency ids in `JOB_DEPENDENCIES`.
pub const DEPENDENCY_SEPARATOR: &str = ":";

static SAFE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("static regex"));

static UNSAFE_TOKEN_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"));

/// Line-oriented text buffer the backends render into.
#[derive(Debug, Default)]
pub struct Script {
    buf: String,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(line.as_ref());
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Append already line-terminated text.
    pub fn append(&mut self, other: Script) -> &mut Self {
        self.buf.push_str(&other.buf);
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// `"1 job"`, `"0 jobs"`, `"12 jobs"`.
pub fn job_count(count: usize) -> String {
    if count == 1 {
        "1 job".to_string()
    } else {
        format!("{count} jobs")
    }
}

fn count_summary(label: &str, count: usize) -> String {
    let skip = if count == 0 { "... skipping" } else { "" };
    format!("#   {label}: {}{skip}", job_count(count))
}

/// Quote `word` for the shell unless it is made only of safe characters.
pub fn shell_word(word: &str) -> Cow<'_, str> {
    if SAFE_WORD.is_match(word) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

/// Escape text so it survives one level of double-quoted shell expansion.
pub fn escape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Shebang, strict mode and the pipeline banner; plus the output variables
/// when the pipeline has jobs.
pub fn header(pipeline: &Pipeline, scheduler_name: &str) -> Script {
    let meta = pipeline.meta();
    let mut script = Script::new();
    script
        .line("#!/bin/bash")
        .line("# Exit immediately on error")
        .line("set -eu -o pipefail")
        .blank()
        .line(SEPARATOR_LINE)
        .line(format!(
            "# {} {} Job Submission Bash script",
            meta.name, scheduler_name
        ))
        .line(format!("# Version: {}", meta.version))
        .line(format!("# Created on: {}", meta.timestamp))
        .line("# Steps:");
    for step in pipeline.steps() {
        script.line(count_summary(&step.name, step.jobs.len()));
    }
    script
        .line(count_summary("TOTAL", pipeline.job_count()))
        .line(SEPARATOR_LINE);

    if pipeline.has_jobs() {
        script
            .blank()
            .line(format!("OUTPUT_DIR={}", shell_word(&meta.output_dir)))
            .line("JOB_OUTPUT_DIR=$OUTPUT_DIR/job_output")
            .line("TIMESTAMP=`date +%FT%H.%M.%S`")
            .line(format!(
                "JOB_LIST=$JOB_OUTPUT_DIR/{}_job_list_$TIMESTAMP",
                shell_word(&meta.name)
            ))
            .line("mkdir -p $OUTPUT_DIR")
            .line("cd $OUTPUT_DIR");
    }
    script
}

/// Banner and `STEP` variable for a non-empty step.
pub fn step_banner(step: &Step) -> Script {
    let mut script = Script::new();
    script
        .blank()
        .line(SEPARATOR_LINE)
        .line(format!("# STEP: {}", step.name))
        .line(SEPARATOR_LINE)
        .line(format!("STEP={}", shell_word(&step.name)))
        .line("mkdir -p $JOB_OUTPUT_DIR/$STEP");
    script
}

/// Comment banner opening one job block.
pub fn job_banner(title: &str) -> Script {
    let mut script = Script::new();
    script
        .blank()
        .line(SEPARATOR_LINE)
        .line(format!("# JOB: {title}"))
        .line(SEPARATOR_LINE);
    script
}

/// `JOB_DEPENDENCIES` assignments, at most [`MAX_DEPENDENCIES_PER_LINE`] ids
/// per line, later lines extending the variable.
pub fn dependency_assignments(deps: &[JobId]) -> Vec<String> {
    if deps.is_empty() {
        return vec!["JOB_DEPENDENCIES=".to_string()];
    }

    deps.chunks(MAX_DEPENDENCIES_PER_LINE)
        .enumerate()
        .map(|(i, chunk)| {
            let ids = chunk
                .iter()
                .map(|id| format!("${id}"))
                .collect::<Vec<_>>()
                .join(DEPENDENCY_SEPARATOR);
            if i == 0 {
                format!("JOB_DEPENDENCIES={ids}")
            } else {
                format!("JOB_DEPENDENCIES=$JOB_DEPENDENCIES{DEPENDENCY_SEPARATOR}{ids}")
            }
        })
        .collect()
}

/// Heredoc delimiter for a job's command: the sentinel's base name, made of
/// safe characters only, extended until no command line equals it.
pub fn heredoc_boundary(done: &str, command: &str) -> String {
    let base = Path::new(done)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut token = UNSAFE_TOKEN_CHAR.replace_all(&base, "_").into_owned();
    if token.is_empty() {
        token = "END_OF_COMMAND".to_string();
    }
    while command.lines().any(|line| line == token) {
        token.push_str("_EOF");
    }
    token
}

/// `COMMAND=$(cat << 'TOKEN' ... TOKEN)` holding the command verbatim.
pub fn command_heredoc(done: &str, command: &str) -> Script {
    let boundary = heredoc_boundary(done, command);
    let mut script = Script::new();
    script
        .line(format!("COMMAND=$(cat << '{boundary}'"))
        .line(command.trim_end_matches('\n'))
        .line(&boundary)
        .line(")");
    script
}

/// Lines that set `MUGQIC_STATE` to the status of the first failing stage of
/// the pipe that just ran (0 when every stage succeeded).
///
/// Must directly follow the command: any other command resets `PIPESTATUS`.
pub fn status_capture_lines() -> [&'static str; 3] {
    [
        "MUGQIC_PIPE_STATES=(${PIPESTATUS[@]})",
        "MUGQIC_STATE=0",
        "for MUGQIC_STAGE_STATE in ${MUGQIC_PIPE_STATES[@]} ; do if [ $MUGQIC_STAGE_STATE -ne 0 ] ; then MUGQIC_STATE=$MUGQIC_STAGE_STATE ; break ; fi ; done",
    ]
}

/// The exit status echo, as the job shell sees it.
pub fn exit_status_line() -> String {
    format!("echo {EXIT_STATUS_PREFIX}$MUGQIC_STATE")
}

/// Piece of a script that is echoed into a submit command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoPart {
    /// Text the job shell must see verbatim; escaped when rendered.
    JobText(String),
    /// Variable of the submitting script, expanded at submission time.
    SubmitVar(&'static str),
}

/// Accumulates a job script that is passed to the queue through
/// `echo "..." | submit`.
#[derive(Debug, Default)]
pub struct EchoBody {
    parts: Vec<EchoPart>,
}

impl EchoBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.parts.push(EchoPart::JobText(text.into()));
        self
    }

    pub fn var(&mut self, name: &'static str) -> &mut Self {
        self.parts.push(EchoPart::SubmitVar(name));
        self
    }

    /// Render the body for use inside double quotes.
    pub fn render(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                EchoPart::JobText(text) => escape_double_quoted(text),
                EchoPart::SubmitVar(name) => format!("${name}"),
            })
            .collect()
    }
}
