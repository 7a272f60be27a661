// src/resume.rs

//! Decide which jobs a re-run can skip.
//!
//! A job is up to date when:
//! - its done file exists,
//! - every output file exists,
//! - every input file exists and is not newer than the done file.
//!
//! Relative paths resolve under the pipeline output directory, which is
//! where the rendered scripts `cd` before running anything.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;

fn resolve(output_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        output_dir.join(p)
    }
}

pub fn is_up_to_date(
    fs: &dyn FileSystem,
    output_dir: &Path,
    done: &str,
    input_files: &[String],
    output_files: &[String],
) -> bool {
    let done_path = resolve(output_dir, done);
    if !fs.is_file(&done_path) {
        return false;
    }
    let done_time = match fs.modified(&done_path) {
        Ok(t) => t,
        Err(e) => {
            debug!("cannot stat done file: {e:#}");
            return false;
        }
    };

    for output in output_files {
        if !fs.exists(&resolve(output_dir, output)) {
            debug!(output = %output, "output missing");
            return false;
        }
    }

    for input in input_files {
        match fs.modified(&resolve(output_dir, input)) {
            Ok(t) if t <= done_time => {}
            Ok(_) => {
                debug!(input = %input, "input newer than done file");
                return false;
            }
            Err(_) => {
                debug!(input = %input, "input missing");
                return false;
            }
        }
    }

    true
}
