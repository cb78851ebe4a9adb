use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::{Config, MANIFEST_NAME};
use crate::download::is_temp_name;

/// Removes the listed files when dropped.
struct Scratch {
    paths: Vec<PathBuf>,
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Concatenate `temp_files` in order into `output` with the configured tool.
///
/// Every temp file and the manifest are deleted before this returns, whether
/// the merge worked or not.
pub async fn merge_videos(temp_files: Vec<PathBuf>, output: &Path, config: &Config) -> Result<()> {
    let manifest = config.work_dir.join(MANIFEST_NAME);

    let mut scratch = Scratch {
        paths: temp_files.clone(),
    };
    scratch.paths.push(manifest.clone());

    check_output(output, config)?;
    if temp_files.is_empty() {
        bail!("No videos were downloaded, nothing to merge");
    }

    info!("Merging {} videos...", temp_files.len());
    write_manifest(&manifest, &temp_files, &config.work_dir).await?;
    run_concat(&config.concat_tool, &manifest, output).await?;

    drop(scratch);
    Ok(())
}

/// Reject an output path that names one of the run's scratch files, which
/// cleanup would delete after the merge.
pub fn check_output(output: &Path, config: &Config) -> Result<()> {
    let Some(name) = output.file_name().and_then(|n| n.to_str()) else {
        bail!("Output path {} has no file name", output.display());
    };
    if name != MANIFEST_NAME && !is_temp_name(name) {
        return Ok(());
    }

    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let same_dir = match (parent.canonicalize(), config.work_dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => parent == config.work_dir,
    };
    if same_dir {
        bail!(
            "Output {} clashes with a temporary file of the merge; choose another name",
            output.display()
        );
    }
    Ok(())
}

/// Manifest body in ffmpeg concat demuxer format, one `file` line per clip.
///
/// Paths inside `work_dir` are written relative to it, since ffmpeg resolves
/// entries against the manifest's own directory.
pub fn manifest_body(temp_files: &[PathBuf], work_dir: &Path) -> String {
    temp_files
        .iter()
        .map(|path| {
            let entry = path.strip_prefix(work_dir).unwrap_or(path);
            format!("file '{}'\n", entry.to_string_lossy().replace('\'', r"'\''"))
        })
        .collect()
}

async fn write_manifest(manifest: &Path, temp_files: &[PathBuf], work_dir: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(manifest)
        .await
        .with_context(|| format!("Failed to create manifest {}", manifest.display()))?;
    file.write_all(manifest_body(temp_files, work_dir).as_bytes())
        .await
        .with_context(|| format!("Failed to write manifest {}", manifest.display()))?;
    file.flush().await?;
    Ok(())
}

async fn run_concat(tool: &Path, manifest: &Path, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let result = tokio::process::Command::new(tool)
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(manifest)
        .args(["-c", "copy"])
        .arg(output)
        .arg("-y")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to run {}", tool.display()))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let reason = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or("no error output");
        return Err(anyhow!(
            "{} exited with {}: {}",
            tool.display(),
            result.status,
            reason
        ));
    }

    Ok(())
}

/// True when `tool -version` runs and exits successfully.
pub async fn is_tool_available(tool: &Path) -> bool {
    tokio::process::Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
