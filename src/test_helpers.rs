//! Shared fixtures for tests: stand-in concat tools, temp media files and
//! captured log output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;

use crate::download::temp_path;

/// Sorted file names in `dir`.
pub(crate) fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Write one temp media file per entry, named the way the downloader names them.
pub(crate) fn seed_temp_files(work_dir: &Path, contents: &[&[u8]]) -> Vec<PathBuf> {
    contents
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            let path = temp_path(work_dir, i);
            std::fs::write(&path, bytes).unwrap();
            path
        })
        .collect()
}

/// Formatted `tracing` output collected in memory.
///
/// The subscriber is the thread default, so the test must run on a
/// current-thread runtime (the `#[tokio::test]` default) to see events from
/// spawned tasks.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route events to this buffer until the guard is dropped.
    pub(crate) fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Captured WARN lines that contain `needle`.
    pub(crate) fn warnings_with(&self, needle: &str) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|l| l.contains(" WARN ") && l.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A concat tool that joins the manifest's files byte for byte into the output.
///
/// It also leaves `<output>.manifest` (a copy of the manifest) and appends a
/// line to `<output>.calls` per invocation, so tests can inspect what it got.
#[cfg(unix)]
pub(crate) fn fake_concat_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-ffmpeg",
        r#"#!/bin/sh
[ "$1" = "-version" ] && exit 0
list="$6"
out="$9"
base=$(dirname "$list")
echo call >> "$out.calls"
cp "$list" "$out.manifest"
: > "$out"
while IFS= read -r line; do
  f=${line#file \'}
  f=${f%\'}
  cat "$base/$f" >> "$out" || exit 1
done < "$list"
"#,
    )
}

/// A concat tool that always fails with an ffmpeg-like message.
#[cfg(unix)]
pub(crate) fn failing_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "broken-ffmpeg",
        r#"#!/bin/sh
echo "ffmpeg version n6.1" >&2
echo "filelist.txt: Invalid data found when processing input" >&2
exit 1
"#,
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
