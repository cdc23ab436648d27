use std::{
    fs,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use image::RgbaImage;
use log::debug;

use crate::{
    config::SdfMode,
    error::AtlasError,
    rasterizer::{RasterRequest, Rasterizer},
};

/// Delegates rendering to an external msdfgen executable, one process per
/// glyph. The process writes a PNG into the working directory; its exit
/// status is ignored and success is judged solely by the file existing.
pub(crate) struct MsdfgenRasterizer {
    executable: PathBuf,
    font: PathBuf,
    mode: SdfMode,
    work_dir: PathBuf,
    timeout: Duration,
    retain_files: bool,
}

impl MsdfgenRasterizer {
    const POLL_INTERVAL: Duration = Duration::from_millis(10);
    pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub(crate) fn new(
        executable: impl Into<PathBuf>,
        font: impl Into<PathBuf>,
        mode: SdfMode,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            font: font.into(),
            mode,
            work_dir: work_dir.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            retain_files: false,
        }
    }

    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn retain_files(mut self, retain: bool) -> Self {
        self.retain_files = retain;
        self
    }

    /// Path the rendered image for `request` is written to.
    pub(crate) fn output_path(&self, request: &RasterRequest) -> PathBuf {
        self.work_dir.join(format!("sdf-{}-{}.png", request.character, request.size))
    }

    fn command(&self, request: &RasterRequest, output: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(self.mode.as_str())
            .arg("-font")
            .arg(&self.font)
            .arg(request.character.to_string())
            .arg("-size")
            .arg(request.size.to_string())
            .arg(request.size.to_string())
            .arg("-translate")
            .arg(request.translate.0.to_string())
            .arg(request.translate.1.to_string())
            .arg("-scale")
            .arg(request.scale.to_string())
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        cmd
    }

    fn wait(&self, child: &mut Child, character: u32) -> Result<(), AtlasError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                if !status.success() {
                    debug!("rasterizer exited with {status} for character {character}");
                }
                return Ok(());
            }

            if Instant::now() >= deadline {
                // the process may have exited between the poll and the kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(AtlasError::rasterizer_timed_out(character, self.timeout));
            }

            thread::sleep(Self::POLL_INTERVAL);
        }
    }
}

impl Rasterizer for MsdfgenRasterizer {
    fn rasterize(&mut self, request: &RasterRequest) -> Result<RgbaImage, AtlasError> {
        let output = self.output_path(request);
        if output.exists() {
            fs::remove_file(&output)?;
        }

        let mut child = self
            .command(request, &output)
            .spawn()
            .map_err(|e| AtlasError::rasterizer_launch_failed(&self.executable, e))?;
        self.wait(&mut child, request.character)?;

        if !output.exists() {
            return Err(AtlasError::glyph_output_missing(request.character, &output));
        }

        let image = image::open(&output)?.to_rgba8();
        if !self.retain_files {
            fs::remove_file(&output)?;
        }

        Ok(image)
    }
}
