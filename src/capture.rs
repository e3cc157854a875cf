use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::CaptureError;

/// One still image of the four stacked game-over regions
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded image (MJPEG from ffmpeg)
    pub bytes: Vec<u8>,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            captured_at: Instant::now(),
        }
    }
}

/// Produces one frame per call
pub trait FrameSampler: Send + Sync {
    fn capture_frame(&self) -> Result<Frame, CaptureError>;
}

/// Default time a single capture may take before ffmpeg is killed
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between two exit checks of the capture process
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Crop rectangles in the 1920x1080 source, `[x, y, width, height]`
///
/// The first two are the top player banners, the last two are the smaller
/// bottom banners that get scaled up to the common size.
const SOURCE_CROPS: [[u32; 4]; 4] = [
    [195, 307, 562, 105],
    [1158, 307, 562, 105],
    [637, 874, 240, 50],
    [1039, 874, 240, 50],
];

/// Frame sampler that grabs a single frame from a capture device with ffmpeg
///
/// # Platform-Specific Implementation
///
/// ## macOS
/// - `avfoundation` input, `uyvy422` pixel format
///
/// ## Windows
/// - `dshow` input, `nv12` pixel format, device addressed as `video=<name>`
///
/// ## Linux
/// - `v4l2` input, device given as a path such as `/dev/video0`
///
/// A new ffmpeg process is spawned per frame. A process that has not
/// exited by the capture timeout is killed and the frame is reported as
/// timed out.
pub struct FfmpegSampler {
    program: String,
    device: String,
    timeout: Duration,
}

impl FfmpegSampler {
    pub fn new(program: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            device: device.into(),
            timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Crop, normalize and stack the four regions into one grayscale image
    pub fn filter_graph() -> String {
        let [c1, c2, c3, c4] = SOURCE_CROPS;
        format!(
            "[0:v]scale=w=1920:h=1080,format=gray[scaled];\
             [scaled]crop=w={}:h={}:x={}:y={}[crop1];\
             [scaled]crop=w={}:h={}:x={}:y={}[crop2];\
             [scaled]crop=w={}:h={}:x={}:y={}[crop3a];[crop3a]scale=w=562:h=105[crop3];\
             [scaled]crop=w={}:h={}:x={}:y={}[crop4a];[crop4a]scale=w=562:h=105[crop4];\
             [crop1][crop2][crop3][crop4]vstack=inputs=4[out]",
            c1[2], c1[3], c1[0], c1[1],
            c2[2], c2[3], c2[0], c2[1],
            c3[2], c3[3], c3[0], c3[1],
            c4[2], c4[3], c4[0], c4[1],
        )
    }

    fn input_args(&self) -> Vec<String> {
        let (format, pixel_format, input) = if cfg!(target_os = "macos") {
            ("avfoundation", Some("uyvy422"), self.device.clone())
        } else if cfg!(target_os = "windows") {
            ("dshow", Some("nv12"), format!("video={}", self.device))
        } else {
            ("v4l2", None, self.device.clone())
        };

        let mut args = vec![
            "-y".to_string(),
            "-framerate".to_string(),
            "60".to_string(),
            "-f".to_string(),
            format.to_string(),
        ];
        if let Some(pixel_format) = pixel_format {
            args.push("-pixel_format".to_string());
            args.push(pixel_format.to_string());
        }
        args.push("-i".to_string());
        args.push(input);
        args
    }

    /// Full ffmpeg argument list
    pub fn args(&self) -> Vec<String> {
        let graph = Self::filter_graph();
        let mut args = self.input_args();
        args.extend(
            [
                "-filter_complex",
                graph.as_str(),
                "-map",
                "[out]",
                "-vframes",
                "1",
                "-f",
                "image2pipe",
                "-c:v",
                "mjpeg",
                "-q:v",
                "5",
                "pipe:",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }
}

impl FrameSampler for FfmpegSampler {
    fn capture_frame(&self) -> Result<Frame, CaptureError> {
        let mut command = Command::new(&self.program);
        command.args(self.args());

        let bytes = run_with_deadline(&mut command, &self.program, self.timeout)?;
        if bytes.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }

        Ok(Frame::new(bytes))
    }
}

/// Run `command` to completion and return its stdout
///
/// Both pipes are drained on reader threads so a chatty process cannot
/// block on a full pipe. The process is killed once `timeout` elapses.
fn run_with_deadline(
    command: &mut Command,
    program: &str,
    timeout: Duration,
) -> Result<Vec<u8>, CaptureError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CaptureError::SpawnFailed {
            program: program.to_string(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_deadline(&mut child, timeout);

    // Pipes close once the process is gone, so the readers always finish
    let stdout = join_reader(stdout);
    let stderr = join_reader(stderr);

    let status = match status? {
        Some(status) => status,
        None => {
            tracing::warn!("{} did not exit within {:?}, killed", program, timeout);
            return Err(CaptureError::Timeout { timeout });
        }
    };

    if !status.success() {
        let stderr = stderr.unwrap_or_default();
        return Err(CaptureError::ProcessFailed {
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    stdout.map_err(CaptureError::ReadFailed)
}

/// Exit status of `child`, or `None` if it was killed at the deadline
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, CaptureError> {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CaptureError::ReadFailed(e));
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut bytes)?;
        }
        Ok(bytes)
    })
}

fn join_reader(reader: thread::JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    reader
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "pipe reader panicked")))
}
