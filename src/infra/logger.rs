//! # Hierarchical Logger Module / 分层日志模块
//!
//! The harness prints a tree: every nesting level of groups adds one
//! `"¦ "` to the line prefix. Instead of a process-wide logger the
//! [`Logger`] is a small value that carries its own level and is handed
//! down the recursion; [`Logger::child`] produces the logger for the next
//! level.
//!
//! 测试工具的输出是一棵树：每一层嵌套的组都会在行首增加一个 `"¦ "`。
//! [`Logger`] 不是全局单例，而是一个携带自身层级的值，沿着递归向下传递；
//! [`Logger::child`] 生成下一层使用的日志器。

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// The string repeated once per nesting level at the start of every line.
pub const LEVEL_MARK: &str = "¦ ";

type Sink = Arc<Mutex<dyn Write + Send>>;

/// A level-aware line writer shared by every group and case of one run.
///
/// Write failures are ignored: losing a console line must never turn a
/// passing case into a failing one.
///
/// 一次运行中所有组和用例共享的、感知层级的行写入器。
#[derive(Clone)]
pub struct Logger {
    level: usize,
    prefix: String,
    sink: Sink,
}

impl Logger {
    /// A root-level logger writing to the process's standard output.
    /// 写入标准输出的根层级日志器。
    pub fn stdout() -> Self {
        Self::with_sink(Arc::new(Mutex::new(io::stdout())))
    }

    /// A root-level logger writing into an in-memory buffer, together with
    /// a handle to read that buffer back.
    ///
    /// 写入内存缓冲区的根层级日志器，以及读取该缓冲区的句柄。
    pub fn capture() -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        (Self::with_sink(Arc::new(Mutex::new(buffer.clone()))), buffer)
    }

    /// A root-level logger writing into `writer`, e.g. a file or
    /// [`std::io::sink`].
    pub fn to_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self::with_sink(Arc::new(Mutex::new(writer)))
    }

    fn with_sink(sink: Sink) -> Self {
        Self {
            level: 0,
            prefix: String::new(),
            sink,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The logger for the next nesting level, sharing the same sink.
    /// 下一嵌套层级的日志器，共享同一个输出。
    pub fn child(&self) -> Self {
        Self {
            level: self.level + 1,
            prefix: LEVEL_MARK.repeat(self.level + 1),
            sink: Arc::clone(&self.sink),
        }
    }

    /// Writes one complete, prefixed line.
    pub fn log(&self, msg: impl Display) {
        self.write(format_args!("{}{}\n", self.prefix, msg));
    }

    /// Writes an empty line that still carries the level prefix.
    pub fn blank(&self) {
        self.log("");
    }

    /// Starts a prefixed line without terminating it, then flushes so the
    /// text is visible while the caller keeps working.
    ///
    /// 开始一行带前缀但不换行的输出并立即刷新，使其在后续工作期间可见。
    pub fn begin(&self, msg: impl Display) {
        self.write(format_args!("{}{}", self.prefix, msg));
    }

    /// Appends text to the line opened by [`Logger::begin`].
    pub fn raw(&self, msg: impl Display) {
        self.write(format_args!("{msg}"));
    }

    /// Appends text and terminates the current line.
    pub fn end(&self, msg: impl Display) {
        self.write(format_args!("{msg}\n"));
    }

    fn write(&self, args: fmt::Arguments<'_>) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = sink.write_fmt(args);
        let _ = sink.flush();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Shared in-memory output of a captured [`Logger`].
///
/// 被捕获的 [`Logger`] 的共享内存输出。
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBuffer").finish_non_exhaustive()
    }
}
