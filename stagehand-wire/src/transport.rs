//! Line transports to and from the engine.
//!
//! The engine speaks one message per `\n`-terminated line. The two traits
//! here are the seam every other wire component is written against: the
//! router owns a [`LineReader`], the dispatcher a [`LineWriter`]. Concrete
//! transports: the engine as a child process ([`ProcessTransport`]), this
//! process's own stdio (when a supervisor owns the engine pipes), and an
//! in-memory [`loopback`] pair for engine-less debug sessions and tests.

use std::io::{BufRead, BufReader, Read, Stdin, Stdout, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Result, WireError};
use crate::queue::MessageQueue;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Write-line half of the engine channel. One line per call, flushed.
pub trait LineWriter: Send {
    /// Write `line` followed by a newline and flush.
    ///
    /// # Errors
    /// [`WireError::Transport`] on I/O failure, [`WireError::ChannelClosed`]
    /// when the peer has gone away.
    fn write_line(&mut self, line: &str) -> Result<()>;
}

/// Read-line half of the engine channel. Blocking.
pub trait LineReader: Send {
    /// Block for the next line, stripped of its terminator. `Ok(None)` is
    /// end-of-stream.
    ///
    /// # Errors
    /// [`WireError::Transport`] on I/O failure.
    fn read_line(&mut self) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Generic halves over std I/O
// ---------------------------------------------------------------------------

/// [`LineWriter`] over any `Write` stream.
pub struct WriteHalf<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> WriteHalf<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write + Send> LineWriter for WriteHalf<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(())
    }
}

/// [`LineReader`] over any `Read` stream, buffered.
pub struct ReadHalf<R: Read + Send> {
    inner: BufReader<R>,
    buf: String,
}

impl<R: Read + Send> ReadHalf<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: String::new(),
        }
    }
}

impl<R: Read + Send> LineReader for ReadHalf<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let n = self.inner.read_line(&mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.trim_end_matches(['\n', '\r']).to_string()))
    }
}

// ---------------------------------------------------------------------------
// Child-process transport
// ---------------------------------------------------------------------------

/// The engine as a child process, wired over its stdin/stdout pipes.
///
/// The child is killed when this value is dropped.
pub struct ProcessTransport {
    child: Child,
}

impl ProcessTransport {
    /// Spawn the engine process with piped stdio.
    ///
    /// # Errors
    /// [`WireError::Transport`] when the process cannot be spawned.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        debug!(command, "engine process spawned");
        Ok(Self { child })
    }

    /// Take the two pipe halves. Callable once.
    ///
    /// # Errors
    /// [`WireError::ChannelClosed`] when a half was already taken.
    pub fn split(&mut self) -> Result<(WriteHalf<ChildStdin>, ReadHalf<ChildStdout>)> {
        let stdin = self.child.stdin.take().ok_or(WireError::ChannelClosed)?;
        let stdout = self.child.stdout.take().ok_or(WireError::ChannelClosed)?;
        Ok((WriteHalf::new(stdin), ReadHalf::new(stdout)))
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            warn!(%err, "failed to kill engine process");
        }
        let _ = self.child.wait();
    }
}

/// This process's own stdin/stdout as the engine channel.
#[must_use]
pub fn stdio() -> (WriteHalf<Stdout>, ReadHalf<Stdin>) {
    (
        WriteHalf::new(std::io::stdout()),
        ReadHalf::new(std::io::stdin()),
    )
}

// ---------------------------------------------------------------------------
// In-memory loopback
// ---------------------------------------------------------------------------

/// Writer half of a [`loopback`] pair.
pub struct LoopbackWriter {
    outbound: MessageQueue<String>,
}

impl LineWriter for LoopbackWriter {
    fn write_line(&mut self, line: &str) -> Result<()> {
        if self.outbound.push(line.to_string()) {
            Ok(())
        } else {
            Err(WireError::ChannelClosed)
        }
    }
}

/// Reader half of a [`loopback`] pair.
pub struct LoopbackReader {
    inbound: MessageQueue<String>,
}

impl LineReader for LoopbackReader {
    fn read_line(&mut self) -> Result<Option<String>> {
        match self.inbound.pop() {
            Ok(line) => Ok(Some(line)),
            Err(WireError::ChannelClosed) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// The scripted-engine end of a [`loopback`] pair: observe what was
/// written, feed inbound lines, end the stream.
#[derive(Clone)]
pub struct LoopbackPeer {
    outbound: MessageQueue<String>,
    inbound: MessageQueue<String>,
}

impl LoopbackPeer {
    /// Block for the next line the session wrote.
    ///
    /// # Errors
    /// [`WireError::ChannelClosed`] when the writer end was dropped closed.
    pub fn next_written(&self) -> Result<String> {
        self.outbound.pop()
    }

    /// Non-blocking variant of [`LoopbackPeer::next_written`].
    ///
    /// # Errors
    /// [`WireError::ChannelClosed`] when the writer end was dropped closed.
    pub fn try_next_written(&self) -> Result<Option<String>> {
        self.outbound.try_pop()
    }

    /// Feed a line to the session's reader.
    pub fn feed(&self, line: &str) {
        self.inbound.push(line.to_string());
    }

    /// End the inbound stream: the session's reader sees end-of-stream
    /// after draining what was already fed.
    pub fn close(&self) {
        self.inbound.close();
    }
}

/// An in-memory transport pair: the session end and a peer end standing in
/// for the engine.
#[must_use]
pub fn loopback() -> (LoopbackWriter, LoopbackReader, LoopbackPeer) {
    let outbound = MessageQueue::new();
    let inbound = MessageQueue::new();
    (
        LoopbackWriter {
            outbound: outbound.clone(),
        },
        LoopbackReader {
            inbound: inbound.clone(),
        },
        LoopbackPeer { outbound, inbound },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
