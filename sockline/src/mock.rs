//! Scripted in-memory socket used by the unit tests.

use crate::descriptor::Descriptor;
use crate::endpoint::Endpoint;
use crate::readiness::{Direction, PeerFlags};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

/// One scripted `read(2)` result.
pub(crate) enum ReadStep {
    Data(Vec<u8>),
    WouldBlock,
    Interrupted,
    Fail(i32),
}

/// One scripted `write(2)` result.
pub(crate) enum WriteStep {
    Accept(usize),
    WouldBlock,
    Interrupted,
    Zero,
    Fail(i32),
}

/// A socket whose system calls follow a script.
///
/// Exhausted scripts fall back to: end of stream on read, full writes,
/// immediate connect, no pending error, and immediate readiness.
#[derive(Default)]
pub(crate) struct MockSocket {
    reads: RefCell<VecDeque<ReadStep>>,
    writes: RefCell<VecDeque<WriteStep>>,
    polls: RefCell<VecDeque<io::Result<Option<PeerFlags>>>>,
    connect: RefCell<Option<io::Error>>,
    pending_error: RefCell<Option<io::Result<Option<io::Error>>>>,

    starved: Cell<Option<Duration>>,

    read_calls: Cell<usize>,
    data_reads: Cell<usize>,
    poll_log: RefCell<Vec<(Direction, i32)>>,
    written: RefCell<Vec<u8>>,
}

impl MockSocket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A socket that yields `data` in reads of at most `chunk` bytes.
    pub(crate) fn with_data(data: &[u8], chunk: usize) -> Self {
        let socket = Self::new();
        for piece in data.chunks(chunk) {
            socket.push_read(ReadStep::Data(piece.to_vec()));
        }
        socket
    }

    pub(crate) fn push_read(&self, step: ReadStep) {
        self.reads.borrow_mut().push_back(step);
    }

    pub(crate) fn push_write(&self, step: WriteStep) {
        self.writes.borrow_mut().push_back(step);
    }

    pub(crate) fn push_poll(&self, result: io::Result<Option<PeerFlags>>) {
        self.polls.borrow_mut().push_back(result);
    }

    /// Makes every unscripted read and write would-block, while unscripted
    /// polls sleep up to `wakeup` and then report spurious readiness.
    ///
    /// A zero `poll(2)` timeout reports no event, as the kernel would.
    pub(crate) fn starve(&self, wakeup: Duration) {
        self.starved.set(Some(wakeup));
    }

    pub(crate) fn set_connect_error(&self, errno: i32) {
        *self.connect.borrow_mut() = Some(io::Error::from_raw_os_error(errno));
    }

    pub(crate) fn set_pending_error(&self, result: io::Result<Option<io::Error>>) {
        *self.pending_error.borrow_mut() = Some(result);
    }

    /// Number of `read(2)` calls made so far.
    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.get()
    }

    /// Number of reads that returned at least one byte.
    pub(crate) fn data_reads(&self) -> usize {
        self.data_reads.get()
    }

    pub(crate) fn polls(&self) -> Vec<(Direction, i32)> {
        self.poll_log.borrow().clone()
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }
}

impl Descriptor for MockSocket {
    fn raw_read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        self.read_calls.set(self.read_calls.get() + 1);

        let step = self.reads.borrow_mut().pop_front();
        match step {
            None if self.starved.get().is_some() => Err(io::ErrorKind::WouldBlock.into()),
            None => Ok(0),
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);

                if n < data.len() {
                    let rest = data.split_off(n);
                    self.reads.borrow_mut().push_front(ReadStep::Data(rest));
                }

                if n > 0 {
                    self.data_reads.set(self.data_reads.get() + 1);
                }
                Ok(n)
            }
            Some(ReadStep::WouldBlock) => Err(io::ErrorKind::WouldBlock.into()),
            Some(ReadStep::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ReadStep::Fail(errno)) => Err(io::Error::from_raw_os_error(errno)),
        }
    }

    fn raw_write(&self, buffer: &[u8]) -> io::Result<usize> {
        let step = self.writes.borrow_mut().pop_front();
        let accepted = match step {
            None if self.starved.get().is_some() => return Err(io::ErrorKind::WouldBlock.into()),
            None => buffer.len(),
            Some(WriteStep::Accept(limit)) => limit.min(buffer.len()),
            Some(WriteStep::WouldBlock) => return Err(io::ErrorKind::WouldBlock.into()),
            Some(WriteStep::Interrupted) => return Err(io::ErrorKind::Interrupted.into()),
            Some(WriteStep::Zero) => 0,
            Some(WriteStep::Fail(errno)) => return Err(io::Error::from_raw_os_error(errno)),
        };

        self.written
            .borrow_mut()
            .extend_from_slice(&buffer[..accepted]);
        Ok(accepted)
    }

    fn raw_connect(&self, _endpoint: &Endpoint) -> io::Result<()> {
        match self.connect.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_error(&self) -> io::Result<Option<io::Error>> {
        self.pending_error.borrow_mut().take().unwrap_or(Ok(None))
    }

    fn raw_poll(&self, direction: Direction, timeout_ms: i32) -> io::Result<Option<PeerFlags>> {
        self.poll_log.borrow_mut().push((direction, timeout_ms));

        if let Some(scripted) = self.polls.borrow_mut().pop_front() {
            return scripted;
        }

        match self.starved.get() {
            Some(_) if timeout_ms == 0 => Ok(None),
            Some(wakeup) => {
                let bound = u64::try_from(timeout_ms).map_or(wakeup, Duration::from_millis);
                thread::sleep(wakeup.min(bound));
                Ok(Some(PeerFlags::default()))
            }
            None => Ok(Some(PeerFlags::default())),
        }
    }
}
