use std::io::{self, BufRead, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// Set from a Ctrl-C handler; a pending prompt then reads as cancelled.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the interrupt had already been triggered.
    pub fn trigger(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lines read on a background thread, so a blocked prompt can give up on
/// interrupt. An interrupt reads as end of input.
pub struct InterruptibleInput {
    lines: Receiver<Vec<u8>>,
    buffer: Vec<u8>,
    pos: usize,
    interrupt: Interrupt,
}

impl InterruptibleInput {
    pub fn new(lines: Receiver<Vec<u8>>, interrupt: Interrupt) -> Self {
        Self {
            lines,
            buffer: Vec::new(),
            pos: 0,
            interrupt,
        }
    }

    pub fn stdin(interrupt: Interrupt) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            loop {
                let mut line = Vec::new();
                match stdin.read_until(b'\n', &mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self::new(rx, interrupt)
    }
}

impl Read for InterruptibleInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for InterruptibleInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos >= self.buffer.len() {
            if self.interrupt.is_triggered() {
                return Ok(&[]);
            }
            match self.lines.recv_timeout(INTERRUPT_POLL) {
                Ok(line) => {
                    self.buffer = line;
                    self.pos = 0;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(&[]),
            }
        }
        Ok(&self.buffer[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buffer.len());
    }
}

/// Interactive question source. `Ok(None)` means the user backed out.
pub trait Prompter {
    fn select(&mut self, message: &str, choices: &[String], default: usize)
        -> io::Result<Option<usize>>;

    fn text(
        &mut self,
        message: &str,
        default: &str,
        validate: &dyn Fn(&str) -> bool,
    ) -> io::Result<Option<String>>;
}

/// Line-oriented prompts; an empty answer takes the default, end of input
/// or an interrupt cancels.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    interrupt: Interrupt,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn read_answer(&mut self) -> io::Result<Option<String>> {
        if self.interrupt.is_triggered() {
            return Ok(None);
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 || self.interrupt.is_triggered() {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: usize,
    ) -> io::Result<Option<usize>> {
        writeln!(self.output, "? {message}")?;
        for (index, choice) in choices.iter().enumerate() {
            let marker = if index == default { '>' } else { ' ' };
            writeln!(self.output, " {marker} {}) {choice}", index + 1)?;
        }
        loop {
            write!(self.output, "  [1-{}, default {}]: ", choices.len(), default + 1)?;
            self.output.flush()?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer.is_empty() && default < choices.len() {
                return Ok(Some(default));
            }
            if let Ok(number) = answer.parse::<usize>() {
                if (1..=choices.len()).contains(&number) {
                    return Ok(Some(number - 1));
                }
            }
            if let Some(index) = choices.iter().position(|choice| *choice == answer) {
                return Ok(Some(index));
            }
            writeln!(self.output, "  please pick one of the listed numbers")?;
        }
    }

    fn text(
        &mut self,
        message: &str,
        default: &str,
        validate: &dyn Fn(&str) -> bool,
    ) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "? {message} ({default}): ")?;
            self.output.flush()?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            let answer = if answer.is_empty() {
                default.to_string()
            } else {
                answer
            };
            if validate(&answer) {
                return Ok(Some(answer));
            }
            writeln!(self.output, "  {answer:?} is not accepted, try again")?;
        }
    }
}
