use super::types::Fault;
use crate::spec::types::hw::*;

/// Growable word-addressed storage backing MEM and CST.
#[derive(Debug, Clone)]
pub struct Buffer {
    ch: Channel,
    words: Vec<Word>,
}

impl Buffer {
    /// No channel grows past this many words.
    pub const LIMIT: usize = 1 << 28;

    pub fn new(ch: Channel) -> Self {
        Buffer {
            ch,
            words: Vec::new(),
        }
    }

    pub fn with_contents(ch: Channel, words: Vec<Word>) -> Self {
        Buffer { ch, words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Reads without growing, for instruction fetch.
    pub fn peek(&self, addr: Word) -> Option<Word> {
        self.words.get(addr as usize).copied()
    }

    fn grow_to_hold(&mut self, addr: Word) -> Result<usize, Fault> {
        let idx = addr as usize;
        if addr >= Buffer::LIMIT as Word {
            return Err(Fault::ChannelExhausted(self.ch, addr));
        }

        if idx >= self.words.len() {
            self.words
                .try_reserve(idx + 1 - self.words.len())
                .map_err(|_| Fault::ChannelExhausted(self.ch, addr))?;
            self.words.resize(idx + 1, 0);
        }

        Ok(idx)
    }

    pub fn read(&mut self, addr: Word) -> Result<Word, Fault> {
        let idx = self.grow_to_hold(addr)?;
        Ok(self.words[idx])
    }

    pub fn write(&mut self, addr: Word, val: Word) -> Result<(), Fault> {
        let idx = self.grow_to_hold(addr)?;
        self.words[idx] = val;
        Ok(())
    }
}

/// The CST channel. `depth` counts frames pushed by `cl`, which may be
/// fewer than the words the buffer holds if the program addresses CST
/// directly.
#[derive(Debug, Clone)]
pub struct CallStack {
    buf: Buffer,
    depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new()
    }
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            buf: Buffer::new(Channel::CST),
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn frames(&self) -> &[Word] {
        &self.buf.words()[..self.depth.min(self.buf.len())]
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buf
    }

    /// Returns the index the frame was stored at.
    pub fn push(&mut self, ret: Word) -> Result<Word, Fault> {
        let idx = self.depth as Word;
        self.buf.write(idx, ret)?;
        self.depth += 1;
        Ok(idx)
    }

    /// Pops the frame at `csp`, discarding everything above it.
    pub fn pop_at(&mut self, csp: Word) -> Result<Word, Fault> {
        if csp == CALL_STACK_EMPTY || csp >= self.buf.len() as Word {
            return Err(Fault::CallStackUnderflow);
        }

        let ret = self.buf.read(csp)?;
        self.depth = csp as usize;
        Ok(ret)
    }
}
