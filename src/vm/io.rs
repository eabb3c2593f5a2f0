use super::types::Fault;
use crate::spec::types::hw::*;
use std::collections::VecDeque;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Secondary storage, reachable through port 1 of INP and OUT.
pub trait Storage: Read + Write + Seek {}

impl<T: Read + Write + Seek> Storage for T {}

/// The byte streams behind the INP and OUT channels.
pub struct Io<'a> {
    input: &'a mut dyn Read,
    output: &'a mut dyn Write,
    storage: &'a mut dyn Storage,
    pushback: VecDeque<Byte>,
}

fn read_byte<R: Read + ?Sized>(r: &mut R) -> io::Result<Option<Byte>> {
    let mut buf = [0; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn byte_or_eof(b: Option<Byte>) -> Word {
    b.map_or(EOF_WORD, Word::from)
}

fn unimplemented_port(verb: &str, ch: Channel, addr: Word) {
    log::warn!(
        "{} address {} on MCH {} that is currently unimplemented",
        verb,
        addr,
        ch as Word
    );
}

impl<'a> Io<'a> {
    pub fn new(
        input: &'a mut dyn Read,
        output: &'a mut dyn Write,
        storage: &'a mut dyn Storage,
    ) -> Self {
        Io {
            input,
            output,
            storage,
            pushback: VecDeque::new(),
        }
    }

    pub fn flush(&mut self) -> Result<(), Fault> {
        self.output
            .flush()
            .map_err(|e| Fault::Io(Channel::OUT, e.to_string()))
    }

    /// `st` with MCH = `ch` (INP or OUT).
    pub fn store(&mut self, ch: Channel, addr: Word, val: Word) -> Result<(), Fault> {
        let fault = |e: io::Error| Fault::Io(ch, e.to_string());

        match (ch, addr) {
            (Channel::INP, port::STDIO) => self.pushback.push_front(low_byte(val)),
            (Channel::INP, port::STORAGE) => {
                self.storage.seek(SeekFrom::Start(val)).map_err(fault)?;
            }
            (Channel::OUT, port::STDIO) => self.output.write_all(&[low_byte(val)]).map_err(fault)?,
            (Channel::OUT, port::STORAGE) => {
                self.storage.write_all(&[low_byte(val)]).map_err(fault)?
            }
            _ => unimplemented_port("writing to", ch, addr),
        }

        Ok(())
    }

    /// `ld` with MCH = `ch` (INP or OUT). Reserved ports leave `current`
    /// unchanged.
    pub fn load(&mut self, ch: Channel, addr: Word, current: Word) -> Result<Word, Fault> {
        let fault = |e: io::Error| Fault::Io(ch, e.to_string());

        Ok(match (ch, addr) {
            (Channel::INP, port::STDIO) => match self.pushback.pop_front() {
                Some(b) => Word::from(b),
                None => {
                    self.flush()?;
                    byte_or_eof(read_byte(&mut *self.input).map_err(fault)?)
                }
            },
            (Channel::INP, port::STORAGE) => self.storage.seek(SeekFrom::Current(0)).map_err(fault)?,
            (Channel::OUT, port::STDIO) => {
                log::warn!("reading from standard output, which is not readable");
                EOF_WORD
            }
            (Channel::OUT, port::STORAGE) => byte_or_eof(read_byte(&mut *self.storage).map_err(fault)?),
            _ => {
                unimplemented_port("reading from", ch, addr);
                current
            }
        })
    }
}
