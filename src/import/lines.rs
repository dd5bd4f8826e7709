//! Byte-level pass that keeps blank lines visible to the CSV parser.
//!
//! The `csv` parser drops empty lines, so a file's blank rows would vanish
//! from the import counts. `PhysicalLines` sits between the source and the
//! parser: every line terminator outside a quoted field becomes `\n`, and a
//! blank line becomes `""\n`, a record with one empty field.

use std::io::{self, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// Stand-in emitted for a blank line.
const BLANK_RECORD: &[u8] = b"\"\"";

/// Position within the CSV grammar, tracked per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    RecordStart,
    /// Just after a `\r` terminator; a following `\n` belongs to it.
    AfterCr,
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either an escaped quote or the close.
    QuoteInQuoted,
}

pub(crate) struct PhysicalLines<R> {
    inner: R,
    scan: Scan,
    chunk: Box<[u8]>,
    out: Vec<u8>,
    pos: usize,
}

impl<R: Read> PhysicalLines<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            scan: Scan::RecordStart,
            chunk: vec![0; CHUNK_SIZE].into_boxed_slice(),
            out: Vec::with_capacity(CHUNK_SIZE),
            pos: 0,
        }
    }

    fn push(&mut self, byte: u8) {
        match (self.scan, byte) {
            (Scan::Quoted, b'"') => self.scan = Scan::QuoteInQuoted,
            (Scan::Quoted, _) => {}
            (Scan::AfterCr, b'\n') => {
                self.scan = Scan::RecordStart;
                return;
            }
            (scan, b'\r' | b'\n') => {
                if matches!(scan, Scan::RecordStart | Scan::AfterCr) {
                    self.out.extend_from_slice(BLANK_RECORD);
                }
                self.out.push(b'\n');
                self.scan = if byte == b'\r' {
                    Scan::AfterCr
                } else {
                    Scan::RecordStart
                };
                return;
            }
            (
                Scan::RecordStart | Scan::AfterCr | Scan::FieldStart | Scan::QuoteInQuoted,
                b'"',
            ) => self.scan = Scan::Quoted,
            (_, b',') => self.scan = Scan::FieldStart,
            _ => self.scan = Scan::Unquoted,
        }
        self.out.push(byte);
    }
}

impl<R: Read> Read for PhysicalLines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.out.len() {
            let n = self.inner.read(&mut self.chunk)?;
            if n == 0 {
                return Ok(0);
            }
            self.out.clear();
            self.pos = 0;
            for i in 0..n {
                let byte = self.chunk[i];
                self.push(byte);
            }
        }
        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(input: &[u8]) -> String {
        let mut out = String::new();
        PhysicalLines::new(input).read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_blank_lines_become_records() {
        assert_eq!(rewrite(b"a,b\n\nc,d\n"), "a,b\n\"\"\nc,d\n");
        assert_eq!(rewrite(b"\na\n"), "\"\"\na\n");
    }

    #[test]
    fn test_crlf_and_cr_terminators() {
        assert_eq!(rewrite(b"a\r\n\r\nb\r\n"), "a\n\"\"\nb\n");
        assert_eq!(rewrite(b"a\rb\r"), "a\nb\n");
    }

    #[test]
    fn test_quoted_newlines_untouched() {
        assert_eq!(rewrite(b"\"x\n\ny\",1\n"), "\"x\n\ny\",1\n");
        assert_eq!(rewrite(b"\"say \"\"hi\"\"\n\",1\n\n"), "\"say \"\"hi\"\"\n\",1\n\"\"\n");
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(rewrite(b"ab\"c\n\nd\n"), "ab\"c\n\"\"\nd\n");
    }

    #[test]
    fn test_reads_across_small_buffers() {
        let mut reader = PhysicalLines::new(&b"a\n\nb"[..]);
        let mut out = Vec::new();
        let mut buf = [0u8; 1];
        while reader.read(&mut buf).unwrap() == 1 {
            out.push(buf[0]);
        }
        assert_eq!(out, b"a\n\"\"\nb");
    }
}
