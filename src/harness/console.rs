use std::io::{self, Stdout, Write};

/// Text sink for harness output.
///
/// Every call writes its whole message in one `write_all` and reports the
/// number of bytes written.
pub struct Console<W: Write> {
    out: W,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print(&mut self, message: &str) -> io::Result<usize> {
        self.out.write_all(message.as_bytes())?;
        Ok(message.len())
    }

    pub fn println(&mut self, message: &str) -> io::Result<usize> {
        let written = self.print(message)? + self.print_new_line()?;
        self.out.flush()?;
        Ok(written)
    }

    pub fn print_new_line(&mut self) -> io::Result<usize> {
        self.print("\n")
    }

    pub fn print_repeat(&mut self, message: &str, count: usize) -> io::Result<usize> {
        (0..count).try_fold(0, |written, _| Ok(written + self.print(message)?))
    }
}
