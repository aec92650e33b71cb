use std::io::{self, BufWriter, Stdout, Write};

use super::buffer::{char_width, Buffer, WIDE_SHADOW};
use super::layout::Rect;
use super::style::Style;
use crate::error::{Error, Result};

/// Owns the real terminal: raw mode, the alternate screen and the two
/// frame buffers. `draw` composes a frame off-screen and emits only the
/// cells that changed since the previous frame.
pub struct Terminal {
    out: BufWriter<Stdout>,
    /// What is currently on screen.
    front: Buffer,
    /// The frame being composed.
    back: Buffer,
    #[cfg(unix)]
    saved_termios: Option<libc::termios>,
    #[cfg(windows)]
    saved_modes: Option<(u32, u32)>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let (width, height) = Self::probe_size()?;
        let area = Rect::new(0, 0, width, height);
        Ok(Self {
            out: BufWriter::with_capacity(8192, io::stdout()),
            front: Buffer::empty(area),
            back: Buffer::empty(area),
            #[cfg(unix)]
            saved_termios: None,
            #[cfg(windows)]
            saved_modes: None,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        self.enable_raw_mode()?;
        write!(self.out, "\x1b[?1049h\x1b[?25l\x1b[2J\x1b[H")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn leave(&mut self) -> Result<()> {
        write!(self.out, "\x1b[?25h\x1b[?1049l")?;
        self.out.flush()?;
        self.disable_raw_mode();
        Ok(())
    }

    pub fn draw<F>(&mut self, compose: F) -> Result<()>
    where
        F: FnOnce(&mut Buffer),
    {
        let (width, height) = Self::probe_size()?;
        if width != self.back.area.width || height != self.back.area.height {
            let area = Rect::new(0, 0, width, height);
            self.front.resize(area);
            self.back.resize(area);
            write!(self.out, "\x1b[2J")?;
        }

        self.back.clear();
        compose(&mut self.back);
        self.flush_changes()?;
        self.front.clone_from(&self.back);
        Ok(())
    }

    fn flush_changes(&mut self) -> Result<()> {
        let changes = self.front.diff(&self.back);
        if changes.is_empty() {
            return Ok(());
        }

        let mut style: Option<Style> = None;
        let mut cursor: Option<(u16, u16)> = None;

        for (x, y, cell) in changes {
            if cell.ch == WIDE_SHADOW {
                continue;
            }
            if cursor != Some((x, y)) {
                write!(self.out, "\x1b[{};{}H", y + 1, x + 1)?;
            }
            if style != Some(cell.style) {
                self.out.write_all(cell.style.sgr().as_bytes())?;
                style = Some(cell.style);
            }
            let mut encoded = [0u8; 4];
            self.out
                .write_all(cell.ch.encode_utf8(&mut encoded).as_bytes())?;
            cursor = Some((x + char_width(cell.ch) as u16, y));
        }

        self.out.write_all(b"\x1b[0m")?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(unix)]
    fn probe_size() -> Result<(u16, u16)> {
        unsafe {
            let mut size: libc::winsize = std::mem::zeroed();
            if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) == 0
                && size.ws_col > 0
            {
                Ok((size.ws_col, size.ws_row))
            } else {
                Err(Error::Terminal("could not query terminal size".to_string()))
            }
        }
    }

    #[cfg(windows)]
    fn probe_size() -> Result<(u16, u16)> {
        use windows_sys::Win32::System::Console::{
            GetConsoleScreenBufferInfo, GetStdHandle, CONSOLE_SCREEN_BUFFER_INFO,
            STD_OUTPUT_HANDLE,
        };
        unsafe {
            let handle = GetStdHandle(STD_OUTPUT_HANDLE);
            let mut info: CONSOLE_SCREEN_BUFFER_INFO = std::mem::zeroed();
            if GetConsoleScreenBufferInfo(handle, &mut info) != 0 {
                let width = (info.srWindow.Right - info.srWindow.Left + 1) as u16;
                let height = (info.srWindow.Bottom - info.srWindow.Top + 1) as u16;
                Ok((width, height))
            } else {
                Err(Error::Terminal("could not query console size".to_string()))
            }
        }
    }

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> Result<()> {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &mut termios) != 0 {
                return Err(Error::Terminal(
                    "could not read terminal attributes".to_string(),
                ));
            }
            self.saved_termios = Some(termios);

            termios.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN);
            termios.c_iflag &= !(libc::IXON | libc::BRKINT | libc::INPCK | libc::ISTRIP);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &termios) != 0 {
                return Err(Error::Terminal(
                    "could not set terminal attributes".to_string(),
                ));
            }
        }
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) {
        if let Some(termios) = self.saved_termios.take() {
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &termios);
            }
        }
    }

    #[cfg(windows)]
    fn enable_raw_mode(&mut self) -> Result<()> {
        use windows_sys::Win32::System::Console::{
            GetConsoleMode, GetStdHandle, SetConsoleMode, ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT,
            ENABLE_VIRTUAL_TERMINAL_INPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_INPUT_HANDLE,
            STD_OUTPUT_HANDLE,
        };
        unsafe {
            let stdin = GetStdHandle(STD_INPUT_HANDLE);
            let stdout = GetStdHandle(STD_OUTPUT_HANDLE);

            let mut in_mode = 0u32;
            let mut out_mode = 0u32;
            GetConsoleMode(stdin, &mut in_mode);
            GetConsoleMode(stdout, &mut out_mode);
            self.saved_modes = Some((in_mode, out_mode));

            SetConsoleMode(
                stdin,
                (in_mode & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT))
                    | ENABLE_VIRTUAL_TERMINAL_INPUT,
            );
            SetConsoleMode(stdout, out_mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING);
        }
        Ok(())
    }

    #[cfg(windows)]
    fn disable_raw_mode(&mut self) {
        use windows_sys::Win32::System::Console::{GetStdHandle, SetConsoleMode, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE};
        if let Some((in_mode, out_mode)) = self.saved_modes.take() {
            unsafe {
                SetConsoleMode(GetStdHandle(STD_INPUT_HANDLE), in_mode);
                SetConsoleMode(GetStdHandle(STD_OUTPUT_HANDLE), out_mode);
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
