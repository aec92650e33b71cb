use std::io::Read;
use std::time::Duration;

use super::event::{Event, KeyCode, KeyEvent, Modifiers};
use crate::error::Result;

/// Decodes key events from raw stdin bytes. Escape sequences arrive split
/// across reads, so undecoded bytes are carried over between calls.
pub struct EventReader {
    buffer: [u8; 32],
    buffer_len: usize,
}

impl EventReader {
    pub fn new() -> Self {
        Self {
            buffer: [0; 32],
            buffer_len: 0,
        }
    }

    pub fn read_event(&mut self, timeout: Duration) -> Result<Event> {
        if self.buffer_len > 0 {
            let (event, consumed) = self.parse_event();
            if consumed > 0 {
                self.consume(consumed);
                if !matches!(event, Event::None) {
                    return Ok(event);
                }
            }
        }

        if !self.poll_stdin(timeout)? {
            return Ok(Event::None);
        }

        let n = std::io::stdin().read(&mut self.buffer[self.buffer_len..])?;
        if n == 0 {
            return Ok(Event::None);
        }
        self.buffer_len += n;

        let (event, consumed) = self.parse_event();
        if consumed > 0 {
            self.consume(consumed);
        }
        Ok(event)
    }

    fn consume(&mut self, n: usize) {
        self.buffer.copy_within(n..self.buffer_len, 0);
        self.buffer_len -= n;
    }

    #[cfg(unix)]
    fn poll_stdin(&self, timeout: Duration) -> Result<bool> {
        unsafe {
            let mut fds: libc::fd_set = std::mem::zeroed();
            libc::FD_ZERO(&mut fds);
            libc::FD_SET(libc::STDIN_FILENO, &mut fds);

            let mut tv = libc::timeval {
                tv_sec: timeout.as_secs() as libc::time_t,
                tv_usec: timeout.subsec_micros() as libc::suseconds_t,
            };

            let result = libc::select(
                libc::STDIN_FILENO + 1,
                &mut fds,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut tv,
            );

            Ok(result > 0)
        }
    }

    #[cfg(windows)]
    fn poll_stdin(&self, timeout: Duration) -> Result<bool> {
        use windows_sys::Win32::Foundation::WAIT_OBJECT_0;
        use windows_sys::Win32::System::Console::{GetStdHandle, STD_INPUT_HANDLE};

        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            let timeout_ms = timeout.as_millis() as u32;
            let result =
                windows_sys::Win32::System::Threading::WaitForSingleObject(handle as _, timeout_ms);
            Ok(result == WAIT_OBJECT_0)
        }
    }

    fn parse_event(&self) -> (Event, usize) {
        if self.buffer_len == 0 {
            return (Event::None, 0);
        }

        let bytes = &self.buffer[..self.buffer_len];

        if bytes[0] == 0x1b {
            if self.buffer_len == 1 {
                return (Event::Key(KeyEvent::plain(KeyCode::Escape)), 1);
            }
            if bytes[1] == b'[' {
                return self.parse_csi(&bytes[2..]);
            }
            // Alt + key
            let (inner, consumed) = self.parse_single_byte(bytes[1]);
            if let Event::Key(mut key) = inner {
                key.modifiers = key.modifiers.union(Modifiers::ALT);
                return (Event::Key(key), 1 + consumed);
            }
            return (Event::Key(KeyEvent::plain(KeyCode::Escape)), 1);
        }

        self.parse_single_byte(bytes[0])
    }

    fn parse_single_byte(&self, byte: u8) -> (Event, usize) {
        let event = match byte {
            0 => KeyEvent::plain(KeyCode::Null),
            9 => KeyEvent::plain(KeyCode::Tab),
            10 | 13 => KeyEvent::plain(KeyCode::Enter),
            1..=8 | 11..=12 | 14..=26 => {
                let c = (byte - 1 + b'a') as char;
                KeyEvent::new(KeyCode::Char(c), Modifiers::CTRL)
            }
            27 => KeyEvent::plain(KeyCode::Escape),
            127 => KeyEvent::plain(KeyCode::Backspace),
            32..=126 => KeyEvent::char(byte as char),
            _ => {
                if let Some((c, len)) = self.parse_utf8() {
                    return (Event::Key(KeyEvent::char(c)), len);
                }
                return (Event::None, 1);
            }
        };
        (Event::Key(event), 1)
    }

    fn parse_utf8(&self) -> Option<(char, usize)> {
        let bytes = &self.buffer[..self.buffer_len];
        let s = std::str::from_utf8(bytes).ok()?;
        let c = s.chars().next()?;
        Some((c, c.len_utf8()))
    }

    /// CSI sequences (ESC [ ...): arrows, Home/End, Delete, paging.
    fn parse_csi(&self, bytes: &[u8]) -> (Event, usize) {
        if bytes.is_empty() {
            return (Event::Key(KeyEvent::plain(KeyCode::Escape)), 1);
        }

        match bytes[0] {
            b'A' => return (Event::Key(KeyEvent::plain(KeyCode::Up)), 3),
            b'B' => return (Event::Key(KeyEvent::plain(KeyCode::Down)), 3),
            b'C' => return (Event::Key(KeyEvent::plain(KeyCode::Right)), 3),
            b'D' => return (Event::Key(KeyEvent::plain(KeyCode::Left)), 3),
            b'H' => return (Event::Key(KeyEvent::plain(KeyCode::Home)), 3),
            b'F' => return (Event::Key(KeyEvent::plain(KeyCode::End)), 3),
            _ => {}
        }

        // ESC [ number ~
        let mut num = 0u32;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'0'..=b'9' => num = num * 10 + (bytes[i] - b'0') as u32,
                b'~' => {
                    let code = match num {
                        1 | 7 => KeyCode::Home,
                        3 => KeyCode::Delete,
                        4 | 8 => KeyCode::End,
                        5 => KeyCode::PageUp,
                        6 => KeyCode::PageDown,
                        _ => return (Event::None, i + 3),
                    };
                    return (Event::Key(KeyEvent::plain(code)), i + 3);
                }
                _ => break,
            }
            i += 1;
        }

        (Event::None, 2)
    }
}
