use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::git::{Gateway, GitGateway};
use crate::input::{Event, EventReader};
use crate::session::Session;
use crate::tui::Terminal;
use crate::views::{self, BranchListView};

/// One pass through the event loop per tick; the tick also drives the
/// fetch spinner and the background-result poll.
const TICK: Duration = Duration::from_millis(100);

pub struct App {
    terminal: Terminal,
    reader: EventReader,
    session: Session<GitGateway>,
    list: BranchListView,
}

impl App {
    /// Fails only on a fatal startup condition: no terminal, a missing
    /// directory, or a directory outside any git repository.
    pub fn new(dir: PathBuf) -> Result<Self> {
        let gateway = GitGateway::open(dir)?;
        let config = Config::load();
        info!("opened repository at {}", gateway.dir().display());
        Ok(Self {
            terminal: Terminal::new()?,
            reader: EventReader::new(),
            session: Session::new(gateway, config),
            list: BranchListView::new(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.terminal.enter()?;
        let result = self.event_loop();
        self.terminal.leave()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.session.poll();

            let session = &self.session;
            let list = &mut self.list;
            let theme = session.config().current_theme().clone();
            self.terminal.draw(|buf| views::draw(session, list, &theme, buf))?;

            // Resizes need no event of their own; the draw pass re-probes
            // the size every frame.
            match self.reader.read_event(TICK)? {
                Event::Key(key) => self.session.handle_key(key),
                Event::None => {}
            }

            if self.session.should_quit() {
                info!("session ended");
                return Ok(());
            }
        }
    }
}
