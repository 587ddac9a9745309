use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::ThreadRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use strokr::{
    editor::EditorController,
    geom,
    input::{InputNormalizer, PointerKind, PointerSample},
    library::{self, ShapeLibrary},
    matcher::PointCloudMatcher,
    overlay::{ModalOverlay, OverlayMode},
    recorder::{NullTrail, RecorderMode, StrokeRecorder},
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    session::{SessionController, SessionPhase, DEFAULT_BUDGET_SECS},
    ui, TICK_RATE_MS,
};

/// draw the goal shape with your mouse before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A fast-paced shape drawing drill: reproduce the goal shape inside the draw \
area before the adaptive timer expires. The editor mode records and tests new reference shapes."
)]
pub struct Cli {
    /// open the shape editor instead of a play session
    #[clap(short, long)]
    editor: bool,

    /// starting timer budget in seconds
    #[clap(short, long, default_value_t = DEFAULT_BUDGET_SECS)]
    secs: f64,

    /// directory for user-authored shapes (defaults to the platform data dir)
    #[clap(long)]
    shapes_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let user_dir = match cli.shapes_dir.clone().or_else(library::default_user_dir) {
        Some(dir) => dir,
        None => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, "no writable shapes directory; pass --shapes-dir")
                .exit();
        }
    };

    // Startup loading is synchronous and fatal on a broken bundled set or an
    // empty merged library.
    let (library, report) = ShapeLibrary::load(user_dir)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let result = if cli.editor {
        let mut app = EditorApp::new(library, report.warnings);
        run_editor(&mut terminal, &runner, &mut app)
    } else {
        let mut app = PlayApp::new(library, cli.secs, report.warnings);
        run_play(&mut terminal, &runner, &mut app)
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Translate a crossterm mouse event into one raw pointer reading.
fn pointer_sample(mouse: &MouseEvent) -> Option<PointerSample> {
    let pressed = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => true,
        MouseEventKind::Up(MouseButton::Left) | MouseEventKind::Moved => false,
        _ => return None,
    };
    Some(PointerSample {
        x: mouse.column as f64,
        y: mouse.row as f64,
        pressed,
        kind: PointerKind::Mouse,
    })
}

struct PlayApp {
    library: ShapeLibrary,
    session: SessionController,
    overlay: ModalOverlay,
    recorder: StrokeRecorder,
    normalizer: InputNormalizer,
    classifier: PointCloudMatcher,
    rng: ThreadRng,
    initial_budget: f64,
    warnings: Vec<String>,
}

impl PlayApp {
    fn new(library: ShapeLibrary, initial_budget: f64, warnings: Vec<String>) -> Self {
        let mut rng = rand::thread_rng();
        let session = SessionController::new(&library, initial_budget, &mut rng);
        Self {
            library,
            session,
            // The start menu is up until the player commits to a round.
            overlay: ModalOverlay::start_menu(),
            recorder: StrokeRecorder::new(RecorderMode::SingleShot, Box::new(NullTrail)),
            normalizer: InputNormalizer::new(),
            classifier: PointCloudMatcher::new(),
            rng,
            initial_budget,
            warnings,
        }
    }

    fn restart(&mut self) {
        self.session = SessionController::new(&self.library, self.initial_budget, &mut self.rng);
        self.recorder.reset();
        self.overlay.hide();
    }

    fn on_tick(&mut self) {
        if !self.overlay.visible {
            self.session
                .tick(TICK_RATE_MS as f64 / 1000.0, &mut self.overlay);
        }
    }

    /// Returns false when the app should exit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        match key.code {
            KeyCode::Esc => {
                if self.overlay.visible {
                    // Backing out of the pause menu ends the session.
                    self.session.abandon();
                    return false;
                }
                self.session.cancel(&mut self.overlay);
                true
            }
            KeyCode::Enter if self.overlay.visible => {
                match self.overlay.mode {
                    OverlayMode::Resume => self.session.resume(&mut self.overlay),
                    OverlayMode::Start | OverlayMode::Retry => self.restart(),
                }
                true
            }
            _ => true,
        }
    }

    fn on_mouse(&mut self, mouse: &MouseEvent, area: geom::Rect) {
        if self.overlay.visible || self.session.phase() != SessionPhase::Playing {
            return;
        }
        let Some(sample) = pointer_sample(mouse) else {
            return;
        };
        let Some(ev) = self.normalizer.sample(sample, &area) else {
            return;
        };

        use strokr::input::Phase;
        match ev.phase {
            Phase::Begin => {
                self.session.clear_outcome();
                self.recorder.on_begin(ev.x, ev.y);
            }
            Phase::Move => self.recorder.on_move(ev.x, ev.y),
            Phase::End => {
                if let Some(candidate) = self.recorder.on_end(ev.x, ev.y) {
                    self.session.submit(
                        &candidate,
                        &self.classifier,
                        &self.library,
                        &mut self.rng,
                    );
                }
            }
        }
    }
}

fn run_play<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E, T>,
    app: &mut PlayApp,
) -> Result<(), Box<dyn Error>> {
    loop {
        let mut area = geom::Rect::new(0.0, 0.0, 0.0, 0.0);
        terminal.draw(|f| {
            let da = ui::draw_area(f.area());
            area = geom::Rect::new(da.x as f64, da.y as f64, da.width as f64, da.height as f64);
            let snap = app.session.snapshot(&app.recorder, &app.overlay);
            ui::draw_play(f, &snap, &app.warnings);
        })?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.on_key(key) {
                    return Ok(());
                }
            }
            AppEvent::Mouse(mouse) => app.on_mouse(&mouse, area),
        }
    }
}

struct EditorApp {
    library: ShapeLibrary,
    editor: EditorController,
    normalizer: InputNormalizer,
    classifier: PointCloudMatcher,
    name_input: String,
    warnings: Vec<String>,
}

impl EditorApp {
    fn new(library: ShapeLibrary, warnings: Vec<String>) -> Self {
        Self {
            library,
            editor: EditorController::new(Box::new(NullTrail)),
            normalizer: InputNormalizer::new(),
            classifier: PointCloudMatcher::new(),
            name_input: String::new(),
            warnings,
        }
    }

    /// Returns false when the app should exit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return false,
                KeyCode::Char('r') => {
                    self.editor.recognize(&self.classifier, &self.library);
                }
                KeyCode::Char('x') => {
                    self.editor.recorder.reset();
                    self.editor.message = None;
                }
                _ => {}
            }
            return true;
        }
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Enter => {
                if self
                    .editor
                    .commit(&self.name_input.clone(), &mut self.library)
                    .is_ok()
                {
                    self.name_input.clear();
                }
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) => self.name_input.push(c),
            _ => {}
        }
        true
    }

    fn on_mouse(&mut self, mouse: &MouseEvent, area: geom::Rect) {
        let Some(sample) = pointer_sample(mouse) else {
            return;
        };
        let Some(ev) = self.normalizer.sample(sample, &area) else {
            return;
        };

        use strokr::input::Phase;
        match ev.phase {
            Phase::Begin => self.editor.recorder.on_begin(ev.x, ev.y),
            Phase::Move => self.editor.recorder.on_move(ev.x, ev.y),
            Phase::End => {
                self.editor.recorder.on_end(ev.x, ev.y);
            }
        }
    }
}

fn run_editor<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E, T>,
    app: &mut EditorApp,
) -> Result<(), Box<dyn Error>> {
    loop {
        let mut area = geom::Rect::new(0.0, 0.0, 0.0, 0.0);
        terminal.draw(|f| {
            let da = ui::draw_area(f.area());
            area = geom::Rect::new(da.x as f64, da.y as f64, da.width as f64, da.height as f64);
            ui::draw_editor(f, &app.editor, &app.name_input, &app.warnings);
        })?;

        match runner.step() {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.on_key(key) {
                    return Ok(());
                }
            }
            AppEvent::Mouse(mouse) => app.on_mouse(&mouse, area),
        }
    }
}
