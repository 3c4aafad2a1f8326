use crate::config::AppConfig;
use crate::dragdrop::{DragDrop, Gesture, GestureOutcome, InputSource};
use crate::error::Result;
use crate::games::recipe::{RECIPE, RecipeGame};
use crate::games::robot::{self, Command, RobotGame, STEP_INTERVAL};
use crate::games::toys::ToysGame;
use crate::games::{self, Feedback};
use crate::modal::{self, DialogAction, Modal};
use crate::scene::{Point, Rect, Scene};
use crate::sound::{Cue, CuePlayer, Muted, TerminalChime};
use crate::terminal::{self, TerminalGuard, draw_centered, draw_frame, draw_text};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::time::{Duration, Instant};

const TICK_MS: u64 = 33;
const PLAY_ORIGIN: Point = Point { x: 2, y: 3 };
const BACK_BUTTON: Rect = Rect {
    x: 0,
    y: 0,
    width: 8,
    height: 1,
};
const MENU_TOP: i32 = 4;
const MENU_ENTRY_HEIGHT: i32 = 3;
const MENU_ENTRY_WIDTH: i32 = 56;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen
{
    Menu,
    Robot,
    Toys,
    Recipe,
}

impl Screen
{
    pub fn from_name(name: &str) -> Option<Self>
    {
        match name {
            "robot" => Some(Screen::Robot),
            "toys" => Some(Screen::Toys),
            "recipe" => Some(Screen::Recipe),
            _ => None,
        }
    }
}

pub fn run(config: AppConfig, start: Screen) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;
    let mut app = App::new(config);
    app.resize(terminal::screen_size());
    if start != Screen::Menu {
        app.open(start);
    }
    log::info!("started on {:?}", start);

    let mut last_tick = Instant::now();
    loop {
        if handle_events(&mut app)? {
            break;
        }

        let now = Instant::now();
        app.tick(now);
        app.player.pump(term.stdout(), now)?;

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            app.draw(term.stdout(), now)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    log::info!("bye");
    Ok(())
}

fn handle_events(app: &mut App) -> Result<bool>
{
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) => {
                if kind != KeyEventKind::Release {
                    app.handle_key(code, modifiers);
                }
            }
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => {
                app.handle_mouse(kind, Point::new(column as i32, row as i32));
            }
            Event::Resize(cols, rows) => app.resize((cols, rows)),
            _ => {}
        }
        if app.should_quit() {
            return Ok(true);
        }
    }
    Ok(false)
}

pub struct App
{
    config: AppConfig,
    rng: StdRng,
    screen: Screen,
    menu_index: usize,
    robot: RobotGame,
    toys: ToysGame,
    recipe: RecipeGame,
    modal: Modal,
    player: Box<dyn CuePlayer>,
    size: (u16, u16),
    last_step: Instant,
    quit: bool,
}

impl App
{
    pub fn new(config: AppConfig) -> Self
    {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player: Box<dyn CuePlayer> = if config.muted {
            Box::new(Muted)
        } else {
            Box::new(TerminalChime::new())
        };
        Self {
            robot: RobotGame::new(&mut rng),
            toys: ToysGame::new(PLAY_ORIGIN, &mut rng),
            recipe: RecipeGame::new(PLAY_ORIGIN, &mut rng),
            config,
            rng,
            screen: Screen::Menu,
            menu_index: 0,
            modal: Modal::default(),
            player,
            size: (80, 24),
            last_step: Instant::now(),
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool
    {
        self.quit
    }

    pub fn resize(&mut self, size: (u16, u16))
    {
        self.size = size;
    }

    /// Switches to a game, re-initializing it.
    pub fn open(&mut self, screen: Screen)
    {
        self.player.play(Cue::Click);
        match screen {
            Screen::Menu => {}
            Screen::Robot => self.robot.enter(&mut self.rng),
            Screen::Toys => self.toys.reset(&mut self.rng),
            Screen::Recipe => self.recipe.reset(&mut self.rng),
        }
        log::info!("screen {:?}", screen);
        self.screen = screen;
        self.drain_feedback();
    }

    pub fn back_to_menu(&mut self)
    {
        self.player.play(Cue::Click);
        self.screen = Screen::Menu;
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers)
    {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        if self.modal.is_open() {
            if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                if let Some(action) = self.modal.dismiss(&mut *self.player) {
                    self.apply(action);
                }
            }
            return;
        }

        match self.screen {
            Screen::Menu => self.menu_key(code),
            Screen::Robot => match code {
                KeyCode::Esc => self.back_to_menu(),
                KeyCode::Up => self.robot.push_command(Command::Up),
                KeyCode::Down => self.robot.push_command(Command::Down),
                KeyCode::Left => self.robot.push_command(Command::Left),
                KeyCode::Right => self.robot.push_command(Command::Right),
                KeyCode::Backspace => {
                    if let Some(last) = self.robot.commands().len().checked_sub(1) {
                        self.robot.remove_command(last);
                    }
                }
                KeyCode::Char('c') => self.robot.clear_commands(),
                KeyCode::Enter | KeyCode::Char('r') => self.run_robot(),
                _ => {}
            },
            Screen::Toys | Screen::Recipe => {
                if code == KeyCode::Esc {
                    self.back_to_menu();
                }
            }
        }
        self.drain_feedback();
    }

    fn menu_key(&mut self, code: KeyCode)
    {
        let count = games::registry().len();
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
            KeyCode::Up => self.menu_index = (self.menu_index + count - 1) % count,
            KeyCode::Down => self.menu_index = (self.menu_index + 1) % count,
            KeyCode::Enter => self.open_entry(self.menu_index),
            KeyCode::Char(ch) => {
                if let Some(index) = ch.to_digit(10).and_then(|digit| (digit as usize).checked_sub(1)) {
                    self.open_entry(index);
                }
            }
            _ => {}
        }
    }

    fn open_entry(&mut self, index: usize)
    {
        let registry = games::registry();
        if let Some(screen) = registry.get(index).and_then(|game| Screen::from_name(game.name)) {
            self.menu_index = index;
            self.open(screen);
        }
    }

    pub fn handle_mouse(&mut self, kind: MouseEventKind, point: Point)
    {
        let pressed = kind == MouseEventKind::Down(MouseButton::Left);
        if self.modal.is_open() {
            if pressed {
                if let Some(action) = self.modal.click(point, self.size, &mut *self.player) {
                    self.apply(action);
                }
            }
            return;
        }

        if self.screen == Screen::Menu {
            if pressed {
                if let Some(index) = menu_entries().iter().position(|rect| rect.contains(point)) {
                    self.open_entry(index);
                }
            }
            return;
        }
        if pressed && BACK_BUTTON.contains(point) {
            self.back_to_menu();
            return;
        }

        if self.screen == Screen::Robot {
            if pressed {
                self.tap_robot(point);
            }
            return;
        }

        let gesture = match kind {
            MouseEventKind::Down(MouseButton::Left) => Gesture::Start(point),
            MouseEventKind::Drag(MouseButton::Left) => Gesture::Move(point),
            MouseEventKind::Up(MouseButton::Left) => Gesture::End(point),
            _ => return,
        };
        let source = self.config.drag_style;
        // A press while a drag is still open means its release happened
        // outside the terminal and never arrived.
        let outcome = match self.screen {
            Screen::Toys => {
                if pressed && self.toys.drag().is_dragging() {
                    self.toys.cancel_drag();
                }
                self.toys.handle_gesture(source, gesture)
            }
            Screen::Recipe => {
                if pressed && self.recipe.drag().is_dragging() {
                    self.recipe.cancel_drag();
                }
                self.recipe.handle_gesture(source, gesture)
            }
            Screen::Menu | Screen::Robot => return,
        };
        match outcome {
            // Mouse capture already keeps the terminal from scrolling.
            GestureOutcome::Moved { suppress_default } => {
                log::trace!("drag moved, suppress default: {suppress_default}");
            }
            GestureOutcome::Dropped { .. } => self.drain_feedback(),
            GestureOutcome::Ignored | GestureOutcome::Started(_) | GestureOutcome::Aborted(_) => {}
        }
    }

    fn tap_robot(&mut self, point: Point)
    {
        let layout = self.robot.layout(PLAY_ORIGIN);
        if let Some(control) = robot::control_at(&layout, point) {
            let was_idle = self.robot.is_idle();
            self.robot.tap(control);
            if was_idle && !self.robot.is_idle() {
                self.last_step = Instant::now();
            }
        }
        self.drain_feedback();
    }

    fn run_robot(&mut self)
    {
        if self.robot.run() {
            self.last_step = Instant::now();
        }
    }

    /// Drives robot playback at its fixed step interval.
    pub fn tick(&mut self, now: Instant)
    {
        if self.screen != Screen::Robot || self.robot.is_idle() {
            return;
        }
        if now.saturating_duration_since(self.last_step) < STEP_INTERVAL {
            return;
        }
        self.last_step = now;
        if let Some(result) = self.robot.tick(&mut self.rng) {
            log::debug!("robot round result: {:?}", result);
        }
        self.drain_feedback();
    }

    fn apply(&mut self, action: DialogAction)
    {
        match action {
            DialogAction::None => {}
            DialogAction::NextRobotRound | DialogAction::RedrawRobot => {
                self.robot.apply(action, &mut self.rng);
            }
            DialogAction::ResetToys => self.toys.reset(&mut self.rng),
            DialogAction::ResetRecipe => self.recipe.reset(&mut self.rng),
        }
        self.drain_feedback();
    }

    fn drain_feedback(&mut self)
    {
        let feedback = match self.screen {
            Screen::Menu => Feedback::default(),
            Screen::Robot => self.robot.take_feedback(),
            Screen::Toys => self.toys.take_feedback(),
            Screen::Recipe => self.recipe.take_feedback(),
        };
        if feedback.is_empty() {
            return;
        }
        for cue in feedback.cues {
            self.player.play(cue);
        }
        if let Some(dialog) = feedback.dialog {
            self.modal.show(dialog);
        }
    }

    pub fn draw(&self, out: &mut impl Write, now: Instant) -> Result<()>
    {
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        match self.screen {
            Screen::Menu => self.draw_menu(out)?,
            Screen::Robot => {
                self.draw_header(out, "Robot Pintar", &format!("Skor: {}/{}", self.robot.score(), robot::WIN_SCORE))?;
                terminal::draw_scene(out, &self.robot.layout(PLAY_ORIGIN))?;
            }
            Screen::Toys => {
                let detail = if self.toys.is_complete() {
                    "Semua mainan sudah rapi!".to_string()
                } else {
                    format!("Mainan tersisa: {}", self.toys.remaining().len())
                };
                self.draw_header(out, "Rapikan Mainan", &detail)?;
                terminal::draw_scene(out, self.toys.scene())?;
                draw_drag_ghost(out, self.toys.drag(), self.toys.scene())?;
            }
            Screen::Recipe => {
                let detail = if self.recipe.is_complete() {
                    "Kuenya sudah jadi!".to_string()
                } else {
                    format!("Langkah {} dari {}", self.recipe.cursor() + 1, RECIPE.len())
                };
                self.draw_header(out, "Kue Ajaib", &detail)?;
                terminal::draw_scene(out, self.recipe.scene())?;
                draw_drag_ghost(out, self.recipe.drag(), self.recipe.scene())?;
            }
        }
        self.draw_status(out, now)?;
        self.draw_modal(out)?;
        out.flush()?;
        Ok(())
    }

    fn draw_header(&self, out: &mut impl Write, title: &str, detail: &str) -> Result<()>
    {
        draw_text(out, BACK_BUTTON.x, BACK_BUTTON.y, "< Menu")?;
        draw_text(out, BACK_BUTTON.width + 2, 0, title)?;
        draw_text(out, BACK_BUTTON.width + 2, 1, detail)?;
        Ok(())
    }

    fn draw_menu(&self, out: &mut impl Write) -> Result<()>
    {
        draw_text(out, 4, 1, "Ayo Bermain!")?;
        draw_text(out, 4, 2, "Pilih permainan dengan klik, angka, atau panah + Enter")?;
        for (idx, (game, rect)) in games::registry().iter().zip(menu_entries()).enumerate() {
            draw_frame(out, rect)?;
            let marker = if idx == self.menu_index { ">" } else { " " };
            let line = format!("{marker} {}. {} {} - {}", idx + 1, game.emoji, game.title, game.description);
            draw_text(out, rect.x + 1, rect.y + 1, &line)?;
        }
        Ok(())
    }

    fn draw_status(&self, out: &mut impl Write, now: Instant) -> Result<()>
    {
        let hint = match self.screen {
            Screen::Menu => "Esc/q keluar",
            Screen::Robot => "Panah: tambah perintah  Backspace: hapus  Enter: jalankan  Esc: menu",
            Screen::Toys | Screen::Recipe if self.is_dragging() => "Lepaskan di tempat yang tepat",
            Screen::Toys | Screen::Recipe => match self.config.drag_style {
                InputSource::Touch => "Seret dengan mouse (mode sentuh)  Esc: menu",
                InputSource::Pointer => "Seret dengan mouse (mode pointer)  Esc: menu",
            },
        };
        let row = self.size.1 as i32 - 1;
        draw_text(out, 0, row, hint)?;
        if let Some(pitch) = self.player.now_playing(now) {
            draw_text(out, self.size.0 as i32 - 6, row, &format!("♪ {pitch}"))?;
        }
        Ok(())
    }

    fn is_dragging(&self) -> bool
    {
        match self.screen {
            Screen::Toys => self.toys.drag().is_dragging(),
            Screen::Recipe => self.recipe.drag().is_dragging(),
            Screen::Menu | Screen::Robot => false,
        }
    }

    fn draw_modal(&self, out: &mut impl Write) -> Result<()>
    {
        let (Some(dialog), Some(layout)) = (self.modal.current(), self.modal.layout(self.size)) else {
            return Ok(());
        };
        let frame = layout.frame;
        draw_frame(out, frame)?;
        draw_centered(out, Rect::new(frame.x, frame.y + 1, frame.width, 1), dialog.emoji)?;
        draw_centered(out, Rect::new(frame.x, frame.y + 3, frame.width, 1), dialog.title)?;
        for (idx, line) in modal::wrap(dialog.message, (frame.width - 4) as usize).iter().enumerate() {
            draw_centered(out, Rect::new(frame.x, frame.y + 5 + idx as i32, frame.width, 1), line)?;
        }
        draw_frame(out, layout.button)?;
        draw_centered(out, layout.button, dialog.button)?;
        Ok(())
    }
}

/// Pointer drags have no proxy element, so the dragged label follows the
/// cursor here instead.
fn draw_drag_ghost<K: Clone>(out: &mut impl Write, drag: &DragDrop, scene: &Scene<K>) -> Result<()>
{
    if drag.proxy().is_some() {
        return Ok(());
    }
    let (Some(item), Some(point)) = (drag.current_item(), drag.last_position()) else {
        return Ok(());
    };
    if let Some(element) = scene.get(item) {
        let label = element.label.replace('\n', " ");
        draw_text(out, point.x - terminal::display_width(&label) / 2, point.y, &label)?;
    }
    Ok(())
}

fn menu_entries() -> Vec<Rect>
{
    (0..games::registry().len() as i32)
        .map(|idx| {
            Rect::new(
                4,
                MENU_TOP + idx * (MENU_ENTRY_HEIGHT + 1),
                MENU_ENTRY_WIDTH,
                MENU_ENTRY_HEIGHT,
            )
        })
        .collect()
}
