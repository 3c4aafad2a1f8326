//! Robot grid puzzle: queue arrow commands, then watch the robot walk them
//! one step per tick and see whether it lands on the gem.

use crate::games::Feedback;
use crate::modal::{Dialog, DialogAction};
use crate::scene::{Element, Point, Rect, Scene};
use crate::sound::Cue;
use rand::Rng;
use std::time::Duration;

pub const GRID_SIZE: i32 = 5;
pub const WIN_SCORE: u32 = 10;
pub const STEP_INTERVAL: Duration = Duration::from_millis(400);

const CELL_WIDTH: i32 = 4;
const CELL_HEIGHT: i32 = 2;
const PANEL_GAP: i32 = 3;
const QUEUE_WIDTH: i32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position
{
    pub x: i32,
    pub y: i32,
}

impl Position
{
    pub fn new(x: i32, y: i32) -> Self
    {
        Self { x, y }
    }

    pub fn on_grid(self) -> bool
    {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    fn random(rng: &mut impl Rng) -> Self
    {
        Self::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command
{
    Up,
    Down,
    Left,
    Right,
}

impl Command
{
    pub const ALL: [Command; 4] = [Command::Up, Command::Down, Command::Left, Command::Right];

    pub fn step(self, from: Position) -> Position
    {
        match self {
            Command::Up => Position::new(from.x, from.y - 1),
            Command::Down => Position::new(from.x, from.y + 1),
            Command::Left => Position::new(from.x - 1, from.y),
            Command::Right => Position::new(from.x + 1, from.y),
        }
    }

    pub fn arrow(self) -> &'static str
    {
        match self {
            Command::Up => "↑",
            Command::Down => "↓",
            Command::Left => "←",
            Command::Right => "→",
        }
    }
}

/// Every position the robot visits, one per command. Steps off the grid are
/// kept; the robot simply is not drawn there.
pub fn trace_path(start: Position, commands: &[Command]) -> Vec<Position>
{
    let mut current = start;
    commands
        .iter()
        .map(|command| {
            current = command.step(current);
            current
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Playback
{
    Idle,
    Playing
    {
        path: Vec<Position>,
        step: usize,
    },
    /// Waiting for the result dialog to be dismissed.
    Finished
    {
        final_position: Position,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundResult
{
    Reached
    {
        score: u32,
    },
    /// The score hit [`WIN_SCORE`] and was reset.
    Champion,
    Missed,
}

/// Clickable parts of the robot screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobotControl
{
    Add(Command),
    Queued(usize),
    Run,
    Clear,
}

pub struct RobotGame
{
    robot: Position,
    gem: Position,
    commands: Vec<Command>,
    score: u32,
    playback: Playback,
    shown: Option<Position>,
    feedback: Feedback,
}

impl RobotGame
{
    pub fn new(rng: &mut impl Rng) -> Self
    {
        let mut game = Self {
            robot: Position::new(0, 0),
            gem: Position::new(0, 0),
            commands: Vec::new(),
            score: 0,
            playback: Playback::Idle,
            shown: None,
            feedback: Feedback::default(),
        };
        game.reset(rng);
        game
    }

    /// Fresh game from the menu: score back to zero plus the rules dialog.
    pub fn enter(&mut self, rng: &mut impl Rng)
    {
        self.reset(rng);
        self.feedback.dialog(rules_dialog());
    }

    pub fn reset(&mut self, rng: &mut impl Rng)
    {
        self.score = 0;
        self.feedback = Feedback::default();
        self.next_round(rng);
    }

    /// New robot and gem positions; the score is kept.
    pub fn next_round(&mut self, rng: &mut impl Rng)
    {
        loop {
            self.robot = Position::random(rng);
            self.gem = Position::random(rng);
            if self.robot != self.gem {
                break;
            }
        }
        self.commands.clear();
        self.playback = Playback::Idle;
        self.shown = Some(self.robot);
        log::debug!("robot round: robot {:?} gem {:?}", self.robot, self.gem);
    }

    /// Puts the robot back on its start cell after a miss, keeping the queue.
    pub fn redraw(&mut self)
    {
        self.playback = Playback::Idle;
        self.shown = Some(self.robot);
    }

    pub fn apply(&mut self, action: DialogAction, rng: &mut impl Rng)
    {
        match action {
            DialogAction::NextRobotRound => self.next_round(rng),
            DialogAction::RedrawRobot => self.redraw(),
            _ => {}
        }
    }

    #[cfg(test)]
    pub fn robot(&self) -> Position
    {
        self.robot
    }

    #[cfg(test)]
    pub fn gem(&self) -> Position
    {
        self.gem
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn commands(&self) -> &[Command]
    {
        &self.commands
    }

    #[cfg(test)]
    pub fn playback(&self) -> &Playback
    {
        &self.playback
    }

    /// Where the robot is drawn right now, `None` while it is off the grid.
    pub fn shown_robot(&self) -> Option<Position>
    {
        self.shown
    }

    pub fn is_idle(&self) -> bool
    {
        self.playback == Playback::Idle
    }

    pub fn take_feedback(&mut self) -> Feedback
    {
        std::mem::take(&mut self.feedback)
    }

    pub fn push_command(&mut self, command: Command)
    {
        if !self.is_idle() {
            return;
        }
        self.feedback.cue(Cue::Click);
        self.commands.push(command);
    }

    pub fn remove_command(&mut self, index: usize)
    {
        if !self.is_idle() || index >= self.commands.len() {
            return;
        }
        self.feedback.cue(Cue::Failure);
        self.commands.remove(index);
    }

    pub fn clear_commands(&mut self)
    {
        if self.is_idle() {
            self.commands.clear();
        }
    }

    /// Starts playback of the queued commands. Returns false when there is
    /// nothing to play or playback is already underway.
    pub fn run(&mut self) -> bool
    {
        if !self.is_idle() || self.commands.is_empty() {
            return false;
        }
        let path = trace_path(self.robot, &self.commands);
        log::debug!("robot path: {:?}", path);
        self.playback = Playback::Playing { path, step: 0 };
        true
    }

    /// Advances playback by one step. The tick after the last step ends the
    /// playback and scores the round.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Option<RoundResult>
    {
        let Playback::Playing { path, step } = &mut self.playback else {
            return None;
        };
        if *step < path.len() {
            let position = path[*step];
            *step += 1;
            self.shown = position.on_grid().then_some(position);
            return None;
        }

        let final_position = path.last().copied().unwrap_or(self.robot);
        self.playback = Playback::Finished { final_position };
        Some(self.score_round(final_position, rng))
    }

    fn score_round(&mut self, final_position: Position, rng: &mut impl Rng) -> RoundResult
    {
        if final_position != self.gem {
            log::info!("robot missed the gem at {:?}, score reset", self.gem);
            self.feedback.cue(Cue::Failure);
            self.score = 0;
            self.feedback.dialog(lost_dialog());
            return RoundResult::Missed;
        }

        self.score += 1;
        self.feedback.cue(Cue::Win);
        if self.score < WIN_SCORE {
            log::info!("robot reached the gem, score {}", self.score);
            let score = self.score;
            self.next_round(rng);
            RoundResult::Reached { score }
        } else {
            log::info!("robot reached the gem {WIN_SCORE} times");
            self.score = 0;
            self.feedback.dialog(won_dialog());
            RoundResult::Champion
        }
    }

    pub fn tap(&mut self, control: RobotControl)
    {
        match control {
            RobotControl::Add(command) => self.push_command(command),
            RobotControl::Queued(index) => self.remove_command(index),
            RobotControl::Run => {
                self.run();
            }
            RobotControl::Clear => self.clear_commands(),
        }
    }

    /// Lays the board and controls out with the grid's top-left at `origin`.
    pub fn layout(&self, origin: Point) -> Scene<RobotControl>
    {
        let mut scene = Scene::new();
        let root = scene.root();

        let grid_rect = Rect::new(
            origin.x,
            origin.y,
            GRID_SIZE * CELL_WIDTH + 2,
            GRID_SIZE * CELL_HEIGHT + 2,
        );
        let grid = scene.insert(root, Element::area(grid_rect, format!("Skor: {}", self.score)));
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let here = Position::new(x, y);
                let label = if self.shown_robot() == Some(here) {
                    "🤖"
                } else if self.gem == here {
                    "💎"
                } else {
                    "·"
                };
                let rect = Rect::new(
                    grid_rect.x + 1 + x * CELL_WIDTH,
                    grid_rect.y + 1 + y * CELL_HEIGHT,
                    CELL_WIDTH,
                    CELL_HEIGHT,
                );
                scene.insert(grid, Element::text(rect, label));
            }
        }

        let panel_x = grid_rect.x + grid_rect.width + PANEL_GAP;
        let palette = scene.insert(
            root,
            Element::area(Rect::new(panel_x, origin.y, QUEUE_WIDTH, 5), "Perintah"),
        );
        for (idx, command) in Command::ALL.iter().enumerate() {
            let rect = Rect::new(panel_x + 1 + idx as i32 * 6, origin.y + 1, 5, 3);
            scene.insert(palette, Element::button(rect, command.arrow(), RobotControl::Add(*command)));
        }

        let queue_rows = (self.commands.len() as i32 / ((QUEUE_WIDTH - 2) / 3)).max(0) + 1;
        let queue_rect = Rect::new(panel_x, origin.y + 6, QUEUE_WIDTH, queue_rows + 2);
        let queue = scene.insert(root, Element::area(queue_rect, "Urutan"));
        let per_row = ((QUEUE_WIDTH - 2) / 3) as usize;
        for (idx, command) in self.commands.iter().enumerate() {
            let rect = Rect::new(
                queue_rect.x + 1 + (idx % per_row) as i32 * 3,
                queue_rect.y + 1 + (idx / per_row) as i32,
                3,
                1,
            );
            let mut chip = Element::text(rect, command.arrow());
            chip.key = Some(RobotControl::Queued(idx));
            scene.insert(queue, chip);
        }

        let buttons_y = queue_rect.y + queue_rect.height + 1;
        scene.insert(
            root,
            Element::button(Rect::new(panel_x, buttons_y, 14, 3), "Jalankan ▶", RobotControl::Run),
        );
        scene.insert(
            root,
            Element::button(Rect::new(panel_x + 16, buttons_y, 10, 3), "Hapus", RobotControl::Clear),
        );
        scene
    }
}

/// The control under `point` in a laid-out robot screen.
pub fn control_at(scene: &Scene<RobotControl>, point: Point) -> Option<RobotControl>
{
    let hit = scene.hit_test(point)?;
    scene.get(hit)?.key
}

pub fn rules_dialog() -> Dialog
{
    Dialog {
        emoji: "❔",
        title: "Peraturan",
        message: "Bantu robot menemukan berlian!\nBantu robot menemukan berlian sebanyak 10x untuk memenangkan permainan.",
        button: "Mulai permainan!",
        action: DialogAction::None,
    }
}

fn won_dialog() -> Dialog
{
    Dialog {
        emoji: "🎉",
        title: "Berhasil!",
        message: "Kamu hebat! Robotnya sampai ke tujuan.",
        button: "Main Lagi",
        action: DialogAction::NextRobotRound,
    }
}

fn lost_dialog() -> Dialog
{
    Dialog {
        emoji: "😥",
        title: "Oh tidak!",
        message: "Robotnya tersesat. Coba periksa lagi urutan perintahmu!",
        button: "Coba Lagi",
        action: DialogAction::RedrawRobot,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng
    {
        StdRng::seed_from_u64(7)
    }

    fn route(from: Position, to: Position) -> Vec<Command>
    {
        let mut commands = Vec::new();
        let horizontal = if to.x > from.x { Command::Right } else { Command::Left };
        let vertical = if to.y > from.y { Command::Down } else { Command::Up };
        commands.extend(std::iter::repeat_n(horizontal, (to.x - from.x).unsigned_abs() as usize));
        commands.extend(std::iter::repeat_n(vertical, (to.y - from.y).unsigned_abs() as usize));
        commands
    }

    fn play_out(game: &mut RobotGame, rng: &mut StdRng) -> RoundResult
    {
        assert!(game.run());
        for _ in 0..100 {
            if let Some(result) = game.tick(rng) {
                return result;
            }
        }
        panic!("playback never finished");
    }

    fn solve(game: &mut RobotGame, rng: &mut StdRng) -> RoundResult
    {
        for command in route(game.robot(), game.gem()) {
            game.push_command(command);
        }
        play_out(game, rng)
    }

    #[test]
    fn path_applies_each_command_in_order()
    {
        use Command::*;
        let path = trace_path(Position::new(2, 2), &[Up, Up, Left, Down, Right, Right]);
        assert_eq!(
            path,
            vec![
                Position::new(2, 1),
                Position::new(2, 0),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(3, 1),
            ]
        );
        assert!(trace_path(Position::new(0, 0), &[]).is_empty());
    }

    #[test]
    fn rounds_start_with_distinct_robot_and_gem()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        for _ in 0..50 {
            game.next_round(&mut rng);
            assert_ne!(game.robot(), game.gem());
            assert!(game.robot().on_grid() && game.gem().on_grid());
            assert_eq!(game.shown_robot(), Some(game.robot()));
        }
    }

    #[test]
    fn commands_are_queued_and_removed_with_cues()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.push_command(Command::Up);
        game.push_command(Command::Left);
        game.push_command(Command::Down);
        game.remove_command(1);
        game.remove_command(9);
        assert_eq!(game.commands(), &[Command::Up, Command::Down]);
        assert_eq!(
            game.take_feedback().cues,
            vec![Cue::Click, Cue::Click, Cue::Click, Cue::Failure]
        );
        game.clear_commands();
        assert!(game.commands().is_empty());
    }

    #[test]
    fn running_empty_queue_does_nothing()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        assert!(!game.run());
        assert!(game.is_idle());
        assert_eq!(game.tick(&mut rng), None);
    }

    #[test]
    fn playback_moves_one_step_per_tick_then_finishes()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.robot = Position::new(0, 0);
        game.gem = Position::new(4, 4);
        game.shown = Some(game.robot);
        game.push_command(Command::Right);
        game.push_command(Command::Down);
        assert!(game.run());

        assert_eq!(game.tick(&mut rng), None);
        assert_eq!(game.shown_robot(), Some(Position::new(1, 0)));
        game.push_command(Command::Up);
        assert_eq!(game.commands().len(), 2);
        assert_eq!(game.tick(&mut rng), None);
        assert_eq!(game.shown_robot(), Some(Position::new(1, 1)));
        assert_eq!(game.tick(&mut rng), Some(RoundResult::Missed));
        assert_eq!(
            game.playback(),
            &Playback::Finished {
                final_position: Position::new(1, 1)
            }
        );
        assert_eq!(game.tick(&mut rng), None);
    }

    #[test]
    fn off_grid_steps_hide_the_robot()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.robot = Position::new(0, 0);
        game.gem = Position::new(3, 3);
        game.push_command(Command::Up);
        game.run();
        game.tick(&mut rng);
        assert_eq!(game.shown_robot(), None);
    }

    #[test]
    fn reaching_gem_scores_and_starts_new_round()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.take_feedback();

        let result = solve(&mut game, &mut rng);
        assert_eq!(result, RoundResult::Reached { score: 1 });
        assert_eq!(game.score(), 1);
        assert!(game.is_idle());
        assert!(game.commands().is_empty());
        let feedback = game.take_feedback();
        assert!(feedback.cues.ends_with(&[Cue::Win]));
        assert_eq!(feedback.dialog, None);
    }

    #[test]
    fn tenth_success_shows_win_dialog_and_resets_score()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        for expected in 1..WIN_SCORE {
            assert_eq!(solve(&mut game, &mut rng), RoundResult::Reached { score: expected });
        }
        game.take_feedback();

        assert_eq!(solve(&mut game, &mut rng), RoundResult::Champion);
        assert_eq!(game.score(), 0);
        let feedback = game.take_feedback();
        let dialog = feedback.dialog.expect("win dialog");
        assert_eq!(dialog.title, "Berhasil!");
        assert_eq!(dialog.action, DialogAction::NextRobotRound);

        game.apply(DialogAction::NextRobotRound, &mut rng);
        assert!(game.is_idle());
        assert_eq!(game.shown_robot(), Some(game.robot()));
    }

    #[test]
    fn missing_resets_score_and_keeps_queue()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        solve(&mut game, &mut rng);
        solve(&mut game, &mut rng);
        assert_eq!(game.score(), 2);
        game.take_feedback();

        game.robot = Position::new(0, 0);
        game.gem = Position::new(4, 0);
        game.push_command(Command::Down);
        assert_eq!(play_out(&mut game, &mut rng), RoundResult::Missed);
        assert_eq!(game.score(), 0);
        let feedback = game.take_feedback();
        assert!(feedback.cues.ends_with(&[Cue::Failure]));
        assert_eq!(feedback.dialog.map(|dialog| dialog.action), Some(DialogAction::RedrawRobot));

        game.apply(DialogAction::RedrawRobot, &mut rng);
        assert!(game.is_idle());
        assert_eq!(game.shown_robot(), Some(Position::new(0, 0)));
        assert_eq!(game.commands(), &[Command::Down]);
    }

    #[test]
    fn enter_resets_everything_and_shows_rules()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        solve(&mut game, &mut rng);
        game.push_command(Command::Left);
        game.run();
        game.tick(&mut rng);

        game.enter(&mut rng);
        assert_eq!(game.score(), 0);
        assert!(game.commands().is_empty());
        assert!(game.is_idle());
        let feedback = game.take_feedback();
        assert_eq!(feedback.cues, Vec::<Cue>::new());
        assert_eq!(feedback.dialog, Some(rules_dialog()));
    }

    #[test]
    fn layout_exposes_tappable_controls()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.push_command(Command::Left);
        game.push_command(Command::Right);
        let scene = game.layout(Point::new(0, 0));

        let panel_x = GRID_SIZE * CELL_WIDTH + 2 + PANEL_GAP;
        assert_eq!(control_at(&scene, Point::new(panel_x + 2, 2)), Some(RobotControl::Add(Command::Up)));
        assert_eq!(control_at(&scene, Point::new(panel_x + 20, 2)), Some(RobotControl::Add(Command::Right)));
        assert_eq!(control_at(&scene, Point::new(panel_x + 4, 7)), Some(RobotControl::Queued(1)));
        assert_eq!(control_at(&scene, Point::new(2, 2)), None);

        let robot_cells = scene
            .paint_order()
            .into_iter()
            .filter(|id| scene.get(*id).is_some_and(|element| element.label == "🤖"))
            .count();
        assert_eq!(robot_cells, 1);
    }

    #[test]
    fn tap_routes_to_game_actions()
    {
        let mut rng = rng();
        let mut game = RobotGame::new(&mut rng);
        game.tap(RobotControl::Add(Command::Down));
        game.tap(RobotControl::Add(Command::Down));
        game.tap(RobotControl::Queued(0));
        assert_eq!(game.commands(), &[Command::Down]);
        game.tap(RobotControl::Run);
        assert!(!game.is_idle());
        game.tap(RobotControl::Clear);
        assert_eq!(game.commands().len(), 1);
    }
}
