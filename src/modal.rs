use crate::scene::{Point, Rect};
use crate::sound::{Cue, CuePlayer};

const DIALOG_WIDTH: i32 = 48;
const BUTTON_MARGIN: i32 = 2;

/// What the owning screen should do once a dialog is dismissed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogAction
{
    None,
    NextRobotRound,
    RedrawRobot,
    ResetToys,
    ResetRecipe,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog
{
    pub emoji: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub button: &'static str,
    pub action: DialogAction,
}

/// Cell rectangles of an open dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogLayout
{
    pub frame: Rect,
    pub button: Rect,
}

#[derive(Default)]
pub struct Modal
{
    open: Option<Dialog>,
}

impl Modal
{
    pub fn show(&mut self, dialog: Dialog)
    {
        log::info!("dialog: {}", dialog.title);
        self.open = Some(dialog);
    }

    pub fn is_open(&self) -> bool
    {
        self.open.is_some()
    }

    pub fn current(&self) -> Option<&Dialog>
    {
        self.open.as_ref()
    }

    /// Closes the dialog with a click cue and hands back its action.
    pub fn dismiss(&mut self, player: &mut dyn CuePlayer) -> Option<DialogAction>
    {
        let dialog = self.open.take()?;
        player.play(Cue::Click);
        log::debug!("dialog '{}' closed with {:?}", dialog.title, dialog.action);
        Some(dialog.action)
    }

    /// Dismisses only when `point` lands on the button.
    pub fn click(
        &mut self,
        point: Point,
        screen: (u16, u16),
        player: &mut dyn CuePlayer,
    ) -> Option<DialogAction>
    {
        let layout = self.layout(screen)?;
        if layout.button.contains(point) {
            self.dismiss(player)
        } else {
            None
        }
    }

    pub fn layout(&self, screen: (u16, u16)) -> Option<DialogLayout>
    {
        let dialog = self.open.as_ref()?;
        let width = DIALOG_WIDTH.min(screen.0 as i32).max(12);
        let message_lines = wrap(dialog.message, (width - 4) as usize).len() as i32;
        // emoji, blank, title, blank, message, blank, button (3 rows), borders
        let height = 2 + 1 + 1 + 1 + 1 + message_lines + 1 + 3;
        let x = (screen.0 as i32 - width).max(0) / 2;
        let y = (screen.1 as i32 - height).max(0) / 2;
        let frame = Rect::new(x, y, width, height);

        let button_width = (dialog.button.chars().count() as i32 + 2 * BUTTON_MARGIN + 2).min(width);
        let button = Rect::new(
            x + (width - button_width) / 2,
            y + height - 4,
            button_width,
            3,
        );
        Some(DialogLayout { frame, button })
    }
}

/// Greedy word wrap on spaces; explicit newlines always break.
pub fn wrap(text: &str, width: usize) -> Vec<String>
{
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[derive(Default)]
    struct Recorder
    {
        cues: Vec<Cue>,
    }

    impl CuePlayer for Recorder
    {
        fn play(&mut self, cue: Cue)
        {
            self.cues.push(cue);
        }
    }

    fn dialog() -> Dialog
    {
        Dialog {
            emoji: "🏆",
            title: "Hore!",
            message: "Semua mainan sudah rapi!",
            button: "Main Lagi",
            action: DialogAction::ResetToys,
        }
    }

    #[test]
    fn dismiss_plays_click_and_returns_action()
    {
        let mut modal = Modal::default();
        let mut player = Recorder::default();
        assert_eq!(modal.dismiss(&mut player), None);

        modal.show(dialog());
        assert!(modal.is_open());
        assert_eq!(modal.dismiss(&mut player), Some(DialogAction::ResetToys));
        assert!(!modal.is_open());
        assert_eq!(player.cues, vec![Cue::Click]);
    }

    #[test]
    fn click_outside_button_keeps_dialog_open()
    {
        let mut modal = Modal::default();
        let mut player = Recorder::default();
        modal.show(dialog());
        let layout = modal.layout((80, 24)).unwrap();

        assert_eq!(modal.click(Point::new(layout.frame.x, layout.frame.y), (80, 24), &mut player), None);
        assert!(modal.is_open());

        let hit = modal.click(layout.button.center(), (80, 24), &mut player);
        assert_eq!(hit, Some(DialogAction::ResetToys));
        assert!(player.cues == vec![Cue::Click]);
    }

    #[test]
    fn layout_is_centered_and_button_inside_frame()
    {
        let mut modal = Modal::default();
        modal.show(dialog());
        let layout = modal.layout((80, 24)).unwrap();
        assert_eq!(layout.frame.x, 16);
        assert!(layout.frame.contains(Point::new(layout.button.x, layout.button.y)));
        assert!(layout.frame.y + layout.frame.height >= layout.button.y + layout.button.height);
    }

    #[test]
    fn narrow_screen_keeps_message_above_button()
    {
        let mut modal = Modal::default();
        modal.show(Dialog {
            message: "Bantu robot menemukan berlian sebanyak 10x untuk memenangkan permainan.",
            ..dialog()
        });
        let layout = modal.layout((16, 24)).unwrap();
        let lines = wrap(modal.current().unwrap().message, (layout.frame.width - 4) as usize);
        let last_message_row = layout.frame.y + 5 + lines.len() as i32 - 1;
        assert_eq!(layout.frame.width, 16);
        assert!(last_message_row < layout.button.y);
    }

    #[test]
    fn wrap_breaks_on_words_and_newlines()
    {
        assert_eq!(wrap("satu dua tiga", 8), vec!["satu dua", "tiga"]);
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("panjangsekali", 4), vec!["panjangsekali"]);
    }
}
