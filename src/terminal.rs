use crate::scene::{Emphasis, Rect, Scene};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};

pub struct TerminalGuard
{
    stdout: Stdout,
}

impl TerminalGuard
{
    pub fn enter() -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(Self { stdout })
    }

    pub fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        let _ = execute!(self.stdout, Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn screen_size() -> (u16, u16)
{
    terminal::size().unwrap_or((80, 24))
}

/// Columns a string occupies. Emoji take two cells, variation selectors none.
pub fn display_width(text: &str) -> i32
{
    text.chars().map(char_width).sum()
}

fn char_width(ch: char) -> i32
{
    let code = ch as u32;
    match code {
        0xFE00..=0xFE0F | 0x200D => 0,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x2B50..=0x2B55 => 2,
        _ => 1,
    }
}

pub fn draw_text(out: &mut impl Write, x: i32, y: i32, text: &str) -> io::Result<()>
{
    if x < 0 || y < 0 || text.is_empty() {
        return Ok(());
    }
    queue!(out, MoveTo(x as u16, y as u16), Print(text))
}

/// Writes each line of `text` centered inside `rect`.
pub fn draw_centered(out: &mut impl Write, rect: Rect, text: &str) -> io::Result<()>
{
    let lines: Vec<&str> = text.split('\n').collect();
    let top = rect.y + (rect.height - lines.len() as i32).max(0) / 2;
    for (idx, line) in lines.iter().enumerate() {
        let x = rect.x + (rect.width - display_width(line)).max(0) / 2;
        draw_text(out, x, top + idx as i32, line)?;
    }
    Ok(())
}

pub fn draw_frame(out: &mut impl Write, rect: Rect) -> io::Result<()>
{
    if rect.width < 2 || rect.height < 2 {
        return Ok(());
    }
    let inner = (rect.width - 2) as usize;
    draw_text(out, rect.x, rect.y, &format!("┌{}┐", "─".repeat(inner)))?;
    for row in 1..rect.height - 1 {
        draw_text(out, rect.x, rect.y + row, &format!("│{}│", " ".repeat(inner)))?;
    }
    draw_text(out, rect.x, rect.y + rect.height - 1, &format!("└{}┘", "─".repeat(inner)))
}

/// Paints every visible element of `scene` bottom to top.
pub fn draw_scene<K: Clone>(out: &mut impl Write, scene: &Scene<K>) -> io::Result<()>
{
    for id in scene.paint_order() {
        let Some(element) = scene.get(id) else {
            continue;
        };
        if element.is_dimmed() {
            queue!(out, SetAttribute(Attribute::Dim))?;
        }
        match element.emphasis {
            Emphasis::Normal => {}
            Emphasis::Bold => queue!(out, SetAttribute(Attribute::Bold))?,
            Emphasis::CrossedOut => queue!(out, SetAttribute(Attribute::CrossedOut))?,
        }

        if element.framed {
            draw_frame(out, element.rect)?;
        }
        if element.is_titled() {
            draw_text(out, element.rect.x + 2, element.rect.y, &format!(" {} ", element.label))?;
        } else {
            draw_centered(out, element.rect, &element.label)?;
        }
        queue!(out, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::scene::Element;

    #[test]
    fn emoji_count_as_two_cells()
    {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("🤖"), 2);
        assert_eq!(display_width("🛏️"), 2);
        assert_eq!(display_width("⚽ x"), 4);
    }

    #[test]
    fn text_off_screen_is_skipped()
    {
        let mut out = Vec::new();
        draw_text(&mut out, -1, 0, "hidden").unwrap();
        draw_text(&mut out, 0, -3, "hidden").unwrap();
        assert!(out.is_empty());
        draw_text(&mut out, 0, 0, "shown").unwrap();
        assert!(String::from_utf8(out).unwrap().contains("shown"));
    }

    #[test]
    fn scene_paint_includes_labels_of_visible_elements()
    {
        let mut scene: Scene<u8> = Scene::new();
        let root = scene.root();
        let area = scene.insert(root, Element::area(Rect::new(0, 0, 20, 6), "Mainan"));
        scene.insert(area, Element::item(Rect::new(1, 1, 6, 3), "toy", 1));
        let hidden = scene.insert(area, Element::item(Rect::new(8, 1, 6, 3), "gone", 2));
        scene.get_mut(hidden).unwrap().visible = false;

        let mut out = Vec::new();
        draw_scene(&mut out, &scene).unwrap();
        let painted = String::from_utf8(out).unwrap();
        assert!(painted.contains(" Mainan "));
        assert!(painted.contains("toy"));
        assert!(!painted.contains("gone"));
    }
}
