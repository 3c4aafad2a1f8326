pub mod recipe;
pub mod robot;
pub mod toys;

use crate::modal::Dialog;
use crate::sound::Cue;

pub struct GameDescriptor
{
    pub name: &'static str,
    pub emoji: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![
        GameDescriptor {
            name: "robot",
            emoji: "🤖",
            title: "Robot Pintar",
            description: "Guide the robot to the gem with arrow commands",
        },
        GameDescriptor {
            name: "toys",
            emoji: "🧸",
            title: "Rapikan Mainan",
            description: "Drag every toy into its matching box",
        },
        GameDescriptor {
            name: "recipe",
            emoji: "🎂",
            title: "Kue Ajaib",
            description: "Add the ingredients in recipe order",
        },
    ]
}

/// Cues and dialogs a game produced since the last drain.
#[derive(Debug, Default, PartialEq)]
pub struct Feedback
{
    pub cues: Vec<Cue>,
    pub dialog: Option<Dialog>,
}

impl Feedback
{
    pub fn cue(&mut self, cue: Cue)
    {
        self.cues.push(cue);
    }

    pub fn dialog(&mut self, dialog: Dialog)
    {
        self.dialog = Some(dialog);
    }

    pub fn is_empty(&self) -> bool
    {
        self.cues.is_empty() && self.dialog.is_none()
    }
}
