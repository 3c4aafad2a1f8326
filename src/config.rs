use crate::dragdrop::InputSource;
use crate::error::{GameError, Result};
use std::env;

const DRAG_ENV: &str = "KID_GAMES_DRAG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig
{
    /// How terminal mouse drags are interpreted.
    pub drag_style: InputSource,
    pub muted: bool,
    /// Fixed seed for reproducible shuffles and robot placement.
    pub seed: Option<u64>,
}

impl Default for AppConfig
{
    fn default() -> Self
    {
        Self {
            drag_style: InputSource::Touch,
            muted: false,
            seed: None,
        }
    }
}

impl AppConfig
{
    /// Reads `KID_GAMES_DRAG` first, then lets command-line options override it.
    pub fn from_args(args: &[String]) -> Result<Self>
    {
        let mut config = Self::default();
        if let Ok(value) = env::var(DRAG_ENV) {
            config.drag_style = parse_drag_style(&value)?;
        }
        config.apply_args(args)?;
        Ok(config)
    }

    fn apply_args(&mut self, args: &[String]) -> Result<()>
    {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--mute" {
                self.muted = true;
            } else if arg == "--drag" {
                let value = iter
                    .next()
                    .ok_or_else(|| invalid("Expected value after --drag"))?;
                self.drag_style = parse_drag_style(value)?;
            } else if let Some(rest) = arg.strip_prefix("--drag=") {
                self.drag_style = parse_drag_style(rest)?;
            } else if arg == "--seed" {
                let value = iter
                    .next()
                    .ok_or_else(|| invalid("Expected value after --seed"))?;
                self.seed = Some(parse_seed(value)?);
            } else if let Some(rest) = arg.strip_prefix("--seed=") {
                self.seed = Some(parse_seed(rest)?);
            } else {
                return Err(invalid(format!("Unknown option '{arg}'")));
            }
        }
        Ok(())
    }
}

fn parse_drag_style(value: &str) -> Result<InputSource>
{
    match value.trim().to_ascii_lowercase().as_str() {
        "touch" => Ok(InputSource::Touch),
        "pointer" | "mouse" => Ok(InputSource::Pointer),
        other => Err(invalid(format!("Drag style must be 'touch' or 'pointer', got '{other}'"))),
    }
}

fn parse_seed(value: &str) -> Result<u64>
{
    value
        .parse::<u64>()
        .map_err(|_| invalid("Seed must be a non-negative integer"))
}

fn invalid(message: impl Into<String>) -> GameError
{
    GameError::InvalidOption(message.into())
}
