use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Delay between the trigger and the first note of a cue.
const WIN_START_OFFSET: Duration = Duration::from_millis(10);
const WIN_SECOND_NOTE: Duration = Duration::from_millis(200);
const WIN_THIRD_NOTE: Duration = Duration::from_millis(400);
/// How long the status line keeps showing the last note.
const NOTE_DISPLAY: Duration = Duration::from_millis(600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue
{
    Success,
    Failure,
    Click,
    Drop,
    Win,
}

impl Cue
{
    pub const ALL: [Cue; 5] = [Cue::Success, Cue::Failure, Cue::Click, Cue::Drop, Cue::Win];

    pub fn name(self) -> &'static str
    {
        match self {
            Cue::Success => "success",
            Cue::Failure => "failure",
            Cue::Click => "click",
            Cue::Drop => "drop",
            Cue::Win => "win",
        }
    }

    /// Notes making up the cue, with their offsets from the trigger.
    pub fn notes(self) -> Vec<Note>
    {
        match self {
            Cue::Success => vec![Note::now("C5", NoteLength::Eighth)],
            Cue::Failure => vec![Note::now("C3", NoteLength::Eighth)],
            Cue::Click => vec![Note::now("C4", NoteLength::Sixteenth)],
            Cue::Drop => vec![Note::now("E4", NoteLength::Sixteenth)],
            Cue::Win => vec![
                Note::at("C5", NoteLength::Eighth, WIN_START_OFFSET),
                Note::at("E5", NoteLength::Eighth, WIN_START_OFFSET + WIN_SECOND_NOTE),
                Note::at("G5", NoteLength::Eighth, WIN_START_OFFSET + WIN_THIRD_NOTE),
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteLength
{
    Eighth,
    Sixteenth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note
{
    pub pitch: &'static str,
    pub length: NoteLength,
    pub offset: Duration,
}

impl Note
{
    fn now(pitch: &'static str, length: NoteLength) -> Self
    {
        Self::at(pitch, length, Duration::ZERO)
    }

    fn at(pitch: &'static str, length: NoteLength, offset: Duration) -> Self
    {
        Self {
            pitch,
            length,
            offset,
        }
    }
}

/// Fire-and-forget sound output.
pub trait CuePlayer
{
    fn play(&mut self, cue: Cue);

    /// Emits whatever became due by `now`.
    fn pump(&mut self, _out: &mut dyn Write, _now: Instant) -> io::Result<()>
    {
        Ok(())
    }

    /// Pitch to show on the status line, if a note is sounding.
    fn now_playing(&self, _now: Instant) -> Option<&'static str>
    {
        None
    }

    fn is_idle(&self) -> bool
    {
        true
    }
}

/// Plays cues through the terminal bell, one ring per note.
#[derive(Default)]
pub struct TerminalChime
{
    pending: Vec<(Instant, Note)>,
    last_note: Option<(Instant, &'static str)>,
}

impl TerminalChime
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn schedule(&mut self, cue: Cue, triggered_at: Instant)
    {
        log::debug!("cue {}", cue.name());
        for note in cue.notes() {
            self.pending.push((triggered_at + note.offset, note));
        }
        self.pending.sort_by_key(|(due, _)| *due);
    }

    /// Removes and returns the notes due by `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Note>
    {
        let split = self.pending.partition_point(|(due, _)| *due <= now);
        self.pending.drain(..split).map(|(_, note)| note).collect()
    }
}

impl CuePlayer for TerminalChime
{
    fn play(&mut self, cue: Cue)
    {
        self.schedule(cue, Instant::now());
    }

    fn pump(&mut self, out: &mut dyn Write, now: Instant) -> io::Result<()>
    {
        let due = self.take_due(now);
        if let Some(note) = due.last() {
            for _ in &due {
                out.write_all(b"\x07")?;
            }
            out.flush()?;
            self.last_note = Some((now, note.pitch));
        }
        Ok(())
    }

    fn now_playing(&self, now: Instant) -> Option<&'static str>
    {
        self.last_note
            .filter(|(started, _)| now.saturating_duration_since(*started) < NOTE_DISPLAY)
            .map(|(_, pitch)| pitch)
    }

    fn is_idle(&self) -> bool
    {
        self.pending.is_empty()
    }
}

/// Drops every cue. Used with `--mute`.
pub struct Muted;

impl CuePlayer for Muted
{
    fn play(&mut self, cue: Cue)
    {
        log::trace!("muted cue {}", cue.name());
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn single_note_cues_sound_immediately()
    {
        assert_eq!(Cue::Success.notes(), vec![Note::now("C5", NoteLength::Eighth)]);
        assert_eq!(Cue::Failure.notes()[0].pitch, "C3");
        assert_eq!(Cue::Click.notes()[0].length, NoteLength::Sixteenth);
        assert_eq!(Cue::Drop.notes()[0].pitch, "E4");
    }

    #[test]
    fn win_is_an_arpeggio_with_fixed_offsets()
    {
        let notes = Cue::Win.notes();
        let pitches: Vec<_> = notes.iter().map(|note| note.pitch).collect();
        let offsets: Vec<_> = notes.iter().map(|note| note.offset.as_millis()).collect();
        assert_eq!(pitches, vec!["C5", "E5", "G5"]);
        assert_eq!(offsets, vec![10, 210, 410]);
    }

    #[test]
    fn chime_releases_notes_when_due()
    {
        let mut chime = TerminalChime::new();
        let start = Instant::now();
        chime.schedule(Cue::Win, start);
        chime.schedule(Cue::Click, start);

        let first = chime.take_due(start);
        assert_eq!(first.iter().map(|note| note.pitch).collect::<Vec<_>>(), vec!["C4"]);

        let next = chime.take_due(start + Duration::from_millis(250));
        assert_eq!(next.iter().map(|note| note.pitch).collect::<Vec<_>>(), vec!["C5", "E5"]);
        assert!(!chime.is_idle());

        let last = chime.take_due(start + Duration::from_secs(1));
        assert_eq!(last.len(), 1);
        assert!(chime.is_idle());
    }

    #[test]
    fn pump_rings_bell_per_note_and_tracks_last_pitch()
    {
        let mut chime = TerminalChime::new();
        let start = Instant::now();
        chime.schedule(Cue::Success, start);
        chime.schedule(Cue::Failure, start);

        let mut out = Vec::new();
        chime.pump(&mut out, start).unwrap();
        assert_eq!(out, b"\x07\x07");
        assert!(chime.now_playing(start).is_some());
        assert_eq!(chime.now_playing(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn muted_player_stays_silent()
    {
        let mut muted = Muted;
        muted.play(Cue::Win);
        let mut out = Vec::new();
        muted.pump(&mut out, Instant::now()).unwrap();
        assert!(out.is_empty());
        assert!(muted.is_idle());
    }
}
