//! Local race commentary.
//!
//! Lines are picked from fixed template pools, so a message is always
//! available without waiting on anything external. An outside provider may
//! later replace the chosen line, but never has to.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::horse::{Horse, HorseId};

/// Shown before the first round of a series starts.
pub const IDLE_LINE: &str = "Waiting for the horses to enter the paddock...";
/// Shown when a turn draws no cards.
pub const IN_PROGRESS_LINE: &str = "The race is under way...";
/// Shown when a drawn id has no horse behind it.
pub const UNKNOWN_HORSE_LINE: &str = "A stir runs through the track!";

/// Mid-race flavor; `{name}` is replaced by the first drawn horse.
pub const DRAW_TEMPLATES: [&str; 8] = [
    "{name} is charging at full speed, cuteness overload!",
    "Look! {name} comes bounding in, fluffy tail swishing!",
    "{name}'s little legs are a blur!",
    "The whole grandstand is cheering for adorable {name}!",
    "{name} is pressing on with fighting spirit!",
    "{name} shows an astonishing burst of speed!",
    "{name} trots along lightly, the finish is not far now!",
    "Go {name}! You're the best!",
];

/// Used when a horse crosses the line on the turn being described.
pub const FINISH_TEMPLATES: [&str; 3] = [
    "So cute! {name} leaps across the finish line!",
    "{name} crosses the line! What a race!",
    "Incredible! {name} makes it home!",
];

/// Which moment of the race a line is being chosen for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommentaryEvent {
    /// A batch of cards is about to be (or was just) applied
    Draw,
    /// The round has closed
    RoundEnd,
}

/// Everything the selector looks at.
#[derive(Debug, Clone, Copy)]
pub struct CommentaryContext<'a> {
    pub drawn: &'a [HorseId],
    pub horses: &'a [Horse],
    pub finishers: &'a [HorseId],
    pub track_length: u32,
    pub event: CommentaryEvent,
}

/// Chooses a line for `ctx`.
///
/// Rules, first match wins: podium at round end, neutral line for an empty
/// draw, a finish call for any unranked horse standing on the line, then a
/// random template naming the first drawn horse.
///
/// ```
/// use derby_engine::commentary::{select_commentary, CommentaryContext, CommentaryEvent};
/// use derby_engine::horse::Horse;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha20Rng;
///
/// let horses = Horse::field(3);
/// let ctx = CommentaryContext {
///     drawn: &[],
///     horses: &horses,
///     finishers: &[2, 0],
///     track_length: 5,
///     event: CommentaryEvent::RoundEnd,
/// };
/// let line = select_commentary(&ctx, &mut ChaCha20Rng::seed_from_u64(1));
/// assert!(line.contains("Emerald Knight") && line.contains("Pink Lightning"));
/// ```
pub fn select_commentary<R: Rng + ?Sized>(ctx: &CommentaryContext<'_>, rng: &mut R) -> String {
    if ctx.event == CommentaryEvent::RoundEnd && !ctx.finishers.is_empty() {
        return podium_line(ctx.horses, ctx.finishers);
    }
    if ctx.drawn.is_empty() {
        return IN_PROGRESS_LINE.to_string();
    }
    if let Some(horse) = ctx
        .horses
        .iter()
        .find(|h| h.position >= ctx.track_length && !ctx.finishers.contains(&h.id))
    {
        return fill(pick(&FINISH_TEMPLATES, rng), &horse.name);
    }
    match ctx.horses.iter().find(|h| h.id == ctx.drawn[0]) {
        Some(horse) => fill(pick(&DRAW_TEMPLATES, rng), &horse.name),
        None => UNKNOWN_HORSE_LINE.to_string(),
    }
}

/// Announcement for the start of round `round`.
pub fn round_start_line(round: u32) -> String {
    format!("Round {} is about to begin! Horses are at the gate...", round)
}

fn podium_line(horses: &[Horse], finishers: &[HorseId]) -> String {
    let names: Vec<&str> = finishers
        .iter()
        .take(3)
        .map(|id| {
            horses
                .iter()
                .find(|h| h.id == *id)
                .map(|h| h.name.as_str())
                .unwrap_or("???")
        })
        .collect();
    match names.as_slice() {
        [first] => format!("Congratulations to {}, our champion!", first),
        [first, second] => format!(
            "The race is over! {} takes the win with {} in second!",
            first, second
        ),
        [first, second, third, ..] => format!(
            "What a race! The podium: {}, {} and {}! Congratulations to the winners!",
            first, second, third
        ),
        [] => IN_PROGRESS_LINE.to_string(),
    }
}

fn pick<'t, R: Rng + ?Sized>(pool: &'t [&'static str], rng: &mut R) -> &'t str {
    pool.choose(rng).copied().unwrap_or("{name}")
}

fn fill(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}
