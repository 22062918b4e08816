//! Announcer prompt for text-generating providers.

use crate::CommentaryRequest;

/// Shown in place of the finish order before anyone has crossed.
pub const NO_FINISHERS: &str = "no horse has crossed the line yet";

/// Renders `request` as a single prompt asking for one line of live commentary.
///
/// ```rust
/// use derby_commentary::{build_prompt, CommentaryRequest};
/// use derby_engine::race::TurnStamp;
///
/// let request = CommentaryRequest {
///     stamp: TurnStamp { series: 1, round: 1, turn: 4 },
///     positions: vec![("Azure Star".into(), 3), ("Snow Dawn".into(), 1)],
///     drawn: vec!["Azure Star".into()],
///     finishers: vec![],
///     leader: Some("Azure Star".into()),
/// };
/// let prompt = build_prompt(&request);
/// assert!(prompt.contains("Azure Star: 3, Snow Dawn: 1"));
/// ```
pub fn build_prompt(request: &CommentaryRequest) -> String {
    let positions = request
        .positions
        .iter()
        .map(|(name, pos)| format!("{name}: {pos}"))
        .collect::<Vec<_>>()
        .join(", ");
    let finish_order = if request.finishers.is_empty() {
        NO_FINISHERS.to_string()
    } else {
        request.finishers.join(" -> ")
    };
    let leader = request.leader.as_deref().unwrap_or("nobody");

    format!(
        "You are a professional horse racing announcer.\n\
         Current race state:\n\
         - Positions: {positions}.\n\
         - The cards just drawn belong to: {drawn}.\n\
         - Finish order so far: {finish_order}.\n\
         - Current leader: {leader}.\n\
         Give one short, exciting line of live commentary on this draw.\n",
        drawn = request.drawn.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_engine::race::TurnStamp;

    fn request(finishers: &[&str]) -> CommentaryRequest {
        CommentaryRequest {
            stamp: TurnStamp {
                series: 1,
                round: 2,
                turn: 9,
            },
            positions: vec![
                ("Pink Lightning".into(), 5),
                ("Azure Star".into(), 5),
                ("Emerald Knight".into(), 2),
            ],
            drawn: vec!["Azure Star".into(), "Emerald Knight".into()],
            finishers: finishers.iter().map(|s| s.to_string()).collect(),
            leader: Some("Pink Lightning".into()),
        }
    }

    #[test]
    fn prompt_lists_every_part_of_the_state() {
        let prompt = build_prompt(&request(&["Pink Lightning", "Azure Star"]));
        assert!(prompt.contains("Pink Lightning: 5, Azure Star: 5, Emerald Knight: 2"));
        assert!(prompt.contains("belong to: Azure Star, Emerald Knight."));
        assert!(prompt.contains("Finish order so far: Pink Lightning -> Azure Star."));
        assert!(prompt.contains("Current leader: Pink Lightning."));
    }

    #[test]
    fn prompt_says_when_nobody_has_finished() {
        let prompt = build_prompt(&request(&[]));
        assert!(prompt.contains(NO_FINISHERS));
    }

    #[test]
    fn prompt_starts_with_the_announcer_role() {
        let prompt = build_prompt(&request(&[]));
        assert_eq!(
            prompt.lines().next(),
            Some("You are a professional horse racing announcer.")
        );
    }
}
