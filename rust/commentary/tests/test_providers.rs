use std::time::Duration;

use derby_commentary::canned::{CannedProvider, CROWD_LINES};
use derby_commentary::silent::SilentProvider;
use derby_commentary::{
    create_provider, request_commentary, CommentaryError, CommentaryProvider, CommentaryRequest,
};
use derby_engine::race::TurnStamp;

fn sample_request() -> CommentaryRequest {
    CommentaryRequest {
        stamp: TurnStamp {
            series: 1,
            round: 1,
            turn: 3,
        },
        positions: vec![("Pink Lightning".into(), 2), ("Azure Star".into(), 1)],
        drawn: vec!["Pink Lightning".into()],
        finishers: vec![],
        leader: Some("Pink Lightning".into()),
    }
}

#[tokio::test]
async fn silent_provider_always_declines() {
    let result = SilentProvider.comment(&sample_request()).await;
    assert!(matches!(result, Err(CommentaryError::Disabled)));
}

#[tokio::test]
async fn canned_provider_answers_from_its_pool() {
    let provider = CannedProvider::new();
    for _ in 0..20 {
        let line = provider.comment(&sample_request()).await.unwrap();
        assert!(CROWD_LINES.contains(&line.as_str()));
    }
}

#[tokio::test]
async fn canned_provider_with_no_lines_is_empty() {
    let provider = CannedProvider::with_lines(Vec::<String>::new());
    let result = provider.comment(&sample_request()).await;
    assert!(matches!(result, Err(CommentaryError::EmptyResponse)));
}

struct Stalling;

#[async_trait::async_trait]
impl CommentaryProvider for Stalling {
    async fn comment(&self, _: &CommentaryRequest) -> Result<String, CommentaryError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".into())
    }

    fn name(&self) -> &str {
        "stalling"
    }
}

#[tokio::test]
async fn slow_provider_times_out() {
    let result =
        request_commentary(&Stalling, &sample_request(), Duration::from_millis(20)).await;
    assert!(matches!(result, Err(CommentaryError::Timeout(d)) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn fast_provider_is_not_cut_off() {
    let provider = create_provider("canned").unwrap();
    let line = request_commentary(provider.as_ref(), &sample_request(), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(!line.is_empty());
}

#[cfg(unix)]
mod command {
    use super::*;

    #[tokio::test]
    async fn command_reads_the_prompt_from_stdin() {
        // cat echoes the prompt back; its first line is the announcer role
        let provider = create_provider("command:cat").unwrap();
        let line = provider.comment(&sample_request()).await.unwrap();
        assert_eq!(line, "You are a professional horse racing announcer.");
    }

    #[tokio::test]
    async fn command_without_output_is_empty() {
        let provider = create_provider("command:true").unwrap();
        let result = provider.comment(&sample_request()).await;
        assert!(matches!(result, Err(CommentaryError::EmptyResponse)));
    }

    #[tokio::test]
    async fn failing_command_is_reported() {
        let provider = create_provider("command:false").unwrap();
        let result = provider.comment(&sample_request()).await;
        assert!(matches!(result, Err(CommentaryError::Failed(_))));
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let provider = create_provider("command:derby-no-such-program-xyz").unwrap();
        let result = provider.comment(&sample_request()).await;
        assert!(matches!(result, Err(CommentaryError::Io(_))));
    }

    #[tokio::test]
    async fn hanging_command_is_abandoned() {
        let provider = create_provider("command:sleep 5").unwrap();
        let result =
            request_commentary(provider.as_ref(), &sample_request(), Duration::from_millis(100))
                .await;
        assert!(matches!(result, Err(CommentaryError::Timeout(_))));
    }
}
