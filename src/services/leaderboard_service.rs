//! Record finished sessions and serve ranked reads from a single active store.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{models::ScoreEntity, score_store::ScoreStore},
    dto::leaderboard::{
        LeaderboardResponse, PlayerBestResponse, RankedEntryDto, SaveScoreRequest,
        SaveScoreResponse, ScoreEntryDto,
    },
    error::ServiceError,
    state::{
        SharedState,
        leaderboard::{self, ScoreEntry},
    },
};

/// Warning attached to writes that landed in the local fallback store.
pub const FALLBACK_WARNING: &str =
    "el ranking remoto no está disponible; la puntuación se guardó localmente";

/// Where a score ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Backend that accepted the row.
    pub store: &'static str,
    /// Present when the row went to the fallback store.
    pub warning: Option<String>,
}

/// Record the result of a finished session, at most once.
pub async fn save_session_score(
    state: &SharedState,
    session_id: Uuid,
    request: SaveScoreRequest,
) -> Result<SaveScoreResponse, ServiceError> {
    let entry = {
        let mut session = state
            .sessions()
            .get_mut(&session_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("quiz session `{session_id}` not found"))
            })?;

        let result = session.result().ok_or_else(|| {
            ServiceError::InvalidState("only finished quizzes can be saved".into())
        })?;
        let player_name = request
            .player_name
            .as_deref()
            .unwrap_or(&result.player_name);
        let entry = ScoreEntry::new(
            player_name,
            result.score,
            result.duration_seconds,
            OffsetDateTime::now_utc(),
        )?;

        if !session.claim_score_save() {
            return Err(ServiceError::InvalidState(
                "score already saved for this quiz".into(),
            ));
        }
        entry
    };

    match save(state, entry.clone()).await {
        Ok(outcome) => {
            info!(
                session_id = %session_id,
                player = %entry.player_name,
                score = entry.score,
                store = outcome.store,
                "score saved"
            );
            Ok(SaveScoreResponse {
                entry: ScoreEntryDto::from(&entry),
                store: outcome.store.to_string(),
                warning: outcome.warning,
            })
        }
        Err(err) => {
            if let Some(mut session) = state.sessions().get_mut(&session_id) {
                session.release_score_save();
            }
            Err(err)
        }
    }
}

/// Append a row to the primary store, switching to the fallback when the primary fails.
pub async fn save(
    state: &SharedState,
    entry: ScoreEntry,
) -> Result<SaveOutcome, ServiceError> {
    let entity = ScoreEntity::from(entry);

    if let Some(primary) = state.score_store().await {
        match primary.append(entity.clone()).await {
            Ok(()) => {
                return Ok(SaveOutcome {
                    store: primary.backend(),
                    warning: None,
                });
            }
            Err(err) => {
                warn!(
                    backend = primary.backend(),
                    error = %err,
                    "primary score store write failed; switching to local store"
                );
                state.clear_score_store().await;
            }
        }
    }

    let fallback = state.fallback_store();
    fallback.append(entity).await?;
    Ok(SaveOutcome {
        store: fallback.backend(),
        warning: state.is_degraded().then(|| FALLBACK_WARNING.to_string()),
    })
}

/// Ranked leaderboard, truncated to `limit` rows or the configured default.
pub async fn leaderboard(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<LeaderboardResponse, ServiceError> {
    let limit = limit.unwrap_or(state.config().leaderboard_limit);
    if limit == 0 {
        return Err(ServiceError::InvalidInput(
            "limit must be greater than zero".into(),
        ));
    }

    let (store, entries) = read_scores(state).await?;
    let ranked = leaderboard::list_ranked(entries, limit);

    Ok(LeaderboardResponse {
        podium: leaderboard::podium(&ranked)
            .iter()
            .map(RankedEntryDto::from)
            .collect(),
        entries: ranked.iter().map(RankedEntryDto::from).collect(),
        store: store.to_string(),
    })
}

/// Personal best of one player, ranked among their own attempts.
pub async fn player_best(
    state: &SharedState,
    player_name: &str,
) -> Result<PlayerBestResponse, ServiceError> {
    let player_name = player_name.trim();
    if player_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }

    let (_, entries) = read_scores(state).await?;
    let attempts = entries
        .iter()
        .filter(|entry| entry.player_name == player_name)
        .count();
    let best = leaderboard::best_for(entries, player_name).ok_or_else(|| {
        ServiceError::NotFound(format!("no scores recorded for `{player_name}`"))
    })?;

    Ok(PlayerBestResponse {
        player_name: player_name.to_string(),
        attempts,
        best: RankedEntryDto::from(&best),
    })
}

/// Every row of the active store. A failing primary is dropped and the read is served locally.
async fn read_scores(
    state: &SharedState,
) -> Result<(&'static str, Vec<ScoreEntry>), ServiceError> {
    if let Some(primary) = state.score_store().await {
        match list_entries(&primary).await {
            Ok(entries) => return Ok((primary.backend(), entries)),
            Err(err) => {
                warn!(
                    backend = primary.backend(),
                    error = %err,
                    "primary score store read failed; switching to local store"
                );
                state.clear_score_store().await;
            }
        }
    }

    let fallback = state.fallback_store();
    let entries = list_entries(&fallback).await?;
    Ok((fallback.backend(), entries))
}

async fn list_entries(store: &Arc<dyn ScoreStore>) -> Result<Vec<ScoreEntry>, ServiceError> {
    let rows = store.list_scores().await?;
    Ok(rows.into_iter().map(ScoreEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::translate::PassthroughTranslator,
        config::AppConfig,
        dao::score_store::memory::MemoryScoreStore,
        dto::quiz::{StartQuizRequest, SubmitAnswerRequest},
        services::quiz_service,
        state::{
            AppState,
            tests::{StaticQuestionSource, trivia_batch},
        },
    };

    struct Fixture {
        state: SharedState,
        primary: MemoryScoreStore,
        fallback: MemoryScoreStore,
    }

    async fn fixture() -> Fixture {
        let fallback = MemoryScoreStore::new();
        let primary = MemoryScoreStore::new();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(StaticQuestionSource {
                questions: Some(trivia_batch(4)),
            }),
            Arc::new(PassthroughTranslator),
            Arc::new(fallback.clone()),
        );
        state.expect_primary_store();
        state.install_score_store(Arc::new(primary.clone())).await;
        Fixture {
            state,
            primary,
            fallback,
        }
    }

    async fn finished_session(state: &SharedState, name: &str, correct: usize) -> Uuid {
        let id = quiz_service::start_quiz(
            state,
            StartQuizRequest {
                player_name: name.into(),
            },
        )
        .await
        .unwrap()
        .session_id;

        for i in 0..4 {
            let option = if i < correct {
                format!("right {i}")
            } else {
                format!("wrong {i}a")
            };
            quiz_service::submit_answer(
                state,
                id,
                SubmitAnswerRequest {
                    option: Some(option),
                },
            )
            .unwrap();
            quiz_service::advance(state, id).unwrap();
        }
        id
    }

    fn entry(name: &str, score: u32, offset: i64) -> ScoreEntry {
        ScoreEntry::new(
            name,
            score,
            None,
            OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(offset),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn finished_session_is_saved_once() {
        let fx = fixture().await;
        let id = finished_session(&fx.state, "Ana", 3).await;

        let saved = save_session_score(&fx.state, id, SaveScoreRequest::default())
            .await
            .unwrap();
        assert_eq!(saved.entry.player_name, "Ana");
        assert_eq!(saved.entry.score, 3);
        assert_eq!(saved.store, "memory");
        assert!(saved.warning.is_none());
        assert_eq!(fx.primary.rows().len(), 1);

        let err = save_session_score(&fx.state, id, SaveScoreRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(fx.primary.rows().len(), 1);
    }

    #[tokio::test]
    async fn unfinished_session_cannot_be_saved() {
        let fx = fixture().await;
        let id = quiz_service::start_quiz(
            &fx.state,
            StartQuizRequest {
                player_name: "Ana".into(),
            },
        )
        .await
        .unwrap()
        .session_id;

        let err = save_session_score(&fx.state, id, SaveScoreRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn name_override_is_trimmed() {
        let fx = fixture().await;
        let id = finished_session(&fx.state, "Ana", 2).await;

        let saved = save_session_score(
            &fx.state,
            id,
            SaveScoreRequest {
                player_name: Some("  Ana María ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(saved.entry.player_name, "Ana María");
    }

    #[tokio::test]
    async fn failing_primary_falls_back_with_warning() {
        let fx = fixture().await;
        fx.primary.set_offline(true);
        let id = finished_session(&fx.state, "Ana", 4).await;

        let saved = save_session_score(&fx.state, id, SaveScoreRequest::default())
            .await
            .unwrap();
        assert_eq!(saved.warning.as_deref(), Some(FALLBACK_WARNING));
        assert_eq!(fx.fallback.rows().len(), 1);
        assert!(fx.state.is_degraded());
        assert!(fx.state.score_store().await.is_none());
    }

    #[tokio::test]
    async fn total_write_failure_releases_the_claim() {
        let fx = fixture().await;
        fx.primary.set_offline(true);
        fx.fallback.set_offline(true);
        let id = finished_session(&fx.state, "Ana", 4).await;

        let err = save_session_score(&fx.state, id, SaveScoreRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert!(!fx.state.sessions().get(&id).unwrap().score_saved());

        fx.fallback.set_offline(false);
        assert!(
            save_session_score(&fx.state, id, SaveScoreRequest::default())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn leaderboard_splits_podium_and_respects_limit() {
        let fx = fixture().await;
        for (i, (name, score)) in [("Ana", 5), ("Luis", 5), ("Eva", 3), ("Sol", 2), ("Leo", 1)]
            .into_iter()
            .enumerate()
        {
            save(&fx.state, entry(name, score, i as i64))
                .await
                .unwrap();
        }

        let board = leaderboard(&fx.state, Some(4)).await.unwrap();
        assert_eq!(board.entries.len(), 4);
        assert_eq!(board.podium.len(), 3);
        let ranks: Vec<u32> = board.entries.iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 1, 2, 3]);
        assert_eq!(board.entries[0].entry.player_name, "Ana");

        assert!(matches!(
            leaderboard(&fx.state, Some(0)).await.unwrap_err(),
            ServiceError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn failing_primary_read_is_served_locally() {
        let fx = fixture().await;
        fx.primary.set_offline(true);

        let board = leaderboard(&fx.state, None).await.unwrap();
        assert!(board.entries.is_empty());
        assert_eq!(board.store, "memory");
        assert!(fx.state.is_degraded());
    }

    #[tokio::test]
    async fn player_best_reports_rank_and_attempts() {
        let fx = fixture().await;
        save(&fx.state, entry("Eva", 5, 0)).await.unwrap();
        save(&fx.state, entry("Ana", 2, 1)).await.unwrap();
        save(&fx.state, entry("Ana", 4, 2)).await.unwrap();

        let best = player_best(&fx.state, " Ana ").await.unwrap();
        assert_eq!(best.attempts, 2);
        assert_eq!(best.best.entry.score, 4);
        assert_eq!(best.best.rank, 1);

        assert!(matches!(
            player_best(&fx.state, "Nadie").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
