use axum::{extract::State, Json};
use validator::Validate;

use crate::dto::{
    AskRequest, AskResponse, ChatReplyResponse, ChatRequest, ChatTranscriptResponse,
    SummaryRequest, SummaryResponse,
};
use crate::error::AppResult;
use crate::handlers::today;
use crate::models::chat::ChatSender;
use crate::services::motivator::{EventKind, MotivatorEvent, MotivatorState};
use crate::AppState;

/// Free-form question to Phil about a medication or general health.
pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    body.validate()?;

    let reply = state
        .assistant
        .ask(body.question.trim(), body.medication_name.as_deref())
        .await;

    Ok(Json(AskResponse {
        answer: reply.text,
        source: reply.source,
    }))
}

pub async fn get_schedule_chat(State(state): State<AppState>) -> Json<ChatTranscriptResponse> {
    let messages = state.store.read().await.chat.clone();
    Json(ChatTranscriptResponse { messages })
}

/// One turn of the schedule-setup conversation. The user's message is kept
/// even when the model call falls back.
pub async fn post_schedule_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatReplyResponse>> {
    body.validate()?;
    let text = body.message.trim().to_string();

    state.store.write().await.push_chat(ChatSender::User, text.clone());

    let reply = state.assistant.schedule_chat(&text).await;

    let mut store = state.store.write().await;
    let message = store.push_chat(ChatSender::Phil, reply.text);

    Ok(Json(ChatReplyResponse {
        reply: message,
        source: reply.source,
        messages: store.chat.clone(),
    }))
}

/// Summary of medications, schedule and recent moods for a doctor visit.
pub async fn summary(
    State(state): State<AppState>,
    Json(body): Json<SummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    body.validate()?;

    let input = state.store.read().await.summary_input(
        today(),
        body.mood_days(),
        body.additional_context.clone(),
    );
    let reply = state.assistant.summarize(&input).await;

    Ok(Json(SummaryResponse {
        summary: reply.text,
        source: reply.source,
    }))
}

/// Current motivational message. The first call after startup dispatches a
/// welcome message; later replies arrive over the WebSocket feed.
pub async fn get_motivation(State(state): State<AppState>) -> Json<MotivatorState> {
    if state.motivator.latest_seq() == 0 {
        state
            .motivator
            .notify(MotivatorEvent::new(
                EventKind::PageLoad,
                "The user opened their medication dashboard.",
            ))
            .await;
    }
    Json(state.motivator.snapshot().await)
}
