//! In-memory notes store exposed as a JSON resource.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use common::HandlerError;
use serde::{Deserialize, Serialize};
use thruster::{Context, JsonController};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct NoteInput {
    text: String,
}

/// One note, or the whole collection for `index`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    One(Note),
    Many(Vec<Note>),
}

#[derive(Default)]
pub struct Notes {
    last_id: AtomicU64,
    rows: RwLock<BTreeMap<u64, Note>>,
}

fn note_id(ctx: &Context) -> Result<u64, HandlerError> {
    // A non-numeric id can never match a stored note.
    ctx.id()
        .and_then(|id| id.parse().ok())
        .ok_or(HandlerError::NotFound)
}

fn note_input(ctx: &Context) -> Result<NoteInput, HandlerError> {
    let input: NoteInput = ctx.json()?;
    if input.text.trim().is_empty() {
        return Err(HandlerError::generic("text must not be empty"));
    }
    Ok(input)
}

#[async_trait]
impl JsonController for Notes {
    type Output = Payload;

    async fn index(&self, _ctx: Context) -> Result<Payload, HandlerError> {
        let rows = self.rows.read().await;
        Ok(Payload::Many(rows.values().cloned().collect()))
    }

    async fn show(&self, ctx: Context) -> Result<Payload, HandlerError> {
        let id = note_id(&ctx)?;
        let rows = self.rows.read().await;
        rows.get(&id).cloned().map(Payload::One).ok_or(HandlerError::NotFound)
    }

    async fn create(&self, ctx: Context) -> Result<Payload, HandlerError> {
        let input = note_input(&ctx)?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let note = Note { id, text: input.text };
        self.rows.write().await.insert(id, note.clone());
        debug!(id, "note created");
        Ok(Payload::One(note))
    }

    async fn update(&self, ctx: Context) -> Result<Payload, HandlerError> {
        let id = note_id(&ctx)?;
        let input = note_input(&ctx)?;
        let mut rows = self.rows.write().await;
        let note = rows.get_mut(&id).ok_or(HandlerError::NotFound)?;
        note.text = input.text;
        Ok(Payload::One(note.clone()))
    }

    async fn destroy(&self, ctx: Context) -> Result<Payload, HandlerError> {
        let id = note_id(&ctx)?;
        let removed = self.rows.write().await.remove(&id);
        debug!(id, found = removed.is_some(), "note deleted");
        removed.map(Payload::One).ok_or(HandlerError::NotFound)
    }
}
