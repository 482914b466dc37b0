//! Per-update handling.
//!
//! Every flow replies first and persists second: a database fault never
//! costs the user their answer. Persistence errors are returned to the
//! caller after the reply went out.

use crate::bot::context::BotContext;
use crate::bot::replies;
use crate::digest::PhotoDigest;
use crate::error::{DocBriefError, LlmError};
use crate::pipeline::input::is_pdf_file_name;
use crate::pipeline::llm::reply_text;
use crate::store::UserProfile;
use crate::telegram::types::Update;
use crate::telegram::{BotCommand, DocumentUpload, Inbound, Incoming, PhotoUpload};
use tracing::{debug, info, warn};

/// Serve one update start to finish.
pub async fn handle_update(ctx: &BotContext, update: &Update) -> Result<(), DocBriefError> {
    let Some(message) = &update.message else {
        debug!("Update {} carries no message", update.update_id);
        return Ok(());
    };

    let Some(incoming) = Incoming::from_message(message) else {
        debug!("Ignoring unsupported message {}", message.message_id);
        return Ok(());
    };

    info!(
        "Update {}: {} from chat {}",
        update.update_id,
        incoming.inbound.kind(),
        incoming.chat_id
    );
    handle_incoming(ctx, incoming).await
}

pub async fn handle_incoming(ctx: &BotContext, incoming: Incoming) -> Result<(), DocBriefError> {
    let Incoming {
        chat_id,
        sender,
        inbound,
    } = incoming;

    match inbound {
        Inbound::Command(command) => handle_command(ctx, chat_id, sender.as_ref(), command).await,
        Inbound::Document(document) => handle_document(ctx, chat_id, sender.as_ref(), document).await,
        Inbound::Photo(photo) => handle_photo(ctx, chat_id, sender.as_ref(), photo).await,
        Inbound::Text(text) => handle_text(ctx, chat_id, sender.as_ref(), &text).await,
    }
}

async fn handle_command(
    ctx: &BotContext,
    chat_id: i64,
    sender: Option<&UserProfile>,
    command: BotCommand,
) -> Result<(), DocBriefError> {
    match command {
        BotCommand::Start => {
            ctx.transport
                .send_menu(
                    chat_id,
                    replies::GREETING,
                    &[replies::INFO_BUTTON, replies::HELP_BUTTON],
                )
                .await
        }
        BotCommand::Help => ctx.transport.send_text(chat_id, replies::HELP).await,
        BotCommand::Info => ctx.transport.send_text(chat_id, &replies::info(sender)).await,
    }
}

async fn handle_document(
    ctx: &BotContext,
    chat_id: i64,
    sender: Option<&UserProfile>,
    document: DocumentUpload,
) -> Result<(), DocBriefError> {
    if !is_pdf_file_name(&document.file_name) {
        info!("Rejecting non-PDF upload '{}'", document.file_name);
        return ctx.transport.send_text(chat_id, replies::NOT_A_PDF).await;
    }

    ctx.transport.send_text(chat_id, replies::PROCESSING_PDF).await?;

    let digest = match ctx.transport.download(&document.file_id).await {
        Ok(bytes) => ctx.digester.document(&document.file_name, &bytes).await,
        Err(e) => Err(e),
    };

    let digest = match digest {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Document '{}' failed: {}", document.file_name, e);
            return ctx
                .transport
                .send_text(chat_id, &replies::document_failure(&e))
                .await;
        }
    };

    ctx.transport
        .send_text(chat_id, &replies::summary(&reply_text(digest.summary.clone())))
        .await?;

    let turn_text = replies::upload_turn_text(document.caption.as_deref(), || {
        format!("[document] {}", document.file_name)
    });
    record(ctx, sender, &turn_text, &digest.summary).await
}

async fn handle_photo(
    ctx: &BotContext,
    chat_id: i64,
    sender: Option<&UserProfile>,
    photo: PhotoUpload,
) -> Result<(), DocBriefError> {
    ctx.transport
        .send_text(chat_id, replies::RECOGNIZING_PHOTO)
        .await?;

    let outcome = match ctx.transport.download(&photo.file_id).await {
        Ok(bytes) => ctx.digester.photo(bytes).await,
        Err(e) => Err(e),
    };

    let digest = match outcome {
        Ok(PhotoDigest::Summarized(digest)) => digest,
        Ok(PhotoDigest::NoText) => {
            return ctx
                .transport
                .send_text(chat_id, replies::NO_TEXT_RECOGNIZED)
                .await;
        }
        Err(e) => {
            warn!("Photo failed: {}", e);
            return ctx
                .transport
                .send_text(chat_id, &replies::photo_failure(&e))
                .await;
        }
    };

    ctx.transport
        .send_text(chat_id, &replies::summary(&reply_text(digest.summary.clone())))
        .await?;

    let turn_text = replies::upload_turn_text(photo.caption.as_deref(), || "[photo]".to_string());
    record(ctx, sender, &turn_text, &digest.summary).await
}

async fn handle_text(
    ctx: &BotContext,
    chat_id: i64,
    sender: Option<&UserProfile>,
    text: &str,
) -> Result<(), DocBriefError> {
    let result = ctx.assistant.chat(text).await;

    let reply = reply_text(result.clone());
    let reply = if reply.trim().is_empty() {
        replies::EMPTY_REPLY.to_string()
    } else {
        reply
    };
    ctx.transport.send_text(chat_id, &reply).await?;

    record(ctx, sender, text, &result).await
}

/// Persist the turn; the reply is stored only when the model produced one.
async fn record(
    ctx: &BotContext,
    sender: Option<&UserProfile>,
    message_text: &str,
    result: &Result<String, LlmError>,
) -> Result<(), DocBriefError> {
    let Some(profile) = sender else {
        debug!("Message without sender, not recorded");
        return Ok(());
    };

    let handle = ctx.store.record_turn(profile, message_text).await?;
    if let Ok(response) = result {
        ctx.store.record_response(handle, response).await?;
    }
    Ok(())
}
