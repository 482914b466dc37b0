//! User-facing reply texts.

use crate::error::DocBriefError;
use crate::store::UserProfile;

pub const GREETING: &str = "Привет! Отправь PDF, и я сделаю краткое изложение.";

pub const INFO_BUTTON: &str = "Инфо";
pub const HELP_BUTTON: &str = "Помощь";

pub const HELP: &str = "Доступные команды:\n\
/start - Приветствие и клавиатура\n\
/help - Список команд\n\
/info - Информация о пользователе\n\
Отправь PDF — я сделаю краткое изложение.\n\
Также можешь написать сообщение для общения с ИИ.";

pub const NOT_A_PDF: &str = "Отправь PDF файл.";
pub const PROCESSING_PDF: &str = "Обрабатываю PDF...";
pub const DOCUMENT_UNREADABLE: &str =
    "Не удалось открыть PDF. Убедись, что файл не повреждён и не защищён паролем.";

pub const RECOGNIZING_PHOTO: &str = "Распознаю текст на изображении...";
pub const NO_TEXT_RECOGNIZED: &str = "Текст не распознан. Убедись, что изображение чёткое.";
pub const IMAGE_UNREADABLE: &str = "Не удалось прочитать изображение. Отправь его как фото в JPEG или PNG.";

/// Sent when the model answers with nothing printable.
pub const EMPTY_REPLY: &str = "Модель вернула пустой ответ.";

const SUMMARY_HEADER: &str = "Краткое изложение:\n";

pub fn summary(text: &str) -> String {
    format!("{}{}", SUMMARY_HEADER, text)
}

pub fn info(sender: Option<&UserProfile>) -> String {
    match sender {
        Some(profile) => format!(
            "Твой username: @{}\nID: {}",
            profile.username.as_deref().unwrap_or_default(),
            profile.telegram_id
        ),
        None => "Твой username: @\nID: неизвестен".to_string(),
    }
}

/// Reply for a document that could not be digested.
pub fn document_failure(err: &DocBriefError) -> String {
    match err {
        DocBriefError::NotAPdf { .. } => NOT_A_PDF.to_string(),
        e if e.is_input_error() => DOCUMENT_UNREADABLE.to_string(),
        e => format!("Ошибка: {}", e),
    }
}

/// Reply for a photo that could not be digested.
pub fn photo_failure(err: &DocBriefError) -> String {
    if err.is_input_error() {
        IMAGE_UNREADABLE.to_string()
    } else {
        format!("Ошибка при обработке изображения: {}", err)
    }
}

/// Text stored as the user's message for an upload.
pub fn upload_turn_text(caption: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match caption.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => fallback(),
    }
}
