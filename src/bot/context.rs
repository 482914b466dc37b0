//! Process-wide collaborators, built once at startup.

use crate::digest::Digester;
use crate::pipeline::llm::Assistant;
use crate::pipeline::ocr::OcrEngine;
use crate::store::ConversationStore;
use crate::telegram::ChatTransport;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a handler needs to serve one update.
///
/// Built in `main` and passed by reference to every handler call.
#[derive(Clone)]
pub struct BotContext {
    pub transport: Arc<dyn ChatTransport>,
    pub assistant: Arc<dyn Assistant>,
    pub store: Arc<dyn ConversationStore>,
    pub digester: Digester,
}

impl BotContext {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        assistant: Arc<dyn Assistant>,
        store: Arc<dyn ConversationStore>,
        ocr: Arc<dyn OcrEngine>,
        pdfium_lib: Option<PathBuf>,
    ) -> Self {
        let digester = Digester::new(ocr, Arc::clone(&assistant), pdfium_lib);
        Self {
            transport,
            assistant,
            store,
            digester,
        }
    }
}
