//! User interaction seam.
//!
//! The core never talks to a screen directly.  Destructive operations ask
//! for confirmation and capture attempts report their outcome through a
//! [`UserPrompt`] supplied by the caller.

use tracing::info;

/// Confirmation asked before wiping all progress.
pub const RESET_CONFIRMATION: &str =
    "¿Estás seguro de que quieres resetear todo el progreso? Esta acción no se puede deshacer.";
/// Shown after a confirmed reset.
pub const RESET_DONE: &str = "Progreso reseteado exitosamente";
/// Shown after a successful catch.
pub const CATCH_SUCCESS: &str = "¡Captura exitosa!";
/// Shown when the creature escapes.
pub const CATCH_ESCAPED: &str = "¡El Pokémon escapó!";

/// Front-end hooks consumed by the stores.
pub trait UserPrompt {
    /// Ask a yes/no question.  `false` aborts the pending operation.
    fn confirm(&self, message: &str) -> bool;

    /// Show an informational message.
    fn notify(&self, message: &str);
}

/// Non-interactive prompt: logs notifications and answers every
/// confirmation with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessPrompt {
    /// Answer given to every [`UserPrompt::confirm`] call.
    pub answer: bool,
}

impl HeadlessPrompt {
    /// A prompt that accepts every confirmation.
    #[must_use]
    pub fn accepting() -> Self {
        Self { answer: true }
    }

    /// A prompt that declines every confirmation.
    #[must_use]
    pub fn declining() -> Self {
        Self { answer: false }
    }
}

impl UserPrompt for HeadlessPrompt {
    fn confirm(&self, message: &str) -> bool {
        info!(answer = self.answer, "{message}");
        self.answer
    }

    fn notify(&self, message: &str) {
        info!("{message}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_prompt_answers_fixed_value() {
        assert!(HeadlessPrompt::accepting().confirm(RESET_CONFIRMATION));
        assert!(!HeadlessPrompt::declining().confirm(RESET_CONFIRMATION));
    }
}
