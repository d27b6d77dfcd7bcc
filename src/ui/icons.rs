//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Workflow indicators
pub static SIGNAL: Emoji<'_, '_> = Emoji("📡 ", "[>]");
pub static NODE: Emoji<'_, '_> = Emoji("🛰️  ", "#");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "->");
pub static IMAGE: Emoji<'_, '_> = Emoji("🖼️  ", "[IMG]");
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
