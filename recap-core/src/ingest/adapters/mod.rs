//! Source adapter implementations
//!
//! One adapter per supported tool:
//! - [`ClaudeCodeAdapter`] — Claude Code (`~/.claude`) + SpecStory exports
//! - [`CodexAdapter`] — Codex CLI (`~/.codex`) + VS Code extension storage

mod claude;
mod codex;

pub use claude::ClaudeCodeAdapter;
pub use codex::CodexAdapter;
