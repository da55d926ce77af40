//! Token providers for the terminal.
//!
//! Tokens come from the environment first. When none is set and stdin is a
//! terminal, the user is asked to paste one with echo off; an empty answer
//! cancels.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use erpsync_fetch::{AccessToken, AuthError, EnvTokenProvider, TokenProvider};

/// Variables checked for the ERP token.
pub const ERP_TOKEN_VARS: &[&str] = &["ERPSYNC_ERP_TOKEN"];

/// Variables checked for the GitHub token, in order.
pub const GITHUB_TOKEN_VARS: &[&str] = &["ERPSYNC_GITHUB_TOKEN", "GITHUB_TOKEN"];

/// Environment lookup with a prompt as the interactive flow.
#[derive(Debug, Clone)]
pub struct CliTokenProvider {
    env: EnvTokenProvider,
    interactive: bool,
}

impl CliTokenProvider {
    /// Provider for the ERP service.
    pub fn erp(interactive: bool) -> Self {
        Self {
            env: EnvTokenProvider::new("ERP", ERP_TOKEN_VARS),
            interactive,
        }
    }

    /// Provider for GitHub.
    pub fn github(interactive: bool) -> Self {
        Self {
            env: EnvTokenProvider::new("GitHub", GITHUB_TOKEN_VARS),
            interactive,
        }
    }
}

#[async_trait]
impl TokenProvider for CliTokenProvider {
    fn service(&self) -> &str {
        self.env.service()
    }

    async fn acquire_silent(&self) -> Result<AccessToken, AuthError> {
        self.env.acquire_silent().await
    }

    async fn acquire_interactive(&self) -> Result<AccessToken, AuthError> {
        if !self.interactive || !std::io::stdin().is_terminal() {
            return self.env.acquire_interactive().await;
        }

        let prompt = format!("{} token (empty to cancel): ", self.service());
        let answer = tokio::task::spawn_blocking(move || read_answer(&prompt))
            .await
            .map_err(|e| AuthError::Failed(e.to_string()))?
            .map_err(|e| AuthError::Failed(e.to_string()))?;

        parse_answer(self.service(), &answer)
    }
}

/// What a key press does to the hidden answer.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Continue,
    Submit,
    Cancel,
}

fn apply_key(answer: &mut String, key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Esc => KeyAction::Cancel,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Cancel
        }
        KeyCode::Backspace => {
            answer.pop();
            KeyAction::Continue
        }
        KeyCode::Char(c) => {
            answer.push(c);
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn read_hidden_line() -> std::io::Result<String> {
    let mut answer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut answer, &key) {
            KeyAction::Continue => {}
            KeyAction::Submit => return Ok(answer),
            KeyAction::Cancel => return Ok(String::new()),
        }
    }
}

/// Prompts on stderr and reads one line without echoing it.
fn read_answer(prompt: &str) -> std::io::Result<String> {
    let mut stderr = std::io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;

    terminal::enable_raw_mode()?;
    let answer = read_hidden_line();
    let restored = terminal::disable_raw_mode();
    stderr.write_all(b"\n")?;

    let answer = answer?;
    restored?;
    Ok(answer)
}

fn parse_answer(service: &str, answer: &str) -> Result<AccessToken, AuthError> {
    let token = answer.trim();
    if token.is_empty() {
        Err(AuthError::Cancelled(service.to_string()))
    } else {
        Ok(AccessToken::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let token = parse_answer("ERP", "  eyJ0eXAi\n").unwrap();
        assert_eq!(token.secret(), "eyJ0eXAi");
        assert!(token.account_label.is_none());
    }

    #[test]
    fn test_empty_answer_cancels() {
        assert_eq!(
            parse_answer("GitHub", "\n"),
            Err(AuthError::Cancelled("GitHub".to_string()))
        );
    }

    #[tokio::test]
    async fn test_non_interactive_reports_variables() {
        let provider = CliTokenProvider::github(false);
        let err = provider.acquire_interactive().await.unwrap_err();
        let AuthError::Failed(message) = err else {
            panic!("expected Failed, got {err:?}");
        };
        assert!(message.contains("ERPSYNC_GITHUB_TOKEN or GITHUB_TOKEN"));
    }

    fn type_keys(codes: &[KeyCode]) -> (String, KeyAction) {
        let mut answer = String::new();
        for code in codes {
            let action = apply_key(&mut answer, &KeyEvent::new(*code, KeyModifiers::NONE));
            if action != KeyAction::Continue {
                return (answer, action);
            }
        }
        (answer, KeyAction::Continue)
    }

    #[test]
    fn test_hidden_answer_collects_chars_until_enter() {
        let (answer, action) = type_keys(&[
            KeyCode::Char('g'),
            KeyCode::Char('h'),
            KeyCode::Char('x'),
            KeyCode::Backspace,
            KeyCode::Char('p'),
            KeyCode::Enter,
            KeyCode::Char('z'),
        ]);
        assert_eq!(action, KeyAction::Submit);
        assert_eq!(answer, "ghp");
    }

    #[test]
    fn test_hidden_answer_escape_and_ctrl_c_cancel() {
        let (_, action) = type_keys(&[KeyCode::Char('a'), KeyCode::Esc]);
        assert_eq!(action, KeyAction::Cancel);

        let mut answer = String::from("abc");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut answer, &ctrl_c), KeyAction::Cancel);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut answer = String::new();
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(apply_key(&mut answer, &release), KeyAction::Continue);
        assert!(answer.is_empty());
    }

    #[test]
    fn test_service_names() {
        assert_eq!(CliTokenProvider::erp(true).service(), "ERP");
        assert_eq!(CliTokenProvider::github(true).service(), "GitHub");
    }
}
