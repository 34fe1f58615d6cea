//! Local session commands: login, logout, whoami
//!
//! All three work on the credential store in the atelier home
//! (`$ATELIER_HOME`, default `~/.atelier`). Only `login` talks to a server.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use atelier_core::models::MeResponse;
use atelier_core::{CachedUser, CredentialStore, StoredCredentials};
use clap::Parser;
use tracing::{debug, info};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3030";

pub const NOT_LOGGED_IN: &str = "You are not logged in.";

#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Session token (prompted for when omitted)
    #[arg(long)]
    pub token: Option<String>,

    /// Server used to verify the token
    #[arg(long, env = "ATELIER_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server: String,
}

/// What `logout` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    NotLoggedIn,
    LoggedOut { username: Option<String> },
}

fn store() -> Result<CredentialStore> {
    CredentialStore::default_location().context("Failed to locate the credential store")
}

/// Clear the stored session. Leaves the store untouched when there is none.
pub fn logout(store: &CredentialStore) -> Result<LogoutOutcome> {
    if !store.is_authenticated() {
        debug!(path = %store.path().display(), "logout without a session");
        return Ok(LogoutOutcome::NotLoggedIn);
    }

    // Cached user is display-only; an unreadable one must not block logout
    let username = store
        .get_user()
        .ok()
        .flatten()
        .map(|user| user.username);

    store
        .clear_token()
        .with_context(|| format!("Failed to clear {}", store.path().display()))?;

    info!(username = username.as_deref().unwrap_or("unknown"), "logged out");
    Ok(LogoutOutcome::LoggedOut { username })
}

fn print_logout(outcome: &LogoutOutcome, out: &mut impl Write) -> io::Result<()> {
    match outcome {
        LogoutOutcome::NotLoggedIn => writeln!(out, "{NOT_LOGGED_IN}"),
        LogoutOutcome::LoggedOut {
            username: Some(username),
        } => writeln!(out, "Logged out {username}."),
        LogoutOutcome::LoggedOut { username: None } => writeln!(out, "Logged out."),
    }
}

pub fn run_logout() -> Result<()> {
    let outcome = logout(&store()?)?;
    print_logout(&outcome, &mut io::stdout().lock())?;
    Ok(())
}

/// The cached user, or `None` when logged out
pub fn whoami(store: &CredentialStore) -> Result<Option<CachedUser>> {
    if !store.is_authenticated() {
        return Ok(None);
    }
    Ok(store.get_user()?)
}

pub fn run_whoami() -> Result<()> {
    let store = store()?;
    let mut out = io::stdout().lock();

    match whoami(&store)? {
        Some(user) => {
            write!(out, "{}", user.username)?;
            if let Some(name) = user.display_name.as_deref() {
                write!(out, " ({name})")?;
            }
            if let Some(email) = user.email.as_deref() {
                write!(out, " <{email}>")?;
            }
            writeln!(out)?;
        }
        None if store.is_authenticated() => writeln!(out, "Logged in (no cached profile).")?,
        None => writeln!(out, "{NOT_LOGGED_IN}")?,
    }
    Ok(())
}

fn prompt_token() -> Result<String> {
    let token = inquire::Password::new("Session token:")
        .without_confirmation()
        .with_help_message("Paste the token from your account settings")
        .prompt()
        .context("Failed to read token")?;
    Ok(token)
}

/// Ask the server who owns `token`.
async fn fetch_me(server: &str, token: &str) -> Result<MeResponse> {
    let url = format!("{}/api/me", server.trim_end_matches('/'));
    debug!(%url, "verifying token");

    let response = reqwest::Client::new()
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .with_context(|| format!("Failed to reach {server}"))?;

    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        bail!("The server rejected this token (expired or unknown)");
    }

    let me = response
        .error_for_status()
        .context("Token verification failed")?
        .json::<MeResponse>()
        .await
        .context("Unexpected response from /api/me")?;

    Ok(me)
}

pub async fn run_login(args: LoginArgs) -> Result<()> {
    let token = match args.token {
        Some(token) => token,
        None => prompt_token()?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("Token cannot be empty");
    }

    let me = fetch_me(&args.server, &token).await?;
    let user = CachedUser::from(&me.user);
    let label = user.label().to_string();

    let store = store()?;
    store
        .save(&StoredCredentials::new(token, Some(user)))
        .with_context(|| format!("Failed to write {}", store.path().display()))?;

    info!(user_id = %me.user.id, "logged in");
    println!("Logged in as {label}.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, CredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        (dir, store)
    }

    fn cached(username: &str) -> CachedUser {
        CachedUser {
            id: "u1".into(),
            username: username.into(),
            email: None,
            display_name: None,
        }
    }

    fn printed(outcome: &LogoutOutcome) -> String {
        let mut out = Vec::new();
        print_logout(outcome, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn logout_without_session_leaves_store_alone() {
        let (_dir, store) = temp_store();

        let outcome = logout(&store).unwrap();

        assert_eq!(outcome, LogoutOutcome::NotLoggedIn);
        assert!(!store.path().exists());
        assert_eq!(printed(&outcome), "You are not logged in.\n");
    }

    #[test]
    fn logout_with_session_clears_token() {
        let (_dir, store) = temp_store();
        store
            .save(&StoredCredentials::new("tok_1", Some(cached("ada"))))
            .unwrap();

        let outcome = logout(&store).unwrap();

        assert_eq!(
            outcome,
            LogoutOutcome::LoggedOut {
                username: Some("ada".into())
            }
        );
        assert!(!store.is_authenticated());
        assert_eq!(printed(&outcome), "Logged out ada.\n");
    }

    #[test]
    fn logout_twice_reports_not_logged_in() {
        let (_dir, store) = temp_store();
        store.save(&StoredCredentials::new("tok_1", None)).unwrap();

        assert_eq!(
            logout(&store).unwrap(),
            LogoutOutcome::LoggedOut { username: None }
        );
        assert_eq!(logout(&store).unwrap(), LogoutOutcome::NotLoggedIn);
    }

    #[test]
    fn logout_leaves_corrupt_file_in_place() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "{not json").unwrap();

        assert_eq!(logout(&store).unwrap(), LogoutOutcome::NotLoggedIn);
        assert!(store.path().exists());
    }

    #[test]
    fn whoami_reads_cached_user() {
        let (_dir, store) = temp_store();
        assert_eq!(whoami(&store).unwrap(), None);

        store
            .save(&StoredCredentials::new("tok_1", Some(cached("ada"))))
            .unwrap();
        assert_eq!(whoami(&store).unwrap().unwrap().username, "ada");
    }
}
