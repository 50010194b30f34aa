//! Setup and account commands.

use std::io::Write;

use secrecy::SecretString;
use tracing::info;

use salesdesk_admin::services::{AuthState, SeedOutcome};
use salesdesk_admin::state::AppState;

use super::{CommandError, app_err};

/// Create the default account and, if configured, seed demo data.
///
/// # Errors
///
/// Returns an error if setup fails or output cannot be written.
pub fn init(state: &AppState, out: &mut dyn Write) -> Result<(), CommandError> {
    let report = state.bootstrap()?;
    writeln!(out, "Data directory: {}", state.config().data_dir.display())?;
    if report.default_user_created {
        writeln!(out, "Created default account")?;
    }
    if let Some(outcome) = report.products {
        write_outcome(out, "products", outcome)?;
    }
    if let Some(outcome) = report.customers {
        write_outcome(out, "customers", outcome)?;
    }
    Ok(())
}

/// Seed demo data into empty collections, regardless of configuration.
///
/// # Errors
///
/// Returns an error if seeding fails or output cannot be written.
pub fn seed(state: &AppState, out: &mut dyn Write) -> Result<(), CommandError> {
    let (products, customers) = state.seed()?;
    write_outcome(out, "products", products)?;
    write_outcome(out, "customers", customers)?;
    Ok(())
}

/// Register an account. Does not log in.
///
/// # Errors
///
/// Returns an error for a blank username or password.
pub fn signup(
    state: &AppState,
    username: &str,
    password: String,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    state
        .auth()
        .register_user(username, &password)
        .map_err(app_err)?;
    writeln!(out, "Account created for {}. Log in to continue.", username.trim())?;
    Ok(())
}

/// Log in and set the shared login flag.
///
/// # Errors
///
/// Returns `CommandError::LoginFailed` if the credentials do not match.
pub fn login(
    state: &AppState,
    username: &str,
    password: String,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    if !state.auth().login(username, &password).map_err(app_err)? {
        return Err(CommandError::LoginFailed);
    }
    writeln!(out, "Logged in as {username}")?;
    Ok(())
}

/// Clear the login flag.
///
/// # Errors
///
/// Returns an error if the flag cannot be written.
pub fn logout(state: &AppState, out: &mut dyn Write) -> Result<(), CommandError> {
    state.auth().logout().map_err(app_err)?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Show the login state.
///
/// # Errors
///
/// Returns an error if the flag cannot be read.
pub fn status(state: &AppState, out: &mut dyn Write) -> Result<(), CommandError> {
    let auth_state = state.auth().state().map_err(app_err)?;
    info!(?auth_state, "checked login state");
    match auth_state {
        AuthState::Authenticated => writeln!(out, "Logged in")?,
        AuthState::Unauthenticated => writeln!(out, "Not logged in")?,
    }
    Ok(())
}

fn write_outcome(out: &mut dyn Write, name: &str, outcome: SeedOutcome) -> Result<(), CommandError> {
    match outcome {
        SeedOutcome::Seeded(count) => writeln!(out, "Seeded {count} {name}")?,
        SeedOutcome::Skipped { existing } => {
            writeln!(out, "Skipped {name}: {existing} already present")?;
        }
    }
    Ok(())
}
