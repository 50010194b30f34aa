//! Preference commands.

use std::io::Write;

use clap::Subcommand;
use tracing::info;

use salesdesk_admin::error::AppError;
use salesdesk_admin::models::SettingsField;
use salesdesk_admin::state::AppState;

use super::{CommandError, app_err};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show every preference
    Show,
    /// Change one preference, e.g. `theme dark` or `notifications.sales off`
    Set { field: String, value: String },
    /// Switch between the light and dark theme
    ToggleTheme,
}

/// Run a settings subcommand.
///
/// # Errors
///
/// Returns an error for an unknown field, an invalid value, or a storage
/// failure.
pub fn run(state: &AppState, action: SettingsAction, out: &mut dyn Write) -> Result<(), CommandError> {
    let store = state.settings();
    let settings = match action {
        SettingsAction::Show => store.load().map_err(app_err)?,
        SettingsAction::Set { field, value } => {
            let field: SettingsField = field.parse().map_err(app_err)?;
            let saved = store.update(|settings| {
                settings.set(field, &value).map_err(AppError::from)
            })?;
            info!(field = field.as_str(), "setting changed");
            saved
        }
        SettingsAction::ToggleTheme => {
            let saved = store.update(|settings| {
                settings.theme = settings.theme.toggled();
                Ok::<_, AppError>(())
            })?;
            info!(theme = %saved.theme, "theme toggled");
            saved
        }
    };

    for field in SettingsField::ALL {
        writeln!(out, "{:<24} {}", field.as_str(), settings.get(field))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use salesdesk_admin::models::Theme;

    use super::*;
    use crate::commands::test_support::{logged_in_state, output};

    #[test]
    fn test_show_defaults() {
        let state = logged_in_state(false);
        let mut buf = Vec::new();
        run(&state, SettingsAction::Show, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("jane.doe@email.com"));
        assert!(text.contains("theme"));
    }

    #[test]
    fn test_set_and_toggle() {
        let state = logged_in_state(false);
        run(
            &state,
            SettingsAction::Set {
                field: "notifications.customers".to_owned(),
                value: "on".to_owned(),
            },
            &mut Vec::new(),
        )
        .unwrap();
        run(&state, SettingsAction::ToggleTheme, &mut Vec::new()).unwrap();

        let saved = state.settings().load().unwrap();
        assert!(saved.notifications.customers);
        assert_eq!(saved.theme, Theme::Dark);
    }

    #[test]
    fn test_rejects_unknown_field() {
        let state = logged_in_state(false);
        let err = run(
            &state,
            SettingsAction::Set {
                field: "profile.age".to_owned(),
                value: "3".to_owned(),
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown setting"));
    }
}
