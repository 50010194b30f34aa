//! User preferences shown on the settings screen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use salesdesk_core::Email;

/// Persisted preferences, stored as one JSON object in the `settings` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: Profile,
    pub notifications: Notifications,
    pub theme: Theme,
}

/// Display name and contact email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Jane Doe".to_owned(),
            email: "jane.doe@email.com".to_owned(),
        }
    }
}

/// Which events the user wants to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub sales: bool,
    pub customers: bool,
    pub products: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            sales: true,
            customers: false,
            products: true,
        }
    }
}

/// Color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(UnknownSetting::InvalidValue {
                field: SettingsField::Theme.as_str(),
                value: other.to_owned(),
            }),
        }
    }
}

/// A single addressable preference, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ProfileName,
    ProfileEmail,
    NotifySales,
    NotifyCustomers,
    NotifyProducts,
    Theme,
}

impl SettingsField {
    pub const ALL: [Self; 6] = [
        Self::ProfileName,
        Self::ProfileEmail,
        Self::NotifySales,
        Self::NotifyCustomers,
        Self::NotifyProducts,
        Self::Theme,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProfileName => "profile.name",
            Self::ProfileEmail => "profile.email",
            Self::NotifySales => "notifications.sales",
            Self::NotifyCustomers => "notifications.customers",
            Self::NotifyProducts => "notifications.products",
            Self::Theme => "theme",
        }
    }
}

impl FromStr for SettingsField {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownSetting::UnknownField(s.to_owned()))
    }
}

/// A `settings set` request that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownSetting {
    #[error("unknown setting: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

impl Settings {
    /// Parse `value` for `field` and store it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSetting::InvalidValue` if the value does not parse for
    /// the field (booleans accept `true`/`false`/`on`/`off`).
    pub fn set(&mut self, field: SettingsField, value: &str) -> Result<(), UnknownSetting> {
        let invalid = || UnknownSetting::InvalidValue {
            field: field.as_str(),
            value: value.to_owned(),
        };
        match field {
            SettingsField::ProfileName => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(invalid());
                }
                name.clone_into(&mut self.profile.name);
            }
            SettingsField::ProfileEmail => {
                let email = Email::parse(value).map_err(|_| invalid())?;
                self.profile.email = email.into_inner();
            }
            SettingsField::NotifySales => {
                self.notifications.sales = parse_switch(value).ok_or_else(invalid)?;
            }
            SettingsField::NotifyCustomers => {
                self.notifications.customers = parse_switch(value).ok_or_else(invalid)?;
            }
            SettingsField::NotifyProducts => {
                self.notifications.products = parse_switch(value).ok_or_else(invalid)?;
            }
            SettingsField::Theme => self.theme = value.parse()?,
        }
        Ok(())
    }

    /// Current value of `field`, formatted for display.
    #[must_use]
    pub fn get(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ProfileName => self.profile.name.clone(),
            SettingsField::ProfileEmail => self.profile.email.clone(),
            SettingsField::NotifySales => self.notifications.sales.to_string(),
            SettingsField::NotifyCustomers => self.notifications.customers.to_string(),
            SettingsField::NotifyProducts => self.notifications.products.to_string(),
            SettingsField::Theme => self.theme.to_string(),
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}
