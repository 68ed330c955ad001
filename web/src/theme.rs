use crate::utils::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const ATTR_NAME: &'static str = "data-theme";

    pub(crate) const fn scheme(self) -> &'static str {
        use Theme::*;
        match self {
            Light => "light",
            Dark => "dark",
        }
    }

    fn update_html(theme: Option<Self>) {
        let Some(html) = gloo::utils::document().document_element() else {
            log::error!("no document element to apply the theme to");
            return;
        };
        if let Some(theme) = theme {
            let scheme = theme.scheme();
            log::debug!("theme-scheme: {}", scheme);
            if let Err(err) = html.set_attribute(Self::ATTR_NAME, scheme) {
                log::error!("failed to set theme: {:?}", err);
            }
        } else {
            log::debug!("no theme preference");
            if let Err(err) = html.remove_attribute(Self::ATTR_NAME) {
                log::error!("failed to unset theme: {:?}", err);
            }
        }
    }

    pub(crate) fn init() {
        Self::update_html(Self::local_load());
    }

    /// Stores the preference, `None` follows the browser's color scheme.
    pub(crate) fn apply(theme: Option<Self>) {
        match theme {
            Some(theme) => theme.local_save(),
            None => Self::local_clear(),
        }
        Self::update_html(theme);
    }
}

impl StorageKey for Theme {
    const KEY: &'static str = "memorito:theme";
}
