use crate::theme::Theme;
use crate::utils::*;
use memorito_core as game;
use serde::{Deserialize, Serialize};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub game_config: game::GameConfig,
    pub resolve_delay_ms: u32,
}

impl Settings {
    pub const RESOLVE_DELAY_CHOICES: [u32; 4] = [500, 1000, 1500, 2000];
    const RESOLVE_DELAY_RANGE: (u32, u32) = (100, 5000);

    /// Stored values may come from an older build or be edited by hand.
    pub fn sanitized(self) -> Self {
        let (min_delay, max_delay) = Self::RESOLVE_DELAY_RANGE;
        Self {
            game_config: game::GameConfig::new(self.game_config.grid_size),
            resolve_delay_ms: self.resolve_delay_ms.clamp(min_delay, max_delay),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_config: Default::default(),
            resolve_delay_ms: game::DEFAULT_RESOLVE_DELAY_MS,
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "memorito:settings";
}

fn format_delay(delay_ms: u32) -> String {
    format!("{:.1}s", f64::from(delay_ms) / 1000.)
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct SettingsProps {
    #[prop_or_default]
    pub open: bool,
    pub settings: Settings,
    pub on_change: Callback<Settings>,
    pub on_close: Callback<()>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let SettingsProps {
        open,
        settings,
        on_change,
        on_close,
    } = props.clone();
    let current_delay = settings.resolve_delay_ms;

    let onchange = Callback::from(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        let value = select.value();
        match value.parse() {
            Ok(resolve_delay_ms) => on_change.emit(Settings {
                resolve_delay_ms,
                ..settings.clone()
            }),
            Err(err) => log::warn!("invalid reveal time {:?}: {}", value, err),
        }
    });

    let theme_option = |label: &'static str, theme: Option<Theme>| {
        let onclick = Callback::from(move |_: MouseEvent| Theme::apply(theme));
        html! {
            <li><button type="button" {onclick}>{label}</button></li>
        }
    };

    html! {
        <dialog id="settings" {open}>
            <article>
                <h2>{"Settings"}</h2>
                <label>
                    {"Reveal time"}
                    <select {onchange}>
                        {
                            for Settings::RESOLVE_DELAY_CHOICES.iter().map(|&delay_ms| html! {
                                <option value={delay_ms.to_string()} selected={delay_ms == current_delay}>
                                    {format_delay(delay_ms)}
                                </option>
                            })
                        }
                    </select>
                </label>
                <h3>{"Theme"}</h3>
                <ul>
                    {theme_option("Auto", None)}
                    {theme_option("Light", Some(Theme::Light))}
                    {theme_option("Dark", Some(Theme::Dark))}
                </ul>
                <footer>
                    <button type="button" onclick={move |_| on_close.emit(())}>{"Close"}</button>
                </footer>
            </article>
        </dialog>
    }
}
