use crate::settings;
use crate::utils::*;
use bitflags::bitflags;
use clap::Args;
use gloo::timers::callback::Timeout;
use memorito_core as game;
use serde::{Deserialize, Serialize};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq)]
enum CardFace {
    Down,
    Up,
    Matched,
}

impl CardFace {
    const fn new(flipped: bool, solved: bool) -> Self {
        match (flipped, solved) {
            (_, true) => Self::Matched,
            (true, false) => Self::Up,
            (false, false) => Self::Down,
        }
    }

    const fn is_face_up(self) -> bool {
        !matches!(self, Self::Down)
    }

    const fn class(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Matched => "matched",
        }
    }

    fn label(self, value: game::CardValue) -> String {
        if self.is_face_up() {
            value.to_string()
        } else {
            "?".to_string()
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CardPointerState {
    id: game::CardId,
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum CardMsg {
    Press(CardPointerState),
    Update(CardPointerState),
    Leave,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum PointerOutcome {
    Unchanged,
    Changed,
    Click(game::CardId),
}

impl CardMsg {
    /// A click is the left button alone pressed and released on the same card, a press dragged in from elsewhere does not count.
    fn apply(self, current: &mut Option<CardPointerState>) -> PointerOutcome {
        use PointerOutcome::*;

        match self {
            Self::Leave => match current.take() {
                Some(_) => Changed,
                None => Unchanged,
            },
            Self::Press(pointer) => match current.replace(pointer) {
                Some(previous) if previous == pointer => Unchanged,
                _ => Changed,
            },
            Self::Update(pointer) if pointer.buttons.is_empty() => match current.take() {
                None => Unchanged,
                Some(CardPointerState {
                    id,
                    buttons: MouseButtons::LEFT,
                }) if id == pointer.id => Click(id),
                Some(_) => Changed,
            },
            Self::Update(pointer) => match current {
                Some(pressed) if pressed.id == pointer.id => {
                    if *pressed == pointer {
                        Unchanged
                    } else {
                        *pressed = pointer;
                        Changed
                    }
                }
                // buttons held while entering, the press started on another card
                _ => Unchanged,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Msg {
    CardEvent(CardMsg),
    Resolve(game::ResolveTicket),
    SetGridSize(String),
    NewGame,
    ToggleSettings,
    UpdateSettings(settings::Settings),
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    id: game::CardId,
    value: game::CardValue,
    flipped: bool,
    solved: bool,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<CardMsg>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    let CardProps {
        id,
        value,
        flipped,
        solved,
        pressed,
        callback,
    } = props.clone();

    let face = CardFace::new(flipped, solved);
    let mut class = classes!("card", face.class());
    if pressed {
        class.push("pressed");
    }

    let pointer_event = |event: &'static str, msg: fn(CardPointerState) -> CardMsg| {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(msg(CardPointerState { id, buttons }));
            log::trace!("card {} mouse {} ({:?})", id, event, buttons);
        })
    };
    let onmousedown = pointer_event("down", CardMsg::Press);
    let onmouseup = pointer_event("up", CardMsg::Update);
    let onmouseenter = pointer_event("enter", CardMsg::Update);

    let onmouseleave = Callback::from(move |_: MouseEvent| {
        callback.emit(CardMsg::Leave);
        log::trace!("card {} mouse leave", id);
    });

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}>
            <span>{face.label(value)}</span>
        </td>
    }
}

#[derive(Args, Properties, Debug, Clone, Default, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random, later deals continue from it
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Start with this grid size instead of the stored one
    #[arg(short, long)]
    pub grid: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum SeedSource {
    Random,
    Fixed { base: u64, deals: u64 },
}

impl SeedSource {
    fn new(forced: Option<u64>) -> Self {
        match forced {
            Some(base) => Self::Fixed { base, deals: 0 },
            None => Self::Random,
        }
    }

    fn next_seed(&mut self) -> u64 {
        match self {
            Self::Random => js_random_seed(),
            Self::Fixed { base, deals } => {
                let seed = base.wrapping_add(*deals);
                *deals += 1;
                seed
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct GameView {
    settings: settings::Settings,
    engine: game::PlayEngine,
    seeds: SeedSource,
    settings_open: bool,
    current_pointer: Option<CardPointerState>,
    pending_resolution: Option<Timeout>,
    grid_input: NodeRef,
}

impl GameView {
    /// Deals a fresh deck for the current settings, whatever was pending belongs to the old deck.
    fn deal(&mut self) {
        // dropping the handle cancels the timer
        self.pending_resolution = None;
        self.current_pointer = None;
        let seed = self.seeds.next_seed();
        self.engine.redeal(
            self.settings.game_config,
            game::RandomDeckGenerator::new(seed),
        );
    }

    fn flip_card(&mut self, ctx: &Context<Self>, id: game::CardId) -> bool {
        match self.engine.flip(id) {
            Ok(game::FlipOutcome::PairRevealed(ticket)) => {
                let link = ctx.link().clone();
                self.pending_resolution = Some(Timeout::new(
                    self.settings.resolve_delay_ms,
                    move || link.send_message(Msg::Resolve(ticket)),
                ));
                true
            }
            Ok(outcome) => outcome.has_update(),
            Err(err) => {
                log::warn!("cannot flip card {}: {}", id, err);
                false
            }
        }
    }

    fn resolve_pair(&mut self, ticket: game::ResolveTicket) -> bool {
        let outcome = self.engine.resolve(ticket);
        log::debug!("resolved {:?}: {:?}", ticket.pair(), outcome);
        if outcome != game::ResolveOutcome::Stale {
            self.pending_resolution = None;
        }
        outcome.has_update()
    }

    fn set_grid_size(&mut self, input: &str) -> bool {
        let updated = match game::GameConfig::parse_grid_size(input) {
            Ok(config) if config != self.settings.game_config => {
                log::debug!("grid size: {}", config.grid_size);
                self.settings.game_config = config;
                self.settings.local_save();
                self.deal();
                true
            }
            Ok(_) => false,
            Err(err) => {
                log::warn!("ignoring grid size {:?}: {}", input, err);
                false
            }
        };
        self.sync_grid_input();
        updated
    }

    /// The field keeps whatever was typed unless told otherwise, show the grid size actually in use.
    fn sync_grid_input(&self) {
        if let Some(input) = self.grid_input.cast::<HtmlInputElement>() {
            let grid_size = self.settings.game_config.grid_size.to_string();
            if input.value() != grid_size {
                input.set_value(&grid_size);
            }
        }
    }

    fn is_pressed(&self, id: game::CardId, face_up: bool) -> bool {
        if face_up || !self.engine.state().accepts_flips() {
            return false;
        }
        matches!(
            self.current_pointer,
            Some(CardPointerState {
                id: pressed_id,
                buttons: MouseButtons::LEFT,
            }) if pressed_id == id
        )
    }

    fn get_board_class(&self) -> Classes {
        use game::EngineState::*;
        classes!(match self.engine.state() {
            Idle | OneFlipped => "playable",
            PairPending => "pending",
            Won => "won",
        })
    }

    fn card_view(&self, ctx: &Context<Self>, card: game::Card) -> Html {
        let game::Card { id, value } = card;
        let flipped = self.engine.is_flipped(id);
        let solved = self.engine.is_solved(id);
        let pressed = self.is_pressed(id, flipped || solved);
        let callback = ctx.link().callback(Msg::CardEvent);
        html! {
            <CardView {id} {value} {flipped} {solved} {pressed} {callback}/>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let mut settings = settings::Settings::local_or_default().sanitized();
        if let Some(grid) = props.grid.as_deref() {
            match game::GameConfig::parse_grid_size(grid) {
                Ok(config) => settings.game_config = config,
                Err(err) => log::warn!("ignoring grid argument {:?}: {}", grid, err),
            }
        }

        let mut seeds = SeedSource::new(props.seed);
        let engine = game::PlayEngine::deal(
            settings.game_config,
            game::RandomDeckGenerator::new(seeds.next_seed()),
        );

        Self {
            settings,
            engine,
            seeds,
            settings_open: false,
            current_pointer: None,
            pending_resolution: None,
            grid_input: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            CardEvent(card_msg) => {
                log::trace!("card event: {:?}", card_msg);
                match card_msg.apply(&mut self.current_pointer) {
                    PointerOutcome::Unchanged => false,
                    PointerOutcome::Changed => true,
                    PointerOutcome::Click(id) => {
                        log::debug!("flip card: {}", id);
                        self.flip_card(ctx, id);
                        true
                    }
                }
            }
            Resolve(ticket) => self.resolve_pair(ticket),
            SetGridSize(input) => self.set_grid_size(&input),
            NewGame => {
                log::debug!("new game");
                self.deal();
                true
            }
            ToggleSettings => {
                self.settings_open = !self.settings_open;
                true
            }
            UpdateSettings(settings) => {
                if self.settings != settings {
                    settings.local_save();
                    self.settings = settings;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use settings::SettingsView;
        use Msg::*;

        let config = self.settings.game_config;
        let won = self.engine.is_won();
        let board_class = self.get_board_class();
        let reset_label = if won { "Play Again" } else { "Reset Game" };

        let cb_grid_size = ctx.link().callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            SetGridSize(input.value())
        });
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });
        let cb_toggle_settings = ctx.link().callback(|_: MouseEvent| ToggleSettings);
        let cb_close_settings = ctx.link().callback(|_: ()| ToggleSettings);
        let cb_update_settings = ctx.link().callback(UpdateSettings);

        html! {
            <div class="memorito" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <small onclick={cb_toggle_settings}>{"···"}</small>
                <h1>{"Memory Game"}</h1>
                <label class="grid-size">
                    {"Grid size:"}
                    <input
                        ref={self.grid_input.clone()}
                        type="number"
                        name="grid"
                        min={game::GameConfig::MIN_GRID_SIZE.to_string()}
                        max={game::GameConfig::MAX_GRID_SIZE.to_string()}
                        value={config.grid_size.to_string()}
                        onchange={cb_grid_size}
                    />
                </label>
                <table class={board_class}>
                    {
                        for self.engine.deck().rows(config.columns()).map(|row| html! {
                            <tr>
                                { for row.iter().map(|&card| self.card_view(ctx, card)) }
                            </tr>
                        })
                    }
                </table>
                if won {
                    <p class="won">{"You found every pair!"}</p>
                }
                <nav>
                    <button onclick={cb_new_game}>{reset_label}</button>
                </nav>
                <SettingsView
                    open={self.settings_open}
                    settings={self.settings.clone()}
                    on_change={cb_update_settings}
                    on_close={cb_close_settings}
                />
            </div>
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use memorito_core::DeckGenerator;
    use gloo::timers::future::TimeoutFuture;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::{Element, EventInit, HtmlElement, MouseEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    const SEED: u64 = 7;

    fn mount(props: GameProps) -> Element {
        settings::Settings::local_clear();
        let document = gloo::utils::document();
        let root = document.create_element("div").expect("create test root");
        gloo::utils::body()
            .append_child(&root)
            .expect("append test root");
        yew::Renderer::<GameView>::with_root_and_props(root.clone(), props).render();
        root
    }

    fn mount_seeded(grid: &str) -> Element {
        mount(GameProps {
            seed: Some(SEED),
            grid: Some(grid.to_string()),
        })
    }

    /// Same deck the view deals first for `SEED`.
    fn first_deck(grid_size: game::GridSize) -> game::Deck {
        game::RandomDeckGenerator::new(SEED).generate(game::GameConfig::new(grid_size))
    }

    /// Board positions of the first card and of another card picked by `same_value`.
    fn pair_positions(deck: &game::Deck, same_value: bool) -> [u32; 2] {
        let first = deck.cards()[0];
        let second = deck
            .cards()
            .iter()
            .skip(1)
            .position(|card| (card.value == first.value) == same_value)
            .expect("deck has more than one pair");
        [0, second as u32 + 1]
    }

    fn count(root: &Element, selector: &str) -> u32 {
        root.query_selector_all(selector)
            .expect("valid selector")
            .length()
    }

    fn mouse_event(kind: &str, buttons: u16) -> web_sys::MouseEvent {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_buttons(buttons);
        web_sys::MouseEvent::new_with_mouse_event_init_dict(kind, &init).expect("mouse event")
    }

    async fn click_card(root: &Element, position: u32) {
        let cells = root.query_selector_all("td.card").expect("valid selector");
        let cell = cells.item(position).expect("card cell");
        cell.dispatch_event(&mouse_event("mousedown", MouseButtons::LEFT.bits()))
            .expect("dispatch mousedown");
        TimeoutFuture::new(0).await;
        cell.dispatch_event(&mouse_event("mouseup", 0))
            .expect("dispatch mouseup");
        TimeoutFuture::new(0).await;
    }

    async fn reveal(root: &Element, [first, second]: [u32; 2]) {
        click_card(root, first).await;
        click_card(root, second).await;
        assert_eq!(count(root, "td.card.up"), 2);
    }

    async fn change_grid(root: &Element, value: &str) -> web_sys::HtmlInputElement {
        let input: web_sys::HtmlInputElement = root
            .query_selector("input[name=grid]")
            .expect("valid selector")
            .expect("grid input")
            .unchecked_into();
        input.set_value(value);
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = web_sys::Event::new_with_event_init_dict("change", &init).expect("change event");
        input.dispatch_event(&event).expect("dispatch change");
        TimeoutFuture::new(0).await;
        input
    }

    async fn wait_past_resolve_delay() {
        TimeoutFuture::new(settings::Settings::default().resolve_delay_ms + 300).await;
    }

    #[wasm_bindgen_test]
    async fn odd_grid_renders_one_cell_per_card() {
        let root = mount_seeded("3");
        TimeoutFuture::new(0).await;

        assert_eq!(count(&root, "td.card"), 8);
        assert_eq!(count(&root, "tr"), 3);
        assert_eq!(count(&root, "td.card.up"), 0);
    }

    #[wasm_bindgen_test]
    async fn matching_pair_is_solved_after_the_delay() {
        let root = mount_seeded("2");
        TimeoutFuture::new(0).await;

        reveal(&root, pair_positions(&first_deck(2), true)).await;
        assert_eq!(count(&root, "td.card.matched"), 0);

        wait_past_resolve_delay().await;
        assert_eq!(count(&root, "td.card.up"), 0);
        assert_eq!(count(&root, "td.card.matched"), 2);
    }

    #[wasm_bindgen_test]
    async fn mismatched_pair_turns_back_down_after_the_delay() {
        let root = mount_seeded("2");
        TimeoutFuture::new(0).await;

        reveal(&root, pair_positions(&first_deck(2), false)).await;

        wait_past_resolve_delay().await;
        assert_eq!(count(&root, "td.card.up"), 0);
        assert_eq!(count(&root, "td.card.matched"), 0);
        assert_eq!(count(&root, "td.card.down"), 4);
    }

    #[wasm_bindgen_test]
    async fn new_game_while_pending_deals_fresh_board() {
        let root = mount_seeded("2");
        TimeoutFuture::new(0).await;

        reveal(&root, pair_positions(&first_deck(2), true)).await;
        let reset: HtmlElement = root
            .query_selector("nav button")
            .expect("valid selector")
            .expect("reset button")
            .unchecked_into();
        reset.click();
        TimeoutFuture::new(0).await;
        assert_eq!(count(&root, "td.card.down"), 4);

        // the dropped timer must not solve anything on the new deck
        wait_past_resolve_delay().await;
        assert_eq!(count(&root, "td.card.down"), 4);
        assert_eq!(count(&root, "td.card.matched"), 0);
    }

    #[wasm_bindgen_test]
    async fn grid_change_while_pending_deals_fresh_board() {
        let root = mount_seeded("2");
        TimeoutFuture::new(0).await;

        reveal(&root, pair_positions(&first_deck(2), true)).await;
        let input = change_grid(&root, "3").await;
        assert_eq!(input.value(), "3");
        assert_eq!(count(&root, "td.card"), 8);
        assert_eq!(count(&root, "td.card.down"), 8);

        wait_past_resolve_delay().await;
        assert_eq!(count(&root, "td.card.down"), 8);
        assert_eq!(count(&root, "td.card.matched"), 0);
    }

    #[wasm_bindgen_test]
    async fn rejected_grid_input_keeps_board_and_rewrites_field() {
        let root = mount_seeded("2");
        TimeoutFuture::new(0).await;

        let input = change_grid(&root, "abc").await;
        assert_eq!(input.value(), "2");
        assert_eq!(count(&root, "td.card"), 4);

        let input = change_grid(&root, "40").await;
        assert_eq!(input.value(), "8");
        assert_eq!(count(&root, "td.card"), 64);
    }
}
