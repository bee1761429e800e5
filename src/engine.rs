//! Single owner of the catalog view.
//!
//! The engine applies [`TuiCommand`]s to the [`ProductListPipeline`], keeps
//! the selection and scroll offset in step with the product list, and runs
//! "load more" requests behind a simulated latency. Every processed event
//! publishes a fresh [`AppState`] snapshot on a `watch` channel.

use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::catalog::{Catalog, Category};
use crate::config::Config;
use crate::pipeline::{FilterInputs, LoadOutcome, LoadTicket, ProductListPipeline};
use crate::scroll::{Geometry, ScrollTrigger};
use crate::storefront::StorefrontHooks;
use crate::tui::state::AppState;
use crate::tui::{Movement, TuiCommand};

/// Side effects `handle` asks the run loop to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ScheduleLoad(LoadTicket),
    Exit,
}

pub struct CatalogEngine<H> {
    pipeline: ProductListPipeline,
    categories: Vec<Category>,
    hooks: H,
    trigger: ScrollTrigger,
    load_latency: Duration,
    geometry: Geometry,
    viewport_rows: usize,
    state: AppState,
}

impl<H: StorefrontHooks> CatalogEngine<H> {
    pub fn new(catalog: Catalog, config: &Config, hooks: H) -> Self {
        let catalog_size = catalog.products.len();
        let pipeline = ProductListPipeline::with_inputs(
            catalog.products,
            config.pagination.page_size,
            FilterInputs {
                sort_key: config.display.sort,
                ..FilterInputs::default()
            },
            config.display.view_mode,
        );
        let mut state = AppState::new(catalog.categories.clone(), pipeline.view().clone());
        state.catalog_size = catalog_size;
        state.push_log("INFO", format!("Catalog loaded: {} products", catalog_size));

        let mut engine = Self {
            geometry: Geometry::new(config.display.view_mode, 1),
            pipeline,
            categories: catalog.categories,
            hooks,
            trigger: ScrollTrigger::new(config.scroll.threshold_lines),
            load_latency: config.pagination.load_latency(),
            viewport_rows: 0,
            state,
        };
        engine.sync_state();
        engine
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn handle(&mut self, cmd: TuiCommand) -> Option<Effect> {
        let effect = match cmd {
            TuiCommand::Quit => {
                self.state.exit_requested = true;
                Some(Effect::Exit)
            }
            TuiCommand::SetSearch(query) => {
                self.apply_filter(|p| p.set_search(&query));
                None
            }
            TuiCommand::CycleCategory => {
                let next = self.next_category();
                self.apply_filter(|p| p.set_category(next.as_deref()));
                None
            }
            TuiCommand::CycleSort => {
                let next = self.pipeline.view().sort_key.next();
                self.apply_filter(|p| p.set_sort(next));
                None
            }
            TuiCommand::ClearFilters => {
                self.apply_filter(ProductListPipeline::clear_filters);
                None
            }
            TuiCommand::ToggleView => {
                let mode = self.pipeline.view().view_mode.toggle();
                self.pipeline.set_view_mode(mode);
                self.geometry = Geometry::new(mode, self.geometry.columns);
                self.state.push_log("INFO", format!("View: {}", mode.label()));
                self.follow_selection();
                None
            }
            TuiCommand::Move(movement) => {
                if self.state.detail.is_none() {
                    self.move_selection(movement);
                }
                None
            }
            TuiCommand::Viewport { rows, columns } => {
                self.viewport_rows = rows;
                self.geometry = Geometry::new(self.geometry.mode, columns);
                self.follow_selection();
                None
            }
            TuiCommand::OpenSelected => {
                if let Some(product) = self.state.selected_product().cloned() {
                    self.hooks.on_product_click(&product);
                    self.state.push_log("INFO", format!("Opened {}", product.name));
                    self.state.detail = Some(product);
                }
                None
            }
            TuiCommand::AddToCart => {
                let product = self
                    .state
                    .detail
                    .clone()
                    .or_else(|| self.state.selected_product().cloned());
                if let Some(product) = product {
                    self.hooks.on_add_to_cart(&product);
                    self.state.cart_items += 1;
                    self.state.cart_total += product.price;
                    self.state.push_log(
                        "CART",
                        format!("Added {} (${:.2})", product.name, product.price),
                    );
                }
                None
            }
            TuiCommand::Back => {
                if self.state.detail.take().is_some() {
                    None
                } else {
                    self.hooks.on_back();
                    self.state.exit_requested = true;
                    Some(Effect::Exit)
                }
            }
        };
        if effect.is_some() {
            self.sync_state();
            return effect;
        }
        self.settle()
    }

    /// Apply a finished load to the pipeline. A page that still leaves the
    /// viewport short of content schedules the next one.
    pub fn finish_load(&mut self, ticket: LoadTicket) -> Option<Effect> {
        let outcome = self.pipeline.complete_load(ticket);
        let shown = self.pipeline.displayed().len();
        let total = self.pipeline.filtered().len();
        match outcome {
            LoadOutcome::Applied { added } => {
                tracing::info!(added, shown, total, "page loaded");
                self.state
                    .push_log("LOAD", format!("Loaded {} more ({}/{})", added, shown, total));
            }
            LoadOutcome::Exhausted => {
                tracing::info!(shown, "no more products");
                self.state.push_log("LOAD", "No more products".to_string());
            }
            LoadOutcome::Stale => {
                tracing::debug!(generation = ticket.generation, "stale page dropped");
                self.state
                    .push_log("WARN", "Discarded page from previous filters".to_string());
            }
        }
        self.settle()
    }

    /// Event loop. Returns the hooks when the UI goes away or asks to exit.
    pub async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<TuiCommand>,
        state_tx: watch::Sender<AppState>,
    ) -> H {
        let (load_tx, mut load_rx) = mpsc::channel::<LoadTicket>(4);
        state_tx.send_replace(self.state.clone());

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match self.handle(cmd) {
                        Some(Effect::ScheduleLoad(ticket)) => {
                            spawn_load(ticket, self.load_latency, load_tx.clone());
                        }
                        Some(Effect::Exit) => {
                            state_tx.send_replace(self.state.clone());
                            break;
                        }
                        None => {}
                    }
                }
                Some(ticket) = load_rx.recv() => {
                    if let Some(Effect::ScheduleLoad(next)) = self.finish_load(ticket) {
                        spawn_load(next, self.load_latency, load_tx.clone());
                    }
                }
            }
            state_tx.send_replace(self.state.clone());
        }

        tracing::debug!("engine stopped");
        self.hooks
    }

    fn apply_filter<F: FnOnce(&mut ProductListPipeline)>(&mut self, f: F) {
        let before = self.pipeline.generation();
        f(&mut self.pipeline);
        if self.pipeline.generation() == before {
            return;
        }
        self.state.selected = 0;
        self.state.scroll_offset = 0;
        let view = self.pipeline.view();
        let mut message = format!(
            "{} matching · sort: {}",
            self.pipeline.filtered().len(),
            view.sort_key.label()
        );
        if !view.search_query.is_empty() {
            message.push_str(&format!(" · search: \"{}\"", view.search_query));
        }
        if let Some(cat) = view.category_id.as_deref() {
            message.push_str(&format!(" · category: {}", cat));
        }
        self.state.push_log("FILTER", message);
    }

    /// All → first category → ... → last category → All.
    fn next_category(&self) -> Option<String> {
        let current = self.pipeline.view().category_id.as_deref();
        let next_index = match current {
            None => 0,
            Some(id) => match self.categories.iter().position(|c| c.id == id) {
                Some(i) => i + 1,
                None => 0,
            },
        };
        self.categories.get(next_index).map(|c| c.id.clone())
    }

    fn move_selection(&mut self, movement: Movement) {
        let count = self.pipeline.displayed().len();
        if count == 0 {
            return;
        }
        let last = count - 1;
        let per_row = self.geometry.per_row();
        let page = per_row * (self.viewport_rows / self.geometry.row_height()).max(1);
        let current = self.state.selected.min(last);
        self.state.selected = match movement {
            Movement::Up => {
                if current >= per_row { current - per_row } else { current }
            }
            Movement::Down => (current + per_row).min(last),
            Movement::Left => current.saturating_sub(1),
            Movement::Right => (current + 1).min(last),
            Movement::PageUp => current.saturating_sub(page),
            Movement::PageDown => (current + page).min(last),
            Movement::Top => 0,
            Movement::Bottom => last,
        };
        self.follow_selection();
    }

    fn follow_selection(&mut self) {
        self.state.scroll_offset =
            self.geometry
                .follow(self.state.selected, self.state.scroll_offset, self.viewport_rows);
    }

    fn check_trigger(&mut self) -> Option<Effect> {
        if self.viewport_rows == 0 {
            return None;
        }
        let pos = self.geometry.position(
            self.pipeline.displayed().len(),
            self.state.scroll_offset,
            self.viewport_rows,
        );
        if !self.trigger.should_load(pos) {
            return None;
        }
        let ticket = self.pipeline.begin_load()?;
        tracing::debug!(
            generation = ticket.generation,
            offset = ticket.offset,
            remaining = pos.remaining(),
            "load more triggered"
        );
        Some(Effect::ScheduleLoad(ticket))
    }

    /// Runs after every event that did not exit: re-check the scroll trigger
    /// against the new content, then publish.
    fn settle(&mut self) -> Option<Effect> {
        let effect = self.check_trigger();
        self.sync_state();
        effect
    }

    fn sync_state(&mut self) {
        let displayed = self.pipeline.displayed();
        self.state.view = self.pipeline.view().clone();
        self.state.products = displayed.to_vec();
        self.state.matching = self.pipeline.filtered().len();
        self.state.selected = self.state.selected.min(displayed.len().saturating_sub(1));
    }
}

fn spawn_load(ticket: LoadTicket, latency: Duration, tx: mpsc::Sender<LoadTicket>) {
    tokio::spawn(async move {
        tokio::time::sleep(latency).await;
        // The engine may have exited in the meantime.
        let _ = tx.send(ticket).await;
    });
}
