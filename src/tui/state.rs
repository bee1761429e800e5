use std::collections::VecDeque;
use std::time::Instant;

use crate::catalog::{Category, Product};
use crate::pipeline::ViewState;

const MAX_LOGS: usize = 200;

/// Snapshot published by the engine and rendered by the TUI.
#[derive(Debug, Clone)]
pub struct AppState {
    pub start_time: Instant,
    pub categories: Vec<Category>,
    pub view: ViewState,
    /// The displayed prefix of the filtered list.
    pub products: Vec<Product>,
    /// Length of the filtered list.
    pub matching: usize,
    pub catalog_size: usize,
    pub selected: usize,
    /// First visible line of the product area.
    pub scroll_offset: usize,
    pub detail: Option<Product>,
    pub cart_items: u32,
    pub cart_total: f64,
    pub logs: VecDeque<LogEntry>,
    pub exit_requested: bool,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new(categories: Vec<Category>, view: ViewState) -> Self {
        Self {
            start_time: Instant::now(),
            categories,
            view,
            products: Vec::new(),
            matching: 0,
            catalog_size: 0,
            selected: 0,
            scroll_offset: 0,
            detail: None,
            cart_items: 0,
            cart_total: 0.0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            exit_requested: false,
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.products.get(self.selected)
    }

    pub fn category_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map_or(id, |c| c.name.as_str())
    }

    /// Label for the active category filter.
    pub fn category_label(&self) -> &str {
        match self.view.category_id.as_deref() {
            Some(id) => self.category_name(id),
            None => "All",
        }
    }

    /// Tab index of the active category; 0 is "All".
    pub fn category_tab(&self) -> usize {
        self.view
            .category_id
            .as_deref()
            .and_then(|id| self.categories.iter().position(|c| c.id == id))
            .map_or(0, |i| i + 1)
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{SortKey, ViewMode};

    fn state() -> AppState {
        let categories = vec![
            Category { id: "home".to_string(), name: "Home & Kitchen".to_string() },
            Category { id: "books".to_string(), name: "Books".to_string() },
        ];
        let view = ViewState {
            search_query: String::new(),
            category_id: None,
            sort_key: SortKey::Name,
            view_mode: ViewMode::Grid,
            displayed_count: 0,
            has_more: false,
            loading: false,
        };
        AppState::new(categories, view)
    }

    #[test]
    fn test_push_log_caps_at_max() {
        let mut s = state();
        for i in 0..(MAX_LOGS + 25) {
            s.push_log("INFO", format!("entry {}", i));
        }
        assert_eq!(s.logs.len(), MAX_LOGS);
        assert_eq!(s.logs.front().unwrap().message, "entry 25");
    }

    #[test]
    fn test_category_labels_and_tabs() {
        let mut s = state();
        assert_eq!(s.category_label(), "All");
        assert_eq!(s.category_tab(), 0);
        s.view.category_id = Some("books".to_string());
        assert_eq!(s.category_label(), "Books");
        assert_eq!(s.category_tab(), 2);
        assert_eq!(s.category_name("garden"), "garden");
    }
}
