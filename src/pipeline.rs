//! Product list derivation: filter, sort, and paginate a fixed catalog.
//!
//! The pipeline owns the [`ViewState`]. Every change to the filter inputs
//! (search query, category, sort key) recomputes the filtered list in full,
//! resets the displayed prefix to one page, and bumps a generation counter.
//! Loads are two-phase: [`ProductListPipeline::begin_load`] hands out a
//! [`LoadTicket`], and [`ProductListPipeline::complete_load`] applies it only
//! if no filter change happened in between.

use serde::Deserialize;
use std::cmp::Ordering;

use crate::catalog::Product;

pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::Rating,
    ];

    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::PriceLow,
            SortKey::PriceLow => SortKey::PriceHigh,
            SortKey::PriceHigh => SortKey::Rating,
            SortKey::Rating => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::PriceLow => "Price: Low to High",
            SortKey::PriceHigh => "Price: High to Low",
            SortKey::Rating => "Top Rated",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortKey::PriceLow => a.price.total_cmp(&b.price),
            SortKey::PriceHigh => b.price.total_cmp(&a.price),
            SortKey::Rating => b.rating.total_cmp(&a.rating),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::List => "List",
        }
    }
}

/// The triple that determines the derived product list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInputs {
    pub search_query: String,
    pub category_id: Option<String>,
    pub sort_key: SortKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub search_query: String,
    pub category_id: Option<String>,
    pub sort_key: SortKey,
    pub view_mode: ViewMode,
    pub displayed_count: usize,
    pub has_more: bool,
    pub loading: bool,
}

impl ViewState {
    pub fn filter_inputs(&self) -> FilterInputs {
        FilterInputs {
            search_query: self.search_query.clone(),
            category_id: self.category_id.clone(),
            sort_key: self.sort_key,
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_query.trim().is_empty() || self.category_id.is_some()
    }
}

/// Issued by `begin_load`, redeemed by `complete_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { added: usize },
    Exhausted,
    /// Filter inputs changed while the load was in flight; result dropped.
    Stale,
}

/// Case-insensitive substring match on name, description or category.
/// `needle` must already be lowercased.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

/// Filter `catalog` by search text and category, then stable-sort by `sort_key`.
pub fn filter_and_sort(catalog: &[Product], inputs: &FilterInputs) -> Vec<Product> {
    let needle = inputs.search_query.trim().to_lowercase();
    let mut out: Vec<Product> = catalog
        .iter()
        .filter(|p| needle.is_empty() || matches_search(p, &needle))
        .filter(|p| {
            inputs
                .category_id
                .as_deref()
                .is_none_or(|cat| p.category == cat)
        })
        .cloned()
        .collect();
    // sort_by is stable
    out.sort_by(|a, b| inputs.sort_key.compare(a, b));
    out
}

#[derive(Debug, Clone)]
pub struct ProductListPipeline {
    catalog: Vec<Product>,
    page_size: usize,
    view: ViewState,
    filtered: Vec<Product>,
    generation: u64,
}

impl ProductListPipeline {
    pub fn new(catalog: Vec<Product>, page_size: usize) -> Self {
        Self::with_inputs(catalog, page_size, FilterInputs::default(), ViewMode::default())
    }

    pub fn with_inputs(
        catalog: Vec<Product>,
        page_size: usize,
        inputs: FilterInputs,
        view_mode: ViewMode,
    ) -> Self {
        let mut pipeline = Self {
            catalog,
            page_size: page_size.max(1),
            view: ViewState {
                search_query: inputs.search_query,
                category_id: inputs.category_id,
                sort_key: inputs.sort_key,
                view_mode,
                displayed_count: 0,
                has_more: false,
                loading: false,
            },
            filtered: Vec::new(),
            generation: 0,
        };
        pipeline.refresh();
        pipeline
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filtered(&self) -> &[Product] {
        &self.filtered
    }

    pub fn displayed(&self) -> &[Product] {
        &self.filtered[..self.view.displayed_count]
    }

    pub fn set_search(&mut self, query: &str) {
        if self.view.search_query != query {
            self.view.search_query = query.to_string();
            self.refresh();
        }
    }

    pub fn set_category(&mut self, category_id: Option<&str>) {
        if self.view.category_id.as_deref() != category_id {
            self.view.category_id = category_id.map(str::to_string);
            self.refresh();
        }
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        if self.view.sort_key != sort_key {
            self.view.sort_key = sort_key;
            self.refresh();
        }
    }

    pub fn set_filters(&mut self, inputs: FilterInputs) {
        if self.view.filter_inputs() != inputs {
            self.view.search_query = inputs.search_query;
            self.view.category_id = inputs.category_id;
            self.view.sort_key = inputs.sort_key;
            self.refresh();
        }
    }

    /// Reset search and category. The sort key is kept.
    pub fn clear_filters(&mut self) {
        self.set_filters(FilterInputs {
            sort_key: self.view.sort_key,
            ..FilterInputs::default()
        });
    }

    /// View mode is presentation only and does not reset pagination.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view.view_mode = mode;
    }

    /// Start a load. Returns `None` if a load is already in flight or the
    /// filtered list is fully displayed.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.view.loading || !self.view.has_more {
            return None;
        }
        self.view.loading = true;
        Some(LoadTicket {
            generation: self.generation,
            offset: self.view.displayed_count,
        })
    }

    pub fn complete_load(&mut self, ticket: LoadTicket) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                current = self.generation,
                "discarding stale load"
            );
            return LoadOutcome::Stale;
        }
        self.view.loading = false;

        let start = self.view.displayed_count;
        let end = (start + self.page_size).min(self.filtered.len());
        if end <= start {
            self.view.has_more = false;
            return LoadOutcome::Exhausted;
        }
        self.view.displayed_count = end;
        self.view.has_more = end < self.filtered.len();
        LoadOutcome::Applied { added: end - start }
    }

    fn refresh(&mut self) {
        self.filtered = filter_and_sort(&self.catalog, &self.view.filter_inputs());
        self.generation += 1;
        self.view.displayed_count = self.page_size.min(self.filtered.len());
        self.view.has_more = self.view.displayed_count < self.filtered.len();
        self.view.loading = false;
        tracing::debug!(
            generation = self.generation,
            matching = self.filtered.len(),
            query = %self.view.search_query,
            category = ?self.view.category_id,
            sort = ?self.view.sort_key,
            "product list recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, category: &str, price: f64, rating: f64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            category: category.to_string(),
            price,
            rating,
            reviews: 10,
        }
    }

    fn many(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| product(&i.to_string(), &format!("Item {:03}", i), "misc", i as f64, 4.0))
            .collect()
    }

    #[test]
    fn test_three_product_scenario() {
        let catalog = vec![
            product("1", "Zebra Lamp", "home", 30.0, 4.0),
            product("2", "apple slicer", "home", 10.0, 4.5),
            product("3", "Mango Juicer", "home", 20.0, 3.9),
        ];
        let p = ProductListPipeline::new(catalog, PAGE_SIZE);
        let names: Vec<&str> = p.displayed().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["apple slicer", "Mango Juicer", "Zebra Lamp"]);
        assert_eq!(p.view().displayed_count, 3);
        assert!(!p.view().has_more);
    }

    #[test]
    fn test_search_matches_name_description_and_category() {
        let catalog = vec![
            product("1", "Desk Lamp", "home", 30.0, 4.0),
            Product {
                description: "A LAMP for reading".to_string(),
                ..product("2", "Reader", "books", 10.0, 4.5)
            },
            product("3", "Kettle", "lamps", 20.0, 3.9),
            product("4", "Kettle", "kitchen", 20.0, 3.9),
        ];
        let inputs = FilterInputs {
            search_query: "lamp".to_string(),
            ..FilterInputs::default()
        };
        let ids: Vec<String> = filter_and_sort(&catalog, &inputs).into_iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&"4".to_string()));
    }

    #[test]
    fn test_whitespace_only_search_is_ignored() {
        let inputs = FilterInputs {
            search_query: "   ".to_string(),
            ..FilterInputs::default()
        };
        assert_eq!(filter_and_sort(&many(5), &inputs).len(), 5);
    }

    #[test]
    fn test_category_and_search_conjunction() {
        let catalog = vec![
            product("1", "Red Mug", "home", 5.0, 4.0),
            product("2", "Red Shirt", "clothing", 15.0, 4.0),
            product("3", "Blue Mug", "home", 6.0, 4.0),
        ];
        let inputs = FilterInputs {
            search_query: "red".to_string(),
            category_id: Some("home".to_string()),
            sort_key: SortKey::Name,
        };
        let result = filter_and_sort(&catalog, &inputs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn test_sort_orders() {
        let catalog = vec![
            product("a", "B", "x", 20.0, 3.0),
            product("b", "A", "x", 10.0, 5.0),
            product("c", "C", "x", 30.0, 4.0),
        ];
        let ids = |key| -> Vec<String> {
            filter_and_sort(&catalog, &FilterInputs { sort_key: key, ..FilterInputs::default() })
                .into_iter()
                .map(|p| p.id)
                .collect()
        };
        assert_eq!(ids(SortKey::Name), vec!["b", "a", "c"]);
        assert_eq!(ids(SortKey::PriceLow), vec!["b", "a", "c"]);
        assert_eq!(ids(SortKey::PriceHigh), vec!["c", "a", "b"]);
        assert_eq!(ids(SortKey::Rating), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let catalog = vec![
            product("first", "Same", "x", 10.0, 4.0),
            product("second", "Same", "x", 10.0, 4.0),
            product("third", "Same", "x", 10.0, 4.0),
        ];
        for key in SortKey::ALL {
            let ids: Vec<String> = filter_and_sort(&catalog, &FilterInputs { sort_key: key, ..FilterInputs::default() })
                .into_iter()
                .map(|p| p.id)
                .collect();
            assert_eq!(ids, vec!["first", "second", "third"], "{:?}", key);
        }
    }

    #[test]
    fn test_initial_page_and_has_more() {
        let p = ProductListPipeline::new(many(30), PAGE_SIZE);
        assert_eq!(p.displayed().len(), 12);
        assert!(p.view().has_more);
        assert!(!p.view().loading);
    }

    #[test]
    fn test_load_more_appends_pages_until_exhausted() {
        let mut p = ProductListPipeline::new(many(30), PAGE_SIZE);

        let t = p.begin_load().unwrap();
        assert!(p.view().loading);
        assert_eq!(t.offset, 12);
        assert_eq!(p.complete_load(t), LoadOutcome::Applied { added: 12 });
        assert_eq!(p.displayed().len(), 24);
        assert!(p.view().has_more);

        let t = p.begin_load().unwrap();
        assert_eq!(p.complete_load(t), LoadOutcome::Applied { added: 6 });
        assert_eq!(p.displayed().len(), 30);
        assert!(!p.view().has_more);
        assert!(!p.view().loading);

        assert!(p.begin_load().is_none());
    }

    #[test]
    fn test_begin_load_while_loading_is_noop() {
        let mut p = ProductListPipeline::new(many(30), PAGE_SIZE);
        let _t = p.begin_load().unwrap();
        let before = p.view().clone();
        assert!(p.begin_load().is_none());
        assert_eq!(p.view(), &before);
    }

    #[test]
    fn test_begin_load_without_more_is_noop() {
        let mut p = ProductListPipeline::new(many(5), PAGE_SIZE);
        let before = p.view().clone();
        assert!(p.begin_load().is_none());
        assert_eq!(p.view(), &before);
    }

    #[test]
    fn test_filter_change_resets_prefix() {
        let mut p = ProductListPipeline::new(many(40), PAGE_SIZE);
        let t = p.begin_load().unwrap();
        p.complete_load(t);
        assert_eq!(p.displayed().len(), 24);

        p.set_sort(SortKey::PriceHigh);
        assert_eq!(p.displayed().len(), 12);
        assert_eq!(p.displayed()[0].price, 39.0);

        p.set_search("Item 00");
        assert_eq!(p.filtered().len(), 10);
        assert_eq!(p.displayed().len(), 10);
        assert!(!p.view().has_more);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut p = ProductListPipeline::new(many(40), PAGE_SIZE);
        let t = p.begin_load().unwrap();
        p.set_search("Item 0");
        let before = p.view().clone();
        assert_eq!(p.complete_load(t), LoadOutcome::Stale);
        assert_eq!(p.view(), &before);
        assert!(!p.view().loading);
    }

    #[test]
    fn test_unchanged_input_does_not_reset() {
        let mut p = ProductListPipeline::new(many(40), PAGE_SIZE);
        let t = p.begin_load().unwrap();
        p.complete_load(t);
        let gen = p.generation();
        p.set_search("");
        p.set_category(None);
        p.set_sort(SortKey::Name);
        assert_eq!(p.generation(), gen);
        assert_eq!(p.displayed().len(), 24);
    }

    #[test]
    fn test_view_mode_does_not_reset_pagination() {
        let mut p = ProductListPipeline::new(many(40), PAGE_SIZE);
        let t = p.begin_load().unwrap();
        p.complete_load(t);
        p.set_view_mode(ViewMode::List);
        assert_eq!(p.displayed().len(), 24);
        assert_eq!(p.view().view_mode, ViewMode::List);
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut p = ProductListPipeline::new(many(20), PAGE_SIZE);
        p.set_sort(SortKey::Rating);
        p.set_search("nothing matches this");
        p.set_category(Some("misc"));
        assert!(p.filtered().is_empty());
        assert!(p.view().has_active_filters());
        p.clear_filters();
        assert_eq!(p.filtered().len(), 20);
        assert_eq!(p.view().sort_key, SortKey::Rating);
        assert!(!p.view().has_active_filters());
    }

    #[test]
    fn test_empty_catalog() {
        let mut p = ProductListPipeline::new(Vec::new(), PAGE_SIZE);
        assert!(p.displayed().is_empty());
        assert!(!p.view().has_more);
        assert!(p.begin_load().is_none());
    }

    #[test]
    fn test_sort_key_cycles_through_all() {
        let mut key = SortKey::Name;
        for expected in SortKey::ALL.iter().skip(1).chain(std::iter::once(&SortKey::Name)) {
            key = key.next();
            assert_eq!(key, *expected);
        }
    }
}
