// Invariants of the product list pipeline over every filter combination

#[cfg(test)]
mod tests {
    use catalog_browser::catalog::{Catalog, Product};
    use catalog_browser::pipeline::{
        filter_and_sort, FilterInputs, LoadOutcome, ProductListPipeline, SortKey, PAGE_SIZE,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog::builtin(4, &mut StdRng::seed_from_u64(2024))
    }

    fn all_inputs(catalog: &Catalog) -> Vec<FilterInputs> {
        let queries = ["", "lamp", "SMART", "es", "books", "zzz", "  mat "];
        let mut categories: Vec<Option<String>> = vec![None];
        categories.extend(catalog.categories.iter().map(|c| Some(c.id.clone())));

        let mut out = Vec::new();
        for q in queries {
            for cat in &categories {
                for key in SortKey::ALL {
                    out.push(FilterInputs {
                        search_query: q.to_string(),
                        category_id: cat.clone(),
                        sort_key: key,
                    });
                }
            }
        }
        out
    }

    fn matches(p: &Product, inputs: &FilterInputs) -> bool {
        let q = inputs.search_query.trim().to_lowercase();
        let text_ok = q.is_empty()
            || p.name.to_lowercase().contains(&q)
            || p.description.to_lowercase().contains(&q)
            || p.category.to_lowercase().contains(&q);
        let cat_ok = inputs.category_id.as_ref().is_none_or(|c| &p.category == c);
        text_ok && cat_ok
    }

    #[test]
    fn test_filtered_is_exactly_the_matching_subset() {
        let catalog = catalog();
        for inputs in all_inputs(&catalog) {
            let result = filter_and_sort(&catalog.products, &inputs);
            let expected = catalog.products.iter().filter(|p| matches(p, &inputs)).count();
            assert_eq!(result.len(), expected, "{:?}", inputs);
            for p in &result {
                assert!(catalog.products.contains(p));
                assert!(matches(p, &inputs), "{} should not match {:?}", p.id, inputs);
            }
        }
    }

    #[test]
    fn test_adjacent_pairs_respect_sort_key() {
        let catalog = catalog();
        for inputs in all_inputs(&catalog) {
            let result = filter_and_sort(&catalog.products, &inputs);
            for w in result.windows(2) {
                let ok = match inputs.sort_key {
                    SortKey::Name => w[0].name.to_lowercase() <= w[1].name.to_lowercase(),
                    SortKey::PriceLow => w[0].price <= w[1].price,
                    SortKey::PriceHigh => w[0].price >= w[1].price,
                    SortKey::Rating => w[0].rating >= w[1].rating,
                };
                assert!(ok, "{:?}: {} before {}", inputs.sort_key, w[0].id, w[1].id);
            }
        }
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = catalog();
        let inputs = FilterInputs::default();
        let result = filter_and_sort(&catalog.products, &inputs);
        let position = |id: &str| catalog.products.iter().position(|p| p.id == id).unwrap();
        for w in result.windows(2) {
            if w[0].name == w[1].name {
                assert!(position(&w[0].id) < position(&w[1].id));
            }
        }
    }

    #[test]
    fn test_pagination_invariants_hold_through_loads_and_changes() {
        let catalog = catalog();
        let mut p = ProductListPipeline::new(catalog.products.clone(), PAGE_SIZE);
        for inputs in all_inputs(&catalog) {
            p.set_filters(inputs.clone());
            let filtered = p.filtered().len();
            assert_eq!(p.displayed().len(), PAGE_SIZE.min(filtered));

            loop {
                let view = p.view();
                assert!(view.displayed_count <= filtered);
                assert_eq!(view.has_more, view.displayed_count < filtered);
                let Some(ticket) = p.begin_load() else { break };
                match p.complete_load(ticket) {
                    LoadOutcome::Applied { added } => assert!(added > 0 && added <= PAGE_SIZE),
                    other => panic!("unexpected {:?}", other),
                }
            }
            assert_eq!(p.displayed().len(), filtered);
        }
    }

    #[test]
    fn test_three_product_catalog_scenario() {
        let base = catalog();
        let three: Vec<Product> = base.products.iter().take(3).cloned().collect();
        let p = ProductListPipeline::new(three, PAGE_SIZE);
        let names: Vec<&str> = p.displayed().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bluetooth Speaker", "Smart Watch", "Wireless Headphones"]);
        assert_eq!(p.displayed().len(), 3);
        assert!(!p.view().has_more);
    }
}
