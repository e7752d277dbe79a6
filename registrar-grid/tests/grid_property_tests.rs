//! Property-Based Tests for the Grid Controller
//!
//! For any sequence of user commands and server responses:
//! - The query key is a pure function of page, page size and filters
//! - Any filter change lands on page 1
//! - The page stays inside the known page range, even across a change of
//!   result set
//! - Only the outcome of the latest issued request is ever committed
//! - Normalization never yields more rows than the page size

use proptest::prelude::*;
use registrar_grid::{
    normalize, Commit, GridCommand, GridController, GridStatus, QueryBuilder, RawResponse,
};
use registrar_test_utils::fixtures;
use registrar_test_utils::generators::{
    arb_command, arb_filter_map, arb_filter_value, arb_page_size, arb_payload,
};
use serde_json::Value;

fn course_grid() -> GridController<Value> {
    GridController::new(fixtures::course_spec()).expect("course spec is valid")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn query_is_independent_of_filter_order(
        filters in arb_filter_map(vec!["name", "email", "filter_name", "location"]),
        page in 1u32..50,
        size in arb_page_size(),
    ) {
        let builder = QueryBuilder::default();
        let forward = builder.build(page, size, filters.clone());
        let reversed = builder.build(page, size, filters.iter().rev().cloned());
        prop_assert_eq!(&forward, &reversed);

        let prefix = format!("page={}&limit={}", page, size);
        prop_assert!(forward.starts_with(&prefix));
        for (field, value) in &filters {
            if value.is_empty() {
                let needle = format!("&{}=", field);
                prop_assert!(!forward.contains(&needle));
            }
        }
    }

    #[test]
    fn same_state_same_key(commands in prop::collection::vec(arb_command(), 0..20)) {
        let mut a = course_grid();
        let mut b = course_grid();
        for command in commands {
            let _ = a.apply(command.clone());
            let _ = b.apply(command);
        }
        prop_assert_eq!(a.current_key(), b.current_key());
    }

    #[test]
    fn filter_change_resets_page(
        page in 2u32..20,
        value in "[a-z]{1,8}",
    ) {
        let mut grid = course_grid();
        let ticket = grid.reconcile().unwrap();
        grid.complete(fixtures::ok(&ticket, fixtures::paginated(fixtures::courses(10), 20)));
        grid.set_page(page);
        prop_assert_eq!(grid.pagination().page(), page);

        prop_assert!(grid.set_filter("name", value).unwrap());
        prop_assert_eq!(grid.pagination().page(), 1);
    }

    #[test]
    fn page_stays_within_known_range(
        total_pages in 0u32..12,
        commands in prop::collection::vec(arb_command(), 0..30),
    ) {
        let mut grid = course_grid();
        let ticket = grid.reconcile().unwrap();
        grid.complete(fixtures::ok(&ticket, fixtures::paginated(Vec::new(), total_pages)));

        for command in commands {
            let _ = grid.apply(command);
            let page = grid.pagination().page();
            prop_assert!(page >= 1);
            prop_assert!(page <= total_pages.max(1));
            prop_assert!(grid.pagination().allowed_sizes().contains(&grid.pagination().page_size()));
        }
    }

    #[test]
    fn committed_page_never_exceeds_new_total(
        first_total in 2u32..10,
        new_total in 0u32..3,
        value in "[a-z]{1,8}",
        presses in 1usize..4,
    ) {
        let mut grid = course_grid();
        let ticket = grid.reconcile().unwrap();
        grid.complete(fixtures::ok(&ticket, fixtures::paginated(fixtures::courses(3), first_total)));

        prop_assert!(grid.set_filter("name", value).unwrap());
        let mut latest = grid.reconcile().unwrap();
        for _ in 0..presses {
            prop_assert!(!grid.pagination().can_next());
            prop_assert!(!grid.next_page());
            if let Some(ticket) = grid.reconcile() {
                latest = ticket;
            }
        }
        prop_assert!(latest.key.query().starts_with("page=1&"));

        grid.complete(fixtures::ok(&latest, fixtures::paginated(Vec::new(), new_total)));
        prop_assert_eq!(grid.status(), &GridStatus::Ready);
        prop_assert!(grid.pagination().page() <= new_total.max(1));
    }

    #[test]
    fn page_past_reported_total_is_pulled_back(
        requested in 2u32..9,
        reported in 0u32..2,
    ) {
        let mut grid = course_grid();
        grid.set_page(requested);
        let ticket = grid.reconcile().unwrap();
        grid.complete(fixtures::ok(&ticket, fixtures::paginated(Vec::new(), reported)));

        prop_assert_eq!(grid.pagination().page(), 1);
        let frame = grid.snapshot().frame();
        prop_assert_eq!(frame.pager.label(), "Page 1 of 1");
        let refetch = grid.reconcile().unwrap();
        prop_assert!(refetch.key.query().starts_with("page=1&"));
    }

    #[test]
    fn only_latest_outcome_commits(
        commands in prop::collection::vec(arb_command(), 1..12),
        order in prop::collection::vec(any::<prop::sample::Index>(), 12),
    ) {
        let mut grid = course_grid();
        let mut tickets = vec![grid.reconcile().unwrap()];
        for command in commands {
            let _ = grid.apply(command);
            grid.refresh();
            if let Some(ticket) = grid.reconcile() {
                tickets.push(ticket);
            }
        }
        let latest = tickets.last().cloned().unwrap();

        // Deliver every superseded outcome in a shuffled order.
        let mut stale: Vec<_> = tickets[..tickets.len() - 1].to_vec();
        for index in &order {
            if stale.is_empty() {
                break;
            }
            let ticket = stale.remove(index.index(stale.len()));
            let body = fixtures::paginated(fixtures::courses(1), 1);
            prop_assert_eq!(grid.complete(fixtures::ok(&ticket, body)), Commit::Discarded);
            prop_assert!(grid.status().is_loading());
        }

        let body = fixtures::paginated(fixtures::courses(2), 1);
        prop_assert_eq!(grid.complete(fixtures::ok(&latest, body.clone())), Commit::Applied);
        prop_assert_eq!(grid.status(), &GridStatus::Ready);
        // A duplicate delivery of the same outcome is ignored.
        prop_assert_eq!(grid.complete(fixtures::ok(&latest, body)), Commit::Discarded);
    }

    #[test]
    fn normalize_bounds_rows_and_is_pure(
        (size, (payload, rows, total_pages)) in arb_page_size()
            .prop_flat_map(|size| (Just(size), arb_payload(size))),
    ) {
        let raw = RawResponse::new(payload);
        let first = normalize::<Value>(&raw, size).unwrap();
        let second = normalize::<Value>(&raw, size).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= size as usize);
        prop_assert_eq!(first.len(), rows);
        prop_assert_eq!(first.total_pages, total_pages);
    }

    #[test]
    fn unchanged_filter_never_refetches(value in arb_filter_value()) {
        let mut grid = course_grid();
        grid.set_filter("name", value.clone()).unwrap();
        prop_assert!(grid.reconcile().is_some());
        prop_assert!(!grid.set_filter("name", value).unwrap());
        prop_assert!(grid.reconcile().is_none());
    }

    #[test]
    fn page_size_change_moves_to_first_page(size in arb_page_size(), page in 2u32..9) {
        let mut grid = course_grid();
        let ticket = grid.reconcile().unwrap();
        grid.complete(fixtures::ok(&ticket, fixtures::paginated(fixtures::courses(3), 10)));
        grid.set_page(page);
        grid.apply(GridCommand::SetPageSize(size)).unwrap();
        prop_assert_eq!(grid.pagination().page(), 1);
        prop_assert_eq!(grid.pagination().page_size(), size);
    }
}
