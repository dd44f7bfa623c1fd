use scout_core::{
    select_active, update, ActiveSet, ApiError, AppState, Business, BusinessPage, Effect,
    JobSnapshot, Msg, PageQuery, Pagination, SearchKey, ValidationError,
};

fn business(id: &str) -> Business {
    Business {
        id: id.to_string(),
        name: format!("Business {id}"),
        address: "1 Main St".to_string(),
        ..Business::default()
    }
}

fn page(ids: &[&str], page: u32, pages: u32) -> BusinessPage {
    BusinessPage {
        items: ids.iter().map(|id| business(id)).collect(),
        pagination: Pagination {
            page,
            limit: 50,
            total: 120,
            pages,
        },
    }
}

fn ticket_of(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::LoadPage { ticket, .. } | Effect::LoadScoped { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("load effect")
}

/// A state scoped to `key` whose scoped and paginated sets are both loaded.
fn scoped_state(key: &SearchKey, paginated: &[&str], scoped: &[&str]) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::PageRequested(1));
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: ticket_of(&effects),
            result: Ok(page(paginated, 1, 3)),
        },
    );
    let (state, _) = update(state, Msg::SearchSubmitted(key.clone()));
    let (state, effects) = update(
        state,
        Msg::JobStartResolved {
            key: key.clone(),
            result: Ok(JobSnapshot::default()),
        },
    );
    let (state, _) = update(
        state,
        Msg::ScopedLoaded {
            ticket: ticket_of(&effects),
            key: key.clone(),
            result: Ok(scoped.iter().map(|id| business(id)).collect()),
        },
    );
    state
}

#[test]
fn active_set_follows_search_params_regardless_of_fetch_order() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let state = scoped_state(&coffee, &["p1", "p2"], &["s1"]);
    assert_eq!(state.view().results.active, ActiveSet::Scoped);
    assert_eq!(state.view().results.ids(), vec!["s1"]);

    // A paginated load landing later does not change which set is shown.
    let (state, effects) = update(state, Msg::PageRequested(2));
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: ticket_of(&effects),
            result: Ok(page(&["p3"], 2, 3)),
        },
    );
    assert_eq!(state.view().results.active, ActiveSet::Scoped);
    assert_eq!(state.view().results.ids(), vec!["s1"]);

    let (state, effects) = update(state, Msg::SearchCleared);
    assert!(matches!(effects.as_slice(), [Effect::LoadPage { .. }]));
    let view = state.view();
    assert_eq!(view.results.active, ActiveSet::Paginated);
    assert_eq!(view.results.title, "All Businesses");
    assert_eq!(view.results.ids(), vec!["p3"]);

    assert_eq!(select_active("coffee", "Austin"), ActiveSet::Scoped);
    assert_eq!(select_active("coffee", ""), ActiveSet::Paginated);
}

#[test]
fn pagination_reflects_server_metadata() {
    let (state, effects) = update(AppState::new(), Msg::PageRequested(2));
    assert_eq!(
        effects,
        vec![Effect::LoadPage {
            ticket: 1,
            query: PageQuery {
                page: 2,
                limit: 50,
                filter: None,
            },
        }]
    );
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: 1,
            result: Ok(page(&["a"], 2, 3)),
        },
    );
    let view = state.view();
    let pagination = view.results.pagination.expect("paginated view");
    assert_eq!((pagination.page, pagination.pages), (2, 3));
    assert!(view.results.show_pager);

    // Moving to page 3 and then asking for "next" goes nowhere.
    let (state, effects) = update(state, Msg::NextPageRequested);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: ticket_of(&effects),
            result: Ok(page(&["b"], 3, 3)),
        },
    );
    let (state, effects) = update(state, Msg::NextPageRequested);
    assert!(effects.is_empty());
    assert_eq!(state.view().results.pagination.unwrap().page, 3);

    // An explicit out-of-range page is passed through; the server's answer is stored as-is.
    let (state, effects) = update(state, Msg::PageRequested(4));
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: ticket_of(&effects),
            result: Ok(page(&[], 3, 3)),
        },
    );
    assert_eq!(state.view().results.pagination.unwrap().page, 3);
}

#[test]
fn listing_filter_follows_page_navigation_until_cleared() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let (state, effects) = update(
        AppState::new(),
        Msg::PageFilterChanged(Some(coffee.clone())),
    );
    assert_eq!(
        effects,
        vec![Effect::LoadPage {
            ticket: 1,
            query: PageQuery {
                page: 1,
                limit: 50,
                filter: Some(coffee.clone()),
            },
        }]
    );
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: 1,
            result: Ok(page(&["f1"], 1, 2)),
        },
    );
    let view = state.view();
    assert_eq!(view.results.active, ActiveSet::Paginated);
    assert_eq!(view.results.filter, Some(coffee.clone()));

    let (state, effects) = update(state, Msg::NextPageRequested);
    match effects.as_slice() {
        [Effect::LoadPage { query, .. }] => {
            assert_eq!(query.page, 2);
            assert_eq!(query.filter, Some(coffee));
        }
        other => panic!("expected one page load, got {other:?}"),
    }

    let (state, effects) = update(state, Msg::PageFilterChanged(None));
    match effects.as_slice() {
        [Effect::LoadPage { query, .. }] => {
            assert_eq!(query.page, 1);
            assert_eq!(query.filter, None);
        }
        other => panic!("expected one page load, got {other:?}"),
    }
    assert_eq!(state.page_filter(), None);
}

#[test]
fn page_zero_is_rejected_without_effects() {
    let (state, effects) = update(AppState::new(), Msg::PageRequested(0));
    assert!(effects.is_empty());
    assert_eq!(state.view().validation_error, Some(ValidationError::InvalidPage));
}

#[test]
fn previous_page_is_noop_on_first_page() {
    let (_state, effects) = update(AppState::new(), Msg::PreviousPageRequested);
    assert!(effects.is_empty());
}

#[test]
fn failed_scoped_load_keeps_previous_items() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let state = scoped_state(&coffee, &[], &["s1", "s2"]);

    let (state, effects) = update(state, Msg::ResultsRequested);
    let (state, _) = update(
        state,
        Msg::ScopedLoaded {
            ticket: ticket_of(&effects),
            key: coffee.clone(),
            result: Err(ApiError::HttpStatus { status: 500 }),
        },
    );

    let view = state.view();
    assert_eq!(view.results.ids(), vec!["s1", "s2"]);
    assert_eq!(view.results.error, Some(ApiError::HttpStatus { status: 500 }));
    assert!(!view.results.loading);
}

#[test]
fn delete_removes_from_both_sets_and_repeat_is_noop() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let state = scoped_state(&coffee, &["shared", "p2"], &["shared", "s2"]);

    let (state, effects) = update(state, Msg::DeleteRequested("shared".into()));
    assert_eq!(
        effects,
        vec![Effect::DeleteBusiness {
            id: "shared".into()
        }]
    );
    assert!(state.view().results.rows[0].deleting);

    // A second click while the first call is in flight does nothing.
    let (state, effects) = update(state, Msg::DeleteRequested("shared".into()));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::DeleteResolved {
            id: "shared".into(),
            result: Ok(()),
        },
    );
    assert_eq!(state.results().scoped().len(), 1);
    assert_eq!(state.results().paginated().len(), 1);
    assert!(!state.results().contains("shared"));

    let once = state.clone();
    let (state, effects) = update(state, Msg::DeleteRequested("shared".into()));
    assert!(effects.is_empty());
    assert_eq!(state, once);
    assert_eq!(state.view().results.delete_error, None);
}

#[test]
fn failed_delete_keeps_record() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let state = scoped_state(&coffee, &[], &["s1"]);

    let (state, _) = update(state, Msg::DeleteRequested("s1".into()));
    let (state, _) = update(
        state,
        Msg::DeleteResolved {
            id: "s1".into(),
            result: Err(ApiError::Network("offline".into())),
        },
    );

    let view = state.view();
    assert_eq!(view.results.ids(), vec!["s1"]);
    assert!(!view.results.rows[0].deleting);
    assert_eq!(
        view.results.delete_error,
        Some(("s1".to_string(), ApiError::Network("offline".into())))
    );
}

#[test]
fn scoped_response_for_previous_search_is_dropped() {
    let coffee = SearchKey::parse("coffee", "Austin").unwrap();
    let bakery = SearchKey::parse("bakery", "Austin").unwrap();
    let state = scoped_state(&coffee, &[], &["c1"]);

    let (state, effects) = update(state, Msg::ResultsRequested);
    let coffee_ticket = ticket_of(&effects);

    let (state, _) = update(state, Msg::SearchSubmitted(bakery.clone()));
    let (state, _) = update(
        state,
        Msg::JobStartResolved {
            key: bakery.clone(),
            result: Ok(JobSnapshot::default()),
        },
    );
    let (state, _) = update(
        state,
        Msg::ScopedLoaded {
            ticket: coffee_ticket,
            key: coffee,
            result: Ok(vec![business("c2")]),
        },
    );

    let view = state.view();
    assert_eq!(view.results.title, "Search Results for \"bakery\" in \"Austin\"");
    assert!(view.results.rows.is_empty());
}

#[test]
fn website_flag_is_derived_per_row() {
    let (state, _) = update(AppState::new(), Msg::PageRequested(1));
    let mut with_site = business("w");
    with_site.website = Some("https://w.example.com".into());
    let mut bare_site = business("b");
    bare_site.website = Some("www.example.com".into());
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            ticket: 1,
            result: Ok(BusinessPage {
                items: vec![with_site, bare_site],
                pagination: Pagination::default(),
            }),
        },
    );

    let flags: Vec<bool> = state.view().results.rows.iter().map(|r| r.has_website).collect();
    assert_eq!(flags, vec![true, false]);
}
