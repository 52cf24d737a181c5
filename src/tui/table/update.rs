//! State transitions for the table.
//!
//! [`update`] is a pure reducer: it takes the current [`TableModel`] and a
//! [`TableAction`] and returns the next model together with the side effects
//! the host must run (fetches, callbacks, exports). [`handle_key`] maps
//! terminal keys onto actions.

use super::states::{PageStep, TableModel, TableUi, last_page_index};
use crate::backend::dispatcher::{FetchOutcome, RequestTicket};
use crate::backend::model::{FetchRequest, FetchStatus, RowId, SortDirection};
use crate::config::ROWS_PER_PAGE_OPTIONS;
use crate::error::{Result, TableError};
use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, warn};
use std::path::PathBuf;

#[derive(Debug)]
pub enum TableAction {
    /// Issues the first fetch.
    Init,
    SetSort(String),
    SetPage(PageStep),
    SetRowsPerPage(usize),
    SelectRow(RowId),
    SetRowChecked(RowId, bool),
    /// Marks the header checkbox only; individual rows are left alone.
    SelectAll,
    Edit(RowId),
    Export,
    ExportCompleted(Result<PathBuf>),
    FetchCompleted(FetchOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(RequestTicket, FetchRequest),
    RowSelected(RowId),
    ErrorReceived(TableError),
    EditRequested(RowId),
    Export,
    Exported(PathBuf),
}

#[derive(Debug)]
pub struct Transition {
    pub model: TableModel,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn none(model: TableModel) -> Self {
        Self {
            model,
            effects: Vec::new(),
        }
    }
}

/// Records a new ticket for the current view and marks the data as requested.
fn refetch(model: &mut TableModel) -> Effect {
    model.next_seq += 1;
    let request = model.view.request();
    let ticket = RequestTicket::new(model.next_seq, &request);
    model.latest_request = Some(ticket.clone());
    model.data.status = FetchStatus::Requested;
    Effect::Fetch(ticket, request)
}

fn next_page_index(model: &TableModel, step: PageStep) -> usize {
    let current = model.view.page_index;
    match step {
        PageStep::Start => 0,
        PageStep::Previous => current.saturating_sub(1),
        PageStep::Next => current + 1,
        PageStep::Last => model.last_page(),
    }
}

fn select_row(model: &mut TableModel, id: RowId) -> Effect {
    model.view.selected_row_id = Some(id.clone());
    Effect::RowSelected(id)
}

pub fn update(mut model: TableModel, action: TableAction) -> Transition {
    let mut effects = Vec::new();

    match action {
        TableAction::Init => {
            effects.push(refetch(&mut model));
        }
        TableAction::SetSort(column) => {
            if !model.has_column(&column) {
                warn!("⚠️ Ignoring sort by unknown column '{column}'");
                return Transition::none(model);
            }
            model.view.order_direction = if column == model.view.order_by {
                model.view.order_direction.toggled()
            } else {
                SortDirection::Asc
            };
            model.view.order_by = column;
            effects.push(refetch(&mut model));
        }
        TableAction::SetPage(step) => {
            model.view.page_index = next_page_index(&model, step);
            effects.push(refetch(&mut model));
        }
        TableAction::SetRowsPerPage(rows) => {
            if !ROWS_PER_PAGE_OPTIONS.contains(&rows) {
                effects.push(Effect::ErrorReceived(TableError::InvalidRowsPerPage(rows)));
                return Transition { model, effects };
            }
            model.view.rows_per_page = rows;
            if model.data.total_count > 0 {
                let last = last_page_index(model.data.total_count, rows);
                model.view.page_index = model.view.page_index.min(last);
            }
            effects.push(refetch(&mut model));
        }
        TableAction::SelectRow(id) => {
            effects.push(select_row(&mut model, id));
        }
        TableAction::SetRowChecked(id, checked) => {
            if checked {
                model.view.checked.insert(id.clone());
                model.view.all_selected = model.all_loaded_checked();
            } else {
                model.view.checked.remove(&id);
                model.view.all_selected = false;
            }
            effects.push(select_row(&mut model, id));
        }
        TableAction::SelectAll => {
            model.view.all_selected = true;
        }
        TableAction::Edit(id) => {
            effects.push(Effect::EditRequested(id));
        }
        TableAction::Export => {
            if model.view.exporting {
                warn!("⚠️ Export already running, ignoring request");
                return Transition::none(model);
            }
            model.view.exporting = true;
            effects.push(Effect::Export);
        }
        TableAction::ExportCompleted(result) => {
            model.view.exporting = false;
            effects.push(match result {
                Ok(path) => Effect::Exported(path),
                Err(e) => Effect::ErrorReceived(e),
            });
        }
        TableAction::FetchCompleted(outcome) => {
            let current = model
                .latest_request
                .as_ref()
                .is_some_and(|latest| *latest == outcome.ticket);
            if !current {
                debug!(
                    "Dropping stale fetch #{} ({})",
                    outcome.ticket.seq, outcome.ticket.fingerprint
                );
                return Transition::none(model);
            }
            match outcome.result {
                Ok(response) => {
                    model.data.rows = response.rows;
                    model.data.total_count = response.total_count;
                    model.data.status = FetchStatus::Succeeded;
                    model.data.error = None;

                    // The total can shrink under a late page.
                    let last = model.last_page();
                    if model.view.page_index > last {
                        debug!(
                            "Page {} is past the last page {last}, moving back",
                            model.view.page_index
                        );
                        model.view.page_index = last;
                        effects.push(refetch(&mut model));
                    }
                }
                Err(e) => {
                    warn!("(table) => Error received: {e}");
                    model.data.status = FetchStatus::Failed;
                    model.data.error = Some(e.clone());
                    effects.push(Effect::ErrorReceived(e));
                }
            }
        }
    }

    Transition { model, effects }
}

/// Neighbouring allow-list entry, or `None` at either end.
pub fn step_rows_per_page(current: usize, up: bool) -> Option<usize> {
    let index = ROWS_PER_PAGE_OPTIONS.iter().position(|&n| n == current);
    match (index, up) {
        (Some(i), true) => ROWS_PER_PAGE_OPTIONS.get(i + 1).copied(),
        (Some(i), false) => i.checked_sub(1).map(|i| ROWS_PER_PAGE_OPTIONS[i]),
        (None, true) => ROWS_PER_PAGE_OPTIONS.iter().copied().find(|&n| n > current),
        (None, false) => ROWS_PER_PAGE_OPTIONS.iter().rev().copied().find(|&n| n < current),
    }
}

#[derive(Debug)]
pub enum KeyOutcome {
    Action(TableAction),
    Quit,
    /// Only the cursor moved.
    Handled,
    Ignored,
}

pub fn handle_key(model: &TableModel, ui: &mut TableUi, key: KeyEvent) -> KeyOutcome {
    let rows = model.data.rows.len();
    let cursor_id = ui.cursor().and_then(|i| model.row_id(i));

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            if rows == 0 {
                return KeyOutcome::Ignored;
            }
            let next = match ui.cursor() {
                Some(i) if i + 1 < rows => i + 1,
                _ => 0,
            };
            ui.table_state.select(Some(next));
            return KeyOutcome::Handled;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if rows == 0 {
                return KeyOutcome::Ignored;
            }
            let next = match ui.cursor() {
                Some(0) | None => rows - 1,
                Some(i) => i - 1,
            };
            ui.table_state.select(Some(next));
            return KeyOutcome::Handled;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            ui.focused_column = ui.focused_column.saturating_sub(1);
            return KeyOutcome::Handled;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let last = model.columns.len().saturating_sub(1);
            ui.focused_column = (ui.focused_column + 1).min(last);
            return KeyOutcome::Handled;
        }
        KeyCode::Char('s') => model
            .columns
            .get(ui.focused_column)
            .map(|c| TableAction::SetSort(c.name.clone())),
        KeyCode::Enter => cursor_id.map(TableAction::SelectRow),
        KeyCode::Char(' ') => cursor_id.map(|id| {
            let checked = !model.view.is_checked(&id);
            TableAction::SetRowChecked(id, checked)
        }),
        KeyCode::Char('a') => Some(TableAction::SelectAll),
        KeyCode::Char('e') if model.has_column(&model.id_column) => {
            cursor_id.map(TableAction::Edit)
        }
        KeyCode::Home | KeyCode::Char('g') if model.can_go_back() => {
            Some(TableAction::SetPage(PageStep::Start))
        }
        KeyCode::PageUp | KeyCode::Char('p') if model.can_go_back() => {
            Some(TableAction::SetPage(PageStep::Previous))
        }
        KeyCode::PageDown | KeyCode::Char('n') if model.can_go_forward() => {
            Some(TableAction::SetPage(PageStep::Next))
        }
        KeyCode::End | KeyCode::Char('G') if model.can_go_forward() => {
            Some(TableAction::SetPage(PageStep::Last))
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            step_rows_per_page(model.view.rows_per_page, true).map(TableAction::SetRowsPerPage)
        }
        KeyCode::Char('-') => {
            step_rows_per_page(model.view.rows_per_page, false).map(TableAction::SetRowsPerPage)
        }
        KeyCode::Char('P') => Some(TableAction::Export),
        _ => None,
    };

    match action {
        Some(action) => KeyOutcome::Action(action),
        None => KeyOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dispatcher::FetchDispatcher;
    use crate::backend::dispatcher::tests::DelayedSource;
    use crate::backend::model::{Column, ColumnType, FetchResponse, Row};
    use crate::config::TableConfig;
    use crate::tui::table::states::PageRange;
    use crossterm::event::KeyModifiers;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn config() -> TableConfig {
        TableConfig {
            columns: vec![
                Column::new("Id", ColumnType::Number),
                Column::new("Name", ColumnType::String),
            ],
            ..Default::default()
        }
    }

    fn rows(ids: &[u64]) -> Vec<Row> {
        ids.iter()
            .map(|id| serde_json::from_value(json!({"Id": id, "Name": format!("n{id}")})).unwrap())
            .collect()
    }

    fn fetch_ticket(effects: &[Effect]) -> RequestTicket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Fetch(ticket, _) => Some(ticket.clone()),
                _ => None,
            })
            .expect("no fetch effect")
    }

    /// Model with `total` records and `ids` loaded on the current page.
    fn loaded(total: usize, ids: &[u64]) -> TableModel {
        let t = update(TableModel::new(&config()), TableAction::Init);
        let ticket = fetch_ticket(&t.effects);
        let outcome = FetchOutcome {
            ticket,
            result: Ok(FetchResponse {
                rows: rows(ids),
                total_count: total,
            }),
        };
        update(t.model, TableAction::FetchCompleted(outcome)).model
    }

    /// Answers the fetch in `t` with one row and `total` records.
    fn complete(t: Transition, total: usize) -> Transition {
        let ticket = fetch_ticket(&t.effects);
        let outcome = FetchOutcome {
            ticket,
            result: Ok(FetchResponse {
                rows: rows(&[1]),
                total_count: total,
            }),
        };
        update(t.model, TableAction::FetchCompleted(outcome))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_init_fetches_first_page() {
        let t = update(TableModel::new(&config()), TableAction::Init);
        assert_eq!(t.model.data.status, FetchStatus::Requested);
        match &t.effects[..] {
            [Effect::Fetch(ticket, request)] => {
                assert_eq!(ticket.seq, 1);
                assert_eq!(request.page_index, 0);
                assert_eq!(request.order, vec![("Id".to_string(), SortDirection::Asc)]);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_sort_toggles_same_column_and_resets_on_new_one() {
        let model = loaded(23, &[1, 2]);
        let t = update(model, TableAction::SetSort("Id".into()));
        assert_eq!(t.model.view.order_direction, SortDirection::Desc);
        let t = update(t.model, TableAction::SetSort("Id".into()));
        assert_eq!(t.model.view.order_direction, SortDirection::Asc);

        let t = update(t.model, TableAction::SetSort("Id".into()));
        let t = update(t.model, TableAction::SetSort("Name".into()));
        assert_eq!(t.model.view.order_by, "Name");
        assert_eq!(t.model.view.order_direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_refetches_at_current_page() {
        let mut model = loaded(23, &[1]);
        model.view.page_index = 1;
        let t = update(model, TableAction::SetSort("Name".into()));
        match &t.effects[..] {
            [Effect::Fetch(_, request)] => {
                assert_eq!(request.page_index, 1);
                assert_eq!(request.order, vec![("Name".to_string(), SortDirection::Asc)]);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_sort_by_unknown_column_is_ignored() {
        let model = loaded(23, &[1]);
        let t = update(model.clone(), TableAction::SetSort("Nope".into()));
        assert!(t.effects.is_empty());
        assert_eq!(t.model, model);
    }

    #[test]
    fn test_last_page_scenarios() {
        let t = update(loaded(23, &[1]), TableAction::SetPage(PageStep::Last));
        assert_eq!(t.model.view.page_index, 2);
        assert_eq!(t.model.range().to_string(), "21-23 of 23");

        let t = update(loaded(20, &[1]), TableAction::SetPage(PageStep::Last));
        assert_eq!(t.model.view.page_index, 1);
        assert_eq!(t.model.range().to_string(), "11-20 of 20");
    }

    #[test]
    fn test_shrinking_total_moves_back_to_last_page() {
        let t = update(loaded(23, &[1]), TableAction::SetPage(PageStep::Last));
        let t = complete(t, 23);
        assert_eq!(t.model.view.page_index, 2);

        let t = update(t.model, TableAction::SetSort("Id".into()));
        let t = complete(t, 15);
        assert_eq!(t.model.view.page_index, 1);
        assert_eq!(t.model.range().to_string(), "11-15 of 15");
        match &t.effects[..] {
            [Effect::Fetch(_, request)] => assert_eq!(request.page_index, 1),
            other => panic!("unexpected effects: {other:?}"),
        }

        let t = complete(t, 15);
        assert!(t.effects.is_empty());
        assert_eq!(t.model.view.page_index, 1);
        assert_eq!(t.model.data.status, FetchStatus::Succeeded);
    }

    #[test]
    fn test_emptied_source_returns_to_first_page() {
        let t = update(loaded(23, &[1]), TableAction::SetPage(PageStep::Last));
        let t = complete(t, 23);
        let t = update(t.model, TableAction::SetSort("Id".into()));
        let t = complete(t, 0);
        assert_eq!(t.model.view.page_index, 0);
        assert_eq!(t.model.range().to_string(), "1-0 of 0");
        assert_eq!(t.effects.len(), 1);
    }

    #[test]
    fn test_previous_and_next_do_not_clamp_upward() {
        let t = update(loaded(5, &[1]), TableAction::SetPage(PageStep::Next));
        assert_eq!(t.model.view.page_index, 1);
        let t = update(t.model, TableAction::SetPage(PageStep::Previous));
        let t = update(t.model, TableAction::SetPage(PageStep::Previous));
        assert_eq!(t.model.view.page_index, 0);
        let t = update(t.model, TableAction::SetPage(PageStep::Start));
        assert_eq!(t.model.view.page_index, 0);
        assert_eq!(t.effects.len(), 1);
    }

    #[test]
    fn test_rows_per_page_allow_list() {
        let t = update(loaded(23, &[1]), TableAction::SetRowsPerPage(7));
        assert_eq!(t.model.view.rows_per_page, 10);
        assert_eq!(
            t.effects,
            vec![Effect::ErrorReceived(TableError::InvalidRowsPerPage(7))]
        );

        let mut model = loaded(23, &[1]);
        model.view.page_index = 2;
        let t = update(model, TableAction::SetRowsPerPage(25));
        assert_eq!(t.model.view.rows_per_page, 25);
        assert_eq!(t.model.view.page_index, 0);
        assert!(matches!(&t.effects[..], [Effect::Fetch(_, r)] if r.rows_to_return == 25));
    }

    #[test]
    fn test_step_rows_per_page() {
        assert_eq!(step_rows_per_page(10, true), Some(15));
        assert_eq!(step_rows_per_page(10, false), Some(5));
        assert_eq!(step_rows_per_page(5, false), None);
        assert_eq!(step_rows_per_page(5000, true), None);
        assert_eq!(step_rows_per_page(12, true), Some(15));
    }

    #[test]
    fn test_checking_every_row_selects_all() {
        let mut model = loaded(23, &[1, 2, 3]);
        for id in ["1", "2"] {
            model = update(model, TableAction::SetRowChecked(RowId(id.into()), true)).model;
            assert!(!model.view.all_selected);
        }
        let t = update(model, TableAction::SetRowChecked(RowId("3".into()), true));
        assert!(t.model.view.all_selected);
        assert_eq!(t.effects, vec![Effect::RowSelected(RowId("3".into()))]);

        let t = update(t.model, TableAction::SetRowChecked(RowId("2".into()), false));
        assert!(!t.model.view.all_selected);
        assert_eq!(t.model.view.selected_row_id, Some(RowId("2".into())));
    }

    #[test]
    fn test_checking_never_touches_fetched_rows() {
        let model = loaded(3, &[1, 2, 3]);
        let before = model.data.rows.clone();
        let t = update(model, TableAction::SetRowChecked(RowId("1".into()), true));
        assert_eq!(t.model.data.rows, before);
    }

    #[test]
    fn test_select_all_sets_flag_only() {
        let t = update(loaded(3, &[1, 2, 3]), TableAction::SelectAll);
        assert!(t.model.view.all_selected);
        assert!(t.model.view.checked.is_empty());
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_select_row_notifies() {
        let t = update(loaded(3, &[1]), TableAction::SelectRow(RowId("1".into())));
        assert_eq!(t.model.view.selected_row_id, Some(RowId("1".into())));
        assert_eq!(t.effects, vec![Effect::RowSelected(RowId("1".into()))]);
        assert!(t.model.view.checked.is_empty());
    }

    #[test]
    fn test_stale_response_is_dropped_even_when_it_arrives_last() {
        let model = loaded(30, &[1]);
        let first = update(model, TableAction::SetPage(PageStep::Next));
        let first_ticket = fetch_ticket(&first.effects);
        let second = update(first.model, TableAction::SetPage(PageStep::Next));
        let second_ticket = fetch_ticket(&second.effects);
        assert!(second_ticket.seq > first_ticket.seq);

        // page 2 answers first, then the late page 1 response
        let model = update(
            second.model,
            TableAction::FetchCompleted(FetchOutcome {
                ticket: second_ticket,
                result: Ok(FetchResponse {
                    rows: rows(&[21]),
                    total_count: 30,
                }),
            }),
        )
        .model;
        let t = update(
            model,
            TableAction::FetchCompleted(FetchOutcome {
                ticket: first_ticket,
                result: Ok(FetchResponse {
                    rows: rows(&[11]),
                    total_count: 30,
                }),
            }),
        );
        assert!(t.effects.is_empty());
        assert_eq!(t.model.view.page_index, 2);
        assert_eq!(t.model.data.rows, rows(&[21]));
        assert_eq!(t.model.data.status, FetchStatus::Succeeded);
    }

    #[test]
    fn test_stale_response_is_dropped_when_it_arrives_first() {
        let model = loaded(30, &[1]);
        let first = update(model, TableAction::SetPage(PageStep::Next));
        let first_ticket = fetch_ticket(&first.effects);
        let second = update(first.model, TableAction::SetPage(PageStep::Next));

        let t = update(
            second.model,
            TableAction::FetchCompleted(FetchOutcome {
                ticket: first_ticket,
                result: Ok(FetchResponse {
                    rows: rows(&[11]),
                    total_count: 30,
                }),
            }),
        );
        assert_eq!(t.model.data.status, FetchStatus::Requested);
        assert_eq!(t.model.data.rows, rows(&[1]));
    }

    #[test]
    fn test_fetch_error_is_stored_and_forwarded() {
        let t = update(TableModel::new(&config()), TableAction::Init);
        let ticket = fetch_ticket(&t.effects);
        let err = TableError::FetchFailed("502: bad gateway".into());
        let t = update(
            t.model,
            TableAction::FetchCompleted(FetchOutcome {
                ticket,
                result: Err(err.clone()),
            }),
        );
        assert_eq!(t.model.data.status, FetchStatus::Failed);
        assert_eq!(t.model.data.error, Some(err.clone()));
        assert_eq!(t.effects, vec![Effect::ErrorReceived(err)]);
    }

    #[test]
    fn test_exports_are_serialized() {
        let t = update(loaded(3, &[1]), TableAction::Export);
        assert!(t.model.view.exporting);
        assert!(t.model.is_busy());
        assert_eq!(t.effects, vec![Effect::Export]);

        let t = update(t.model, TableAction::Export);
        assert!(t.effects.is_empty());

        let t = update(
            t.model,
            TableAction::ExportCompleted(Err(TableError::RenderTargetMissing)),
        );
        assert!(!t.model.view.exporting);
        assert_eq!(
            t.effects,
            vec![Effect::ErrorReceived(TableError::RenderTargetMissing)]
        );
    }

    #[test]
    fn test_edit_is_forwarded() {
        let t = update(loaded(3, &[1]), TableAction::Edit(RowId("1".into())));
        assert_eq!(t.effects, vec![Effect::EditRequested(RowId("1".into()))]);
    }

    #[tokio::test]
    async fn test_out_of_order_dispatch_shows_current_page() {
        let source = Arc::new(DelayedSource {
            delays: vec![0, 150, 0],
            total: 30,
        });
        let (dispatcher, mut rx) = FetchDispatcher::new(source, "mem:///items");

        let mut model = loaded(30, &[0]);
        // page 1 is slow, page 2 is fast
        for _ in 0..2 {
            let t = update(model, TableAction::SetPage(PageStep::Next));
            for effect in t.effects {
                if let Effect::Fetch(ticket, request) = effect {
                    dispatcher.dispatch(ticket, request);
                }
            }
            model = t.model;
        }

        for _ in 0..2 {
            let outcome = rx.recv().await.unwrap();
            model = update(model, TableAction::FetchCompleted(outcome)).model;
        }

        assert_eq!(model.view.page_index, 2);
        assert_eq!(model.data.rows[0]["Id"], 2);
    }

    #[test]
    fn test_keys_respect_disabled_controls() {
        let model = loaded(23, &[1, 2]);
        let mut ui = TableUi::new();

        assert!(matches!(
            handle_key(&model, &mut ui, key(KeyCode::PageUp)),
            KeyOutcome::Ignored
        ));
        assert!(matches!(
            handle_key(&model, &mut ui, key(KeyCode::PageDown)),
            KeyOutcome::Action(TableAction::SetPage(PageStep::Next))
        ));

        let t = update(model, TableAction::SetPage(PageStep::Last));
        assert!(matches!(
            handle_key(&t.model, &mut ui, key(KeyCode::End)),
            KeyOutcome::Ignored
        ));
        assert!(matches!(
            handle_key(&t.model, &mut ui, key(KeyCode::Home)),
            KeyOutcome::Action(TableAction::SetPage(PageStep::Start))
        ));
    }

    #[test]
    fn test_keys_for_rows_and_columns() {
        let model = loaded(23, &[1, 2]);
        let mut ui = TableUi::new();

        assert!(matches!(
            handle_key(&model, &mut ui, key(KeyCode::Down)),
            KeyOutcome::Handled
        ));
        assert_eq!(ui.cursor(), Some(1));
        match handle_key(&model, &mut ui, key(KeyCode::Char(' '))) {
            KeyOutcome::Action(TableAction::SetRowChecked(id, true)) => assert_eq!(id.0, "2"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // wraps back to the first row
        handle_key(&model, &mut ui, key(KeyCode::Down));
        assert_eq!(ui.cursor(), Some(0));

        handle_key(&model, &mut ui, key(KeyCode::Right));
        handle_key(&model, &mut ui, key(KeyCode::Right));
        assert_eq!(ui.focused_column, 1);
        match handle_key(&model, &mut ui, key(KeyCode::Char('s'))) {
            KeyOutcome::Action(TableAction::SetSort(column)) => assert_eq!(column, "Name"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            handle_key(&model, &mut ui, key(KeyCode::Char('q'))),
            KeyOutcome::Quit
        ));
    }

    proptest! {
        #[test]
        fn prop_range_stays_within_total(
            rows_per_page in prop::sample::select(ROWS_PER_PAGE_OPTIONS.to_vec()),
            total in 0usize..100_000,
            page_seed in 0usize..10_000,
        ) {
            let last = last_page_index(total, rows_per_page);
            let page = page_seed % (last + 1);
            let range = PageRange::new(page, rows_per_page, total);
            prop_assert!(range.upper <= total);
            prop_assert!(range.lower <= range.upper + 1);
        }

        #[test]
        fn prop_range_holds_after_total_shrinks(
            rows_per_page in prop::sample::select(ROWS_PER_PAGE_OPTIONS.to_vec()),
            before in 1usize..10_000,
            shrink in 0usize..10_000,
        ) {
            let after = before.saturating_sub(shrink);
            let config = TableConfig { rows_per_page, ..config() };
            let t = complete(update(TableModel::new(&config), TableAction::Init), before);
            let t = complete(update(t.model, TableAction::SetPage(PageStep::Last)), before);
            let mut t = complete(update(t.model, TableAction::SetSort("Id".into())), after);
            if !t.effects.is_empty() {
                t = complete(t, after);
            }

            let range = t.model.range();
            prop_assert!(t.effects.is_empty());
            prop_assert!(range.upper <= after);
            prop_assert!(range.lower <= range.upper + 1);
            prop_assert_eq!(t.model.view.page_index, last_page_index(after, rows_per_page));
        }

        #[test]
        fn prop_last_page_is_never_empty(
            rows_per_page in prop::sample::select(ROWS_PER_PAGE_OPTIONS.to_vec()),
            total in 1usize..100_000,
        ) {
            let last = last_page_index(total, rows_per_page);
            let range = PageRange::new(last, rows_per_page, total);
            prop_assert!(range.lower <= range.upper);
            prop_assert_eq!(range.upper, total);
        }

        #[test]
        fn prop_sort_toggle_is_an_involution(start_desc in any::<bool>()) {
            let mut model = TableModel::new(&config());
            model.view.order_direction = if start_desc { SortDirection::Desc } else { SortDirection::Asc };
            let original = model.view.order_direction;
            let model = update(model, TableAction::SetSort("Id".into())).model;
            prop_assert_ne!(model.view.order_direction, original);
            let model = update(model, TableAction::SetSort("Id".into())).model;
            prop_assert_eq!(model.view.order_direction, original);
            let model = update(model, TableAction::SetSort("Name".into())).model;
            prop_assert_eq!(model.view.order_direction, SortDirection::Asc);
        }
    }
}
