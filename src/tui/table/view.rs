use super::states::{TableModel, TableUi};
use super::themed_table::TableColors;
use super::view_table_row::{CellFormat, header_checkbox, render as render_table_row};
use crate::backend::model::{FetchStatus, RowId, SortDirection};
use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Everything needed to draw the table once.
pub struct TableView<'a> {
    pub model: &'a TableModel,
    pub format: &'a CellFormat,
    pub colors: &'a TableColors,
    /// Maximum height of the table area.
    pub table_height: Option<u16>,
    /// Latest message from the host (row selected, export written, ...).
    pub status: Option<&'a str>,
}

impl TableView<'_> {
    fn table(&self, focused_column: Option<usize>) -> Table<'static> {
        let model = self.model;
        let colors = self.colors;

        let mut header_cells = vec![Cell::from(header_checkbox(model.view.all_selected))];
        for (i, column) in model.columns.iter().enumerate() {
            let mut label = column.name.clone();
            if column.name == model.view.order_by {
                label.push_str(match model.view.order_direction {
                    SortDirection::Asc => " ▲",
                    SortDirection::Desc => " ▼",
                });
            }
            let line = Line::from(label);
            let line = if column.column_type.is_numeric() {
                line.alignment(Alignment::Right)
            } else {
                line
            };
            let cell = Cell::from(line);
            header_cells.push(if focused_column == Some(i) {
                cell.style(colors.focused_header_style)
            } else {
                cell
            });
        }
        let header = Row::new(header_cells).style(
            Style::default()
                .fg(colors.header_fg)
                .bg(colors.header_bg)
                .add_modifier(Modifier::BOLD),
        );

        let text_color = if model.data.status == FetchStatus::Requested {
            colors.loading_fg
        } else {
            colors.row_fg
        };
        let rows: Vec<Row> = model
            .data
            .rows
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let id = RowId::from_row(record, &model.id_column);
                let checked = id.as_ref().is_some_and(|id| model.view.is_checked(id));
                let active = id.is_some() && id == model.view.selected_row_id;
                render_table_row(
                    i,
                    record,
                    &model.columns,
                    checked,
                    active,
                    text_color,
                    self.format,
                    colors,
                )
            })
            .collect();

        let mut widths = vec![Constraint::Length(3)];
        widths.extend(model.columns.iter().map(|c| {
            if c.column_type.is_numeric() {
                Constraint::Length(14)
            } else {
                Constraint::Fill(1)
            }
        }));

        Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Records"))
            .row_highlight_style(colors.selected_row_style)
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always)
    }

    /// Draws every loaded row into a fresh buffer, for export.
    pub fn render_offscreen(&self, width: u16) -> Buffer {
        let height = (self.model.data.rows.len() + 3).min(usize::from(u16::MAX)) as u16;
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        Widget::render(self.table(None), area, &mut buffer);
        buffer
    }

    fn pager(&self) -> Line<'static> {
        let model = self.model;
        let colors = self.colors;
        let range = model.range();
        let back = colors.control(model.can_go_back());
        let forward = colors.control(model.can_go_forward());

        Line::from(vec![
            Span::raw(format!("Rows per page: {}   ", model.view.rows_per_page)),
            Span::styled("⏮ ", back),
            Span::styled("◀ ", back),
            Span::raw(format!(
                " showing {} - {} of {} records ",
                range.lower, range.upper, range.total
            )),
            Span::styled(" ▶", forward),
            Span::styled(" ⏭", forward),
        ])
        .alignment(Alignment::Right)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ui: &mut TableUi) {
        let model = self.model;
        let colors = self.colors;

        let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
        match self.table_height {
            Some(h) => constraints.push(Constraint::Length(h)),
            None => constraints.push(Constraint::Min(0)),
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(4));
        if self.table_height.is_some() {
            constraints.push(Constraint::Min(0));
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(area);

        let toolbar = Line::from(vec![
            Span::styled("🖨 P", Style::default().fg(Color::Cyan)),
            Span::raw(" print   "),
            Span::styled(
                format!("{} selected", model.view.checked.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(toolbar), chunks[0]);

        if model.is_busy() {
            let label = if model.view.exporting {
                "Exporting"
            } else {
                "Loading"
            };
            let gauge = LineGauge::default()
                .filled_style(Style::default().fg(Color::Cyan))
                .label(label)
                .ratio((ui.tick % 20) as f64 / 20.0);
            frame.render_widget(gauge, chunks[1]);
        }

        let grid_area = chunks[2];
        ui.table_area = Some(grid_area);
        let rows = model.data.rows.len();
        match ui.table_state.selected() {
            _ if rows == 0 => ui.table_state.select(None),
            Some(i) if i >= rows => ui.table_state.select(Some(rows - 1)),
            None => ui.table_state.select(Some(0)),
            _ => {}
        }
        let focused = ui.focused_column.min(model.columns.len().saturating_sub(1));
        frame.render_stateful_widget(self.table(Some(focused)), grid_area, &mut ui.table_state);

        let message = match (&model.data.error, self.status) {
            (Some(err), _) => Line::from(Span::styled(
                format!("Error: {err}"),
                Style::default().fg(colors.error_fg),
            )),
            (None, Some(status)) => Line::from(Span::raw(status.to_string())),
            (None, None) => Line::default(),
        };
        frame.render_widget(Paragraph::new(message), chunks[3]);

        let sort_hint = model
            .columns
            .get(focused)
            .map(|c| format!("s sort by {}", c.name))
            .unwrap_or_default();
        let hints = Line::from(format!(
            "↑↓ move | ←→ column | {sort_hint} | space check | a all | ⏎ select | e edit | n/p g/G page | +/- rows | q quit"
        ))
        .alignment(Alignment::Center);
        let footer = Paragraph::new(vec![self.pager(), hints])
            .style(Style::default().fg(colors.row_fg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Controls")
                    .border_style(Style::default().fg(colors.footer_border_color)),
            );
        frame.render_widget(footer, chunks[4]);
    }
}
