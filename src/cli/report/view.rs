use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as Segment, Points},
        Block, Borders, Cell, Paragraph, Row, Table,
    },
    Frame,
};

use crate::error::Result;
use crate::fmt::{compact, money, weight};
use crate::pipeline::Report;
use crate::tui::{
    run_report_view, ReportView, ReportViewAction, FOOTER_STYLE, HEADER_STYLE, REVENUE_STYLE,
    SELECTED_STYLE, WEIGHT_STYLE,
};

use super::text::title;

/// At most this many month labels are drawn under a chart.
const MAX_X_LABELS: usize = 6;

/// Share of the y range kept free above and below the data for labels.
const LABEL_HEADROOM: f64 = 0.15;

#[derive(Clone, Copy, PartialEq)]
enum Focus {
    Weight,
    Revenue,
}

struct Series {
    name: &'static str,
    style: Style,
    points: Vec<(f64, f64)>,
    value_labels: Vec<String>,
    bounds: [f64; 2],
}

impl Series {
    fn new(name: &'static str, style: Style, values: &[f64], label: impl Fn(f64) -> String) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();
        Self {
            name,
            style,
            points,
            value_labels: values.iter().map(|v| label(*v)).collect(),
            bounds: y_bounds(values),
        }
    }

    fn color(&self) -> Color {
        self.style.fg.unwrap_or(Color::White)
    }
}

/// Value range padded by 5% of its magnitude on each side.
fn y_bounds(values: &[f64]) -> [f64; 2] {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let lo = min - min.abs() * 0.05;
    let hi = max + max.abs() * 0.05;
    if hi - lo < f64::EPSILON {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

/// Indices of the month labels drawn under a chart, spread evenly.
fn x_ticks(count: usize) -> Vec<usize> {
    if count <= MAX_X_LABELS {
        return (0..count).collect();
    }
    let last = count - 1;
    (0..MAX_X_LABELS)
        .map(|i| i * last / (MAX_X_LABELS - 1))
        .collect()
}

/// Left edge, in canvas units, that centers `text` on `x`.
fn centered(x: f64, text: &str, cell_width: f64) -> f64 {
    x - text.chars().count() as f64 * cell_width / 2.0
}

pub(crate) struct ChartReportView {
    title: String,
    labels: Vec<String>,
    weight: Series,
    revenue: Series,
    rows: Vec<[String; 3]>,
    focus: Focus,
}

impl ChartReportView {
    pub fn new(brand: &str, report: &Report, currency: &str) -> Self {
        let weights: Vec<f64> = report.totals.iter().map(|t| t.weight_total).collect();
        let revenues: Vec<f64> = report.totals.iter().map(|t| t.revenue_total).collect();
        let rows = report
            .totals
            .iter()
            .map(|t| {
                [
                    t.month_label.clone(),
                    weight(t.weight_total),
                    money(t.revenue_total, currency),
                ]
            })
            .collect();
        Self {
            title: title(brand, report),
            labels: report.totals.iter().map(|t| t.month_label.clone()).collect(),
            weight: Series::new("Weight (kg)", WEIGHT_STYLE, &weights, compact),
            revenue: Series::new("Revenue", REVENUE_STYLE, &revenues, |v| money(v, currency)),
            rows,
            focus: Focus::Weight,
        }
    }

    /// Line with point markers, each month's value above its point and month
    /// labels along the bottom edge.
    fn draw_chart(&self, frame: &mut Frame, area: Rect, series: &Series, focused: bool) {
        let [lo, hi] = series.bounds;
        let room = (hi - lo) * LABEL_HEADROOM;
        let y_range = [lo - room, hi + room];
        let x_range = [-0.5, self.labels.len().max(1) as f64 - 0.5];
        let cell_width = (x_range[1] - x_range[0]) / area.width.saturating_sub(2).max(1) as f64;
        let color = series.color();

        let title_style = if focused { SELECTED_STYLE } else { HEADER_STYLE };
        let block_title = Line::from(vec![
            Span::styled(format!(" {} ", series.name), title_style),
            Span::styled(format!("{} to {} ", compact(lo), compact(hi)), FOOTER_STYLE),
        ]);

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(block_title)
                    .borders(Borders::ALL)
                    .border_style(FOOTER_STYLE),
            )
            .marker(Marker::Braille)
            .x_bounds(x_range)
            .y_bounds(y_range)
            .paint(|ctx| {
                for pair in series.points.windows(2) {
                    ctx.draw(&Segment {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color,
                    });
                }
                ctx.draw(&Points {
                    coords: &series.points,
                    color,
                });
                ctx.layer();
                for ((x, y), text) in series.points.iter().zip(&series.value_labels) {
                    ctx.print(
                        centered(*x, text, cell_width),
                        y + room * 0.5,
                        Span::styled(text.clone(), series.style.add_modifier(Modifier::BOLD)),
                    );
                }
                for i in x_ticks(self.labels.len()) {
                    let text = &self.labels[i];
                    ctx.print(
                        centered(i as f64, text, cell_width),
                        y_range[0],
                        Span::styled(text.clone(), FOOTER_STYLE),
                    );
                }
            });
        frame.render_widget(canvas, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec!["Month", "Total Weight", "Total Revenue"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r[0].clone()),
                    Cell::from(Line::from(r[1].clone()).right_aligned()),
                    Cell::from(Line::from(r[2].clone()).right_aligned()),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [Constraint::Length(10), Constraint::Length(16), Constraint::Length(20)],
        )
        .header(header)
        .block(
            Block::default()
                .title(Span::styled(" Summary ", HEADER_STYLE))
                .borders(Borders::ALL)
                .border_style(FOOTER_STYLE),
        );
        frame.render_widget(table, area);
    }
}

impl ReportView for ChartReportView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, charts_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(self.rows.len().min(12) as u16 + 3),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.title)).style(HEADER_STYLE),
            header_area,
        );

        let (weight_pct, revenue_pct) = match self.focus {
            Focus::Weight => (60, 40),
            Focus::Revenue => (40, 60),
        };
        let [weight_area, revenue_area] = Layout::vertical([
            Constraint::Percentage(weight_pct),
            Constraint::Percentage(revenue_pct),
        ])
        .areas(charts_area);
        self.draw_chart(frame, weight_area, &self.weight, self.focus == Focus::Weight);
        self.draw_chart(frame, revenue_area, &self.revenue, self.focus == Focus::Revenue);
        self.draw_table(frame, table_area);

        frame.render_widget(
            Paragraph::new(" Tab switch chart  q quit").style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ReportViewAction::Close,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Weight => Focus::Revenue,
                    Focus::Revenue => Focus::Weight,
                };
                ReportViewAction::Continue
            }
            _ => ReportViewAction::Continue,
        }
    }
}

pub fn show(brand: &str, report: &Report, currency: &str) -> Result<()> {
    let mut view = ChartReportView::new(brand, report, currency);
    run_report_view(&mut view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_bounds_pad_five_percent() {
        let [lo, hi] = y_bounds(&[100.0, 200.0]);
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_bounds_flat_and_empty() {
        assert_eq!(y_bounds(&[]), [0.0, 1.0]);
        let [lo, hi] = y_bounds(&[0.0]);
        assert!(lo < hi);
    }

    #[test]
    fn test_x_ticks_thinned() {
        let picked = x_ticks(12);
        assert_eq!(picked.len(), MAX_X_LABELS);
        assert_eq!(picked.first(), Some(&0));
        assert_eq!(picked.last(), Some(&11));
        assert_eq!(x_ticks(3), vec![0, 1, 2]);
        assert!(x_ticks(0).is_empty());
    }

    #[test]
    fn test_centered_shifts_by_half_the_text() {
        assert!((centered(2.0, "1.5k", 0.25) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_tab_toggles_focus_and_q_closes() {
        use crate::models::{MonthKey, MonthlyTotal, Principal};
        let jan = MonthKey::from_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let report = Report {
            principal: Principal::new("A"),
            supervisors: vec![],
            representatives: vec![],
            months: vec![jan.clone()],
            totals: vec![MonthlyTotal {
                month_label: jan.label.clone(),
                month_ord: jan.ord,
                weight_total: 1.0,
                revenue_total: 2.0,
            }],
            start: jan.clone(),
            end: jan,
        };
        let mut view = ChartReportView::new("B", &report, "R$");
        assert_eq!(view.weight.value_labels, vec!["1".to_string()]);
        assert_eq!(view.revenue.value_labels, vec!["R$ 2".to_string()]);
        assert!(view.focus == Focus::Weight);
        assert!(matches!(view.handle_key(KeyCode::Tab), ReportViewAction::Continue));
        assert!(view.focus == Focus::Revenue);
        assert!(matches!(view.handle_key(KeyCode::Char('q')), ReportViewAction::Close));
    }
}
