//! Chart panel: horizontal bars for both bar series and histograms.

use crate::chart::{Chart, Histogram};
use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

/// Widget drawing a [`Chart`].
pub struct ChartPanel<'a> {
    chart: &'a Chart,
}

impl<'a> ChartPanel<'a> {
    pub fn new(chart: &'a Chart) -> Self {
        Self { chart }
    }

    fn bars(&self) -> Vec<Bar<'static>> {
        match self.chart {
            Chart::Bar(series) => series
                .bars
                .iter()
                .map(|(label, value)| {
                    Bar::default()
                        .label(Line::from(label.clone()))
                        .value(value.round().max(0.0) as u64)
                        .text_value(format_number(*value))
                })
                .collect(),
            Chart::Histogram(histogram) => histogram
                .bins
                .iter()
                .map(|bin| {
                    Bar::default()
                        .label(Line::from(bin_label(histogram, bin.start, bin.end)))
                        .value(bin.count as u64)
                })
                .collect(),
        }
    }
}

impl Widget for ChartPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.chart.title()))
            .title_bottom(format!(" {} ", self.chart.axis_caption()));

        let bars = self.bars();
        BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::White))
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

fn bin_label(histogram: &Histogram, start: f64, end: f64) -> String {
    // A single bin spanning one value
    if histogram.bins.len() == 1 && start == end {
        return format_number(start);
    }
    format!("{}-{}", format_number(start), format_number(end))
}

/// Whole numbers print without decimals, others with two.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
