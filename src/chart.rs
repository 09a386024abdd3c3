use anyhow::anyhow;
use plotters::prelude::*;
use plotters::style::FontTransform;
use crate::repo::DailyCount;

/// Turns the per-day delivery series into an image. The aggregation itself
/// lives in the repository; this collaborator only draws.
pub trait ChartRenderer {
    fn render(&self, series: &[DailyCount]) -> anyhow::Result<Vec<u8>>;
}

#[derive(Clone, Copy)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self { width: 800, height: 500 }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, series: &[DailyCount]) -> anyhow::Result<Vec<u8>> {
        if series.is_empty() {
            return Err(anyhow!("refusing to render an empty series"));
        }
        let max_count = series.iter().map(|point| point.count).max().unwrap_or(0);

        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("couldn't clear the chart area: {e}"))?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Delivered confessions", ("sans-serif", 24))
                .margin(16)
                .x_label_area_size(80)
                .y_label_area_size(48)
                .build_cartesian_2d(0..series.len() as i32, 0..max_count + 1)
                .map_err(|e| anyhow!("couldn't lay out the chart: {e}"))?;

            chart.configure_mesh()
                .disable_x_mesh()
                .x_labels(series.len())
                .x_label_formatter(&|index: &i32| {
                    usize::try_from(*index).ok()
                        .and_then(|index| series.get(index))
                        .map(|point| point.day.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                })
                .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
                .y_desc("per day")
                .draw()
                .map_err(|e| anyhow!("couldn't draw the chart mesh: {e}"))?;

            chart.draw_series(LineSeries::new(
                series.iter().enumerate().map(|(index, point)| (index as i32, point.count)),
                &BLUE,
            )).map_err(|e| anyhow!("couldn't draw the delivery series: {e}"))?;

            root.present()
                .map_err(|e| anyhow!("couldn't finalize the chart: {e}"))?;
        }
        Ok(buffer.into_bytes())
    }
}
