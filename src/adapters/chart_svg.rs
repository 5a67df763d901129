//! Inline SVG chart rendering for reports.
//!
//! Line charts plot values by position; an undefined value breaks the line
//! rather than being drawn as zero.

use chrono::NaiveDate;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 260.0;
const PADDING: f64 = 44.0;

pub const BLUE: &str = "#2563eb";
pub const ORANGE: &str = "#ea580c";
pub const GREEN: &str = "#16a34a";
pub const PURPLE: &str = "#9333ea";
pub const GREY: &str = "#6b7280";

/// One plotted line.
pub struct LineSeries<'a> {
    pub label: &'a str,
    pub values: &'a [Option<f64>],
    pub color: &'static str,
}

impl<'a> LineSeries<'a> {
    pub fn new(label: &'a str, values: &'a [Option<f64>], color: &'static str) -> Self {
        Self {
            label,
            values,
            color,
        }
    }
}

/// Horizontal dashed line at a fixed value (e.g. oscillator thresholds).
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
}

struct Scale {
    min: f64,
    max: f64,
    step_x: f64,
}

impl Scale {
    fn new(min: f64, max: f64, points: usize) -> Self {
        let (min, max) = if max > min {
            (min, max)
        } else {
            (min - 1.0, max + 1.0)
        };
        let step_x = if points > 1 {
            (WIDTH - 2.0 * PADDING) / (points - 1) as f64
        } else {
            0.0
        };
        Self { min, max, step_x }
    }

    fn x(&self, i: usize) -> f64 {
        PADDING + i as f64 * self.step_x
    }

    fn y(&self, v: f64) -> f64 {
        HEIGHT - PADDING - (v - self.min) / (self.max - self.min) * (HEIGHT - 2.0 * PADDING)
    }
}

/// Runs of consecutive defined values as `(start_index, values)`.
pub fn defined_segments(values: &[Option<f64>]) -> Vec<(usize, Vec<f64>)> {
    let mut segments = Vec::new();
    let mut current: Option<(usize, Vec<f64>)> = None;

    for (i, v) in values.iter().enumerate() {
        match (v, current.as_mut()) {
            (Some(v), Some((_, seg))) => seg.push(*v),
            (Some(v), None) => current = Some((i, vec![*v])),
            (None, _) => {
                if let Some(seg) = current.take() {
                    segments.push(seg);
                }
            }
        }
    }
    if let Some(seg) = current {
        segments.push(seg);
    }
    segments
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_open(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}" width="{WIDTH:.0}" height="{HEIGHT:.0}" role="img" aria-label="{title}">
<rect width="100%" height="100%" fill="white"/>
<text x="{PADDING:.0}" y="20" font-size="14" font-weight="bold">{title}</text>
<line x1="{PADDING:.0}" y1="{bottom:.1}" x2="{right:.1}" y2="{bottom:.1}" stroke="{GREY}"/>
<line x1="{PADDING:.0}" y1="{PADDING:.0}" x2="{PADDING:.0}" y2="{bottom:.1}" stroke="{GREY}"/>
"#,
        title = escape(title),
        bottom = HEIGHT - PADDING,
        right = WIDTH - PADDING,
    )
}

fn empty_chart(title: &str) -> String {
    format!(
        "{}<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"12\" fill=\"{GREY}\">No data to display</text>\n</svg>",
        svg_open(title),
        WIDTH / 2.0 - 50.0,
        HEIGHT / 2.0
    )
}

/// Line chart of one or more aligned series against `dates`.
pub fn line_chart(
    title: &str,
    dates: &[NaiveDate],
    series: &[LineSeries<'_>],
    reference_lines: &[ReferenceLine],
) -> String {
    let defined = series.iter().flat_map(|s| s.values.iter().flatten().copied());
    let refs = reference_lines.iter().map(|r| r.value);
    let (min, max) = defined
        .chain(refs)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return empty_chart(title);
    }

    let points = series
        .iter()
        .map(|s| s.values.len())
        .max()
        .unwrap_or(0)
        .max(dates.len());
    let scale = Scale::new(min, max, points);
    let mut svg = svg_open(title);

    for r in reference_lines {
        let y = scale.y(r.value);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{GREY}\" stroke-dasharray=\"4 3\"/>\n\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" fill=\"{GREY}\">{}</text>\n",
            PADDING,
            WIDTH - PADDING,
            WIDTH - PADDING + 4.0,
            y + 3.0,
            escape(&r.label)
        ));
    }

    for s in series {
        for (start, values) in defined_segments(s.values) {
            let coords: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(offset, v)| format!("{:.1},{:.1}", scale.x(start + offset), scale.y(*v)))
                .collect();
            svg.push_str(&format!(
                "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
                s.color,
                coords.join(" ")
            ));
        }
    }

    // Legend
    for (i, s) in series.iter().enumerate() {
        let x = PADDING + 10.0 + i as f64 * 110.0;
        svg.push_str(&format!(
            "<rect x=\"{x:.0}\" y=\"{:.0}\" width=\"10\" height=\"10\" fill=\"{}\"/>\
             <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"11\">{}</text>\n",
            PADDING - 16.0,
            s.color,
            x + 14.0,
            PADDING - 7.0,
            escape(s.label)
        ));
    }

    svg.push_str(&axis_labels(&scale, dates));
    svg.push_str("</svg>");
    svg
}

fn axis_labels(scale: &Scale, dates: &[NaiveDate]) -> String {
    let mut out = format!(
        "<text x=\"{:.0}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{:.2}</text>\n\
         <text x=\"{:.0}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{:.2}</text>\n",
        PADDING - 4.0,
        scale.y(scale.max) + 3.0,
        scale.max,
        PADDING - 4.0,
        scale.y(scale.min) + 3.0,
        scale.min,
    );
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        out.push_str(&format!(
            "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\">{first}</text>\n\
             <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\" text-anchor=\"end\">{last}</text>\n",
            PADDING,
            HEIGHT - PADDING + 16.0,
            WIDTH - PADDING,
            HEIGHT - PADDING + 16.0,
        ));
    }
    out
}

/// Equal-width bin counts over `[min, max]` as `(lower_edge, count)`.
pub fn bin_counts(values: &[f64], bins: usize) -> Vec<(f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return vec![(min, values.len())];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        // The maximum lands in the last bin.
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, c))
        .collect()
}

pub fn histogram(title: &str, values: &[f64], bins: usize) -> String {
    let counts = bin_counts(values, bins);
    let tallest = counts.iter().map(|c| c.1).max().unwrap_or(0);
    if tallest == 0 {
        return empty_chart(title);
    }

    let mut svg = svg_open(title);
    let bar_width = (WIDTH - 2.0 * PADDING) / counts.len() as f64;
    let plot_height = HEIGHT - 2.0 * PADDING;

    for (i, (_, count)) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let h = *count as f64 / tallest as f64 * plot_height;
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{h:.1}\" fill=\"{BLUE}\"/>\n",
            PADDING + i as f64 * bar_width,
            HEIGHT - PADDING - h,
            (bar_width - 0.5).max(0.5),
        ));
    }

    let lo = counts.first().map(|c| c.0).unwrap_or(0.0);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\">{lo:.2}</text>\n\
         <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\" text-anchor=\"end\">{hi:.2}</text>\n\
         <text x=\"{:.0}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{tallest}</text>\n",
        PADDING,
        HEIGHT - PADDING + 16.0,
        WIDTH - PADDING,
        HEIGHT - PADDING + 16.0,
        PADDING - 4.0,
        PADDING + 3.0,
    ));
    svg.push_str("</svg>");
    svg
}
