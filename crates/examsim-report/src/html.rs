//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use examsim_core::report::ExamReport;
use examsim_core::review::ReviewItem;
use examsim_core::timer::TimeDisplay;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML review page from an exam report.
pub fn generate_html(report: &ExamReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} results</title>\n",
        html_escape(&report.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | time used {} of {} | {}</p>\n",
        report.score.total_count,
        TimeDisplay::from_secs(report.time_used_secs),
        TimeDisplay::from_secs(report.duration_secs),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score summary
    let tier = report.score.tier;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Score</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">{}</p>\n",
        html_escape(&report.score.to_string())
    ));
    html.push_str(&format!(
        "<p class=\"feedback {}\">{}</p>\n",
        tier.css_class(),
        html_escape(tier.message())
    ));
    html.push_str(&generate_breakdown_chart(report));
    html.push_str("</section>\n");

    // Review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    html.push_str(
        "<label><input type=\"checkbox\" id=\"only-missed\" onchange=\"filterReview()\"> \
         Show only missed questions</label>\n",
    );
    html.push_str("<ol id=\"review\">\n");
    for item in &report.review {
        html.push_str(&review_item_html(item));
    }
    html.push_str("</ol>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn review_item_html(item: &ReviewItem) -> String {
    let status = if item.is_correct {
        "correct"
    } else if item.unanswered {
        "unanswered"
    } else {
        "incorrect"
    };

    let mut out = format!("<li class=\"question {status}\" data-status=\"{status}\">\n");
    out.push_str(&format!(
        "<p class=\"question-text\">{}</p>\n",
        html_escape(&item.question)
    ));
    if item.unanswered {
        out.push_str("<p class=\"tag\">Not answered</p>\n");
    }

    out.push_str("<ul class=\"options\">\n");
    for option in &item.options {
        let class = if option.is_correct_option {
            "option correct-option"
        } else if option.is_user_selected_incorrect_option {
            "option wrong-option"
        } else {
            "option"
        };
        out.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            class,
            html_escape(&option.text)
        ));
    }
    out.push_str("</ul>\n");

    if !item.explanation.trim().is_empty() {
        out.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(&item.explanation)
        ));
    }
    out.push_str("</li>\n");
    out
}

/// Horizontal bars for correct / incorrect / unanswered counts.
fn generate_breakdown_chart(report: &ExamReport) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let unanswered = report.unanswered_count();
    let correct = report.score.correct_count;
    let incorrect = report
        .score
        .total_count
        .saturating_sub(correct + unanswered);
    let total = report.score.total_count.max(1) as f64;

    let rows = [
        ("Correct", correct, "#22c55e"),
        ("Incorrect", incorrect, "#ef4444"),
        ("Unanswered", unanswered, "#9ca3af"),
    ];

    let total_height = rows.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, count, color)) in rows.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (*count as f64 / total * max_width as f64) as usize;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            label
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            count
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
.score { font-size: 2rem; font-weight: bold; }
.feedback { padding: 0.75rem 1rem; border-radius: 8px; }
.feedback.excellent { background: var(--pass); }
.feedback.good { background: #fef9c3; color: #1a1a1a; }
.feedback.needs-improvement { background: var(--fail); }
ol#review > li { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin: 1rem 0; }
ol#review > li.correct { border-left: 6px solid #22c55e; }
ol#review > li.incorrect { border-left: 6px solid #ef4444; }
ol#review > li.unanswered { border-left: 6px solid #9ca3af; }
.options { list-style: none; padding-left: 0; }
.option { padding: 0.25rem 0.5rem; margin: 0.25rem 0; border-radius: 4px; }
.correct-option { background: var(--pass); }
.wrong-option { background: var(--fail); text-decoration: line-through; }
.explanation { color: var(--muted); font-style: italic; }
.tag { color: var(--muted); font-size: 0.85rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function filterReview() {
  const onlyMissed = document.getElementById('only-missed').checked;
  document.querySelectorAll('#review > li').forEach(li => {
    li.style.display = onlyMissed && li.dataset.status === 'correct' ? 'none' : '';
  });
}
"#;
