//! Standalone HTML optimization report

use crate::model::{Severity, Suggestion};
use crate::report::Summary;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, suggestions: &[Suggestion]) -> io::Result<()> {
    let summary = Summary::from_suggestions(suggestions);

    // Critical first, then Moderate, then Good; stable within a severity
    let mut sorted: Vec<&Suggestion> = suggestions.iter().collect();
    sorted.sort_by_key(|s| rank(s.severity));

    let cards: String = sorted.iter().map(|s| card(s)).collect();

    // Gauge geometry: r = 50, circumference = 2πr
    let circumference = 2.0 * std::f64::consts::PI * 50.0;
    let offset = circumference - (summary.score as f64 / 100.0) * circumference;

    write!(writer, r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>DBSmart Optimization Report</title>
    <style>
        :root {{
            --bg: #f3f4f6;
            --card: #ffffff;
            --border: #e5e7eb;
            --text: #111827;
            --dim: #6b7280;
            --critical: #ef4444;
            --moderate: #f59e0b;
            --good: #22c55e;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 900px; margin: 0 auto; padding: 2rem; }}
        .header {{ display: flex; align-items: center; gap: 2rem; margin-bottom: 2rem; }}
        .header h1 {{ font-size: 1.75rem; }}
        .header p {{ color: var(--dim); font-size: 0.9rem; }}
        .gauge {{ position: relative; width: 120px; height: 120px; flex-shrink: 0; }}
        .gauge svg {{ transform: rotate(-90deg); }}
        .gauge span {{
            position: absolute; inset: 0; display: flex; align-items: center; justify-content: center;
            font-size: 1.75rem; font-weight: 700;
        }}
        .counts {{ display: flex; gap: 1rem; margin-top: 0.5rem; font-size: 0.85rem; }}
        .card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-left: 4px solid var(--dim);
            border-radius: 8px;
            padding: 1rem;
            margin-bottom: 1rem;
        }}
        .card.critical {{ border-left-color: var(--critical); }}
        .card.moderate {{ border-left-color: var(--moderate); }}
        .card.good {{ border-left-color: var(--good); }}
        .badge {{
            display: inline-block; font-size: 0.75rem; font-weight: 600; padding: 0.1rem 0.6rem;
            border-radius: 999px; background: var(--border); margin-right: 0.5rem;
        }}
        .card h4 {{ margin: 0.5rem 0 0.25rem; }}
        .card p {{ color: var(--dim); font-size: 0.9rem; }}
        .empty {{ color: var(--dim); text-align: center; padding: 3rem; }}
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <div class="gauge">
            <svg width="120" height="120">
                <circle cx="60" cy="60" r="50" stroke="#e5e7eb" stroke-width="10" fill="transparent"/>
                <circle cx="60" cy="60" r="50" stroke="{color}" stroke-width="10" fill="transparent"
                        stroke-dasharray="{circumference:.2}" stroke-dashoffset="{offset:.2}" stroke-linecap="round"/>
            </svg>
            <span>{score}</span>
        </div>
        <div>
            <h1>Optimization Report</h1>
            <p>Generated {generated} &middot; {band}</p>
            <div class="counts">
                <span style="color: var(--critical)">{critical} critical</span>
                <span style="color: var(--moderate)">{moderate} moderate</span>
                <span style="color: var(--good)">{good} good practice</span>
            </div>
        </div>
    </div>
    {body}
</div>
</body>
</html>
"##,
        color = summary.band.color(),
        circumference = circumference,
        offset = offset,
        score = summary.score,
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M"),
        band = summary.band,
        critical = summary.critical,
        moderate = summary.moderate,
        good = summary.good,
        body = if cards.is_empty() {
            r#"<div class="empty">No suggestions.</div>"#.to_string()
        } else {
            cards
        },
    )?;

    Ok(())
}

fn rank(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 0,
        Severity::Moderate => 1,
        Severity::Good => 2,
    }
}

fn card(s: &Suggestion) -> String {
    format!(
        r#"<div class="card {class}">
        <span class="badge">{title}</span><span class="badge">{category}</span>
        <h4>{text}</h4>
        <p>{rationale}</p>
    </div>
    "#,
        class = s.severity.as_str().to_lowercase(),
        title = s.severity.title(),
        category = html_escape(s.category.as_str()),
        text = html_escape(&s.text),
        rationale = html_escape(&s.rationale),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
