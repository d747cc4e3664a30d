//! Human-readable tables on stderr

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use starlab_core::DatasetStatus;
use starlab_metrics::{Answer, LanguageFrequencies, LanguageGroup, MetricsReport, Mode, ResearchQuestion};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn fmt_f64(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn fmt_mode(mode: Option<&Mode<u64>>, suffix: &str) -> String {
    match mode {
        Some(m) => {
            let values: Vec<String> = m.values.iter().map(|v| format!("{v}{suffix}")).collect();
            let tie = if m.is_tie() { ", tie" } else { "" };
            format!("{} (×{}{tie})", values.join(", "), m.frequency)
        }
        None => "-".to_string(),
    }
}

/// Modes come from the distribution itself, except where the answer bins
/// its values first.
fn answer_mode(answer: &Answer) -> String {
    match answer {
        Answer::Maturity { age_days_mode, .. } => fmt_mode(age_days_mode.as_ref(), " days"),
        Answer::ClosedIssues { percent_mode, .. } => fmt_mode(percent_mode.as_ref(), "%"),
        _ => fmt_mode(answer.distribution().and_then(|d| d.mode.as_ref()), ""),
    }
}

pub fn status_label(status: &DatasetStatus) -> String {
    match status {
        DatasetStatus::Complete => "complete".to_string(),
        DatasetStatus::Exhausted => "short (source exhausted)".to_string(),
        DatasetStatus::Partial { reason } => format!("PARTIAL ({reason})"),
    }
}

/// Key-value table, as printed after each command
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut t = table(&[title, "Value"]);
    for (label, value) in rows {
        t.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{t}");
}

/// One row per numeric question, then the language tables.
pub fn render_report(report: &MetricsReport) -> String {
    let mut out = format!(
        "Dataset: {} repositories ({} excluded), {}\nReference time: {}\n",
        report.dataset_size,
        report.excluded,
        status_label(&report.status),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    let mut numeric = table(&["RQ", "Metric", "Unit", "N", "Mean", "Median", "Min", "Max", "Mode", "Notes"]);
    for (question, answer) in &report.answers {
        let notes = match answer {
            Answer::Releases { without_releases, .. } => format!("{without_releases} without releases"),
            Answer::Updates {
                updated_within_30_days, ..
            } => format!("{updated_within_30_days} updated ≤30 days ago"),
            Answer::ClosedIssues {
                without_issues,
                fully_closed,
                ..
            } => format!("{without_issues} without issues, {fully_closed} fully closed"),
            Answer::Maturity { .. } | Answer::Numeric { .. } => String::new(),
            Answer::Languages(_) | Answer::ByLanguage(_) => continue,
        };
        let unit = answer.unit().map(|u| u.label()).unwrap_or_default();
        let mut row = vec![question.id().to_string(), metric_name(*question).to_string(), unit.to_string()];
        match answer.distribution() {
            Some(d) => row.extend([
                d.count.to_string(),
                fmt_f64(d.mean),
                fmt_f64(d.median),
                fmt_f64(d.min),
                fmt_f64(d.max),
                answer_mode(answer),
            ]),
            None => row.extend(["0", "-", "-", "-", "-", "-"].map(String::from)),
        }
        row.push(notes);
        numeric.add_row(row);
    }
    out.push_str(&format!("\n{numeric}\n"));

    if let Some(Answer::Languages(freq)) = report.get(ResearchQuestion::LanguagePopularity) {
        out.push_str(&format!("\nRQ05 {}\n{}\n", ResearchQuestion::LanguagePopularity.title(), languages_table(freq)));
    }
    if let Some(Answer::ByLanguage(groups)) = report.get(ResearchQuestion::ByLanguage) {
        out.push_str(&format!("\nRQ07 {}\n{}\n", ResearchQuestion::ByLanguage.title(), groups_table(groups)));
    }
    out
}

pub fn print_report(report: &MetricsReport) {
    eprintln!("\n{}", render_report(report));
}

fn metric_name(question: ResearchQuestion) -> &'static str {
    match question {
        ResearchQuestion::Maturity => "Repository age",
        ResearchQuestion::ExternalContribution => "Merged pull requests",
        ResearchQuestion::ReleaseFrequency => "Releases",
        ResearchQuestion::UpdateFrequency => "Days since last update",
        ResearchQuestion::LanguagePopularity => "Primary language",
        ResearchQuestion::ClosedIssueRatio => "Closed / total issues",
        ResearchQuestion::ByLanguage => "By language",
    }
}

fn languages_table(freq: &LanguageFrequencies) -> Table {
    let mut t = table(&["Language", "Repositories", "Share"]);
    for share in &freq.top {
        t.add_row(vec![
            share.language.to_string(),
            share.repositories.to_string(),
            format!("{:.1}%", share.percent),
        ]);
    }
    if let Some(mode) = &freq.mode {
        let names: Vec<String> = mode.values.iter().map(ToString::to_string).collect();
        t.add_row(vec![
            format!("mode: {}", names.join(", ")),
            mode.frequency.to_string(),
            format!("{} languages", freq.distinct),
        ]);
    }
    t
}

fn groups_table(groups: &[LanguageGroup]) -> Table {
    let mut t = table(&[
        "Language",
        "Repositories",
        "Merged PRs (median)",
        "Releases (median)",
        "Days since update (median)",
    ]);
    for g in groups {
        t.add_row(vec![
            g.language.to_string(),
            g.repositories.to_string(),
            fmt_f64(g.merged_pull_requests.median),
            fmt_f64(g.releases.median),
            fmt_f64(g.days_since_update.median),
        ]);
    }
    t
}
