//! HTML and plain-text rendering of keystone reports.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::affix::{AffixBucket, ALL_BUCKETS};
use crate::assets::dungeon_image_path;
use crate::matcher::DisplayCard;
use crate::report::{KeystoneReport, ReportQuery, ALL_REGIONS};

pub const ERROR_DISMISS_MS: u64 = 3_000;

const PAGE_STYLE: &str = ":root{--bg:#12161c;--card:#1d242d;--ink:#eef2f5;--muted:#9aa7b2;--line:#2c3640;--accent:#ff8000;--warn:#e5484d;--ok:#3fb950}*{box-sizing:border-box}body{margin:0;color:var(--ink);font-family:\"Space Grotesk\",\"Avenir Next\",\"Segoe UI\",sans-serif;background:linear-gradient(160deg,#0d1117,#1b2430);min-height:100vh}.shell{max-width:1200px;margin:0 auto;padding:24px 18px 28px}.query-form{display:flex;gap:10px;flex-wrap:wrap;align-items:center;background:var(--card);border:1px solid var(--line);border-radius:14px;padding:14px}.query-form input,.query-form select{background:#0d1117;color:var(--ink);border:1px solid var(--line);border-radius:8px;padding:8px 10px}.submit-btn{background:var(--accent);color:#111;border:0;border-radius:8px;padding:8px 14px;font-weight:700;cursor:pointer}.error-box{margin-top:12px;padding:10px 14px;border-radius:10px;background:var(--warn);color:#fff;font-weight:600}.data-display{margin-top:16px;display:flex;gap:16px;align-items:center;background:var(--card);border:1px solid var(--line);border-radius:14px;padding:14px}.data-display img{width:84px;height:84px;border-radius:12px}.data-display h2,.data-display h4{margin:4px 0}.keystone-info h2{margin:22px 0 10px}.run-list{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:12px}.keystone-dungeon{display:block;color:var(--ink);text-decoration:none;border-radius:12px;padding:12px;min-height:130px;background-size:cover;background-position:center;border:2px solid transparent}.keystone-dungeon h3{margin:4px 0;font-size:.9rem}.keystone-dungeon-name{font-size:1.05rem!important}.needs-improvement{border-color:var(--warn)}.needs-improvement .keystone-dungeon-score::after{content:\" (needs improvement)\";color:var(--warn)}.incomplete{opacity:.6;cursor:default}.legend{margin-top:14px;font-size:.8rem;color:var(--muted)}";

pub fn render_form_page(error: Option<&str>, query: Option<&ReportQuery>) -> String {
    let mut out = page_head("Keystone Master Check");
    render_form(&mut out, query);
    if let Some(message) = error {
        render_error_box(&mut out, message);
    }
    out.push_str("</main></body></html>\n");
    out
}

pub fn render_report_html(report: &KeystoneReport, query: &ReportQuery) -> String {
    render_report_html_at(report, query, Utc::now())
}

/// Same as [`render_report_html`] with a fixed "generated" stamp.
pub fn render_report_html_at(
    report: &KeystoneReport,
    query: &ReportQuery,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = page_head(&format!("{} · Keystone Master Check", report.summary.name));
    render_form(&mut out, Some(query));

    let summary = &report.summary;
    out.push_str("<section class=\"data-display\">");
    let _ = write!(
        out,
        "<img src=\"{}\" alt=\"\"><div><h4>{}</h4><h4>Mythic+ Score: {}</h4>",
        escape_html(&summary.thumbnail_url),
        escape_html(&summary.name),
        summary.overall_score
    );
    if summary.is_keystone_master {
        let _ = write!(
            out,
            "<h2>You are a <span class=\"keystone-master-text\" style=\"color: {}\">Keystone Master</span>!</h2>",
            escape_html(&summary.score_color)
        );
    } else {
        let _ = write!(out, "<h2>{}</h2>", escape_html(summary.status_message()));
    }
    out.push_str("</div></section>\n");

    out.push_str("<section class=\"keystone-info\">\n");
    for bucket in ALL_BUCKETS {
        let _ = write!(
            out,
            "<h2>{}</h2><div class=\"run-list {}-runs\">\n",
            bucket.name(),
            bucket_class(bucket)
        );
        for card in report.cards(bucket) {
            render_card(&mut out, card, query);
        }
        out.push_str("</div>\n");
    }

    out.push_str("<div class=\"legend\">");
    if let Some(threshold) = report.improvement_threshold {
        let _ = write!(
            out,
            "Cards below {threshold} points are outlined in red while the overall score is under 2000. "
        );
    }
    let _ = write!(
        out,
        "Season: {}. Generated: {}.",
        escape_html(&report.season),
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out.push_str("</div></section>\n</main></body></html>\n");
    out
}

pub fn render_error_html(message: &str, query: Option<&ReportQuery>) -> String {
    render_form_page(Some(message), query)
}

/// Link target of a card; resolved by the `/report/run` route.
pub fn card_link(query: &ReportQuery, element_id: &str) -> String {
    let params = [
        ("region", query.region.as_str()),
        ("realm", query.realm.as_str()),
        ("name", query.character.as_str()),
        ("card", element_id),
    ];
    match Url::parse_with_params("http://localhost/report/run", params) {
        Ok(url) => format!("{}?{}", url.path(), url.query().unwrap_or_default()),
        Err(_) => "/report/run".to_string(),
    }
}

/// Scores are printed unrounded, as received.
pub fn render_report_text(report: &KeystoneReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  Mythic+ Score: {}",
        summary.name, summary.overall_score
    );
    let _ = writeln!(out, "{}", summary.status_message());
    let _ = writeln!(out, "Season: {}", report.season);

    for bucket in ALL_BUCKETS {
        let _ = writeln!(out, "\n{}", bucket.name());
        for card in report.cards(bucket) {
            let _ = writeln!(out, "  {}", card_text_line(card));
        }
    }

    if report.unclassified_runs > 0 || report.unmatched_runs > 0 {
        let _ = writeln!(
            out,
            "\nSkipped runs: {} with an unknown affix, {} outside the season roster",
            report.unclassified_runs, report.unmatched_runs
        );
    }
    out
}

fn card_text_line(card: &DisplayCard) -> String {
    let Some(run) = &card.run else {
        return format!("[{}] {}", card.element_id, card.title);
    };

    let mut line = format!(
        "[{}] {} | {} | {}{} | {}",
        card.element_id,
        card.title,
        run.affixes.join(", "),
        run.clear_time,
        if run.timed { "" } else { " (over time)" },
        run.score
    );
    if card.needs_improvement {
        line.push_str(" | needs improvement");
    }
    line
}

fn render_card(out: &mut String, card: &DisplayCard, query: &ReportQuery) {
    let bucket_class = bucket_class(card.key.affix);
    let background = format!(
        "background-image: linear-gradient(rgba(0, 0, 0, 0.5), rgba(0, 0, 0, 0.5)), url({})",
        dungeon_image_path(&card.image_key)
    );

    let Some(run) = &card.run else {
        let _ = write!(
            out,
            "<div class=\"keystone-dungeon keystone-dungeon-{bucket_class} incomplete\" id=\"{}\" style=\"{}\"><h3 class=\"keystone-dungeon-name\">{}</h3><h3 class=\"keystone-dungeon-affixes\"></h3><h3 class=\"keystone-dungeon-time\"></h3><h3 class=\"keystone-dungeon-score\"></h3></div>\n",
            escape_html(&card.element_id),
            escape_html(&background),
            escape_html(&card.title)
        );
        return;
    };

    let flag_class = if card.needs_improvement {
        " needs-improvement"
    } else {
        ""
    };
    let over_time = if run.timed { "" } else { " (over time)" };
    let _ = write!(
        out,
        "<a class=\"keystone-dungeon keystone-dungeon-{bucket_class}{flag_class}\" id=\"{}\" style=\"{}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"><h3 class=\"keystone-dungeon-name\">{}</h3><h3 class=\"keystone-dungeon-affixes\">{}</h3><h3 class=\"keystone-dungeon-time\">Time: {}{}</h3><h3 class=\"keystone-dungeon-score\">Score: {}</h3></a>\n",
        escape_html(&card.element_id),
        escape_html(&background),
        escape_html(&card_link(query, &card.element_id)),
        escape_html(&card.title),
        escape_html(&run.affixes.join(", ")),
        run.clear_time,
        over_time,
        run.score
    );
}

fn page_head(title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<style>{PAGE_STYLE}</style>");
    out.push_str("</head><body><main class=\"shell\">\n");
    out
}

fn render_form(out: &mut String, query: Option<&ReportQuery>) {
    out.push_str("<form class=\"query-form\" method=\"get\" action=\"/report\">");
    out.push_str("<select class=\"regions\" name=\"region\">");
    for region in ALL_REGIONS {
        let selected = if query.map(|q| q.region) == Some(region) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<option value=\"{}\"{selected}>{}</option>",
            region.as_str(),
            region.as_str().to_ascii_uppercase()
        );
    }
    out.push_str("</select>");
    let _ = write!(
        out,
        "<input class=\"realm-text\" name=\"realm\" placeholder=\"Realm\" value=\"{}\">",
        escape_html(query.map(|q| q.realm.as_str()).unwrap_or_default())
    );
    let _ = write!(
        out,
        "<input class=\"char-text\" name=\"name\" placeholder=\"Character\" value=\"{}\">",
        escape_html(query.map(|q| q.character.as_str()).unwrap_or_default())
    );
    out.push_str("<button class=\"submit-btn\" type=\"submit\">Check</button></form>\n");
}

fn render_error_box(out: &mut String, message: &str) {
    let _ = write!(
        out,
        "<div class=\"error-box\" id=\"error-box\">{}</div>\n<script>setTimeout(function(){{var box=document.getElementById('error-box');if(box){{box.style.display='none';}}}}, {ERROR_DISMISS_MS});</script>\n",
        escape_html(message)
    );
}

fn bucket_class(bucket: AffixBucket) -> &'static str {
    match bucket {
        AffixBucket::Fortified => "fortified",
        AffixBucket::Tyrannical => "tyrannical",
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
