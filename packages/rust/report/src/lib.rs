//! HTML report rendering for TrendLens snapshots.
//!
//! [`render`] is a pure function from a snapshot plus [`RenderOptions`] to a
//! self-contained HTML document: same inputs, byte-identical output. All
//! I/O lives in [`write_report`].

pub mod markdown;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use trendlens_shared::{Result, Snapshot, TrendLensError};

use crate::markdown::{analysis_to_html, escape_html};

/// Shown when a record carries no analysis.
const NO_ANALYSIS_PLACEHOLDER: &str = "<p>暂无分析数据</p>";

/// Presentational category rotation: label and accent color, assigned by
/// display rank. Purely cosmetic, no classification happens here.
const CATEGORIES: &[(&str, &str)] = &[
    ("科技", "#4facfe"),
    ("社会", "#FF4757"),
    ("文化", "#a29bfe"),
    ("财经", "#FFA502"),
    ("生活", "#2ed573"),
];

const CSS: &str = r#"
        body { font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f7fa; }
        h1 { text-align: center; color: #2c3e50; margin-bottom: 10px; }
        .report-meta { text-align: center; color: #7f8c8d; margin-bottom: 40px; }
        .topic-card { background: #fff; border-radius: 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.05); margin-bottom: 30px; padding: 30px; transition: transform 0.2s; }
        .topic-card:hover { transform: translateY(-5px); box-shadow: 0 8px 12px rgba(0,0,0,0.1); }
        .topic-header { border-bottom: 2px solid #eee; padding-bottom: 15px; margin-bottom: 20px; display: flex; justify-content: space-between; align-items: center; }
        .topic-title { font-size: 1.5em; font-weight: bold; color: #e74c3c; }
        .topic-stats { color: #7f8c8d; font-size: 0.9em; }
        .category-tag { display: inline-block; font-size: 0.75em; font-weight: bold; padding: 2px 10px; border-radius: 10px; color: #fff; margin-right: 10px; vertical-align: middle; }
        .section-title { font-weight: bold; margin-top: 20px; color: #34495e; border-left: 4px solid #3498db; padding-left: 10px; }
        .content-block { margin-top: 10px; color: #555; }
        .footer { text-align: center; margin-top: 50px; color: #aaa; font-size: 0.8em; }
"#;

// ---------------------------------------------------------------------------
// Options and output
// ---------------------------------------------------------------------------

/// Inputs that parameterize rendering. The timestamp is an explicit argument
/// so the renderer stays a deterministic function of its inputs.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Document and page title.
    pub title: String,
    /// Report filename prefix (`<prefix>_<YYYYMMDD>.html`).
    pub file_prefix: String,
    /// The date stamped into the filename and header.
    pub run_date: NaiveDate,
    /// Generation timestamp shown in the footer.
    pub generated_at: DateTime<Utc>,
}

/// A rendered report, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub file_name: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `snapshot` into a self-contained HTML document.
///
/// Never fails: records without analysis get a placeholder, and an empty
/// snapshot produces a valid document with a zero topic count.
pub fn render(snapshot: &Snapshot, options: &RenderOptions) -> Report {
    let date_str = options.run_date.format("%Y%m%d").to_string();
    let file_name = format!("{}_{}.html", options.file_prefix, date_str);
    let title = escape_html(&options.title);

    let mut html = String::with_capacity(8 * 1024);
    html.push_str(&format!(
        "<!DOCTYPE html>\n\
         <html lang=\"zh-CN\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title} {date_str}</title>\n\
         <style>{CSS}</style>\n\
         </head>\n\
         <body>\n\
         <h1>{title} ({date_str})</h1>\n\
         <div class=\"report-meta\">共 {count} 个话题</div>\n",
        count = snapshot.len(),
    ));

    for (index, record) in snapshot.iter().enumerate() {
        let rank = index + 1;
        let (category, color) = CATEGORIES[rank % CATEGORIES.len()];
        let analysis_html = match &record.analysis {
            Some(analysis) => analysis_to_html(analysis),
            None => NO_ANALYSIS_PLACEHOLDER.to_string(),
        };

        html.push_str(&format!(
            "<div class=\"topic-card\">\n\
             <div class=\"topic-header\">\n\
             <span class=\"topic-title\">\
             <span class=\"category-tag\" style=\"background: {color};\">{category}</span>\
             #{rank} {topic}</span>\n\
             <span class=\"topic-stats\">热度: {popularity}</span>\n\
             </div>\n\
             <div class=\"content-block\">\n{analysis_html}\n</div>\n\
             </div>\n",
            topic = escape_html(&record.topic),
            popularity = escape_html(&record.popularity.to_string()),
        ));
    }

    html.push_str(&format!(
        "<div class=\"footer\">TrendLens · 生成于 {}</div>\n\
         </body>\n\
         </html>\n",
        options.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));

    Report { file_name, html }
}

/// Write `report` into `out_dir`, overwriting any previous file of the same
/// name. Returns the full path written.
pub fn write_report(report: &Report, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir).map_err(|e| TrendLensError::io(out_dir, e))?;

    let path = out_dir.join(&report.file_name);
    std::fs::write(&path, &report.html).map_err(|e| TrendLensError::io(&path, e))?;
    info!(?path, bytes = report.html.len(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_shared::{EnrichedRecord, Popularity, SearchResult};

    fn options() -> RenderOptions {
        RenderOptions {
            title: "微博热搜分析报告".into(),
            file_prefix: "trend_report".into(),
            run_date: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
            generated_at: DateTime::parse_from_rfc3339("2026-08-23T09:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn record(topic: &str, analysis: Option<&str>) -> EnrichedRecord {
        EnrichedRecord {
            topic: topic.into(),
            popularity: Popularity::Text(" 1200000".into()),
            search_result: Some(SearchResult { references: vec![] }),
            analysis: analysis.map(Into::into),
        }
    }

    #[test]
    fn filename_embeds_prefix_and_date() {
        let report = render(&Vec::new(), &options());
        assert_eq!(report.file_name, "trend_report_20260823.html");
    }

    #[test]
    fn empty_snapshot_renders_zero_count() {
        let report = render(&Vec::new(), &options());
        assert!(report.html.contains("共 0 个话题"));
        assert!(report.html.contains("<!DOCTYPE html>"));
        assert!(report.html.contains("</html>"));
        assert!(!report.html.contains("topic-card"));
    }

    #[test]
    fn missing_analysis_renders_placeholder() {
        let snapshot = vec![record("无分析话题", None)];
        let report = render(&snapshot, &options());
        assert!(report.html.contains("<p>暂无分析数据</p>"));
    }

    #[test]
    fn cards_keep_snapshot_order_with_one_based_rank() {
        let snapshot = vec![
            record("第一名", Some("## 背景来龙去脉\n- **事件起因**: 测试")),
            record("第二名", None),
        ];
        let report = render(&snapshot, &options());

        let first = report.html.find("#1 第一名").expect("first card");
        let second = report.html.find("#2 第二名").expect("second card");
        assert!(first < second);
        assert!(report.html.contains("共 2 个话题"));
        // Popularity text is trimmed for display.
        assert!(report.html.contains("热度: 1200000"));
    }

    #[test]
    fn categories_rotate_by_display_rank() {
        let snapshot: Snapshot = (0..6)
            .map(|i| record(&format!("话题{i}"), None))
            .collect();
        let report = render(&snapshot, &options());

        // Ranks 1..=6 wrap around the five-entry rotation: card #1 takes the
        // second category, and #5 wraps back to the first.
        let first_card = report.html.find("#1 话题0").expect("first card");
        let first_tag = report.html[..first_card].rfind(">社会</span>");
        assert!(first_tag.is_some());
        assert_eq!(report.html.matches(">社会</span>").count(), 2);
        assert_eq!(report.html.matches(">科技</span>").count(), 1);
        assert_eq!(report.html.matches(">生活</span>").count(), 1);
    }

    #[test]
    fn analysis_markdown_is_transformed() {
        let snapshot = vec![record("话题", Some("## 深度分析\n- **用户痛点**: 很痛"))];
        let report = render(&snapshot, &options());
        assert!(report.html.contains(r#"<h3 class="section-title">深度分析</h3>"#));
        assert!(report.html.contains("<li><strong>用户痛点</strong>: 很痛</li>"));
    }

    #[test]
    fn topic_text_is_escaped() {
        let snapshot = vec![record("<b>话题</b> & co", None)];
        let report = render(&snapshot, &options());
        assert!(report.html.contains("&lt;b&gt;话题&lt;/b&gt; &amp; co"));
        assert!(!report.html.contains("<b>话题</b>"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let snapshot = vec![
            record("话题甲", Some("## 背景来龙去脉\n分析正文")),
            record("话题乙", None),
        ];
        let opts = options();
        let first = render(&snapshot, &opts);
        let second = render(&snapshot, &opts);
        assert_eq!(first, second);
    }

    #[test]
    fn write_report_creates_dir_and_file() {
        let report = render(&vec![record("话题", None)], &options());
        let out_dir = std::env::temp_dir().join(format!(
            "trendlens-report-{}",
            std::process::id()
        ));

        let path = write_report(&report, &out_dir).expect("write");
        assert!(path.ends_with("trend_report_20260823.html"));
        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content, report.html);

        std::fs::remove_dir_all(&out_dir).ok();
    }
}
