//! Word-compatible experiment record export.
//!
//! Renders one experiment into the lab's fixed HTML record template, which
//! word processors open as a `.doc` file. Section markup is embedded as-is;
//! the plain-text title is escaped.

use super::local_day;
use crate::model::experiment::Experiment;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static FILE_NAME_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\x{4e00}-\x{9fa5}]").expect("valid file name regex"));

const MAX_TITLE_CHARS: usize = 50;
const UTF8_BOM: &str = "\u{feff}";

const DOCUMENT_STYLE: &str = r#"
    body { font-family: 'SimSun', 'Songti SC', serif; font-size: 10.5pt; line-height: 1.5; color: #000; }
    h1 { font-family: 'SimHei', 'Heiti SC', sans-serif; font-size: 18pt; text-align: center; margin: 20px 0 10px 0; font-weight: bold; }
    .company-name { font-family: 'SimHei', 'Heiti SC', sans-serif; font-size: 10.5pt; text-align: right; margin-bottom: 10px; }
    table { width: 100%; border-collapse: collapse; border: 1px solid #000; table-layout: fixed; }
    td { border: 1px solid #000; padding: 8px; vertical-align: middle; word-wrap: break-word; }
    .col-label { width: 120px; text-align: center; font-family: 'SimHei', 'Heiti SC', sans-serif; font-weight: bold; background-color: #fff; }
    .col-content { text-align: left; font-family: 'SimSun', serif; }
    img { max-width: 100%; height: auto; margin: 5px 0; }
    p { margin: 0 0 5px 0; }
    .footer-container { margin-top: 20px; font-family: 'SimSun', serif; overflow: hidden; }
    .footer-left { float: left; }
    .footer-right { float: right; }
"#;

/// Downloadable document payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentDocument {
    pub file_name: String,
    /// UTF-8 BOM followed by the HTML document.
    pub bytes: Vec<u8>,
}

/// Builds the file name and BOM-prefixed body for one experiment.
pub fn export_experiment_document(experiment: &Experiment, today: NaiveDate) -> ExperimentDocument {
    let html = render_experiment_document(experiment, today);
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + html.len());
    bytes.extend_from_slice(UTF8_BOM.as_bytes());
    bytes.extend_from_slice(html.as_bytes());

    ExperimentDocument {
        file_name: document_file_name(experiment, today),
        bytes,
    }
}

/// `<YYYYMMDD of createdAt>-<sanitized title>.doc`.
pub fn document_file_name(experiment: &Experiment, today: NaiveDate) -> String {
    let started = local_day(experiment.created_at).unwrap_or(today);
    let title: String = FILE_NAME_UNSAFE_RE
        .replace_all(&experiment.title, "_")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    format!("{}-{title}.doc", started.format("%Y%m%d"))
}

/// Renders the record template. `today` closes the experiment date range.
pub fn render_experiment_document(experiment: &Experiment, today: NaiveDate) -> String {
    let started = local_day(experiment.created_at).unwrap_or(today);
    let title = escape_html(&experiment.title);

    let rows = [
        ("实验名称", title.as_str(), ""),
        ("实验目的", experiment.purpose.as_str(), ""),
        ("实验准备", "", " style=\"height: 80px;\""),
        ("主要仪器", "", " style=\"height: 80px;\""),
        ("实验步骤", experiment.methods.as_str(), " style=\"min-height: 150px;\""),
        ("实验结果", experiment.results.as_str(), " style=\"min-height: 150px;\""),
        ("实验结论", experiment.conclusion.as_str(), " style=\"min-height: 100px;\""),
    ];
    let table_rows: String = rows
        .iter()
        .map(|(label, content, style)| {
            format!(
                "    <tr>\n      <td class=\"col-label\">{label}</td>\n      <td class=\"col-content\"{style}>{content}</td>\n    </tr>\n"
            )
        })
        .collect();

    format!(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'>
<head>
  <meta charset=\"utf-8\">
  <title>{title}</title>
  <style>{DOCUMENT_STYLE}  </style>
</head>
<body>
  <h1>项目开发实验记录</h1>
  <div class=\"company-name\">修实生物医药（南通）有限公司</div>
  <table>
    <colgroup>
      <col width=\"120\" />
      <col />
    </colgroup>
{table_rows}  </table>
  <div class=\"footer-container\">
    <div class=\"footer-left\">实验人：</div>
    <div class=\"footer-right\">实验起止日期：{} 至 {}</div>
  </div>
</body>
</html>
",
        started.format("%Y-%m-%d"),
        today.format("%Y-%m-%d"),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{document_file_name, escape_html, export_experiment_document};
    use crate::model::experiment::Experiment;
    use chrono::{Local, NaiveDate, TimeZone};

    fn noon_ms(day: NaiveDate) -> i64 {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn file_name_replaces_unsafe_characters_and_keeps_cjk() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let experiment = Experiment::new("p", "Western blot: 实验/A", noon_ms(day));
        assert_eq!(
            document_file_name(&experiment, day),
            "20240305-Western_blot__实验_A.doc"
        );
    }

    #[test]
    fn file_name_title_is_capped_at_fifty_chars() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let experiment = Experiment::new("p", "x".repeat(80), noon_ms(day));
        let name = document_file_name(&experiment, day);
        assert_eq!(name, format!("20240305-{}.doc", "x".repeat(50)));
    }

    #[test]
    fn document_embeds_sections_and_date_range() {
        let started = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let mut experiment = Experiment::new("p", "A<B", noon_ms(started));
        experiment.methods = "<ol><li>mix</li></ol>".to_string();

        let document = export_experiment_document(&experiment, today);
        assert!(document.bytes.starts_with("\u{feff}".as_bytes()));
        let html = String::from_utf8(document.bytes[3..].to_vec()).unwrap();
        assert!(html.contains("<ol><li>mix</li></ol>"));
        assert!(html.contains("<title>A&lt;B</title>"));
        assert!(html.contains("实验起止日期：2024-01-02 至 2024-02-03"));
        assert!(html.contains("实验结论"));
    }

    #[test]
    fn escape_html_handles_markup_characters() {
        assert_eq!(escape_html("a&b<'\">"), "a&amp;b&lt;&#39;&quot;&gt;");
    }
}
