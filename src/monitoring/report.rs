//! HTML rendering for monitoring reports

use super::drift::DataDriftReport;
use super::stability::DataStabilityReport;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2em; color: #222; }}\n\
         table {{ border-collapse: collapse; margin-top: 1em; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 6px 12px; text-align: left; }}\n\
         th {{ background: #f0f0f0; }}\n\
         .pass {{ color: #1a7f37; }}\n\
         .fail {{ color: #b42318; }}\n\
         </style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the data-stability test suite as a self-contained HTML page.
pub fn render_stability_html(report: &DataStabilityReport) -> String {
    let mut body = String::new();
    body.push_str("<h1>Data Stability</h1>\n");
    body.push_str(&format!(
        "<p>Reference rows: {} &mdash; Current rows: {} &mdash; Failed checks: {}</p>\n",
        report.reference_rows,
        report.current_rows,
        report.n_failed()
    ));

    body.push_str("<table>\n<tr><th>Column</th><th>Check</th><th>Detail</th><th>Result</th></tr>\n");
    for check in &report.checks {
        let (class, verdict) = if check.passed {
            ("pass", "PASS")
        } else {
            ("fail", "FAIL")
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            escape(&check.column),
            escape(&check.check),
            escape(&check.detail),
            class,
            verdict
        ));
    }
    body.push_str("</table>\n");

    page("Data Stability", &body)
}

/// Render the data-drift report as a self-contained HTML page.
pub fn render_drift_html(report: &DataDriftReport) -> String {
    let mut body = String::new();
    body.push_str("<h1>Data Drift</h1>\n");
    body.push_str(&format!(
        "<p>Reference rows: {} &mdash; Current rows: {} &mdash; Drifted checks: {}</p>\n",
        report.reference_rows,
        report.current_rows,
        report.n_drifted()
    ));

    body.push_str(
        "<table>\n<tr><th>Column</th><th>Method</th><th>Statistic</th><th>Threshold</th><th>Result</th></tr>\n",
    );
    for check in &report.checks {
        let (class, verdict) = if check.drifted {
            ("fail", "DRIFT")
        } else {
            ("pass", "OK")
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td><td>{:.4}</td><td class=\"{}\">{}</td></tr>\n",
            escape(&check.column),
            check.method.as_str(),
            check.statistic,
            check.threshold,
            class,
            verdict
        ));
    }
    body.push_str("</table>\n");

    page("Data Drift", &body)
}
